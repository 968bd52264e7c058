pub mod feed;

pub use feed::{FeedState, NewsFeed};
