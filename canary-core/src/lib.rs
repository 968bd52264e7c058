//! canary-core: Shared infrastructure for the Canary client crates.
pub mod config;
pub mod error;
pub mod observability;

pub use error::CoreError;
pub use reqwest;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
