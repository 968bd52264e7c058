use anyhow::{Context, Result};
use canary_client::chat::ChatConversation;
use canary_client::config::get_configuration;
use canary_client::models::{Article, PreferencesUpdate};
use canary_client::news::NewsFeed;
use canary_client::session::SessionStatus;
use canary_client::storage::FileStore;
use canary_client::CanaryApi;
use canary_core::observability::init_tracing;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "canary")]
#[command(about = "Canary - personalised news and chat assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and store the session
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        username: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the personalised news feed
    Feed {
        /// Only high-urgency articles
        #[arg(long)]
        urgent: bool,
    },
    /// List chats
    Chats,
    /// Send a message to the assistant
    Chat {
        message: String,
        /// Continue an existing chat instead of starting a new one
        #[arg(long)]
        chat_id: Option<String>,
    },
    /// Show what the assistant remembers about you
    Memory,
    /// Show or change news preferences
    Preferences {
        /// Replace interests (comma separated)
        #[arg(long, value_delimiter = ',')]
        interests: Option<Vec<String>>,
        #[arg(long)]
        relevance_threshold: Option<u32>,
        #[arg(long)]
        urgent_alerts: Option<bool>,
    },
    /// Manage monitored topics
    Monitor {
        #[command(subcommand)]
        action: MonitorAction,
    },
}

#[derive(Subcommand)]
enum MonitorAction {
    /// Start monitoring a topic
    Add { topic: String },
    /// Stop monitoring a topic
    Remove { topic: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let configuration = get_configuration().context("Failed to read configuration")?;

    init_tracing(
        "canary",
        &configuration.logging.level,
        configuration.logging.otlp_endpoint.as_deref(),
    )
    .context("Failed to initialise tracing")?;

    let store = Arc::new(FileStore::new(configuration.storage.path.clone()));
    let api = CanaryApi::new(&configuration, store)?;
    let session = api.session_manager();

    info!(base_url = %configuration.base_url(), environment = configuration.environment.as_str(), "Canary client starting");

    match cli.command {
        Commands::Login { email, password } => {
            let response = api.auth.login(&email, &password).await?;
            let session = session.login(response).await?;
            println!("Signed in as {}", session.display_name());
        }
        Commands::Register {
            email,
            password,
            username,
        } => {
            let response = api.auth.register(&email, &password, &username).await?;
            if let Some(message) = &response.message {
                println!("{}", message);
            }
            let session = session.login(response).await?;
            println!("Signed in as {}", session.display_name());
        }
        Commands::Logout => {
            session.logout().await;
            println!("Signed out");
        }
        Commands::Whoami => {
            if session.initialize().await != SessionStatus::Authenticated {
                anyhow::bail!("Not signed in. Run `canary login` first.");
            }
            // initialize() already verified the profile against the server.
            if let Some(user) = session.snapshot().user() {
                println!("{} <{}> ({})", user.display_name(), user.email, user.user_id);
            }
        }
        command => {
            if session.initialize().await != SessionStatus::Authenticated {
                anyhow::bail!("Not signed in. Run `canary login` first.");
            }
            run_authenticated(&api, command).await?;
        }
    }

    Ok(())
}

async fn run_authenticated(api: &CanaryApi, command: Commands) -> Result<()> {
    match command {
        Commands::Feed { urgent } => {
            let feed = NewsFeed::new(api.news.clone());
            let (articles, error) = if urgent {
                let articles = feed.refresh_urgent().await;
                (articles, feed.urgent_error().await)
            } else {
                let articles = feed.refresh().await;
                (articles, feed.feed_error().await)
            };
            match articles {
                Ok(articles) => print_articles(&articles),
                Err(e) => {
                    let message = error.unwrap_or_else(|| e.to_string());
                    anyhow::bail!(message);
                }
            }
        }
        Commands::Chats => {
            for chat in api.chat.get_all_chats().await? {
                println!("{}  {}", chat.chat_id, chat.title);
            }
        }
        Commands::Chat { message, chat_id } => {
            let conversation = ChatConversation::new(api.chat.clone());
            if let Some(chat_id) = chat_id {
                conversation.select_chat(&chat_id).await?;
            }
            match conversation.send_message(&message).await? {
                Some(reply) => println!("{}", reply.content),
                None => println!("(no reply)"),
            }
            if let Some(chat) = conversation.current().await {
                println!("chat: {}", chat.chat_id);
            }
        }
        Commands::Memory => {
            let memory = api.chat.get_ai_memory().await?;
            println!("{}", memory.summary);
            if !memory.active_monitoring.is_empty() {
                println!("Monitoring: {}", memory.active_monitoring.join(", "));
            }
        }
        Commands::Preferences {
            interests,
            relevance_threshold,
            urgent_alerts,
        } => {
            let update = PreferencesUpdate {
                interests,
                relevance_threshold,
                urgent_alerts,
                ..Default::default()
            };
            let preferences = if update.is_empty() {
                api.news.get_preferences().await?
            } else {
                api.news.update_preferences(&update).await?
            };
            println!("{}", serde_json::to_string_pretty(&preferences)?);
        }
        Commands::Monitor { action } => {
            let update = match action {
                MonitorAction::Add { topic } => api.news.add_monitoring_topic(&topic).await?,
                MonitorAction::Remove { topic } => api.news.remove_monitoring_topic(&topic).await?,
            };
            println!("{}", update.message);
            println!("Monitoring: {}", update.monitoring_topics.join(", "));
        }
        Commands::Login { .. }
        | Commands::Register { .. }
        | Commands::Logout
        | Commands::Whoami => {}
    }

    Ok(())
}

fn print_articles(articles: &[Article]) {
    if articles.is_empty() {
        println!("No articles yet.");
        return;
    }
    for article in articles {
        let marker = if article.is_urgent() { "!" } else { " " };
        println!("{} [{}] {}", marker, article.source, article.title);
        if !article.summary.is_empty() {
            println!("    {}", article.summary);
        }
    }
}
