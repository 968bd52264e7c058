use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
