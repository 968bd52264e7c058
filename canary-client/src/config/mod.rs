use canary_core::config::{configuration_directory, load_layered, Environment};
use canary_core::CoreError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    /// Selected through `APP_ENVIRONMENT`, not read from the files.
    #[serde(skip)]
    pub environment: Environment,
    pub api: ApiSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Base URL of the Canary API for the selected environment.
    pub fn base_url(&self) -> &str {
        self.api.base_url(self.environment)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiSettings {
    /// Local backend or development proxy, e.g. `http://localhost:3000/api`.
    #[serde(default = "default_development_url")]
    pub development_url: String,
    /// Absolute origin of the deployed API.
    pub production_url: String,
    /// Client-side deadline for the news feed and urgent news endpoints.
    #[serde(default = "default_news_timeout_secs")]
    pub news_timeout_secs: u64,
    /// Deadline for every other endpoint. Unset leaves it to reqwest.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ApiSettings {
    pub fn base_url(&self, environment: Environment) -> &str {
        match environment {
            Environment::Development => &self.development_url,
            Environment::Production => &self.production_url,
        }
    }

    pub fn news_timeout(&self) -> Duration {
        Duration::from_secs(self.news_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageSettings {
    /// JSON file holding the persisted credential.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_development_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_news_timeout_secs() -> u64 {
    35
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".canary/credentials.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn get_configuration() -> Result<Settings, CoreError> {
    let environment = Environment::from_env()?;
    let configuration_directory = configuration_directory("canary-client")?;

    let mut settings: Settings = load_layered(&configuration_directory, environment)?;
    settings.environment = environment;
    Ok(settings)
}
