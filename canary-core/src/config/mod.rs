//! Layered configuration loading shared by the Canary crates.
//!
//! Sources are applied in order, later ones winning:
//! `base.yaml`, `<environment>.yaml` (optional), then `APP_`-prefixed
//! environment variables using `__` as the nesting separator.

use crate::error::CoreError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment variable selecting the runtime environment.
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[serde(alias = "dev")]
    Development,
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Reads `APP_ENVIRONMENT`, defaulting to development when unset.
    pub fn from_env() -> Result<Self, CoreError> {
        match std::env::var(ENVIRONMENT_VAR) {
            Ok(value) => value.parse().map_err(CoreError::InvalidEnvironment),
            Err(_) => Ok(Environment::Development),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Resolves the `config` directory of a crate whether the process runs from
/// the workspace root or from the crate directory itself.
pub fn configuration_directory(crate_dir: &str) -> Result<PathBuf, CoreError> {
    let base_path = std::env::current_dir()?;

    if base_path.ends_with(crate_dir) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(crate_dir).join("config"))
    }
}

pub fn load_layered<T: DeserializeOwned>(
    config_dir: &Path,
    environment: Environment,
) -> Result<T, CoreError> {
    let settings = Cfg::builder()
        .add_source(File::from(config_dir.join("base.yaml")).required(true))
        .add_source(
            File::from(config_dir.join(format!("{}.yaml", environment.as_str()))).required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[derive(Debug, Deserialize)]
    struct Sample {
        server: SampleServer,
    }

    #[derive(Debug, Deserialize)]
    struct SampleServer {
        url: String,
        timeout_secs: u64,
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("dev".parse::<Environment>(), Ok(Environment::Development));
        assert_eq!("Production".parse::<Environment>(), Ok(Environment::Production));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_file_overrides_base() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("base.yaml"),
            "server:\n  url: http://localhost:3000\n  timeout_secs: 35\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("production.yaml"),
            "server:\n  url: https://api.example.com\n",
        )
        .unwrap();

        let dev: Sample = load_layered(dir.path(), Environment::Development).unwrap();
        assert_eq!(dev.server.url, "http://localhost:3000");

        let prod: Sample = load_layered(dir.path(), Environment::Production).unwrap();
        assert_eq!(prod.server.url, "https://api.example.com");
        assert_eq!(prod.server.timeout_secs, 35);
    }

    #[test]
    fn test_missing_base_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Sample, CoreError> = load_layered(dir.path(), Environment::Development);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
