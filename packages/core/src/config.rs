//! Loader configuration
//!
//! All settings come from the environment so the loader can run unchanged in
//! a shell, a container or CI:
//!
//! | Variable | Default |
//! |---|---|
//! | `MODELGRAPH_DB_ENDPOINT` | `rocksdb://~/.modelgraph/database/modelgraph` |
//! | `MODELGRAPH_DB_NAMESPACE` | `modelgraph` |
//! | `MODELGRAPH_DB_DATABASE` | `graph` |
//! | `MODELGRAPH_DB_USER` / `MODELGRAPH_DB_PASSWORD` | unset (no sign-in) |
//! | `MODELGRAPH_INPUT_DIR` | `./model_metadata` |
//! | `MODELGRAPH_SCHEMA` | unset (bundled model-card schema) |
//! | `MODELGRAPH_RESET` | `false` |
//! | `MODELGRAPH_EXTENSION` | `json` |
//!
//! A bare path given as the endpoint is treated as an embedded RocksDB
//! location.

use crate::db::{StoreCredentials, DEFAULT_DATABASE, DEFAULT_NAMESPACE};
use crate::services::{IngestOptions, SchemaSource, DEFAULT_EXTENSION};
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_DB_ENDPOINT: &str = "MODELGRAPH_DB_ENDPOINT";
pub const ENV_DB_NAMESPACE: &str = "MODELGRAPH_DB_NAMESPACE";
pub const ENV_DB_DATABASE: &str = "MODELGRAPH_DB_DATABASE";
pub const ENV_DB_USER: &str = "MODELGRAPH_DB_USER";
pub const ENV_DB_PASSWORD: &str = "MODELGRAPH_DB_PASSWORD";
pub const ENV_INPUT_DIR: &str = "MODELGRAPH_INPUT_DIR";
pub const ENV_SCHEMA: &str = "MODELGRAPH_SCHEMA";
pub const ENV_RESET: &str = "MODELGRAPH_RESET";
pub const ENV_EXTENSION: &str = "MODELGRAPH_EXTENSION";

/// Default directory scanned for documents
pub const DEFAULT_INPUT_DIR: &str = "./model_metadata";

const SUPPORTED_SCHEMES: [&str; 3] = ["rocksdb://", "http://", "https://"];

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be parsed
    #[error("{var} has invalid value '{value}': expected {expected}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    /// No endpoint configured and no home directory to derive one from
    #[error("Failed to get home directory for the default database path")]
    NoHomeDirectory,

    /// Values parse but do not form a usable configuration
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one loader run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Store endpoint (`rocksdb://…`, `http://…` or `https://…`)
    pub db_endpoint: String,
    pub db_namespace: String,
    pub db_database: String,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    /// Root directory scanned recursively for documents
    pub input_dir: PathBuf,
    /// Schema path or URL; bundled schema when unset
    pub schema: Option<String>,
    /// Clear the graph before loading
    pub reset: bool,
    /// Document file extension
    pub extension: String,
}

impl LoaderConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_endpoint = match var(ENV_DB_ENDPOINT) {
            Some(endpoint) => normalize_endpoint(&endpoint),
            None => default_endpoint()?,
        };

        let reset = match var(ENV_RESET) {
            Some(value) => parse_bool(ENV_RESET, &value)?,
            None => false,
        };

        let config = Self {
            db_endpoint,
            db_namespace: var(ENV_DB_NAMESPACE).unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            db_database: var(ENV_DB_DATABASE).unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            db_user: var(ENV_DB_USER),
            // Passwords are taken verbatim
            db_password: lookup(ENV_DB_PASSWORD).filter(|value| !value.is_empty()),
            input_dir: var(ENV_INPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
            schema: var(ENV_SCHEMA),
            reset,
            extension: var(ENV_EXTENSION)
                .map(|ext| ext.trim_start_matches('.').to_string())
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        };

        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !SUPPORTED_SCHEMES
            .iter()
            .any(|scheme| self.db_endpoint.starts_with(scheme))
        {
            return Err(format!(
                "db_endpoint '{}' must start with one of {}",
                self.db_endpoint,
                SUPPORTED_SCHEMES.join(", ")
            ));
        }

        if self.db_namespace.is_empty() {
            return Err("db_namespace cannot be empty".to_string());
        }

        if self.db_database.is_empty() {
            return Err("db_database cannot be empty".to_string());
        }

        if self.db_user.is_some() != self.db_password.is_some() {
            return Err("db_user and db_password must be set together".to_string());
        }

        if self.extension.is_empty() {
            return Err("extension cannot be empty".to_string());
        }

        Ok(())
    }

    /// Whether the store is reached over the network
    pub fn is_remote(&self) -> bool {
        self.db_endpoint.starts_with("http://") || self.db_endpoint.starts_with("https://")
    }

    /// Sign-in credentials, when configured
    pub fn credentials(&self) -> Option<StoreCredentials> {
        match (&self.db_user, &self.db_password) {
            (Some(user), Some(password)) => Some(StoreCredentials::new(user, password)),
            _ => None,
        }
    }

    pub fn schema_source(&self) -> Option<SchemaSource> {
        self.schema.as_deref().map(SchemaSource::parse)
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            extension: self.extension.clone(),
            reset_before_load: self.reset,
        }
    }

    /// Directory to create before opening an embedded store
    pub fn embedded_path(&self) -> Option<PathBuf> {
        self.db_endpoint
            .strip_prefix("rocksdb://")
            .map(PathBuf::from)
    }
}

/// Embedded database under the user's home directory
///
/// `~/.modelgraph/database/modelgraph` on all platforms.
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    let home_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(home_dir
        .join(".modelgraph")
        .join("database")
        .join("modelgraph"))
}

fn default_endpoint() -> Result<String, ConfigError> {
    Ok(format!("rocksdb://{}", default_database_path()?.display()))
}

fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("rocksdb://{}", endpoint)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::from_lookup(lookup(&[(ENV_DB_ENDPOINT, "/tmp/graph")])).unwrap();

        assert_eq!(config.db_endpoint, "rocksdb:///tmp/graph");
        assert_eq!(config.db_namespace, "modelgraph");
        assert_eq!(config.db_database, "graph");
        assert_eq!(config.input_dir, PathBuf::from("./model_metadata"));
        assert_eq!(config.extension, "json");
        assert!(!config.reset);
        assert!(config.schema_source().is_none());
        assert!(config.credentials().is_none());
        assert!(!config.is_remote());
        assert_eq!(config.embedded_path(), Some(PathBuf::from("/tmp/graph")));
    }

    #[test]
    fn test_default_endpoint_under_home() {
        if dirs::home_dir().is_none() {
            return;
        }
        let config = LoaderConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.db_endpoint.starts_with("rocksdb://"));
        assert!(config.db_endpoint.ends_with("modelgraph"));
        assert!(config.db_endpoint.contains(".modelgraph"));
    }

    #[test]
    fn test_remote_configuration() {
        let config = LoaderConfig::from_lookup(lookup(&[
            (ENV_DB_ENDPOINT, "http://127.0.0.1:8000"),
            (ENV_DB_USER, "root"),
            (ENV_DB_PASSWORD, " secret "),
            (ENV_INPUT_DIR, "./cards"),
            (ENV_SCHEMA, "https://example.com/model_card.json"),
            (ENV_RESET, "TRUE"),
            (ENV_EXTENSION, ".card"),
        ]))
        .unwrap();

        assert!(config.is_remote());
        assert_eq!(config.embedded_path(), None);
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.username, "root");
        assert_eq!(credentials.password, " secret ");
        assert_eq!(
            config.schema_source(),
            Some(SchemaSource::Url("https://example.com/model_card.json".into()))
        );

        let options = config.ingest_options();
        assert!(options.reset_before_load);
        assert_eq!(options.extension, "card");
    }

    #[test]
    fn test_invalid_reset_flag() {
        let err = LoaderConfig::from_lookup(lookup(&[
            (ENV_DB_ENDPOINT, "/tmp/graph"),
            (ENV_RESET, "sometimes"),
        ]))
        .unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: ENV_RESET,
                value: "sometimes".to_string(),
                expected: "true or false",
            }
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config =
            LoaderConfig::from_lookup(lookup(&[(ENV_DB_ENDPOINT, "rocksdb://./graph")])).unwrap();

        // Valid config
        assert!(config.validate().is_ok());

        // Invalid: unsupported scheme
        config.db_endpoint = "ws://localhost:8000".to_string();
        assert!(config.validate().is_err());

        // Invalid: user without password
        config.db_endpoint = "http://localhost:8000".to_string();
        config.db_user = Some("root".to_string());
        assert!(config.validate().is_err());

        config.db_password = Some("root".to_string());
        assert!(config.validate().is_ok());

        // Invalid: empty namespace
        config.db_namespace = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_incomplete_credentials_rejected_on_load() {
        let err = LoaderConfig::from_lookup(lookup(&[
            (ENV_DB_ENDPOINT, "http://localhost:8000"),
            (ENV_DB_USER, "root"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
