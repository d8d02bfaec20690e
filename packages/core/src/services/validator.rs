//! Document Validation Gate
//!
//! Every document passes through a [`DocumentValidator`] before it is mapped.
//! A rejected document is reported and skipped; it never reaches the store.
//!
//! # Schema Sources
//!
//! - `http://…` / `https://…` - fetched once at startup
//! - anything else - read from the local file system
//! - none configured - the model-card schema bundled with this crate
//!
//! # Examples
//!
//! ```rust,no_run
//! use modelgraph_core::services::{DocumentValidator, JsonSchemaValidator, SchemaSource};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = SchemaSource::parse("https://example.com/model_card.schema.json");
//!     let validator = JsonSchemaValidator::load(&source).await?;
//!
//!     if let Err(failure) = validator.validate(&json!({"name": "resnet"})) {
//!         eprintln!("{}", failure);
//!     }
//!     Ok(())
//! }
//! ```

use super::error::SchemaLoadError;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Model-card schema shipped with the crate
pub const BUNDLED_MODEL_CARD_SCHEMA: &str = include_str!("../../schema/model_card.schema.json");

/// One schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending value (empty for the document root)
    pub pointer: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pointer.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.pointer, self.message)
        }
    }
}

/// A document did not conform to the schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationFailure {
    /// Human-readable summary
    pub message: String,
    pub violations: Vec<Violation>,
}

impl ValidationFailure {
    /// Build a failure whose summary lists every violation
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let message = match violations.as_slice() {
            [] => "document does not conform to the schema".to_string(),
            [only] => only.to_string(),
            [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
        };
        Self {
            message,
            violations,
        }
    }
}

/// Pre-ingestion gate deciding whether a document may be loaded
pub trait DocumentValidator: Send + Sync {
    fn validate(&self, document: &Value) -> Result<(), ValidationFailure>;
}

/// Where the validation schema comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Url(String),
    File(PathBuf),
}

impl SchemaSource {
    /// Classify a configured schema location
    pub fn parse(source: &str) -> Self {
        let trimmed = source.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Validator backed by a compiled JSON Schema
pub struct JsonSchemaValidator {
    validator: jsonschema::Validator,
    origin: String,
}

impl JsonSchemaValidator {
    /// Fetch or read a schema and compile it
    pub async fn load(source: &SchemaSource) -> Result<Self, SchemaLoadError> {
        let origin = source.to_string();
        let schema = match source {
            SchemaSource::Url(url) => fetch_schema(url).await?,
            SchemaSource::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|source| SchemaLoadError::Read {
                        path: path.clone(),
                        source,
                    })?;
                serde_json::from_slice(&bytes).map_err(|source| SchemaLoadError::InvalidJson {
                    origin: origin.clone(),
                    source,
                })?
            }
        };

        let validator = Self::from_schema(&schema, origin)?;
        tracing::info!("Loaded validation schema from {}", validator.origin);
        Ok(validator)
    }

    /// Compile the bundled model-card schema
    pub fn bundled() -> Result<Self, SchemaLoadError> {
        let origin = "bundled model-card schema".to_string();
        let schema: Value = serde_json::from_str(BUNDLED_MODEL_CARD_SCHEMA).map_err(|source| {
            SchemaLoadError::InvalidJson {
                origin: origin.clone(),
                source,
            }
        })?;
        Self::from_schema(&schema, origin)
    }

    /// Compile an in-memory schema
    pub fn from_schema(schema: &Value, origin: impl Into<String>) -> Result<Self, SchemaLoadError> {
        let origin = origin.into();
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaLoadError::invalid_schema(origin.clone(), e))?;
        Ok(Self { validator, origin })
    }

    /// Where the compiled schema came from
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl DocumentValidator for JsonSchemaValidator {
    fn validate(&self, document: &Value) -> Result<(), ValidationFailure> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(document)
            .map(|error| Violation {
                pointer: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::from_violations(violations))
        }
    }
}

async fn fetch_schema(url: &str) -> Result<Value, SchemaLoadError> {
    let fetch_error = |source| SchemaLoadError::Fetch {
        url: url.to_string(),
        source,
    };

    tracing::debug!("Fetching validation schema from {}", url);
    reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(fetch_error)?
        .json::<Value>()
        .await
        .map_err(fetch_error)
}
