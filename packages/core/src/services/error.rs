//! Service Layer Error Types
//!
//! This module defines error types for loader services. Document-scoped
//! failures are recorded and skipped by the batch orchestrator; store
//! connectivity failures end the batch.

use crate::db::DatabaseError;
use crate::mapping::MappingError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to load one document into the store
#[derive(Error, Debug)]
pub enum LoadError {
    /// Document could not be mapped onto the graph schema
    #[error("Mapping failed: {0}")]
    Mapping(#[from] MappingError),

    /// Store rejected or could not apply the write set
    #[error("Store write failed: {0}")]
    Store(#[from] DatabaseError),
}

impl LoadError {
    /// Whether the error should abort the whole batch
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Mapping(_) => false,
            Self::Store(e) => e.is_fatal(),
        }
    }
}

/// Batch-level ingest errors
///
/// Per-document problems never surface here; they are collected in the
/// batch report instead.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Store failed in a way that makes continuing pointless
    #[error("Graph store failure: {0}")]
    Store(#[from] DatabaseError),

    /// Input root does not exist or is not a directory
    #[error("Invalid input directory: {}", path.display())]
    InvalidRoot { path: PathBuf },
}

impl IngestError {
    /// Create an invalid root error
    pub fn invalid_root(path: impl Into<PathBuf>) -> Self {
        Self::InvalidRoot { path: path.into() }
    }
}

/// Failure to obtain or compile a validation schema
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// Remote schema could not be fetched
    #[error("Failed to fetch schema from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Local schema file could not be read
    #[error("Failed to read schema file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema source is not JSON
    #[error("Schema from {origin} is not valid JSON: {source}")]
    InvalidJson {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// Schema is JSON but not a usable JSON Schema
    #[error("Schema from {origin} could not be compiled: {message}")]
    InvalidSchema { origin: String, message: String },
}

impl SchemaLoadError {
    /// Create an invalid schema error
    pub fn invalid_schema(origin: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidSchema {
            origin: origin.into(),
            message: message.to_string(),
        }
    }
}
