//! Loader Services
//!
//! This module contains the services that drive a load:
//!
//! - `JsonSchemaValidator` - Pre-ingestion schema gate
//! - `GraphLoader` - Maps one document and applies its write set
//! - `IngestService` - Batch orchestration with per-document failure isolation
//! - `GraphVerifier` - Post-load node and relationship counts
//!
//! Services depend on the store only through [`crate::db::GraphStore`].

pub mod error;
pub mod graph_loader;
pub mod ingest;
pub mod validator;
pub mod verifier;

pub use error::{IngestError, LoadError, SchemaLoadError};
pub use graph_loader::{GraphLoader, LoadSummary};
pub use ingest::{
    BatchReport, DocumentFailure, FailureKind, IngestOptions, IngestService, DEFAULT_EXTENSION,
};
pub use validator::{
    DocumentValidator, JsonSchemaValidator, SchemaSource, ValidationFailure, Violation,
    BUNDLED_MODEL_CARD_SCHEMA,
};
pub use verifier::{GraphVerifier, VerificationReport};
