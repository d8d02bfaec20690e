//! Batch Ingest Service
//!
//! Enumerates model documents under a root directory and loads them one at a
//! time. A document that cannot be read, parsed, validated or written is
//! recorded in the [`BatchReport`] and the batch moves on; only a store
//! failure that makes further writes pointless ends the batch early.
//!
//! # Pipeline (per document)
//!
//! 1. Read the file ([`FailureKind::Unreadable`])
//! 2. Parse JSON ([`FailureKind::Malformed`])
//! 3. Validate against the schema ([`FailureKind::Validation`])
//! 4. Build the typed view and map it ([`FailureKind::Malformed`])
//! 5. Apply the write set ([`FailureKind::Write`])
//!
//! Documents are processed sequentially in sorted path order, so two
//! documents never race on the same content-addressed node.

use super::error::{IngestError, LoadError};
use super::graph_loader::GraphLoader;
use super::validator::DocumentValidator;
use crate::db::{DatabaseError, GraphStore};
use crate::models::{GraphSchema, ModelDocument};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Default document file extension
pub const DEFAULT_EXTENSION: &str = "json";

/// Batch behaviour switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// File extension (without the dot) of documents to load
    pub extension: String,
    /// Clear the whole graph before loading
    pub reset_before_load: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            reset_before_load: false,
        }
    }
}

/// Why a document was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Unreadable,
    Malformed,
    Validation,
    Write,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Unreadable => "unreadable",
            FailureKind::Malformed => "malformed",
            FailureKind::Validation => "validation",
            FailureKind::Write => "write",
        };
        f.write_str(label)
    }
}

/// One skipped document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    pub path: PathBuf,
    /// Model name, when it could be read from the document
    pub model: Option<String>,
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        if let Some(model) = &self.model {
            write!(f, " ({})", model)?;
        }
        write!(f, " [{}]: {}", self.kind, self.message)
    }
}

/// Outcome of one batch
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Documents picked up for processing
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<DocumentFailure>,
    /// Names of loaded models, in load order
    pub loaded: Vec<String>,
    pub duration: Duration,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Processed {} documents in {} ms: {} succeeded, {} failed",
            self.attempted,
            self.duration.as_millis(),
            self.succeeded,
            self.failed()
        )?;
        for failure in &self.failures {
            writeln!(f, "  - {}", failure)?;
        }
        Ok(())
    }
}

/// Per-document result inside a batch
enum DocumentError {
    Skipped(DocumentFailure),
    Fatal(DatabaseError),
}

/// Orchestrates validation and loading of a batch of documents
pub struct IngestService {
    store: Arc<dyn GraphStore>,
    loader: GraphLoader,
    validator: Arc<dyn DocumentValidator>,
    options: IngestOptions,
    schema: GraphSchema,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn GraphStore>,
        validator: Arc<dyn DocumentValidator>,
        options: IngestOptions,
    ) -> Self {
        Self {
            loader: GraphLoader::new(store.clone()),
            store,
            validator,
            options,
            schema: GraphSchema::default(),
        }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Reset the graph if requested, then install constraints
    ///
    /// Must run before the first document of a batch.
    pub async fn prepare(&self) -> Result<(), DatabaseError> {
        if self.options.reset_before_load {
            tracing::info!("Cleaning up graph before load");
            self.store.reset(&self.schema).await?;
        }

        tracing::info!("Creating constraints");
        self.store.ensure_schema(&self.schema).await
    }

    /// Recursively find documents under `root`, sorted by path
    pub fn collect_documents(&self, root: &Path) -> Result<Vec<PathBuf>, IngestError> {
        if !root.is_dir() {
            return Err(IngestError::invalid_root(root));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.has_document_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Load every document under `root` into an already prepared store
    pub async fn ingest_directory(&self, root: &Path) -> Result<BatchReport, IngestError> {
        let files = self.collect_documents(root)?;
        tracing::info!(
            "Found {} .{} documents under {}",
            files.len(),
            self.options.extension,
            root.display()
        );
        self.ingest_files(&files).await
    }

    /// Prepare the store and load every document under `root`
    ///
    /// The root is enumerated before anything is written, so a missing or
    /// unreadable input directory never clears the graph.
    pub async fn load_directory(&self, root: &Path) -> Result<BatchReport, IngestError> {
        let files = self.collect_documents(root)?;
        tracing::info!(
            "Found {} .{} documents under {}",
            files.len(),
            self.options.extension,
            root.display()
        );

        self.prepare().await?;
        self.ingest_files(&files).await
    }

    /// Load an explicit list of documents, in the given order
    pub async fn ingest_files(&self, files: &[PathBuf]) -> Result<BatchReport, IngestError> {
        let start = Instant::now();
        let mut report = BatchReport::default();

        for path in files {
            report.attempted += 1;

            match self.ingest_file(path).await {
                Ok(model) => {
                    report.succeeded += 1;
                    report.loaded.push(model);
                }
                Err(DocumentError::Skipped(failure)) => {
                    tracing::warn!("Error processing {}", failure);
                    report.failures.push(failure);
                }
                Err(DocumentError::Fatal(e)) => {
                    tracing::error!(
                        "Aborting batch at {} after {} documents: {}",
                        path.display(),
                        report.succeeded,
                        e
                    );
                    return Err(IngestError::Store(e));
                }
            }
        }

        report.duration = start.elapsed();
        tracing::info!(
            "Batch complete: {} attempted, {} succeeded, {} failed ({} ms)",
            report.attempted,
            report.succeeded,
            report.failed(),
            report.duration.as_millis()
        );
        Ok(report)
    }

    async fn ingest_file(&self, path: &Path) -> Result<String, DocumentError> {
        let skip = |model: Option<&str>, kind: FailureKind, message: String| {
            DocumentError::Skipped(DocumentFailure {
                path: path.to_path_buf(),
                model: model.map(str::to_string),
                kind,
                message,
            })
        };

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| skip(None, FailureKind::Unreadable, e.to_string()))?;

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| skip(None, FailureKind::Malformed, e.to_string()))?;

        let model = ModelDocument::peek_name(&value).map(str::to_string);
        let model = model.as_deref();

        self.validator
            .validate(&value)
            .map_err(|failure| skip(model, FailureKind::Validation, failure.message))?;

        let document = ModelDocument::from_value(value)
            .map_err(|e| skip(model, FailureKind::Malformed, e.to_string()))?;

        tracing::info!("Processing: {}", document.name);

        match self.loader.load_document(&document).await {
            Ok(summary) => Ok(summary.model),
            Err(LoadError::Store(e)) if e.is_fatal() => Err(DocumentError::Fatal(e)),
            Err(e @ LoadError::Mapping(_)) => {
                Err(skip(model, FailureKind::Malformed, e.to_string()))
            }
            Err(e) => Err(skip(model, FailureKind::Write, e.to_string())),
        }
    }

    fn has_document_extension(&self, path: &Path) -> bool {
        let wanted = self.options.extension.trim_start_matches('.');
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
    }
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod ingest_test;
