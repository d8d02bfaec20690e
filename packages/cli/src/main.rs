//! ModelGraph Loader Binary
//!
//! Loads every model card under the input directory into the graph store,
//! then prints per-type node and relationship counts.
//!
//! # Usage
//!
//! ```bash
//! # Embedded store under ~/.modelgraph/database, documents in ./model_metadata
//! cargo run --bin modelgraph
//!
//! # Remote SurrealDB, fresh graph, custom schema
//! MODELGRAPH_DB_ENDPOINT=http://127.0.0.1:8000 \
//! MODELGRAPH_DB_USER=root MODELGRAPH_DB_PASSWORD=root \
//! MODELGRAPH_RESET=true MODELGRAPH_SCHEMA=./model_card_schema.json \
//! MODELGRAPH_INPUT_DIR=./cards cargo run --bin modelgraph
//! ```
//!
//! # Environment Variables
//!
//! See [`modelgraph_core::config`] for the loader settings.
//! `RUST_LOG` sets the log level (default: info).
//!
//! # Exit Status
//!
//! - `0` - every document loaded
//! - `1` - configuration, connection or store failure
//! - `2` - batch finished but some documents were skipped

use std::process::ExitCode;
use std::sync::Arc;

use modelgraph_core::db::{GraphStore, SurrealStore};
use modelgraph_core::services::{
    DocumentValidator, GraphVerifier, IngestService, JsonSchemaValidator,
};
use modelgraph_core::LoaderConfig;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run one batch; `Ok(false)` when some documents were skipped
async fn run() -> anyhow::Result<bool> {
    let config = LoaderConfig::from_env()?;

    tracing::info!("ModelGraph loader");
    tracing::info!("Store: {}", config.db_endpoint);
    tracing::info!("Input: {}", config.input_dir.display());

    // Ensure embedded database directory exists
    if let Some(path) = config.embedded_path() {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let surreal = SurrealStore::connect(
        &config.db_endpoint,
        &config.db_namespace,
        &config.db_database,
        config.credentials().as_ref(),
    )
    .await?;
    tracing::info!("Using graph store at {}", surreal.endpoint());
    let store: Arc<dyn GraphStore> = Arc::new(surreal);

    let validator = match config.schema_source() {
        Some(source) => JsonSchemaValidator::load(&source).await?,
        None => {
            tracing::info!("No schema configured, using bundled model-card schema");
            JsonSchemaValidator::bundled()?
        }
    };
    tracing::info!("Validating against schema from {}", validator.origin());
    let validator: Arc<dyn DocumentValidator> = Arc::new(validator);

    let ingest = IngestService::new(store.clone(), validator, config.ingest_options());
    let options = ingest.options();
    tracing::info!(
        "Processing .{} documents (reset before load: {})",
        options.extension,
        options.reset_before_load
    );

    let report = ingest.load_directory(&config.input_dir).await?;
    println!("{}", report);

    tracing::info!("Verifying data...");
    let verification = GraphVerifier::new(store).verify().await?;
    println!("{}", verification);

    Ok(report.is_clean())
}
