//! Model-description document
//!
//! Typed view over one input JSON document. Free-form measurement fields stay
//! as raw JSON values; sub-records that are content-hashed (devices,
//! hyperparameters, evaluation metrics) stay as raw objects so the identity is
//! derived from exactly what the document contains.
//!
//! ## Example Document
//!
//! ```json
//! {
//!   "name": "resnet-loc-v2",
//!   "version": "2.1",
//!   "dateCreated": "2024-03-18",
//!   "size": 97.8,
//!   "author": "Vision Team",
//!   "dataset": {"name": "indoor-loc", "size": 120000},
//!   "service": {"name": "localization", "minAccuracy": 0.9, "minLatency": 40},
//!   "problemType": "regression",
//!   "architecture": {"type": "CNN"},
//!   "training": {
//!     "powerConsumptionCPU": 12.5,
//!     "evaluationMetrics": {"mae": 0.41, "percentiles": {"p50": 0.3}},
//!     "parameters": {"optimizer": "adam", "splitType": "random", "hyperparameters": {"lr": 0.001}},
//!     "device": {"CPU": "Xeon Gold", "numCores": 32, "GPU": "A100", "RAM": "256GB"}
//!   },
//!   "inference": [
//!     {"latency": 12, "batch_size": 1, "device": {"CPU": "Cortex-A76", "numCores": 4}}
//!   ]
//! }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Raw JSON object
pub type Record = Map<String, Value>;

/// Errors raised while reading a document into its typed view
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Document is not valid JSON
    #[error("Document is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Document is JSON but does not have the expected shape
    #[error("Document structure is invalid: {0}")]
    InvalidStructure(#[source] serde_json::Error),

    /// Natural key is present but empty
    #[error("Document has an empty model name")]
    EmptyName,
}

/// One model-description document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDocument {
    /// Model name (natural key)
    pub name: String,
    pub version: Value,
    pub date_created: NaiveDate,
    pub size: Value,
    pub author: String,
    pub dataset: DatasetSection,
    pub service: ServiceSection,
    pub problem_type: String,
    pub architecture: ArchitectureSection,
    pub training: TrainingSection,
    /// Inference runs, in document order
    #[serde(default)]
    pub inference: Vec<InferenceSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSection {
    pub name: String,
    pub size: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSection {
    pub name: String,
    #[serde(default)]
    pub min_accuracy: Option<Value>,
    #[serde(default)]
    pub min_latency: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectureSection {
    #[serde(rename = "type")]
    pub architecture_type: String,
}

/// Training run description
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSection {
    #[serde(default, rename = "powerConsumptionCPU")]
    pub power_consumption_cpu: Option<Value>,
    #[serde(default, rename = "powerConsumptionGPU")]
    pub power_consumption_gpu: Option<Value>,
    #[serde(default)]
    pub carbon_footprint: Option<Value>,
    /// Nested metric record, flattened onto the training node
    #[serde(default)]
    pub evaluation_metrics: Record,
    pub parameters: ParametersSection,
    /// Raw device record (hashed for identity)
    pub device: Record,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametersSection {
    #[serde(default)]
    pub optimizer: Option<Value>,
    #[serde(default)]
    pub split_type: Option<Value>,
    /// Raw hyperparameter record (hashed for identity)
    pub hyperparameters: Record,
}

/// One inference run description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceSection {
    #[serde(default)]
    pub energy_consumption: Option<Value>,
    #[serde(default)]
    pub carbon_footprint: Option<Value>,
    #[serde(default)]
    pub latency: Option<Value>,
    #[serde(default)]
    pub flops: Option<Value>,
    #[serde(default)]
    pub batch_size: Option<Value>,
    /// Raw device record (hashed for identity), empty when absent
    #[serde(default)]
    pub device: Record,
}

impl ModelDocument {
    /// Build the typed view from an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let document: ModelDocument =
            serde_json::from_value(value).map_err(DocumentError::InvalidStructure)?;

        if document.name.trim().is_empty() {
            return Err(DocumentError::EmptyName);
        }

        Ok(document)
    }

    /// Parse raw bytes into the typed view
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_slice(bytes).map_err(DocumentError::InvalidJson)?;
        Self::from_value(value)
    }

    /// Best-effort model name lookup used for error reporting
    ///
    /// Works on documents that failed validation or typed parsing.
    pub fn peek_name(value: &Value) -> Option<&str> {
        value
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
    }
}
