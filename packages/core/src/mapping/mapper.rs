//! Document to graph mapper
//!
//! # Emitted Shape
//!
//! ```text
//! (Model)-[:TRAINED_ON]->(Dataset)
//! (Model)-[:PROVIDES]->(Service)-[:SOLUTION_FOR]->(ProblemType)
//! (Model)-[:UTILIZES]->(ModelArchitecture)
//! (ModelTraining)-[:TRAINS_ON]->(Model)
//! (ModelTraining)-[:RUNS_ON]->(Device {role: "training"})
//! (ModelTraining)-[:CONTAINS]->(Parameters)
//! (ModelTraining)-[:USES]->(Hyperparameters)
//! (ModelInference)-[:INFERENCE_ON]->(Model)
//! (ModelInference)-[:RUNS_ON]->(Device {role: "inference"})
//! ```
//!
//! Optional fields that are absent are written as explicit `null` so a value
//! set by an earlier version of the document does not linger.
//!
//! ModelInference is keyed by model name, so when a document lists several
//! inference runs they all merge into one node and the last run's values win.
//! Each run's device still gets its own `RUNS_ON` edge.

use super::MappingError;
use crate::models::{
    GraphWrite, InferenceSection, ModelDocument, NodeLabel, NodeMerge, Record, RelationshipType,
};
use crate::utils::{content_identity, flatten, DeviceRole, DEFAULT_SEPARATOR};
use serde_json::{Map, Value};

/// Map one document onto its graph write set
///
/// Nodes are emitted before relationships and in document order, so applying
/// the result front to back never relates a node that does not exist yet.
///
/// # Errors
///
/// Returns [`MappingError`] when the training device lacks `CPU` or
/// `numCores`.
pub fn map_document(doc: &ModelDocument) -> Result<GraphWrite, MappingError> {
    let mut write = GraphWrite::new();

    let model = write.merge_node(NodeMerge::new(
        NodeLabel::Model,
        doc.name.as_str(),
        props([
            ("version", doc.version.clone()),
            // ISO-8601 calendar date; sorts and compares as a string
            (
                "dateCreated",
                Value::String(doc.date_created.format("%Y-%m-%d").to_string()),
            ),
            ("size", doc.size.clone()),
            ("author", Value::String(doc.author.clone())),
        ]),
    ));

    let dataset = write.merge_node(NodeMerge::new(
        NodeLabel::Dataset,
        doc.dataset.name.as_str(),
        props([("size", doc.dataset.size.clone())]),
    ));

    let service = write.merge_node(NodeMerge::new(
        NodeLabel::Service,
        doc.service.name.as_str(),
        props([
            ("minAccuracy", or_null(&doc.service.min_accuracy)),
            ("minLatency", or_null(&doc.service.min_latency)),
        ]),
    ));

    let problem_type = write.merge_node(NodeMerge::new(
        NodeLabel::ProblemType,
        doc.problem_type.as_str(),
        Map::new(),
    ));

    let architecture = write.merge_node(NodeMerge::new(
        NodeLabel::ModelArchitecture,
        doc.architecture.architecture_type.as_str(),
        Map::new(),
    ));

    let training = &doc.training;
    let mut training_props = flatten(&training.evaluation_metrics, DEFAULT_SEPARATOR, None);
    training_props.insert(
        "energyConsumptionCPU".into(),
        or_null(&training.power_consumption_cpu),
    );
    training_props.insert(
        "energyConsumptionGPU".into(),
        or_null(&training.power_consumption_gpu),
    );
    training_props.insert("carbonFootprint".into(), or_null(&training.carbon_footprint));
    let model_training = write.merge_node(NodeMerge::new(
        NodeLabel::ModelTraining,
        doc.name.as_str(),
        training_props,
    ));

    let training_device = write.merge_node(device_merge(&training.device, DeviceRole::Training)?);

    let parameters = write.merge_node(NodeMerge::new(
        NodeLabel::Parameters,
        doc.name.as_str(),
        props([
            ("optimizer", or_null(&training.parameters.optimizer)),
            ("splitType", or_null(&training.parameters.split_type)),
        ]),
    ));

    let hyperparameters_record = &training.parameters.hyperparameters;
    let hyperparameters = write.merge_node(NodeMerge::new(
        NodeLabel::Hyperparameters,
        content_identity(&Value::Object(hyperparameters_record.clone()), None),
        hyperparameters_record.clone(),
    ));

    let mut inference_edges = Vec::with_capacity(doc.inference.len());
    for run in &doc.inference {
        let inference = write.merge_node(inference_merge(&doc.name, run));
        let device = write.merge_node(device_merge(&run.device, DeviceRole::Inference)?);
        inference_edges.push((inference, device));
    }

    write.relate(&model, RelationshipType::TrainedOn, &dataset);
    write.relate(&model, RelationshipType::Provides, &service);
    write.relate(&service, RelationshipType::SolutionFor, &problem_type);
    write.relate(&model, RelationshipType::Utilizes, &architecture);
    write.relate(&model_training, RelationshipType::TrainsOn, &model);
    write.relate(&model_training, RelationshipType::RunsOn, &training_device);
    write.relate(&model_training, RelationshipType::Contains, &parameters);
    write.relate(&model_training, RelationshipType::Uses, &hyperparameters);
    for (inference, device) in &inference_edges {
        write.relate(inference, RelationshipType::InferenceOn, &model);
        write.relate(inference, RelationshipType::RunsOn, device);
    }

    Ok(write)
}

fn inference_merge(model_name: &str, run: &InferenceSection) -> NodeMerge {
    NodeMerge::new(
        NodeLabel::ModelInference,
        model_name,
        props([
            ("energyConsumption", or_null(&run.energy_consumption)),
            ("carbonFootprint", or_null(&run.carbon_footprint)),
            ("latency", or_null(&run.latency)),
            ("flops", or_null(&run.flops)),
            ("batchSize", or_null(&run.batch_size)),
        ]),
    )
}

/// Device node keyed by the role-salted digest of its raw record
fn device_merge(device: &Record, role: DeviceRole) -> Result<NodeMerge, MappingError> {
    let field = |name: &'static str| device.get(name).cloned().unwrap_or(Value::Null);

    let processor = field("CPU");
    let cores = field("numCores");
    if role == DeviceRole::Training {
        if processor.is_null() {
            return Err(MappingError::missing_device_field(role, "CPU"));
        }
        if cores.is_null() {
            return Err(MappingError::missing_device_field(role, "numCores"));
        }
    }

    let key = content_identity(&Value::Object(device.clone()), Some(role.as_str()));
    Ok(NodeMerge::new(
        NodeLabel::Device,
        key,
        props([
            ("processor", processor),
            ("cores", cores),
            ("graphicsCard", field("GPU")),
            ("memoryCapacity", field("RAM")),
            ("role", Value::String(role.as_str().to_string())),
        ]),
    ))
}

fn or_null(value: &Option<Value>) -> Value {
    value.clone().unwrap_or(Value::Null)
}

fn props<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
