//! Tests for the document mapper
//!
//! Tests cover:
//! - Emitted node and relationship sets
//! - Content-addressed keys for devices and hyperparameters
//! - Explicit nulls for absent optional fields
//! - Inference collapse onto one node per model

#[cfg(test)]
mod tests {
    use crate::mapping::{map_document, MappingError};
    use crate::models::{ModelDocument, NodeLabel, NodeRef, RelationshipType};
    use crate::utils::{content_identity, DeviceRole};
    use serde_json::{json, Value};

    fn document(value: Value) -> ModelDocument {
        ModelDocument::from_value(value).unwrap()
    }

    fn full_document() -> Value {
        json!({
            "name": "locnet",
            "version": "3.2",
            "dateCreated": "2024-05-02",
            "size": 12.5,
            "author": "Alice",
            "dataset": {"name": "wifi-fingerprints", "size": 50000},
            "service": {"name": "indoor-positioning", "minAccuracy": 0.95, "minLatency": 20},
            "problemType": "regression",
            "architecture": {"type": "MLP"},
            "training": {
                "powerConsumptionCPU": 3.1,
                "powerConsumptionGPU": 40.2,
                "carbonFootprint": 0.8,
                "evaluationMetrics": {"mae": 1.2, "errors": {"p50": 0.9, "p90": 2.1}},
                "parameters": {
                    "optimizer": "adam",
                    "splitType": "random",
                    "hyperparameters": {"lr": 0.001, "epochs": 50}
                },
                "device": {"CPU": "Xeon", "numCores": 16, "GPU": "A100", "RAM": "128GB"}
            },
            "inference": [
                {"latency": 10, "batch_size": 1, "device": {"CPU": "Cortex-A72", "numCores": 4}},
                {"latency": 4, "flops": 2000, "device": {"CPU": "Xeon", "numCores": 16, "GPU": "A100", "RAM": "128GB"}}
            ]
        })
    }

    #[test]
    fn test_map_full_document_shape() {
        let write = map_document(&document(full_document())).unwrap();

        // 9 fixed nodes plus an inference node and device per run
        assert_eq!(write.node_count(), 13);
        // 8 fixed edges, one INFERENCE_ON, one RUNS_ON per inference device
        assert_eq!(write.relationship_count(), 11);
        assert!(write.is_endpoint_complete());

        let model = NodeRef::new(NodeLabel::Model, "locnet");
        assert!(write.relationships.iter().any(|r| r.from == model
            && r.rel_type == RelationshipType::TrainedOn
            && r.to == NodeRef::new(NodeLabel::Dataset, "wifi-fingerprints")));
        assert!(write.relationships.iter().any(|r| r.from
            == NodeRef::new(NodeLabel::Service, "indoor-positioning")
            && r.rel_type == RelationshipType::SolutionFor
            && r.to == NodeRef::new(NodeLabel::ProblemType, "regression")));
    }

    #[test]
    fn test_nodes_precede_relationship_use() {
        let write = map_document(&document(full_document())).unwrap();
        let first = write.nodes.first().unwrap();
        assert_eq!(first.label(), NodeLabel::Model);
        assert_eq!(first.properties.get("dateCreated"), Some(&json!("2024-05-02")));
        assert_eq!(first.properties.get("author"), Some(&json!("Alice")));
    }

    #[test]
    fn test_training_metrics_are_flattened() {
        let write = map_document(&document(full_document())).unwrap();
        let training = write
            .nodes_with_label(NodeLabel::ModelTraining)
            .next()
            .unwrap();

        assert_eq!(training.key(), "locnet");
        assert_eq!(training.properties.get("mae"), Some(&json!(1.2)));
        assert_eq!(training.properties.get("errors_p90"), Some(&json!(2.1)));
        assert_eq!(training.properties.get("energyConsumptionGPU"), Some(&json!(40.2)));
        assert!(training.properties.get("errors").is_none());
    }

    #[test]
    fn test_hyperparameters_are_content_addressed() {
        let write = map_document(&document(full_document())).unwrap();
        let hyper = write
            .nodes_with_label(NodeLabel::Hyperparameters)
            .next()
            .unwrap();

        let expected = content_identity(&json!({"epochs": 50, "lr": 0.001}), None);
        assert_eq!(hyper.key(), expected);
        assert_eq!(hyper.properties.get("contentHash"), Some(&json!(expected)));
        assert_eq!(hyper.properties.get("epochs"), Some(&json!(50)));
    }

    #[test]
    fn test_same_hardware_in_both_roles_yields_two_devices() {
        let write = map_document(&document(full_document())).unwrap();
        let devices: Vec<_> = write.nodes_with_label(NodeLabel::Device).collect();
        assert_eq!(devices.len(), 3);

        let hardware = json!({"CPU": "Xeon", "numCores": 16, "GPU": "A100", "RAM": "128GB"});
        let training_key = content_identity(&hardware, Some(DeviceRole::Training.as_str()));
        let inference_key = content_identity(&hardware, Some(DeviceRole::Inference.as_str()));

        assert!(devices.iter().any(|d| d.key() == training_key
            && d.properties.get("role") == Some(&json!("training"))));
        assert!(devices.iter().any(|d| d.key() == inference_key
            && d.properties.get("role") == Some(&json!("inference"))));
        assert_ne!(training_key, inference_key);
    }

    #[test]
    fn test_inference_runs_collapse_last_write_wins() {
        let write = map_document(&document(full_document())).unwrap();
        let runs: Vec<_> = write.nodes_with_label(NodeLabel::ModelInference).collect();

        // Both runs target the same node; the later merge is applied last
        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|r| r.key() == "locnet"));
        let last = runs.last().unwrap();
        assert_eq!(last.properties.get("latency"), Some(&json!(4)));
        assert_eq!(last.properties.get("batchSize"), Some(&Value::Null));

        let inference_on = write
            .relationships
            .iter()
            .filter(|r| r.rel_type == RelationshipType::InferenceOn)
            .count();
        assert_eq!(inference_on, 1);
    }

    #[test]
    fn test_absent_optional_fields_are_explicit_nulls() {
        let mut value = full_document();
        value["service"] = json!({"name": "indoor-positioning"});
        value["training"]["parameters"] = json!({"hyperparameters": {}});
        value["inference"] = json!([{}]);

        let write = map_document(&document(value)).unwrap();

        let service = write.nodes_with_label(NodeLabel::Service).next().unwrap();
        assert_eq!(service.properties.get("minAccuracy"), Some(&Value::Null));
        assert_eq!(service.properties.get("minLatency"), Some(&Value::Null));

        let params = write.nodes_with_label(NodeLabel::Parameters).next().unwrap();
        assert_eq!(params.properties.get("optimizer"), Some(&Value::Null));

        let inference_device = write
            .nodes_with_label(NodeLabel::Device)
            .find(|d| d.properties.get("role") == Some(&json!("inference")))
            .unwrap();
        assert_eq!(inference_device.properties.get("processor"), Some(&Value::Null));
        assert_eq!(
            inference_device.key(),
            content_identity(&json!({}), Some("inference"))
        );
    }

    #[test]
    fn test_identical_hyperparameters_share_key_across_documents() {
        let first = full_document();
        let mut second = full_document();
        second["name"] = json!("locnet-small");
        second["training"]["parameters"]["hyperparameters"] = json!({"epochs": 50, "lr": 0.001});

        let a = map_document(&document(first)).unwrap();
        let b = map_document(&document(second)).unwrap();

        let key_a = a.nodes_with_label(NodeLabel::Hyperparameters).next().unwrap().key();
        let key_b = b.nodes_with_label(NodeLabel::Hyperparameters).next().unwrap().key();
        assert_eq!(key_a, key_b);
    }

    #[test]
    fn test_training_device_requires_cpu_and_cores() {
        let mut value = full_document();
        value["training"]["device"] = json!({"GPU": "A100"});

        let err = map_document(&document(value)).unwrap_err();
        assert_eq!(
            err,
            MappingError::missing_device_field(DeviceRole::Training, "CPU")
        );
        assert_eq!(err.to_string(), "training device is missing required field 'CPU'");
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let a = map_document(&document(full_document())).unwrap();
        let b = map_document(&document(full_document())).unwrap();
        assert_eq!(a, b);
    }
}
