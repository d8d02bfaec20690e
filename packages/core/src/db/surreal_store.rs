//! SurrealStore - GraphStore Implementation for SurrealDB Backend
//!
//! This module implements the `GraphStore` trait on SurrealDB, either embedded
//! (RocksDB) or remote over HTTP.
//!
//! # Storage Layout
//!
//! 1. **Node tables** - one SCHEMALESS table per label; record ID is the
//!    node's identity key (`Model:⟨resnet-50⟩`, `Device:⟨9f2c…⟩`)
//! 2. **Relationship tables** - one `TYPE RELATION` table per relationship
//!    type (`TRAINED_ON`, `RUNS_ON`, …)
//! 3. **Unique indexes** - one per label on its key property, and one per
//!    relationship table on `in, out`
//!
//! # Design Principles
//!
//! 1. **Record IDs are keys**: a node can only ever exist once per key, so
//!    `UPSERT … MERGE` is a merge-or-create by construction
//! 2. **One transaction per document**: a write set is sent as a single
//!    `BEGIN … COMMIT` block
//! 3. **Check before RELATE**: an edge is only created when no edge of the
//!    same type joins the same endpoints; the endpoint index rejects any
//!    other writer that tries
//!
//! # Examples
//!
//! ```rust,no_run
//! use modelgraph_core::db::{GraphStore, StoreCredentials, SurrealStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Embedded store
//!     let local = SurrealStore::new_embedded("./data/graph.db").await?;
//!
//!     // Remote store
//!     let remote = SurrealStore::connect(
//!         "http://127.0.0.1:8000",
//!         "modelgraph",
//!         "graph",
//!         Some(&StoreCredentials::new("root", "root")),
//!     )
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

use super::{DatabaseError, GraphStore};
use crate::models::{GraphSchema, GraphWrite, NodeLabel, NodeRef, RelationshipType};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

/// Default namespace for loader data
pub const DEFAULT_NAMESPACE: &str = "modelgraph";

/// Default database for loader data
pub const DEFAULT_DATABASE: &str = "graph";

/// Field SurrealDB reserves for the record ID
const RESERVED_ID_FIELD: &str = "id";

/// Root credentials for a remote store
#[derive(Clone)]
pub struct StoreCredentials {
    pub username: String,
    pub password: String,
}

impl StoreCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

/// SurrealStore implements GraphStore on SurrealDB
pub struct SurrealStore {
    /// SurrealDB connection (any engine: rocksdb, http, https)
    db: Arc<Surreal<Any>>,
    endpoint: String,
}

impl SurrealStore {
    /// Connect to a SurrealDB endpoint
    ///
    /// # Arguments
    ///
    /// * `endpoint` - `rocksdb://<path>`, `http://host:port` or `https://host:port`
    /// * `namespace` / `database` - Target namespace and database
    /// * `credentials` - Root credentials; required by most remote servers
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::ConnectionFailed`] if the endpoint cannot be
    /// opened, signed in to, or switched to the namespace/database.
    pub async fn connect(
        endpoint: &str,
        namespace: &str,
        database: &str,
        credentials: Option<&StoreCredentials>,
    ) -> Result<Self, DatabaseError> {
        let db = any::connect(endpoint)
            .await
            .map_err(|e| DatabaseError::connection_failed(endpoint, e))?;

        if let Some(credentials) = credentials {
            db.signin(Root {
                username: &credentials.username,
                password: &credentials.password,
            })
            .await
            .map_err(|e| DatabaseError::connection_failed(endpoint, e))?;
        }

        db.use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e| DatabaseError::connection_failed(endpoint, e))?;

        tracing::debug!(
            "Connected to SurrealDB at {} ({}/{})",
            endpoint,
            namespace,
            database
        );

        Ok(Self {
            db: Arc::new(db),
            endpoint: endpoint.to_string(),
        })
    }

    /// Open an embedded RocksDB store at `db_path` using the default
    /// namespace and database
    pub async fn new_embedded(db_path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let endpoint = format!("rocksdb://{}", db_path.as_ref().display());
        Self::connect(&endpoint, DEFAULT_NAMESPACE, DEFAULT_DATABASE, None).await
    }

    /// Endpoint this store is connected to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Read a node's stored properties (record ID omitted)
    pub async fn get_node(&self, node: &NodeRef) -> Result<Option<Map<String, Value>>, DatabaseError> {
        let context = format!("get_node {}", node);
        let response = self
            .db
            .query("SELECT * OMIT id FROM type::thing($tb, $key);")
            .bind(("tb", node.label.as_str()))
            .bind(("key", node.key.clone()))
            .await
            .map_err(|e| DatabaseError::from_send(&context, e))?;

        let mut response = response
            .check()
            .map_err(|e| DatabaseError::query_failed(&context, e))?;

        let record: Option<Value> = response
            .take(0)
            .map_err(|e| DatabaseError::decode(&context, e))?;

        Ok(record.and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        }))
    }

    /// Run a parameterless statement block and check every statement
    async fn execute(&self, context: &str, sql: String) -> Result<(), DatabaseError> {
        let response = self
            .db
            .query(sql)
            .await
            .map_err(|e| DatabaseError::from_send(context, e))?;

        response
            .check()
            .map_err(|e| DatabaseError::query_failed(context, e))?;

        Ok(())
    }
}

/// Quote an identifier for SurrealQL
fn ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "\\`"))
}

/// Unique index over a relationship table's endpoints
fn endpoint_index(rel_type: RelationshipType) -> String {
    format!("{}_endpoints", rel_type.as_str().to_ascii_lowercase())
}

/// Build the transaction block and bindings for one write set
///
/// Labels and relationship types come from closed enums and are inlined as
/// identifiers; every key and property value is bound as a parameter.
fn build_apply_query(write: &GraphWrite) -> (String, Vec<(String, Value)>) {
    let mut sql = String::from("BEGIN TRANSACTION;\n");
    let mut bindings = Vec::with_capacity(write.nodes.len() * 3 + write.relationships.len() * 4);

    for (i, merge) in write.nodes.iter().enumerate() {
        let mut properties = merge.properties.clone();
        if properties.remove(RESERVED_ID_FIELD).is_some() {
            tracing::debug!(
                "Dropped reserved '{}' property from {}",
                RESERVED_ID_FIELD,
                merge.node
            );
        }

        sql.push_str(&format!(
            "UPSERT type::thing($n{i}_tb, $n{i}_key) MERGE $n{i}_props;\n"
        ));
        bindings.push((format!("n{i}_tb"), Value::from(merge.label().as_str())));
        bindings.push((format!("n{i}_key"), Value::from(merge.key())));
        bindings.push((format!("n{i}_props"), Value::Object(properties)));
    }

    // The endpoint index makes the lookup cheap and rejects any duplicate
    // that slips past it
    for (i, rel) in write.relationships.iter().enumerate() {
        let table = ident(rel.rel_type.as_str());
        sql.push_str(&format!(
            "LET $r{i}_from = type::thing($r{i}_ftb, $r{i}_fkey);\n\
             LET $r{i}_to = type::thing($r{i}_ttb, $r{i}_tkey);\n\
             LET $r{i}_existing = (SELECT VALUE id FROM {table} WHERE in = $r{i}_from AND out = $r{i}_to);\n\
             IF array::len($r{i}_existing) = 0 {{ RELATE $r{i}_from->{table}->$r{i}_to; }};\n"
        ));
        bindings.push((format!("r{i}_ftb"), Value::from(rel.from.label.as_str())));
        bindings.push((format!("r{i}_fkey"), Value::from(rel.from.key.as_str())));
        bindings.push((format!("r{i}_ttb"), Value::from(rel.to.label.as_str())));
        bindings.push((format!("r{i}_tkey"), Value::from(rel.to.key.as_str())));
    }

    sql.push_str("COMMIT TRANSACTION;\n");
    (sql, bindings)
}

/// Tables, key indexes and endpoint indexes for a schema
fn build_schema_query(schema: &GraphSchema) -> String {
    let mut sql = String::new();

    for constraint in schema.constraints() {
        let table = ident(constraint.label.as_str());
        sql.push_str(&format!("DEFINE TABLE IF NOT EXISTS {table} SCHEMALESS;\n"));
        sql.push_str(&format!(
            "DEFINE INDEX IF NOT EXISTS {} ON TABLE {table} FIELDS {} UNIQUE;\n",
            ident(&constraint.name()),
            ident(constraint.property)
        ));
    }

    for rel_type in &schema.relationship_types {
        let table = ident(rel_type.as_str());
        sql.push_str(&format!(
            "DEFINE TABLE IF NOT EXISTS {table} SCHEMALESS TYPE RELATION;\n"
        ));
        sql.push_str(&format!(
            "DEFINE INDEX IF NOT EXISTS {} ON TABLE {table} FIELDS in, out UNIQUE;\n",
            ident(&endpoint_index(*rel_type))
        ));
    }

    sql
}

#[async_trait]
impl GraphStore for SurrealStore {
    async fn ensure_schema(&self, schema: &GraphSchema) -> Result<(), DatabaseError> {
        self.execute("ensure_schema", build_schema_query(schema)).await?;
        tracing::info!(
            "Installed {} uniqueness constraints and {} relationship tables with endpoint indexes",
            schema.labels.len(),
            schema.relationship_types.len()
        );
        Ok(())
    }

    async fn reset(&self, schema: &GraphSchema) -> Result<(), DatabaseError> {
        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for rel_type in &schema.relationship_types {
            sql.push_str(&format!("DELETE {};\n", ident(rel_type.as_str())));
        }
        for label in &schema.labels {
            sql.push_str(&format!("DELETE {};\n", ident(label.as_str())));
        }
        sql.push_str("COMMIT TRANSACTION;\n");

        self.execute("reset", sql).await?;
        tracing::info!("Cleared all nodes and relationships");
        Ok(())
    }

    async fn apply(&self, write: &GraphWrite) -> Result<(), DatabaseError> {
        if write.is_empty() {
            return Ok(());
        }

        let (sql, bindings) = build_apply_query(write);
        tracing::debug!(
            "Applying write set: {} nodes, {} relationships",
            write.node_count(),
            write.relationship_count()
        );

        let mut query = self.db.query(sql);
        for binding in bindings {
            query = query.bind(binding);
        }

        let response = query
            .await
            .map_err(|e| DatabaseError::from_send("apply", e))?;

        response
            .check()
            .map_err(|e| DatabaseError::query_failed("apply", e))?;

        Ok(())
    }

    async fn count_nodes(&self, label: NodeLabel) -> Result<u64, DatabaseError> {
        let sql = format!(
            "SELECT count() AS count FROM {} GROUP ALL;",
            ident(label.as_str())
        );
        self.count(&format!("count_nodes {}", label), sql).await
    }

    async fn count_relationships(
        &self,
        rel_type: RelationshipType,
    ) -> Result<u64, DatabaseError> {
        let sql = format!(
            "SELECT count() AS count FROM {} GROUP ALL;",
            ident(rel_type.as_str())
        );
        self.count(&format!("count_relationships {}", rel_type), sql)
            .await
    }
}

impl SurrealStore {
    async fn count(&self, context: &str, sql: String) -> Result<u64, DatabaseError> {
        let response = self
            .db
            .query(sql)
            .await
            .map_err(|e| DatabaseError::from_send(context, e))?;

        let mut response = response
            .check()
            .map_err(|e| DatabaseError::query_failed(context, e))?;

        let row: Option<CountRow> = response
            .take(0)
            .map_err(|e| DatabaseError::decode(context, e))?;

        Ok(row.map(|r| r.count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeMerge;
    use serde_json::json;
    use tempfile::TempDir;

    async fn create_test_store() -> anyhow::Result<(SurrealStore, TempDir)> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test_surreal.db");
        let store = SurrealStore::new_embedded(db_path).await?;
        store.ensure_schema(&GraphSchema::default()).await?;
        Ok((store, temp_dir))
    }

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_build_apply_query_binds_every_value() {
        let mut write = GraphWrite::new();
        let model = write.merge_node(NodeMerge::new(
            NodeLabel::Model,
            "m'; DELETE Model; --",
            props(json!({"id": "spoof", "author": "x"})),
        ));
        let dataset = write.merge_node(NodeMerge::new(NodeLabel::Dataset, "d", Map::new()));
        write.relate(&model, RelationshipType::TrainedOn, &dataset);

        let (sql, bindings) = build_apply_query(&write);

        assert!(sql.starts_with("BEGIN TRANSACTION;"));
        assert!(sql.trim_end().ends_with("COMMIT TRANSACTION;"));
        assert!(!sql.contains("DELETE Model"));
        assert!(sql.contains("RELATE $r0_from->`TRAINED_ON`->$r0_to;"));
        assert_eq!(bindings.len(), 2 * 3 + 4);

        let model_props = bindings
            .iter()
            .find(|(name, _)| name == "n0_props")
            .map(|(_, value)| value.clone())
            .unwrap();
        assert!(model_props.get("id").is_none());
        assert_eq!(model_props.get("name"), Some(&json!("m'; DELETE Model; --")));
    }

    #[tokio::test]
    async fn test_merge_node_is_idempotent() -> anyhow::Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        let mut write = GraphWrite::new();
        write.merge_node(NodeMerge::new(
            NodeLabel::Dataset,
            "imagenet",
            props(json!({"size": 1000})),
        ));

        store.apply(&write).await?;
        store.apply(&write).await?;

        assert_eq!(store.count_nodes(NodeLabel::Dataset).await?, 1);
        let stored = store
            .get_node(&NodeRef::new(NodeLabel::Dataset, "imagenet"))
            .await?
            .unwrap();
        assert_eq!(stored.get("size"), Some(&json!(1000)));
        assert_eq!(stored.get("name"), Some(&json!("imagenet")));
        Ok(())
    }

    #[tokio::test]
    async fn test_relationship_not_duplicated() -> anyhow::Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        let mut write = GraphWrite::new();
        let model = write.merge_node(NodeMerge::new(NodeLabel::Model, "m", Map::new()));
        let arch = write.merge_node(NodeMerge::new(
            NodeLabel::ModelArchitecture,
            "CNN",
            Map::new(),
        ));
        write.relate(&model, RelationshipType::Utilizes, &arch);

        store.apply(&write).await?;
        store.apply(&write).await?;

        assert_eq!(
            store.count_relationships(RelationshipType::Utilizes).await?,
            1
        );
        Ok(())
    }

    #[test]
    fn test_schema_query_indexes_relationship_endpoints() {
        let sql = build_schema_query(&GraphSchema::default());

        assert!(sql.contains(
            "DEFINE INDEX IF NOT EXISTS `runs_on_endpoints` ON TABLE `RUNS_ON` FIELDS in, out UNIQUE;"
        ));
        assert_eq!(
            sql.matches("FIELDS in, out UNIQUE").count(),
            RelationshipType::ALL.len()
        );
    }

    #[tokio::test]
    async fn test_unguarded_relate_rejected_by_endpoint_index() -> anyhow::Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        let mut write = GraphWrite::new();
        let model = write.merge_node(NodeMerge::new(NodeLabel::Model, "m", Map::new()));
        let arch = write.merge_node(NodeMerge::new(
            NodeLabel::ModelArchitecture,
            "CNN",
            Map::new(),
        ));
        write.relate(&model, RelationshipType::Utilizes, &arch);
        store.apply(&write).await?;

        // A writer that skips the existence check still cannot add a second edge
        let response = store
            .db
            .query(
                "LET $from = type::thing('Model', 'm'); \
                 LET $to = type::thing('ModelArchitecture', 'CNN'); \
                 RELATE $from->`UTILIZES`->$to;",
            )
            .await?;
        assert!(response.check().is_err());

        assert_eq!(
            store.count_relationships(RelationshipType::Utilizes).await?,
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_overwrites_mutable_properties() -> anyhow::Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        let mut first = GraphWrite::new();
        first.merge_node(NodeMerge::new(
            NodeLabel::Service,
            "localization",
            props(json!({"minAccuracy": 0.9, "minLatency": 30})),
        ));
        store.apply(&first).await?;

        let mut second = GraphWrite::new();
        second.merge_node(NodeMerge::new(
            NodeLabel::Service,
            "localization",
            props(json!({"minAccuracy": 0.95, "minLatency": null})),
        ));
        store.apply(&second).await?;

        let stored = store
            .get_node(&NodeRef::new(NodeLabel::Service, "localization"))
            .await?
            .unwrap();
        assert_eq!(stored.get("minAccuracy"), Some(&json!(0.95)));
        // Cleared either to null or removed, never left stale
        assert_ne!(stored.get("minLatency"), Some(&json!(30)));
        assert_eq!(store.count_nodes(NodeLabel::Service).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_clears_graph_but_keeps_schema() -> anyhow::Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        let mut write = GraphWrite::new();
        let model = write.merge_node(NodeMerge::new(NodeLabel::Model, "m", Map::new()));
        let problem = write.merge_node(NodeMerge::new(
            NodeLabel::ProblemType,
            "classification",
            Map::new(),
        ));
        write.relate(&model, RelationshipType::Provides, &problem);
        store.apply(&write).await?;

        store.reset(&GraphSchema::default()).await?;

        assert_eq!(store.count_nodes(NodeLabel::Model).await?, 0);
        assert_eq!(store.count_relationships(RelationshipType::Provides).await?, 0);

        // Constraints survive a reset; defining them again is a no-op
        store.ensure_schema(&GraphSchema::default()).await?;
        store.apply(&write).await?;
        assert_eq!(store.count_nodes(NodeLabel::Model).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_node_reads_as_none() -> anyhow::Result<()> {
        let (store, _temp_dir) = create_test_store().await?;
        let missing = store
            .get_node(&NodeRef::new(NodeLabel::Model, "nope"))
            .await?;
        assert!(missing.is_none());
        Ok(())
    }
}
