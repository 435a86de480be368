// [libs/infra/graph-store/src/repository.rs]
//! Typed property graph operations: node/edge upsert, atomic batch,
//! queries, stats, scope-filtered export, mission deletion (§4.2).

use crate::client::GraphStoreClient;
use crate::errors::GraphError;
use chrono::{DateTime, Utc};
use libsql::{params, Connection, Row};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use warden_graph_model::edge::{Edge, EdgeRelation};
use warden_graph_model::evidence::Evidence;
use warden_graph_model::node::{clamp_score_fields, Node, NodeType, PropertyBag};
use warden_graph_model::scope::{extract_host, is_in_scope, is_reserved_example_domain};
use warden_graph_model::sink::{GraphEventSink, NullGraphEventSink};
use warden_graph_model::EventType;

pub struct GraphRepository {
    client: GraphStoreClient,
    sink: Arc<dyn GraphEventSink>,
}

#[derive(Debug, Clone, Default)]
pub struct GraphStats {
    pub total_nodes: u64,
    pub total_edges: u64,
    pub nodes_by_type: HashMap<String, u64>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchCounts {
    pub nodes_upserted: usize,
    pub edges_upserted: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DeletionCounts {
    pub nodes_deleted: u64,
    pub edges_deleted: u64,
}

#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphRepository {
    pub fn new(client: GraphStoreClient) -> Self {
        Self { client, sink: Arc::new(NullGraphEventSink) }
    }

    /// Wires a bus handle so every successful write also publishes its
    /// matching mutation event (§4.1, §4.2). Production code goes
    /// through this; most tests use `new` and never look at the bus.
    pub fn with_sink(client: GraphStoreClient, sink: Arc<dyn GraphEventSink>) -> Self {
        Self { client, sink }
    }

    /// Inserts `node` or, if its id already exists in this mission,
    /// merges properties/evidence into the stored row (§4.2,
    /// "Upsert semantics"). Rejects nodes whose id falls outside the
    /// mission's scope (§3 invariant 2). Emits `NODE_ADDED` on a fresh
    /// insert, `NODE_UPDATED` on a merge.
    #[instrument(skip(self, node), fields(node_id = %node.id))]
    pub async fn upsert_node(&self, node: Node, apex_domain: &str) -> Result<Node, GraphError> {
        if node.node_type.is_scope_checked() {
            enforce_scope(&node.id, apex_domain)?;
        }
        let mission_id = node.mission_id.clone();
        let connection = self.client.connection()?;
        let (merged, was_new) = upsert_node_on(&connection, node).await?;
        let event_type = if was_new { EventType::NodeAdded } else { EventType::NodeUpdated };
        self.sink.emit(event_type, &mission_id, serde_json::json!({"node": &merged}));
        Ok(merged)
    }

    /// Applies a partial property patch to an existing node, returning
    /// the node's state before and after the patch. Emits
    /// `NODE_UPDATED` on success.
    #[instrument(skip(self, patch))]
    pub async fn patch_node(&self, mission_id: &str, node_id: &str, patch: PropertyBag) -> Result<(Node, Node), GraphError> {
        let connection = self.client.connection()?;
        let existing = fetch_node(&connection, mission_id, node_id)
            .await?
            .ok_or_else(|| GraphError::NotFound(node_id.to_string()))?;
        let before = existing.clone();
        let mut after = existing;
        after.merge_in_place(patch, Vec::new());
        write_node(&connection, &after).await?;
        self.sink.emit(EventType::NodeUpdated, mission_id, serde_json::json!({"node": &after}));
        Ok((before, after))
    }

    /// Inserts `edge` if no edge with the same deterministic id exists
    /// yet; otherwise leaves the stored edge untouched (§4.2,
    /// "upsertEdge ... is idempotent: repeated identical calls add at
    /// most one edge"). Emits `EDGE_ADDED` only on the call that
    /// actually inserts the row.
    #[instrument(skip(self, edge), fields(edge_id = %edge.id))]
    pub async fn upsert_edge(&self, edge: Edge) -> Result<Edge, GraphError> {
        let connection = self.client.connection()?;
        let mission_id = edge.mission_id.clone();
        let (edge, was_new) = upsert_edge_on(&connection, edge).await?;
        if was_new {
            self.sink.emit(EventType::EdgeAdded, &mission_id, serde_json::json!({"edge": &edge}));
        }
        Ok(edge)
    }

    /// Commits `nodes` and `edges` in a single transaction. If any row
    /// fails validation, the whole batch is rolled back and the store
    /// is left exactly as it was before the call (§4.2, invariant
    /// 6, and S6: a batch with one bad row fails entirely). On a
    /// successful commit, emits one `NODES_BATCH` if `nodes` was
    /// non-empty and/or one `EDGES_BATCH` if `edges` was non-empty --
    /// never a per-row event for the rows inside the batch.
    #[instrument(skip(self, nodes, edges), fields(mission_id, node_count = nodes.len(), edge_count = edges.len()))]
    pub async fn batch_upsert(&self, mission_id: &str, nodes: Vec<Node>, edges: Vec<Edge>, apex_domain: &str) -> Result<BatchCounts, GraphError> {
        for node in &nodes {
            if node.mission_id != mission_id {
                return Err(GraphError::BadProperty {
                    node_id: node.id.clone(),
                    reason: "mission_id mismatch in batch".to_string(),
                });
            }
            if node.node_type.is_scope_checked() {
                enforce_scope(&node.id, apex_domain)?;
            }
        }

        let mut connection = self.client.connection()?;
        let transaction = connection.transaction().await?;

        for node in &nodes {
            upsert_node_on(&transaction, node.clone()).await?;
        }
        for edge in &edges {
            upsert_edge_on(&transaction, edge.clone()).await?;
        }

        transaction.commit().await?;
        info!("batch committed: {} nodes, {} edges", nodes.len(), edges.len());
        if !nodes.is_empty() {
            self.sink.emit(EventType::NodesBatch, mission_id, serde_json::json!({"nodes_upserted": nodes.len()}));
        }
        if !edges.is_empty() {
            self.sink.emit(EventType::EdgesBatch, mission_id, serde_json::json!({"edges_upserted": edges.len()}));
        }
        Ok(BatchCounts {
            nodes_upserted: nodes.len(),
            edges_upserted: edges.len(),
        })
    }

    #[instrument(skip(self))]
    pub async fn query_nodes(
        &self,
        mission_id: &str,
        node_types: Option<&[NodeType]>,
        risk_score_min: Option<f64>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Node>, u64), GraphError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query("SELECT id, mission_id, node_type, properties, evidence, created_at, updated_at FROM nodes WHERE mission_id = ?1", params![mission_id.to_string()])
            .await?;

        let mut matched = Vec::new();
        while let Some(row) = rows.next().await? {
            let node = row_to_node(&row)?;
            if let Some(types) = node_types {
                if !types.contains(&node.node_type) {
                    continue;
                }
            }
            if let Some(min) = risk_score_min {
                let risk = node.properties.get("risk_score").and_then(Value::as_f64).unwrap_or(0.0);
                if risk < min {
                    continue;
                }
            }
            matched.push(node);
        }

        let total = matched.len() as u64;
        let page = matched.into_iter().skip(offset as usize).take(limit as usize).collect();
        Ok((page, total))
    }

    #[instrument(skip(self))]
    pub async fn get_edges(&self, mission_id: &str) -> Result<Vec<Edge>, GraphError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query("SELECT id, relation, source_id, target_id, mission_id, properties, created_at, dangling FROM edges WHERE mission_id = ?1", params![mission_id.to_string()])
            .await?;
        let mut edges = Vec::new();
        while let Some(row) = rows.next().await? {
            edges.push(row_to_edge(&row)?);
        }
        Ok(edges)
    }

    #[instrument(skip(self))]
    pub async fn stats(&self, mission_id: &str) -> Result<GraphStats, GraphError> {
        let connection = self.client.connection()?;
        let mut stats = GraphStats::default();

        let mut node_rows = connection
            .query("SELECT node_type, COUNT(*) FROM nodes WHERE mission_id = ?1 GROUP BY node_type", params![mission_id.to_string()])
            .await?;
        while let Some(row) = node_rows.next().await? {
            let node_type: String = row.get(0).map_err(|e| GraphError::Mapping(e.to_string()))?;
            let count: i64 = row.get(1).map_err(|e| GraphError::Mapping(e.to_string()))?;
            stats.total_nodes += count as u64;
            stats.nodes_by_type.insert(node_type, count as u64);
        }

        let mut edge_rows = connection.query("SELECT COUNT(*) FROM edges WHERE mission_id = ?1", params![mission_id.to_string()]).await?;
        if let Some(row) = edge_rows.next().await? {
            let count: i64 = row.get(0).map_err(|e| GraphError::Mapping(e.to_string()))?;
            stats.total_edges = count as u64;
        }

        Ok(stats)
    }

    /// Returns the nodes/edges visible to an external consumer: the
    /// reserved `example.com`/`example.org` hosts and anything outside
    /// the mission's target domain are dropped even if they somehow
    /// made it into storage (§4.2, "Scope filtering at export").
    #[instrument(skip(self))]
    pub async fn export_snapshot(&self, mission_id: &str, apex_domain: &str) -> Result<GraphSnapshot, GraphError> {
        let (nodes, _total) = self.query_nodes(mission_id, None, None, u32::MAX, 0).await?;
        let in_scope_nodes: Vec<Node> = nodes
            .into_iter()
            .filter(|node| match extract_host(&node.id) {
                Some(host) => !is_reserved_example_domain(&host) && is_in_scope(&host, apex_domain),
                None => true,
            })
            .collect();
        let kept_ids: std::collections::HashSet<&str> = in_scope_nodes.iter().map(|n| n.id.as_str()).collect();

        let edges = self.get_edges(mission_id).await?;
        let in_scope_edges = edges
            .into_iter()
            .filter(|edge| kept_ids.contains(edge.from.as_str()) && kept_ids.contains(edge.to.as_str()))
            .collect();

        Ok(GraphSnapshot {
            nodes: in_scope_nodes,
            edges: in_scope_edges,
        })
    }

    /// Emits one aggregated `NODE_DELETED` and/or `EDGE_DELETED` event
    /// carrying the row counts -- a bulk mission wipe has no single
    /// node/edge id to attach to an individual event.
    #[instrument(skip(self))]
    pub async fn delete_mission(&self, mission_id: &str) -> Result<DeletionCounts, GraphError> {
        let connection = self.client.connection()?;
        let nodes_deleted = connection.execute("DELETE FROM nodes WHERE mission_id = ?1", params![mission_id.to_string()]).await?;
        let edges_deleted = connection.execute("DELETE FROM edges WHERE mission_id = ?1", params![mission_id.to_string()]).await?;
        connection.execute("DELETE FROM missions WHERE id = ?1", params![mission_id.to_string()]).await?;
        connection.execute("DELETE FROM mission_logs WHERE mission_id = ?1", params![mission_id.to_string()]).await?;
        warn!("mission {mission_id} deleted: {nodes_deleted} nodes, {edges_deleted} edges");
        if nodes_deleted > 0 {
            self.sink.emit(EventType::NodeDeleted, mission_id, serde_json::json!({"nodes_deleted": nodes_deleted}));
        }
        if edges_deleted > 0 {
            self.sink.emit(EventType::EdgeDeleted, mission_id, serde_json::json!({"edges_deleted": edges_deleted}));
        }
        Ok(DeletionCounts {
            nodes_deleted,
            edges_deleted,
        })
    }
}

fn enforce_scope(node_id: &str, apex_domain: &str) -> Result<(), GraphError> {
    match extract_host(node_id) {
        Some(host) if is_in_scope(&host, apex_domain) && !is_reserved_example_domain(&host) => Ok(()),
        Some(host) => Err(GraphError::OutOfScope(host)),
        None => Ok(()),
    }
}

async fn fetch_node(connection: &Connection, mission_id: &str, node_id: &str) -> Result<Option<Node>, GraphError> {
    let mut rows = connection
        .query(
            "SELECT id, mission_id, node_type, properties, evidence, created_at, updated_at FROM nodes WHERE mission_id = ?1 AND id = ?2",
            params![mission_id.to_string(), node_id.to_string()],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_node(&row)?)),
        None => Ok(None),
    }
}

async fn write_node(connection: &Connection, node: &Node) -> Result<(), GraphError> {
    let properties_json = serde_json::to_string(&node.properties).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let evidence_json = serde_json::to_string(&node.evidence).map_err(|e| GraphError::Mapping(e.to_string()))?;
    connection
        .execute(
            "INSERT INTO nodes (id, mission_id, node_type, properties, evidence, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(mission_id, id) DO UPDATE SET
                properties = excluded.properties,
                evidence = excluded.evidence,
                updated_at = excluded.updated_at",
            params![
                node.id.clone(),
                node.mission_id.clone(),
                node.node_type.as_str(),
                properties_json,
                evidence_json,
                node.created_at.to_rfc3339(),
                node.updated_at.to_rfc3339(),
            ],
        )
        .await?;
    Ok(())
}

async fn upsert_node_on(connection: &Connection, mut node: Node) -> Result<(Node, bool), GraphError> {
    clamp_score_fields(&mut node.properties);
    if let Some(existing) = fetch_node(connection, &node.mission_id, &node.id).await? {
        let mut merged = existing;
        merged.merge_in_place(node.properties, node.evidence);
        write_node(connection, &merged).await?;
        Ok((merged, false))
    } else {
        write_node(connection, &node).await?;
        Ok((node, true))
    }
}

async fn upsert_edge_on(connection: &Connection, edge: Edge) -> Result<(Edge, bool), GraphError> {
    let properties_json = serde_json::to_string(&edge.properties).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let rows_affected = connection
        .execute(
            "INSERT INTO edges (id, mission_id, relation, source_id, target_id, properties, created_at, dangling)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(mission_id, id) DO NOTHING",
            params![
                edge.id.clone(),
                edge.mission_id.clone(),
                edge.relation.as_str(),
                edge.from.clone(),
                edge.to.clone(),
                properties_json,
                edge.created_at.to_rfc3339(),
                edge.dangling as i64,
            ],
        )
        .await?;
    Ok((edge, rows_affected > 0))
}

fn row_to_node(row: &Row) -> Result<Node, GraphError> {
    let id: String = row.get(0).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let mission_id: String = row.get(1).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let node_type_str: String = row.get(2).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let properties_str: String = row.get(3).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let evidence_str: String = row.get(4).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let created_at_str: String = row.get(5).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let updated_at_str: String = row.get(6).map_err(|e| GraphError::Mapping(e.to_string()))?;

    let node_type = NodeType::parse(&node_type_str).ok_or_else(|| GraphError::UnknownType(node_type_str.clone()))?;
    let properties: PropertyBag = serde_json::from_str(&properties_str).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let evidence: Vec<Evidence> = serde_json::from_str(&evidence_str).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let created_at = parse_timestamp(&created_at_str)?;
    let updated_at = parse_timestamp(&updated_at_str)?;

    Ok(Node {
        id,
        node_type,
        mission_id,
        properties,
        evidence,
        created_at,
        updated_at,
    })
}

fn row_to_edge(row: &Row) -> Result<Edge, GraphError> {
    let id: String = row.get(0).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let relation_str: String = row.get(1).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let source_id: String = row.get(2).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let target_id: String = row.get(3).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let mission_id: String = row.get(4).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let properties_str: String = row.get(5).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let created_at_str: String = row.get(6).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let dangling: i64 = row.get(7).map_err(|e| GraphError::Mapping(e.to_string()))?;

    let relation = EdgeRelation::parse(&relation_str).ok_or_else(|| GraphError::UnknownRelation(relation_str.clone()))?;
    let properties = serde_json::from_str(&properties_str).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let created_at = parse_timestamp(&created_at_str)?;

    Ok(Edge {
        id,
        relation,
        from: source_id,
        to: target_id,
        mission_id,
        properties,
        created_at,
        dangling: dangling != 0,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, GraphError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)).map_err(|e| GraphError::Mapping(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn memory_repository() -> GraphRepository {
        let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
        GraphRepository::new(client)
    }

    #[tokio::test]
    async fn upsert_node_merges_properties_on_repeat() {
        let repository = memory_repository().await;
        let mut properties = PropertyBag::new();
        properties.insert("category".to_string(), json!("API"));
        let node = Node::new("subdomain:api.example.com", NodeType::Subdomain, "m1", properties);
        repository.upsert_node(node.clone(), "example.com").await.unwrap();

        let mut patch = PropertyBag::new();
        patch.insert("category".to_string(), json!("ADMIN"));
        let merged = repository
            .upsert_node(Node::new("subdomain:api.example.com", NodeType::Subdomain, "m1", patch), "example.com")
            .await
            .unwrap();
        assert_eq!(merged.properties.get("category").unwrap(), "ADMIN");

        let (nodes, total) = repository.query_nodes("m1", None, None, 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(nodes.len(), 1);
    }

    #[tokio::test]
    async fn out_of_scope_node_is_rejected() {
        let repository = memory_repository().await;
        let node = Node::new("subdomain:evil.other.com", NodeType::Subdomain, "m1", PropertyBag::new());
        let result = repository.upsert_node(node, "example.com").await;
        assert!(matches!(result, Err(GraphError::OutOfScope(_))));
    }

    #[tokio::test]
    async fn repeated_edge_upsert_is_idempotent() {
        let repository = memory_repository().await;
        let edge = Edge::new(EdgeRelation::ResolvesTo, "subdomain:api.example.com", "ip_address:1.2.3.4", "m1", PropertyBag::new());
        repository.upsert_edge(edge.clone()).await.unwrap();
        repository.upsert_edge(edge).await.unwrap();
        assert_eq!(repository.get_edges("m1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn batch_with_one_invalid_row_leaves_store_unchanged() {
        let repository = memory_repository().await;
        let good = Node::new("subdomain:api.example.com", NodeType::Subdomain, "m1", PropertyBag::new());
        let bad = Node::new("subdomain:evil.other.com", NodeType::Subdomain, "m1", PropertyBag::new());
        let result = repository.batch_upsert("m1", vec![good, bad], vec![], "example.com").await;
        assert!(result.is_err());
        let stats = repository.stats("m1").await.unwrap();
        assert_eq!(stats.total_nodes, 0);
    }

    #[tokio::test]
    async fn export_snapshot_drops_reserved_example_domains() {
        let repository = memory_repository().await;
        let api_node = Node::new("subdomain:api.example.com", NodeType::Subdomain, "m1", PropertyBag::new());
        repository.upsert_node(api_node, "example.com").await.unwrap();

        // `report:` ids carry no host component and must pass the filter untouched.
        let report_node = Node::new("report:m1:summary", NodeType::Report, "m1", PropertyBag::new());
        repository.upsert_node(report_node, "example.com").await.unwrap();

        let snapshot = repository.export_snapshot("m1", "example.com").await.unwrap();
        assert_eq!(snapshot.nodes.len(), 2);
    }
}
