// [libs/domain/pipeline/src/phases/p5_planning.rs]
//! Planning (§4.4.2 "Phase P5", §4.4.5).
//!
//! Assembles one candidate attack path per in-scope subdomain by
//! walking `SUBDOMAIN -> HTTP_SERVICE -> ENDPOINT` and
//! `SUBDOMAIN -> IP_ADDRESS` edges already in the graph, scores each
//! with `warden_scoring::attack_path`, and persists the top K.

use crate::context::PipelineContext;
use crate::errors::PipelineError;
use crate::ingest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use warden_graph_model::{EdgeRelation, EventType, Node, NodeType};
use warden_scoring::attack_path::{AttackPathInputs, EndpointAggregateInput, VulnerabilityAggregateInput};
use warden_scoring::{score_attack_path, suggest_actions, BehaviorHint, EndpointCategory};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub attack_paths_scored: usize,
    pub attack_paths_persisted: usize,
}

fn dns_tags(dns_records: &[&Node], host: &str) -> (bool, bool, bool) {
    let has_mx = dns_records.iter().any(|n| n.properties.get("record_type").and_then(|v| v.as_str()) == Some("MX"));
    let has_spf = dns_records.iter().any(|n| {
        n.properties.get("host").and_then(|v| v.as_str()) == Some(host)
            && n.properties.get("values").and_then(|v| v.as_array()).map(|values| values.iter().any(|value| value.as_str().unwrap_or_default().contains("spf1"))).unwrap_or(false)
    });
    let has_dmarc = dns_records.iter().any(|n| {
        n.properties.get("host").and_then(|v| v.as_str()).map(|h| h.starts_with("_dmarc.")).unwrap_or(false)
            && n.properties.get("values").and_then(|v| v.as_array()).map(|values| values.iter().any(|value| value.as_str().unwrap_or_default().to_ascii_lowercase().contains("dmarc1"))).unwrap_or(false)
    });
    (has_mx, has_spf, has_dmarc)
}

pub async fn run(ctx: &PipelineContext) -> Result<PhaseOutcome, PipelineError> {
    ctx.emit(EventType::PhaseStarted, "PLANNING", json!({}));
    let apex = ctx.apex_domain().to_string();
    let top_k = ctx.mission.options.attack_path_top_k;

    let (subdomains, _) = ctx.graph.query_nodes(ctx.mission_id(), Some(&[NodeType::Subdomain]), None, u32::MAX, 0).await?;
    let (http_services, _) = ctx.graph.query_nodes(ctx.mission_id(), Some(&[NodeType::HttpService]), None, u32::MAX, 0).await?;
    let (endpoints, _) = ctx.graph.query_nodes(ctx.mission_id(), Some(&[NodeType::Endpoint]), None, u32::MAX, 0).await?;
    let (dns_records, _) = ctx.graph.query_nodes(ctx.mission_id(), Some(&[NodeType::DnsRecord]), None, u32::MAX, 0).await?;
    let (vulnerabilities, _) = ctx.graph.query_nodes(ctx.mission_id(), Some(&[NodeType::Vulnerability]), None, u32::MAX, 0).await?;
    let edges = ctx.graph.get_edges(ctx.mission_id()).await?;
    let dns_record_refs: Vec<&Node> = dns_records.iter().collect();

    let mut scored: Vec<(String, f64, Vec<&'static str>)> = Vec::with_capacity(subdomains.len());

    for subdomain in &subdomains {
        let host = subdomain.properties.get("host").and_then(|v| v.as_str()).unwrap_or_default().to_string();

        let service_ids: Vec<&str> = edges
            .iter()
            .filter(|e| e.relation == EdgeRelation::ExposesHttp && e.from == subdomain.id)
            .map(|e| e.to.as_str())
            .collect();
        let endpoint_ids: Vec<&str> = edges
            .iter()
            .filter(|e| e.relation == EdgeRelation::ExposesEndpoint && service_ids.contains(&e.from.as_str()))
            .map(|e| e.to.as_str())
            .collect();

        let subdomain_endpoints: Vec<&Node> = endpoints.iter().filter(|n| endpoint_ids.contains(&n.id.as_str())).collect();
        let subdomain_services: Vec<&Node> = http_services.iter().filter(|n| service_ids.contains(&n.id.as_str())).collect();

        let has_backend_tech_hint = subdomain_services.iter().any(|s| {
            s.properties.get("technologies").and_then(|v| v.as_array()).map(|technologies| !technologies.is_empty()).unwrap_or(false)
        });

        let endpoint_inputs: Vec<EndpointAggregateInput> = subdomain_endpoints
            .iter()
            .map(|endpoint| {
                let method = endpoint.properties.get("method").and_then(|v| v.as_str()).unwrap_or("GET").to_string();
                let category_str = endpoint.properties.get("category").and_then(|v| v.as_str()).unwrap_or("UNKNOWN");
                let category = match category_str {
                    "API" => EndpointCategory::Api,
                    "ADMIN" => EndpointCategory::Admin,
                    "AUTH" => EndpointCategory::Auth,
                    "PUBLIC" => EndpointCategory::Public,
                    "STATIC" => EndpointCategory::Static,
                    "LEGACY" => EndpointCategory::Legacy,
                    "HEALTHCHECK" => EndpointCategory::Healthcheck,
                    _ => EndpointCategory::Unknown,
                };
                let behavior_str = endpoint.properties.get("behavior_hint").and_then(|v| v.as_str()).unwrap_or("UNKNOWN");
                let behavior = match behavior_str {
                    "READ_ONLY" => BehaviorHint::ReadOnly,
                    "STATE_CHANGING" => BehaviorHint::StateChanging,
                    "ID_BASED_ACCESS" => BehaviorHint::IdBasedAccess,
                    "OTHER" => BehaviorHint::Other,
                    _ => BehaviorHint::Unknown,
                };
                let is_historical_source = endpoint.properties.get("category").and_then(|v| v.as_str()) == Some("WAYBACK");
                EndpointAggregateInput { category, behavior, is_historical_source, method }
            })
            .collect();

        let vulnerability_inputs: Vec<VulnerabilityAggregateInput> = vulnerabilities
            .iter()
            .filter(|v| subdomain_endpoints.iter().any(|e| v.id.starts_with(&format!("vulnerability:{}:", e.id))))
            .map(|v| VulnerabilityAggregateInput {
                severity: v.properties.get("confidence").and_then(|c| c.as_f64()).map(|c| if c >= 0.8 { "CRITICAL" } else if c >= 0.6 { "HIGH" } else if c >= 0.4 { "MEDIUM" } else { "LOW" }).unwrap_or("LOW").to_string(),
                status: v.properties.get("status").and_then(|s| s.as_str()).unwrap_or("INCONCLUSIVE").to_string(),
            })
            .collect();

        let (has_mx, has_spf, has_dmarc) = dns_tags(&dns_record_refs, &host);

        let inputs = AttackPathInputs {
            subdomain_priority: 5.0,
            tags: vec![host.clone()],
            org_name: None,
            has_mx,
            has_spf,
            has_dmarc,
            has_backend_tech_hint,
            endpoints: endpoint_inputs,
            vulnerabilities: vulnerability_inputs,
        };
        let score = score_attack_path(&inputs);

        let max_endpoint_risk = subdomain_endpoints.iter().filter_map(|e| e.properties.get("risk_score").and_then(|v| v.as_f64())).fold(0.0_f64, f64::max);
        let categories: Vec<EndpointCategory> = inputs.endpoints.iter().map(|e| e.category).collect();
        let has_exploitable = vulnerabilities.iter().any(|v| {
            subdomain_endpoints.iter().any(|e| v.id.starts_with(&format!("vulnerability:{}:", e.id)))
                && v.properties.get("status").and_then(|s| s.as_str()) == Some("POSSIBLE_VULNERABILITY")
        });
        let actions: Vec<&'static str> = suggest_actions(max_endpoint_risk, &categories, has_exploitable).iter().map(|a| a.as_str()).collect();

        scored.push((host, score, actions));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let attack_paths_scored = scored.len();
    let persisted: Vec<_> = scored.into_iter().take(top_k).collect();

    let mut nodes = Vec::with_capacity(persisted.len());
    let mut edges_out = Vec::with_capacity(persisted.len());
    for (host, score, actions) in &persisted {
        let node = ingest::attack_path_node(ctx.mission_id(), host, *score, actions);
        edges_out.push(ingest::edge(EdgeRelation::Targets, &node.id, &format!("subdomain:{host}"), ctx.mission_id()));
        nodes.push(node);
    }
    let attack_paths_persisted = nodes.len();
    if !nodes.is_empty() {
        ctx.graph.batch_upsert(ctx.mission_id(), nodes, edges_out, &apex).await?;
    }

    let outcome = PhaseOutcome { attack_paths_scored, attack_paths_persisted };
    ctx.emit(EventType::PhaseCompleted, "PLANNING", serde_json::to_value(&outcome).unwrap_or_default());
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CancellationToken, NullEventSink};
    use std::sync::Arc;
    use warden_graph_model::{Mission, MissionMode, MissionOptions};
    use warden_graph_store::{GraphRepository, GraphStoreClient};
    use warden_reasoner::NullReasoner;
    use warden_tool_client::MockToolProvider;

    #[tokio::test]
    async fn assembles_and_persists_attack_path_for_subdomain_with_admin_endpoint() {
        let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
        let graph = Arc::new(GraphRepository::new(client));
        let mission = Mission::new("example.test", MissionMode::Balanced, vec![], MissionOptions::default());

        let subdomain = ingest::subdomain_node(&mission.id, "api.example.test", "subdomain_enum");
        let service = ingest::http_service_node(&mission.id, "https://api.example.test", Some(200), None, &["nginx".to_string()], None);
        let mut endpoint = ingest::endpoint_node(&mission.id, "https://api.example.test/admin/panel", "GET", "ADMIN", 0.7);
        endpoint.properties.insert("behavior_hint".to_string(), serde_json::json!("READ_ONLY"));
        endpoint.properties.insert("risk_score".to_string(), serde_json::json!(56.0));

        graph.upsert_node(subdomain.clone(), "example.test").await.unwrap();
        graph.upsert_node(service.clone(), "example.test").await.unwrap();
        graph.upsert_node(endpoint.clone(), "example.test").await.unwrap();
        graph.upsert_edge(ingest::edge(EdgeRelation::ExposesHttp, &subdomain.id, &service.id, &mission.id)).await.unwrap();
        graph.upsert_edge(ingest::edge(EdgeRelation::ExposesEndpoint, &service.id, &endpoint.id, &mission.id)).await.unwrap();

        let ctx = PipelineContext {
            mission,
            graph: graph.clone(),
            tools: Arc::new(MockToolProvider::default()),
            reasoner: Arc::new(NullReasoner),
            events: Arc::new(NullEventSink),
            cancellation: CancellationToken::new(),
            reflection_work_root: std::env::temp_dir(),
        };

        let outcome = run(&ctx).await.unwrap();
        assert_eq!(outcome.attack_paths_scored, 1);
        assert_eq!(outcome.attack_paths_persisted, 1);

        let stats = graph.stats(ctx.mission_id()).await.unwrap();
        assert_eq!(stats.nodes_by_type.get("ATTACK_PATH").copied().unwrap_or(0), 1);
    }
}
