// [libs/domain/pipeline/src/phases/p1_passive_recon.rs]
//! Passive Recon (§4.4.2 "Phase P1").

use crate::context::PipelineContext;
use crate::errors::PipelineError;
use crate::ingest;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use warden_graph_model::{scope, EdgeRelation, EventType};
use warden_tool_client::{DnsResolveInput, SubdomainEnumInput, WaybackInput};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub subdomains_discovered: usize,
    pub endpoints_from_wayback: usize,
    pub dns_records_resolved: usize,
}

pub async fn run(ctx: &PipelineContext) -> Result<PhaseOutcome, PipelineError> {
    let apex = ctx.apex_domain().to_string();
    ctx.emit(EventType::PhaseStarted, "PASSIVE_RECON", serde_json::json!({"apex": apex}));

    // 1. subdomain_enum, filtered to scope.
    let enum_result = ctx
        .tools
        .subdomain_enum(SubdomainEnumInput { domain: apex.clone(), all_sources: true, recursive: false, timeout_secs: 60 })
        .await?;
    let in_scope_hosts: Vec<String> = enum_result.subdomains.into_iter().filter(|host| scope::is_in_scope(host, &apex)).collect();

    ctx.graph.upsert_node(ingest::domain_node(ctx.mission_id(), &apex), &apex).await?;

    let subdomain_count = in_scope_hosts.len();
    let mut subdomain_nodes = Vec::with_capacity(subdomain_count);
    let mut subdomain_edges = Vec::with_capacity(subdomain_count);
    for host in &in_scope_hosts {
        subdomain_nodes.push(ingest::subdomain_node(ctx.mission_id(), host, "subdomain_enum"));
        subdomain_edges.push(ingest::edge(EdgeRelation::HasSubdomain, &format!("domain:{apex}"), &format!("subdomain:{host}"), ctx.mission_id()));
    }
    if !subdomain_nodes.is_empty() {
        ctx.graph.batch_upsert(ctx.mission_id(), subdomain_nodes, subdomain_edges, &apex).await?;
    }

    // 2. Reflect on the subdomain_enum result.
    let mut budget = warden_reflection::IterationBudget::new(ctx.mission.options.max_reflection_iterations);
    let reflection = warden_reflection::reflect(
        "subdomain_enum",
        &serde_json::json!({"subdomains": in_scope_hosts}),
        &ctx.reflection_work_root,
        &mut budget,
    )
    .await;
    merge_reflection_hosts(ctx, &apex, &reflection).await?;

    // 3. wayback on discovered hosts + apex.
    let mut wayback_domains = in_scope_hosts.clone();
    wayback_domains.push(apex.clone());
    let wayback_results = ctx.tools.wayback(WaybackInput { domains: wayback_domains }).await.unwrap_or_default();

    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut seen_endpoints = HashSet::new();
    for entry in &wayback_results {
        let Some(host) = scope::extract_host(&format!("x:{}", entry.origin)) else { continue };
        if !scope::is_in_scope(&host, &apex) {
            continue;
        }
        let subdomain_id = format!("subdomain:{host}");
        let service_id = format!("http_service:{}", entry.origin);
        let endpoint_url = format!("{}{}", entry.origin, entry.path);
        if !seen_endpoints.insert((entry.method.clone(), endpoint_url.clone())) {
            continue;
        }

        nodes.push(ingest::subdomain_node(ctx.mission_id(), &host, "wayback"));
        nodes.push(ingest::http_service_node(ctx.mission_id(), &entry.origin, None, None, &[], None));
        nodes.push(ingest::endpoint_node(ctx.mission_id(), &endpoint_url, &entry.method, "WAYBACK", 0.6));
        edges.push(ingest::edge(EdgeRelation::HasSubdomain, &format!("domain:{apex}"), &subdomain_id, ctx.mission_id()));
        edges.push(ingest::edge(EdgeRelation::ExposesHttp, &subdomain_id, &service_id, ctx.mission_id()));
        edges.push(ingest::edge(EdgeRelation::ExposesEndpoint, &service_id, &ingest::endpoint_id(&endpoint_url, &entry.method), ctx.mission_id()));
    }
    let endpoints_from_wayback = seen_endpoints.len();
    if !nodes.is_empty() {
        ctx.graph.batch_upsert(ctx.mission_id(), nodes, edges, &apex).await?;
    }

    // 4. dns_resolve on subdomains.
    let dns_results = ctx.tools.dns_resolve(DnsResolveInput { subdomains: in_scope_hosts.clone() }).await.unwrap_or_default();
    let mut dns_nodes = Vec::new();
    let mut dns_edges = Vec::new();
    let mut dns_record_count = 0;
    for entry in &dns_results {
        let subdomain_id = format!("subdomain:{}", entry.subdomain);
        for ip in &entry.ips {
            let ip_id = format!("ip_address:{ip}");
            dns_nodes.push(ingest::ip_node(ctx.mission_id(), ip));
            dns_edges.push(ingest::edge(EdgeRelation::ResolvesTo, &subdomain_id, &ip_id, ctx.mission_id()));
        }
        for (record_type, values) in &entry.records {
            let record_id = format!("dns_record:{}:{record_type}", entry.subdomain);
            dns_nodes.push(ingest::dns_record_node(ctx.mission_id(), &entry.subdomain, record_type, values));
            dns_edges.push(ingest::edge(EdgeRelation::HasRecord, &subdomain_id, &record_id, ctx.mission_id()));
            dns_record_count += 1;
        }
    }
    if !dns_nodes.is_empty() {
        ctx.graph.batch_upsert(ctx.mission_id(), dns_nodes, dns_edges, &apex).await?;
    }

    // 5. Reflect on the DNS result.
    let mut budget = warden_reflection::IterationBudget::new(ctx.mission.options.max_reflection_iterations);
    let dns_payload: Vec<serde_json::Value> = dns_results
        .iter()
        .map(|r| serde_json::json!({"subdomain": r.subdomain, "ips": r.ips, "records": r.records}))
        .collect();
    warden_reflection::reflect("dns_resolve", &serde_json::json!(dns_payload), &ctx.reflection_work_root, &mut budget).await;

    let outcome = PhaseOutcome {
        subdomains_discovered: subdomain_count,
        endpoints_from_wayback,
        dns_records_resolved: dns_record_count,
    };
    ctx.emit(EventType::PhaseCompleted, "PASSIVE_RECON", serde_json::to_value(&outcome).unwrap_or_default());
    Ok(outcome)
}

async fn merge_reflection_hosts(
    ctx: &PipelineContext,
    apex: &str,
    reflection: &warden_reflection::ReflectionOutcome,
) -> Result<(), PipelineError> {
    let nodes: Vec<_> = reflection
        .merged
        .iter()
        .filter(|candidate| candidate.kind == warden_reflection::MergeCandidateKind::Subdomain)
        .filter(|candidate| scope::is_in_scope(&candidate.value, apex))
        .map(|candidate| ingest::subdomain_node(ctx.mission_id(), &candidate.value, &candidate.source))
        .collect();
    if !nodes.is_empty() {
        ctx.graph.batch_upsert(ctx.mission_id(), nodes, Vec::new(), apex).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CancellationToken, NullEventSink};
    use std::sync::Arc;
    use warden_graph_model::{Mission, MissionMode, MissionOptions};
    use warden_graph_store::{GraphRepository, GraphStoreClient};
    use warden_reasoner::NullReasoner;
    use warden_tool_client::{DnsResolveResult, MockToolProvider, WaybackResult};

    #[tokio::test]
    async fn discovers_subdomains_and_ingests_wayback_endpoints() {
        let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
        let graph = Arc::new(GraphRepository::new(client));
        let mission = Mission::new("example.test", MissionMode::Balanced, vec![], MissionOptions::default());

        let mut tools = MockToolProvider::default();
        tools.subdomains = vec!["api.example.test".to_string(), "evil.other.test".to_string()];
        tools.wayback_results = vec![WaybackResult {
            path: "/api/v1/users".to_string(),
            method: "GET".to_string(),
            source: "wayback".to_string(),
            origin: "https://api.example.test".to_string(),
        }];
        tools.dns_results = vec![DnsResolveResult {
            subdomain: "api.example.test".to_string(),
            ips: vec!["1.2.3.4".to_string()],
            records: Default::default(),
        }];

        let ctx = PipelineContext {
            mission,
            graph: graph.clone(),
            tools: Arc::new(tools),
            reasoner: Arc::new(NullReasoner),
            events: Arc::new(NullEventSink),
            cancellation: CancellationToken::new(),
            reflection_work_root: std::env::temp_dir(),
        };

        let outcome = run(&ctx).await.unwrap();
        assert_eq!(outcome.subdomains_discovered, 1);
        assert_eq!(outcome.endpoints_from_wayback, 1);

        let stats = graph.stats(ctx.mission_id()).await.unwrap();
        assert_eq!(stats.nodes_by_type.get("SUBDOMAIN").copied().unwrap_or(0), 1);
        assert!(stats.nodes_by_type.get("ENDPOINT").copied().unwrap_or(0) >= 1);
        assert_eq!(stats.nodes_by_type.get("IP_ADDRESS").copied().unwrap_or(0), 1);
    }
}
