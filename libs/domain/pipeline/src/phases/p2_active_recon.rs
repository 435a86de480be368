// [libs/domain/pipeline/src/phases/p2_active_recon.rs]
//! Active Recon (§4.4.2 "Phase P2").

use crate::context::PipelineContext;
use crate::errors::PipelineError;
use crate::ingest;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use warden_graph_model::{EdgeRelation, EventType, NodeType};
use warden_tool_client::{HtmlCrawlInput, HttpProbeInput, JsMineInput};

/// Sensitive-path wordlist for the active path probe (§4.4.2
/// step 4). Deliberately short: this is a recon signal, not a fuzzer.
const SENSITIVE_PATHS: &[&str] = &["/.env", "/.git/config", "/admin", "/api", "/robots.txt", "/graphql", "/swagger.json"];

const CRAWL_TARGET_CAP: usize = 15;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub live_services: usize,
    pub crawled_targets: usize,
    pub sensitive_paths_found: usize,
}

pub async fn run(ctx: &PipelineContext) -> Result<PhaseOutcome, PipelineError> {
    let apex = ctx.apex_domain().to_string();
    ctx.emit(EventType::PhaseStarted, "ACTIVE_RECON", serde_json::json!({}));

    let (subdomains, _) = ctx.graph.query_nodes(ctx.mission_id(), Some(&[NodeType::Subdomain]), None, u32::MAX, 0).await?;

    // 1. Build the probe list: both schemes for every in-scope subdomain.
    let mut probe_urls = Vec::with_capacity(subdomains.len() * 2);
    for subdomain in &subdomains {
        let host = subdomain.properties.get("host").and_then(|v| v.as_str()).unwrap_or_default();
        probe_urls.push(format!("https://{host}"));
        probe_urls.push(format!("http://{host}"));
    }

    // 2. Probe in bounded batches.
    let batch_size = ctx.mission.options.max_workers.max(1);
    let mut live_nodes = Vec::new();
    let mut live_edges = Vec::new();
    let mut live_services = Vec::new();
    for batch in probe_urls.chunks(batch_size) {
        let result = ctx.tools.http_probe(HttpProbeInput { urls: batch.to_vec(), timeout_secs: 10 }).await.unwrap_or(warden_tool_client::HttpProbeOutput { results: vec![] });
        let reflection_payload = serde_json::json!({"results": result.results.iter().map(|r| serde_json::json!({"url": r.url, "status_code": r.status_code})).collect::<Vec<_>>()});
        let mut budget = warden_reflection::IterationBudget::new(ctx.mission.options.max_reflection_iterations);
        warden_reflection::reflect("http_probe", &reflection_payload, &ctx.reflection_work_root, &mut budget).await;

        for probe in result.results {
            let Some(status) = probe.status_code else { continue };
            let Some(host) = warden_graph_model::scope::extract_host(&format!("x:{}", probe.url)) else { continue };
            live_nodes.push(ingest::http_service_node(ctx.mission_id(), &probe.url, Some(status), probe.title.as_deref(), &probe.technologies, probe.server.as_deref()));
            live_edges.push(ingest::edge(EdgeRelation::ExposesHttp, &format!("subdomain:{host}"), &format!("http_service:{}", probe.url), ctx.mission_id()));
            live_services.push(probe.url);
        }
    }
    let live_count = live_services.len();
    if !live_nodes.is_empty() {
        ctx.graph.batch_upsert(ctx.mission_id(), live_nodes, live_edges, &apex).await?;
    }

    // 3. html_crawl + js_mine, capped.
    let crawl_targets: Vec<String> = live_services.iter().take(CRAWL_TARGET_CAP).cloned().collect();
    let mut discovered_endpoints = HashSet::new();
    let mut endpoint_nodes = Vec::new();
    let mut endpoint_edges = Vec::new();

    if !crawl_targets.is_empty() {
        let crawl_results = ctx.tools.html_crawl(HtmlCrawlInput { urls: crawl_targets.clone() }).await.unwrap_or_default();
        for result in &crawl_results {
            for link in &result.links {
                if discovered_endpoints.insert(("GET".to_string(), link.clone())) {
                    endpoint_nodes.push(ingest::endpoint_node(ctx.mission_id(), link, "GET", "UNKNOWN", 0.5));
                    endpoint_edges.push(ingest::edge(EdgeRelation::ExposesEndpoint, &format!("http_service:{}", result.url), &ingest::endpoint_id(link, "GET"), ctx.mission_id()));
                }
            }
        }
        let mut budget = warden_reflection::IterationBudget::new(ctx.mission.options.max_reflection_iterations);
        warden_reflection::reflect("html_crawl", &serde_json::json!(crawl_results.iter().map(|r| serde_json::json!({"url": r.url})).collect::<Vec<_>>()), &ctx.reflection_work_root, &mut budget).await;

        let js_results = ctx.tools.js_mine(JsMineInput { urls: crawl_targets.clone() }).await.unwrap_or_default();
        for result in &js_results {
            endpoint_nodes.push(ingest::js_file_node(ctx.mission_id(), &result.url));
            for endpoint in &result.js.endpoints {
                if discovered_endpoints.insert((endpoint.method.clone(), endpoint.path.clone())) {
                    endpoint_nodes.push(ingest::endpoint_node(ctx.mission_id(), &endpoint.path, &endpoint.method, "UNKNOWN", 0.5));
                }
            }
            for secret in &result.js.secrets {
                let redacted = warden_identifiers::redaction::redact(&secret.value);
                endpoint_nodes.push(ingest::secret_node(ctx.mission_id(), &secret.source_js, &secret.kind, &redacted));
            }
        }
    }
    let crawled_targets = crawl_targets.len();
    if !endpoint_nodes.is_empty() {
        ctx.graph.batch_upsert(ctx.mission_id(), endpoint_nodes, endpoint_edges, &apex).await?;
    }

    // 4. Active path probe: fixed sensitive-path wordlist.
    let mut sensitive_urls = Vec::new();
    for service in &live_services {
        for path in SENSITIVE_PATHS {
            sensitive_urls.push(format!("{service}{path}"));
        }
    }
    let mut sensitive_found = 0;
    let mut sensitive_nodes = Vec::new();
    for batch in sensitive_urls.chunks(batch_size) {
        let result = ctx.tools.http_probe(HttpProbeInput { urls: batch.to_vec(), timeout_secs: 10 }).await.unwrap_or(warden_tool_client::HttpProbeOutput { results: vec![] });
        for probe in result.results {
            if probe.status_code.map(|code| code < 400).unwrap_or(false) {
                sensitive_nodes.push(ingest::endpoint_node(ctx.mission_id(), &probe.url, "GET", "LEGACY", 0.7));
                sensitive_found += 1;
            }
        }
    }
    if !sensitive_nodes.is_empty() {
        ctx.graph.batch_upsert(ctx.mission_id(), sensitive_nodes, Vec::new(), &apex).await?;
    }

    let outcome = PhaseOutcome { live_services: live_count, crawled_targets, sensitive_paths_found: sensitive_found };
    ctx.emit(EventType::PhaseCompleted, "ACTIVE_RECON", serde_json::to_value(&outcome).unwrap_or_default());
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
    use warden_tool_client::{HttpProbeResult, MockToolProvider};

    #[tokio::test]
    async fn upserts_http_service_for_each_live_probe_result() {
        let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
        let graph = Arc::new(GraphRepository::new(client));
        let mission = Mission::new("example.test", MissionMode::Balanced, vec![], MissionOptions::default());

        graph
            .upsert_node(ingest::subdomain_node(&mission.id, "api.example.test", "subdomain_enum"), "example.test")
            .await
            .unwrap();

        let mut tools = MockToolProvider::default();
        tools.http_probe_results = vec![HttpProbeResult {
            url: "https://api.example.test".to_string(),
            status_code: Some(200),
            title: Some("API".to_string()),
            technologies: vec![],
            ip: None,
            server: None,
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
        assert_eq!(outcome.live_services, 1);

        let stats = graph.stats(ctx.mission_id()).await.unwrap();
        assert_eq!(stats.nodes_by_type.get("HTTP_SERVICE").copied().unwrap_or(0), 1);
    }
}
