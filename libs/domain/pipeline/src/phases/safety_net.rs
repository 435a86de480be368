// [libs/domain/pipeline/src/phases/safety_net.rs]
//! Gate check run immediately after Passive Recon (§4.3
//! "Safety net"), kept as a named, independently testable unit per the
//! original's `SafetyCheckResult`/`SafetyNetPipeline` split.

use crate::context::PipelineContext;
use crate::errors::PipelineError;
use crate::ingest;
use serde::{Deserialize, Serialize};
use warden_graph_model::{EventType, NodeType};
use warden_tool_client::HttpProbeInput;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyCheckResult {
    pub triggered: bool,
    pub fallback_hosts_probed: Vec<String>,
    pub fallback_hosts_reachable: Vec<String>,
}

/// If Passive Recon produced no `SUBDOMAIN` nodes, injects
/// `target_domain` and `www.target_domain` as `APEX_FALLBACK`
/// subdomains and HEAD-probes them so downstream phases always have
/// at least a candidate target.
pub async fn run(ctx: &PipelineContext) -> Result<SafetyCheckResult, PipelineError> {
    let stats = ctx.graph.stats(ctx.mission_id()).await?;
    let subdomain_count = stats.nodes_by_type.get(NodeType::Subdomain.as_str()).copied().unwrap_or(0);

    if subdomain_count > 0 {
        return Ok(SafetyCheckResult { triggered: false, fallback_hosts_probed: Vec::new(), fallback_hosts_reachable: Vec::new() });
    }

    let apex = ctx.apex_domain().to_string();
    let fallback_hosts = vec![apex.clone(), format!("www.{apex}")];

    let mut nodes = Vec::new();
    for host in &fallback_hosts {
        nodes.push(ingest::subdomain_node(ctx.mission_id(), host, "APEX_FALLBACK"));
    }

    let probe_urls: Vec<String> = fallback_hosts.iter().map(|host| format!("https://{host}")).collect();
    let probe_result = ctx
        .tools
        .http_probe(HttpProbeInput { urls: probe_urls, timeout_secs: 10 })
        .await
        .unwrap_or(warden_tool_client::HttpProbeOutput { results: Vec::new() });

    let mut reachable = Vec::new();
    for result in &probe_result.results {
        if result.status_code.is_some() {
            reachable.push(result.url.clone());
            nodes.push(ingest::http_service_node(
                ctx.mission_id(),
                &result.url,
                result.status_code,
                result.title.as_deref(),
                &result.technologies,
                result.server.as_deref(),
            ));
        }
    }

    ctx.graph.batch_upsert(ctx.mission_id(), nodes, Vec::new(), &apex).await?;
    ctx.emit(
        EventType::Log,
        "SAFETY_NET",
        serde_json::json!({"message": "no subdomains discovered, injected apex fallback", "hosts": fallback_hosts}),
    );

    Ok(SafetyCheckResult { triggered: true, fallback_hosts_probed: fallback_hosts, fallback_hosts_reachable: reachable })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NullEventSink;
    use std::sync::Arc;
    use warden_graph_model::{Mission, MissionMode, MissionOptions};
    use warden_graph_store::{GraphRepository, GraphStoreClient};
    use warden_reasoner::NullReasoner;
    use warden_tool_client::MockToolProvider;

    async fn context() -> PipelineContext {
        let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
        let graph = Arc::new(GraphRepository::new(client));
        let mission = Mission::new("example.test", MissionMode::Balanced, vec![], MissionOptions::default());
        PipelineContext {
            mission,
            graph,
            tools: Arc::new(MockToolProvider::default()),
            reasoner: Arc::new(NullReasoner),
            events: Arc::new(NullEventSink),
            cancellation: crate::context::CancellationToken::new(),
            reflection_work_root: std::env::temp_dir(),
        }
    }

    #[tokio::test]
    async fn triggers_and_injects_fallback_when_no_subdomains_exist() {
        let ctx = context().await;
        let result = run(&ctx).await.unwrap();
        assert!(result.triggered);
        assert_eq!(result.fallback_hosts_probed.len(), 2);

        let stats = ctx.graph.stats(ctx.mission_id()).await.unwrap();
        assert_eq!(stats.nodes_by_type.get("SUBDOMAIN").copied().unwrap_or(0), 2);
    }

    #[tokio::test]
    async fn does_not_trigger_when_subdomains_already_exist() {
        let ctx = context().await;
        let node = ingest::subdomain_node(ctx.mission_id(), "api.example.test", "subdomain_enum");
        ctx.graph.upsert_node(node, ctx.apex_domain()).await.unwrap();

        let result = run(&ctx).await.unwrap();
        assert!(!result.triggered);
    }
}
