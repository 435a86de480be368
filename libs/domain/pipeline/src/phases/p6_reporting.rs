// [libs/domain/pipeline/src/phases/p6_reporting.rs]
//! Reporting (§4.4.2 "Phase P6"). Produces the four `REPORT`
//! artifacts: a red-team narrative, a knowledge summary, a full graph
//! export and a metrics snapshot.

use crate::context::PipelineContext;
use crate::errors::PipelineError;
use crate::ingest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write as _;
use warden_graph_model::{EventType, NodeType};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub reports_generated: usize,
}

pub async fn run(ctx: &PipelineContext) -> Result<PhaseOutcome, PipelineError> {
    ctx.emit(EventType::PhaseStarted, "REPORTING", json!({}));
    let apex = ctx.apex_domain().to_string();

    let stats = ctx.graph.stats(ctx.mission_id()).await?;
    let (attack_paths, _) = ctx.graph.query_nodes(ctx.mission_id(), Some(&[NodeType::AttackPath]), None, u32::MAX, 0).await?;
    let (vulnerabilities, _) = ctx.graph.query_nodes(ctx.mission_id(), Some(&[NodeType::Vulnerability]), None, u32::MAX, 0).await?;
    let snapshot = ctx.graph.export_snapshot(ctx.mission_id(), &apex).await?;

    let mut sorted_paths = attack_paths.clone();
    sorted_paths.sort_by(|a, b| {
        let score_a = a.properties.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let score_b = b.properties.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0);
        score_b.partial_cmp(&score_a).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut narrative = String::new();
    let _ = writeln!(narrative, "# Red team summary for {apex}");
    let _ = writeln!(narrative, "\n{} nodes, {} edges collected.\n", stats.total_nodes, stats.total_edges);
    for path in sorted_paths.iter().take(5) {
        let subdomain = path.properties.get("subdomain").and_then(|v| v.as_str()).unwrap_or_default();
        let score = path.properties.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let _ = writeln!(narrative, "- {subdomain}: score {score:.1}");
    }
    let possible_vulns = vulnerabilities.iter().filter(|v| v.properties.get("status").and_then(|s| s.as_str()) == Some("POSSIBLE_VULNERABILITY")).count();
    let _ = writeln!(narrative, "\n{possible_vulns} endpoints flagged as possible vulnerabilities during verification.");

    let knowledge_summary = json!({
        "target_domain": apex,
        "subdomains": stats.nodes_by_type.get("SUBDOMAIN").copied().unwrap_or(0),
        "endpoints": stats.nodes_by_type.get("ENDPOINT").copied().unwrap_or(0),
        "hypotheses": stats.nodes_by_type.get("HYPOTHESIS").copied().unwrap_or(0),
        "vulnerabilities": vulnerabilities.len(),
        "attack_paths": attack_paths.len(),
    });

    let graph_export = json!({
        "nodes": snapshot.nodes.len(),
        "edges": snapshot.edges.len(),
    });

    let metrics = json!({
        "total_nodes": stats.total_nodes,
        "total_edges": stats.total_edges,
        "nodes_by_type": stats.nodes_by_type,
    });

    let nodes = vec![
        ingest::report_node(ctx.mission_id(), "RED_TEAM_NARRATIVE", json!(narrative)),
        ingest::report_node(ctx.mission_id(), "KNOWLEDGE_SUMMARY", knowledge_summary),
        ingest::report_node(ctx.mission_id(), "GRAPH_EXPORT", graph_export),
        ingest::report_node(ctx.mission_id(), "METRICS", metrics),
    ];
    let reports_generated = nodes.len();
    ctx.graph.batch_upsert(ctx.mission_id(), nodes, Vec::new(), &apex).await?;

    let outcome = PhaseOutcome { reports_generated };
    ctx.emit(EventType::PhaseCompleted, "REPORTING", serde_json::to_value(&outcome).unwrap_or_default());
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
    async fn generates_four_report_artifacts() {
        let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
        let graph = Arc::new(GraphRepository::new(client));
        let mission = Mission::new("example.test", MissionMode::Balanced, vec![], MissionOptions::default());

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
        assert_eq!(outcome.reports_generated, 4);

        let stats = graph.stats(ctx.mission_id()).await.unwrap();
        assert_eq!(stats.nodes_by_type.get("REPORT").copied().unwrap_or(0), 4);
    }
}
