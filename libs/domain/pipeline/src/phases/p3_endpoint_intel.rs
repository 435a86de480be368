// [libs/domain/pipeline/src/phases/p3_endpoint_intel.rs]
//! Endpoint Intelligence (§4.4.2 "Phase P3", §4.4.3).

use crate::context::PipelineContext;
use crate::errors::PipelineError;
use crate::ingest;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use warden_graph_model::{EventType, NodeType};
use warden_scoring::{behavior, parameter, risk, BehaviorHint, EndpointCategory, ParameterSensitivity};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub endpoints_scored: usize,
    pub parameters_discovered: usize,
    pub hypotheses_generated: usize,
}

fn split_url(url: &str) -> (String, String) {
    match url.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (url.to_string(), String::new()),
    }
}

pub async fn run(ctx: &PipelineContext) -> Result<PhaseOutcome, PipelineError> {
    ctx.emit(EventType::PhaseStarted, "ENDPOINT_INTEL", json!({}));
    let apex = ctx.apex_domain().to_string();
    let threshold = ctx.mission.options.risk_score_threshold as f64;

    let (endpoints, _) = ctx.graph.query_nodes(ctx.mission_id(), Some(&[NodeType::Endpoint]), None, u32::MAX, 0).await?;

    let mut parameter_nodes = Vec::new();
    let mut hypothesis_nodes = Vec::new();
    let mut parameters_discovered = 0;
    let mut hypotheses_generated = 0;

    for endpoint in &endpoints {
        let url = endpoint.properties.get("url").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let method = endpoint.properties.get("method").and_then(|v| v.as_str()).unwrap_or("GET").to_string();
        let (path, query) = split_url(&url);

        let category = EndpointCategory::classify(&path);
        let path_and_query = if query.is_empty() { path.clone() } else { format!("{path}?{query}") };
        let behavior_hint = BehaviorHint::derive(&method, &path_and_query);
        let has_id = behavior::has_id_pattern(&path_and_query);
        let (likelihood, impact) = risk::likelihood_and_impact(category, behavior_hint, has_id);
        let risk_score = risk::risk_score(likelihood, impact);

        let mut patch = Map::new();
        patch.insert("category".to_string(), json!(category.as_str()));
        patch.insert("behavior_hint".to_string(), json!(behavior_hint.as_str()));
        patch.insert("has_id_pattern".to_string(), json!(has_id));
        patch.insert("likelihood_score".to_string(), json!(likelihood));
        patch.insert("impact_score".to_string(), json!(impact));
        patch.insert("risk_score".to_string(), json!(risk_score));
        ctx.graph.patch_node(ctx.mission_id(), &endpoint.id, patch).await?;

        let parameter_names = parameter::extract_parameter_names(&path, &query);
        let sensitivities: Vec<ParameterSensitivity> = parameter_names.iter().map(|name| ParameterSensitivity::classify(name)).collect();
        for (name, sensitivity) in parameter_names.iter().zip(sensitivities.iter()) {
            parameter_nodes.push(ingest::parameter_node(ctx.mission_id(), &endpoint.id, name, sensitivity.as_str()));
            parameters_discovered += 1;
        }

        if risk_score >= threshold {
            let tech_hint = endpoint.properties.get("tech_stack_hint").and_then(|v| v.as_str());
            let hypotheses = warden_scoring::generate_hypotheses(category, has_id, &path, &sensitivities, tech_hint);
            for hypothesis in hypotheses {
                hypothesis_nodes.push(ingest::hypothesis_node(
                    ctx.mission_id(),
                    &endpoint.id,
                    hypothesis.attack_type,
                    &hypothesis.title,
                    hypothesis.confidence,
                    hypothesis.priority,
                ));
                hypotheses_generated += 1;
            }
        }
    }

    if !parameter_nodes.is_empty() || !hypothesis_nodes.is_empty() {
        let mut nodes = parameter_nodes;
        nodes.extend(hypothesis_nodes);
        ctx.graph.batch_upsert(ctx.mission_id(), nodes, Vec::new(), &apex).await?;
    }

    let outcome = PhaseOutcome { endpoints_scored: endpoints.len(), parameters_discovered, hypotheses_generated };
    ctx.emit(EventType::PhaseCompleted, "ENDPOINT_INTEL", serde_json::to_value(&outcome).unwrap_or_default());
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

    async fn context_with_options(options: MissionOptions) -> (PipelineContext, Arc<GraphRepository>) {
        let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
        let graph = Arc::new(GraphRepository::new(client));
        let mission = Mission::new("example.test", MissionMode::Balanced, vec![], options);
        let ctx = PipelineContext {
            mission,
            graph: graph.clone(),
            tools: Arc::new(MockToolProvider::default()),
            reasoner: Arc::new(NullReasoner),
            events: Arc::new(NullEventSink),
            cancellation: CancellationToken::new(),
            reflection_work_root: std::env::temp_dir(),
        };
        (ctx, graph)
    }

    #[tokio::test]
    async fn admin_endpoint_crosses_threshold_and_gets_hypothesis() {
        let (ctx, graph) = context_with_options(MissionOptions { risk_score_threshold: 10, ..MissionOptions::default() }).await;
        let node = ingest::endpoint_node(ctx.mission_id(), "https://api.example.test/admin/users/1", "GET", "UNKNOWN", 0.5);
        graph.upsert_node(node, "example.test").await.unwrap();

        let outcome = run(&ctx).await.unwrap();
        assert_eq!(outcome.endpoints_scored, 1);
        assert!(outcome.hypotheses_generated >= 1);

        let stats = graph.stats(ctx.mission_id()).await.unwrap();
        assert!(stats.nodes_by_type.get("HYPOTHESIS").copied().unwrap_or(0) >= 1);
    }

    #[tokio::test]
    async fn low_risk_endpoint_below_threshold_gets_no_hypothesis() {
        let (ctx, graph) = context_with_options(MissionOptions { risk_score_threshold: 90, ..MissionOptions::default() }).await;
        let node = ingest::endpoint_node(ctx.mission_id(), "https://api.example.test/assets/app.js", "GET", "UNKNOWN", 0.5);
        graph.upsert_node(node, "example.test").await.unwrap();

        let outcome = run(&ctx).await.unwrap();
        assert_eq!(outcome.hypotheses_generated, 0);
    }

    #[tokio::test]
    async fn query_params_are_extracted_and_classified() {
        let (ctx, graph) = context_with_options(MissionOptions::default()).await;
        let node = ingest::endpoint_node(ctx.mission_id(), "https://api.example.test/api/export?user_id=1&password=x", "GET", "UNKNOWN", 0.5);
        graph.upsert_node(node, "example.test").await.unwrap();

        let outcome = run(&ctx).await.unwrap();
        assert_eq!(outcome.parameters_discovered, 2);

        let stats = graph.stats(ctx.mission_id()).await.unwrap();
        assert_eq!(stats.nodes_by_type.get("PARAMETER").copied().unwrap_or(0), 2);
    }
}
