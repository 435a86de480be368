// [libs/domain/pipeline/src/phases/p4_verification.rs]
//! Verification (§4.4.2 "Phase P4", §4.4.4).
//!
//! Candidates are selected by risk score or hypothesis priority, then
//! probed twice -- a baseline request and a `_probe=1`-marked request
//! -- so a classification can be drawn from the diff between the two
//! without ever attempting to actually exploit anything.

use crate::context::PipelineContext;
use crate::errors::PipelineError;
use crate::ingest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use warden_graph_model::node::clamp_score_fields;
use warden_graph_model::{Evidence, EventType, Node, NodeType};

const PRIORITY_THRESHOLD: u8 = 4;
const ERROR_LEXICON: &[&str] = &[
    "sql syntax", "mysql_fetch", "ora-", "odbc", "stack trace", "traceback (most recent",
    "internal server error", "unhandled exception", "fatal error",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub candidates_tested: usize,
    pub possible_vulnerabilities: usize,
    pub theoretical_vulnerabilities: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    PossibleVulnerability,
    Inconclusive,
    LikelySafe,
}

impl Classification {
    fn as_str(self) -> &'static str {
        match self {
            Classification::PossibleVulnerability => "POSSIBLE_VULNERABILITY",
            Classification::Inconclusive => "INCONCLUSIVE",
            Classification::LikelySafe => "LIKELY_SAFE",
        }
    }
}

/// Implements the three-way rule from §4.4.2 P4 step 2 literally:
/// `POSSIBLE_VULNERABILITY` if the probe returns 5xx and the baseline
/// did not; `INCONCLUSIVE` if the status differs but not via a fresh
/// 5xx, or an error-lexicon pattern appears in the probe body; else
/// `LIKELY_SAFE`.
fn classify(baseline_status: reqwest::StatusCode, probe_status: reqwest::StatusCode, probe_body: &str) -> Classification {
    let lower_probe = probe_body.to_ascii_lowercase();
    let has_error_signature = ERROR_LEXICON.iter().any(|needle| lower_probe.contains(needle));

    if probe_status.is_server_error() && !baseline_status.is_server_error() {
        Classification::PossibleVulnerability
    } else if (baseline_status != probe_status && !probe_status.is_server_error()) || has_error_signature {
        Classification::Inconclusive
    } else {
        Classification::LikelySafe
    }
}

struct ProbeOutcome {
    baseline_status: reqwest::StatusCode,
    probe_status: reqwest::StatusCode,
    baseline_body: String,
    probe_body: String,
    tech_stack_hint: Option<String>,
}

async fn probe_pair(client: &reqwest::Client, url: &str) -> Option<ProbeOutcome> {
    let baseline = client.get(url).timeout(Duration::from_secs(10)).send().await.ok()?;
    let baseline_status = baseline.status();
    let tech_stack_hint = stack_hint_from_headers(&baseline);
    let baseline_body = baseline.text().await.ok()?;

    let probe_url = if url.contains('?') { format!("{url}&_probe=1") } else { format!("{url}?_probe=1") };
    let probe = client.get(&probe_url).timeout(Duration::from_secs(10)).send().await.ok()?;
    let probe_status = probe.status();
    let probe_body = probe.text().await.ok()?;

    Some(ProbeOutcome { baseline_status, probe_status, baseline_body, probe_body, tech_stack_hint })
}

fn stack_hint_from_headers(response: &reqwest::Response) -> Option<String> {
    for header_name in ["server", "x-powered-by", "x-aspnet-version"] {
        if let Some(value) = response.headers().get(header_name).and_then(|v| v.to_str().ok()) {
            let lower = value.to_ascii_lowercase();
            if lower.contains("php") {
                return Some("PHP".to_string());
            }
            if lower.contains("asp.net") {
                return Some("ASP.NET".to_string());
            }
        }
    }
    None
}

pub async fn run(ctx: &PipelineContext) -> Result<PhaseOutcome, PipelineError> {
    ctx.emit(EventType::PhaseStarted, "VERIFICATION", json!({}));
    let apex = ctx.apex_domain().to_string();
    let threshold = ctx.mission.options.risk_score_threshold as f64;
    let top_k = ctx.mission.options.verification_top_k;

    let (mut endpoints, _) = ctx.graph.query_nodes(ctx.mission_id(), Some(&[NodeType::Endpoint]), None, u32::MAX, 0).await?;
    endpoints.sort_by(|a, b| {
        let risk_a = a.properties.get("risk_score").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let risk_b = b.properties.get("risk_score").and_then(|v| v.as_f64()).unwrap_or(0.0);
        risk_b.partial_cmp(&risk_a).unwrap_or(std::cmp::Ordering::Equal)
    });

    let candidates: Vec<Node> = endpoints
        .into_iter()
        .filter(|e| e.properties.get("risk_score").and_then(|v| v.as_f64()).unwrap_or(0.0) >= threshold)
        .take(top_k)
        .collect();

    let client = reqwest::Client::builder()
        .user_agent("warden-pipeline/0.1")
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());

    let mut vulnerability_nodes = Vec::new();
    let mut possible = 0;
    for endpoint in &candidates {
        if ctx.cancellation.is_cancelled() {
            break;
        }
        let url = endpoint.properties.get("url").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let Some(ProbeOutcome { baseline_status, probe_status, baseline_body, probe_body, tech_stack_hint }) = probe_pair(&client, &url).await else { continue };

        let classification = classify(baseline_status, probe_status, &probe_body);
        if let Some(hint) = tech_stack_hint {
            let mut patch = serde_json::Map::new();
            patch.insert("tech_stack_hint".to_string(), json!(hint));
            ctx.graph.patch_node(ctx.mission_id(), &endpoint.id, patch).await?;
        }

        if classification != Classification::PossibleVulnerability {
            continue;
        }
        possible += 1;
        let evidence = Evidence::new(
            "verification_probe",
            format!("status diff {} -> {}, size diff {} -> {}", baseline_status.as_u16(), probe_status.as_u16(), baseline_body.len(), probe_body.len()),
            probe_body.chars().take(500).collect::<String>(),
        );
        let mut vuln = ingest::vulnerability_node(
            ctx.mission_id(),
            &endpoint.id,
            "BEHAVIORAL_ANOMALY",
            "POSSIBLE",
            0.4,
            json!({
                "url": url,
                "status_diff": format!("{}->{}", baseline_status.as_u16(), probe_status.as_u16()),
            }),
        );
        vuln.append_evidence(evidence);
        clamp_score_fields(&mut vuln.properties);
        vulnerability_nodes.push(vuln);
    }

    // Theoretical materialization: untested priority >= 4 hypotheses never reach a probe.
    let (hypotheses, _) = ctx.graph.query_nodes(ctx.mission_id(), Some(&[NodeType::Hypothesis]), None, u32::MAX, 0).await?;
    let mut theoretical = 0;
    for hypothesis in hypotheses.iter().filter(|h| {
        let priority = h.properties.get("priority").and_then(|v| v.as_u64()).unwrap_or(0);
        let tested = h.properties.get("tested").and_then(|v| v.as_bool()).unwrap_or(false);
        priority >= PRIORITY_THRESHOLD as u64 && !tested
    }) {
        let endpoint_id = hypothesis.id.rsplit_once(':').map(|(endpoint, _)| endpoint).unwrap_or(&hypothesis.id);
        let attack_type = hypothesis.properties.get("attack_type").and_then(|v| v.as_str()).unwrap_or("UNKNOWN");
        vulnerability_nodes.push(ingest::vulnerability_node(
            ctx.mission_id(),
            endpoint_id,
            attack_type,
            "THEORETICAL",
            hypothesis.properties.get("confidence").and_then(|v| v.as_f64()).unwrap_or(0.3),
            json!({"reason": "priority hypothesis never reached an active probe"}),
        ));
        theoretical += 1;
    }

    if !vulnerability_nodes.is_empty() {
        ctx.graph.batch_upsert(ctx.mission_id(), vulnerability_nodes, Vec::new(), &apex).await?;
    }

    let outcome = PhaseOutcome { candidates_tested: candidates.len(), possible_vulnerabilities: possible, theoretical_vulnerabilities: theoretical };
    ctx.emit(EventType::PhaseCompleted, "VERIFICATION", serde_json::to_value(&outcome).unwrap_or_default());
    Ok(outcome)
}
