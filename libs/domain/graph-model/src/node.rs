// [libs/domain/graph-model/src/node.rs]
//! Node entity and the closed `NodeType` set (§3).

use crate::evidence::Evidence;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The closed set of node types. Unknown types MUST be rejected at
/// the write boundary (§3): this is enforced structurally by
/// `NodeType` being a Rust enum rather than a free string, and by
/// `NodeType::parse` returning `None` for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Domain,
    Subdomain,
    HttpService,
    Endpoint,
    Parameter,
    JsFile,
    Secret,
    IpAddress,
    DnsRecord,
    Asn,
    Org,
    Hypothesis,
    Vulnerability,
    AttackPath,
    Report,
    AgentRun,
    ToolCall,
    LlmReasoning,
}

impl NodeType {
    pub const ALL: &'static [NodeType] = &[
        NodeType::Domain,
        NodeType::Subdomain,
        NodeType::HttpService,
        NodeType::Endpoint,
        NodeType::Parameter,
        NodeType::JsFile,
        NodeType::Secret,
        NodeType::IpAddress,
        NodeType::DnsRecord,
        NodeType::Asn,
        NodeType::Org,
        NodeType::Hypothesis,
        NodeType::Vulnerability,
        NodeType::AttackPath,
        NodeType::Report,
        NodeType::AgentRun,
        NodeType::ToolCall,
        NodeType::LlmReasoning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Domain => "DOMAIN",
            NodeType::Subdomain => "SUBDOMAIN",
            NodeType::HttpService => "HTTP_SERVICE",
            NodeType::Endpoint => "ENDPOINT",
            NodeType::Parameter => "PARAMETER",
            NodeType::JsFile => "JS_FILE",
            NodeType::Secret => "SECRET",
            NodeType::IpAddress => "IP_ADDRESS",
            NodeType::DnsRecord => "DNS_RECORD",
            NodeType::Asn => "ASN",
            NodeType::Org => "ORG",
            NodeType::Hypothesis => "HYPOTHESIS",
            NodeType::Vulnerability => "VULNERABILITY",
            NodeType::AttackPath => "ATTACK_PATH",
            NodeType::Report => "REPORT",
            NodeType::AgentRun => "AGENT_RUN",
            NodeType::ToolCall => "TOOL_CALL",
            NodeType::LlmReasoning => "LLM_REASONING",
        }
    }

    pub fn parse(value: &str) -> Option<NodeType> {
        Self::ALL.iter().copied().find(|t| t.as_str() == value)
    }

    /// Whether this type participates in the scope invariant (§3
    /// invariant 2): its id's host component must be a suffix of the
    /// mission's target domain.
    pub fn is_scope_checked(self) -> bool {
        matches!(self, NodeType::Subdomain | NodeType::HttpService | NodeType::Endpoint)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A schemaless property map. Per the design note in §9
/// ("ambient dynamic dicts for node properties"), callers get typed
/// constructor helpers (see `warden_pipeline::ingest`) that build one
/// of these; the store validates required/well-known keys per type at
/// the write boundary (`crate::node::validate_properties`) instead of
/// encoding a full typed variant per `NodeType`, which would force a
/// schema migration here every time a phase adds a new derived field.
pub type PropertyBag = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub node_type: NodeType,
    pub mission_id: String,
    pub properties: PropertyBag,
    pub evidence: Vec<Evidence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: NodeType, mission_id: impl Into<String>, properties: PropertyBag) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            node_type,
            mission_id: mission_id.into(),
            properties,
            evidence: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges `other` into `self` per §3 ("Upsert semantics:
    /// re-inserting the same id merges properties (shallow replace;
    /// evidence arrays append with per-item hash dedup)").
    pub fn merge_in_place(&mut self, incoming_properties: PropertyBag, incoming_evidence: Vec<Evidence>) {
        for (key, value) in incoming_properties {
            self.properties.insert(key, value);
        }
        for item in incoming_evidence {
            self.append_evidence(item);
        }
        clamp_score_fields(&mut self.properties);
        self.updated_at = Utc::now();
    }

    pub fn append_evidence(&mut self, item: Evidence) {
        if !self.evidence.iter().any(|existing| existing.sha256_hash == item.sha256_hash) {
            self.evidence.push(item);
        }
    }
}

/// Clamps the score fields named in §3 invariant 4:
/// `risk_score` in [0,100], `likelihood_score`/`impact_score` in [0,10].
pub fn clamp_score_fields(properties: &mut PropertyBag) {
    clamp_field(properties, "risk_score", 0.0, 100.0);
    clamp_field(properties, "likelihood_score", 0.0, 10.0);
    clamp_field(properties, "impact_score", 0.0, 10.0);
}

fn clamp_field(properties: &mut PropertyBag, key: &str, min: f64, max: f64) {
    if let Some(value) = properties.get(key).and_then(Value::as_f64) {
        let clamped = value.clamp(min, max);
        if clamped != value {
            properties.insert(key.to_string(), serde_json::json!(clamped));
        }
    }
}

/// Computes `risk_score = clamp(likelihood * impact, 0, 100)` per
/// §3 invariant 4 and §8 property 7.
pub fn compute_risk_score(likelihood_score: f64, impact_score: f64) -> f64 {
    (likelihood_score.clamp(0.0, 10.0) * impact_score.clamp(0.0, 10.0)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_round_trips_through_string() {
        for node_type in NodeType::ALL {
            assert_eq!(NodeType::parse(node_type.as_str()), Some(*node_type));
        }
    }

    #[test]
    fn unknown_type_string_does_not_parse() {
        assert_eq!(NodeType::parse("NOT_A_REAL_TYPE"), None);
    }

    #[test]
    fn risk_score_clamps_at_100() {
        assert_eq!(compute_risk_score(11.0, 11.0), 100.0);
    }

    #[test]
    fn merge_appends_evidence_with_dedup_and_overwrites_scalars() {
        let mut node = Node::new("endpoint:x", NodeType::Endpoint, "m1", PropertyBag::new());
        node.properties.insert("category".into(), serde_json::json!("API"));

        let evidence_one = Evidence::new("baseline", "summary", "detail");
        node.append_evidence(evidence_one.clone());
        node.append_evidence(evidence_one.clone());
        assert_eq!(node.evidence.len(), 1);

        let mut update = PropertyBag::new();
        update.insert("category".into(), serde_json::json!("ADMIN"));
        node.merge_in_place(update, vec![Evidence::new("test", "summary2", "detail2")]);

        assert_eq!(node.properties.get("category").unwrap(), "ADMIN");
        assert_eq!(node.evidence.len(), 2);
    }

    #[test]
    fn merge_clamps_out_of_range_scores() {
        let mut node = Node::new("endpoint:x", NodeType::Endpoint, "m1", PropertyBag::new());
        let mut update = PropertyBag::new();
        update.insert("risk_score".into(), serde_json::json!(121.0));
        node.merge_in_place(update, vec![]);
        assert_eq!(node.properties.get("risk_score").unwrap(), 100.0);
    }
}
