// [libs/domain/graph-model/src/edge.rs]
//! Edge entity and the closed `EdgeRelation` set (§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use warden_identifiers::edge_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeRelation {
    HasSubdomain,
    ResolvesTo,
    BelongsTo,
    HasRecord,
    ExposesHttp,
    ExposesEndpoint,
    LoadsJs,
    ContainsSecret,
    LeaksSecret,
    HasParam,
    HasHypothesis,
    HasVulnerability,
    Targets,
    HasReport,
    Triggers,
    UsesTool,
    Produces,
    Refines,
    LinksTo,
}

impl EdgeRelation {
    pub const ALL: &'static [EdgeRelation] = &[
        EdgeRelation::HasSubdomain,
        EdgeRelation::ResolvesTo,
        EdgeRelation::BelongsTo,
        EdgeRelation::HasRecord,
        EdgeRelation::ExposesHttp,
        EdgeRelation::ExposesEndpoint,
        EdgeRelation::LoadsJs,
        EdgeRelation::ContainsSecret,
        EdgeRelation::LeaksSecret,
        EdgeRelation::HasParam,
        EdgeRelation::HasHypothesis,
        EdgeRelation::HasVulnerability,
        EdgeRelation::Targets,
        EdgeRelation::HasReport,
        EdgeRelation::Triggers,
        EdgeRelation::UsesTool,
        EdgeRelation::Produces,
        EdgeRelation::Refines,
        EdgeRelation::LinksTo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeRelation::HasSubdomain => "HAS_SUBDOMAIN",
            EdgeRelation::ResolvesTo => "RESOLVES_TO",
            EdgeRelation::BelongsTo => "BELONGS_TO",
            EdgeRelation::HasRecord => "HAS_RECORD",
            EdgeRelation::ExposesHttp => "EXPOSES_HTTP",
            EdgeRelation::ExposesEndpoint => "EXPOSES_ENDPOINT",
            EdgeRelation::LoadsJs => "LOADS_JS",
            EdgeRelation::ContainsSecret => "CONTAINS_SECRET",
            EdgeRelation::LeaksSecret => "LEAKS_SECRET",
            EdgeRelation::HasParam => "HAS_PARAM",
            EdgeRelation::HasHypothesis => "HAS_HYPOTHESIS",
            EdgeRelation::HasVulnerability => "HAS_VULNERABILITY",
            EdgeRelation::Targets => "TARGETS",
            EdgeRelation::HasReport => "HAS_REPORT",
            EdgeRelation::Triggers => "TRIGGERS",
            EdgeRelation::UsesTool => "USES_TOOL",
            EdgeRelation::Produces => "PRODUCES",
            EdgeRelation::Refines => "REFINES",
            EdgeRelation::LinksTo => "LINKS_TO",
        }
    }

    pub fn parse(value: &str) -> Option<EdgeRelation> {
        Self::ALL.iter().copied().find(|r| r.as_str() == value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub relation: EdgeRelation,
    pub from: String,
    pub to: String,
    pub mission_id: String,
    pub properties: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    /// Set when the edge was accepted optimistically without both
    /// endpoints existing yet (§3 invariant 1). Strict-mode
    /// stores reject such edges instead of setting this flag.
    pub dangling: bool,
}

impl Edge {
    pub fn new(
        relation: EdgeRelation,
        from: impl Into<String>,
        to: impl Into<String>,
        mission_id: impl Into<String>,
        properties: Map<String, Value>,
    ) -> Self {
        let from = from.into();
        let to = to.into();
        let mission_id = mission_id.into();
        let id = edge_id(relation.as_str(), &from, &to, &mission_id);
        Self {
            id,
            relation,
            from,
            to,
            mission_id,
            properties,
            created_at: Utc::now(),
            dangling: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_relation_round_trips() {
        for relation in EdgeRelation::ALL {
            assert_eq!(EdgeRelation::parse(relation.as_str()), Some(*relation));
        }
    }

    #[test]
    fn repeated_identical_edge_has_same_id() {
        let a = Edge::new(EdgeRelation::ResolvesTo, "s:a", "ip:1", "m", Map::new());
        let b = Edge::new(EdgeRelation::ResolvesTo, "s:a", "ip:1", "m", Map::new());
        assert_eq!(a.id, b.id);
    }
}
