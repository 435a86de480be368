// [libs/domain/pipeline/src/ingest.rs]
//! Typed constructors for the node/edge shapes phases produce. Keeping
//! these in one place means every phase builds `PARAMETER`, `ENDPOINT`
//! etc. nodes with the same property keys (§3 "Entities").

use serde_json::{json, Map, Value};
use warden_graph_model::{Edge, EdgeRelation, Node, NodeType, PropertyBag};

fn bag(pairs: Vec<(&str, Value)>) -> PropertyBag {
    let mut map = Map::new();
    for (key, value) in pairs {
        map.insert(key.to_string(), value);
    }
    map
}

pub fn domain_node(mission_id: &str, apex: &str) -> Node {
    Node::new(format!("domain:{apex}"), NodeType::Domain, mission_id, bag(vec![("apex", json!(apex))]))
}

pub fn subdomain_node(mission_id: &str, host: &str, source: &str) -> Node {
    Node::new(format!("subdomain:{host}"), NodeType::Subdomain, mission_id, bag(vec![("host", json!(host)), ("source", json!(source))]))
}

pub fn http_service_node(
    mission_id: &str,
    url: &str,
    status_code: Option<u16>,
    title: Option<&str>,
    technologies: &[String],
    server: Option<&str>,
) -> Node {
    Node::new(
        format!("http_service:{url}"),
        NodeType::HttpService,
        mission_id,
        bag(vec![
            ("url", json!(url)),
            ("status_code", json!(status_code)),
            ("title", json!(title)),
            ("technologies", json!(technologies)),
            ("server", json!(server)),
        ]),
    )
}

/// Builds the stable endpoint id `endpoint:<url>#<method>`. The method
/// is a suffix, not a prefix: `extract_host` only strips a leading
/// `<type>:` tag and an optional `http(s)://` scheme before taking
/// everything up to the first `/` or `?` as the host, so the URL must
/// sit immediately after the `endpoint:` tag for scope checks to see
/// the right host.
pub fn endpoint_id(url: &str, method: &str) -> String {
    format!("endpoint:{url}#{method}")
}

pub fn endpoint_node(mission_id: &str, url: &str, method: &str, category: &str, confidence: f64) -> Node {
    Node::new(
        endpoint_id(url, method),
        NodeType::Endpoint,
        mission_id,
        bag(vec![
            ("url", json!(url)),
            ("method", json!(method)),
            ("category", json!(category)),
            ("confidence", json!(confidence)),
        ]),
    )
}

pub fn ip_node(mission_id: &str, ip: &str) -> Node {
    Node::new(format!("ip_address:{ip}"), NodeType::IpAddress, mission_id, bag(vec![("ip", json!(ip))]))
}

pub fn asn_node(mission_id: &str, asn: &str, org: Option<&str>, country: Option<&str>) -> Node {
    Node::new(format!("asn:{asn}"), NodeType::Asn, mission_id, bag(vec![("asn", json!(asn)), ("org", json!(org)), ("country", json!(country))]))
}

pub fn dns_record_node(mission_id: &str, host: &str, record_type: &str, values: &[String]) -> Node {
    Node::new(
        format!("dns_record:{host}:{record_type}"),
        NodeType::DnsRecord,
        mission_id,
        bag(vec![("host", json!(host)), ("record_type", json!(record_type)), ("values", json!(values))]),
    )
}

pub fn parameter_node(mission_id: &str, endpoint_id: &str, name: &str, sensitivity: &str) -> Node {
    Node::new(
        format!("parameter:{endpoint_id}:{name}"),
        NodeType::Parameter,
        mission_id,
        bag(vec![("name", json!(name)), ("sensitivity", json!(sensitivity))]),
    )
}

pub fn js_file_node(mission_id: &str, url: &str) -> Node {
    Node::new(format!("js_file:{url}"), NodeType::JsFile, mission_id, bag(vec![("url", json!(url))]))
}

pub fn secret_node(mission_id: &str, source_js: &str, kind: &str, redacted_detail: &str) -> Node {
    Node::new(
        format!("secret:{source_js}:{kind}"),
        NodeType::Secret,
        mission_id,
        bag(vec![("kind", json!(kind)), ("source_js", json!(source_js)), ("detail", json!(redacted_detail))]),
    )
}

pub fn hypothesis_node(mission_id: &str, endpoint_id: &str, attack_type: &str, title: &str, confidence: f64, priority: u8) -> Node {
    Node::new(
        format!("hypothesis:{endpoint_id}:{attack_type}"),
        NodeType::Hypothesis,
        mission_id,
        bag(vec![
            ("attack_type", json!(attack_type)),
            ("title", json!(title)),
            ("confidence", json!(confidence)),
            ("priority", json!(priority)),
            ("tested", json!(false)),
        ]),
    )
}

pub fn vulnerability_node(mission_id: &str, endpoint_id: &str, vuln_type: &str, status: &str, confidence: f64, evidence: Value) -> Node {
    Node::new(
        format!("vulnerability:{endpoint_id}:{vuln_type}"),
        NodeType::Vulnerability,
        mission_id,
        bag(vec![
            ("type", json!(vuln_type)),
            ("status", json!(status)),
            ("confidence", json!(confidence)),
            ("evidence", evidence),
        ]),
    )
}

pub fn attack_path_node(mission_id: &str, subdomain: &str, score: f64, suggested_actions: &[&'static str]) -> Node {
    Node::new(
        format!("attack_path:{subdomain}"),
        NodeType::AttackPath,
        mission_id,
        bag(vec![("subdomain", json!(subdomain)), ("score", json!(score)), ("suggested_actions", json!(suggested_actions))]),
    )
}

pub fn report_node(mission_id: &str, kind: &str, content: Value) -> Node {
    Node::new(format!("report:{mission_id}:{kind}"), NodeType::Report, mission_id, bag(vec![("kind", json!(kind)), ("content", content)]))
}

pub fn edge(relation: EdgeRelation, from: &str, to: &str, mission_id: &str) -> Edge {
    Edge::new(relation, from, to, mission_id, Map::new())
}
