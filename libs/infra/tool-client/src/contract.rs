// [libs/infra/tool-client/src/contract.rs]
//! Typed input/output shapes for the external tool contract (§4.4.1).
//! These are the only types a pipeline phase exchanges with a provider;
//! the wire format a provider speaks underneath is its own business.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct SubdomainEnumInput {
    pub domain: String,
    pub all_sources: bool,
    pub recursive: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubdomainEnumOutput {
    pub subdomains: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HttpProbeInput {
    pub urls: Vec<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpProbeResult {
    pub url: String,
    pub status_code: Option<u16>,
    pub title: Option<String>,
    pub technologies: Vec<String>,
    pub ip: Option<String>,
    pub server: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpProbeOutput {
    pub results: Vec<HttpProbeResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DnsResolveInput {
    pub subdomains: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DnsResolveResult {
    pub subdomain: String,
    pub ips: Vec<String>,
    pub records: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AsnLookupInput {
    pub ips: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AsnLookupResult {
    pub ip: String,
    pub asn: Option<String>,
    pub org: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaybackInput {
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaybackResult {
    pub path: String,
    pub method: String,
    pub source: String,
    pub origin: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsMineInput {
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsMineEndpoint {
    pub path: String,
    pub method: String,
    pub source_js: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsMineSecret {
    pub value: String,
    pub kind: String,
    pub source_js: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsMineFindings {
    pub js_files: Vec<String>,
    pub endpoints: Vec<JsMineEndpoint>,
    pub secrets: Vec<JsMineSecret>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsMineResult {
    pub url: String,
    pub js: JsMineFindings,
}

#[derive(Debug, Clone, Serialize)]
pub struct HtmlCrawlInput {
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HtmlCrawlResult {
    pub url: String,
    pub links: Vec<String>,
    pub forms: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VulnScanInput {
    pub targets: Vec<String>,
    pub templates: Vec<String>,
    pub severity: Vec<String>,
    pub rate_limit: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VulnScanFinding {
    pub host: String,
    pub template_id: String,
    pub severity: String,
    pub matched_at: String,
    pub matcher_name: String,
    pub extracted_results: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VulnScanOutput {
    pub vulnerabilities: Vec<VulnScanFinding>,
}
