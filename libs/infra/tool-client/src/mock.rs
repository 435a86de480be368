// [libs/infra/tool-client/src/mock.rs]
//! An in-memory `ToolProvider` for pipeline tests, so phase logic can
//! be exercised without a live subfinder/httpx/nuclei sidecar.

use crate::contract::*;
use crate::errors::ToolError;
use crate::provider::ToolProvider;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MockToolProvider {
    pub subdomains: Vec<String>,
    pub http_probe_results: Vec<HttpProbeResult>,
    pub dns_results: Vec<DnsResolveResult>,
    pub asn_results: Vec<AsnLookupResult>,
    pub wayback_results: Vec<WaybackResult>,
    pub js_mine_results: Vec<JsMineResult>,
    pub html_crawl_results: Vec<HtmlCrawlResult>,
    pub vuln_scan_findings: Vec<VulnScanFinding>,
    pub calls: Mutex<HashMap<&'static str, u32>>,
}

impl MockToolProvider {
    async fn record(&self, tool: &'static str) {
        let mut calls = self.calls.lock().await;
        *calls.entry(tool).or_insert(0) += 1;
    }
}

#[async_trait]
impl ToolProvider for MockToolProvider {
    async fn subdomain_enum(&self, _input: SubdomainEnumInput) -> Result<SubdomainEnumOutput, ToolError> {
        self.record("subdomain_enum").await;
        Ok(SubdomainEnumOutput {
            subdomains: self.subdomains.clone(),
        })
    }

    async fn http_probe(&self, _input: HttpProbeInput) -> Result<HttpProbeOutput, ToolError> {
        self.record("http_probe").await;
        Ok(HttpProbeOutput {
            results: self.http_probe_results.clone(),
        })
    }

    async fn dns_resolve(&self, _input: DnsResolveInput) -> Result<Vec<DnsResolveResult>, ToolError> {
        self.record("dns_resolve").await;
        Ok(self.dns_results.clone())
    }

    async fn asn_lookup(&self, _input: AsnLookupInput) -> Result<Vec<AsnLookupResult>, ToolError> {
        self.record("asn_lookup").await;
        Ok(self.asn_results.clone())
    }

    async fn wayback(&self, _input: WaybackInput) -> Result<Vec<WaybackResult>, ToolError> {
        self.record("wayback").await;
        Ok(self.wayback_results.clone())
    }

    async fn js_mine(&self, _input: JsMineInput) -> Result<Vec<JsMineResult>, ToolError> {
        self.record("js_mine").await;
        Ok(self.js_mine_results.clone())
    }

    async fn html_crawl(&self, _input: HtmlCrawlInput) -> Result<Vec<HtmlCrawlResult>, ToolError> {
        self.record("html_crawl").await;
        Ok(self.html_crawl_results.clone())
    }

    async fn vuln_scan(&self, _input: VulnScanInput) -> Result<VulnScanOutput, ToolError> {
        self.record("vuln_scan").await;
        Ok(VulnScanOutput {
            vulnerabilities: self.vuln_scan_findings.clone(),
        })
    }
}
