// [libs/infra/tool-client/src/provider.rs]
//! `ToolProvider`: the opaque-invocation boundary for subfinder, httpx,
//! dns, wayback, nuclei and friends (§4.4.1). The pipeline only
//! ever talks to this trait; a concrete implementation translates it
//! into HTTP calls against sidecar tool services.

use crate::contract::*;
use crate::errors::ToolError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{instrument, warn};

#[async_trait]
pub trait ToolProvider: Send + Sync {
    async fn subdomain_enum(&self, input: SubdomainEnumInput) -> Result<SubdomainEnumOutput, ToolError>;
    async fn http_probe(&self, input: HttpProbeInput) -> Result<HttpProbeOutput, ToolError>;
    async fn dns_resolve(&self, input: DnsResolveInput) -> Result<Vec<DnsResolveResult>, ToolError>;
    async fn asn_lookup(&self, input: AsnLookupInput) -> Result<Vec<AsnLookupResult>, ToolError>;
    async fn wayback(&self, input: WaybackInput) -> Result<Vec<WaybackResult>, ToolError>;
    async fn js_mine(&self, input: JsMineInput) -> Result<Vec<JsMineResult>, ToolError>;
    async fn html_crawl(&self, input: HtmlCrawlInput) -> Result<Vec<HtmlCrawlResult>, ToolError>;
    async fn vuln_scan(&self, input: VulnScanInput) -> Result<VulnScanOutput, ToolError>;
}

/// Calls tool sidecars over HTTP, one POST per tool under a shared base
/// URL (`{base_url}/tools/{name}`). Network-family failures retry up to
/// twice with the backoff schedule from §7: 250ms, then 1s.
pub struct HttpToolProvider {
    client: Client,
    base_url: String,
}

impl HttpToolProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("warden-tool-client/0.1")
                .build()
                .expect("reqwest client initialization failed"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[instrument(skip(self, input), fields(tool = tool_name))]
    async fn call<I: Serialize + Sync, O: DeserializeOwned>(&self, tool_name: &str, input: &I) -> Result<O, ToolError> {
        const BACKOFF: [Duration; 2] = [Duration::from_millis(250), Duration::from_secs(1)];
        let url = format!("{}/tools/{}", self.base_url, tool_name);

        let mut last_error = None;
        for (attempt, delay) in std::iter::once(None).chain(BACKOFF.into_iter().map(Some)).enumerate() {
            if let Some(delay) = delay {
                warn!("retrying {tool_name}, attempt {attempt} after {delay:?}");
                tokio::time::sleep(delay).await;
            }
            match self.client.post(&url).json(input).send().await {
                Ok(response) if response.status().is_success() => {
                    return response.json::<O>().await.map_err(|e| ToolError::InvalidOutput(tool_name.to_string(), e.to_string()));
                }
                Ok(response) => {
                    return Err(ToolError::ExecutionFailed(format!("{tool_name}: HTTP {}", response.status())));
                }
                Err(error) => {
                    let mapped = ToolError::from_reqwest(tool_name, error);
                    if !mapped.code().retryable() {
                        return Err(mapped);
                    }
                    last_error = Some(mapped);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| ToolError::ExecutionFailed(tool_name.to_string())))
    }
}

#[async_trait]
impl ToolProvider for HttpToolProvider {
    async fn subdomain_enum(&self, input: SubdomainEnumInput) -> Result<SubdomainEnumOutput, ToolError> {
        self.call("subdomain_enum", &input).await
    }

    async fn http_probe(&self, input: HttpProbeInput) -> Result<HttpProbeOutput, ToolError> {
        self.call("http_probe", &input).await
    }

    async fn dns_resolve(&self, input: DnsResolveInput) -> Result<Vec<DnsResolveResult>, ToolError> {
        self.call("dns_resolve", &input).await
    }

    async fn asn_lookup(&self, input: AsnLookupInput) -> Result<Vec<AsnLookupResult>, ToolError> {
        self.call("asn_lookup", &input).await
    }

    async fn wayback(&self, input: WaybackInput) -> Result<Vec<WaybackResult>, ToolError> {
        self.call("wayback", &input).await
    }

    async fn js_mine(&self, input: JsMineInput) -> Result<Vec<JsMineResult>, ToolError> {
        self.call("js_mine", &input).await
    }

    async fn html_crawl(&self, input: HtmlCrawlInput) -> Result<Vec<HtmlCrawlResult>, ToolError> {
        self.call("html_crawl", &input).await
    }

    async fn vuln_scan(&self, input: VulnScanInput) -> Result<VulnScanOutput, ToolError> {
        self.call("vuln_scan", &input).await
    }
}
