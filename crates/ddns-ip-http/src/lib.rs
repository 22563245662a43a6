// # HTTP IP Source
//
// This crate resolves the host's public IPv4 address from external
// "what is my IP" services that answer with a plain-text body.
//
// ## Lookup Order
//
// 1. Query the primary service
// 2. On any failure (network error, non-2xx, body that is not an IPv4
//    address), query exactly one fallback service
// 3. If the fallback fails too, report both causes
//
// There is no further chain and no retry.

use ddns_core::config::{EngineConfig, IpSourceConfig};
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use std::net::Ipv4Addr;
use std::time::Duration;

/// Default request timeout for lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP-based public IP resolver with a single fallback
#[derive(Debug)]
pub struct HttpIpSource {
    /// Service queried first
    primary_url: String,

    /// Service queried when the primary fails
    fallback_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `primary_url`: URL queried first (e.g., "https://api.ipify.org")
    /// - `fallback_url`: URL queried if the primary fails
    pub fn new(primary_url: impl Into<String>, fallback_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(primary_url, fallback_url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(
        primary_url: impl Into<String>,
        fallback_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            primary_url: primary_url.into(),
            fallback_url: fallback_url.into(),
            client,
        })
    }

    /// Create an IP source from configuration
    pub fn from_config(config: &IpSourceConfig, engine: &EngineConfig) -> Result<Self> {
        match config {
            IpSourceConfig::Http {
                primary_url,
                fallback_url,
            } => Self::with_timeout(
                primary_url.clone(),
                fallback_url.clone(),
                Duration::from_secs(engine.http_timeout_secs),
            ),
        }
    }

    /// Fetch and parse the IP from one service
    ///
    /// Errors are plain strings; the caller decides whether to fall back.
    async fn fetch_ip(&self, url: &str) -> std::result::Result<Ipv4Addr, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request to {} failed: {}", url, e))?;

        if !response.status().is_success() {
            return Err(format!("HTTP error from {}: {}", url, response.status()));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response from {}: {}", url, e))?;

        parse_ipv4(&ip_text).map_err(|e| format!("{} from {}", e, url))
    }
}

/// Parse a plain-text lookup body into an IPv4 address
fn parse_ipv4(body: &str) -> std::result::Result<Ipv4Addr, String> {
    let ip_text = body.trim();
    ip_text
        .parse()
        .map_err(|_| format!("Invalid IPv4 address {:?}", ip_text))
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let primary_err = match self.fetch_ip(&self.primary_url).await {
            Ok(ip) => {
                tracing::debug!("Public IP from {}: {}", self.primary_url, ip);
                return Ok(ip);
            }
            Err(e) => e,
        };

        tracing::warn!(
            "Primary IP lookup failed, trying {}: {}",
            self.fallback_url,
            primary_err
        );

        match self.fetch_ip(&self.fallback_url).await {
            Ok(ip) => {
                tracing::debug!("Public IP from {}: {}", self.fallback_url, ip);
                Ok(ip)
            }
            Err(fallback_err) => Err(Error::resolution(primary_err, fallback_err)),
        }
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
