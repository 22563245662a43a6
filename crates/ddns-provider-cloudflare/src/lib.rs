// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare DNS provider for the DDNS updater.
//
// - Reads the managed A record (one GET per run)
// - Replaces its content with a new IP (one PATCH per change)
// - Authenticates with the account email and global API key
// - HTTP timeout configured (30 seconds by default)
// - Specific error wording for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - Dry-run mode for safe testing
// - No retry logic and no caching; one request per call
//
// ## Security Requirements
//
// - API key NEVER appears in logs
// - Provider MUST fail fast if credentials are empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=A&name=...`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::{DEFAULT_CLOUDFLARE_API_BASE, EngineConfig, ProviderConfig};
use ddns_core::traits::{DnsProvider, RecordSnapshot, UpdateResult};
use ddns_core::{Error, Result};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloudflare API v4 response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

impl<T> ApiResponse<T> {
    fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "no error details".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{} (code {})", e.message, e.code))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A DNS record as returned by the API
#[derive(Debug, Deserialize)]
struct DnsRecord {
    id: String,
    #[serde(default)]
    name: String,
    content: String,
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform the GET request for the record
/// - Log the intended PATCH payload
/// - **NOT** actually modify the DNS record
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API key.
pub struct CloudflareProvider {
    /// Zone holding the managed record
    zone_id: String,

    /// Account email, sent as `X-Auth-Email`
    auth_email: String,

    /// Global API key, sent as `X-Auth-Key`
    /// ⚠️ NEVER log this value
    api_key: String,

    /// API base URL without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform the GET request but skip the PATCH
    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("zone_id", &self.zone_id)
            .field("auth_email", &self.auth_email)
            .field("api_key", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider against the public API
    ///
    /// # Parameters
    ///
    /// - `zone_id`: Zone holding the record
    /// - `auth_email`: Account email
    /// - `api_key`: Global API key with DNS edit rights on the zone
    /// - `dry_run`: If true, skip the PATCH and only log it
    ///
    /// # Security
    ///
    /// The API key will NEVER be logged or displayed in error messages.
    pub fn new(
        zone_id: impl Into<String>,
        auth_email: impl Into<String>,
        api_key: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        Self::build(
            zone_id.into(),
            auth_email.into(),
            api_key.into(),
            DEFAULT_CLOUDFLARE_API_BASE,
            DEFAULT_HTTP_TIMEOUT,
            dry_run,
        )
    }

    /// Create a provider from configuration
    ///
    /// Timeout and dry-run mode come from the engine settings.
    pub fn from_config(config: &ProviderConfig, engine: &EngineConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare {
                zone_id,
                auth_email,
                api_key,
                api_base,
            } => {
                if engine.dry_run {
                    tracing::warn!(
                        "Cloudflare provider running in DRY-RUN mode - no changes will be made"
                    );
                }

                Self::build(
                    zone_id.clone(),
                    auth_email.clone(),
                    api_key.clone(),
                    api_base,
                    Duration::from_secs(engine.http_timeout_secs),
                    engine.dry_run,
                )
            }
        }
    }

    /// Point the provider at a different API base URL
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn build(
        zone_id: String,
        auth_email: String,
        api_key: String,
        api_base: &str,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        if zone_id.is_empty() {
            return Err(Error::config("Cloudflare zone ID cannot be empty"));
        }
        if auth_email.is_empty() {
            return Err(Error::config("Cloudflare auth email cannot be empty"));
        }
        if api_key.is_empty() {
            return Err(Error::config("Cloudflare API key cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            zone_id,
            auth_email,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
            dry_run,
        })
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.api_base, self.zone_id)
    }

    /// Start an authenticated request
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("X-Auth-Email", &self.auth_email)
            .header("X-Auth-Key", &self.api_key)
            .header("Content-Type", "application/json")
    }

    /// Send a request and unwrap the API envelope
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, context: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("HTTP request failed: {}", e)))?;

        let body: ApiResponse<T> = parse_response(response, context).await?;

        if !body.success {
            return Err(Error::provider(
                "cloudflare",
                format!("{} rejected by API: {}", context, body.error_summary()),
            ));
        }

        body.result.ok_or_else(|| {
            Error::provider("cloudflare", "Invalid response format: result is missing")
        })
    }
}

/// Check the status code and decode the JSON body
async fn parse_response<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<ApiResponse<T>> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(status_error(status, &error_text, context));
    }

    response
        .json()
        .await
        .map_err(|e| Error::provider("cloudflare", format!("Failed to parse response: {}", e)))
}

/// Map an HTTP error status to a provider error
fn status_error(status: StatusCode, error_text: &str, context: &str) -> Error {
    let message = match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: Invalid auth email/API key or insufficient permissions. Status: {}",
            status
        ),
        404 => format!("{} failed: zone or record not found. Status: {}", context, status),
        409 => format!(
            "Conflict: Record is being updated by another process. Status: {}",
            status
        ),
        429 => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        500..=599 => format!(
            "Cloudflare server error (transient): {} - {}",
            status, error_text
        ),
        _ => format!("{} failed: {} - {}", context, status, error_text),
    };
    Error::provider("cloudflare", message)
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Read the first A record named `record_name`
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=home.example.com
    /// X-Auth-Email: <email>
    /// X-Auth-Key: <key>
    /// ```
    async fn fetch_record(&self, record_name: &str) -> Result<RecordSnapshot> {
        tracing::debug!("Looking up A record: {}", record_name);

        let request = self
            .request(Method::GET, &self.records_url())
            .query(&[("type", "A"), ("name", record_name)]);

        let records: Vec<DnsRecord> = self.send(request, "Record lookup").await?;

        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| Error::no_record_found(record_name))?;

        tracing::debug!("Found record ID: {}", record.id);
        Ok(RecordSnapshot {
            record_id: record.id,
            name: if record.name.is_empty() {
                record_name.to_string()
            } else {
                record.name
            },
            current_ip: record.content,
        })
    }

    /// Replace the record content with `new_ip`
    ///
    /// # API Call
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// {"content":"1.2.3.4"}
    /// ```
    async fn update_record(&self, record_id: &str, new_ip: Ipv4Addr) -> Result<UpdateResult> {
        let url = format!("{}/{}", self.records_url(), record_id);
        let payload = serde_json::json!({ "content": new_ip.to_string() });

        tracing::info!(
            "Updating Cloudflare DNS record {} -> {} [mode: {}]",
            record_id,
            new_ip,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH request to {} with payload: {}",
                url,
                payload
            );
            return Ok(UpdateResult::DryRun {
                record_id: record_id.to_string(),
                new_ip,
            });
        }

        let request = self.request(Method::PATCH, &url).json(&payload);
        let record: DnsRecord = self.send(request, "Record update").await?;

        if record.content != new_ip.to_string() {
            tracing::warn!(
                "Cloudflare accepted the update but reports content {} instead of {}",
                record.content,
                new_ip
            );
        }

        Ok(UpdateResult::Updated {
            record_id: record.id,
            new_ip,
        })
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const ZONE: &str = "zone123";
    const RECORD: &str = "home.example.com";

    fn provider(server: &mockito::Server, dry_run: bool) -> CloudflareProvider {
        CloudflareProvider::new(ZONE, "ops@example.com", "secret_key_12345", dry_run)
            .unwrap()
            .with_api_base(&server.url())
    }

    fn lookup_mock(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("GET", "/zones/zone123/dns_records")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("type".into(), "A".into()),
                Matcher::UrlEncoded("name".into(), RECORD.into()),
            ]))
            .match_header("x-auth-email", "ops@example.com")
            .match_header("x-auth-key", "secret_key_12345")
            .with_header("content-type", "application/json")
    }

    #[tokio::test]
    async fn fetch_record_returns_first_match() {
        let mut server = mockito::Server::new_async().await;
        let mock = lookup_mock(&mut server)
            .with_status(200)
            .with_body(
                r#"{"success":true,"errors":[],"result":[
                    {"id":"rec-1","name":"home.example.com","type":"A","content":"1.2.3.4"},
                    {"id":"rec-2","name":"home.example.com","type":"A","content":"9.9.9.9"}
                ]}"#,
            )
            .create_async()
            .await;

        let snapshot = provider(&server, false).fetch_record(RECORD).await.unwrap();

        mock.assert_async().await;
        assert_eq!(snapshot.record_id, "rec-1");
        assert_eq!(snapshot.current_ip, "1.2.3.4");
        assert_eq!(snapshot.name, RECORD);
    }

    #[tokio::test]
    async fn empty_result_is_no_record_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = lookup_mock(&mut server)
            .with_status(200)
            .with_body(r#"{"success":true,"errors":[],"result":[]}"#)
            .create_async()
            .await;

        let err = provider(&server, false).fetch_record(RECORD).await.unwrap_err();

        assert!(matches!(err, Error::NoRecordFound(ref name) if name == RECORD));
    }

    #[tokio::test]
    async fn forbidden_maps_to_authentication_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = lookup_mock(&mut server)
            .with_status(403)
            .with_body(r#"{"success":false,"errors":[{"code":9103,"message":"Unknown X-Auth-Key"}]}"#)
            .create_async()
            .await;

        let err = provider(&server, false).fetch_record(RECORD).await.unwrap_err();

        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("Authentication failed"));
        assert!(!err.to_string().contains("secret_key_12345"));
    }

    #[tokio::test]
    async fn unsuccessful_envelope_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = lookup_mock(&mut server)
            .with_status(200)
            .with_body(
                r#"{"success":false,"errors":[{"code":7003,"message":"Could not route"}],"result":null}"#,
            )
            .create_async()
            .await;

        let err = provider(&server, false).fetch_record(RECORD).await.unwrap_err();

        assert!(err.to_string().contains("Could not route (code 7003)"));
    }

    #[tokio::test]
    async fn malformed_body_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = lookup_mock(&mut server)
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let err = provider(&server, false).fetch_record(RECORD).await.unwrap_err();

        assert!(err.to_string().contains("Failed to parse response"));
    }

    #[tokio::test]
    async fn update_record_patches_content_only() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/zones/zone123/dns_records/rec-1")
            .match_header("x-auth-email", "ops@example.com")
            .match_header("x-auth-key", "secret_key_12345")
            .match_body(Matcher::Exact(r#"{"content":"5.6.7.8"}"#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success":true,"errors":[],"result":
                    {"id":"rec-1","name":"home.example.com","type":"A","content":"5.6.7.8"}}"#,
            )
            .create_async()
            .await;

        let new_ip = Ipv4Addr::new(5, 6, 7, 8);
        let result = provider(&server, false)
            .update_record("rec-1", new_ip)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            result,
            UpdateResult::Updated {
                record_id: "rec-1".to_string(),
                new_ip
            }
        );
    }

    #[tokio::test]
    async fn update_conflict_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PATCH", "/zones/zone123/dns_records/rec-1")
            .with_status(409)
            .with_body(r#"{"success":false,"errors":[]}"#)
            .create_async()
            .await;

        let err = provider(&server, false)
            .update_record("rec-1", Ipv4Addr::new(5, 6, 7, 8))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Conflict"));
    }

    #[tokio::test]
    async fn dry_run_never_patches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let result = provider(&server, true)
            .update_record("rec-1", Ipv4Addr::new(5, 6, 7, 8))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(matches!(result, UpdateResult::DryRun { .. }));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = CloudflareProvider::new(ZONE, "ops@example.com", "", false);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_config_uses_engine_settings() {
        let config = ProviderConfig::Cloudflare {
            zone_id: ZONE.to_string(),
            auth_email: "ops@example.com".to_string(),
            api_key: "secret_key_12345".to_string(),
            api_base: "https://cf.internal/client/v4/".to_string(),
        };
        let engine = EngineConfig {
            dry_run: true,
            http_timeout_secs: 5,
        };

        let provider = CloudflareProvider::from_config(&config, &engine).unwrap();

        assert!(provider.dry_run);
        assert_eq!(provider.api_base, "https://cf.internal/client/v4");
        assert_eq!(provider.provider_name(), "cloudflare");
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let provider =
            CloudflareProvider::new(ZONE, "ops@example.com", "secret_key_12345", false).unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("CloudflareProvider"));
    }
}
