//! Environment configuration for the updater binary

use anyhow::{Context, Result};
use ddns_core::config::{
    DEFAULT_CLOUDFLARE_API_BASE, DEFAULT_FALLBACK_IP_URL, DEFAULT_PRIMARY_IP_URL,
    DEFAULT_SMTP_PORT, DdnsConfig, EngineConfig, IpSourceConfig, NotifierConfig, ProviderConfig,
};
use std::env;
use tracing::Level;

/// Application configuration
#[derive(Debug)]
pub struct Config {
    pub ddns: DdnsConfig,
    pub log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`; empty values count as absent
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).with_context(|| format!("{} is required. Set it via: export {}=...", key, key))
        };

        let ddns = DdnsConfig {
            record_name: required("RECORD_NAME")?,
            provider: ProviderConfig::Cloudflare {
                zone_id: required("ZONE_ID")?,
                auth_email: required("AUTH_EMAIL")?,
                api_key: required("API_TOKEN")?,
                api_base: get("DDNS_CLOUDFLARE_API_BASE")
                    .unwrap_or_else(|| DEFAULT_CLOUDFLARE_API_BASE.to_string()),
            },
            ip_source: IpSourceConfig::Http {
                primary_url: get("DDNS_IP_PRIMARY_URL")
                    .unwrap_or_else(|| DEFAULT_PRIMARY_IP_URL.to_string()),
                fallback_url: get("DDNS_IP_FALLBACK_URL")
                    .unwrap_or_else(|| DEFAULT_FALLBACK_IP_URL.to_string()),
            },
            notifier: NotifierConfig::Smtp {
                host: required("SMTP_HOST")?,
                port: match get("SMTP_PORT") {
                    Some(port) => port
                        .trim()
                        .parse()
                        .with_context(|| format!("SMTP_PORT must be a port number. Got: {}", port))?,
                    None => DEFAULT_SMTP_PORT,
                },
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
                recipient: required("SMTP_RECIPIENT")?,
                sender: get("SMTP_SENDER"),
            },
            engine: EngineConfig {
                dry_run: match get("DDNS_MODE").map(|m| m.trim().to_lowercase()).as_deref() {
                    None | Some("live") => false,
                    Some("dry-run") => true,
                    Some(other) => anyhow::bail!(
                        "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                        other
                    ),
                },
                http_timeout_secs: match get("DDNS_HTTP_TIMEOUT_SECS") {
                    Some(secs) => {
                        let secs: u64 = secs.trim().parse().with_context(|| {
                            format!("DDNS_HTTP_TIMEOUT_SECS must be a number of seconds. Got: {}", secs)
                        })?;
                        if secs == 0 {
                            anyhow::bail!("DDNS_HTTP_TIMEOUT_SECS must be at least 1 second");
                        }
                        secs
                    }
                    None => EngineConfig::default().http_timeout_secs,
                },
            },
        };

        let log_level = match get("DDNS_LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        Ok(Self { ddns, log_level })
    }
}
