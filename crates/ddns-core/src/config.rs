//! Configuration types for the DDNS updater
//!
//! The configuration is built once at process start and handed to each
//! component by reference. Validation is limited to presence checks.

use serde::{Deserialize, Serialize};

/// Cloudflare API v4 base URL
pub const DEFAULT_CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Primary public IP lookup service (plain-text IPv4 body)
pub const DEFAULT_PRIMARY_IP_URL: &str = "https://api.ipify.org";

/// Fallback public IP lookup service (plain-text IPv4 body)
pub const DEFAULT_FALLBACK_IP_URL: &str = "https://ipv4.icanhazip.com";

/// SMTP submission port with implicit TLS
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// The A record to keep in sync (e.g., "home.example.com")
    pub record_name: String,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Public IP lookup configuration
    #[serde(default)]
    pub ip_source: IpSourceConfig,

    /// Change notification configuration
    pub notifier: NotifierConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        require("RECORD_NAME", &self.record_name)?;
        self.provider.validate()?;
        self.ip_source.validate()?;
        self.notifier.validate()?;

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider, authenticated with the account email and API key
    Cloudflare {
        /// Zone ID holding the record
        zone_id: String,
        /// Account email sent as `X-Auth-Email`
        auth_email: String,
        /// API key sent as `X-Auth-Key`
        api_key: String,
        /// API base URL
        #[serde(default = "default_cloudflare_api_base")]
        api_base: String,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                zone_id,
                auth_email,
                api_key,
                api_base,
            } => {
                require("ZONE_ID", zone_id)?;
                require("AUTH_EMAIL", auth_email)?;
                require("API_TOKEN", api_key)?;
                require("DDNS_CLOUDFLARE_API_BASE", api_base)?;
                Ok(())
            }
        }
    }
}

// Hides the API key
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cloudflare {
                zone_id,
                auth_email,
                api_base,
                ..
            } => f
                .debug_struct("Cloudflare")
                .field("zone_id", zone_id)
                .field("auth_email", auth_email)
                .field("api_key", &"<REDACTED>")
                .field("api_base", api_base)
                .finish(),
        }
    }
}

/// Public IP lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpSourceConfig {
    /// Plain-text HTTP lookup with exactly one fallback service
    Http {
        /// URL queried first
        primary_url: String,
        /// URL queried when the primary lookup fails
        fallback_url: String,
    },
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            IpSourceConfig::Http {
                primary_url,
                fallback_url,
            } => {
                require("DDNS_IP_PRIMARY_URL", primary_url)?;
                require("DDNS_IP_FALLBACK_URL", fallback_url)?;
                Ok(())
            }
        }
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        IpSourceConfig::Http {
            primary_url: DEFAULT_PRIMARY_IP_URL.to_string(),
            fallback_url: DEFAULT_FALLBACK_IP_URL.to_string(),
        }
    }
}

/// Change notification configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierConfig {
    /// Email over SMTP with implicit TLS
    Smtp {
        /// Mail submission host
        host: String,
        /// Submission port
        #[serde(default = "default_smtp_port")]
        port: u16,
        /// Login user name
        username: String,
        /// Login password
        password: String,
        /// The single recipient
        recipient: String,
        /// Explicit From address; derived from the user name when absent
        #[serde(default)]
        sender: Option<String>,
    },
}

impl NotifierConfig {
    /// Validate the notifier configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            NotifierConfig::Smtp {
                host,
                username,
                password,
                recipient,
                ..
            } => {
                require("SMTP_HOST", host)?;
                require("SMTP_USERNAME", username)?;
                require("SMTP_PASSWORD", password)?;
                require("SMTP_RECIPIENT", recipient)?;
                Ok(())
            }
        }
    }
}

// Hides the SMTP password
impl std::fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifierConfig::Smtp {
                host,
                port,
                username,
                recipient,
                sender,
                ..
            } => f
                .debug_struct("Smtp")
                .field("host", host)
                .field("port", port)
                .field("username", username)
                .field("password", &"<REDACTED>")
                .field("recipient", recipient)
                .field("sender", sender)
                .finish(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Read everything, but skip the DNS mutation and the email
    #[serde(default)]
    pub dry_run: bool,

    /// Timeout applied to every outbound request (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn require(key: &str, value: &str) -> Result<(), crate::Error> {
    if value.trim().is_empty() {
        return Err(crate::Error::config(format!("{} is required", key)));
    }
    Ok(())
}

fn default_cloudflare_api_base() -> String {
    DEFAULT_CLOUDFLARE_API_BASE.to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_http_timeout_secs() -> u64 {
    30
}
