// # SMTP Notifier
//
// Sends one plain-text email per DNS change over an authenticated SMTP
// submission connection with implicit TLS (port 465 by default).
//
// The transport is built for each notification and dropped afterwards, so
// every call opens and closes exactly one connection.
//
// ## Security Requirements
//
// - SMTP password NEVER appears in logs

use async_trait::async_trait;
use chrono::{DateTime, Local};
use ddns_core::config::{EngineConfig, NotifierConfig};
use ddns_core::traits::Notifier;
use ddns_core::{Error, Result};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Email notifier over SMTP with implicit TLS
pub struct SmtpNotifier {
    /// Mail submission host
    host: String,

    /// Submission port
    port: u16,

    /// Login user name
    username: String,

    /// Login password
    /// ⚠️ NEVER log this value
    password: String,

    /// From address
    from: Mailbox,

    /// The single recipient
    to: Mailbox,

    /// Connection and command timeout
    timeout: Duration,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("from", &self.from.to_string())
            .field("to", &self.to.to_string())
            .finish()
    }
}

impl SmtpNotifier {
    /// Create a notifier from configuration
    ///
    /// Addresses are parsed here so a malformed recipient is a configuration
    /// error rather than a failure after the DNS record has changed.
    pub fn from_config(config: &NotifierConfig, engine: &EngineConfig) -> Result<Self> {
        match config {
            NotifierConfig::Smtp {
                host,
                port,
                username,
                password,
                recipient,
                sender,
            } => {
                let from = sender_address(username, host, sender.as_deref());
                let from: Mailbox = from
                    .parse()
                    .map_err(|e| Error::config(format!("Invalid sender address {}: {}", from, e)))?;
                let to: Mailbox = recipient.parse().map_err(|e| {
                    Error::config(format!("Invalid SMTP_RECIPIENT {}: {}", recipient, e))
                })?;

                Ok(Self {
                    host: host.clone(),
                    port: *port,
                    username: username.clone(),
                    password: password.clone(),
                    from,
                    to,
                    timeout: Duration::from_secs(engine.http_timeout_secs),
                })
            }
        }
    }

    /// Build the change email
    fn compose_message(
        &self,
        record_name: &str,
        new_ip: Ipv4Addr,
        now: DateTime<Local>,
    ) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!(
                "Cloudflare DNS record updated: {}",
                now.format("%Y-%m-%d %H:%M:%S")
            ))
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "DNS record {} updated to ip: {}",
                record_name, new_ip
            ))
            .map_err(|e| Error::notification(format!("Failed to build message: {}", e)))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .map_err(|e| {
                Error::notification(format!("Invalid SMTP host {}: {}", self.host, e))
            })?
            .port(self.port)
            .credentials(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ))
            .timeout(Some(self.timeout))
            .build();
        Ok(transport)
    }
}

/// Derive the From address
///
/// An explicit sender wins; a user name that already is an address is used
/// as-is; otherwise the user name is qualified with the SMTP host.
fn sender_address(username: &str, host: &str, sender: Option<&str>) -> String {
    match sender {
        Some(sender) if !sender.trim().is_empty() => sender.trim().to_string(),
        _ if username.contains('@') => username.to_string(),
        _ => format!("{}@{}", username, host),
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, record_name: &str, new_ip: Ipv4Addr) -> Result<()> {
        let message = self.compose_message(record_name, new_ip, Local::now())?;
        let transport = self.transport()?;

        tracing::debug!(
            "Sending change notification to {} via {}:{}",
            self.to,
            self.host,
            self.port
        );

        transport
            .send(message)
            .await
            .map_err(|e| Error::notification(format!("SMTP send via {} failed: {}", self.host, e)))?;

        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "smtp"
    }
}
