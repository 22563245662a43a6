//! Core DDNS engine
//!
//! The DdnsEngine performs one synchronization pass per call:
//!
//! ```text
//! FetchRecord ──► ResolveIP ──► Compare ──┬──► Idle ───────────────┐
//!                                         │                        ▼
//!                                         └──► Update ──► Notify ──► Terminate
//! ```
//!
//! ## Event Flow
//!
//! 1. Read the managed record from the DnsProvider
//! 2. Resolve the public IP from the IpSource
//! 3. If they match, stop
//! 4. Otherwise update the record, then notify
//!
//! A failure in steps 1, 2 or the update ends the pass with an error and
//! nothing after it runs. A failure to notify is logged and reported in the
//! outcome; the update stands.

use crate::config::DdnsConfig;
use crate::error::Result;
use crate::traits::{DnsProvider, IpSource, Notifier, UpdateResult};
use std::net::Ipv4Addr;
use tracing::{debug, error, info, warn};

/// What happened to the change notification after an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    /// The notifier accepted the message
    Sent,
    /// The notifier failed; the DNS update was kept
    Failed(String),
    /// No notification was attempted (dry-run or no notifier)
    Skipped,
}

/// Outcome of one synchronization pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The record already pointed at the public IP
    Unchanged {
        /// The current IP address
        ip: Ipv4Addr,
    },

    /// The record was (or, in dry-run mode, would have been) updated
    Updated {
        /// Record content before the update
        previous_ip: String,
        /// The new IP address
        new_ip: Ipv4Addr,
        /// Whether the provider only logged the mutation
        dry_run: bool,
        /// Notification result
        notification: NotificationStatus,
    },
}

/// Core DDNS engine
///
/// Owns one implementation of each component and sequences them. The engine
/// keeps no state between passes: every call to [`DdnsEngine::run_once`]
/// reads the record and the public IP afresh.
pub struct DdnsEngine {
    /// DNS provider for reading and updating the record
    provider: Box<dyn DnsProvider>,

    /// Public IP resolver
    ip_source: Box<dyn IpSource>,

    /// Change notifier (optional for library users)
    notifier: Option<Box<dyn Notifier>>,

    /// The A record being managed
    record_name: String,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `provider`: DNS provider implementation
    /// - `ip_source`: Public IP resolver implementation
    /// - `notifier`: Change notifier, or `None` to skip notifications
    /// - `config`: DDNS configuration (validated here)
    pub fn new(
        provider: Box<dyn DnsProvider>,
        ip_source: Box<dyn IpSource>,
        notifier: Option<Box<dyn Notifier>>,
        config: &DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            ip_source,
            notifier,
            record_name: config.record_name.clone(),
        })
    }

    /// Name of the managed record
    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    /// Run one synchronization pass
    ///
    /// # Returns
    ///
    /// - `Ok(RunOutcome)`: The pass completed (a failed notification still counts)
    /// - `Err(Error)`: Reading the record, resolving the IP or updating failed
    pub async fn run_once(&self) -> Result<RunOutcome> {
        info!(
            "Checking DNS record {} via {}",
            self.record_name,
            self.provider.provider_name()
        );

        let snapshot = self.provider.fetch_record(&self.record_name).await?;
        debug!(
            "Record {} (id {}) points to {}",
            snapshot.name, snapshot.record_id, snapshot.current_ip
        );

        let public_ip = self.ip_source.current().await?;
        debug!(
            "Public IP resolved via {}: {}",
            self.ip_source.source_name(),
            public_ip
        );

        if snapshot.points_to(public_ip) {
            info!(
                "DNS record {} already points to {}, nothing to do",
                self.record_name, public_ip
            );
            return Ok(RunOutcome::Unchanged { ip: public_ip });
        }

        info!(
            "Public IP changed: {} -> {} ({})",
            snapshot.current_ip, public_ip, self.record_name
        );

        let dry_run = match self
            .provider
            .update_record(&snapshot.record_id, public_ip)
            .await?
        {
            UpdateResult::Updated { .. } => {
                info!("Updated {} -> {}", self.record_name, public_ip);
                false
            }
            UpdateResult::DryRun { .. } => {
                info!("[DRY-RUN] {} left at {}", self.record_name, snapshot.current_ip);
                true
            }
        };

        let notification = if dry_run {
            NotificationStatus::Skipped
        } else {
            self.notify(public_ip).await
        };

        Ok(RunOutcome::Updated {
            previous_ip: snapshot.current_ip,
            new_ip: public_ip,
            dry_run,
            notification,
        })
    }

    /// Send the change notification, absorbing failures
    async fn notify(&self, new_ip: Ipv4Addr) -> NotificationStatus {
        let Some(notifier) = self.notifier.as_ref() else {
            warn!("No notifier configured, skipping change notification");
            return NotificationStatus::Skipped;
        };

        match notifier.notify(&self.record_name, new_ip).await {
            Ok(()) => {
                info!(
                    "Sent change notification via {}",
                    notifier.notifier_name()
                );
                NotificationStatus::Sent
            }
            Err(e) => {
                error!(
                    "DNS record {} was updated to {}, but the {} notification failed: {}",
                    self.record_name,
                    new_ip,
                    notifier.notifier_name(),
                    e
                );
                NotificationStatus::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_equality() {
        let outcome = RunOutcome::Updated {
            previous_ip: "1.2.3.4".to_string(),
            new_ip: Ipv4Addr::new(5, 6, 7, 8),
            dry_run: false,
            notification: NotificationStatus::Failed("smtp down".to_string()),
        };

        assert_eq!(outcome.clone(), outcome);
        assert_ne!(
            outcome,
            RunOutcome::Unchanged {
                ip: Ipv4Addr::new(5, 6, 7, 8)
            }
        );
    }
}
