// # Notifier Trait
//
// Defines the interface for telling an operator that the record changed.
//
// ## Implementations
//
// - Email over SMTP: `ddns-notify-smtp` crate

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for change notifiers
///
/// Notification is best-effort: the engine never rolls back or retries a DNS
/// update because the notifier failed.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce that `record_name` now points at `new_ip`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The message was accepted for delivery
    /// - `Err(Error::Notification)`: Composing or sending failed
    async fn notify(&self, record_name: &str, new_ip: Ipv4Addr) -> Result<(), crate::Error>;

    /// Short name for logging
    fn notifier_name(&self) -> &'static str;
}
