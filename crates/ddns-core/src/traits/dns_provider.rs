// # DNS Provider Trait
//
// Defines the interface for reading and updating the managed A record via a
// provider API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// async fn sync(provider: &dyn DnsProvider) -> ddns_core::Result<()> {
//     let snapshot = provider.fetch_record("home.example.com").await?;
//     provider
//         .update_record(&snapshot.record_id, "5.6.7.8".parse().unwrap())
//         .await?;
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// The provider's view of the managed record, read fresh on every run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSnapshot {
    /// Opaque provider-assigned record identifier
    pub record_id: String,
    /// The record name
    pub name: String,
    /// Record content as text (dotted-quad IPv4 for a healthy A record)
    pub current_ip: String,
}

impl RecordSnapshot {
    /// Whether the record already points at `ip`
    pub fn points_to(&self, ip: Ipv4Addr) -> bool {
        self.current_ip == ip.to_string()
    }
}

/// Result of a DNS update operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Record content was replaced
    Updated {
        /// The record that was changed
        record_id: String,
        /// The new content
        new_ip: Ipv4Addr,
    },
    /// Provider is in dry-run mode; the mutation was only logged
    DryRun {
        /// The record that would have changed
        record_id: String,
        /// The content it would have received
        new_ip: Ipv4Addr,
    },
}

/// Trait for DNS provider implementations
///
/// Providers are stateless and single-shot: one API call per method
/// invocation, no retries, no caching. Whether an update is needed is decided
/// by [`DdnsEngine`](crate::DdnsEngine), not by the provider.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Read the current A record for `record_name`
    ///
    /// # Returns
    ///
    /// - `Ok(RecordSnapshot)`: The first matching A record
    /// - `Err(Error::NoRecordFound)`: The provider has no A record with that name
    /// - `Err(Error::Provider)`: The request failed or the response was malformed
    async fn fetch_record(&self, record_name: &str) -> Result<RecordSnapshot, crate::Error>;

    /// Replace the content of record `record_id` with `new_ip`
    ///
    /// No read-after-write verification is performed.
    async fn update_record(
        &self,
        record_id: &str,
        new_ip: Ipv4Addr,
    ) -> Result<UpdateResult, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
