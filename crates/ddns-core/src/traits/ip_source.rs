// # IP Source Trait
//
// Defines the interface for resolving the host's public IPv4 address.
//
// ## Implementations
//
// - HTTP lookup services with one fallback: `ddns-ip-http` crate

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for public IP resolvers
///
/// Resolvers are observers: they report the address and never decide whether
/// DNS needs to change.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The public address
    /// - `Err(Error::Resolution)`: No lookup produced an address
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Short name for logging
    fn source_name(&self) -> &'static str;
}
