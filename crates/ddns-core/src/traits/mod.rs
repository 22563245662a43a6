//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProvider`]: Read and update the managed DNS record
//! - [`IpSource`]: Resolve the host's public IPv4 address
//! - [`Notifier`]: Tell an operator that the record changed

pub mod dns_provider;
pub mod ip_source;
pub mod notifier;

pub use dns_provider::{DnsProvider, RecordSnapshot, UpdateResult};
pub use ip_source::IpSource;
pub use notifier::Notifier;
