// # ddns-core
//
// Core library for the one-shot Cloudflare DDNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **DnsProvider**: Trait for reading and updating the A record via a provider API
// - **IpSource**: Trait for resolving the public IPv4 address
// - **Notifier**: Trait for announcing a change to an operator
// - **DdnsEngine**: Runs one fetch → resolve → compare → update → notify pass
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Library-First**: All core functionality can be used as a library
// 3. **Single-Shot**: One pass per process; scheduling is the host's job
// 4. **No Hidden State**: Configuration is passed explicitly, nothing is persisted

pub mod config;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, EngineConfig, IpSourceConfig, NotifierConfig, ProviderConfig};
pub use engine::{DdnsEngine, NotificationStatus, RunOutcome};
pub use error::{Error, Result};
pub use traits::{DnsProvider, IpSource, Notifier, RecordSnapshot, UpdateResult};
