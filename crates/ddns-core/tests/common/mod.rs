//! Test doubles and common utilities for engine contract tests
//!
//! Every double appends to a shared [`CallLog`] so tests can assert both how
//! often each component ran and in which order.

#![allow(dead_code)]

use ddns_core::config::{
    DdnsConfig, EngineConfig, IpSourceConfig, NotifierConfig, ProviderConfig,
};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, IpSource, Notifier, RecordSnapshot, UpdateResult};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

/// One component invocation, as observed by the doubles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch(String),
    Resolve,
    Update { record_id: String, new_ip: Ipv4Addr },
    Notify { record_name: String, new_ip: Ipv4Addr },
}

/// Shared, ordered record of calls
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.count(|c| matches!(c, Call::Fetch(_)))
    }

    pub fn resolves(&self) -> usize {
        self.count(|c| matches!(c, Call::Resolve))
    }

    pub fn updates(&self) -> usize {
        self.count(|c| matches!(c, Call::Update { .. }))
    }

    pub fn notifications(&self) -> usize {
        self.count(|c| matches!(c, Call::Notify { .. }))
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }
}

/// How the mock provider answers `fetch_record`
#[derive(Clone)]
pub enum FetchBehavior {
    Record { id: String, ip: String },
    Empty,
    Fail,
}

/// A DnsProvider that records calls and answers from a script
pub struct MockDnsProvider {
    log: CallLog,
    fetch: FetchBehavior,
    fail_update: bool,
    dry_run: bool,
}

impl MockDnsProvider {
    /// Provider holding one A record `id` with content `ip`
    pub fn with_record(log: &CallLog, id: &str, ip: &str) -> Self {
        Self {
            log: log.clone(),
            fetch: FetchBehavior::Record {
                id: id.to_string(),
                ip: ip.to_string(),
            },
            fail_update: false,
            dry_run: false,
        }
    }

    /// Provider whose record list is empty
    pub fn without_record(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fetch: FetchBehavior::Empty,
            fail_update: false,
            dry_run: false,
        }
    }

    /// Provider whose read request fails
    pub fn failing_fetch(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fetch: FetchBehavior::Fail,
            fail_update: false,
            dry_run: false,
        }
    }

    pub fn failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn fetch_record(&self, record_name: &str) -> Result<RecordSnapshot> {
        self.log.push(Call::Fetch(record_name.to_string()));

        match &self.fetch {
            FetchBehavior::Record { id, ip } => Ok(RecordSnapshot {
                record_id: id.clone(),
                name: record_name.to_string(),
                current_ip: ip.clone(),
            }),
            FetchBehavior::Empty => Err(Error::no_record_found(record_name)),
            FetchBehavior::Fail => Err(Error::provider("mock", "connection reset")),
        }
    }

    async fn update_record(&self, record_id: &str, new_ip: Ipv4Addr) -> Result<UpdateResult> {
        self.log.push(Call::Update {
            record_id: record_id.to_string(),
            new_ip,
        });

        if self.fail_update {
            return Err(Error::provider("mock", "HTTP 500"));
        }

        let record_id = record_id.to_string();
        if self.dry_run {
            Ok(UpdateResult::DryRun { record_id, new_ip })
        } else {
            Ok(UpdateResult::Updated { record_id, new_ip })
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// An IpSource that returns a fixed address, or fails
pub struct StaticIpSource {
    log: CallLog,
    ip: Option<Ipv4Addr>,
}

impl StaticIpSource {
    pub fn new(log: &CallLog, ip: &str) -> Self {
        Self {
            log: log.clone(),
            ip: Some(ip.parse().expect("valid test IP")),
        }
    }

    pub fn failing(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            ip: None,
        }
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.log.push(Call::Resolve);
        self.ip
            .ok_or_else(|| Error::resolution("connection refused", "HTTP 503"))
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// A Notifier that records calls and optionally fails
pub struct MockNotifier {
    log: CallLog,
    fail: bool,
}

impl MockNotifier {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail: false,
        }
    }

    pub fn failing(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail: true,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, record_name: &str, new_ip: Ipv4Addr) -> Result<()> {
        self.log.push(Call::Notify {
            record_name: record_name.to_string(),
            new_ip,
        });

        if self.fail {
            Err(Error::notification("authentication rejected"))
        } else {
            Ok(())
        }
    }

    fn notifier_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(record_name: &str) -> DdnsConfig {
    DdnsConfig {
        record_name: record_name.to_string(),
        provider: ProviderConfig::Cloudflare {
            zone_id: "test-zone".to_string(),
            auth_email: "ops@example.com".to_string(),
            api_key: "test-key".to_string(),
            api_base: "http://127.0.0.1:0".to_string(),
        },
        ip_source: IpSourceConfig::default(),
        notifier: NotifierConfig::Smtp {
            host: "smtp.example.com".to_string(),
            port: 465,
            username: "ddns".to_string(),
            password: "test-password".to_string(),
            recipient: "admin@example.com".to_string(),
            sender: None,
        },
        engine: EngineConfig::default(),
    }
}
