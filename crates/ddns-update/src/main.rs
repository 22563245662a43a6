// # ddns-update - one-shot Cloudflare DDNS updater
//
// This binary is a THIN integration layer: all DDNS logic lives in
// ddns-core and the component crates. It is responsible for:
// 1. Reading configuration from the environment (and an optional `.env` file)
// 2. Initializing logging and the runtime
// 3. Building the provider, IP source and notifier
// 4. Running one engine pass and mapping the result to an exit code
//
// Scheduling is left to the host (systemd timer, cron); each tick starts a
// fresh process. Overlapping runs are not guarded against.
//
// ## Configuration
//
// ### Required
// - `ZONE_ID`, `RECORD_NAME`: Zone and A record to keep in sync
// - `AUTH_EMAIL`, `API_TOKEN`: Cloudflare account email and global API key
// - `SMTP_HOST`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_RECIPIENT`: Mail submission
//
// ### Optional
// - `SMTP_PORT` (465), `SMTP_SENDER`
// - `DDNS_IP_PRIMARY_URL`, `DDNS_IP_FALLBACK_URL`: Public IP lookup services
// - `DDNS_HTTP_TIMEOUT_SECS` (30)
// - `DDNS_CLOUDFLARE_API_BASE`
// - `DDNS_MODE` (live): `dry-run` reads only and logs the intended change
// - `DDNS_LOG_LEVEL` (info)
//
// ## Example
//
// ```bash
// export ZONE_ID=023e105f4ecef8ad9ca31a8372d0c353
// export RECORD_NAME=home.example.com
// export AUTH_EMAIL=ops@example.com
// export API_TOKEN=your_key
// export SMTP_HOST=smtp.example.com
// export SMTP_USERNAME=ddns
// export SMTP_PASSWORD=your_password
// export SMTP_RECIPIENT=admin@example.com
//
// ddns-update
// ```

mod config;

use anyhow::Result;
use config::Config;
use ddns_core::{DdnsEngine, NotificationStatus, RunOutcome};
use ddns_ip_http::HttpIpSource;
use ddns_notify_smtp::SmtpNotifier;
use ddns_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Pass completed (unchanged, or updated even if the email failed)
/// - 1: Configuration or startup error
/// - 2: Runtime error (DNS read/write or IP resolution failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Pass completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // A missing .env file is normal; the real environment takes precedence
    let dotenv = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // One pass, one step at a time
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(engine.run_once());
    match &result {
        Ok(outcome) => report(outcome),
        Err(e) => error!("DDNS update of {} failed: {}", engine.record_name(), e),
    }

    exit_code(&result).into()
}

/// Map the result of a pass to the process exit code
///
/// A failed notification still counts as success: the record is correct.
fn exit_code(result: &ddns_core::Result<RunOutcome>) -> DdnsExitCode {
    match result {
        Ok(_) => DdnsExitCode::Success,
        Err(_) => DdnsExitCode::RuntimeError,
    }
}

/// Build the engine and its components from configuration
fn build_engine(config: &Config) -> Result<DdnsEngine> {
    let ddns = &config.ddns;

    let provider = CloudflareProvider::from_config(&ddns.provider, &ddns.engine)?;
    let ip_source = HttpIpSource::from_config(&ddns.ip_source, &ddns.engine)?;
    let notifier = SmtpNotifier::from_config(&ddns.notifier, &ddns.engine)?;

    let engine = DdnsEngine::new(
        Box::new(provider),
        Box::new(ip_source),
        Some(Box::new(notifier)),
        ddns,
    )?;

    Ok(engine)
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Unchanged { ip } => info!("No change: record already points to {}", ip),
        RunOutcome::Updated {
            previous_ip,
            new_ip,
            dry_run: true,
            ..
        } => info!("[DRY-RUN] Would update {} -> {}", previous_ip, new_ip),
        RunOutcome::Updated {
            previous_ip,
            new_ip,
            notification,
            ..
        } => {
            info!("Record updated {} -> {}", previous_ip, new_ip);
            if let NotificationStatus::Failed(reason) = notification {
                warn!("Operator was not notified: {}", reason);
            }
        }
    }
}
