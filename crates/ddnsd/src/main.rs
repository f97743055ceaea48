// # ddnsd - GoDaddy DDNS Daemon
//
// The ddnsd daemon is a thin wiring layer over `ddns-core`. It is
// responsible for:
// 1. Reading daemon settings from environment variables
// 2. Initializing logging (console + append-only log file)
// 3. Loading and validating the JSON configuration file
// 4. Building the resolver chain, the GoDaddy provider and the state store
// 5. Running the scheduler until SIGINT/SIGTERM
//
// ## Configuration
//
// Account, domain and timing settings live in the JSON configuration file
// (see `config.json.example`). Daemon knobs are environment variables:
//
// - `DDNS_CONFIG_PATH`: Path to the configuration file (default `config.json`)
// - `DDNS_STATE_STORE_TYPE`: Type of state store (file, memory; default file)
// - `DDNS_STATE_STORE_PATH`: Path to state file (default `last_ip.txt`)
// - `DDNS_LOG_FILE`: Append-only log file (default `ip_log.txt`)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `DDNS_MODE`: `dry-run` to read from GoDaddy but never write
//
// ## Example
//
// ```bash
// export DDNS_CONFIG_PATH=/etc/ddns/config.json
// export DDNS_STATE_STORE_PATH=/var/lib/ddns/last_ip.txt
// export DDNS_LOG_FILE=/var/log/ddns/ip_log.txt
//
// ddnsd
// ```

mod logging;

use anyhow::{Context, Result};
use ddns_core::{
    Config, FileStateStore, IpResolver, MemoryStateStore, Scheduler, StateStore, UpdateEngine,
    fqdn,
};
use ddns_ip_dns::DnsLookupSource;
use ddns_ip_http::HttpIpSource;
use ddns_provider_godaddy::GoDaddyProvider;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StateStoreType {
    File,
    Memory,
}

/// Daemon settings, read from `DDNS_*` environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
struct DaemonSettings {
    config_path: PathBuf,
    state_store_type: StateStoreType,
    state_store_path: PathBuf,
    log_file: PathBuf,
    log_level: Level,
    dry_run: bool,
}

impl DaemonSettings {
    /// Load settings from the process environment
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through `lookup`, unset and empty values take defaults
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let state_store_type = match var("DDNS_STATE_STORE_TYPE", "file").to_lowercase().as_str() {
            "file" => StateStoreType::File,
            "memory" => StateStoreType::Memory,
            other => anyhow::bail!(
                "DDNS_STATE_STORE_TYPE '{}' is not supported. \
                Supported types: file, memory",
                other
            ),
        };

        let log_level = match var("DDNS_LOG_LEVEL", "info").to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        let mode = var("DDNS_MODE", "live").to_lowercase();
        let dry_run = match mode.as_str() {
            "dry-run" => true,
            "live" => false,
            other => anyhow::bail!(
                "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        Ok(Self {
            config_path: PathBuf::from(var("DDNS_CONFIG_PATH", "config.json")),
            state_store_type,
            state_store_path: PathBuf::from(var("DDNS_STATE_STORE_PATH", "last_ip.txt")),
            log_file: PathBuf::from(var("DDNS_LOG_FILE", "ip_log.txt")),
            log_level,
            dry_run,
        })
    }
}

fn main() -> ExitCode {
    // Load daemon settings from environment
    let settings = match DaemonSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = logging::init(settings.log_level, &settings.log_file) {
        eprintln!("Failed to initialize logging: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let config = match Config::load(&settings.config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Error loading config: {}", e);
            error!("Please create config.json based on config.json.example");
            return DdnsExitCode::ConfigError.into();
        }
    };

    info!("GoDaddy DNS Updater started");
    info!("Monitoring domain: {}", config.domain);
    info!("Record name: {}", config.record_name);
    info!("Check interval: {} minutes", config.check_interval_minutes());

    // Cycles never overlap, a single-threaded runtime is enough
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

    let result = rt.block_on(async {
        let scheduler = match build_scheduler(&config, &settings).await {
            Ok(scheduler) => scheduler,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        match run_daemon(scheduler).await {
            Ok(()) => DdnsExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Wire the engine's collaborators from configuration
async fn build_scheduler(config: &Config, settings: &DaemonSettings) -> Result<Scheduler> {
    let record_fqdn = fqdn(&config.domain, &config.record_name);

    let resolver = IpResolver::new(vec![Box::new(DnsLookupSource::new(record_fqdn))])
        .with_fallback(Box::new(HttpIpSource::new(config.ip_echo_url.clone())));
    info!("IP resolution strategies: {}", resolver.strategy_names().join(" -> "));

    let provider = GoDaddyProvider::from_config(config, settings.dry_run)
        .context("failed to create GoDaddy provider")?;

    let state_store: Box<dyn StateStore> = match settings.state_store_type {
        StateStoreType::File => {
            let store = FileStateStore::new(&settings.state_store_path)
                .await
                .context("failed to open state store")?;
            info!("State store: file ({})", store.path().display());
            Box::new(store)
        }
        StateStoreType::Memory => {
            info!("State store: memory");
            Box::new(MemoryStateStore::new())
        }
    };

    let engine = UpdateEngine::new(Box::new(resolver), Box::new(provider), state_store);
    Ok(Scheduler::new(engine, config.check_interval))
}

/// Run the scheduler until a shutdown signal arrives
async fn run_daemon(scheduler: Scheduler) -> Result<()> {
    let mut signals = ShutdownSignals::install()?;

    let cycles = scheduler
        .run_with_shutdown(async move {
            let signal = signals.recv().await;
            info!("Received shutdown signal: {}", signal);
        })
        .await;

    info!("Shutting down daemon after {} cycle(s)", cycles);
    Ok(())
}

/// SIGTERM/SIGINT handlers, registered before the first cycle runs
#[cfg(unix)]
struct ShutdownSignals {
    sigterm: Signal,
    sigint: Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
        let sigint = signal(SignalKind::interrupt())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;
        Ok(Self { sigterm, sigint })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

/// CTRL-C only, for non-Unix platforms
#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                std::future::pending().await
            }
        }
    }
}
