//! Error types for the DDNS updater
//!
//! Each component fails with its own error enum so the engine can branch on
//! the kind of failure instead of matching on strings:
//!
//! - [`ConfigError`]: fatal, startup only
//! - [`ResolutionError`]: per cycle, the cycle is skipped
//! - [`ProviderError`]: per cycle, read failures fall back to the cache,
//!   write failures abort without persisting
//! - [`StateError`]: per cycle, logged and otherwise ignored

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Aggregate error type for callers that do not care which component failed
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IP resolution errors
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// DNS provider errors
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// State store errors
    #[error(transparent)]
    State(#[from] StateError),
}

/// Configuration errors, reported before any network activity
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the expected shape
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required field is missing or empty
    #[error("{field} not configured")]
    MissingField { field: &'static str },

    /// A required field still holds the template placeholder
    #[error("{field} not configured (still set to placeholder {value:?})")]
    Placeholder {
        field: &'static str,
        value: &'static str,
    },

    /// The domain is not a syntactically valid DNS name
    #[error("invalid domain {domain:?}: {reason}")]
    InvalidDomain { domain: String, reason: String },

    /// Any other field holds an unusable value
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Failure to determine the current public IPv4 address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The DNS lookup itself failed
    #[error("DNS lookup for {fqdn} failed: {reason}")]
    Lookup { fqdn: String, reason: String },

    /// The DNS lookup succeeded but returned no IPv4 address
    #[error("no IPv4 address found for {fqdn}")]
    NoIpv4Address { fqdn: String },

    /// A strategy exceeded its time budget
    #[error("{strategy} timed out after {secs}s")]
    Timeout { strategy: String, secs: u64 },

    /// The IP-echo service could not be reached or answered with an error
    #[error("IP echo request to {url} failed: {reason}")]
    Echo { url: String, reason: String },

    /// A strategy produced text that is not an IPv4 address
    #[error("{strategy} returned an invalid IPv4 address: {value:?}")]
    InvalidAddress { strategy: String, value: String },

    /// Every strategy in the chain failed
    #[error("all IP resolution strategies failed: {}", format_causes(.causes))]
    Exhausted {
        causes: Vec<(&'static str, ResolutionError)>,
    },

    /// The chain was built without any strategy
    #[error("no IP resolution strategy configured")]
    NoStrategies,
}

fn format_causes(causes: &[(&'static str, ResolutionError)]) -> String {
    causes
        .iter()
        .map(|(name, err)| format!("[{name}] {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure talking to the DNS provider's HTTP API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The request did not complete within the client timeout
    #[error("{operation} request timed out")]
    Timeout { operation: &'static str },

    /// Connection-level failure (DNS, TLS, reset, ...)
    #[error("{operation} request failed: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    /// The provider answered with a non-success status
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The lookup succeeded but no matching A record exists
    #[error("no DNS record found for {name}")]
    RecordNotFound { name: String },

    /// The response body could not be decoded
    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Invalid credentials or insufficient permissions
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// The provider asked us to slow down
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status: 429, .. })
    }

    /// Failure likely to clear up by the next cycle
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Status { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::RecordNotFound { .. } | Self::InvalidResponse(_) => false,
        }
    }
}

/// Failure persisting the last-known IP
#[derive(Error, Debug)]
pub enum StateError {
    /// The state directory could not be created
    #[error("failed to create state directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file could not be written or replaced
    #[error("failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
