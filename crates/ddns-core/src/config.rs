//! Configuration types for the DDNS updater
//!
//! The configuration is a JSON file loaded once at startup:
//!
//! ```json
//! {
//!   "godaddy_api_key": "...",
//!   "godaddy_api_secret": "...",
//!   "domain": "example.com",
//!   "record_name": "@",
//!   "check_interval_minutes": 5,
//!   "ttl": 600
//! }
//! ```
//!
//! [`RawConfig`] mirrors the file; [`Config`] is the validated form with
//! defaults applied. Validation happens before any network activity.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::resolver::canonical_record_name;

/// Default GoDaddy API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.godaddy.com";

/// Default IP-echo service, returns the caller's IP as plain text
pub const DEFAULT_IP_ECHO_URL: &str = "https://api.ipify.org?format=text";

/// Check interval used when the configured one is missing or not positive
pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 5;

/// TTL used when the configured one is missing or not positive
pub const DEFAULT_TTL_SECS: u32 = 600;

/// Placeholder values shipped in `config.json.example`
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";
pub const PLACEHOLDER_API_SECRET: &str = "YOUR_API_SECRET_HERE";
pub const PLACEHOLDER_DOMAIN: &str = "YOUR_DOMAIN_HERE";

/// Configuration file as written by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub godaddy_api_key: String,

    #[serde(default)]
    pub godaddy_api_secret: String,

    #[serde(default)]
    pub domain: String,

    /// Record name, `"@"` (apex) when absent or empty
    #[serde(default)]
    pub record_name: Option<String>,

    /// Minutes between checks, 5 when absent or not positive
    #[serde(default)]
    pub check_interval_minutes: Option<i64>,

    /// Record TTL in seconds, 600 when absent or not positive
    #[serde(default)]
    pub ttl: Option<i64>,

    /// Override for the GoDaddy API base (e.g. the OTE test environment)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Override for the IP-echo service
    #[serde(default)]
    pub ip_echo_url: Option<String>,
}

/// Validated configuration, immutable for the process lifetime
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    /// ⚠️ NEVER log this value
    pub api_secret: String,
    pub domain: String,
    /// Canonical record name (`"@"` for the apex)
    pub record_name: String,
    pub check_interval: Duration,
    pub ttl: u32,
    pub api_base_url: String,
    pub ip_echo_url: String,
}

// Custom Debug implementation that hides the API secret
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("record_name", &self.record_name)
            .field("check_interval", &self.check_interval)
            .field("ttl", &self.ttl)
            .field("api_base_url", &self.api_base_url)
            .field("ip_echo_url", &self.ip_echo_url)
            .finish()
    }
}

impl Config {
    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: Default::default(),
            source,
        })?;
        Self::from_raw(raw)
    }

    /// Validate a raw configuration and apply defaults
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let api_key = required(&raw.godaddy_api_key, "godaddy_api_key", PLACEHOLDER_API_KEY)?;
        let api_secret = required(
            &raw.godaddy_api_secret,
            "godaddy_api_secret",
            PLACEHOLDER_API_SECRET,
        )?;
        let domain = required(&raw.domain, "domain", PLACEHOLDER_DOMAIN)?;
        validate_domain_name(&domain)?;

        let record_name = canonical_record_name(raw.record_name.as_deref().unwrap_or_default());
        if !record_name.chars().all(is_record_name_char) {
            return Err(ConfigError::InvalidValue {
                field: "record_name",
                reason: format!("{record_name:?} is not a valid record name"),
            });
        }

        let check_interval_minutes = match raw.check_interval_minutes {
            Some(minutes) if minutes > 0 => minutes as u64,
            _ => DEFAULT_CHECK_INTERVAL_MINUTES,
        };

        let ttl = match raw.ttl {
            Some(ttl) if ttl > 0 => u32::try_from(ttl).map_err(|_| ConfigError::InvalidValue {
                field: "ttl",
                reason: format!("{ttl} is out of range"),
            })?,
            _ => DEFAULT_TTL_SECS,
        };

        let api_base_url = url_or_default(raw.api_base_url, "api_base_url", DEFAULT_API_BASE_URL)?;
        let ip_echo_url = url_or_default(raw.ip_echo_url, "ip_echo_url", DEFAULT_IP_ECHO_URL)?;

        Ok(Self {
            api_key,
            api_secret,
            domain,
            record_name: record_name.to_string(),
            check_interval: Duration::from_secs(check_interval_minutes.saturating_mul(60)),
            ttl,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            ip_echo_url,
        })
    }

    /// Check interval in whole minutes
    pub fn check_interval_minutes(&self) -> u64 {
        self.check_interval.as_secs() / 60
    }
}

fn required(
    value: &str,
    field: &'static str,
    placeholder: &'static str,
) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingField { field });
    }
    if value == placeholder {
        return Err(ConfigError::Placeholder {
            field,
            value: placeholder,
        });
    }
    Ok(value.to_string())
}

/// Characters allowed in a record name; anything else would corrupt the record URL
fn is_record_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '*' | '@')
}

fn url_or_default(
    value: Option<String>,
    field: &'static str,
    default: &str,
) -> Result<String, ConfigError> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(default.to_string()),
        Some(url) if url.starts_with("https://") || url.starts_with("http://") => Ok(url),
        Some(url) => Err(ConfigError::InvalidValue {
            field,
            reason: format!("{url:?} must use the http or https scheme"),
        }),
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks; not comprehensive but catches common errors.
fn validate_domain_name(domain: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidDomain {
        domain: domain.to_string(),
        reason,
    };

    if domain.len() > 253 {
        return Err(invalid(format!("too long: {} chars (max 253)", domain.len())));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(invalid("empty label".to_string()));
        }
        if label.len() > 63 {
            return Err(invalid(format!(
                "label {label:?} too long: {} chars (max 63)",
                label.len()
            )));
        }
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Err(invalid(format!(
                "label {label:?} contains invalid characters"
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid(format!(
                "label {label:?} cannot start or end with a hyphen"
            )));
        }
    }

    Ok(())
}
