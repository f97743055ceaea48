//! Logging setup
//!
//! Every line is prefixed with a local `[YYYY-MM-DD HH:MM:SS]` timestamp and
//! goes both to stdout and to an append-only log file.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock timer producing `[2024-05-01 13:37:00]`
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketedLocalTime;

impl FormatTime for BracketedLocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", timestamp(chrono::Local::now()))
    }
}

fn timestamp<Tz>(now: chrono::DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("[{}]", now.format(TIMESTAMP_FORMAT))
}

/// Open `path` for appending, creating it and its parent directory
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Install the global subscriber
pub fn init(level: Level, log_file: &Path) -> Result<()> {
    let file = open_log_file(log_file)?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_timer(BracketedLocalTime)
        .with_target(false);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_timer(BracketedLocalTime)
        .with_target(false)
        .with_level(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("failed to set tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let at = chrono::Utc.with_ymd_and_hms(2024, 5, 1, 13, 7, 9).unwrap();
        assert_eq!(timestamp(at), "[2024-05-01 13:07:09]");
    }

    #[test]
    fn test_open_log_file_appends() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("ip_log.txt");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}
