// # File State Store
//
// File-based implementation of StateStore with crash recovery.
//
// ## Purpose
//
// Keeps the last confirmed-published IP across daemon restarts so that a
// provider outage on the first cycle after a restart still has a baseline.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: The content must parse as an IPv4 address
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if corruption detected, else "unknown"
//
// ## File Format
//
// A single line of plain text, whitespace-trimmed on read:
//
// ```text
// 203.0.113.9
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::StateError;
use crate::traits::StateStore;

/// File-based state store with crash recovery
///
/// The value is loaded once at construction; every save writes through to
/// disk before the in-memory copy changes.
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::state::FileStateStore;
/// use ddns_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/ddns/last_ip.txt").await?;
///
///     // Save IP (atomically written to disk)
///     store.save_last_ip("203.0.113.9".parse()?).await?;
///
///     let ip = store.get_last_ip().await;
///     assert_eq!(ip, Some("203.0.113.9".parse()?));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
    last_ip: Arc<RwLock<Option<Ipv4Addr>>>,
}

impl FileStateStore {
    /// Create or load a file state store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Try to load the existing state file
    /// 3. If it is corrupt, try the backup
    /// 4. If both fail, start with an unknown last IP
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, StateError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StateError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let last_ip = Self::load_with_recovery(&path).await;

        Ok(Self {
            path,
            last_ip: Arc::new(RwLock::new(last_ip)),
        })
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load state with automatic recovery
    ///
    /// A missing main file is a legitimate first run; only a present but
    /// unusable main file triggers the backup.
    async fn load_with_recovery(path: &Path) -> Option<Ipv4Addr> {
        match Self::load(path).await {
            Ok(Some(ip)) => {
                tracing::debug!("Loaded last IP {} from {}", ip, path.display());
                return Some(ip);
            }
            Ok(None) => {
                tracing::debug!("State file does not exist: {}", path.display());
                return None;
            }
            Err(reason) => {
                tracing::warn!(
                    "State file {} is unusable: {}. Attempting recovery from backup.",
                    path.display(),
                    reason
                );
            }
        }

        let backup_path = Self::backup_path(path);
        match Self::load(&backup_path).await {
            Ok(Some(ip)) => {
                tracing::info!("Recovered last IP {} from backup", ip);
                if let Err(e) = fs::copy(&backup_path, path).await {
                    tracing::error!("Failed to restore state file from backup: {}", e);
                }
                Some(ip)
            }
            Ok(None) => {
                tracing::warn!("No backup file found. Treating last IP as unknown.");
                None
            }
            Err(reason) => {
                tracing::error!(
                    "Backup also unusable: {}. Treating last IP as unknown.",
                    reason
                );
                None
            }
        }
    }

    /// Read and parse one state file
    ///
    /// `Ok(None)` when the file does not exist, `Err` when it exists but
    /// cannot be read or does not hold an IPv4 address.
    async fn load(path: &Path) -> Result<Option<Ipv4Addr>, String> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("failed to read {}: {}", path.display(), e)),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(format!("{} is empty", path.display()));
        }

        trimmed
            .parse::<Ipv4Addr>()
            .map(Some)
            .map_err(|e| format!("{} holds {:?}: {}", path.display(), trimmed, e))
    }

    /// Write state to file atomically
    async fn write(&self, ip: Ipv4Addr) -> Result<(), StateError> {
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path)
                .await
                .map_err(write_err(&temp_path))?;
            file.write_all(format!("{ip}\n").as_bytes())
                .await
                .map_err(write_err(&temp_path))?;
            file.sync_all().await.map_err(write_err(&temp_path))?;
        }

        // Keep the previous good value around in case the rename goes wrong
        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(write_err(&self.path))?;

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }

    /// Path to temporary file for atomic writes (`last_ip.txt.tmp`)
    fn temp_path(&self) -> PathBuf {
        Self::sibling(&self.path, "tmp")
    }

    /// Path to backup file (`last_ip.txt.backup`)
    fn backup_path(path: &Path) -> PathBuf {
        Self::sibling(path, "backup")
    }

    fn sibling(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(suffix);
        PathBuf::from(name)
    }
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> StateError + use<> {
    let path = path.to_path_buf();
    move |source| StateError::Write { path, source }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get_last_ip(&self) -> Option<Ipv4Addr> {
        *self.last_ip.read().await
    }

    async fn save_last_ip(&self, ip: Ipv4Addr) -> Result<(), StateError> {
        let mut guard = self.last_ip.write().await;
        self.write(ip).await?;
        *guard = Some(ip);
        Ok(())
    }
}
