use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::domain::Account;

/// Durable store for the account collection: a single JSON file holding every
/// account, replaced wholesale on each write. Rewriting the full collection on
/// every save bounds this store to small account sets.
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    /// Create a store over the given file path. The file is created on the
    /// first save; a missing file reads as an empty collection.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every account. A missing file yields an empty collection; an
    /// unparseable file is logged and also yields an empty collection, so a
    /// damaged store never takes the service down.
    pub async fn load_all(&self) -> Result<Vec<Account>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read account store at {}", self.path.display())
                });
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(accounts) => Ok(accounts),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "account store is unreadable, starting from an empty collection"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Replace the entire durable collection. The new contents are written to
    /// a sibling temp file and renamed over the target, so a crash mid-write
    /// never leaves a partially-written store behind.
    pub async fn save_all(&self, accounts: &[Account]) -> Result<()> {
        let encoded =
            serde_json::to_vec_pretty(accounts).context("Failed to encode account store")?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &encoded)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| {
                format!("Failed to replace account store at {}", self.path.display())
            })?;

        Ok(())
    }
}
