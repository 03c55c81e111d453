// 🗃️ Ledger Cache - Immutable Snapshots
// One in-memory snapshot per source file, keyed by path + content signature,
// replaced wholesale on invalidation and never mutated in place

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::loader::{parse_ledger, Transaction};

// ============================================================================
// SNAPSHOT
// ============================================================================

/// A fully-loaded, immutable view of the ledger at one point in time.
/// Readers holding the Arc keep a consistent set even across a reload.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    /// Hex SHA-256 of the raw source bytes; identifies this snapshot
    pub signature: String,

    /// The cleaned transaction set, never mutated after load
    pub transactions: Arc<Vec<Transaction>>,
}

/// Hex SHA-256 content signature of raw ledger bytes
fn content_signature(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// CACHE
// ============================================================================

/// Explicit cache object for one ledger source.
///
/// `snapshot()` loads on first use and afterwards returns the cached value
/// without touching the file again; staleness is resolved only through the
/// manual `invalidate()` / `reload()` controls. Replacement swaps in a whole
/// new snapshot, so a half-updated transaction set can never be observed.
#[derive(Debug)]
pub struct LedgerCache {
    path: PathBuf,
    entry: Option<LedgerSnapshot>,
}

impl LedgerCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LedgerCache {
            path: path.into(),
            entry: None,
        }
    }

    /// Source file this cache is keyed on
    pub fn source_path(&self) -> &Path {
        &self.path
    }

    /// Current snapshot, loading the source once if the cache is empty
    pub fn snapshot(&mut self) -> Result<LedgerSnapshot> {
        if let Some(entry) = &self.entry {
            return Ok(entry.clone());
        }

        let snapshot = self.load()?;
        self.entry = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Drop the cached snapshot. The next `snapshot()` call re-reads the
    /// source; until then the old value stays valid for anyone holding it.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Invalidate and load fresh in one step (the reload control)
    pub fn reload(&mut self) -> Result<LedgerSnapshot> {
        self.invalidate();
        self.snapshot()
    }

    fn load(&self) -> Result<LedgerSnapshot> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read ledger file: {}", self.path.display()))?;

        let transactions = parse_ledger(&bytes)
            .with_context(|| format!("Failed to load ledger: {}", self.path.display()))?;

        Ok(LedgerSnapshot {
            signature: content_signature(&bytes),
            transactions: Arc::new(transactions),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
