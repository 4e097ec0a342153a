use crate::error::Result;
use crate::ledger::Ledger;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Durable holder of a [`Ledger`] bound to one file.
///
/// The in-memory ledger sits behind a read/write lock. Mutations run under
/// the write guard for their whole validate-mutate-persist sequence, so
/// readers see either the state before an append or the state after it.
/// Share it between a [`Recorder`](crate::recorder::Recorder) and any number
/// of [`Reader`](crate::reader::Reader)s through an `Arc`.
#[derive(Debug)]
pub struct LedgerStore {
    path: PathBuf,
    ledger: RwLock<Ledger>,
}

impl LedgerStore {
    /// Open the ledger at `path`. A missing file starts an empty ledger; the
    /// file is written on the first successful append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ledger = if path.exists() {
            Ledger::load(&path)?
        } else {
            tracing::debug!(path = %path.display(), "ledger not initialized, starting empty");
            Ledger::new()
        };
        Ok(Self {
            path,
            ledger: RwLock::new(ledger),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the ledger has been persisted at least once.
    pub fn is_initialized(&self) -> bool {
        self.path.exists()
    }

    /// Persist the current state, creating the file if needed.
    pub fn save(&self) -> Result<()> {
        self.read().save(&self.path)
    }

    pub fn snapshot(&self) -> Ledger {
        self.read().clone()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        // Appends roll back before releasing the guard, so a poisoned
        // ledger is still consistent.
        self.ledger.read().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.ledger.write().unwrap_or_else(|e| e.into_inner())
    }
}
