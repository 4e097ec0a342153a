pub mod append;
pub mod chart;
pub mod config;
pub mod history;
pub mod init;

use anyhow::Context;
use benchlog_core::{config::Config, LedgerStore, Reader, Recorder};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration plus the ledger store it points at.
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
    pub store: Arc<LedgerStore>,
}

impl Project {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let config = Config::load(root).context("failed to load .benchlog/config.yaml")?;
        let ledger_path = config.ledger_path(root);
        let store = LedgerStore::open(&ledger_path)
            .with_context(|| format!("failed to open ledger {}", ledger_path.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            store: Arc::new(store),
        })
    }

    pub fn recorder(&self) -> Recorder {
        Recorder::new(Arc::clone(&self.store))
    }

    pub fn reader(&self) -> Reader {
        Reader::new(Arc::clone(&self.store))
    }
}
