use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const BENCHLOG_DIR: &str = ".benchlog";
pub const CONFIG_FILE: &str = ".benchlog/config.yaml";
pub const DEFAULT_LEDGER_FILE: &str = ".benchlog/ledger.json";
pub const DEFAULT_EXPORT_FILE: &str = "dev/bench/data.js";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn benchlog_dir(root: &Path) -> PathBuf {
    root.join(BENCHLOG_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against the project root. Absolute paths are
/// returned unchanged.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
