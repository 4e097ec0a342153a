use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchlogError {
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("out of order: suite '{suite}' ends at {last_ms} ms, got {got_ms} ms")]
    OutOfOrder {
        suite: String,
        last_ms: i64,
        got_ms: i64,
    },

    #[error("corrupt ledger {}: {reason}", .path.display())]
    CorruptLedger { path: PathBuf, reason: String },

    #[error("invalid range: from {from_ms} ms is after to {to_ms} ms")]
    InvalidRange { from_ms: i64, to_ms: i64 },

    #[error("invalid chart data: {0}")]
    InvalidChartData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BenchlogError>;
