pub mod chart;
pub mod config;
pub mod error;
pub mod io;
pub mod ledger;
pub mod paths;
pub mod reader;
pub mod recorder;
pub mod store;
pub mod types;

pub use error::{BenchlogError, Result};
pub use ledger::Ledger;
pub use reader::Reader;
pub use recorder::Recorder;
pub use store::LedgerStore;
pub use types::{Identity, Measurement, RunRecord};
