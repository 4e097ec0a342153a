use crate::error::{BenchlogError, Result};
use crate::store::LedgerStore;
use crate::types::RunRecord;
use std::sync::Arc;

/// Validated, ordered insertion into a [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct Recorder {
    store: Arc<LedgerStore>,
}

impl Recorder {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Append `record` to `suite` and persist the ledger.
    ///
    /// Rejected records (`InvalidRecord`, `OutOfOrder`) and failed writes
    /// leave the ledger unchanged in memory and on disk.
    pub fn append(&self, suite: &str, record: RunRecord) -> Result<()> {
        if suite.trim().is_empty() {
            return Err(BenchlogError::InvalidRecord(
                "suite name must not be empty".to_string(),
            ));
        }
        record.validate()?;

        let mut ledger = self.store.write();

        if let Some(last) = ledger.last_record(suite) {
            if record.timestamp_ms < last.timestamp_ms {
                tracing::warn!(
                    suite,
                    commit = %record.commit_id,
                    last_ms = last.timestamp_ms,
                    got_ms = record.timestamp_ms,
                    "rejected out-of-order record"
                );
                return Err(BenchlogError::OutOfOrder {
                    suite: suite.to_string(),
                    last_ms: last.timestamp_ms,
                    got_ms: record.timestamp_ms,
                });
            }
        }
        if ledger
            .records(suite)
            .iter()
            .any(|r| r.commit_id == record.commit_id)
        {
            return Err(BenchlogError::InvalidRecord(format!(
                "commit {} is already recorded for suite '{suite}'",
                record.commit_id
            )));
        }

        let prev_last_update = ledger.last_update_ms;
        let is_new_suite = !ledger.entries.contains_key(suite);
        let commit = record.commit_id.clone();
        let timestamp_ms = record.timestamp_ms;

        ledger
            .entries
            .entry(suite.to_string())
            .or_default()
            .push(record);
        ledger.last_update_ms = prev_last_update.max(timestamp_ms);

        if let Err(e) = ledger.save(self.store.path()) {
            if is_new_suite {
                ledger.entries.remove(suite);
            } else if let Some(records) = ledger.entries.get_mut(suite) {
                records.pop();
            }
            ledger.last_update_ms = prev_last_update;
            tracing::warn!(suite, commit = %commit, error = %e, "append rolled back");
            return Err(e);
        }

        tracing::info!(suite, commit = %commit, timestamp_ms, "recorded benchmark run");
        Ok(())
    }

    /// Append several records to one suite, stopping at the first failure.
    /// Records before the failing one stay appended. Returns the number
    /// appended.
    pub fn append_all(
        &self,
        suite: &str,
        records: impl IntoIterator<Item = RunRecord>,
    ) -> Result<usize> {
        let mut appended = 0;
        for record in records {
            self.append(suite, record)?;
            appended += 1;
        }
        Ok(appended)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
