use crate::error::{BenchlogError, Result};
use crate::store::LedgerStore;
use crate::types::RunRecord;
use serde::Serialize;
use std::sync::Arc;

/// Per-suite overview returned by [`Reader::suites`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    pub name: String,
    pub records: usize,
    pub latest_ms: Option<i64>,
}

/// Read-only queries over a [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct Reader {
    store: Arc<LedgerStore>,
}

impl Reader {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Every record of `suite` in insertion order; empty for an unknown suite.
    pub fn history(&self, suite: &str) -> Vec<RunRecord> {
        self.store.read().records(suite).to_vec()
    }

    /// Records of `suite` with `from_ms <= timestamp_ms <= to_ms`.
    pub fn history_in_range(
        &self,
        suite: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<RunRecord>> {
        if from_ms > to_ms {
            return Err(BenchlogError::InvalidRange { from_ms, to_ms });
        }
        let ledger = self.store.read();
        let records = ledger.records(suite);
        // Timestamps are non-decreasing, so the range is a contiguous slice.
        let start = records.partition_point(|r| r.timestamp_ms < from_ms);
        let end = records.partition_point(|r| r.timestamp_ms <= to_ms);
        Ok(records[start..end].to_vec())
    }

    pub fn latest(&self, suite: &str) -> Option<RunRecord> {
        self.store.read().last_record(suite).cloned()
    }

    pub fn suites(&self) -> Vec<SuiteSummary> {
        self.store
            .read()
            .entries
            .iter()
            .map(|(name, records)| SuiteSummary {
                name: name.clone(),
                records: records.len(),
                latest_ms: records.last().map(|r| r.timestamp_ms),
            })
            .collect()
    }

    pub fn last_update_ms(&self) -> i64 {
        self.store.read().last_update_ms
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::Recorder;
    use crate::types::{Identity, Measurement};
    use tempfile::TempDir;

    fn record(commit: &str, ts: i64) -> RunRecord {
        RunRecord::new(
            commit,
            Identity::new("Rudi", "rudi@example.com").with_username("rgrinberg"),
            "refactor(rules): move cram rules",
            ts,
            vec![Measurement::new("pupilfirst build time (Linux)", 35.27, "seconds")],
        )
    }

    fn setup(timestamps: &[i64]) -> (TempDir, Recorder, Reader) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(LedgerStore::open(dir.path().join("ledger.json")).unwrap());
        let recorder = Recorder::new(Arc::clone(&store));
        for (i, ts) in timestamps.iter().enumerate() {
            recorder
                .append("bench1", record(&format!("c{i}"), *ts))
                .unwrap();
        }
        (dir, recorder, Reader::new(store))
    }

    #[test]
    fn unknown_suite_is_empty_not_error() {
        let (_dir, _recorder, reader) = setup(&[1000]);
        assert!(reader.history("missing").is_empty());
        assert!(reader.latest("missing").is_none());
        assert!(reader.history_in_range("missing", 0, 10).unwrap().is_empty());
    }

    #[test]
    fn history_is_ordered() {
        let (_dir, _recorder, reader) = setup(&[100, 200, 200, 300]);
        let ts: Vec<i64> = reader.history("bench1").iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(ts, vec![100, 200, 200, 300]);
    }

    #[test]
    fn range_is_inclusive_subsequence() {
        let timestamps = [100, 200, 200, 300, 400, 500];
        let (_dir, _recorder, reader) = setup(&timestamps);
        let history = reader.history("bench1");

        for (from, to) in [(200, 400), (0, 99), (150, 150), (500, 900), (0, 1000), (200, 200)] {
            let expected: Vec<RunRecord> = history
                .iter()
                .filter(|r| from <= r.timestamp_ms && r.timestamp_ms <= to)
                .cloned()
                .collect();
            assert_eq!(
                reader.history_in_range("bench1", from, to).unwrap(),
                expected,
                "range {from}..={to}"
            );
        }
    }

    #[test]
    fn inverted_range_rejected() {
        let (_dir, _recorder, reader) = setup(&[100]);
        let err = reader.history_in_range("bench1", 10, 5).unwrap_err();
        assert!(matches!(
            err,
            BenchlogError::InvalidRange {
                from_ms: 10,
                to_ms: 5
            }
        ));
    }

    #[test]
    fn latest_tracks_appends() {
        let (_dir, recorder, reader) = setup(&[100, 200]);
        assert_eq!(reader.latest("bench1").unwrap().commit_id, "c1");
        recorder.append("bench1", record("c9", 250)).unwrap();
        assert_eq!(reader.latest("bench1").unwrap().commit_id, "c9");
        assert_eq!(reader.last_update_ms(), 250);
    }

    #[test]
    fn suites_summarize_each_history() {
        let (_dir, recorder, reader) = setup(&[100, 200]);
        recorder.append("bench0", record("x", 50)).unwrap();
        let suites = reader.suites();
        assert_eq!(
            suites,
            vec![
                SuiteSummary {
                    name: "bench0".to_string(),
                    records: 1,
                    latest_ms: Some(50),
                },
                SuiteSummary {
                    name: "bench1".to_string(),
                    records: 2,
                    latest_ms: Some(200),
                },
            ]
        );
    }

    #[test]
    fn scenario_single_append() {
        let (_dir, recorder, reader) = setup(&[]);
        let a = RunRecord::new(
            "a",
            Identity::new("A", "a@example.com"),
            "first",
            1000,
            vec![Measurement::new("buildTime", 41.9, "seconds")],
        );
        recorder.append("bench1", a.clone()).unwrap();
        assert_eq!(reader.history("bench1"), vec![a.clone()]);
        assert_eq!(reader.last_update_ms(), 1000);

        let b = RunRecord {
            commit_id: "b".to_string(),
            timestamp_ms: 500,
            ..a.clone()
        };
        assert!(matches!(
            recorder.append("bench1", b),
            Err(BenchlogError::OutOfOrder { .. })
        ));
        assert_eq!(reader.history("bench1"), vec![a]);
    }
}
