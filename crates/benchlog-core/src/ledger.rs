use crate::error::{BenchlogError, Result};
use crate::types::RunRecord;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Every suite's run history, in the shape it is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Ledger {
    pub last_update_ms: i64,
    #[serde(deserialize_with = "unique_suites")]
    pub entries: BTreeMap<String, Vec<RunRecord>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self, suite: &str) -> &[RunRecord] {
        self.entries
            .get(suite)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn last_record(&self, suite: &str) -> Option<&RunRecord> {
        self.records(suite).last()
    }

    pub fn record_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Check the invariants an append would have enforced.
    fn check(&self) -> std::result::Result<(), String> {
        for (suite, records) in &self.entries {
            if suite.trim().is_empty() {
                return Err("empty suite name".to_string());
            }
            let mut prev: Option<i64> = None;
            for (i, record) in records.iter().enumerate() {
                record
                    .validate()
                    .map_err(|e| format!("suite '{suite}' record {i}: {e}"))?;
                if let Some(p) = prev {
                    if record.timestamp_ms < p {
                        return Err(format!(
                            "suite '{suite}' record {i}: timestamp {} ms precedes {p} ms",
                            record.timestamp_ms
                        ));
                    }
                }
                prev = Some(record.timestamp_ms);
            }
        }
        let newest = self
            .entries
            .values()
            .flat_map(|records| records.iter().map(|r| r.timestamp_ms))
            .max()
            .unwrap_or(0);
        if self.last_update_ms != newest {
            return Err(format!(
                "lastUpdateMs {} does not match newest record timestamp {newest} ms",
                self.last_update_ms
            ));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Read a persisted ledger. Anything that does not match the schema or
    /// breaks an ordering/validation invariant is `CorruptLedger`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let corrupt = |reason: String| BenchlogError::CorruptLedger {
            path: path.to_path_buf(),
            reason,
        };
        let ledger: Ledger = serde_json::from_str(&data).map_err(|e| corrupt(e.to_string()))?;
        ledger.check().map_err(corrupt)?;
        tracing::debug!(
            path = %path.display(),
            suites = ledger.entries.len(),
            records = ledger.record_count(),
            "loaded ledger"
        );
        Ok(ledger)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut data = serde_json::to_string_pretty(self)?;
        data.push('\n');
        crate::io::atomic_write(path, data.as_bytes())?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "saved ledger");
        Ok(())
    }
}

/// Deserialize a suite-keyed map, rejecting a suite name that appears twice.
pub(crate) fn unique_suites<'de, D, V>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct SuitesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for SuitesVisitor<V> {
        type Value = BTreeMap<String, V>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map keyed by suite name")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut suites = BTreeMap::new();
            while let Some((name, value)) = map.next_entry::<String, V>()? {
                if suites.contains_key(&name) {
                    return Err(de::Error::custom(format_args!("duplicate suite '{name}'")));
                }
                suites.insert(name, value);
            }
            Ok(suites)
        }
    }

    deserializer.deserialize_map(SuitesVisitor(PhantomData))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
