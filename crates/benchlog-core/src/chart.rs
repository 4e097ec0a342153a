//! Conversion between the ledger and the `window.BENCHMARK_DATA` script
//! read by the static benchmark charts page.

use crate::error::{BenchlogError, Result};
use crate::ledger::Ledger;
use crate::types::{Identity, Measurement, RunRecord};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const SCRIPT_PREFIX: &str = "window.BENCHMARK_DATA";

// ---------------------------------------------------------------------------
// Chart document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub last_update: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(deserialize_with = "crate::ledger::unique_suites")]
    pub entries: BTreeMap<String, Vec<ChartEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub commit: ChartCommit,
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    pub benches: Vec<ChartBench>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartCommit {
    pub author: Identity,
    pub committer: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct: Option<bool>,
    pub id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBench {
    pub name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub value: f64,
    pub unit: String,
}

/// Custom benchmark tools emit values as strings ("41.88697116556667").
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format_args!("bench value '{s}' is not a number"))),
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<ChartEntry> for RunRecord {
    fn from(entry: ChartEntry) -> Self {
        let ChartEntry {
            commit,
            date,
            tool,
            benches,
        } = entry;
        RunRecord {
            commit_id: commit.id,
            author: commit.author,
            committer: commit.committer,
            message: commit.message,
            timestamp_ms: date,
            measurements: benches
                .into_iter()
                .map(|b| Measurement::new(b.name, b.value, b.unit))
                .collect(),
            url: commit.url,
            tree_id: commit.tree_id,
            commit_timestamp: commit.timestamp,
            distinct: commit.distinct,
            tool,
        }
    }
}

impl From<&RunRecord> for ChartEntry {
    fn from(record: &RunRecord) -> Self {
        ChartEntry {
            commit: ChartCommit {
                author: record.author.clone(),
                committer: record.committer.clone(),
                distinct: record.distinct,
                id: record.commit_id.clone(),
                message: record.message.clone(),
                timestamp: record.commit_timestamp.clone(),
                tree_id: record.tree_id.clone(),
                url: record.url.clone(),
            },
            date: record.timestamp_ms,
            tool: record.tool.clone(),
            benches: record
                .measurements
                .iter()
                .map(|m| ChartBench {
                    name: m.name.clone(),
                    value: m.value,
                    unit: m.unit.clone(),
                })
                .collect(),
        }
    }
}

impl ChartData {
    /// Build chart data from a ledger. `max_items` keeps only the newest N
    /// records of each suite.
    pub fn from_ledger(ledger: &Ledger, repo_url: Option<&str>, max_items: Option<usize>) -> Self {
        let entries = ledger
            .entries
            .iter()
            .map(|(suite, records)| {
                let skip = match max_items {
                    Some(n) => records.len().saturating_sub(n),
                    None => 0,
                };
                let entries: Vec<ChartEntry> = records[skip..].iter().map(ChartEntry::from).collect();
                (suite.clone(), entries)
            })
            .collect();
        ChartData {
            last_update: ledger.last_update_ms,
            repo_url: repo_url.map(str::to_string),
            entries,
        }
    }

    /// Parse a `data.js` script or the bare JSON object it assigns.
    pub fn parse(text: &str) -> Result<Self> {
        let mut body = text.trim();
        if let Some(rest) = body.strip_prefix(SCRIPT_PREFIX) {
            body = rest.trim_start().strip_prefix('=').ok_or_else(|| {
                BenchlogError::InvalidChartData(format!("expected '=' after {SCRIPT_PREFIX}"))
            })?;
        }
        let body = body.trim().trim_end_matches(';');
        serde_json::from_str(body).map_err(|e| BenchlogError::InvalidChartData(e.to_string()))
    }

    /// Records per suite, in file order.
    pub fn into_records(self) -> BTreeMap<String, Vec<RunRecord>> {
        self.entries
            .into_iter()
            .map(|(suite, entries)| {
                let records: Vec<RunRecord> = entries.into_iter().map(RunRecord::from).collect();
                (suite, records)
            })
            .collect()
    }

    /// Render as the script assigned to `window.BENCHMARK_DATA`.
    pub fn to_script(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(format!("{SCRIPT_PREFIX} = {json}\n"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DATA_JS: &str = r#"window.BENCHMARK_DATA = {
  "lastUpdate": 1672956780233,
  "repoUrl": "https://github.com/ocaml/dune",
  "entries": {
    "Melange Benchmark": [
      {
        "commit": {
          "author": {
            "email": "javier@example.com",
            "name": "Javier Chávarri",
            "username": "jchavarri"
          },
          "committer": {
            "email": "noreply@github.com",
            "name": "GitHub",
            "username": "web-flow"
          },
          "distinct": true,
          "id": "905247a2e69cbc0a10fd86a314504e4103eaf40c",
          "message": "melange: add build benchmark to ci (#6791)",
          "timestamp": "2022-12-29T15:53:30-06:00",
          "tree_id": "06291f117daf78ff12d184f40b41ec0b3755bd2b",
          "url": "https://github.com/ocaml/dune/commit/905247a2e69cbc0a10fd86a314504e4103eaf40c"
        },
        "date": 1672352576731,
        "tool": "customSmallerIsBetter",
        "benches": [
          {
            "name": "pupilfirst build time (Linux)",
            "value": "41.88697116556667",
            "unit": "seconds"
          }
        ]
      },
      {
        "commit": {
          "author": { "email": "rudi@example.com", "name": "Rudi Grinberg", "username": "rgrinberg" },
          "committer": { "email": "noreply@github.com", "name": "GitHub", "username": "web-flow" },
          "distinct": true,
          "id": "752ba97135b04d1f5e4a4c171bd35f3551e73c65",
          "message": "test(melange): include_subdirs (#6810)",
          "timestamp": "2022-12-29T16:46:32-06:00",
          "tree_id": "08bc84c1c9e4ad86e6b817bde15acc4d309d9003",
          "url": "https://github.com/ocaml/dune/commit/752ba97135b04d1f5e4a4c171bd35f3551e73c65"
        },
        "date": 1672355228489,
        "tool": "customSmallerIsBetter",
        "benches": [
          { "name": "pupilfirst build time (Linux)", "value": 38.341008513940004, "unit": "seconds" }
        ]
      }
    ]
  }
}"#;

    #[test]
    fn parses_script_with_string_values() {
        let data = ChartData::parse(DATA_JS).unwrap();
        assert_eq!(data.last_update, 1672956780233);
        assert_eq!(data.repo_url.as_deref(), Some("https://github.com/ocaml/dune"));
        let suite = &data.entries["Melange Benchmark"];
        assert_eq!(suite.len(), 2);
        assert_eq!(suite[0].benches[0].value, 41.88697116556667);
        assert_eq!(suite[1].benches[0].value, 38.341008513940004);
    }

    #[test]
    fn parses_bare_json_and_trailing_semicolon() {
        let bare = DATA_JS.strip_prefix("window.BENCHMARK_DATA = ").unwrap();
        assert!(ChartData::parse(bare).is_ok());
        assert!(ChartData::parse(&format!("{DATA_JS};\n")).is_ok());
    }

    #[test]
    fn converts_entries_to_records() {
        let records = ChartData::parse(DATA_JS).unwrap().into_records();
        let first = &records["Melange Benchmark"][0];
        assert_eq!(first.commit_id, "905247a2e69cbc0a10fd86a314504e4103eaf40c");
        assert_eq!(first.timestamp_ms, 1672352576731);
        assert_eq!(first.author.username.as_deref(), Some("jchavarri"));
        assert_eq!(first.tool.as_deref(), Some("customSmallerIsBetter"));
        assert_eq!(first.commit_timestamp.as_deref(), Some("2022-12-29T15:53:30-06:00"));
        assert_eq!(first.measurements[0].unit, "seconds");
        first.validate().unwrap();
    }

    #[test]
    fn rejects_garbage() {
        for text in [
            "window.BENCHMARK_DATA {}",
            "{}",
            "not json",
            r#"{"lastUpdate": 1, "entries": {"s": [{"commit": {}, "date": 1, "benches": []}]}}"#,
        ] {
            assert!(
                matches!(ChartData::parse(text), Err(BenchlogError::InvalidChartData(_))),
                "expected rejection of {text}"
            );
        }
    }

    #[test]
    fn rejects_repeated_suite() {
        let suite = DATA_JS
            .split_once("\"Melange Benchmark\": ")
            .and_then(|(_, rest)| rest.rsplit_once("\n  }\n}"))
            .map(|(body, _)| body)
            .unwrap();
        let text = format!(
            r#"{{"lastUpdate": 1, "entries": {{"s": {suite}, "s": {suite}}}}}"#
        );
        match ChartData::parse(&text) {
            Err(BenchlogError::InvalidChartData(reason)) => {
                assert!(reason.contains("duplicate suite"), "{reason}")
            }
            other => panic!("expected InvalidChartData, got {other:?}"),
        }
        let single = format!(r#"{{"lastUpdate": 1, "entries": {{"s": {suite}}}}}"#);
        assert_eq!(ChartData::parse(&single).unwrap().entries["s"].len(), 2);
    }

    #[test]
    fn rejects_non_numeric_string_value() {
        let text = DATA_JS.replace("\"41.88697116556667\"", "\"fast\"");
        assert!(ChartData::parse(&text).is_err());
    }

    #[test]
    fn export_uses_chart_field_names() {
        let mut ledger = Ledger::new();
        ledger.entries = ChartData::parse(DATA_JS).unwrap().into_records();
        ledger.last_update_ms = 1672355228489;

        let script = ChartData::from_ledger(&ledger, Some("https://github.com/ocaml/dune"), None)
            .to_script()
            .unwrap();
        assert!(script.starts_with("window.BENCHMARK_DATA = {"));
        assert!(script.contains("\"lastUpdate\": 1672355228489"));
        assert!(script.contains("\"tree_id\""));
        assert!(script.contains("\"benches\""));

        let reparsed = ChartData::parse(&script).unwrap().into_records();
        assert_eq!(reparsed, ledger.entries);
    }

    #[test]
    fn max_items_keeps_newest() {
        let mut ledger = Ledger::new();
        ledger.entries = ChartData::parse(DATA_JS).unwrap().into_records();

        let data = ChartData::from_ledger(&ledger, None, Some(1));
        let suite = &data.entries["Melange Benchmark"];
        assert_eq!(suite.len(), 1);
        assert_eq!(suite[0].commit.id, "752ba97135b04d1f5e4a4c171bd35f3551e73c65");
        assert!(data.repo_url.is_none());

        let all = ChartData::from_ledger(&ledger, None, Some(10));
        assert_eq!(all.entries["Melange Benchmark"].len(), 2);
    }
}
