use crate::error::{BenchlogError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the epoch, now.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render epoch milliseconds as RFC 3339 UTC, or the raw number when out of
/// chrono's range.
pub fn format_timestamp_ms(ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(t) => t.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => ms.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Author or committer of the measured commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Identity {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.username {
            Some(u) => write!(f, "{} (@{u})", self.name),
            None => write!(f, "{} <{}>", self.name, self.email),
        }
    }
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Measurement {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

impl Measurement {
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} {}", self.name, self.value, self.unit)
    }
}

impl std::str::FromStr for Measurement {
    type Err = BenchlogError;

    /// Parses `name=value unit`, e.g. `buildTime=41.9 seconds`. The unit may
    /// be omitted. The value follows the last '=', so names may contain '='.
    fn from_str(s: &str) -> Result<Self> {
        let Some((name, rest)) = s.rsplit_once('=') else {
            return Err(BenchlogError::InvalidRecord(format!(
                "measurement '{s}' must look like name=value unit"
            )));
        };
        let rest = rest.trim();
        let (value, unit) = match rest.split_once(char::is_whitespace) {
            Some((v, u)) => (v, u.trim()),
            None => (rest, ""),
        };
        let value: f64 = value.parse().map_err(|_| {
            BenchlogError::InvalidRecord(format!("measurement value '{value}' is not a number"))
        })?;
        Ok(Self::new(name.trim(), value, unit))
    }
}

// ---------------------------------------------------------------------------
// RunRecord
// ---------------------------------------------------------------------------

/// One benchmark run tied to a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RunRecord {
    pub commit_id: String,
    pub author: Identity,
    pub committer: Identity,
    pub message: String,
    pub timestamp_ms: i64,
    pub measurements: Vec<Measurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl RunRecord {
    pub fn new(
        commit_id: impl Into<String>,
        author: Identity,
        message: impl Into<String>,
        timestamp_ms: i64,
        measurements: Vec<Measurement>,
    ) -> Self {
        Self {
            commit_id: commit_id.into(),
            committer: author.clone(),
            author,
            message: message.into(),
            timestamp_ms,
            measurements,
            url: None,
            tree_id: None,
            commit_timestamp: None,
            distinct: None,
            tool: None,
        }
    }

    /// Local checks that need no ledger context.
    pub fn validate(&self) -> Result<()> {
        if self.commit_id.trim().is_empty() {
            return Err(BenchlogError::InvalidRecord(
                "commit id must not be empty".to_string(),
            ));
        }
        if self.timestamp_ms < 0 {
            return Err(BenchlogError::InvalidRecord(format!(
                "timestamp {} ms is negative",
                self.timestamp_ms
            )));
        }
        if self.measurements.is_empty() {
            return Err(BenchlogError::InvalidRecord(format!(
                "commit {} has no measurements",
                self.commit_id
            )));
        }
        for m in &self.measurements {
            if m.name.trim().is_empty() {
                return Err(BenchlogError::InvalidRecord(
                    "measurement name must not be empty".to_string(),
                ));
            }
            if !m.value.is_finite() {
                return Err(BenchlogError::InvalidRecord(format!(
                    "measurement '{}' has non-finite value {}",
                    m.name, m.value
                )));
            }
        }
        Ok(())
    }

    pub fn short_commit(&self) -> &str {
        let end = self
            .commit_id
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.commit_id.len());
        &self.commit_id[..end]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: i64, measurements: Vec<Measurement>) -> RunRecord {
        RunRecord::new(
            "905247a2e69cbc0a10fd86a314504e4103eaf40c",
            Identity::new("Javier", "javier@example.com").with_username("jchavarri"),
            "melange: add build benchmark to ci",
            ts,
            measurements,
        )
    }

    #[test]
    fn valid_record_passes() {
        let r = record(1000, vec![Measurement::new("buildTime", 41.9, "seconds")]);
        r.validate().unwrap();
        assert_eq!(r.short_commit(), "905247a2");
        assert_eq!(r.committer, r.author);
    }

    #[test]
    fn empty_measurements_rejected() {
        let err = record(1000, vec![]).validate().unwrap_err();
        assert!(matches!(err, BenchlogError::InvalidRecord(_)));
    }

    #[test]
    fn negative_timestamp_rejected() {
        let r = record(-1, vec![Measurement::new("buildTime", 1.0, "s")]);
        assert!(matches!(
            r.validate(),
            Err(BenchlogError::InvalidRecord(_))
        ));
    }

    #[test]
    fn non_finite_values_rejected() {
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let r = record(1, vec![Measurement::new("buildTime", v, "s")]);
            assert!(r.validate().is_err(), "expected rejection of {v}");
        }
    }

    #[test]
    fn empty_commit_id_rejected() {
        let mut r = record(1, vec![Measurement::new("buildTime", 1.0, "s")]);
        r.commit_id = "  ".to_string();
        assert!(r.validate().is_err());
    }

    #[test]
    fn serializes_camel_case_and_skips_absent_metadata() {
        let r = record(1000, vec![Measurement::new("buildTime", 41.9, "seconds")]);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["commitId"], "905247a2e69cbc0a10fd86a314504e4103eaf40c");
        assert_eq!(json["timestampMs"], 1000);
        assert_eq!(json["author"]["username"], "jchavarri");
        assert!(json.get("treeId").is_none());
        assert!(json.get("tool").is_none());
    }

    #[test]
    fn unknown_fields_rejected() {
        let json = r#"{
            "commitId": "abc",
            "author": {"name": "a", "email": "a@x"},
            "committer": {"name": "a", "email": "a@x"},
            "message": "m",
            "timestampMs": 1,
            "measurements": [{"name": "t", "value": 1.0, "unit": "s"}],
            "extra": true
        }"#;
        assert!(serde_json::from_str::<RunRecord>(json).is_err());
    }

    #[test]
    fn formats_epoch_millis() {
        assert_eq!(format_timestamp_ms(1672352576731), "2022-12-29T22:22:56.731Z");
        assert_eq!(format_timestamp_ms(0), "1970-01-01T00:00:00.000Z");
        assert!(now_ms() > 1672352576731);
    }

    #[test]
    fn parse_measurement_arg() {
        let m: Measurement = "pupilfirst build time=41.88 seconds".parse().unwrap();
        assert_eq!(m.name, "pupilfirst build time");
        assert_eq!(m.value, 41.88);
        assert_eq!(m.unit, "seconds");

        let bare: Measurement = "allocs=12".parse().unwrap();
        assert_eq!(bare.unit, "");

        assert!("no-equals".parse::<Measurement>().is_err());
        assert!("t=fast s".parse::<Measurement>().is_err());
    }

    #[test]
    fn measurement_name_may_contain_equals() {
        let m: Measurement = "opt=level=3.5 s".parse().unwrap();
        assert_eq!(m.name, "opt=level");
        assert_eq!(m.value, 3.5);
        assert_eq!(m.unit, "s");
    }
}
