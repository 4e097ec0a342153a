use super::Project;
use crate::output::print_json;
use anyhow::Context;
use benchlog_core::types::{now_ms, Identity, Measurement, RunRecord};
use clap::Args;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct AppendArgs {
    /// Suite name, e.g. "Melange Benchmark"
    pub suite: String,

    /// Read the run record as JSON from FILE ("-" for stdin) instead of flags
    #[arg(long, value_name = "FILE", conflicts_with_all = ["commit", "bench"])]
    pub record: Option<PathBuf>,

    /// Commit id
    #[arg(long, required_unless_present = "record")]
    pub commit: Option<String>,

    #[arg(long, required_unless_present = "record")]
    pub author_name: Option<String>,

    #[arg(long, required_unless_present = "record")]
    pub author_email: Option<String>,

    #[arg(long)]
    pub author_username: Option<String>,

    /// Committer name (default: the author)
    #[arg(long, requires = "committer_email")]
    pub committer_name: Option<String>,

    #[arg(long, requires = "committer_name")]
    pub committer_email: Option<String>,

    #[arg(long)]
    pub committer_username: Option<String>,

    /// Commit message
    #[arg(long, default_value = "")]
    pub message: String,

    /// Run time in ms since epoch (default: now)
    #[arg(long)]
    pub timestamp_ms: Option<i64>,

    /// Commit URL
    #[arg(long)]
    pub url: Option<String>,

    /// Benchmark tool name, e.g. customSmallerIsBetter
    #[arg(long)]
    pub tool: Option<String>,

    /// Measurement as "name=value unit"; repeat for several
    #[arg(long = "bench", value_name = "NAME=VALUE UNIT", required_unless_present = "record")]
    pub bench: Vec<String>,
}

impl AppendArgs {
    fn into_record(self) -> anyhow::Result<RunRecord> {
        if let Some(path) = &self.record {
            return read_record(path);
        }

        let measurements = self
            .bench
            .iter()
            .map(|b| b.parse::<Measurement>())
            .collect::<Result<Vec<_>, _>>()?;

        let identity = |name: Option<String>, email: Option<String>, username: Option<String>| {
            let mut id = Identity::new(name.unwrap_or_default(), email.unwrap_or_default());
            id.username = username;
            id
        };
        let author = identity(self.author_name, self.author_email, self.author_username);
        let committer = match self.committer_name {
            Some(name) => identity(Some(name), self.committer_email, self.committer_username),
            None => author.clone(),
        };

        let mut record = RunRecord::new(
            self.commit.unwrap_or_default(),
            author,
            self.message,
            self.timestamp_ms.unwrap_or_else(now_ms),
            measurements,
        );
        record.committer = committer;
        record.url = self.url;
        record.tool = self.tool;
        Ok(record)
    }
}

fn read_record(path: &Path) -> anyhow::Result<RunRecord> {
    let data = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read record from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&data).context("record is not a valid run record document")
}

pub fn run(root: &Path, args: AppendArgs, json: bool) -> anyhow::Result<()> {
    let suite = args.suite.clone();
    let record = args.into_record()?;
    let commit = record.commit_id.clone();
    let timestamp_ms = record.timestamp_ms;

    let project = Project::open(root)?;
    project
        .recorder()
        .append(&suite, record)
        .with_context(|| format!("failed to record commit {commit} in suite '{suite}'"))?;

    if json {
        print_json(&serde_json::json!({
            "suite": suite,
            "commit_id": commit,
            "timestamp_ms": timestamp_ms,
            "last_update_ms": project.reader().last_update_ms(),
        }))?;
    } else {
        println!("Recorded {commit} in '{suite}'");
    }
    Ok(())
}
