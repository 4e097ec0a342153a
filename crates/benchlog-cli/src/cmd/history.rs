use super::Project;
use crate::output::{print_json, print_table, record_rows, RECORD_HEADERS};
use anyhow::Context;
use benchlog_core::types::format_timestamp_ms;
use std::path::Path;

pub fn history(
    root: &Path,
    suite: &str,
    from: Option<i64>,
    to: Option<i64>,
    json: bool,
) -> anyhow::Result<()> {
    let reader = Project::open(root)?.reader();
    let records = if from.is_none() && to.is_none() {
        reader.history(suite)
    } else {
        reader
            .history_in_range(suite, from.unwrap_or(0), to.unwrap_or(i64::MAX))
            .context("invalid --from/--to")?
    };

    if json {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("No runs recorded for '{suite}'.");
        return Ok(());
    }
    print_table(RECORD_HEADERS, record_rows(&records));
    Ok(())
}

pub fn latest(root: &Path, suite: &str, json: bool) -> anyhow::Result<()> {
    let latest = Project::open(root)?.reader().latest(suite);

    if json {
        return print_json(&latest);
    }
    match latest {
        Some(record) => {
            println!("suite:     {suite}");
            println!("commit:    {}", record.commit_id);
            println!("author:    {}", record.author);
            println!("time:      {}", format_timestamp_ms(record.timestamp_ms));
            if let Some(line) = record.message.lines().next() {
                println!("message:   {line}");
            }
            for m in &record.measurements {
                println!("  {m}");
            }
        }
        None => println!("No runs recorded for '{suite}'."),
    }
    Ok(())
}

pub fn suites(root: &Path, json: bool) -> anyhow::Result<()> {
    let suites = Project::open(root)?.reader().suites();

    if json {
        return print_json(&suites);
    }
    if suites.is_empty() {
        println!("No suites recorded.");
        return Ok(());
    }
    let rows = suites
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.records.to_string(),
                s.latest_ms.map(format_timestamp_ms).unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["SUITE", "RUNS", "LATEST"], rows);
    Ok(())
}
