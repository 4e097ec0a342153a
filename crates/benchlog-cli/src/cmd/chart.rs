use super::Project;
use crate::output::print_json;
use anyhow::Context;
use benchlog_core::{chart::ChartData, io};
use std::path::Path;

pub fn import(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let data = ChartData::parse(&text)
        .with_context(|| format!("failed to parse {}", file.display()))?;
    if let Some(url) = &data.repo_url {
        tracing::info!(repo_url = %url, "chart data repository");
    }

    let project = Project::open(root)?;
    let recorder = project.recorder();
    let mut imported = Vec::new();
    for (suite, records) in data.into_records() {
        let count = recorder
            .append_all(&suite, records)
            .with_context(|| format!("failed to import suite '{suite}'"))?;
        imported.push((suite, count));
    }

    if json {
        let suites: serde_json::Map<String, serde_json::Value> = imported
            .into_iter()
            .map(|(suite, count)| (suite, count.into()))
            .collect();
        print_json(&serde_json::json!({ "imported": suites }))?;
    } else {
        for (suite, count) in &imported {
            println!("Imported {count} run(s) into '{suite}'");
        }
    }
    Ok(())
}

pub fn export(
    root: &Path,
    out: Option<&Path>,
    max_items: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let path = match out {
        Some(p) => p.to_path_buf(),
        None => project.config.export_path(&project.root),
    };
    let max_items = max_items.or(project.config.export.max_items_in_chart);

    let ledger = project.store.snapshot();
    let data = ChartData::from_ledger(&ledger, project.config.repo_url.as_deref(), max_items);
    let script = data.to_script()?;
    io::atomic_write(&path, script.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    let runs: usize = data.entries.values().map(Vec::len).sum();
    if json {
        print_json(&serde_json::json!({
            "path": path,
            "suites": data.entries.len(),
            "runs": runs,
        }))?;
    } else {
        println!(
            "Exported {runs} run(s) across {} suite(s) to {}",
            data.entries.len(),
            path.display()
        );
    }
    Ok(())
}
