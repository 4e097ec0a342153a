use crate::output::print_json;
use anyhow::Context;
use benchlog_core::config::{Config, WarnLevel};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration, defaults included
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let cfg = Config::load(root).context("failed to load config")?;
    match subcmd {
        ConfigSubcommand::Show => show(root, &cfg, json),
        ConfigSubcommand::Validate => validate(&cfg, json),
    }
}

fn show(root: &Path, cfg: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(cfg);
    }
    println!("project:            {}", cfg.project);
    println!("ledger:             {}", cfg.ledger_path(root).display());
    println!(
        "repo_url:           {}",
        cfg.repo_url.as_deref().unwrap_or("-")
    );
    println!("export.path:        {}", cfg.export_path(root).display());
    println!(
        "max_items_in_chart: {}",
        cfg.export
            .max_items_in_chart
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    );
    Ok(())
}

fn validate(cfg: &Config, json: bool) -> anyhow::Result<()> {
    let warnings = cfg.validate();
    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);

    if json {
        print_json(&serde_json::json!({
            "ok": !has_errors,
            "warnings": warnings,
        }))?;
    } else if warnings.is_empty() {
        println!("Config OK");
    } else {
        for w in &warnings {
            let tag = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("{tag}: {}", w.message);
        }
    }

    if has_errors {
        anyhow::bail!("config has errors");
    }
    Ok(())
}
