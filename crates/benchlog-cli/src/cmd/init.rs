use crate::output::print_json;
use anyhow::Context;
use benchlog_core::{config::Config, io, paths, LedgerStore};
use std::path::Path;

pub fn run(root: &Path, repo_url: Option<&str>, json: bool) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    let dir = paths::benchlog_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    let config_created = if config_path.exists() {
        false
    } else {
        let mut cfg = Config::new(&project_name);
        cfg.repo_url = repo_url.map(str::to_string);
        cfg.save(root).context("failed to write config.yaml")?;
        true
    };

    let cfg = Config::load(root).context("failed to load config.yaml")?;
    let store = LedgerStore::open(cfg.ledger_path(root)).context("failed to open ledger")?;
    let ledger_created = !store.is_initialized();
    if ledger_created {
        store.save().context("failed to write ledger")?;
    }

    if json {
        print_json(&serde_json::json!({
            "root": root,
            "config": config_path,
            "config_created": config_created,
            "ledger": store.path(),
            "ledger_created": ledger_created,
        }))?;
        return Ok(());
    }

    println!("Initializing benchlog in: {}", root.display());
    let label = |created: bool| if created { "created:" } else { "exists: " };
    println!("  {} {}", label(config_created), config_path.display());
    println!("  {} {}", label(ledger_created), store.path().display());
    Ok(())
}
