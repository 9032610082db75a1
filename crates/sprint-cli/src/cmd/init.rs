use crate::output::print_json;
use anyhow::Context;
use sprint_core::{config::Config, document::Document, paths};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let project_name = name
        .map(str::to_string)
        .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "project".to_string());

    if !json {
        println!("Initializing sprint board in: {}", root.display());
    }

    // 1. Write .sprint.json if missing
    let config_path = paths::config_path(root);
    let config_created = if config_path.exists() {
        false
    } else {
        Config::new(&project_name)
            .save(root)
            .context("failed to write .sprint.json")?;
        true
    };
    let config = Config::load(root).context("failed to read .sprint.json")?;

    // 2. Write the data file if missing
    let data_path = config.data_path(root);
    let data_created = if data_path.exists() {
        false
    } else {
        let mut doc = Document::new(&config.project_name, super::today());
        doc.save(&data_path)
            .with_context(|| format!("failed to write {}", data_path.display()))?;
        true
    };

    if json {
        return print_json(&serde_json::json!({
            "root": root,
            "project": config.project_name,
            "config_created": config_created,
            "data_created": data_created,
        }));
    }

    let label = |created: bool| if created { "created:" } else { "exists: " };
    println!("  {} {}", label(config_created), paths::CONFIG_FILE);
    println!("  {} {}", label(data_created), config.data_file);
    if data_created {
        println!("\nNext: sprint add <title>");
    }
    Ok(())
}
