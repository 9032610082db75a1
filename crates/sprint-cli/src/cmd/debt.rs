use super::Project;
use crate::output::{print_json, print_table};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let doc = project.load()?;

    if json {
        return print_json(&doc.technical_debt);
    }

    if doc.technical_debt.is_empty() {
        println!("No technical debt recorded.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = doc
        .technical_debt
        .iter()
        .map(|d| {
            vec![
                format!("{} {}", d.status().icon(), d.id),
                d.status.clone(),
                format!("{} {:>3}%", d.progress_bar(), d.percent()),
                d.linked_task.clone().unwrap_or_default(),
                d.title.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "PROGRESS", "TASK", "TITLE"], rows);
    Ok(())
}
