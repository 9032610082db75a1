use super::{today, Project};
use crate::output::print_json;
use anyhow::Context;
use sprint_core::{
    github::GhCli,
    sync::{self, PushOptions},
    SprintError,
};
use std::path::Path;

pub fn push(root: &Path, all: bool, status: Option<String>, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let gh = GhCli::new(root);
    let mut doc = project.load()?;

    let opts = PushOptions {
        all,
        status,
        project_number: project.config.github_project,
        project_owner: project.config.github_project_owner.clone(),
    };
    let report = sync::push(&gh, &mut doc, &opts)?;
    project.save(&mut doc).context("failed to save sprint data")?;

    if json {
        return print_json(&report);
    }

    for c in &report.created {
        println!("created  [{}] #{} {}", c.id, c.issue, c.url);
    }
    for u in &report.updated {
        println!("updated  [{}] #{}: {}", u.id, u.issue, u.action);
    }
    for w in &report.warnings {
        println!("note     {w}");
    }
    for e in &report.errors {
        eprintln!("failed   [{}]: {}", e.id, e.error);
    }
    println!(
        "\n{} created, {} updated, {} failed",
        report.created.len(),
        report.updated.len(),
        report.errors.len()
    );
    Ok(())
}

pub fn pull(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let gh = GhCli::new(root);
    let mut doc = project.load()?;

    let report = sync::pull(&gh, &mut doc, today())?;
    project.save(&mut doc).context("failed to save sprint data")?;

    if json {
        return print_json(&report);
    }

    for u in &report.updated {
        println!("updated  [{}] #{}: {}", u.id, u.issue, u.action);
    }
    for w in &report.warnings {
        println!("warning  {w}");
    }
    for e in &report.errors {
        eprintln!("failed   [{}]: {}", e.id, e.error);
    }
    println!(
        "\n{} updated, {} failed",
        report.updated.len(),
        report.errors.len()
    );
    Ok(())
}

pub fn link(root: &Path, id: &str, issue: &str, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let gh = GhCli::new(root);
    if !gh.is_available() {
        return Err(SprintError::TrackerUnavailable.into());
    }
    let mut doc = project.load()?;

    let number = sync::parse_issue_number(issue)?;
    let task = sync::link(&gh, &mut doc.tasks, id, number)?;
    let (task_id, url) = (task.id.clone(), task.github_url.clone());
    project.save(&mut doc).context("failed to save sprint data")?;

    if json {
        return print_json(&serde_json::json!({
            "id": task_id,
            "issue": number,
            "url": url,
        }));
    }
    match url {
        Some(url) => println!("Linked [{task_id}] to #{number} ({url})"),
        None => println!("Linked [{task_id}] to #{number}"),
    }
    Ok(())
}
