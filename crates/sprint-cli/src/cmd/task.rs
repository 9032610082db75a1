use super::{today, Project};
use crate::output::{or_none, print_json, print_table};
use anyhow::Context;
use sprint_core::{
    task as task_ops,
    types::{priority_icon, type_icon},
};
use std::path::Path;

pub fn list(root: &Path, status: Option<&str>, active: bool, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let doc = project.load()?;

    let tasks: Vec<_> = doc
        .tasks
        .iter()
        .filter(|t| !active || t.sprint == doc.current_sprint)
        .filter(|t| status.map_or(true, |s| t.status == s))
        .collect();

    if json {
        return print_json(&tasks);
    }

    if tasks.is_empty() {
        match status {
            Some(s) => println!("No tasks with status '{s}'."),
            None => println!("No tasks yet. Run: sprint add <title>"),
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                format!("{} {}", priority_icon(&t.priority), t.id),
                t.status_label(),
                t.points.to_string(),
                t.sprint.clone(),
                t.owner.clone().unwrap_or_default(),
                t.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "PTS", "SPRINT", "OWNER", "TITLE"], rows);
    Ok(())
}

pub fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let doc = project.load()?;
    let task = task_ops::find(&doc.tasks, id)?;

    if json {
        return print_json(task);
    }

    println!("{} {}: {}", type_icon(&task.task_type), task.id, task.title);
    println!("Type:      {}", task.task_type);
    println!("Status:    {}", task.status);
    println!(
        "Priority:  {} {}",
        priority_icon(&task.priority),
        task.priority
    );
    println!("Points:    {}", task.points);
    println!("Sprint:    {}", task.sprint);
    println!("Owner:     {}", or_none(task.owner.as_deref()));
    if let Some(branch) = &task.branch {
        println!("Branch:    {branch}");
    }
    if let Some(worktree) = &task.worktree {
        println!("Worktree:  {worktree}");
    }
    if let Some(td) = &task.linked_td {
        println!("Debt:      {td}");
    }
    println!("Created:   {}", task.created_at);
    if let Some(done) = task.completed_at {
        println!("Completed: {done}");
    }
    match (task.github_issue, &task.github_url) {
        (Some(n), Some(url)) => println!("Issue:     #{n} {url}"),
        (Some(n), None) => println!("Issue:     #{n}"),
        _ => {}
    }
    if !task.acceptance_criteria.is_empty() {
        println!("\nAcceptance criteria:");
        for c in &task.acceptance_criteria {
            println!("  - {c}");
        }
    }
    if !task.blockers.is_empty() {
        println!("\nBlockers:");
        for b in &task.blockers {
            println!("  - {b}");
        }
    }
    if let Some(notes) = &task.notes {
        println!("\nNotes:\n{notes}");
    }
    Ok(())
}

pub fn add(root: &Path, title: &str, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let mut doc = project.load()?;
    let sprint = doc.current_sprint.clone();
    let id = task_ops::add_task(
        &mut doc.tasks,
        &project.config.prefix(),
        title,
        &sprint,
        today(),
    )?;
    project.save(&mut doc).context("failed to save sprint data")?;

    let task = task_ops::find(&doc.tasks, &id)?;
    if json {
        return print_json(task);
    }
    println!("Added [{}]: {}", task.id, task.title);
    Ok(())
}

pub fn move_to(root: &Path, id: &str, status: &str, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let mut doc = project.load()?;
    let change = task_ops::move_task(&mut doc.tasks, id, status, &project.columns(), today())?;
    project.save(&mut doc).context("failed to save sprint data")?;

    if json {
        return print_json(&change);
    }
    println!("Moved [{}]: {} -> {}", change.id, change.from, change.to);
    Ok(())
}

pub fn edit(root: &Path, id: &str, field: &str, value: &str, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let mut doc = project.load()?;
    let change = task_ops::edit_task(&mut doc.tasks, id, field, value)?;
    project.save(&mut doc).context("failed to save sprint data")?;

    if json {
        return print_json(&change);
    }
    println!(
        "Updated [{}] {}: {} -> {}",
        change.id,
        change.field,
        or_none(change.old.as_deref()),
        change.new
    );
    Ok(())
}
