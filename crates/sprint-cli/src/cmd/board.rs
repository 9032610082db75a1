use super::Project;
use crate::output::print_json;
use anyhow::Context;
use sprint_core::{
    board::{render_markdown, render_terminal, Board, Progress},
    document::Capacity,
    io,
    types::column_title,
};
use std::path::Path;

pub fn board(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let doc = project.load()?;
    let columns = project.columns();

    if json {
        return print_json(&Board::build(&doc, &columns));
    }
    print!("{}", render_terminal(&doc, &columns));
    Ok(())
}

pub fn status(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let doc = project.load()?;
    let board = Board::build(&doc, &project.columns());

    if json {
        #[derive(serde::Serialize)]
        struct ColumnSummary<'a> {
            name: &'a str,
            tasks: usize,
            points: u64,
        }

        #[derive(serde::Serialize)]
        struct StatusOutput<'a> {
            project: &'a str,
            sprint: &'a str,
            sprint_start: chrono::NaiveDate,
            sprint_end: chrono::NaiveDate,
            progress: &'a Progress,
            columns: Vec<ColumnSummary<'a>>,
            capacity: &'a Capacity,
            blocked: Vec<&'a str>,
            active_tasks: usize,
        }

        return print_json(&StatusOutput {
            project: &doc.project,
            sprint: &doc.current_sprint,
            sprint_start: doc.sprint_start,
            sprint_end: doc.sprint_end,
            progress: &board.progress,
            columns: board
                .columns
                .iter()
                .map(|c| ColumnSummary {
                    name: &c.name,
                    tasks: c.tasks.len(),
                    points: c.points(),
                })
                .collect(),
            capacity: &doc.capacity,
            blocked: board.blocked.iter().map(|t| t.id.as_str()).collect(),
            active_tasks: board.active.len(),
        });
    }

    println!("Project:  {}", doc.project);
    println!(
        "Sprint:   {} ({} to {})",
        doc.current_sprint, doc.sprint_start, doc.sprint_end
    );
    println!(
        "Progress: {}% ({}/{} points, {} tasks)",
        board.progress.percent,
        board.progress.done_points,
        board.progress.total_points,
        board.active.len()
    );
    println!(
        "Capacity: {}h total, {}h committed, {}h buffer",
        doc.capacity.total_hours, doc.capacity.committed, doc.capacity.buffer
    );
    println!();
    for c in &board.columns {
        println!(
            "  {:<14} {:>3} tasks  {:>4} pts",
            column_title(&c.name),
            c.tasks.len(),
            c.points()
        );
    }
    if !board.blocked.is_empty() {
        println!("\nBlocked:");
        for t in &board.blocked {
            println!("  {} {}: {}", t.id, t.title, t.blocked_reason());
        }
    }
    Ok(())
}

pub fn generate(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root)?;
    let doc = project.load()?;
    let markdown = render_markdown(&doc, &project.columns());
    let path = project.config.board_path(root);
    io::atomic_write(&path, markdown.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        return print_json(&serde_json::json!({ "path": path }));
    }
    println!("Wrote {}", path.display());
    Ok(())
}
