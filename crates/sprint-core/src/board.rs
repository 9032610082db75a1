//! Column-grouped views of the current sprint.
//!
//! Both the terminal grid and the markdown board are built from the same
//! [`Board`] grouping: active tasks partitioned by status in configured column
//! order. Tasks whose status matches no column are left out of the grid.

use crate::debt::progress_bar;
use crate::document::Document;
use crate::task::Task;
use crate::types::{column_title, priority_icon};
use serde::Serialize;
use std::fmt::Write as _;

/// Total width of the terminal grid.
pub const BOARD_WIDTH: usize = 80;

const PROGRESS_BAR_WIDTH: usize = 20;

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub done_points: u64,
    pub total_points: u64,
    pub percent: u32,
}

impl Progress {
    /// `done / total * 100`, rounded; zero when there are no points at all.
    pub fn of(tasks: &[&Task]) -> Self {
        let total_points: u64 = tasks.iter().map(|t| u64::from(t.points)).sum();
        let done_points: u64 = tasks
            .iter()
            .filter(|t| t.is_done())
            .map(|t| u64::from(t.points))
            .sum();
        let percent = if total_points == 0 {
            0
        } else {
            (done_points as f64 / total_points as f64 * 100.0).round() as u32
        };
        Self {
            done_points,
            total_points,
            percent,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Column<'a> {
    pub name: String,
    pub tasks: Vec<&'a Task>,
}

impl Column<'_> {
    pub fn points(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.points)).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Board<'a> {
    pub project: &'a str,
    pub sprint: &'a str,
    pub columns: Vec<Column<'a>>,
    /// Active tasks in document order, including those outside every column.
    pub active: Vec<&'a Task>,
    /// Active tasks with blockers or the `blocked` status, whatever their column.
    pub blocked: Vec<&'a Task>,
    pub progress: Progress,
}

impl<'a> Board<'a> {
    pub fn build(doc: &'a Document, columns: &[String]) -> Self {
        let active = doc.active_tasks();
        let columns = columns
            .iter()
            .map(|name| Column {
                name: name.clone(),
                tasks: active.iter().copied().filter(|t| t.status == *name).collect(),
            })
            .collect();
        let blocked = active.iter().copied().filter(|t| t.is_blocked()).collect();
        let progress = Progress::of(&active);
        Self {
            project: &doc.project,
            sprint: &doc.current_sprint,
            columns,
            active,
            blocked,
            progress,
        }
    }

    /// Grid height: the fullest column, never less than one row.
    pub fn rows(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.tasks.len())
            .max()
            .unwrap_or(0)
            .max(1)
    }

    pub fn column_width(&self) -> usize {
        BOARD_WIDTH / self.columns.len().max(1)
    }
}

// ---------------------------------------------------------------------------
// Terminal grid
// ---------------------------------------------------------------------------

/// Left-most `width` characters of `s`, space-padded to exactly `width`.
pub fn fit(s: &str, width: usize) -> String {
    let clipped: String = s.chars().take(width).collect();
    format!("{clipped:<width$}")
}

fn cell(task: &Task) -> String {
    format!("{} {}", priority_icon(&task.priority), task.id)
}

pub fn render_terminal(doc: &Document, columns: &[String]) -> String {
    let board = Board::build(doc, columns);
    let width = board.column_width();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}: Sprint {} ({} to {})",
        doc.project, doc.current_sprint, doc.sprint_start, doc.sprint_end
    );
    let _ = writeln!(
        out,
        "Progress: {} {}% ({}/{} points)",
        progress_bar(board.progress.percent, PROGRESS_BAR_WIDTH),
        board.progress.percent,
        board.progress.done_points,
        board.progress.total_points
    );
    out.push('\n');

    let header: Vec<String> = board
        .columns
        .iter()
        .map(|c| fit(&format!("{} ({})", column_title(&c.name), c.tasks.len()), width))
        .collect();
    let _ = writeln!(out, "{}", header.join("│"));
    let rule: Vec<String> = board.columns.iter().map(|_| "─".repeat(width)).collect();
    let _ = writeln!(out, "{}", rule.join("┼"));

    for row in 0..board.rows() {
        let cells: Vec<String> = board
            .columns
            .iter()
            .map(|c| fit(&c.tasks.get(row).map(|t| cell(t)).unwrap_or_default(), width))
            .collect();
        let _ = writeln!(out, "{}", cells.join("│"));
    }

    if !board.blocked.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "Blocked:");
        for t in &board.blocked {
            let _ = writeln!(out, "  {} {}: {}", t.id, t.title, t.blocked_reason());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

pub fn render_markdown(doc: &Document, columns: &[String]) -> String {
    let board = Board::build(doc, columns);
    let mut out = String::new();

    let _ = writeln!(out, "# {} Sprint Board", doc.project);
    out.push('\n');
    let _ = writeln!(
        out,
        "**Sprint:** {} ({} to {})  ",
        doc.current_sprint, doc.sprint_start, doc.sprint_end
    );
    let _ = writeln!(
        out,
        "**Progress:** {}% ({}/{} points)  ",
        board.progress.percent, board.progress.done_points, board.progress.total_points
    );
    let _ = writeln!(
        out,
        "**Last updated:** {}",
        doc.last_updated.format("%Y-%m-%d %H:%M UTC")
    );
    out.push('\n');

    let _ = writeln!(out, "## Board");
    out.push('\n');
    let header: Vec<String> = board.columns.iter().map(|c| column_title(&c.name)).collect();
    let _ = writeln!(out, "| {} |", header.join(" | "));
    let sep: Vec<&str> = board.columns.iter().map(|_| "---").collect();
    let _ = writeln!(out, "| {} |", sep.join(" | "));
    for row in 0..board.rows() {
        let cells: Vec<String> = board
            .columns
            .iter()
            .map(|c| {
                c.tasks
                    .get(row)
                    .map(|t| format!("{} {}: {}", priority_icon(&t.priority), t.id, escape_cell(&t.title)))
                    .unwrap_or_default()
            })
            .collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }

    if !board.blocked.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "## Blocked");
        out.push('\n');
        for t in &board.blocked {
            let _ = writeln!(out, "- **{}** {}: {}", t.id, t.title, t.blocked_reason());
        }
    }

    out.push('\n');
    let _ = writeln!(out, "## Tasks");
    if board.active.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "_No tasks in this sprint._");
    }
    for t in &board.active {
        out.push('\n');
        let _ = writeln!(out, "### {}: {}", t.id, t.title);
        out.push('\n');
        let _ = writeln!(out, "- **Status:** {}", t.status);
        let _ = writeln!(out, "- **Priority:** {} {}", priority_icon(&t.priority), t.priority);
        let _ = writeln!(out, "- **Points:** {}", t.points);
        let _ = writeln!(out, "- **Owner:** {}", t.owner.as_deref().unwrap_or("unassigned"));
        if let Some(branch) = &t.branch {
            let _ = writeln!(out, "- **Branch:** `{branch}`");
        }
        if let (Some(n), Some(url)) = (t.github_issue, &t.github_url) {
            let _ = writeln!(out, "- **Issue:** [#{n}]({url})");
        } else if let Some(n) = t.github_issue {
            let _ = writeln!(out, "- **Issue:** #{n}");
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
