use crate::error::{Result, SprintError};
use crate::types::{BACKLOG, BLOCKED, DONE};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields that `edit_task` may change.
pub const EDITABLE_FIELDS: [&str; 8] = [
    "title", "type", "priority", "points", "owner", "branch", "sprint", "notes",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(rename = "type", default = "default_type")]
    pub task_type: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default, deserialize_with = "crate::document::string_or_number")]
    pub sprint: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "linkedTD", default, skip_serializing_if = "Option::is_none")]
    pub linked_td: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<String>,
    pub created_at: NaiveDate,
    #[serde(default)]
    pub completed_at: Option<NaiveDate>,
    #[serde(default)]
    pub github_issue: Option<u64>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_type() -> String {
    "feature".to_string()
}

fn default_status() -> String {
    BACKLOG.to_string()
}

fn default_priority() -> String {
    "medium".to_string()
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        sprint: impl Into<String>,
        today: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            task_type: default_type(),
            status: default_status(),
            priority: default_priority(),
            points: 0,
            sprint: sprint.into(),
            owner: None,
            branch: None,
            worktree: None,
            notes: None,
            linked_td: None,
            acceptance_criteria: Vec::new(),
            blockers: Vec::new(),
            created_at: today,
            completed_at: None,
            github_issue: None,
            github_url: None,
            extra: Map::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == DONE
    }

    /// Blocked either by listed blockers or by the `blocked` display status.
    pub fn is_blocked(&self) -> bool {
        !self.blockers.is_empty() || self.status == BLOCKED
    }

    /// Blockers joined for display, or a placeholder for a bare `blocked` status.
    pub fn blocked_reason(&self) -> String {
        if self.blockers.is_empty() {
            "no blockers listed".to_string()
        } else {
            self.blockers.join("; ")
        }
    }

    /// Status for listings, flagging tasks held up by blockers.
    pub fn status_label(&self) -> String {
        if self.is_blocked() && self.status != BLOCKED {
            format!("{} (blocked)", self.status)
        } else {
            self.status.clone()
        }
    }

    /// Set status to done, stamping `completed_at` only the first time.
    pub fn mark_done(&mut self, today: NaiveDate) {
        self.status = DONE.to_string();
        self.completed_at.get_or_insert(today);
    }
}

// ---------------------------------------------------------------------------
// Change records returned to callers for confirmation output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub id: String,
    pub from: String,
    pub to: String,
    pub completed_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub id: String,
    pub field: String,
    pub old: Option<String>,
    pub new: String,
}

// ---------------------------------------------------------------------------
// Task list operations (operate on a mutable Vec<Task>)
// ---------------------------------------------------------------------------

/// Next id for `prefix`: 1 + the highest numeric suffix already used under
/// that prefix, zero-padded to three digits.
pub fn next_id(tasks: &[Task], prefix: &str) -> String {
    let prefix = prefix.to_uppercase();
    let pattern = format!(r"(?i)^{}-(\d+)$", regex::escape(&prefix));
    let max = match Regex::new(&pattern) {
        Ok(re) => tasks
            .iter()
            .filter_map(|t| re.captures(&t.id))
            .filter_map(|c| c[1].parse::<u64>().ok())
            .max()
            .unwrap_or(0),
        Err(_) => 0,
    };
    format!("{prefix}-{:03}", max + 1)
}

pub fn add_task(
    tasks: &mut Vec<Task>,
    prefix: &str,
    title: &str,
    sprint: &str,
    today: NaiveDate,
) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SprintError::EmptyTitle);
    }
    let id = next_id(tasks, prefix);
    tasks.push(Task::new(id.clone(), title, sprint, today));
    Ok(id)
}

pub fn move_task(
    tasks: &mut [Task],
    id: &str,
    status: &str,
    columns: &[String],
    today: NaiveDate,
) -> Result<StatusChange> {
    if !columns.iter().any(|c| c == status) {
        return Err(SprintError::InvalidStatus {
            status: status.to_string(),
            columns: columns.to_vec(),
        });
    }
    let task = find_mut(tasks, id)?;
    let from = std::mem::replace(&mut task.status, status.to_string());
    if task.is_done() {
        task.completed_at.get_or_insert(today);
    }
    Ok(StatusChange {
        id: task.id.clone(),
        from,
        to: task.status.clone(),
        completed_at: task.completed_at,
    })
}

pub fn edit_task(tasks: &mut [Task], id: &str, field: &str, value: &str) -> Result<FieldChange> {
    if !EDITABLE_FIELDS.contains(&field) {
        return Err(SprintError::InvalidField(field.to_string()));
    }
    let task = find_mut(tasks, id)?;
    let value = value.to_string();
    let (old, new) = match field {
        "title" => (Some(std::mem::replace(&mut task.title, value)), task.title.clone()),
        "type" => (
            Some(std::mem::replace(&mut task.task_type, value)),
            task.task_type.clone(),
        ),
        "priority" => (
            Some(std::mem::replace(&mut task.priority, value)),
            task.priority.clone(),
        ),
        "points" => {
            let points = value.trim().parse::<u32>().unwrap_or(0);
            let old = std::mem::replace(&mut task.points, points);
            (Some(old.to_string()), points.to_string())
        }
        "owner" => (task.owner.replace(value.clone()), value),
        "branch" => (task.branch.replace(value.clone()), value),
        "sprint" => (
            Some(std::mem::replace(&mut task.sprint, value)),
            task.sprint.clone(),
        ),
        "notes" => (task.notes.replace(value.clone()), value),
        _ => return Err(SprintError::InvalidField(field.to_string())),
    };
    Ok(FieldChange {
        id: task.id.clone(),
        field: field.to_string(),
        old,
        new,
    })
}

/// Case-insensitive lookup by id.
pub fn find<'a>(tasks: &'a [Task], id: &str) -> Result<&'a Task> {
    tasks
        .iter()
        .find(|t| t.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| SprintError::TaskNotFound(id.to_string()))
}

pub fn find_mut<'a>(tasks: &'a mut [Task], id: &str) -> Result<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|t| t.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| SprintError::TaskNotFound(id.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_COLUMNS;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn columns() -> Vec<String> {
        DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn add_task_defaults() {
        let mut tasks = Vec::new();
        let id = add_task(&mut tasks, "task", "Write docs", "1", day(1)).unwrap();
        assert_eq!(id, "TASK-001");
        let t = &tasks[0];
        assert_eq!(t.status, "backlog");
        assert_eq!(t.priority, "medium");
        assert_eq!(t.task_type, "feature");
        assert_eq!(t.points, 0);
        assert_eq!(t.sprint, "1");
        assert_eq!(t.created_at, day(1));
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn add_task_rejects_empty_title() {
        let mut tasks = Vec::new();
        let err = add_task(&mut tasks, "TASK", "   ", "1", day(1)).unwrap_err();
        assert!(matches!(err, SprintError::EmptyTitle));
        assert!(tasks.is_empty());
    }

    #[test]
    fn ids_increase_without_gaps() {
        let mut tasks = Vec::new();
        let ids: Vec<String> = (0..12)
            .map(|i| add_task(&mut tasks, "TASK", &format!("t{i}"), "1", day(1)).unwrap())
            .collect();
        assert_eq!(ids[0], "TASK-001");
        assert_eq!(ids[9], "TASK-010");
        assert_eq!(ids[11], "TASK-012");

        edit_task(&mut tasks, "TASK-003", "title", "renamed").unwrap();
        let id = add_task(&mut tasks, "TASK", "after edit", "1", day(2)).unwrap();
        assert_eq!(id, "TASK-013");
    }

    #[test]
    fn id_namespace_is_per_prefix() {
        let mut tasks = Vec::new();
        add_task(&mut tasks, "TASK", "a", "1", day(1)).unwrap();
        add_task(&mut tasks, "TASK", "b", "1", day(1)).unwrap();
        let bug = add_task(&mut tasks, "BUG", "c", "1", day(1)).unwrap();
        assert_eq!(bug, "BUG-001");
    }

    #[test]
    fn next_id_uses_max_not_count() {
        let mut tasks = vec![Task::new("TASK-007", "x", "1", day(1))];
        tasks.push(Task::new("TASK-002", "y", "1", day(1)));
        assert_eq!(next_id(&tasks, "TASK"), "TASK-008");
    }

    #[test]
    fn move_stamps_completion_once() {
        let mut tasks = vec![Task::new("TASK-001", "x", "1", day(1))];
        let change = move_task(&mut tasks, "task-001", "done", &columns(), day(5)).unwrap();
        assert_eq!(change.from, "backlog");
        assert_eq!(change.to, "done");
        assert_eq!(tasks[0].completed_at, Some(day(5)));

        move_task(&mut tasks, "TASK-001", "review", &columns(), day(6)).unwrap();
        assert_eq!(tasks[0].completed_at, Some(day(5)));

        move_task(&mut tasks, "TASK-001", "done", &columns(), day(9)).unwrap();
        assert_eq!(tasks[0].completed_at, Some(day(5)));
    }

    #[test]
    fn move_rejects_unknown_status_without_mutation() {
        let mut tasks = vec![Task::new("TASK-001", "x", "1", day(1))];
        let err = move_task(&mut tasks, "TASK-001", "archived", &columns(), day(2)).unwrap_err();
        assert!(matches!(err, SprintError::InvalidStatus { .. }));
        assert_eq!(tasks[0].status, "backlog");
    }

    #[test]
    fn move_blocked_is_not_a_column() {
        let mut tasks = vec![Task::new("TASK-001", "x", "1", day(1))];
        assert!(move_task(&mut tasks, "TASK-001", "blocked", &columns(), day(2)).is_err());
    }

    #[test]
    fn blocked_status_and_blockers_both_flag_a_task() {
        let mut t = Task::new("TASK-001", "x", "1", day(1));
        assert!(!t.is_blocked());
        assert_eq!(t.status_label(), "backlog");

        t.blockers.push("waiting on design".into());
        assert!(t.is_blocked());
        assert_eq!(t.status_label(), "backlog (blocked)");
        assert_eq!(t.blocked_reason(), "waiting on design");

        t.blockers.clear();
        t.status = "blocked".into();
        assert!(t.is_blocked());
        assert_eq!(t.status_label(), "blocked");
        assert_eq!(t.blocked_reason(), "no blockers listed");
    }

    #[test]
    fn move_unknown_task() {
        let mut tasks = vec![Task::new("TASK-001", "x", "1", day(1))];
        let err = move_task(&mut tasks, "TASK-099", "done", &columns(), day(2)).unwrap_err();
        assert!(matches!(err, SprintError::TaskNotFound(_)));
    }

    #[test]
    fn edit_points_coerces_garbage_to_zero() {
        let mut tasks = vec![Task::new("TASK-001", "x", "1", day(1))];
        let change = edit_task(&mut tasks, "TASK-001", "points", "5").unwrap();
        assert_eq!(change.old.as_deref(), Some("0"));
        assert_eq!(tasks[0].points, 5);

        let change = edit_task(&mut tasks, "TASK-001", "points", "lots").unwrap();
        assert_eq!(change.old.as_deref(), Some("5"));
        assert_eq!(change.new, "0");
        assert_eq!(tasks[0].points, 0);
    }

    #[test]
    fn edit_optional_fields_report_prior_value() {
        let mut tasks = vec![Task::new("TASK-001", "x", "1", day(1))];
        let change = edit_task(&mut tasks, "TASK-001", "owner", "sam").unwrap();
        assert_eq!(change.old, None);
        let change = edit_task(&mut tasks, "TASK-001", "owner", "kim").unwrap();
        assert_eq!(change.old.as_deref(), Some("sam"));
        assert_eq!(tasks[0].owner.as_deref(), Some("kim"));
    }

    #[test]
    fn edit_stores_unvalidated_values() {
        let mut tasks = vec![Task::new("TASK-001", "x", "1", day(1))];
        edit_task(&mut tasks, "TASK-001", "priority", "urgent").unwrap();
        edit_task(&mut tasks, "TASK-001", "type", "epic").unwrap();
        assert_eq!(tasks[0].priority, "urgent");
        assert_eq!(tasks[0].task_type, "epic");
    }

    #[test]
    fn edit_rejects_fields_outside_allow_list() {
        let mut tasks = vec![Task::new("TASK-001", "x", "1", day(1))];
        for field in ["id", "status", "createdAt", "githubIssue"] {
            let err = edit_task(&mut tasks, "TASK-001", field, "v").unwrap_err();
            assert!(matches!(err, SprintError::InvalidField(_)), "{field}");
        }
        assert_eq!(tasks[0].id, "TASK-001");
    }

    #[test]
    fn mark_done_keeps_existing_stamp() {
        let mut t = Task::new("TASK-001", "x", "1", day(1));
        t.mark_done(day(3));
        t.mark_done(day(4));
        assert_eq!(t.completed_at, Some(day(3)));
    }
}
