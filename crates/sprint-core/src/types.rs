use serde::{Deserialize, Serialize};
use std::fmt;

pub const BACKLOG: &str = "backlog";
pub const DONE: &str = "done";
pub const BLOCKED: &str = "blocked";

pub const DEFAULT_COLUMNS: [&str; 5] = [BACKLOG, "ready", "in_progress", "review", DONE];

/// Icon shown for values that do not parse into a known variant.
pub const UNKNOWN_ICON: &str = "⚪";

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Case-insensitive parse; `None` for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Priority::Critical),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Priority::Critical => "🔴",
            Priority::High => "🟠",
            Priority::Medium => "🟡",
            Priority::Low => "🟢",
        }
    }

    /// Issue label for this priority. Only critical and high are labelled.
    pub fn label(self) -> Option<String> {
        match self {
            Priority::Critical | Priority::High => Some(format!("priority:{}", self.as_str())),
            Priority::Medium | Priority::Low => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn priority_icon(priority: &str) -> &'static str {
    Priority::parse(priority).map_or(UNKNOWN_ICON, Priority::icon)
}

// ---------------------------------------------------------------------------
// TaskType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Feature,
    Bug,
    Refactor,
    Docs,
    Test,
    Chore,
    Spike,
}

impl TaskType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "feature" => Some(TaskType::Feature),
            "bug" => Some(TaskType::Bug),
            "refactor" => Some(TaskType::Refactor),
            "docs" => Some(TaskType::Docs),
            "test" => Some(TaskType::Test),
            "chore" => Some(TaskType::Chore),
            "spike" => Some(TaskType::Spike),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Feature => "feature",
            TaskType::Bug => "bug",
            TaskType::Refactor => "refactor",
            TaskType::Docs => "docs",
            TaskType::Test => "test",
            TaskType::Chore => "chore",
            TaskType::Spike => "spike",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            TaskType::Feature => "✨",
            TaskType::Bug => "🐛",
            TaskType::Refactor => "🔧",
            TaskType::Docs => "📝",
            TaskType::Test => "🧪",
            TaskType::Chore => "🧹",
            TaskType::Spike => "🔬",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn type_icon(task_type: &str) -> &'static str {
    TaskType::parse(task_type).map_or("📌", TaskType::icon)
}

// ---------------------------------------------------------------------------
// DebtStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    Open,
    Partial,
    Closed,
}

impl DebtStatus {
    /// Free text is tolerated; anything unmatched reads as open.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "partial" => DebtStatus::Partial,
            "closed" => DebtStatus::Closed,
            _ => DebtStatus::Open,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            DebtStatus::Open => "🔴",
            DebtStatus::Partial => "🟡",
            DebtStatus::Closed => "✅",
        }
    }
}

// ---------------------------------------------------------------------------
// Column helpers
// ---------------------------------------------------------------------------

/// `in_progress` -> `IN PROGRESS`
pub fn column_title(column: &str) -> String {
    column.replace(['_', '-'], " ").to_uppercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
