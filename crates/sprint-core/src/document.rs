use crate::debt::TechDebt;
use crate::error::{Result, SprintError};
use crate::task::Task;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

/// Informational only; nothing enforces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capacity {
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub committed: f64,
    #[serde(default)]
    pub buffer: f64,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub project: String,
    #[serde(deserialize_with = "string_or_number")]
    pub current_sprint: String,
    pub sprint_start: NaiveDate,
    pub sprint_end: NaiveDate,
    #[serde(default)]
    pub capacity: Capacity,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub technical_debt: Vec<TechDebt>,
    pub last_updated: DateTime<Utc>,
    /// Keys this version does not model; written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const DEFAULT_SPRINT_DAYS: i64 = 14;

impl Document {
    /// Empty document for sprint "1" starting `today`.
    pub fn new(project: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            project: project.into(),
            current_sprint: "1".to_string(),
            sprint_start: today,
            sprint_end: today + Duration::days(DEFAULT_SPRINT_DAYS),
            capacity: Capacity::default(),
            tasks: Vec::new(),
            technical_debt: Vec::new(),
            last_updated: Utc::now(),
            extra: Map::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SprintError::DocumentNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let doc: Document = serde_json::from_str(&data)?;
        Ok(doc)
    }

    /// Rewrite the whole file. `last_updated` advances on every save.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let now = Utc::now();
        self.last_updated = if now > self.last_updated {
            now
        } else {
            self.last_updated + Duration::microseconds(1)
        };
        crate::io::write_json(path, self)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Tasks belonging to the current sprint, in list order.
    pub fn active_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.sprint == self.current_sprint)
            .collect()
    }
}

/// Accept `"1"` or `1` for sprint identifiers and store them as strings.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
