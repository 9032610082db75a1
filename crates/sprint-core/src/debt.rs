use crate::types::DebtStatus;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PROGRESS_BAR_WIDTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechDebt {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub progress: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_status() -> String {
    "open".to_string()
}

impl TechDebt {
    pub fn status(&self) -> DebtStatus {
        DebtStatus::parse(&self.status)
    }

    /// Progress clamped to 0..=100.
    pub fn percent(&self) -> u32 {
        self.progress.min(100)
    }

    pub fn progress_bar(&self) -> String {
        progress_bar(self.percent(), PROGRESS_BAR_WIDTH)
    }
}

/// Fixed-width bar of filled and empty cells for a 0..=100 percentage.
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
