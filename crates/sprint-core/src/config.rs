use crate::error::Result;
use crate::paths;
use crate::types::DEFAULT_COLUMNS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_board_file")]
    pub board_file: String,
    #[serde(default = "default_task_prefix")]
    pub task_prefix: String,
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
    /// GitHub project board number that new issues are added to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_project: Option<u64>,
    /// Owner of the project board; defaults to the repository owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_project_owner: Option<String>,
}

fn default_project_name() -> String {
    "project".to_string()
}

fn default_data_file() -> String {
    paths::DEFAULT_DATA_FILE.to_string()
}

fn default_board_file() -> String {
    paths::DEFAULT_BOARD_FILE.to_string()
}

fn default_task_prefix() -> String {
    "TASK".to_string()
}

fn default_columns() -> Vec<String> {
    DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self::new(default_project_name())
    }
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            data_file: default_data_file(),
            board_file: default_board_file(),
            task_prefix: default_task_prefix(),
            columns: default_columns(),
            github_project: None,
            github_project_owner: None,
        }
    }

    /// Load the config in `root`, falling back to defaults when it is absent.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(root)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(paths::config_path(root))?;
        let cfg: Config = serde_json::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_json(&paths::config_path(root), self)
    }

    pub fn data_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.data_file)
    }

    pub fn board_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.board_file)
    }

    /// Task id prefix, upper-cased.
    pub fn prefix(&self) -> String {
        let p = self.task_prefix.trim();
        if p.is_empty() {
            default_task_prefix()
        } else {
            p.to_uppercase()
        }
    }

    /// Configured columns, or the defaults when the list is empty.
    pub fn columns(&self) -> Vec<String> {
        if self.columns.is_empty() {
            default_columns()
        } else {
            self.columns.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
