use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SprintError {
    #[error("no sprint data at {}: run 'sprint init'", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("invalid status '{status}': expected one of {expected}", expected = .columns.join(", "))]
    InvalidStatus {
        status: String,
        columns: Vec<String>,
    },

    #[error("field '{0}' cannot be edited: expected one of {expected}", expected = crate::task::EDITABLE_FIELDS.join(", "))]
    InvalidField(String),

    #[error("invalid issue number: {0}")]
    InvalidIssueNumber(String),

    #[error("GitHub CLI (gh) not found: install it from https://cli.github.com")]
    TrackerUnavailable,

    #[error("no GitHub remote: {0}")]
    NoRemote(String),

    #[error("gh: {0}")]
    Tracker(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SprintError>;
