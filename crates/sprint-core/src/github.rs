//! Boundary to the external issue tracker.
//!
//! Reconciliation in [`crate::sync`] only talks to the [`IssueTracker`] trait.
//! [`GhCli`] implements it by shelling out to the GitHub CLI (`gh`), one
//! blocking subprocess per call, with no retries and no timeout.

use crate::error::{Result, SprintError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Data shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

static REMOTE_RE: OnceLock<Regex> = OnceLock::new();

fn remote_re() -> &'static Regex {
    REMOTE_RE.get_or_init(|| {
        Regex::new(r"github\.com[:/]([^/\s]+)/([^/\s]+?)(?:\.git)?/?$").unwrap()
    })
}

impl RepoRef {
    /// Parse `owner/name` out of an https or ssh GitHub remote URL.
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let caps = remote_re().captures(url.trim())?;
        Some(Self {
            owner: caps[1].to_string(),
            name: caps[2].to_string(),
        })
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn issue_url(&self, number: u64) -> String {
        format!("https://github.com/{}/{}/issues/{number}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueState {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueView {
    pub state: IssueState,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSpec {
    pub name: String,
    pub color: &'static str,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub number: u64,
    pub owner: String,
}

// ---------------------------------------------------------------------------
// IssueTracker
// ---------------------------------------------------------------------------

/// Operations the reconciliation logic needs from an issue tracker.
pub trait IssueTracker {
    /// Confirms the client is installed and runnable.
    fn version(&self) -> Result<String>;
    /// The repository the working tree pushes to.
    fn resolve_repo(&self) -> Result<RepoRef>;
    fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<CreatedIssue>;
    fn close_issue(&self, repo: &RepoRef, number: u64) -> Result<()>;
    fn reopen_issue(&self, repo: &RepoRef, number: u64) -> Result<()>;
    fn view_issue(&self, repo: &RepoRef, number: u64) -> Result<IssueView>;
    /// Create or update a label. Callers ignore failures.
    fn create_label(&self, repo: &RepoRef, label: &LabelSpec) -> Result<()>;
    fn add_to_project(&self, project: &ProjectRef, issue_url: &str) -> Result<()>;
    /// URLs of the issues already on a project board.
    fn project_issue_urls(&self, project: &ProjectRef) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// GhCli
// ---------------------------------------------------------------------------

pub struct GhCli {
    bin: Option<PathBuf>,
    cwd: PathBuf,
}

#[derive(Deserialize)]
struct ProjectItems {
    #[serde(default)]
    items: Vec<ProjectItem>,
}

#[derive(Deserialize)]
struct ProjectItem {
    #[serde(default)]
    content: Option<ProjectItemContent>,
}

#[derive(Deserialize)]
struct ProjectItemContent {
    #[serde(default)]
    url: Option<String>,
}

static ISSUE_URL_RE: OnceLock<Regex> = OnceLock::new();

fn issue_url_re() -> &'static Regex {
    ISSUE_URL_RE.get_or_init(|| {
        Regex::new(r"https://\S+/issues/(\d+)").unwrap()
    })
}

/// Pull the issue URL and number out of `gh issue create` output.
pub fn parse_created_issue(stdout: &str) -> Option<CreatedIssue> {
    let caps = issue_url_re().captures_iter(stdout).last()?;
    Some(CreatedIssue {
        number: caps[1].parse().ok()?,
        url: caps[0].to_string(),
    })
}

impl GhCli {
    /// Client rooted at `cwd`; the binary is looked up on `PATH` once.
    pub fn new(cwd: &Path) -> Self {
        Self {
            bin: which::which("gh").ok(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.bin.is_some()
    }

    fn gh(&self, args: &[&str]) -> Result<String> {
        let bin = self.bin.as_ref().ok_or(SprintError::TrackerUnavailable)?;
        tracing::debug!(?args, "gh");
        let output = Command::new(bin)
            .args(args)
            .current_dir(&self.cwd)
            .output()
            .map_err(|e| SprintError::Tracker(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(?args, status = %output.status, "gh failed");
            return Err(SprintError::Tracker(stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl IssueTracker for GhCli {
    fn version(&self) -> Result<String> {
        let out = self.gh(&["--version"])?;
        Ok(out.lines().next().unwrap_or_default().trim().to_string())
    }

    fn resolve_repo(&self) -> Result<RepoRef> {
        let output = Command::new("git")
            .args(["remote", "get-url", "origin"])
            .current_dir(&self.cwd)
            .output()
            .map_err(|e| SprintError::NoRemote(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SprintError::NoRemote(stderr.trim().to_string()));
        }
        let url = String::from_utf8_lossy(&output.stdout);
        RepoRef::from_remote_url(&url).ok_or_else(|| {
            SprintError::NoRemote(format!("origin '{}' is not a GitHub URL", url.trim()))
        })
    }

    fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<CreatedIssue> {
        let slug = repo.slug();
        let mut args = vec![
            "issue",
            "create",
            "--repo",
            slug.as_str(),
            "--title",
            issue.title.as_str(),
            "--body",
            issue.body.as_str(),
        ];
        for label in &issue.labels {
            args.push("--label");
            args.push(label.as_str());
        }
        let out = self.gh(&args)?;
        parse_created_issue(&out).ok_or_else(|| {
            SprintError::Tracker(format!("unexpected issue create output: {}", out.trim()))
        })
    }

    fn close_issue(&self, repo: &RepoRef, number: u64) -> Result<()> {
        let n = number.to_string();
        self.gh(&["issue", "close", &n, "--repo", &repo.slug()])?;
        Ok(())
    }

    fn reopen_issue(&self, repo: &RepoRef, number: u64) -> Result<()> {
        let n = number.to_string();
        self.gh(&["issue", "reopen", &n, "--repo", &repo.slug()])?;
        Ok(())
    }

    fn view_issue(&self, repo: &RepoRef, number: u64) -> Result<IssueView> {
        let n = number.to_string();
        let out = self.gh(&[
            "issue",
            "view",
            &n,
            "--repo",
            &repo.slug(),
            "--json",
            "state,title",
        ])?;
        Ok(serde_json::from_str(&out)?)
    }

    fn create_label(&self, repo: &RepoRef, label: &LabelSpec) -> Result<()> {
        self.gh(&[
            "label",
            "create",
            &label.name,
            "--repo",
            &repo.slug(),
            "--color",
            label.color,
            "--description",
            &label.description,
            "--force",
        ])?;
        Ok(())
    }

    fn add_to_project(&self, project: &ProjectRef, issue_url: &str) -> Result<()> {
        let n = project.number.to_string();
        self.gh(&[
            "project",
            "item-add",
            &n,
            "--owner",
            &project.owner,
            "--url",
            issue_url,
        ])?;
        Ok(())
    }

    fn project_issue_urls(&self, project: &ProjectRef) -> Result<Vec<String>> {
        let n = project.number.to_string();
        let out = self.gh(&[
            "project",
            "item-list",
            &n,
            "--owner",
            &project.owner,
            "--format",
            "json",
            "--limit",
            "1000",
        ])?;
        let items: ProjectItems = serde_json::from_str(&out)?;
        Ok(items
            .items
            .into_iter()
            .filter_map(|i| i.content.and_then(|c| c.url))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
