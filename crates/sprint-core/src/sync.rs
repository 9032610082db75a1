//! Reconciliation of task status with linked GitHub issues.
//!
//! Push and pull are batch operations: preconditions (client present, remote
//! resolvable) are checked once up front and abort the whole run, while a
//! failure on one task is recorded in the report and the batch continues.
//! Neither function persists the document; the caller saves afterward.

use crate::document::Document;
use crate::error::{Result, SprintError};
use crate::github::{IssueState, IssueTracker, LabelSpec, NewIssue, ProjectRef, RepoRef};
use crate::task::{self, Task};
use crate::types::{Priority, TaskType};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write as _;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Created {
    pub id: String,
    pub issue: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Updated {
    pub id: String,
    pub issue: u64,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PushReport {
    pub created: Vec<Created>,
    pub updated: Vec<Updated>,
    pub errors: Vec<ItemError>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PullReport {
    pub updated: Vec<Updated>,
    pub errors: Vec<ItemError>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    /// Push every task instead of only the current sprint.
    pub all: bool,
    /// Only push tasks with this status.
    pub status: Option<String>,
    pub project_number: Option<u64>,
    /// Project owner; the repository owner when unset.
    pub project_owner: Option<String>,
}

// ---------------------------------------------------------------------------
// Issue construction
// ---------------------------------------------------------------------------

pub fn issue_title(task: &Task) -> String {
    format!("[{}] {}", task.id, task.title)
}

pub fn issue_body(task: &Task) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "**Type:** {}", task.task_type);
    let _ = writeln!(body, "**Priority:** {}", task.priority);
    let _ = writeln!(body, "**Points:** {}", task.points);
    let _ = writeln!(body, "**Sprint:** {}", task.sprint);
    if let Some(owner) = &task.owner {
        let _ = writeln!(body, "**Owner:** {owner}");
    }
    if let Some(branch) = &task.branch {
        let _ = writeln!(body, "**Branch:** `{branch}`");
    }
    if let Some(td) = &task.linked_td {
        let _ = writeln!(body, "**Tech debt:** {td}");
    }
    if !task.acceptance_criteria.is_empty() {
        let _ = write!(body, "\n## Acceptance Criteria\n\n");
        for c in &task.acceptance_criteria {
            let _ = writeln!(body, "- [ ] {c}");
        }
    }
    if let Some(notes) = &task.notes {
        let _ = write!(body, "\n## Notes\n\n{notes}\n");
    }
    let _ = write!(body, "\n---\n_Synced from sprint task {}_\n", task.id);
    body
}

/// Labels for a new issue: `priority:*` for critical/high, plus `type:<type>`.
pub fn issue_labels(task: &Task) -> Vec<LabelSpec> {
    let mut labels = Vec::new();
    if let Some(p) = Priority::parse(&task.priority) {
        if let Some(name) = p.label() {
            let color = match p {
                Priority::Critical => "B60205",
                _ => "D93F0B",
            };
            labels.push(LabelSpec {
                name,
                color,
                description: format!("{p} priority"),
            });
        }
    }
    let ty = TaskType::parse(&task.task_type)
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| task.task_type.trim().to_lowercase());
    if !ty.is_empty() {
        labels.push(LabelSpec {
            name: format!("type:{ty}"),
            color: "1D76DB",
            description: format!("{ty} task"),
        });
    }
    labels
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

fn check_preconditions(tracker: &dyn IssueTracker) -> Result<RepoRef> {
    let version = tracker.version()?;
    tracing::debug!(%version, "issue tracker client");
    tracker.resolve_repo()
}

pub fn push(
    tracker: &dyn IssueTracker,
    doc: &mut Document,
    opts: &PushOptions,
) -> Result<PushReport> {
    let repo = check_preconditions(tracker)?;
    let project = opts.project_number.map(|number| ProjectRef {
        number,
        owner: opts
            .project_owner
            .clone()
            .unwrap_or_else(|| repo.owner.clone()),
    });

    let mut report = PushReport::default();

    let on_board: Option<HashSet<String>> = match &project {
        Some(p) => match tracker.project_issue_urls(p) {
            Ok(urls) => Some(urls.into_iter().collect()),
            Err(e) => {
                report
                    .warnings
                    .push(format!("could not list project {} items: {e}", p.number));
                None
            }
        },
        None => None,
    };

    let current = doc.current_sprint.clone();
    let mut ensured: HashSet<String> = HashSet::new();

    for task in doc.tasks.iter_mut().filter(|t| {
        (opts.all || t.sprint == current)
            && opts.status.as_deref().map_or(true, |s| t.status == s)
    }) {
        match task.github_issue {
            None => push_new(tracker, &repo, project.as_ref(), task, &mut ensured, &mut report),
            Some(number) => {
                push_linked(tracker, &repo, task, number, &mut report);
                if let (Some(p), Some(board), Some(url)) =
                    (project.as_ref(), on_board.as_ref(), task.github_url.as_deref())
                {
                    if !board.contains(url) {
                        add_to_project(tracker, p, task, url, &mut report);
                    }
                }
            }
        }
    }

    tracing::info!(
        created = report.created.len(),
        updated = report.updated.len(),
        errors = report.errors.len(),
        "push finished"
    );
    Ok(report)
}

fn push_new(
    tracker: &dyn IssueTracker,
    repo: &RepoRef,
    project: Option<&ProjectRef>,
    task: &mut Task,
    ensured: &mut HashSet<String>,
    report: &mut PushReport,
) {
    let labels = issue_labels(task);
    for label in &labels {
        if ensured.insert(label.name.clone()) {
            if let Err(e) = tracker.create_label(repo, label) {
                tracing::warn!(label = %label.name, error = %e, "label create failed");
            }
        }
    }

    let issue = NewIssue {
        title: issue_title(task),
        body: issue_body(task),
        labels: labels.into_iter().map(|l| l.name).collect(),
    };
    let created = match tracker.create_issue(repo, &issue) {
        Ok(c) => c,
        Err(e) => {
            report.errors.push(ItemError {
                id: task.id.clone(),
                error: e.to_string(),
            });
            return;
        }
    };

    tracing::info!(task = %task.id, issue = created.number, "created issue");
    task.github_issue = Some(created.number);
    task.github_url = Some(created.url.clone());
    report.created.push(Created {
        id: task.id.clone(),
        issue: created.number,
        url: created.url.clone(),
    });

    if let Some(p) = project {
        add_to_project(tracker, p, task, &created.url, report);
    }

    if task.is_done() {
        if let Err(e) = tracker.close_issue(repo, created.number) {
            report.errors.push(ItemError {
                id: task.id.clone(),
                error: format!("created #{} but could not close it: {e}", created.number),
            });
        }
    }
}

fn push_linked(
    tracker: &dyn IssueTracker,
    repo: &RepoRef,
    task: &Task,
    number: u64,
    report: &mut PushReport,
) {
    let view = match tracker.view_issue(repo, number) {
        Ok(v) => v,
        Err(e) => {
            report.errors.push(ItemError {
                id: task.id.clone(),
                error: e.to_string(),
            });
            return;
        }
    };

    let (result, action) = match (task.is_done(), view.state) {
        (true, IssueState::Open) => (tracker.close_issue(repo, number), "closed"),
        (false, IssueState::Closed) => (tracker.reopen_issue(repo, number), "reopened"),
        _ => {
            report
                .warnings
                .push(format!("{} (#{number}) already in sync", task.id));
            return;
        }
    };

    match result {
        Ok(()) => {
            tracing::info!(task = %task.id, issue = number, action, "updated issue");
            report.updated.push(Updated {
                id: task.id.clone(),
                issue: number,
                action: action.to_string(),
            });
        }
        Err(e) => report.errors.push(ItemError {
            id: task.id.clone(),
            error: e.to_string(),
        }),
    }
}

fn add_to_project(
    tracker: &dyn IssueTracker,
    project: &ProjectRef,
    task: &Task,
    url: &str,
    report: &mut PushReport,
) {
    if let Err(e) = tracker.add_to_project(project, url) {
        report.warnings.push(format!(
            "{}: could not add to project {}: {e}",
            task.id, project.number
        ));
    }
}

// ---------------------------------------------------------------------------
// Pull
// ---------------------------------------------------------------------------

/// Closed issues mark their task done. Reopened issues are never applied
/// locally; they only produce a warning.
pub fn pull(tracker: &dyn IssueTracker, doc: &mut Document, today: NaiveDate) -> Result<PullReport> {
    let repo = check_preconditions(tracker)?;
    let mut report = PullReport::default();

    for task in doc.tasks.iter_mut() {
        let Some(number) = task.github_issue else {
            continue;
        };
        let view = match tracker.view_issue(&repo, number) {
            Ok(v) => v,
            Err(e) => {
                report.errors.push(ItemError {
                    id: task.id.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };
        match (view.state, task.is_done()) {
            (IssueState::Closed, false) => {
                task.mark_done(today);
                tracing::info!(task = %task.id, issue = number, "marked done from closed issue");
                report.updated.push(Updated {
                    id: task.id.clone(),
                    issue: number,
                    action: "marked done".to_string(),
                });
            }
            (IssueState::Open, true) => report.warnings.push(format!(
                "{} is done locally but #{number} is open; reopen it by hand if intended",
                task.id
            )),
            _ => {}
        }
    }

    tracing::info!(
        updated = report.updated.len(),
        errors = report.errors.len(),
        "pull finished"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// Accepts `12` or `#12`.
pub fn parse_issue_number(s: &str) -> Result<u64> {
    s.trim()
        .trim_start_matches('#')
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| SprintError::InvalidIssueNumber(s.to_string()))
}

/// Attach an issue to a task without contacting the tracker about the issue.
/// The URL is filled in only when the repository can be resolved.
pub fn link<'a>(
    tracker: &dyn IssueTracker,
    tasks: &'a mut [Task],
    id: &str,
    number: u64,
) -> Result<&'a Task> {
    let repo = tracker.resolve_repo().ok();
    let task = task::find_mut(tasks, id)?;
    task.github_issue = Some(number);
    task.github_url = repo.map(|r| r.issue_url(number));
    Ok(task)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{CreatedIssue, IssueView};
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct FakeTracker {
        missing: bool,
        no_remote: bool,
        fail_titles: Vec<String>,
        fail_views: Vec<u64>,
        fail_close: bool,
        fail_project: bool,
        issues: RefCell<BTreeMap<u64, IssueState>>,
        board: RefCell<Vec<String>>,
        labels: RefCell<Vec<String>>,
        next: Cell<u64>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeTracker {
        fn with_issue(self, number: u64, state: IssueState) -> Self {
            self.issues.borrow_mut().insert(number, state);
            self
        }

        fn state(&self, number: u64) -> Option<IssueState> {
            self.issues.borrow().get(&number).copied()
        }

        fn log(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }
    }

    fn repo() -> RepoRef {
        RepoRef {
            owner: "acme".into(),
            name: "widgets".into(),
        }
    }

    impl IssueTracker for FakeTracker {
        fn version(&self) -> Result<String> {
            if self.missing {
                return Err(SprintError::TrackerUnavailable);
            }
            Ok("gh version 2.0.0".into())
        }

        fn resolve_repo(&self) -> Result<RepoRef> {
            if self.no_remote {
                return Err(SprintError::NoRemote("no origin".into()));
            }
            Ok(repo())
        }

        fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<CreatedIssue> {
            self.log(format!("create {}", issue.title));
            if self.fail_titles.iter().any(|t| issue.title.contains(t.as_str())) {
                return Err(SprintError::Tracker("HTTP 502".into()));
            }
            let number = self.next.get() + 1;
            self.next.set(number);
            self.issues.borrow_mut().insert(number, IssueState::Open);
            Ok(CreatedIssue {
                number,
                url: repo.issue_url(number),
            })
        }

        fn close_issue(&self, _repo: &RepoRef, number: u64) -> Result<()> {
            self.log(format!("close {number}"));
            if self.fail_close {
                return Err(SprintError::Tracker("HTTP 403".into()));
            }
            self.issues.borrow_mut().insert(number, IssueState::Closed);
            Ok(())
        }

        fn reopen_issue(&self, _repo: &RepoRef, number: u64) -> Result<()> {
            self.log(format!("reopen {number}"));
            self.issues.borrow_mut().insert(number, IssueState::Open);
            Ok(())
        }

        fn view_issue(&self, _repo: &RepoRef, number: u64) -> Result<IssueView> {
            if self.fail_views.contains(&number) {
                return Err(SprintError::Tracker("not found".into()));
            }
            let state = self
                .state(number)
                .ok_or_else(|| SprintError::Tracker(format!("no issue {number}")))?;
            Ok(IssueView {
                state,
                title: String::new(),
            })
        }

        fn create_label(&self, _repo: &RepoRef, label: &LabelSpec) -> Result<()> {
            self.labels.borrow_mut().push(label.name.clone());
            Err(SprintError::Tracker("label exists".into()))
        }

        fn add_to_project(&self, _project: &ProjectRef, issue_url: &str) -> Result<()> {
            if self.fail_project {
                return Err(SprintError::Tracker("project not found".into()));
            }
            self.board.borrow_mut().push(issue_url.to_string());
            Ok(())
        }

        fn project_issue_urls(&self, _project: &ProjectRef) -> Result<Vec<String>> {
            Ok(self.board.borrow().clone())
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn doc_with(tasks: Vec<Task>) -> Document {
        let mut doc = Document::new("demo", day(1));
        doc.tasks = tasks;
        doc
    }

    fn task(id: &str, status: &str) -> Task {
        let mut t = Task::new(id, format!("{id} work"), "1", day(1));
        t.status = status.into();
        t
    }

    fn linked(id: &str, status: &str, issue: u64) -> Task {
        let mut t = task(id, status);
        t.github_issue = Some(issue);
        t.github_url = Some(repo().issue_url(issue));
        t
    }

    #[test]
    fn push_creates_and_links_issues() {
        let fake = FakeTracker::default();
        let mut doc = doc_with(vec![task("TASK-001", "ready")]);
        let report = push(&fake, &mut doc, &PushOptions::default()).unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].issue, 1);
        assert_eq!(doc.tasks[0].github_issue, Some(1));
        assert_eq!(
            doc.tasks[0].github_url.as_deref(),
            Some("https://github.com/acme/widgets/issues/1")
        );
        assert_eq!(fake.state(1), Some(IssueState::Open));
    }

    #[test]
    fn push_closes_new_issue_for_done_task() {
        let fake = FakeTracker::default();
        let mut doc = doc_with(vec![task("TASK-001", "done")]);
        let report = push(&fake, &mut doc, &PushOptions::default()).unwrap();
        assert_eq!(report.created.len(), 1);
        assert!(report.errors.is_empty());
        assert_eq!(fake.state(1), Some(IssueState::Closed));
    }

    #[test]
    fn push_keeps_created_issue_when_close_fails() {
        let fake = FakeTracker {
            fail_close: true,
            ..Default::default()
        };
        let mut doc = doc_with(vec![task("TASK-001", "done"), task("TASK-002", "ready")]);
        let report = push(&fake, &mut doc, &PushOptions::default()).unwrap();

        let created: Vec<&str> = report.created.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(created, vec!["TASK-001", "TASK-002"]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].id, "TASK-001");
        assert!(report.errors[0].error.contains("created #1"));
        assert!(report.warnings.is_empty());
        assert_eq!(doc.tasks[0].github_issue, Some(1));
        assert_eq!(fake.state(1), Some(IssueState::Open));
    }

    #[test]
    fn push_twice_is_idempotent() {
        let fake = FakeTracker::default();
        let mut doc = doc_with(vec![task("TASK-001", "done"), task("TASK-002", "review")]);
        push(&fake, &mut doc, &PushOptions::default()).unwrap();

        let second = push(&fake, &mut doc, &PushOptions::default()).unwrap();
        assert!(second.created.is_empty());
        assert!(second.updated.is_empty());
        assert!(second.errors.is_empty());
        assert_eq!(second.warnings.len(), 2);
    }

    #[test]
    fn push_isolates_item_failures_in_order() {
        let fake = FakeTracker {
            fail_titles: vec!["TASK-002".into()],
            ..Default::default()
        };
        let mut doc = doc_with(vec![
            task("TASK-001", "ready"),
            task("TASK-002", "ready"),
            task("TASK-003", "ready"),
        ]);
        let report = push(&fake, &mut doc, &PushOptions::default()).unwrap();

        let created: Vec<&str> = report.created.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(created, vec!["TASK-001", "TASK-003"]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].id, "TASK-002");
        assert!(doc.tasks[1].github_issue.is_none());
        assert_eq!(doc.tasks[2].github_issue, Some(2));
    }

    #[test]
    fn push_reconciles_linked_tasks() {
        let fake = FakeTracker::default()
            .with_issue(10, IssueState::Open)
            .with_issue(11, IssueState::Closed);
        let mut doc = doc_with(vec![
            linked("TASK-001", "done", 10),
            linked("TASK-002", "in_progress", 11),
        ]);
        let report = push(&fake, &mut doc, &PushOptions::default()).unwrap();

        assert_eq!(
            report.updated,
            vec![
                Updated {
                    id: "TASK-001".into(),
                    issue: 10,
                    action: "closed".into()
                },
                Updated {
                    id: "TASK-002".into(),
                    issue: 11,
                    action: "reopened".into()
                },
            ]
        );
        assert_eq!(fake.state(10), Some(IssueState::Closed));
        assert_eq!(fake.state(11), Some(IssueState::Open));
    }

    #[test]
    fn push_view_failure_is_per_item() {
        let fake = FakeTracker {
            fail_views: vec![10],
            ..Default::default()
        };
        let mut doc = doc_with(vec![linked("TASK-001", "done", 10), task("TASK-002", "ready")]);
        let report = push(&fake, &mut doc, &PushOptions::default()).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.created.len(), 1);
    }

    #[test]
    fn push_defaults_to_current_sprint() {
        let fake = FakeTracker::default();
        let mut other = task("TASK-002", "ready");
        other.sprint = "2".into();
        let mut doc = doc_with(vec![task("TASK-001", "ready"), other]);

        let report = push(&fake, &mut doc, &PushOptions::default()).unwrap();
        assert_eq!(report.created.len(), 1);
        assert!(doc.tasks[1].github_issue.is_none());

        let all = PushOptions {
            all: true,
            ..Default::default()
        };
        let report = push(&fake, &mut doc, &all).unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].id, "TASK-002");
    }

    #[test]
    fn push_status_filter() {
        let fake = FakeTracker::default();
        let mut doc = doc_with(vec![task("TASK-001", "ready"), task("TASK-002", "review")]);
        let opts = PushOptions {
            status: Some("review".into()),
            ..Default::default()
        };
        let report = push(&fake, &mut doc, &opts).unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].id, "TASK-002");
    }

    #[test]
    fn push_preconditions_abort_before_any_task() {
        let fake = FakeTracker {
            missing: true,
            ..Default::default()
        };
        let mut doc = doc_with(vec![task("TASK-001", "ready")]);
        let err = push(&fake, &mut doc, &PushOptions::default()).unwrap_err();
        assert!(matches!(err, SprintError::TrackerUnavailable));
        assert!(fake.calls.borrow().is_empty());

        let fake = FakeTracker {
            no_remote: true,
            ..Default::default()
        };
        let err = push(&fake, &mut doc, &PushOptions::default()).unwrap_err();
        assert!(matches!(err, SprintError::NoRemote(_)));
        assert!(fake.calls.borrow().is_empty());
        assert!(doc.tasks[0].github_issue.is_none());
    }

    #[test]
    fn push_label_failures_are_ignored_and_deduplicated() {
        let fake = FakeTracker::default();
        let mut a = task("TASK-001", "ready");
        a.priority = "high".into();
        let mut b = task("TASK-002", "ready");
        b.priority = "high".into();
        let mut doc = doc_with(vec![a, b]);
        let report = push(&fake, &mut doc, &PushOptions::default()).unwrap();
        assert_eq!(report.created.len(), 2);
        assert_eq!(
            *fake.labels.borrow(),
            vec!["priority:high".to_string(), "type:feature".to_string()]
        );
    }

    #[test]
    fn push_adds_to_project_board() {
        let fake = FakeTracker::default().with_issue(10, IssueState::Open);
        let mut doc = doc_with(vec![task("TASK-001", "ready"), linked("TASK-002", "ready", 10)]);
        let opts = PushOptions {
            project_number: Some(3),
            ..Default::default()
        };
        let report = push(&fake, &mut doc, &opts).unwrap();
        assert!(report.warnings.iter().all(|w| !w.contains("could not")));
        assert_eq!(
            *fake.board.borrow(),
            vec![repo().issue_url(1), repo().issue_url(10)]
        );
    }

    #[test]
    fn push_project_failure_is_a_warning() {
        let fake = FakeTracker {
            fail_project: true,
            ..Default::default()
        };
        let mut doc = doc_with(vec![task("TASK-001", "ready")]);
        let opts = PushOptions {
            project_number: Some(3),
            ..Default::default()
        };
        let report = push(&fake, &mut doc, &opts).unwrap();

        assert_eq!(report.created.len(), 1);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("TASK-001: could not add to project 3"));
        assert_eq!(doc.tasks[0].github_issue, Some(1));
        assert!(fake.board.borrow().is_empty());
    }

    #[test]
    fn pull_marks_closed_issues_done() {
        let fake = FakeTracker::default().with_issue(5, IssueState::Closed);
        let mut doc = doc_with(vec![linked("TASK-001", "in_progress", 5)]);
        let report = pull(&fake, &mut doc, day(9)).unwrap();

        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].action, "marked done");
        assert_eq!(doc.tasks[0].status, "done");
        assert_eq!(doc.tasks[0].completed_at, Some(day(9)));
    }

    #[test]
    fn pull_never_reopens() {
        let fake = FakeTracker::default().with_issue(5, IssueState::Open);
        let mut t = linked("TASK-001", "done", 5);
        t.completed_at = Some(day(2));
        let mut doc = doc_with(vec![t]);
        let report = pull(&fake, &mut doc, day(9)).unwrap();

        assert!(report.updated.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(doc.tasks[0].status, "done");
        assert_eq!(doc.tasks[0].completed_at, Some(day(2)));
    }

    #[test]
    fn pull_skips_unlinked_and_records_fetch_errors() {
        let fake = FakeTracker {
            fail_views: vec![7],
            ..Default::default()
        }
        .with_issue(8, IssueState::Closed);
        let mut doc = doc_with(vec![
            task("TASK-001", "ready"),
            linked("TASK-002", "ready", 7),
            linked("TASK-003", "review", 8),
        ]);
        let report = pull(&fake, &mut doc, day(3)).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].id, "TASK-002");
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].id, "TASK-003");
        assert_eq!(doc.tasks[0].status, "ready");
    }

    #[test]
    fn link_builds_url_when_repo_resolves() {
        let fake = FakeTracker::default();
        let mut tasks = vec![task("TASK-001", "ready")];
        let t = link(&fake, &mut tasks, "task-001", 17).unwrap();
        assert_eq!(t.github_issue, Some(17));
        assert_eq!(
            t.github_url.as_deref(),
            Some("https://github.com/acme/widgets/issues/17")
        );
        assert!(fake.calls.borrow().is_empty());
    }

    #[test]
    fn link_without_remote_keeps_number_only() {
        let fake = FakeTracker {
            no_remote: true,
            ..Default::default()
        };
        let mut tasks = vec![task("TASK-001", "ready")];
        let t = link(&fake, &mut tasks, "TASK-001", 4).unwrap();
        assert_eq!(t.github_issue, Some(4));
        assert!(t.github_url.is_none());
    }

    #[test]
    fn link_unknown_task() {
        let fake = FakeTracker::default();
        let mut tasks = vec![task("TASK-001", "ready")];
        assert!(matches!(
            link(&fake, &mut tasks, "TASK-404", 4).unwrap_err(),
            SprintError::TaskNotFound(_)
        ));
    }

    #[test]
    fn issue_numbers() {
        assert_eq!(parse_issue_number("#12").unwrap(), 12);
        assert_eq!(parse_issue_number("7").unwrap(), 7);
        assert!(parse_issue_number("0").is_err());
        assert!(parse_issue_number("abc").is_err());
    }

    #[test]
    fn body_includes_task_fields() {
        let mut t = task("TASK-001", "ready");
        t.owner = Some("sam".into());
        t.linked_td = Some("TD-002".into());
        t.acceptance_criteria = vec!["works".into(), "tested".into()];
        t.notes = Some("see design doc".into());
        let body = issue_body(&t);
        assert!(body.contains("**Type:** feature"));
        assert!(body.contains("**Owner:** sam"));
        assert!(body.contains("**Tech debt:** TD-002"));
        assert!(body.contains("- [ ] works\n- [ ] tested"));
        assert!(body.contains("## Notes\n\nsee design doc"));
        assert!(!body.contains("**Branch:**"));
    }

    #[test]
    fn labels_by_priority() {
        let mut t = task("TASK-001", "ready");
        t.priority = "critical".into();
        t.task_type = "bug".into();
        let names: Vec<String> = issue_labels(&t).into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["priority:critical", "type:bug"]);

        t.priority = "low".into();
        let names: Vec<String> = issue_labels(&t).into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["type:bug"]);
    }
}
