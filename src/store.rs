//! File-backed store for thesis projects.
//!
//! The whole dataset is one JSON snapshot in `.thesis/store.json`. Every
//! mutation runs as a transaction: take the writer lock, load the snapshot,
//! compute and apply the change in memory, then replace the file atomically.
//! An operation that fails leaves the file untouched.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{self, AuditEntry};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::lock::FileLock;
use crate::model::{
    Milestone, MilestoneId, NoteId, Priority, Project, ProjectId, ProjectNote, ProjectStatus,
    Task, TaskId, TaskStatus, WordLog,
};
use crate::progress::ProjectProgress;
use crate::report::{self, Digest};
use crate::sequencer::{Direction, ReorderRequest, SequencePlan, TaskSequencer};
use crate::storage::Storage;
use crate::streak::{self, Badge, Streaks};
use crate::templates;

pub const STORE_SCHEMA_VERSION: &str = "thesis.store.v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: String,
    /// Last identifier handed out; shared by every record kind.
    #[serde(default)]
    pub last_id: u64,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub word_logs: Vec<WordLog>,
    #[serde(default)]
    pub notes: Vec<ProjectNote>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION.to_string(),
            last_id: 0,
            projects: Vec::new(),
            milestones: Vec::new(),
            tasks: Vec::new(),
            word_logs: Vec::new(),
            notes: Vec::new(),
        }
    }
}

impl Snapshot {
    fn allocate_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn project(&self, id: ProjectId) -> Result<&Project> {
        self.projects
            .iter()
            .find(|project| project.id == id)
            .ok_or_else(|| Error::not_found("project", id))
    }

    fn project_mut(&mut self, id: ProjectId) -> Result<&mut Project> {
        self.projects
            .iter_mut()
            .find(|project| project.id == id)
            .ok_or_else(|| Error::not_found("project", id))
    }

    pub fn milestone(&self, id: MilestoneId) -> Result<&Milestone> {
        self.milestones
            .iter()
            .find(|milestone| milestone.id == id)
            .ok_or_else(|| Error::not_found("milestone", id))
    }

    pub fn task(&self, id: TaskId) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or_else(|| Error::not_found("task", id))
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| Error::not_found("task", id))
    }

    pub fn note(&self, id: NoteId) -> Result<&ProjectNote> {
        self.notes
            .iter()
            .find(|note| note.id == id)
            .ok_or_else(|| Error::not_found("note", id))
    }

    fn note_mut(&mut self, id: NoteId) -> Result<&mut ProjectNote> {
        self.notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| Error::not_found("note", id))
    }

    fn touch_project(&mut self, id: ProjectId) {
        if let Ok(project) = self.project_mut(id) {
            project.updated_at = Utc::now();
        }
    }

    fn next_milestone_order(&self, project_id: ProjectId) -> u32 {
        self.milestones
            .iter()
            .filter(|milestone| milestone.project_id == project_id)
            .map(|milestone| milestone.order)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn next_task_order(&self, milestone_id: MilestoneId) -> u32 {
        self.tasks
            .iter()
            .filter(|task| task.milestone_id == milestone_id)
            .map(|task| task.order)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Recompute `completed` for every milestone of a project: complete when
    /// it has tasks and all of them are done. `completed_at` is stamped on
    /// the transition and cleared when the milestone reopens.
    fn sync_milestones(&mut self, project_id: ProjectId) {
        let now = Utc::now();
        for milestone in self
            .milestones
            .iter_mut()
            .filter(|milestone| milestone.project_id == project_id)
        {
            let mut tasks = self
                .tasks
                .iter()
                .filter(|task| task.milestone_id == milestone.id)
                .peekable();
            let completed = tasks.peek().is_some() && tasks.all(|task| task.status.is_done());
            if completed == milestone.completed {
                continue;
            }
            milestone.completed = completed;
            milestone.completed_at = completed.then_some(now);
            tracing::debug!(milestone_id = milestone.id, completed, "milestone completion changed");
        }
    }

    fn insert_milestone(&mut self, project_id: ProjectId, name: &str, template_key: Option<&str>) -> Milestone {
        let milestone = Milestone {
            id: self.allocate_id(),
            project_id,
            name: name.to_string(),
            order: self.next_milestone_order(project_id),
            template_key: template_key.map(str::to_string),
            completed: false,
            completed_at: None,
        };
        self.milestones.push(milestone.clone());
        milestone
    }

    /// Everything belonging to one project, in display order.
    pub fn project_view(&self, project_id: ProjectId) -> Result<ProjectView> {
        let project = self.project(project_id)?.clone();
        let mut milestones: Vec<Milestone> = self
            .milestones
            .iter()
            .filter(|milestone| milestone.project_id == project_id)
            .cloned()
            .collect();
        milestones.sort_by_key(|milestone| (milestone.order, milestone.id));
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| task.project_id == project_id)
            .cloned()
            .collect();
        let milestone_rank = |id: MilestoneId| {
            milestones
                .iter()
                .position(|milestone| milestone.id == id)
                .unwrap_or(usize::MAX)
        };
        tasks.sort_by_key(|task| (milestone_rank(task.milestone_id), task.order, task.id));
        let mut word_logs: Vec<WordLog> = self
            .word_logs
            .iter()
            .filter(|log| log.project_id == project_id)
            .cloned()
            .collect();
        word_logs.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(ProjectView {
            project,
            milestones,
            tasks,
            word_logs,
        })
    }

    /// Notes of one project, newest first.
    pub fn project_notes(&self, project_id: ProjectId) -> Vec<ProjectNote> {
        let mut notes: Vec<ProjectNote> = self
            .notes
            .iter()
            .filter(|note| note.project_id == project_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        notes
    }
}

/// A project with its milestones, tasks and word logs (newest log first).
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub project: Project,
    pub milestones: Vec<Milestone>,
    pub tasks: Vec<Task>,
    pub word_logs: Vec<WordLog>,
}

impl ProjectView {
    pub fn lifetime_words(&self) -> u64 {
        self.word_logs.iter().map(|log| u64::from(log.words)).sum()
    }

    pub fn milestone_name(&self, id: MilestoneId) -> Option<&str> {
        self.milestones
            .iter()
            .find(|milestone| milestone.id == id)
            .map(|milestone| milestone.name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub field_of_study: Option<String>,
    pub expected_defense_date: Option<NaiveDate>,
    pub apply_templates: bool,
}

impl NewProject {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            field_of_study: None,
            expected_defense_date: None,
            apply_templates: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub milestone_id: MilestoneId,
    pub title: String,
    pub description: Option<String>,
    pub word_target: u32,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
}

impl NewTask {
    pub fn new(milestone_id: MilestoneId, title: impl Into<String>) -> Self {
        Self {
            milestone_id,
            title: title.into(),
            description: None,
            word_target: 0,
            due_date: None,
            priority: Priority::Med,
        }
    }
}

/// Field changes for an existing task. `None` leaves a field as it is;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewWordLog {
    pub project_id: ProjectId,
    pub task_id: Option<TaskId>,
    pub date: NaiveDate,
    pub words: u32,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WritingStats {
    pub streaks: Streaks,
    pub badges: Vec<Badge>,
    pub lifetime_words: u64,
    pub active_days: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_logged: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ThesisStore {
    storage: Storage,
    config: Config,
}

impl ThesisStore {
    pub fn new(storage: Storage, config: Config) -> Self {
        Self { storage, config }
    }

    /// Open an initialized store rooted at `root`
    pub fn open(root: &Path) -> Result<Self> {
        let storage = Storage::new(root);
        if !storage.is_initialized() {
            return Err(Error::NotInitialized(root.to_path_buf()));
        }
        let config = Config::load_from_root(root);
        Ok(Self::new(storage, config))
    }

    /// Create the store directory, an empty snapshot and a default config.
    /// Returns `false` when everything already existed.
    pub fn init(root: &Path) -> Result<(Self, bool)> {
        let storage = Storage::new(root);
        storage.init()?;
        let mut created = false;
        if !storage.config_file().exists() {
            Config::default().save(&storage.config_file())?;
            created = true;
        }
        if !storage.is_initialized() {
            storage.write_json(&storage.store_file(), &Snapshot::default())?;
            audit::append(&storage, &AuditEntry::new("store.init", None))?;
            created = true;
        }
        let config = Config::load_from_root(root);
        tracing::info!(root = %root.display(), created, "store ready");
        Ok((Self::new(storage, config), created))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn load(&self) -> Result<Snapshot> {
        let snapshot: Snapshot = self.storage.read_json(&self.storage.store_file())?;
        if snapshot.schema_version != STORE_SCHEMA_VERSION {
            return Err(Error::OperationFailed(format!(
                "unsupported store schema '{}'",
                snapshot.schema_version
            )));
        }
        Ok(snapshot)
    }

    /// Run `op` against the snapshot under the writer lock. The snapshot is
    /// written only when `op` succeeds. Once it is written the operation has
    /// happened: audit entries are appended afterwards and a failed append is
    /// logged, never returned.
    fn transact<T>(
        &self,
        op: impl FnOnce(&mut Snapshot, &mut Vec<AuditEntry>) -> Result<T>,
    ) -> Result<T> {
        let _lock = FileLock::acquire(
            self.storage.store_lock_file(),
            self.config.storage.lock_timeout_ms,
        )?;
        let mut snapshot = self.load()?;
        let mut entries = Vec::new();
        let value = op(&mut snapshot, &mut entries)?;
        self.storage
            .write_json(&self.storage.store_file(), &snapshot)?;
        for entry in &entries {
            if let Err(err) = audit::append(&self.storage, entry) {
                tracing::warn!(action = %entry.action, error = %err, "audit append failed");
            }
        }
        tracing::debug!(changes = entries.len(), "store committed");
        Ok(value)
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub fn create_project(&self, request: NewProject) -> Result<Project> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::InvalidArgument("project title cannot be empty".to_string()));
        }
        self.transact(|snapshot, audit| {
            let now = Utc::now();
            let project = Project {
                id: snapshot.allocate_id(),
                title,
                field_of_study: request.field_of_study.clone(),
                expected_defense_date: request.expected_defense_date,
                status: ProjectStatus::Active,
                created_at: now,
                updated_at: now,
            };
            snapshot.projects.push(project.clone());

            let mut templated = 0usize;
            if request.apply_templates {
                for template in templates::core_milestones() {
                    let milestone =
                        snapshot.insert_milestone(project.id, template.name, Some(template.key));
                    for (index, task_template) in template.tasks.iter().enumerate() {
                        let mut task = Task::new(
                            snapshot.allocate_id(),
                            project.id,
                            milestone.id,
                            task_template.title.clone(),
                            index as u32 + 1,
                        );
                        task.word_target = task_template.word_target;
                        snapshot.tasks.push(task);
                        templated += 1;
                    }
                }
            }

            tracing::info!(project_id = project.id, templated, "project created");
            audit.push(
                AuditEntry::new("project.create", Some(project.id)).with_payload(
                    serde_json::json!({ "title": project.title, "templated_tasks": templated }),
                ),
            );
            Ok(project)
        })
    }

    pub fn projects(&self) -> Result<Vec<Project>> {
        Ok(self.load()?.projects)
    }

    /// The given project, or the only active one when none is given
    pub fn resolve_project(&self, project_id: Option<ProjectId>) -> Result<Project> {
        let snapshot = self.load()?;
        if let Some(id) = project_id {
            return Ok(snapshot.project(id)?.clone());
        }
        let active: Vec<&Project> = snapshot
            .projects
            .iter()
            .filter(|project| project.status == ProjectStatus::Active)
            .collect();
        match active.as_slice() {
            [] => Err(Error::NoActiveProject),
            [only] => Ok((*only).clone()),
            many => Err(Error::AmbiguousProject(
                many.iter()
                    .map(|project| project.id.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }

    pub fn set_project_status(&self, project_id: ProjectId, status: ProjectStatus) -> Result<Project> {
        self.transact(|snapshot, audit| {
            let project = snapshot.project_mut(project_id)?;
            project.status = status;
            project.updated_at = Utc::now();
            let project = project.clone();
            audit.push(
                AuditEntry::new("project.status", Some(project_id))
                    .with_payload(serde_json::json!({ "status": status })),
            );
            Ok(project)
        })
    }

    pub fn project_view(&self, project_id: ProjectId) -> Result<ProjectView> {
        self.load()?.project_view(project_id)
    }

    // =========================================================================
    // Milestones and tasks
    // =========================================================================

    pub fn add_milestone(&self, project_id: ProjectId, name: &str) -> Result<Milestone> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument("milestone name cannot be empty".to_string()));
        }
        self.transact(|snapshot, audit| {
            snapshot.project(project_id)?;
            let milestone = snapshot.insert_milestone(project_id, name, None);
            snapshot.touch_project(project_id);
            audit.push(
                AuditEntry::new("milestone.create", Some(project_id)).with_payload(
                    serde_json::json!({ "milestone_id": milestone.id, "name": milestone.name }),
                ),
            );
            Ok(milestone)
        })
    }

    pub fn add_task(&self, request: NewTask) -> Result<Task> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::InvalidArgument("task title cannot be empty".to_string()));
        }
        self.transact(|snapshot, audit| {
            let project_id = snapshot.milestone(request.milestone_id)?.project_id;
            let order = snapshot.next_task_order(request.milestone_id);
            let mut task = Task::new(
                snapshot.allocate_id(),
                project_id,
                request.milestone_id,
                title,
                order,
            );
            task.description = request.description.clone();
            task.word_target = request.word_target;
            task.due_date = request.due_date;
            task.priority = request.priority;
            snapshot.tasks.push(task.clone());
            snapshot.sync_milestones(project_id);
            snapshot.touch_project(project_id);
            audit.push(
                AuditEntry::new("task.create", Some(project_id)).with_payload(serde_json::json!({
                    "task_id": task.id,
                    "milestone_id": task.milestone_id,
                    "order": task.order,
                })),
            );
            Ok(task)
        })
    }

    pub fn set_task_status(&self, task_id: TaskId, status: TaskStatus) -> Result<Task> {
        self.transact(|snapshot, audit| {
            let task = snapshot.task_mut(task_id)?;
            let previous = task.status;
            task.status = status;
            task.completed_at = match status {
                TaskStatus::Done if previous.is_done() => task.completed_at,
                TaskStatus::Done => Some(Utc::now()),
                _ => None,
            };
            let task = task.clone();
            snapshot.sync_milestones(task.project_id);
            snapshot.touch_project(task.project_id);
            audit.push(
                AuditEntry::new("task.status", Some(task.project_id)).with_payload(
                    serde_json::json!({ "task_id": task.id, "from": previous, "to": status }),
                ),
            );
            Ok(task)
        })
    }

    pub fn set_word_target(&self, task_id: TaskId, word_target: u32) -> Result<Task> {
        self.transact(|snapshot, audit| {
            let task = snapshot.task_mut(task_id)?;
            task.word_target = word_target;
            let task = task.clone();
            snapshot.touch_project(task.project_id);
            audit.push(
                AuditEntry::new("task.target", Some(task.project_id)).with_payload(
                    serde_json::json!({ "task_id": task.id, "word_target": word_target }),
                ),
            );
            Ok(task)
        })
    }

    /// Change a task's title, description, priority or due date. Order,
    /// milestone and status have their own operations.
    pub fn update_task(&self, task_id: TaskId, update: TaskUpdate) -> Result<Task> {
        if update.is_empty() {
            return Err(Error::InvalidArgument("nothing to update".to_string()));
        }
        let title = match &update.title {
            Some(title) if title.trim().is_empty() => {
                return Err(Error::InvalidArgument("task title cannot be empty".to_string()));
            }
            Some(title) => Some(title.trim().to_string()),
            None => None,
        };
        self.transact(|snapshot, audit| {
            let task = snapshot.task_mut(task_id)?;
            let mut changed = Vec::new();
            if let Some(title) = title {
                task.title = title;
                changed.push("title");
            }
            if let Some(description) = update.description {
                task.description = description.filter(|text| !text.trim().is_empty());
                changed.push("description");
            }
            if let Some(priority) = update.priority {
                task.priority = priority;
                changed.push("priority");
            }
            if let Some(due_date) = update.due_date {
                task.due_date = due_date;
                changed.push("due_date");
            }
            let task = task.clone();
            snapshot.touch_project(task.project_id);
            tracing::info!(task_id, ?changed, "task updated");
            audit.push(
                AuditEntry::new("task.update", Some(task.project_id)).with_payload(
                    serde_json::json!({ "task_id": task.id, "fields": changed }),
                ),
            );
            Ok(task)
        })
    }

    /// Remove a task, close the gap it leaves and keep its word logs as
    /// project-level logs. A log that would collide with an existing
    /// project-level log for the same day is folded into it.
    pub fn delete_task(&self, task_id: TaskId) -> Result<Task> {
        self.transact(|snapshot, audit| {
            let task = snapshot.task(task_id)?.clone();
            snapshot.tasks.retain(|candidate| candidate.id != task_id);

            let mut detached = 0usize;
            let mut index = 0;
            while index < snapshot.word_logs.len() {
                if snapshot.word_logs[index].task_id != Some(task_id) {
                    index += 1;
                    continue;
                }
                let log = snapshot.word_logs[index].clone();
                let existing = snapshot.word_logs.iter().position(|other| {
                    other.project_id == log.project_id
                        && other.date == log.date
                        && other.task_id.is_none()
                });
                match existing {
                    Some(target) => {
                        let merged = snapshot.word_logs[target]
                            .words
                            .checked_add(log.words)
                            .ok_or_else(|| {
                                Error::OperationFailed(format!(
                                    "merging word log {} into {} overflows the daily word count",
                                    log.id, snapshot.word_logs[target].id
                                ))
                            })?;
                        snapshot.word_logs[target].words = merged;
                        snapshot.word_logs.remove(index);
                    }
                    None => {
                        snapshot.word_logs[index].task_id = None;
                        index += 1;
                    }
                }
                detached += 1;
            }

            let plan = TaskSequencer::new(&snapshot.tasks, &snapshot.milestones)
                .renumber(task.milestone_id);
            plan.apply(&mut snapshot.tasks);
            snapshot.sync_milestones(task.project_id);
            snapshot.touch_project(task.project_id);

            tracing::info!(task_id, detached, renumbered = plan.len(), "task deleted");
            audit.push(
                AuditEntry::new("task.delete", Some(task.project_id)).with_payload(
                    serde_json::json!({ "task_id": task_id, "detached_logs": detached }),
                ),
            );
            Ok(task)
        })
    }

    pub fn move_task(&self, task_id: TaskId, direction: Direction) -> Result<SequencePlan> {
        self.transact(|snapshot, audit| {
            let plan = TaskSequencer::new(&snapshot.tasks, &snapshot.milestones)
                .move_adjacent(task_id, direction)?;
            let project_id = snapshot.task(task_id)?.project_id;
            Self::commit_plan(snapshot, audit, &plan, project_id, "task.move")?;
            Ok(plan)
        })
    }

    pub fn reorder_task(&self, request: ReorderRequest) -> Result<SequencePlan> {
        self.transact(|snapshot, audit| {
            let plan = TaskSequencer::new(&snapshot.tasks, &snapshot.milestones).reorder(request)?;
            let project_id = snapshot.task(request.task_id)?.project_id;
            Self::commit_plan(snapshot, audit, &plan, project_id, "task.reorder")?;
            Ok(plan)
        })
    }

    fn commit_plan(
        snapshot: &mut Snapshot,
        audit: &mut Vec<AuditEntry>,
        plan: &SequencePlan,
        project_id: ProjectId,
        action: &str,
    ) -> Result<()> {
        tracing::debug!(action, placements = plan.len(), "applying sequence plan");
        if plan.is_empty() {
            return Ok(());
        }
        let touched = plan.apply(&mut snapshot.tasks);
        if touched != plan.len() {
            return Err(Error::OperationFailed(format!(
                "sequence plan touched {touched} of {} tasks",
                plan.len()
            )));
        }
        snapshot.sync_milestones(project_id);
        snapshot.touch_project(project_id);
        audit.push(
            AuditEntry::new(action, Some(project_id))
                .with_payload(serde_json::json!({ "placements": plan.placements() })),
        );
        Ok(())
    }

    // =========================================================================
    // Word logs
    // =========================================================================

    /// Record words written. At most one log per (project, date, task).
    pub fn log_words(&self, request: NewWordLog) -> Result<WordLog> {
        self.transact(|snapshot, audit| {
            snapshot.project(request.project_id)?;
            if let Some(task_id) = request.task_id {
                let task = snapshot.task(task_id)?;
                if task.project_id != request.project_id {
                    return Err(Error::InvalidReference(format!(
                        "task {task_id} belongs to project {}, not {}",
                        task.project_id, request.project_id
                    )));
                }
            }
            let duplicate = snapshot.word_logs.iter().any(|log| {
                log.project_id == request.project_id
                    && log.date == request.date
                    && log.task_id == request.task_id
            });
            if duplicate {
                return Err(Error::DuplicateWordLog {
                    project_id: request.project_id,
                    date: request.date,
                    task: request
                        .task_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "none".to_string()),
                });
            }

            let log = WordLog {
                id: snapshot.allocate_id(),
                project_id: request.project_id,
                task_id: request.task_id,
                date: request.date,
                words: request.words,
                note: request.note.clone(),
            };
            snapshot.word_logs.push(log.clone());
            snapshot.touch_project(request.project_id);
            audit.push(
                AuditEntry::new("words.log", Some(request.project_id)).with_payload(
                    serde_json::json!({ "log_id": log.id, "date": log.date, "words": log.words }),
                ),
            );
            Ok(log)
        })
    }

    // =========================================================================
    // Notes
    // =========================================================================

    pub fn add_note(&self, project_id: ProjectId, title: &str, body: &str) -> Result<ProjectNote> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidArgument("note title cannot be empty".to_string()));
        }
        self.transact(|snapshot, audit| {
            snapshot.project(project_id)?;
            let note = ProjectNote {
                id: snapshot.allocate_id(),
                project_id,
                title: title.to_string(),
                body: body.to_string(),
                created_at: Utc::now(),
                updated_at: None,
            };
            snapshot.notes.push(note.clone());
            snapshot.touch_project(project_id);
            audit.push(
                AuditEntry::new("note.create", Some(project_id))
                    .with_payload(serde_json::json!({ "note_id": note.id, "title": note.title })),
            );
            Ok(note)
        })
    }

    pub fn update_note(&self, note_id: NoteId, update: NoteUpdate) -> Result<ProjectNote> {
        if update.title.is_none() && update.body.is_none() {
            return Err(Error::InvalidArgument("nothing to update".to_string()));
        }
        if update.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(Error::InvalidArgument("note title cannot be empty".to_string()));
        }
        self.transact(|snapshot, audit| {
            let note = snapshot.note_mut(note_id)?;
            if let Some(title) = update.title {
                note.title = title.trim().to_string();
            }
            if let Some(body) = update.body {
                note.body = body;
            }
            note.updated_at = Some(Utc::now());
            let note = note.clone();
            snapshot.touch_project(note.project_id);
            audit.push(
                AuditEntry::new("note.update", Some(note.project_id))
                    .with_payload(serde_json::json!({ "note_id": note.id })),
            );
            Ok(note)
        })
    }

    pub fn delete_note(&self, note_id: NoteId) -> Result<ProjectNote> {
        self.transact(|snapshot, audit| {
            let note = snapshot.note(note_id)?.clone();
            snapshot.notes.retain(|candidate| candidate.id != note_id);
            snapshot.touch_project(note.project_id);
            audit.push(
                AuditEntry::new("note.delete", Some(note.project_id))
                    .with_payload(serde_json::json!({ "note_id": note.id })),
            );
            Ok(note)
        })
    }

    pub fn notes(&self, project_id: ProjectId) -> Result<Vec<ProjectNote>> {
        let snapshot = self.load()?;
        snapshot.project(project_id)?;
        Ok(snapshot.project_notes(project_id))
    }

    // =========================================================================
    // Read models
    // =========================================================================

    pub fn progress(&self, project_id: ProjectId) -> Result<ProjectProgress> {
        let view = self.project_view(project_id)?;
        Ok(self
            .config
            .progress
            .aggregator()
            .summarize(&view.milestones, &view.tasks, &view.word_logs))
    }

    pub fn writing_stats(&self, project_id: ProjectId, today: NaiveDate) -> Result<WritingStats> {
        let view = self.project_view(project_id)?;
        Ok(writing_stats(&view, today))
    }

    /// Digest for an active project. Archived projects get none.
    pub fn digest(&self, project_id: ProjectId, today: NaiveDate) -> Result<Digest> {
        let view = self.project_view(project_id)?;
        if view.project.status != ProjectStatus::Active {
            return Err(Error::InvalidArgument(format!(
                "project {project_id} is {}; digests cover active projects only",
                view.project.status
            )));
        }
        Ok(report::digest(
            &view,
            &self.config.progress.aggregator(),
            &self.config.digest,
            today,
        ))
    }

    pub fn audit_log(
        &self,
        project_id: Option<ProjectId>,
        limit: Option<usize>,
    ) -> Result<Vec<AuditEntry>> {
        audit::recent(&self.storage, project_id, limit)
    }
}

pub fn writing_stats(view: &ProjectView, today: NaiveDate) -> WritingStats {
    let dates = streak::active_dates(&view.word_logs);
    let streaks = streak::compute_streaks(&dates, today);
    let lifetime_words = view.lifetime_words();
    WritingStats {
        streaks,
        badges: streak::compute_badges(streaks.current, lifetime_words),
        lifetime_words,
        active_days: dates.len(),
        last_logged: dates.last().copied(),
    }
}
