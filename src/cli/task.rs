//! thesis task command implementations.

use serde::Serialize;

use crate::cli::{parse_optional_date, Globals};
use crate::error::Result;
use crate::model::{MilestoneId, Priority, ProjectId, Task, TaskId, TaskStatus};
use crate::output::{emit_success, HumanOutput};
use crate::progress::WordTotals;
use crate::sequencer::{Direction, DropPosition, ReorderRequest, SequencePlan, TaskSequencer};
use crate::store::{TaskUpdate, ThesisStore};

pub struct AddOptions {
    pub title: String,
    pub milestone: MilestoneId,
    pub target: u32,
    pub due: Option<String>,
    pub priority: String,
    pub description: Option<String>,
}

pub struct ListOptions {
    pub project: Option<ProjectId>,
    pub milestone: Option<MilestoneId>,
    pub status: Option<String>,
}

pub struct EditOptions {
    pub id: TaskId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
}

pub struct ReorderOptions {
    pub id: TaskId,
    pub after: Option<TaskId>,
    pub milestone: Option<MilestoneId>,
    pub position: String,
}

pub fn run_add(globals: &Globals, options: AddOptions) -> Result<()> {
    let store = globals.open_store()?;
    let mut request = crate::store::NewTask::new(options.milestone, options.title);
    request.word_target = options.target;
    request.due_date = parse_optional_date(options.due.as_deref())?;
    request.priority = options.priority.parse::<Priority>()?;
    request.description = options.description;
    let task = store.add_task(request)?;

    let mut human = HumanOutput::new(format!("thesis task add: {}", task.title));
    push_task_summary(&mut human, &task);
    human.push_next_step(format!("thesis task status {} doing", task.id));

    emit_success(globals.output(), "task add", &task, Some(&human))
}

#[derive(Serialize)]
struct TaskRow {
    #[serde(flatten)]
    task: Task,
    milestone: String,
    words: u64,
    combined_percent: u32,
    can_move_up: bool,
    can_move_down: bool,
}

pub fn run_list(globals: &Globals, options: ListOptions) -> Result<()> {
    let store = globals.open_store()?;
    let snapshot = store.load()?;
    let project_id = match (options.project, options.milestone) {
        (Some(project), _) => project,
        (None, Some(milestone)) => snapshot.milestone(milestone)?.project_id,
        (None, None) => store.resolve_project(None)?.id,
    };
    let status = options
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()?;

    let view = snapshot.project_view(project_id)?;
    let aggregator = store.config().progress.aggregator();
    let totals = WordTotals::from_logs(&view.word_logs);
    let sequencer = TaskSequencer::new(&view.tasks, &view.milestones);

    let mut rows = Vec::new();
    for task in &view.tasks {
        if options.milestone.is_some_and(|id| task.milestone_id != id) {
            continue;
        }
        if status.is_some_and(|status| task.status != status) {
            continue;
        }
        rows.push(TaskRow {
            task: task.clone(),
            milestone: view
                .milestone_name(task.milestone_id)
                .unwrap_or_default()
                .to_string(),
            words: totals.words_for(task.id),
            combined_percent: aggregator.combined_percent(task, &totals),
            can_move_up: sequencer.can_move_up(task.id)?,
            can_move_down: sequencer.can_move_down(task.id)?,
        });
    }

    let mut human = HumanOutput::new(format!(
        "thesis task list: {} ({} task(s))",
        view.project.title,
        rows.len()
    ));
    for row in &rows {
        let target = if row.task.word_target > 0 {
            format!(", {}/{} words", row.words, row.task.word_target)
        } else {
            String::new()
        };
        human.push_detail(format!(
            "[{}] {}.{} #{} {} ({}, {}%{})",
            row.task.status,
            row.milestone,
            row.task.order,
            row.task.id,
            row.task.title,
            row.task.priority,
            row.combined_percent,
            target
        ));
    }

    emit_success(globals.output(), "task list", &rows, Some(&human))
}

pub fn run_status(globals: &Globals, id: TaskId, status: &str) -> Result<()> {
    let store = globals.open_store()?;
    let status = status.parse::<TaskStatus>()?;
    let task = store.set_task_status(id, status)?;

    let mut human = HumanOutput::new(format!("thesis task status: {}", task.title));
    push_task_summary(&mut human, &task);

    emit_success(globals.output(), "task status", &task, Some(&human))
}

pub fn run_target(globals: &Globals, id: TaskId, words: u32) -> Result<()> {
    let store = globals.open_store()?;
    let task = store.set_word_target(id, words)?;

    let mut human = HumanOutput::new(format!("thesis task target: {}", task.title));
    push_task_summary(&mut human, &task);
    if words == 0 {
        human.push_warning("word target 0 disables effort tracking for this task");
    }

    emit_success(globals.output(), "task target", &task, Some(&human))
}

pub fn run_edit(globals: &Globals, options: EditOptions) -> Result<()> {
    let store = globals.open_store()?;
    let due_date = if options.clear_due {
        Some(None)
    } else {
        parse_optional_date(options.due.as_deref())?.map(Some)
    };
    let update = TaskUpdate {
        title: options.title,
        description: options.description.map(Some),
        priority: options
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?,
        due_date,
    };
    let task = store.update_task(options.id, update)?;

    let mut human = HumanOutput::new(format!("thesis task edit: {}", task.title));
    push_task_summary(&mut human, &task);
    human.push_summary("priority", task.priority.to_string());

    emit_success(globals.output(), "task edit", &task, Some(&human))
}

pub fn run_move(globals: &Globals, id: TaskId, direction: &str) -> Result<()> {
    let store = globals.open_store()?;
    let direction = direction.parse::<Direction>()?;
    let plan = store.move_task(id, direction)?;
    emit_plan(globals, &store, "task move", id, &plan)
}

pub fn run_reorder(globals: &Globals, options: ReorderOptions) -> Result<()> {
    let store = globals.open_store()?;
    let mut request = ReorderRequest::new(options.id).at(DropPosition::parse(&options.position));
    if let Some(after) = options.after {
        request = request.after(after);
    }
    if let Some(milestone) = options.milestone {
        request = request.into_milestone(milestone);
    }
    let plan = store.reorder_task(request)?;
    emit_plan(globals, &store, "task reorder", options.id, &plan)
}

pub fn run_rm(globals: &Globals, id: TaskId) -> Result<()> {
    let store = globals.open_store()?;
    let task = store.delete_task(id)?;

    let mut human = HumanOutput::new(format!("thesis task rm: {}", task.title));
    human.push_summary("id", task.id.to_string());
    human.push_summary("milestone", task.milestone_id.to_string());

    emit_success(globals.output(), "task rm", &task, Some(&human))
}

#[derive(Serialize)]
struct PlanReport<'a> {
    task: Task,
    changed: &'a SequencePlan,
}

fn emit_plan(
    globals: &Globals,
    store: &ThesisStore,
    command: &str,
    id: TaskId,
    plan: &SequencePlan,
) -> Result<()> {
    let task = store.load()?.task(id)?.clone();

    let header = if plan.is_empty() {
        format!("thesis {command}: no change")
    } else {
        format!("thesis {command}: {}", task.title)
    };
    let mut human = HumanOutput::new(header);
    push_task_summary(&mut human, &task);
    for placement in plan.placements() {
        human.push_detail(format!(
            "#{} -> milestone {} position {}",
            placement.task_id, placement.milestone_id, placement.order
        ));
    }

    let report = PlanReport {
        task,
        changed: plan,
    };
    emit_success(globals.output(), command, &report, Some(&human))
}

fn push_task_summary(human: &mut HumanOutput, task: &Task) {
    human.push_summary("id", task.id.to_string());
    human.push_summary("milestone", task.milestone_id.to_string());
    human.push_summary("order", task.order.to_string());
    human.push_summary("status", task.status.to_string());
    if task.word_target > 0 {
        human.push_summary("target", task.word_target.to_string());
    }
    if let Some(due) = task.due_date {
        human.push_summary("due", due.to_string());
    }
}
