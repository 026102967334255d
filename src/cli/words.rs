//! thesis words command implementations.

use crate::cli::{date_or_today, Globals};
use crate::error::Result;
use crate::model::{ProjectId, TaskId, WordLog};
use crate::output::{emit_success, HumanOutput};
use crate::store::NewWordLog;

pub struct LogOptions {
    pub words: u32,
    pub project: Option<ProjectId>,
    pub task: Option<TaskId>,
    pub date: Option<String>,
    pub note: Option<String>,
}

pub fn run_log(globals: &Globals, options: LogOptions) -> Result<()> {
    let store = globals.open_store()?;
    let date = date_or_today(options.date.as_deref())?;
    // A task pins its own project unless one was given explicitly.
    let project_id = match (options.project, options.task) {
        (Some(project), _) => project,
        (None, Some(task)) => store.load()?.task(task)?.project_id,
        (None, None) => store.resolve_project(None)?.id,
    };

    let log = store.log_words(NewWordLog {
        project_id,
        task_id: options.task,
        date,
        words: options.words,
        note: options.note,
    })?;
    let stats = store.writing_stats(project_id, crate::cli::today())?;

    let mut human = HumanOutput::new(format!("thesis words log: {} words", log.words));
    human.push_summary("date", log.date.to_string());
    human.push_summary("project", log.project_id.to_string());
    if let Some(task) = log.task_id {
        human.push_summary("task", task.to_string());
    }
    human.push_summary("current streak", stats.streaks.current.to_string());
    human.push_summary("lifetime words", stats.lifetime_words.to_string());

    emit_success(globals.output(), "words log", &log, Some(&human))
}

pub fn run_list(globals: &Globals, project: Option<ProjectId>, limit: Option<usize>) -> Result<()> {
    let store = globals.open_store()?;
    let project = store.resolve_project(project)?;
    let mut logs: Vec<WordLog> = store.project_view(project.id)?.word_logs;
    if let Some(limit) = limit {
        logs.truncate(limit);
    }

    let mut human = HumanOutput::new(format!(
        "thesis words list: {} ({} log(s))",
        project.title,
        logs.len()
    ));
    for log in &logs {
        let task = log
            .task_id
            .map(|id| format!(" task #{id}"))
            .unwrap_or_default();
        let note = log
            .note
            .as_deref()
            .map(|note| format!(" - {note}"))
            .unwrap_or_default();
        human.push_detail(format!("{} {} words{}{}", log.date, log.words, task, note));
    }

    emit_success(globals.output(), "words list", &logs, Some(&human))
}
