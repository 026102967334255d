//! thesis project command implementations.

use serde::Serialize;

use crate::cli::{parse_optional_date, Globals};
use crate::error::Result;
use crate::model::{Project, ProjectId, ProjectStatus};
use crate::output::{emit_success, HumanOutput};
use crate::progress::ProjectProgress;
use crate::report::{self, ProjectSummary};
use crate::store::{NewProject, ProjectView};

pub struct NewOptions {
    pub title: String,
    pub field: Option<String>,
    pub defense: Option<String>,
    pub templates: bool,
}

pub fn run_new(globals: &Globals, options: NewOptions) -> Result<()> {
    let store = globals.open_store()?;
    let request = NewProject {
        title: options.title,
        field_of_study: options.field,
        expected_defense_date: parse_optional_date(options.defense.as_deref())?,
        apply_templates: options.templates,
    };
    let project = store.create_project(request)?;
    let view = store.project_view(project.id)?;

    let mut human = HumanOutput::new(format!("thesis project new: {}", project.title));
    human.push_summary("id", project.id.to_string());
    human.push_summary("milestones", view.milestones.len().to_string());
    human.push_summary("tasks", view.tasks.len().to_string());
    if view.milestones.is_empty() {
        human.push_next_step(format!(
            "thesis milestone add \"<name>\" --project {}",
            project.id
        ));
    } else {
        human.push_next_step(format!("thesis task list --project {}", project.id));
    }

    emit_success(globals.output(), "project new", &view, Some(&human))
}

pub fn run_list(globals: &Globals, include_archived: bool) -> Result<()> {
    let store = globals.open_store()?;
    let aggregator = store.config().progress.aggregator();
    let snapshot = store.load()?;

    let mut summaries: Vec<ProjectSummary> = Vec::new();
    for project in &snapshot.projects {
        if !include_archived && project.status == ProjectStatus::Archived {
            continue;
        }
        let view = snapshot.project_view(project.id)?;
        summaries.push(report::summary(&view, &aggregator));
    }

    let mut human = HumanOutput::new(format!("thesis project list: {} project(s)", summaries.len()));
    for summary in &summaries {
        human.push_detail(format!(
            "#{} {} [{}] {}% ({}/{} done, {} words)",
            summary.project_id,
            summary.title,
            summary.status,
            summary.percent,
            summary.done_tasks,
            summary.total_tasks,
            summary.lifetime_words
        ));
    }
    if summaries.is_empty() {
        human.push_next_step("thesis project new \"<title>\" --templates");
    }

    emit_success(globals.output(), "project list", &summaries, Some(&human))
}

#[derive(Serialize)]
struct ShowReport {
    #[serde(flatten)]
    view: ProjectView,
    progress: ProjectProgress,
}

pub fn run_show(globals: &Globals, id: Option<ProjectId>) -> Result<()> {
    let store = globals.open_store()?;
    let project = store.resolve_project(id)?;
    let view = store.project_view(project.id)?;
    let progress = store
        .config()
        .progress
        .aggregator()
        .summarize(&view.milestones, &view.tasks, &view.word_logs);

    let mut human = HumanOutput::new(format!("thesis project show: {}", project.title));
    push_project_summary(&mut human, &project);
    human.push_summary("progress", format!("{}%", progress.percent));
    human.push_summary(
        "tasks",
        format!("{}/{} done", progress.done_tasks, progress.total_tasks),
    );
    human.push_summary("words", view.lifetime_words().to_string());
    for milestone in &progress.milestones {
        human.push_detail(format!(
            "{} {}% ({}/{})",
            milestone.name, milestone.percent, milestone.done, milestone.total
        ));
    }

    let report = ShowReport { view, progress };
    emit_success(globals.output(), "project show", &report, Some(&human))
}

pub fn run_archive(globals: &Globals, id: ProjectId) -> Result<()> {
    let store = globals.open_store()?;
    let project = store.set_project_status(id, ProjectStatus::Archived)?;

    let mut human = HumanOutput::new(format!("thesis project archive: {}", project.title));
    push_project_summary(&mut human, &project);

    emit_success(globals.output(), "project archive", &project, Some(&human))
}

fn push_project_summary(human: &mut HumanOutput, project: &Project) {
    human.push_summary("id", project.id.to_string());
    human.push_summary("status", project.status.to_string());
    if let Some(field) = &project.field_of_study {
        human.push_summary("field", field.clone());
    }
    if let Some(date) = project.expected_defense_date {
        human.push_summary("defense", date.to_string());
    }
}
