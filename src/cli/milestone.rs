//! thesis milestone command implementations.

use serde::Serialize;

use crate::cli::Globals;
use crate::error::Result;
use crate::model::{Milestone, ProjectId};
use crate::output::{emit_success, HumanOutput};

pub fn run_add(globals: &Globals, project: Option<ProjectId>, name: &str) -> Result<()> {
    let store = globals.open_store()?;
    let project = store.resolve_project(project)?;
    let milestone = store.add_milestone(project.id, name)?;

    let mut human = HumanOutput::new(format!("thesis milestone add: {}", milestone.name));
    human.push_summary("id", milestone.id.to_string());
    human.push_summary("project", project.id.to_string());
    human.push_summary("order", milestone.order.to_string());
    human.push_next_step(format!(
        "thesis task add \"<title>\" --milestone {}",
        milestone.id
    ));

    emit_success(globals.output(), "milestone add", &milestone, Some(&human))
}

#[derive(Serialize)]
struct MilestoneRow {
    #[serde(flatten)]
    milestone: Milestone,
    tasks: usize,
    percent: u32,
}

pub fn run_list(globals: &Globals, project: Option<ProjectId>) -> Result<()> {
    let store = globals.open_store()?;
    let project = store.resolve_project(project)?;
    let view = store.project_view(project.id)?;
    let progress = store
        .config()
        .progress
        .aggregator()
        .summarize(&view.milestones, &view.tasks, &view.word_logs);

    let rows: Vec<MilestoneRow> = view
        .milestones
        .iter()
        .zip(progress.milestones.iter())
        .map(|(milestone, summary)| MilestoneRow {
            milestone: milestone.clone(),
            tasks: summary.total,
            percent: summary.percent,
        })
        .collect();

    let mut human = HumanOutput::new(format!(
        "thesis milestone list: {} ({} milestone(s))",
        project.title,
        rows.len()
    ));
    for row in &rows {
        let complete = if row.milestone.completed { " (complete)" } else { "" };
        human.push_detail(format!(
            "{}. #{} {} - {} task(s), {}%{}",
            row.milestone.order,
            row.milestone.id,
            row.milestone.name,
            row.tasks,
            row.percent,
            complete
        ));
    }

    emit_success(globals.output(), "milestone list", &rows, Some(&human))
}
