//! Read-only reporting commands: progress, streak, digest, export, audit
//! and quote.

use crate::cli::{date_or_today, Globals};
use crate::error::{Error, Result};
use crate::model::ProjectId;
use crate::motivation;
use crate::output::{emit_success, HumanOutput};
use crate::report;

pub fn run_progress(globals: &Globals, project: Option<ProjectId>) -> Result<()> {
    let store = globals.open_store()?;
    let project = store.resolve_project(project)?;
    let progress = store.progress(project.id)?;

    let mut human = HumanOutput::new(format!("thesis progress: {}", project.title));
    human.push_summary("percent", format!("{}%", progress.percent));
    human.push_summary("completion", format!("{}%", progress.completion_percent));
    human.push_summary(
        "weights",
        if progress.simple_mode {
            "simple (status only)".to_string()
        } else {
            format!(
                "status {} / effort {}",
                progress.weights.status, progress.weights.effort
            )
        },
    );
    for milestone in &progress.milestones {
        human.push_detail(format!(
            "{} {}% ({}/{} done)",
            milestone.name, milestone.percent, milestone.done, milestone.total
        ));
        for task in &milestone.tasks {
            human.push_detail(format!(
                "  {}. {} [{}] {}%",
                task.order, task.title, task.status, task.combined_percent
            ));
        }
    }

    emit_success(globals.output(), "progress", &progress, Some(&human))
}

pub fn run_streak(globals: &Globals, project: Option<ProjectId>, date: Option<&str>) -> Result<()> {
    let store = globals.open_store()?;
    let project = store.resolve_project(project)?;
    let today = date_or_today(date)?;
    let stats = store.writing_stats(project.id, today)?;

    let mut human = HumanOutput::new(format!("thesis streak: {}", project.title));
    human.push_summary("current", format!("{} day(s)", stats.streaks.current));
    human.push_summary("longest", format!("{} day(s)", stats.streaks.longest));
    human.push_summary("lifetime words", stats.lifetime_words.to_string());
    for badge in &stats.badges {
        human.push_detail(badge.label());
    }
    if stats.streaks.current == 0 {
        human.push_next_step("thesis words log <words>");
    }

    emit_success(globals.output(), "streak", &stats, Some(&human))
}

pub fn run_digest(globals: &Globals, project: Option<ProjectId>, date: Option<&str>) -> Result<()> {
    let store = globals.open_store()?;
    let project = store.resolve_project(project)?;
    let today = date_or_today(date)?;
    let digest = store.digest(project.id, today)?;

    let mut human = HumanOutput::new(format!("thesis digest: {} ({})", project.title, today));
    human.push_summary(
        "due within",
        format!("{} day(s): {} task(s)", digest.due_days, digest.due_soon.len()),
    );
    for task in &digest.due_soon {
        human.push_detail(format!(
            "{} (due {}, progress {}%)",
            task.title, task.due_date, task.combined_percent
        ));
    }
    if let Some(nudge) = &digest.inactivity {
        let message = match nudge.idle_days {
            Some(days) => format!("no writing logged in {days} day(s)"),
            None => "no writing logged yet".to_string(),
        };
        human.push_warning(message);
        human.push_next_step("thesis words log <words>");
    }

    emit_success(globals.output(), "digest", &digest, Some(&human))
}

pub fn run_export(globals: &Globals, project: Option<ProjectId>, format: &str) -> Result<()> {
    let store = globals.open_store()?;
    let project = store.resolve_project(project)?;
    let view = store.project_view(project.id)?;
    let export = report::export(&view, &store.config().progress.aggregator());

    match format.trim().to_ascii_lowercase().as_str() {
        "csv" if !globals.json => {
            print!("{}", export.to_csv());
            Ok(())
        }
        "csv" | "table" => {
            let mut human = HumanOutput::new(format!(
                "thesis export: {} ({} task(s))",
                export.title,
                export.rows.len()
            ));
            for row in &export.rows {
                human.push_detail(format!(
                    "#{} {} / {} [{}] {}%",
                    row.task_id, row.milestone, row.title, row.status, row.combined_percent
                ));
            }
            emit_success(globals.output(), "export", &export, Some(&human))
        }
        other => Err(Error::InvalidArgument(format!(
            "invalid export format '{other}' (expected table|csv)"
        ))),
    }
}

pub fn run_audit(globals: &Globals, project: Option<ProjectId>, limit: usize) -> Result<()> {
    let store = globals.open_store()?;
    let entries = store.audit_log(project, Some(limit))?;

    let mut human = HumanOutput::new(format!("thesis audit: {} entries", entries.len()));
    for entry in &entries {
        let project = entry
            .project_id
            .map(|id| format!(" project #{id}"))
            .unwrap_or_default();
        human.push_detail(format!(
            "{} {}{}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action,
            project
        ));
    }

    emit_success(globals.output(), "audit", &entries, Some(&human))
}

pub fn run_quote(globals: &Globals, date: Option<&str>) -> Result<()> {
    let quote = motivation::quote_for(date_or_today(date)?);
    let human = HumanOutput::new(format!("\"{}\" - {}", quote.text, quote.author));
    emit_success(globals.output(), "quote", &quote, Some(&human))
}
