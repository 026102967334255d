//! Read-only reports built from a project view: the daily digest, the task
//! export and the advisor summary row.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::config::DigestConfig;
use crate::model::{MilestoneId, Priority, ProjectId, ProjectStatus, TaskId, TaskStatus};
use crate::progress::{completion_percent, ProgressAggregator, WordTotals};
use crate::store::ProjectView;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DueTask {
    pub task_id: TaskId,
    pub title: String,
    pub milestone: String,
    pub due_date: NaiveDate,
    pub days_left: i64,
    pub combined_percent: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InactivityNudge {
    /// `None` when nothing was ever logged.
    pub last_logged: Option<NaiveDate>,
    pub idle_days: Option<i64>,
    pub threshold_days: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Digest {
    pub project_id: ProjectId,
    pub date: NaiveDate,
    pub due_days: u32,
    pub due_soon: Vec<DueTask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactivity: Option<InactivityNudge>,
}

impl Digest {
    pub fn is_quiet(&self) -> bool {
        self.due_soon.is_empty() && self.inactivity.is_none()
    }
}

/// Unfinished tasks due in `[today, today + due_days]`, soonest first, and a
/// nudge when the newest word log is older than `inactivity_days`.
pub fn digest(
    view: &ProjectView,
    aggregator: &ProgressAggregator,
    settings: &DigestConfig,
    today: NaiveDate,
) -> Digest {
    let totals = WordTotals::from_logs(&view.word_logs);
    let latest = today + Duration::days(i64::from(settings.due_days));

    let mut due_soon: Vec<DueTask> = view
        .tasks
        .iter()
        .filter(|task| !task.status.is_done())
        .filter_map(|task| {
            let due = task.due_date?;
            (today..=latest).contains(&due).then(|| DueTask {
                task_id: task.id,
                title: task.title.clone(),
                milestone: milestone_label(view, task.milestone_id),
                due_date: due,
                days_left: (due - today).num_days(),
                combined_percent: aggregator.combined_percent(task, &totals),
            })
        })
        .collect();
    due_soon.sort_by_key(|task| (task.due_date, task.task_id));

    let last_logged = view.word_logs.iter().map(|log| log.date).max();
    let cutoff = today - Duration::days(i64::from(settings.inactivity_days.max(1)));
    let inactivity = match last_logged {
        Some(date) if date >= cutoff => None,
        _ => Some(InactivityNudge {
            last_logged,
            idle_days: last_logged.map(|date| (today - date).num_days()),
            threshold_days: settings.inactivity_days,
        }),
    };

    Digest {
        project_id: view.project.id,
        date: today,
        due_days: settings.due_days,
        due_soon,
        inactivity,
    }
}

fn milestone_label(view: &ProjectView, milestone_id: MilestoneId) -> String {
    view.milestone_name(milestone_id)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{milestone_id}"))
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExportRow {
    pub task_id: TaskId,
    pub milestone: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub word_target: u32,
    pub due_date: Option<NaiveDate>,
    pub combined_percent: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectExport {
    pub project_id: ProjectId,
    pub title: String,
    pub rows: Vec<ExportRow>,
}

impl ProjectExport {
    pub const CSV_HEADER: [&'static str; 8] = [
        "task_id",
        "milestone",
        "title",
        "status",
        "priority",
        "word_target",
        "due_date",
        "combined_percent",
    ];

    /// CSV text with a header line. Fields containing separators or quotes
    /// are quoted.
    pub fn to_csv(&self) -> String {
        let mut out = Self::CSV_HEADER.join(",");
        out.push('\n');
        for row in &self.rows {
            let fields = [
                row.task_id.to_string(),
                csv_field(&row.milestone),
                csv_field(&row.title),
                row.status.to_string(),
                row.priority.to_string(),
                row.word_target.to_string(),
                row.due_date.map(|d| d.to_string()).unwrap_or_default(),
                row.combined_percent.to_string(),
            ];
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        out
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One row per task in display order.
pub fn export(view: &ProjectView, aggregator: &ProgressAggregator) -> ProjectExport {
    let totals = WordTotals::from_logs(&view.word_logs);
    let rows = view
        .tasks
        .iter()
        .map(|task| ExportRow {
            task_id: task.id,
            milestone: milestone_label(view, task.milestone_id),
            title: task.title.clone(),
            status: task.status,
            priority: task.priority,
            word_target: task.word_target,
            due_date: task.due_date,
            combined_percent: aggregator.combined_percent(task, &totals),
        })
        .collect();
    ProjectExport {
        project_id: view.project.id,
        title: view.project.title.clone(),
        rows,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectSummary {
    pub project_id: ProjectId,
    pub title: String,
    pub status: ProjectStatus,
    pub total_tasks: usize,
    pub done_tasks: usize,
    pub completion_percent: u32,
    pub percent: u32,
    pub lifetime_words: u64,
}

pub fn summary(view: &ProjectView, aggregator: &ProgressAggregator) -> ProjectSummary {
    let progress = aggregator.summarize(&view.milestones, &view.tasks, &view.word_logs);
    ProjectSummary {
        project_id: view.project.id,
        title: view.project.title.clone(),
        status: view.project.status,
        total_tasks: progress.total_tasks,
        done_tasks: progress.done_tasks,
        completion_percent: completion_percent(&view.tasks),
        percent: progress.percent,
        lifetime_words: view.lifetime_words(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Milestone, Project, Task, WordLog};
    use crate::progress::ProgressWeights;
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn view() -> ProjectView {
        let now = Utc::now();
        let project = Project {
            id: 1,
            title: "Soil microbiomes".to_string(),
            field_of_study: None,
            expected_defense_date: None,
            status: ProjectStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let milestone = Milestone {
            id: 2,
            project_id: 1,
            name: "Methods, part 1".to_string(),
            order: 1,
            template_key: None,
            completed: false,
            completed_at: None,
        };
        let mut draft = Task::new(3, 1, 2, "Draft \"sampling\"", 1);
        draft.due_date = Some(day(12));
        draft.word_target = 1000;
        draft.status = TaskStatus::Doing;
        let mut review = Task::new(4, 1, 2, "Review", 2);
        review.due_date = Some(day(10));
        let mut done = Task::new(5, 1, 2, "Outline", 3);
        done.due_date = Some(day(11));
        done.status = TaskStatus::Done;
        let mut later = Task::new(6, 1, 2, "Finalize", 4);
        later.due_date = Some(day(20));
        ProjectView {
            project,
            milestones: vec![milestone],
            tasks: vec![draft, review, done, later],
            word_logs: vec![WordLog {
                id: 7,
                project_id: 1,
                task_id: Some(3),
                date: day(4),
                words: 500,
                note: None,
            }],
        }
    }

    #[test]
    fn digest_lists_due_tasks_and_nudges() {
        let view = view();
        let aggregator = ProgressAggregator::new(ProgressWeights::new(50, 50));
        let digest = digest(&view, &aggregator, &DigestConfig::default(), day(10));

        let ids: Vec<TaskId> = digest.due_soon.iter().map(|t| t.task_id).collect();
        assert_eq!(ids, vec![4, 3]);
        assert_eq!(digest.due_soon[1].days_left, 2);
        // doing 50 / effort 50, weighted 50/50
        assert_eq!(digest.due_soon[1].combined_percent, 50);

        let nudge = digest.inactivity.expect("nudge");
        assert_eq!(nudge.last_logged, Some(day(4)));
        assert_eq!(nudge.idle_days, Some(6));
    }

    #[test]
    fn recent_log_suppresses_nudge() {
        let view = view();
        let digest = digest(
            &view,
            &ProgressAggregator::default(),
            &DigestConfig::default(),
            day(9),
        );
        assert!(digest.inactivity.is_none());
        assert_eq!(digest.due_soon.len(), 2);
    }

    #[test]
    fn never_logged_always_nudges() {
        let mut view = view();
        view.word_logs.clear();
        let digest = digest(
            &view,
            &ProgressAggregator::default(),
            &DigestConfig::default(),
            day(1),
        );
        let nudge = digest.inactivity.as_ref().expect("nudge");
        assert_eq!(nudge.last_logged, None);
        assert!(!digest.is_quiet());
    }

    #[test]
    fn export_quotes_csv_fields() {
        let view = view();
        let export = export(&view, &ProgressAggregator::default());
        assert_eq!(export.rows.len(), 4);
        let csv = export.to_csv();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("task_id,milestone,title,status,priority,word_target,due_date,combined_percent")
        );
        assert_eq!(
            lines.next(),
            Some("3,\"Methods, part 1\",\"Draft \"\"sampling\"\"\",doing,med,1000,2024-06-12,50")
        );
    }

    #[test]
    fn summary_uses_milestone_mean() {
        let view = view();
        let summary = summary(&view, &ProgressAggregator::default());
        assert_eq!(summary.total_tasks, 4);
        assert_eq!(summary.done_tasks, 1);
        assert_eq!(summary.completion_percent, 25);
        // (50 + 0 + 100 + 0) / 4
        assert_eq!(summary.percent, 38);
        assert_eq!(summary.lifetime_words, 500);
    }
}
