//! Progress aggregation.
//!
//! A task's completion blends two signals: a fixed mapping of its status
//! and the share of its word target already logged. Milestones and projects
//! average the blended task figures.
//!
//! All divisions round half up (12.5 -> 13) using exact integer arithmetic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Milestone, MilestoneId, Task, TaskId, TaskStatus, WordLog};

/// Relative weights of the status and effort signals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressWeights {
    pub status: u32,
    pub effort: u32,
}

impl ProgressWeights {
    pub fn new(status: u32, effort: u32) -> Self {
        Self { status, effort }
    }
}

impl Default for ProgressWeights {
    fn default() -> Self {
        Self {
            status: 100,
            effort: 0,
        }
    }
}

/// Words logged against a task versus its target.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Effort {
    pub words: u64,
    pub target: u32,
    pub percent: u32,
}

/// Per-task word sums, aggregated once from a project's logs.
#[derive(Debug, Clone, Default)]
pub struct WordTotals {
    by_task: HashMap<TaskId, u64>,
}

impl WordTotals {
    pub fn from_logs<'a>(logs: impl IntoIterator<Item = &'a WordLog>) -> Self {
        let mut by_task: HashMap<TaskId, u64> = HashMap::new();
        for log in logs {
            if let Some(task_id) = log.task_id {
                *by_task.entry(task_id).or_default() += u64::from(log.words);
            }
        }
        Self { by_task }
    }

    pub fn words_for(&self, task_id: TaskId) -> u64 {
        self.by_task.get(&task_id).copied().unwrap_or(0)
    }
}

/// Integer division rounding half up. `den` must be non-zero.
pub fn round_div(num: u64, den: u64) -> u64 {
    debug_assert!(den > 0);
    (2 * num + den) / (2 * den)
}

fn mean(values: impl IntoIterator<Item = u32>) -> u32 {
    let (sum, count) = values
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), value| {
            (sum + u64::from(value), count + 1)
        });
    if count == 0 {
        return 0;
    }
    round_div(sum, count) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressAggregator {
    weights: ProgressWeights,
    simple_mode: bool,
}

impl ProgressAggregator {
    pub fn new(weights: ProgressWeights) -> Self {
        Self {
            weights,
            simple_mode: false,
        }
    }

    /// Ignore effort entirely; combined percent equals status percent.
    pub fn with_simple_mode(mut self, simple_mode: bool) -> Self {
        self.simple_mode = simple_mode;
        self
    }

    pub fn weights(&self) -> ProgressWeights {
        self.weights
    }

    pub fn simple_mode(&self) -> bool {
        self.simple_mode
    }

    pub fn status_percent(status: TaskStatus) -> u32 {
        match status {
            TaskStatus::Todo => 0,
            TaskStatus::Doing => 50,
            TaskStatus::Done => 100,
        }
    }

    /// Effort is only measured when the task has a target.
    pub fn effort(task: &Task, totals: &WordTotals) -> Effort {
        let target = task.word_target;
        if target == 0 {
            return Effort {
                words: 0,
                target,
                percent: 0,
            };
        }
        let words = totals.words_for(task.id);
        let percent = round_div(100 * words, u64::from(target)).min(100) as u32;
        Effort {
            words,
            target,
            percent,
        }
    }

    pub fn combined_percent(&self, task: &Task, totals: &WordTotals) -> u32 {
        let status = Self::status_percent(task.status);
        if self.simple_mode {
            return status;
        }
        let effort = Self::effort(task, totals).percent;
        let status_weight = u64::from(self.weights.status);
        let effort_weight = u64::from(self.weights.effort);
        let total = (status_weight + effort_weight).max(1);
        let weighted = status_weight * u64::from(status) + effort_weight * u64::from(effort);
        round_div(weighted, total) as u32
    }

    /// Mean combined percent over the milestone's tasks; 0 when empty.
    pub fn milestone_percent<'a>(
        &self,
        tasks: impl IntoIterator<Item = &'a Task>,
        totals: &WordTotals,
    ) -> u32 {
        mean(
            tasks
                .into_iter()
                .map(|task| self.combined_percent(task, totals)),
        )
    }

    /// Mean of milestone percents. Empty milestones contribute 0.
    pub fn project_percent(&self, milestone_percents: impl IntoIterator<Item = u32>) -> u32 {
        mean(milestone_percents)
    }

    /// Summarise a project's milestones and tasks in one pass.
    pub fn summarize(
        &self,
        milestones: &[Milestone],
        tasks: &[Task],
        logs: &[WordLog],
    ) -> ProjectProgress {
        let totals = WordTotals::from_logs(logs);

        let mut ordered: Vec<&Milestone> = milestones.iter().collect();
        ordered.sort_by_key(|milestone| (milestone.order, milestone.id));

        let mut by_milestone: HashMap<MilestoneId, Vec<&Task>> = HashMap::new();
        for task in tasks {
            by_milestone.entry(task.milestone_id).or_default().push(task);
        }

        let milestones: Vec<MilestoneProgress> = ordered
            .into_iter()
            .map(|milestone| {
                let mut members = by_milestone.remove(&milestone.id).unwrap_or_default();
                members.sort_by_key(|task| (task.order, task.id));
                let tasks: Vec<TaskProgress> = members
                    .iter()
                    .map(|task| self.task_progress(task, &totals))
                    .collect();
                MilestoneProgress {
                    milestone_id: milestone.id,
                    name: milestone.name.clone(),
                    percent: mean(tasks.iter().map(|task| task.combined_percent)),
                    total: tasks.len(),
                    done: tasks.iter().filter(|task| task.status.is_done()).count(),
                    tasks,
                }
            })
            .collect();

        ProjectProgress {
            percent: self.project_percent(milestones.iter().map(|m| m.percent)),
            completion_percent: completion_percent(tasks),
            total_tasks: tasks.len(),
            done_tasks: tasks.iter().filter(|task| task.status.is_done()).count(),
            weights: self.weights,
            simple_mode: self.simple_mode,
            milestones,
        }
    }

    pub fn task_progress(&self, task: &Task, totals: &WordTotals) -> TaskProgress {
        TaskProgress {
            task_id: task.id,
            title: task.title.clone(),
            status: task.status,
            order: task.order,
            status_percent: Self::status_percent(task.status),
            effort: Self::effort(task, totals),
            combined_percent: self.combined_percent(task, totals),
        }
    }
}

impl Default for ProgressAggregator {
    fn default() -> Self {
        Self::new(ProgressWeights::default())
    }
}

/// Share of tasks marked done, ignoring weights.
pub fn completion_percent(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let done = tasks.iter().filter(|task| task.status.is_done()).count() as u64;
    round_div(100 * done, tasks.len() as u64) as u32
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskProgress {
    pub task_id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub order: u32,
    pub status_percent: u32,
    pub effort: Effort,
    pub combined_percent: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MilestoneProgress {
    pub milestone_id: MilestoneId,
    pub name: String,
    pub percent: u32,
    pub total: usize,
    pub done: usize,
    pub tasks: Vec<TaskProgress>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectProgress {
    pub percent: u32,
    pub completion_percent: u32,
    pub total_tasks: usize,
    pub done_tasks: usize,
    pub weights: ProgressWeights,
    pub simple_mode: bool,
    pub milestones: Vec<MilestoneProgress>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: TaskId, milestone_id: MilestoneId, status: TaskStatus, target: u32) -> Task {
        let mut task = Task::new(id, 1, milestone_id, format!("task-{id}"), id as u32);
        task.status = status;
        task.word_target = target;
        task
    }

    fn log(id: u64, task_id: Option<TaskId>, day: u32, words: u32) -> WordLog {
        WordLog {
            id,
            project_id: 1,
            task_id,
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            words,
            note: None,
        }
    }

    fn milestone(id: MilestoneId, order: u32) -> Milestone {
        Milestone {
            id,
            project_id: 1,
            name: format!("M{id}"),
            order,
            template_key: None,
            completed: false,
            completed_at: None,
        }
    }

    #[test]
    fn status_percent_mapping() {
        assert_eq!(ProgressAggregator::status_percent(TaskStatus::Todo), 0);
        assert_eq!(ProgressAggregator::status_percent(TaskStatus::Doing), 50);
        assert_eq!(ProgressAggregator::status_percent(TaskStatus::Done), 100);
    }

    #[test]
    fn round_div_rounds_half_up() {
        assert_eq!(round_div(25, 2), 13);
        assert_eq!(round_div(24, 2), 12);
        assert_eq!(round_div(1, 3), 0);
        assert_eq!(round_div(2, 3), 1);
        assert_eq!(round_div(0, 7), 0);
    }

    #[test]
    fn effort_is_zero_without_target() {
        let t = task(1, 1, TaskStatus::Doing, 0);
        let totals = WordTotals::from_logs(&[log(1, Some(1), 1, 500)]);
        let effort = ProgressAggregator::effort(&t, &totals);
        assert_eq!(
            effort,
            Effort {
                words: 0,
                target: 0,
                percent: 0
            }
        );
    }

    #[test]
    fn effort_caps_at_one_hundred() {
        let t = task(1, 1, TaskStatus::Todo, 200);
        let logs = [log(1, Some(1), 1, 150), log(2, Some(1), 2, 100)];
        let effort = ProgressAggregator::effort(&t, &WordTotals::from_logs(&logs));
        assert_eq!(effort.words, 250);
        assert_eq!(effort.target, 200);
        assert_eq!(effort.percent, 100);
    }

    #[test]
    fn effort_rounds_half_up() {
        let t = task(1, 1, TaskStatus::Todo, 8);
        let effort = ProgressAggregator::effort(&t, &WordTotals::from_logs(&[log(1, Some(1), 1, 1)]));
        // 100 * 1 / 8 = 12.5
        assert_eq!(effort.percent, 13);
    }

    #[test]
    fn effort_is_monotonic_and_bounded() {
        let t = task(1, 1, TaskStatus::Todo, 37);
        let mut previous = 0;
        for words in 0..200u32 {
            let totals = WordTotals::from_logs(&[log(1, Some(1), 1, words)]);
            let percent = ProgressAggregator::effort(&t, &totals).percent;
            assert!(percent >= previous, "dropped at {words} words");
            assert!(percent <= 100);
            previous = percent;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn effort_ignores_other_tasks_and_untargeted_logs() {
        let t = task(1, 1, TaskStatus::Todo, 100);
        let logs = [log(1, Some(2), 1, 90), log(2, None, 1, 90), log(3, Some(1), 2, 10)];
        let effort = ProgressAggregator::effort(&t, &WordTotals::from_logs(&logs));
        assert_eq!(effort.words, 10);
        assert_eq!(effort.percent, 10);
    }

    #[test]
    fn status_only_weights_ignore_effort() {
        let aggregator = ProgressAggregator::new(ProgressWeights::new(100, 0));
        let logs = [log(1, Some(1), 1, 10_000)];
        let totals = WordTotals::from_logs(&logs);
        for status in [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done] {
            let t = task(1, 1, status, 100);
            assert_eq!(
                aggregator.combined_percent(&t, &totals),
                ProgressAggregator::status_percent(status)
            );
        }
    }

    #[test]
    fn combined_percent_blends_weights() {
        let aggregator = ProgressAggregator::new(ProgressWeights::new(70, 30));
        let t = task(1, 1, TaskStatus::Doing, 100);
        let totals = WordTotals::from_logs(&[log(1, Some(1), 1, 80)]);
        // (70 * 50 + 30 * 80) / 100 = 59
        assert_eq!(aggregator.combined_percent(&t, &totals), 59);
    }

    #[test]
    fn combined_percent_equal_weights() {
        let aggregator = ProgressAggregator::new(ProgressWeights::new(50, 50));
        let t = task(1, 1, TaskStatus::Doing, 100);
        let totals = WordTotals::from_logs(&[log(1, Some(1), 1, 50)]);
        assert_eq!(aggregator.combined_percent(&t, &totals), 50);
    }

    #[test]
    fn zero_weights_do_not_divide_by_zero() {
        let aggregator = ProgressAggregator::new(ProgressWeights::new(0, 0));
        let t = task(1, 1, TaskStatus::Done, 100);
        assert_eq!(aggregator.combined_percent(&t, &WordTotals::default()), 0);
    }

    #[test]
    fn simple_mode_uses_status_only() {
        let aggregator =
            ProgressAggregator::new(ProgressWeights::new(0, 100)).with_simple_mode(true);
        let t = task(1, 1, TaskStatus::Doing, 100);
        let totals = WordTotals::from_logs(&[log(1, Some(1), 1, 100)]);
        assert_eq!(aggregator.combined_percent(&t, &totals), 50);
    }

    #[test]
    fn milestone_percent_is_mean_of_tasks() {
        let aggregator = ProgressAggregator::default();
        let tasks = [
            task(1, 1, TaskStatus::Done, 0),
            task(2, 1, TaskStatus::Doing, 0),
            task(3, 1, TaskStatus::Todo, 0),
            task(4, 1, TaskStatus::Todo, 0),
        ];
        // (100 + 50 + 0 + 0) / 4 = 37.5
        assert_eq!(
            aggregator.milestone_percent(tasks.iter(), &WordTotals::default()),
            38
        );
        assert_eq!(
            aggregator.milestone_percent(std::iter::empty(), &WordTotals::default()),
            0
        );
    }

    #[test]
    fn project_percent_averages_milestones() {
        let aggregator = ProgressAggregator::default();
        assert_eq!(aggregator.project_percent([100, 50, 0]), 50);
        assert_eq!(aggregator.project_percent(std::iter::empty()), 0);
    }

    #[test]
    fn summarize_counts_empty_milestone_as_zero() {
        let aggregator = ProgressAggregator::default();
        let milestones = [milestone(1, 1), milestone(2, 2)];
        let tasks = [task(1, 1, TaskStatus::Done, 0), task(2, 1, TaskStatus::Done, 0)];
        let progress = aggregator.summarize(&milestones, &tasks, &[]);
        assert_eq!(progress.milestones.len(), 2);
        assert_eq!(progress.milestones[0].percent, 100);
        assert_eq!(progress.milestones[1].percent, 0);
        assert_eq!(progress.percent, 50);
        assert_eq!(progress.completion_percent, 100);
        assert_eq!(progress.done_tasks, 2);
    }

    #[test]
    fn summarize_orders_milestones_and_tasks() {
        let aggregator = ProgressAggregator::default();
        let milestones = [milestone(5, 2), milestone(9, 1)];
        let mut late = task(1, 9, TaskStatus::Todo, 0);
        late.order = 2;
        let mut early = task(2, 9, TaskStatus::Todo, 0);
        early.order = 1;
        let progress = aggregator.summarize(&milestones, &[late, early], &[]);
        assert_eq!(progress.milestones[0].milestone_id, 9);
        let ids: Vec<TaskId> = progress.milestones[0]
            .tasks
            .iter()
            .map(|t| t.task_id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn completion_percent_counts_done() {
        let tasks = [
            task(1, 1, TaskStatus::Done, 0),
            task(2, 1, TaskStatus::Doing, 0),
            task(3, 1, TaskStatus::Todo, 0),
        ];
        assert_eq!(completion_percent(&tasks), 33);
        assert_eq!(completion_percent(&[]), 0);
    }
}
