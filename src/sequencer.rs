//! Task ordering within milestones.
//!
//! Every milestone keeps its tasks numbered 1..N with no gaps. Operations
//! never write anything themselves: they return a [`SequencePlan`] holding
//! the complete target placement of every task whose milestone or order
//! changes, which the store applies in one atomic write.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Milestone, MilestoneId, Task, TaskId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(Error::InvalidArgument(format!(
                "invalid direction '{other}' (expected up|down)"
            ))),
        }
    }
}

/// Where a dragged task lands relative to its new siblings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DropPosition {
    /// First in the milestone.
    Top,
    /// After `insert_after` when given and present, else last.
    #[default]
    Auto,
}

impl DropPosition {
    /// `"top"` selects [`DropPosition::Top`]; anything else is `Auto`.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("top") {
            DropPosition::Top
        } else {
            DropPosition::Auto
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderRequest {
    pub task_id: TaskId,
    pub insert_after: Option<TaskId>,
    pub target_milestone: Option<MilestoneId>,
    pub position: DropPosition,
}

impl ReorderRequest {
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            insert_after: None,
            target_milestone: None,
            position: DropPosition::Auto,
        }
    }

    pub fn after(mut self, task_id: TaskId) -> Self {
        self.insert_after = Some(task_id);
        self
    }

    pub fn into_milestone(mut self, milestone_id: MilestoneId) -> Self {
        self.target_milestone = Some(milestone_id);
        self
    }

    pub fn at(mut self, position: DropPosition) -> Self {
        self.position = position;
        self
    }
}

/// Target location of one task.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Placement {
    pub task_id: TaskId,
    pub milestone_id: MilestoneId,
    pub order: u32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SequencePlan {
    placements: Vec<Placement>,
}

impl SequencePlan {
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn placement_of(&self, task_id: TaskId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.task_id == task_id)
    }

    /// Apply every placement to `tasks`. Returns the number of rows touched.
    pub fn apply(&self, tasks: &mut [Task]) -> usize {
        let targets: HashMap<TaskId, &Placement> =
            self.placements.iter().map(|p| (p.task_id, p)).collect();
        let mut touched = 0;
        for task in tasks.iter_mut() {
            if let Some(placement) = targets.get(&task.id) {
                task.milestone_id = placement.milestone_id;
                task.order = placement.order;
                touched += 1;
            }
        }
        touched
    }
}

pub struct TaskSequencer<'a> {
    tasks: HashMap<TaskId, &'a Task>,
    milestones: &'a [Milestone],
}

impl<'a> TaskSequencer<'a> {
    pub fn new(tasks: &'a [Task], milestones: &'a [Milestone]) -> Self {
        Self {
            tasks: tasks.iter().map(|task| (task.id, task)).collect(),
            milestones,
        }
    }

    fn task(&self, task_id: TaskId) -> Result<&'a Task> {
        self.tasks
            .get(&task_id)
            .copied()
            .ok_or_else(|| Error::not_found("task", task_id))
    }

    fn milestone(&self, milestone_id: MilestoneId) -> Result<&'a Milestone> {
        self.milestones
            .iter()
            .find(|milestone| milestone.id == milestone_id)
            .ok_or_else(|| Error::not_found("milestone", milestone_id))
    }

    /// Sibling ids in display order (`order`, then id for stable ties).
    pub fn sibling_ids(&self, milestone_id: MilestoneId) -> Vec<TaskId> {
        let mut siblings: Vec<&Task> = self
            .tasks
            .values()
            .copied()
            .filter(|task| task.milestone_id == milestone_id)
            .collect();
        siblings.sort_by_key(|task| (task.order, task.id));
        siblings.into_iter().map(|task| task.id).collect()
    }

    fn renumber_into(&self, milestone_id: MilestoneId, ids: &[TaskId], out: &mut Vec<Placement>) {
        for (index, task_id) in ids.iter().enumerate() {
            let order = index as u32 + 1;
            let changed = match self.tasks.get(task_id) {
                Some(task) => task.milestone_id != milestone_id || task.order != order,
                None => true,
            };
            if changed {
                out.push(Placement {
                    task_id: *task_id,
                    milestone_id,
                    order,
                });
            }
        }
    }

    /// Plan that closes gaps and duplicates in a milestone.
    pub fn renumber(&self, milestone_id: MilestoneId) -> SequencePlan {
        let ids = self.sibling_ids(milestone_id);
        let mut placements = Vec::new();
        self.renumber_into(milestone_id, &ids, &mut placements);
        SequencePlan { placements }
    }

    /// Swap a task with its neighbour. At either end only drift is fixed.
    pub fn move_adjacent(&self, task_id: TaskId, direction: Direction) -> Result<SequencePlan> {
        let task = self.task(task_id)?;
        let mut ids = self.sibling_ids(task.milestone_id);
        let index = ids
            .iter()
            .position(|id| *id == task_id)
            .ok_or_else(|| Error::not_found("task", task_id))?;
        let neighbour = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|next| *next < ids.len()),
        };
        if let Some(neighbour) = neighbour {
            ids.swap(index, neighbour);
        }

        let mut placements = Vec::new();
        self.renumber_into(task.milestone_id, &ids, &mut placements);
        Ok(SequencePlan { placements })
    }

    /// Drag-and-drop placement, optionally into another milestone of the
    /// same project.
    ///
    /// A task moving milestones would first be parked one past the
    /// destination's highest order; the final renumbering always overrides
    /// that slot, so the plan goes straight to the end state. The source
    /// milestone is renumbered as well so both sides stay gap-free.
    pub fn reorder(&self, request: ReorderRequest) -> Result<SequencePlan> {
        let task = self.task(request.task_id)?;
        let source = task.milestone_id;
        let destination = match request.target_milestone {
            Some(target) if target != source => {
                let milestone = self.milestone(target)?;
                if milestone.project_id != task.project_id {
                    return Err(Error::InvalidReference(format!(
                        "milestone {target} belongs to project {}, task {} to project {}",
                        milestone.project_id, task.id, task.project_id
                    )));
                }
                target
            }
            _ => source,
        };

        let mut ids: Vec<TaskId> = self
            .sibling_ids(destination)
            .into_iter()
            .filter(|id| *id != task.id)
            .collect();
        let insert_at = match request.position {
            DropPosition::Top => 0,
            DropPosition::Auto => request
                .insert_after
                .and_then(|after| ids.iter().position(|id| *id == after))
                .map(|index| index + 1)
                .unwrap_or(ids.len()),
        };
        ids.insert(insert_at, task.id);

        let mut placements = Vec::new();
        self.renumber_into(destination, &ids, &mut placements);
        if destination != source {
            let remaining: Vec<TaskId> = self
                .sibling_ids(source)
                .into_iter()
                .filter(|id| *id != task.id)
                .collect();
            self.renumber_into(source, &remaining, &mut placements);
        }
        Ok(SequencePlan { placements })
    }

    pub fn can_move_up(&self, task_id: TaskId) -> Result<bool> {
        let task = self.task(task_id)?;
        let ids = self.sibling_ids(task.milestone_id);
        Ok(ids.first().is_some_and(|first| *first != task_id))
    }

    pub fn can_move_down(&self, task_id: TaskId) -> Result<bool> {
        let task = self.task(task_id)?;
        let ids = self.sibling_ids(task.milestone_id);
        Ok(ids.last().is_some_and(|last| *last != task_id))
    }
}
