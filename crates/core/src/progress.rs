//! Read model handed to presentation.
//!
//! Presentation renders lock icons, counters and the "continue" affordance
//! from these values and never mutates them.

use serde::Serialize;
use crate::id::{SectionId, TaskId};
use crate::task::{GateState, Task};

/// Progress of a single task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskProgress {
    /// Task id
    pub task_id: TaskId,

    /// Task title
    pub title: String,

    /// Gate state
    pub state: GateState,

    /// Whether the task is still locked
    pub locked: bool,

    /// Whether every step is completed
    pub completed: bool,

    /// Completed steps
    pub completed_steps: usize,

    /// Total steps
    pub total_steps: usize,

    /// Percentage complete (0-100)
    pub percentage: f32,

    /// Prerequisite task, shown as "Requires Task N" once unlocked
    pub required_task_id: Option<TaskId>,
}

impl From<&Task> for TaskProgress {
    fn from(task: &Task) -> Self {
        let completed_steps = task.completed_steps();
        let total_steps = task.total_steps();

        Self {
            task_id: task.id,
            title: task.title.clone(),
            state: task.state(),
            locked: task.locked,
            completed: task.completed(),
            completed_steps,
            total_steps,
            percentage: percentage(completed_steps, total_steps),
            required_task_id: task.required_task_id,
        }
    }
}

/// Progress of a section and its tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionProgress {
    /// Section id
    pub section_id: SectionId,

    /// Section title
    pub title: String,

    /// Gate state
    pub state: GateState,

    /// Whether the section is still locked
    pub locked: bool,

    /// Completed tasks
    pub completed_tasks: usize,

    /// Total tasks
    pub total_tasks: usize,

    /// Percentage complete (0-100)
    pub percentage: f32,

    /// Prerequisite section
    pub required_section_id: Option<SectionId>,

    /// Per-task progress, in display order
    pub tasks: Vec<TaskProgress>,
}

impl SectionProgress {
    /// `completed_tasks == total_tasks`.
    pub fn is_complete(&self) -> bool {
        self.completed_tasks == self.total_tasks
    }
}

impl std::fmt::Display for SectionProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} completed", self.completed_tasks, self.total_tasks)
    }
}

/// Share of `done` in `total` as 0-100. Empty collections report 0.
pub fn percentage(done: usize, total: usize) -> f32 {
    if total > 0 {
        (done as f32 / total as f32) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(3, 3), 100.0);
    }

    #[test]
    fn test_section_counter_label() {
        let progress = SectionProgress {
            section_id: SectionId(1),
            title: "Getting Started".to_string(),
            state: GateState::Unlocked,
            locked: false,
            completed_tasks: 1,
            total_tasks: 4,
            percentage: 25.0,
            required_section_id: None,
            tasks: vec![],
        };
        assert_eq!(progress.to_string(), "1 of 4 completed");
        assert!(!progress.is_complete());
    }
}
