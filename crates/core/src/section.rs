//! Section model - a top-level gated group of tasks.

use serde::Serialize;
use crate::id::{SectionId, TaskId};
use crate::progress::{percentage, SectionProgress, TaskProgress};
use crate::task::{GateState, Task};

/// A section groups tasks and is gated like a task.
///
/// `total_tasks` and `completed_tasks` are always derived from `tasks`,
/// so they can never drift from the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Unique identifier
    pub id: SectionId,

    /// Section title
    pub title: String,

    /// Description
    pub description: String,

    /// Tasks, in display order
    pub tasks: Vec<Task>,

    /// Lock gate. Only ever goes from `true` to `false`.
    pub locked: bool,

    /// Section whose completion unlocks this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_section_id: Option<SectionId>,
}

impl Section {
    /// Number of owned tasks.
    pub fn total_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Number of completed tasks.
    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed()).count()
    }

    /// `completed_tasks == total_tasks`.
    pub fn is_complete(&self) -> bool {
        self.completed_tasks() == self.total_tasks()
    }

    /// Find a task by id.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Current position in the gate state machine.
    pub fn state(&self) -> GateState {
        GateState::derive(self.locked, self.is_complete())
    }

    /// Build the read model for this section.
    pub fn progress(&self) -> SectionProgress {
        let completed = self.completed_tasks();
        let total = self.total_tasks();

        SectionProgress {
            section_id: self.id,
            title: self.title.clone(),
            state: self.state(),
            locked: self.locked,
            completed_tasks: completed,
            total_tasks: total,
            percentage: percentage(completed, total),
            required_section_id: self.required_section_id,
            tasks: self.tasks.iter().map(TaskProgress::from).collect(),
        }
    }
}
