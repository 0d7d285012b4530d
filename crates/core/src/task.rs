//! Task model - a gated group of steps.

use serde::{Deserialize, Serialize};
use crate::id::{StepId, TaskId};

/// A step is the atomic, togglable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Identifier, unique within the owning task
    pub id: StepId,

    /// Short label
    pub text: String,

    /// Longer explanation
    pub description: String,

    /// Requirement strings shown to the learner. Informational only.
    pub validation: Vec<String>,

    /// Whether the learner ticked this step
    pub completed: bool,
}

/// A downloadable document attached to a task. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// File name
    pub name: String,

    /// What the document covers
    pub description: String,
}

/// A task gates visibility of its steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier, unique across the whole tree
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Optional due date label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Related documents
    pub documents: Vec<Document>,

    /// Steps, in display order
    pub steps: Vec<Step>,

    /// Lock gate. Only ever goes from `true` to `false`.
    pub locked: bool,

    /// Task in the same section whose completion unlocks this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_task_id: Option<TaskId>,
}

impl Task {
    /// True iff every step is completed.
    pub fn completed(&self) -> bool {
        self.steps.iter().all(|s| s.completed)
    }

    /// Number of completed steps.
    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.completed).count()
    }

    /// Number of steps.
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Find a step by id.
    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Current position in the gate state machine.
    pub fn state(&self) -> GateState {
        GateState::derive(self.locked, self.completed())
    }
}

/// Gate state machine shared by tasks and sections.
///
/// ```text
/// LOCKED → UNLOCKED → COMPLETE
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateState {
    /// Prerequisite not yet satisfied
    Locked,
    /// Open for interaction, work remaining
    Unlocked,
    /// Open and all children completed
    Complete,
}

impl GateState {
    /// Derive the state from the stored gate and the derived completion.
    /// A locked item reports `Locked` regardless of completion.
    pub fn derive(locked: bool, completed: bool) -> Self {
        match (locked, completed) {
            (true, _) => GateState::Locked,
            (false, false) => GateState::Unlocked,
            (false, true) => GateState::Complete,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Locked => "LOCKED",
            GateState::Unlocked => "UNLOCKED",
            GateState::Complete => "COMPLETE",
        }
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: u32, completed: bool) -> Step {
        Step {
            id: StepId(id),
            text: format!("Step {}", id),
            description: String::new(),
            validation: vec![],
            completed,
        }
    }

    fn task(steps: Vec<Step>, locked: bool) -> Task {
        Task {
            id: TaskId(1),
            title: "Task".to_string(),
            description: String::new(),
            date: None,
            documents: vec![],
            steps,
            locked,
            required_task_id: None,
        }
    }

    #[test]
    fn test_completed_requires_every_step() {
        let t = task(vec![step(1, true), step(2, false)], false);
        assert!(!t.completed());
        assert_eq!(t.completed_steps(), 1);
        assert_eq!(t.total_steps(), 2);

        let t = task(vec![step(1, true), step(2, true)], false);
        assert!(t.completed());
    }

    #[test]
    fn test_state_derivation() {
        assert_eq!(task(vec![step(1, false)], true).state(), GateState::Locked);
        assert_eq!(task(vec![step(1, true)], true).state(), GateState::Locked);
        assert_eq!(task(vec![step(1, false)], false).state(), GateState::Unlocked);
        assert_eq!(task(vec![step(1, true)], false).state(), GateState::Complete);
    }

    #[test]
    fn test_step_lookup() {
        let t = task(vec![step(1, false), step(2, true)], false);
        assert!(t.step(StepId(2)).unwrap().completed);
        assert!(t.step(StepId(9)).is_none());
    }
}
