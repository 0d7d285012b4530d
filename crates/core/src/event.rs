//! Progress events - atoms of the learner's timeline.

use crate::id::{EventId, SectionId, StepId, TaskId};
use crate::Time;
use serde::{Deserialize, Serialize};

/// A transition that happened at a specific time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Unique identifier
    pub id: EventId,

    /// When it happened
    pub timestamp: Time,

    /// What changed
    pub kind: ProgressEventKind,
}

impl ProgressEvent {
    /// Stamp a transition with a fresh id and the current time.
    pub fn new(kind: ProgressEventKind) -> Self {
        Self {
            id: EventId::new(),
            timestamp: chrono::Utc::now(),
            kind,
        }
    }
}

/// Kinds of transitions the engine and cursor produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEventKind {
    /// A step was ticked or unticked
    StepToggled {
        /// Owning section
        section: SectionId,
        /// Owning task
        task: TaskId,
        /// Toggled step
        step: StepId,
        /// New state of the step
        completed: bool,
    },

    /// Last open step of a task was completed
    TaskCompleted {
        /// Owning section
        section: SectionId,
        /// Completed task
        task: TaskId,
    },

    /// A completed task lost a step
    TaskReopened {
        /// Owning section
        section: SectionId,
        /// Reopened task
        task: TaskId,
    },

    /// A task's prerequisite was met
    TaskUnlocked {
        /// Owning section
        section: SectionId,
        /// Unlocked task
        task: TaskId,
    },

    /// Every task of a section is completed
    SectionCompleted {
        /// Completed section
        section: SectionId,
    },

    /// A completed section lost a task
    SectionReopened {
        /// Reopened section
        section: SectionId,
    },

    /// A section's prerequisite was met
    SectionUnlocked {
        /// Unlocked section
        section: SectionId,
    },

    /// The navigation cursor moved on
    CursorAdvanced {
        /// Section left behind
        from: SectionId,
        /// Section now viewed
        to: SectionId,
    },
}

impl std::fmt::Display for ProgressEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StepToggled { section, task, step, completed } => write!(
                f,
                "step {}.{}.{} {}",
                section,
                task,
                step,
                if *completed { "completed" } else { "cleared" }
            ),
            Self::TaskCompleted { task, .. } => write!(f, "task {} completed", task),
            Self::TaskReopened { task, .. } => write!(f, "task {} reopened", task),
            Self::TaskUnlocked { task, .. } => write!(f, "task {} unlocked", task),
            Self::SectionCompleted { section } => write!(f, "section {} completed", section),
            Self::SectionReopened { section } => write!(f, "section {} reopened", section),
            Self::SectionUnlocked { section } => write!(f, "section {} unlocked", section),
            Self::CursorAdvanced { from, to } => write!(f, "moved from section {} to {}", from, to),
        }
    }
}
