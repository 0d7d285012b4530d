//! Errors returned by progress operations.

use onboard_core::{SectionId, StepId, TaskId};

/// Error type for progress operations.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Why a progress operation was rejected. A rejected call never mutates
/// the tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    /// No section with this id
    #[error("section {0} not found")]
    SectionNotFound(SectionId),

    /// No task with this id in the section
    #[error("task {task} not found in section {section}")]
    TaskNotFound {
        /// Section searched
        section: SectionId,
        /// Missing task
        task: TaskId,
    },

    /// No step with this id in the task
    #[error("step {step} not found in task {task} of section {section}")]
    StepNotFound {
        /// Owning section
        section: SectionId,
        /// Task searched
        task: TaskId,
        /// Missing step
        step: StepId,
    },

    /// Target task is still locked
    #[error("task {task} in section {section} is locked")]
    TaskLocked {
        /// Owning section
        section: SectionId,
        /// Locked task
        task: TaskId,
    },

    /// Target task belongs to a section that is still locked
    #[error("section {0} is locked")]
    SectionLocked(SectionId),
}

impl ProgressError {
    /// The identifiers did not resolve in the tree.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SectionNotFound(_) | Self::TaskNotFound { .. } | Self::StepNotFound { .. }
        )
    }

    /// The target exists but sits behind a closed gate.
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::TaskLocked { .. } | Self::SectionLocked(_))
    }
}
