//! Onboard core data models.
//!
//! This crate defines the Section → Task → Step hierarchy that the
//! progress engine drives, the static definitions it is built from, and
//! the read model presentation consumes.

#![warn(missing_docs)]

// Core identities
mod id;

// Progression tree
mod task;
mod section;
mod tree;
mod definition;

// Read model and timeline
mod progress;
mod event;

// Re-exports
pub use id::*;

// Tree
pub use task::{Step, Task, Document, GateState};
pub use section::Section;
pub use tree::{ProgressTree, TreeError};
pub use definition::{TreeDefinition, SectionDefinition, TaskDefinition, StepDefinition};

// Read model & events
pub use progress::{SectionProgress, TaskProgress, percentage};
pub use event::{ProgressEvent, ProgressEventKind};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
