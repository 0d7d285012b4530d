//! Progress Tracking
//!
//! The progress engine (unlock and completion rules), the navigation
//! cursor, blocker detection, and a shared tracker service.

#![warn(missing_docs)]

pub mod error;
pub mod engine;
pub mod cursor;
pub mod blocker;
pub mod tracker;

pub use error::{ProgressError, Result};
pub use engine::{
    ProgressEngine, ToggleOutcome, is_section_complete, is_task_unlockable, is_section_unlockable,
};
pub use cursor::NavigationCursor;
pub use blocker::{
    BlockerDetector, BlockerReport, BlockerStats, Blocker, BlockedItem, ResolutionSuggestion,
    ResolutionAction,
};
pub use tracker::{ProgressTracker, ProgressSnapshot, SharedProgress, TrackerConfig};
