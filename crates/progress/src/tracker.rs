//! Progress tracking service.
//!
//! Wraps the engine and cursor behind a single `RwLock`, which is the only
//! writer path into the tree. Every toggle applies its whole cascade while
//! holding the write lock, so readers only see complete transitions.

use std::collections::VecDeque;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use onboard_core::{
    ProgressEvent, ProgressEventKind, ProgressTree, SectionId, SectionProgress, StepId, TaskId,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use crate::blocker::{BlockerDetector, BlockerReport};
use crate::cursor::NavigationCursor;
use crate::engine::{ProgressEngine, ToggleOutcome};
use crate::error::Result;

/// Progress tracking service.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    /// Flip a step and run the unlock cascade.
    async fn toggle_step(
        &self,
        section_id: SectionId,
        task_id: TaskId,
        step_id: StepId,
    ) -> Result<ToggleOutcome>;

    /// Move the cursor to the next section if allowed.
    async fn advance_section(&self) -> Option<SectionId>;

    /// Whether the cursor may move on.
    async fn can_advance(&self) -> bool;

    /// Section being viewed.
    async fn current_section(&self) -> SectionId;

    /// Take a progress snapshot.
    async fn snapshot(&self) -> ProgressSnapshot;

    /// Explain what is still locked.
    async fn blockers(&self) -> BlockerReport;

    /// Recorded transitions, oldest first.
    async fn journal(&self) -> Vec<ProgressEvent>;
}

/// Configuration for the tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Max journal entries kept (0 disables the journal)
    pub journal_limit: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { journal_limit: 256 }
    }
}

/// A snapshot of progress at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    /// When snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Section being viewed
    pub current_section: SectionId,

    /// Section the cursor would move to, if any
    pub next_section: Option<SectionId>,

    /// Whether the "continue" affordance should be offered
    pub can_advance: bool,

    /// Progress by section, in sequence order
    pub sections: Vec<SectionProgress>,
}

impl ProgressSnapshot {
    /// Progress of one section.
    pub fn section(&self, id: SectionId) -> Option<&SectionProgress> {
        self.sections.iter().find(|s| s.section_id == id)
    }
}

struct TrackerState {
    engine: ProgressEngine,
    cursor: NavigationCursor,
    journal: VecDeque<ProgressEvent>,
}

impl TrackerState {
    fn record(&mut self, limit: usize, kinds: impl IntoIterator<Item = ProgressEventKind>) {
        if limit == 0 {
            return;
        }
        for kind in kinds {
            if self.journal.len() == limit {
                self.journal.pop_front();
            }
            self.journal.push_back(ProgressEvent::new(kind));
        }
    }
}

/// Shared, cloneable progress tracker.
#[derive(Clone)]
pub struct SharedProgress {
    state: Arc<RwLock<TrackerState>>,
    config: TrackerConfig,
}

impl SharedProgress {
    /// Create a tracker over a freshly built tree.
    pub fn new(tree: ProgressTree) -> Self {
        Self::with_config(tree, TrackerConfig::default())
    }

    /// Create a tracker with custom config.
    pub fn with_config(tree: ProgressTree, config: TrackerConfig) -> Self {
        let cursor = NavigationCursor::new(&tree);
        Self {
            state: Arc::new(RwLock::new(TrackerState {
                engine: ProgressEngine::new(tree),
                cursor,
                journal: VecDeque::new(),
            })),
            config,
        }
    }

    /// Tracker configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Copy of the current tree.
    pub async fn tree(&self) -> ProgressTree {
        self.state.read().await.engine.tree().clone()
    }
}

#[async_trait]
impl ProgressTracker for SharedProgress {
    async fn toggle_step(
        &self,
        section_id: SectionId,
        task_id: TaskId,
        step_id: StepId,
    ) -> Result<ToggleOutcome> {
        let mut state = self.state.write().await;
        let outcome = state.engine.toggle_step(section_id, task_id, step_id)?;
        state.record(self.config.journal_limit, outcome.events.iter().copied());
        Ok(outcome)
    }

    async fn advance_section(&self) -> Option<SectionId> {
        let mut state = self.state.write().await;
        let from = state.cursor.current();
        let TrackerState { engine, cursor, .. } = &mut *state;
        let to = cursor.advance(engine.tree())?;
        info!("Advanced from section {} to {}", from, to);
        state.record(
            self.config.journal_limit,
            [ProgressEventKind::CursorAdvanced { from, to }],
        );
        Some(to)
    }

    async fn can_advance(&self) -> bool {
        let state = self.state.read().await;
        state.cursor.can_advance(state.engine.tree())
    }

    async fn current_section(&self) -> SectionId {
        self.state.read().await.cursor.current()
    }

    async fn snapshot(&self) -> ProgressSnapshot {
        let state = self.state.read().await;
        let tree = state.engine.tree();

        ProgressSnapshot {
            timestamp: Utc::now(),
            current_section: state.cursor.current(),
            next_section: state.cursor.next_section(tree).map(|s| s.id),
            can_advance: state.cursor.can_advance(tree),
            sections: state.engine.progress(),
        }
    }

    async fn blockers(&self) -> BlockerReport {
        let state = self.state.read().await;
        BlockerDetector::new().analyze(state.engine.tree())
    }

    async fn journal(&self) -> Vec<ProgressEvent> {
        self.state.read().await.journal.iter().cloned().collect()
    }
}
