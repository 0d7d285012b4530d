//! Blocker detection and resolution.
//!
//! Explains why things are still locked:
//! - Task blockers: a locked task and the prerequisite task it waits on
//! - Section blockers: a locked section and the prerequisite section it waits on
//! - Suggestions for the prerequisites the learner can work on right now

use onboard_core::{ProgressTree, SectionId, TaskId};
use serde::Serialize;
use std::collections::HashSet;

/// Something that can be locked or can unlock something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockedItem {
    /// A task, with its owning section
    Task {
        /// Owning section
        section: SectionId,
        /// Task id
        task: TaskId,
    },
    /// A section
    Section {
        /// Section id
        section: SectionId,
    },
}

impl std::fmt::Display for BlockedItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockedItem::Task { task, .. } => write!(f, "task {}", task),
            BlockedItem::Section { section } => write!(f, "section {}", section),
        }
    }
}

/// A locked item and the prerequisite holding it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blocker {
    /// The locked item
    pub item: BlockedItem,
    /// Its unmet prerequisite
    pub required: BlockedItem,
    /// Open steps (task prerequisite) or open tasks (section prerequisite)
    pub remaining: usize,
    /// Human-readable reason
    pub reason: String,
}

/// Actions that can resolve a blocker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionAction {
    /// Finish the open steps of a task
    CompleteTask,
    /// Finish the open tasks of a section
    CompleteSection,
}

impl ResolutionAction {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionAction::CompleteTask => "CompleteTask",
            ResolutionAction::CompleteSection => "CompleteSection",
        }
    }
}

/// Blocker resolution suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionSuggestion {
    /// The type of resolution
    pub action: ResolutionAction,
    /// Prerequisite to work on
    pub target: BlockedItem,
    /// Description of the suggested action
    pub description: String,
    /// Priority of this resolution (lower = higher priority)
    pub priority: u32,
}

/// Blocker statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockerStats {
    /// Total blockers detected
    pub total_blockers: usize,
    /// Locked tasks
    pub locked_tasks: usize,
    /// Locked sections
    pub locked_sections: usize,
}

/// Result of blocker analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockerReport {
    /// All detected blockers, sections first, then tasks in tree order
    pub blockers: Vec<Blocker>,
    /// Actionable suggestions, highest priority first
    pub suggestions: Vec<ResolutionSuggestion>,
    /// Blocker statistics
    pub stats: BlockerStats,
}

impl BlockerReport {
    /// The blocker holding back `item`, if it is locked.
    pub fn blocker_for(&self, item: BlockedItem) -> Option<&Blocker> {
        self.blockers.iter().find(|b| b.item == item)
    }
}

/// Analyses a tree for locked items.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockerDetector;

impl BlockerDetector {
    /// Create a new blocker detector.
    pub fn new() -> Self {
        Self
    }

    /// Detect all current blockers with suggestions.
    pub fn analyze(&self, tree: &ProgressTree) -> BlockerReport {
        let mut blockers = self.detect_section_blockers(tree);
        blockers.extend(self.detect_task_blockers(tree));

        let suggestions = self.generate_suggestions(tree, &blockers);
        let stats = self.calculate_stats(&blockers);

        BlockerReport {
            blockers,
            suggestions,
            stats,
        }
    }

    fn detect_section_blockers(&self, tree: &ProgressTree) -> Vec<Blocker> {
        let mut blockers = Vec::new();

        for section in tree.sections().iter().filter(|s| s.locked) {
            let Some(required_id) = section.required_section_id else {
                continue;
            };
            let Some(required) = tree.section(required_id) else {
                continue;
            };
            let remaining = required.total_tasks() - required.completed_tasks();
            blockers.push(Blocker {
                item: BlockedItem::Section { section: section.id },
                required: BlockedItem::Section { section: required_id },
                remaining,
                reason: format!(
                    "Section '{}' requires section '{}' ({} of {} tasks completed)",
                    section.title,
                    required.title,
                    required.completed_tasks(),
                    required.total_tasks()
                ),
            });
        }

        blockers
    }

    fn detect_task_blockers(&self, tree: &ProgressTree) -> Vec<Blocker> {
        let mut blockers = Vec::new();

        for section in tree.sections() {
            for task in section.tasks.iter().filter(|t| t.locked) {
                let Some(required_id) = task.required_task_id else {
                    continue;
                };
                let Some(required) = section.task(required_id) else {
                    continue;
                };
                let remaining = required.total_steps() - required.completed_steps();
                blockers.push(Blocker {
                    item: BlockedItem::Task { section: section.id, task: task.id },
                    required: BlockedItem::Task { section: section.id, task: required_id },
                    remaining,
                    reason: format!(
                        "Task '{}' requires task '{}' ({} of {} steps completed)",
                        task.title,
                        required.title,
                        required.completed_steps(),
                        required.total_steps()
                    ),
                });
            }
        }

        blockers
    }

    /// Suggest prerequisites the learner can act on now: open themselves and
    /// inside an open section.
    fn generate_suggestions(
        &self,
        tree: &ProgressTree,
        blockers: &[Blocker],
    ) -> Vec<ResolutionSuggestion> {
        let mut seen = HashSet::new();
        let mut suggestions = Vec::new();

        for blocker in blockers {
            if !seen.insert(blocker.required) {
                continue;
            }

            let suggestion = match blocker.required {
                BlockedItem::Task { section, task } => {
                    let Some(owner) = tree.section(section) else {
                        continue;
                    };
                    let Some(required) = owner.task(task) else {
                        continue;
                    };
                    if owner.locked || required.locked {
                        continue;
                    }
                    ResolutionSuggestion {
                        action: ResolutionAction::CompleteTask,
                        target: blocker.required,
                        description: format!(
                            "Complete {} more step(s) of '{}'",
                            blocker.remaining, required.title
                        ),
                        priority: blocker.remaining as u32,
                    }
                }
                BlockedItem::Section { section } => {
                    let Some(required) = tree.section(section) else {
                        continue;
                    };
                    if required.locked {
                        continue;
                    }
                    ResolutionSuggestion {
                        action: ResolutionAction::CompleteSection,
                        target: blocker.required,
                        description: format!(
                            "Complete {} more task(s) of '{}'",
                            blocker.remaining, required.title
                        ),
                        priority: blocker.remaining as u32,
                    }
                }
            };
            suggestions.push(suggestion);
        }

        // Stable: ties keep tree order.
        suggestions.sort_by_key(|s| s.priority);
        suggestions
    }

    fn calculate_stats(&self, blockers: &[Blocker]) -> BlockerStats {
        BlockerStats {
            total_blockers: blockers.len(),
            locked_tasks: blockers
                .iter()
                .filter(|b| matches!(b.item, BlockedItem::Task { .. }))
                .count(),
            locked_sections: blockers
                .iter()
                .filter(|b| matches!(b.item, BlockedItem::Section { .. }))
                .count(),
        }
    }
}
