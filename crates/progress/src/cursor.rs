//! Navigation cursor - which section the learner is looking at.

use onboard_core::{ProgressTree, Section, SectionId};
use tracing::debug;
use crate::engine::is_section_complete;

/// Tracks the section currently being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationCursor {
    current: SectionId,
}

impl NavigationCursor {
    /// Start at the first section of the tree.
    pub fn new(tree: &ProgressTree) -> Self {
        Self {
            current: tree.first_section_id(),
        }
    }

    /// Id of the section being viewed.
    pub fn current(&self) -> SectionId {
        self.current
    }

    /// The section being viewed.
    pub fn current_section<'a>(&self, tree: &'a ProgressTree) -> Option<&'a Section> {
        tree.section(self.current)
    }

    /// The section after the current one in sequence order, if any.
    pub fn next_section<'a>(&self, tree: &'a ProgressTree) -> Option<&'a Section> {
        let position = tree.position(self.current)?;
        tree.sections().get(position + 1)
    }

    /// Current section complete, a next section exists, and it is unlocked.
    pub fn can_advance(&self, tree: &ProgressTree) -> bool {
        let Some(current) = self.current_section(tree) else {
            return false;
        };
        if !is_section_complete(current) {
            return false;
        }
        self.next_section(tree).is_some_and(|next| !next.locked)
    }

    /// Move to the next section. Returns the new id, or `None` without
    /// moving when [`can_advance`](Self::can_advance) does not hold.
    pub fn advance(&mut self, tree: &ProgressTree) -> Option<SectionId> {
        if !self.can_advance(tree) {
            debug!("Cursor stays on section {}", self.current);
            return None;
        }
        let next = self.next_section(tree)?.id;
        debug!("Cursor moves from section {} to {}", self.current, next);
        self.current = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProgressEngine;
    use onboard_core::{StepId, TaskId};
    use onboard_storage::BuiltinTreeSource;

    fn engine() -> ProgressEngine {
        let def = BuiltinTreeSource::definition().unwrap();
        ProgressEngine::new(ProgressTree::from_definition(&def).unwrap())
    }

    fn finish_section_one(engine: &mut ProgressEngine) {
        for task in 1..=4 {
            for step in 1..=3 {
                engine.toggle_step(SectionId(1), TaskId(task), StepId(step)).unwrap();
            }
        }
    }

    #[test]
    fn test_cursor_starts_at_first_section() {
        let engine = engine();
        let cursor = NavigationCursor::new(engine.tree());
        assert_eq!(cursor.current(), SectionId(1));
        assert_eq!(cursor.current_section(engine.tree()).unwrap().title, "Getting Started");
        assert_eq!(cursor.next_section(engine.tree()).unwrap().title, "Learning Resources");
    }

    #[test]
    fn test_cannot_advance_before_section_complete() {
        let mut engine = engine();
        let mut cursor = NavigationCursor::new(engine.tree());

        assert!(!cursor.can_advance(engine.tree()));
        for task in 1..=3 {
            for step in 1..=3 {
                engine.toggle_step(SectionId(1), TaskId(task), StepId(step)).unwrap();
            }
        }
        assert!(!cursor.can_advance(engine.tree()));
        assert_eq!(cursor.advance(engine.tree()), None);
        assert_eq!(cursor.current(), SectionId(1));
    }

    #[test]
    fn test_advance_after_section_complete() {
        let mut engine = engine();
        let mut cursor = NavigationCursor::new(engine.tree());
        finish_section_one(&mut engine);

        assert!(cursor.can_advance(engine.tree()));
        assert_eq!(cursor.advance(engine.tree()), Some(SectionId(2)));
        assert_eq!(cursor.current(), SectionId(2));
    }

    #[test]
    fn test_last_section_has_nowhere_to_go() {
        let mut engine = engine();
        let mut cursor = NavigationCursor::new(engine.tree());
        finish_section_one(&mut engine);
        cursor.advance(engine.tree());

        for (task, steps) in [(5, 3), (6, 2), (7, 2)] {
            for step in 1..=steps {
                engine.toggle_step(SectionId(2), TaskId(task), StepId(step)).unwrap();
            }
        }
        assert!(engine.is_section_complete(SectionId(2)).unwrap());
        assert!(cursor.next_section(engine.tree()).is_none());
        assert!(!cursor.can_advance(engine.tree()));
        assert_eq!(cursor.advance(engine.tree()), None);
    }
}
