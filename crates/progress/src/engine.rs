//! The progress engine - unlock and completion rules.
//!
//! One mutating operation, [`ProgressEngine::toggle_step`], plus read-only
//! queries. Each toggle runs the whole cascade synchronously:
//!
//! ```text
//! flip step → task completion → task unlocks → section completion → section unlocks
//! ```
//!
//! Unlocking is recomputed against the current state on every toggle and is
//! one-way: nothing ever re-locks, even when a prerequisite is later reopened.

use onboard_core::{
    ProgressEventKind, ProgressTree, Section, SectionId, SectionProgress, StepId, Task, TaskId,
};
use tracing::{debug, info, warn};
use crate::error::{ProgressError, Result};

/// `completed_tasks == total_tasks`.
pub fn is_section_complete(section: &Section) -> bool {
    section.completed_tasks() == section.total_tasks()
}

/// True iff the task has no prerequisite, or its prerequisite (looked up in
/// `tasks_in_section`) is completed.
pub fn is_task_unlockable(task: &Task, tasks_in_section: &[Task]) -> bool {
    match task.required_task_id {
        None => true,
        Some(required) => tasks_in_section
            .iter()
            .find(|t| t.id == required)
            .is_some_and(Task::completed),
    }
}

/// True iff the section has no prerequisite, or its prerequisite (looked up
/// in `all_sections`) is complete.
pub fn is_section_unlockable(section: &Section, all_sections: &[Section]) -> bool {
    match section.required_section_id {
        None => true,
        Some(required) => all_sections
            .iter()
            .find(|s| s.id == required)
            .is_some_and(is_section_complete),
    }
}

/// Transitions caused by one accepted toggle, in the order they were computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Every transition, starting with the step flip itself
    pub events: Vec<ProgressEventKind>,
}

impl ToggleOutcome {
    /// New completion state of the toggled step.
    pub fn step_completed(&self) -> bool {
        self.events.iter().any(|e| {
            matches!(e, ProgressEventKind::StepToggled { completed: true, .. })
        })
    }

    /// Tasks unlocked by this toggle.
    pub fn unlocked_tasks(&self) -> Vec<TaskId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEventKind::TaskUnlocked { task, .. } => Some(*task),
                _ => None,
            })
            .collect()
    }

    /// Sections unlocked by this toggle.
    pub fn unlocked_sections(&self) -> Vec<SectionId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEventKind::SectionUnlocked { section } => Some(*section),
                _ => None,
            })
            .collect()
    }
}

/// Owns the progression tree and applies toggles to it.
///
/// Mutation happens in place behind `&mut self`, so no reader can observe a
/// half-applied cascade.
#[derive(Debug, Clone)]
pub struct ProgressEngine {
    tree: ProgressTree,
}

impl ProgressEngine {
    /// Create an engine over a freshly built tree.
    pub fn new(tree: ProgressTree) -> Self {
        Self { tree }
    }

    /// Current tree.
    pub fn tree(&self) -> &ProgressTree {
        &self.tree
    }

    /// Give the tree back.
    pub fn into_tree(self) -> ProgressTree {
        self.tree
    }

    /// Flip one step and run the unlock cascade.
    ///
    /// Rejected without any mutation when the ids do not resolve, or when
    /// the target task or its section is locked.
    pub fn toggle_step(
        &mut self,
        section_id: SectionId,
        task_id: TaskId,
        step_id: StepId,
    ) -> Result<ToggleOutcome> {
        match self.check(section_id, task_id, step_id) {
            Ok(()) => Ok(self.apply_toggle(section_id, task_id, step_id)),
            Err(err) => {
                warn!(
                    "Rejected toggle of step {}.{}.{}: {}",
                    section_id, task_id, step_id, err
                );
                Err(err)
            }
        }
    }

    /// Look everything up and check the gates before touching anything.
    fn check(&self, section_id: SectionId, task_id: TaskId, step_id: StepId) -> Result<()> {
        let section = self.section(section_id)?;
        let task = section
            .task(task_id)
            .ok_or(ProgressError::TaskNotFound { section: section_id, task: task_id })?;
        if !task.steps.iter().any(|s| s.id == step_id) {
            return Err(ProgressError::StepNotFound {
                section: section_id,
                task: task_id,
                step: step_id,
            });
        }

        if section.locked {
            return Err(ProgressError::SectionLocked(section_id));
        }
        if task.locked {
            return Err(ProgressError::TaskLocked { section: section_id, task: task_id });
        }
        Ok(())
    }

    /// Run the cascade for a toggle that already passed [`check`](Self::check).
    fn apply_toggle(&mut self, section_id: SectionId, task_id: TaskId, step_id: StepId) -> ToggleOutcome {
        let mut events = Vec::new();

        let (was_task_complete, was_section_complete) = match self.tree.section(section_id) {
            Some(section) => (
                section.task(task_id).is_some_and(Task::completed),
                is_section_complete(section),
            ),
            None => return ToggleOutcome { events },
        };

        // 1. Flip the step
        let Some(completed) = self.tree.flip_step(section_id, task_id, step_id) else {
            return ToggleOutcome { events };
        };
        debug!(
            "Step {}.{}.{} is now {}",
            section_id,
            task_id,
            step_id,
            if completed { "completed" } else { "open" }
        );
        events.push(ProgressEventKind::StepToggled {
            section: section_id,
            task: task_id,
            step: step_id,
            completed,
        });

        // 2. Task completion is derived from its steps
        let task_complete = self.tree.task(section_id, task_id).is_some_and(Task::completed);
        match (was_task_complete, task_complete) {
            (false, true) => {
                info!("Task {} completed", task_id);
                events.push(ProgressEventKind::TaskCompleted { section: section_id, task: task_id });
            }
            (true, false) => {
                info!("Task {} reopened", task_id);
                events.push(ProgressEventKind::TaskReopened { section: section_id, task: task_id });
            }
            _ => {}
        }

        // 3. Unlock tasks whose prerequisite is now completed
        let unlockable: Vec<TaskId> = self
            .tree
            .section(section_id)
            .map(|section| {
                section
                    .tasks
                    .iter()
                    .filter(|t| {
                        t.locked
                            && t.required_task_id.is_some()
                            && is_task_unlockable(t, &section.tasks)
                    })
                    .map(|t| t.id)
                    .collect()
            })
            .unwrap_or_default();
        for task in unlockable {
            if self.tree.unlock_task(section_id, task) {
                info!("Task {} unlocked", task);
                events.push(ProgressEventKind::TaskUnlocked { section: section_id, task });
            }
        }

        // 4. Section completion is derived from its tasks
        let section_complete = self.tree.section(section_id).is_some_and(is_section_complete);
        match (was_section_complete, section_complete) {
            (false, true) => {
                info!("Section {} completed", section_id);
                events.push(ProgressEventKind::SectionCompleted { section: section_id });
            }
            (true, false) => {
                info!("Section {} reopened", section_id);
                events.push(ProgressEventKind::SectionReopened { section: section_id });
            }
            _ => {}
        }

        // 5. Unlock sections that require this one
        if section_complete {
            let dependents: Vec<SectionId> = self
                .tree
                .sections()
                .iter()
                .filter(|s| s.locked && s.required_section_id == Some(section_id))
                .map(|s| s.id)
                .collect();
            for dependent in dependents {
                if self.tree.unlock_section(dependent) {
                    info!("Section {} unlocked", dependent);
                    events.push(ProgressEventKind::SectionUnlocked { section: dependent });
                }
            }
        }

        ToggleOutcome { events }
    }

    fn section(&self, id: SectionId) -> Result<&Section> {
        self.tree.section(id).ok_or(ProgressError::SectionNotFound(id))
    }

    /// Whether the task is still locked.
    pub fn is_task_locked(&self, section_id: SectionId, task_id: TaskId) -> Result<bool> {
        self.section(section_id)?
            .task(task_id)
            .map(|t| t.locked)
            .ok_or(ProgressError::TaskNotFound { section: section_id, task: task_id })
    }

    /// Whether the section is still locked.
    pub fn is_section_locked(&self, section_id: SectionId) -> Result<bool> {
        Ok(self.section(section_id)?.locked)
    }

    /// Whether every task of the section is completed.
    pub fn is_section_complete(&self, section_id: SectionId) -> Result<bool> {
        Ok(is_section_complete(self.section(section_id)?))
    }

    /// Whether presentation may navigate to the section.
    pub fn is_section_reachable(&self, section_id: SectionId) -> Result<bool> {
        Ok(!self.section(section_id)?.locked)
    }

    /// Read model for one section.
    pub fn section_progress(&self, section_id: SectionId) -> Result<SectionProgress> {
        Ok(self.section(section_id)?.progress())
    }

    /// Read model for every section, in sequence order.
    pub fn progress(&self) -> Vec<SectionProgress> {
        self.tree.progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_core::GateState;
    use onboard_storage::BuiltinTreeSource;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn engine() -> ProgressEngine {
        let def = BuiltinTreeSource::definition().unwrap();
        ProgressEngine::new(ProgressTree::from_definition(&def).unwrap())
    }

    fn complete_task(engine: &mut ProgressEngine, section: u32, task: u32) -> Vec<ToggleOutcome> {
        let steps: Vec<StepId> = engine
            .tree()
            .task(SectionId(section), TaskId(task))
            .unwrap()
            .steps
            .iter()
            .map(|s| s.id)
            .collect();
        steps
            .into_iter()
            .map(|step| engine.toggle_step(SectionId(section), TaskId(task), step).unwrap())
            .collect()
    }

    fn locked(engine: &ProgressEngine, task: u32) -> bool {
        engine.is_task_locked(SectionId(1), TaskId(task)).unwrap()
    }

    #[test]
    fn test_first_task_completion_unlocks_next() {
        let mut engine = engine();
        let outcomes = complete_task(&mut engine, 1, 1);

        let section = engine.tree().section(SectionId(1)).unwrap();
        assert!(section.task(TaskId(1)).unwrap().completed());
        assert!(!locked(&engine, 2));
        assert!(locked(&engine, 3));
        assert!(locked(&engine, 4));
        assert_eq!(section.completed_tasks(), 1);

        let last = outcomes.last().unwrap();
        assert_eq!(last.unlocked_tasks(), vec![TaskId(2)]);
        assert!(last.events.contains(&ProgressEventKind::TaskCompleted {
            section: SectionId(1),
            task: TaskId(1),
        }));
    }

    #[test]
    fn test_completing_section_unlocks_dependent_section() {
        let mut engine = engine();
        for task in 1..=3 {
            complete_task(&mut engine, 1, task);
        }
        assert!(engine.is_section_locked(SectionId(2)).unwrap());

        let outcomes = complete_task(&mut engine, 1, 4);
        let section = engine.tree().section(SectionId(1)).unwrap();
        assert_eq!(section.completed_tasks(), 4);
        assert_eq!(section.completed_tasks(), section.total_tasks());
        assert!(engine.is_section_complete(SectionId(1)).unwrap());
        assert!(!engine.is_section_locked(SectionId(2)).unwrap());
        assert!(engine.is_section_reachable(SectionId(2)).unwrap());

        let last = outcomes.last().unwrap();
        assert_eq!(last.unlocked_sections(), vec![SectionId(2)]);
        assert_eq!(
            last.events,
            vec![
                ProgressEventKind::StepToggled {
                    section: SectionId(1),
                    task: TaskId(4),
                    step: StepId(3),
                    completed: true,
                },
                ProgressEventKind::TaskCompleted { section: SectionId(1), task: TaskId(4) },
                ProgressEventKind::SectionCompleted { section: SectionId(1) },
                ProgressEventKind::SectionUnlocked { section: SectionId(2) },
            ]
        );
    }

    #[test]
    fn test_toggle_on_locked_task_is_rejected() {
        let mut engine = engine();
        complete_task(&mut engine, 1, 1);
        let before = engine.tree().clone();

        let err = engine.toggle_step(SectionId(1), TaskId(3), StepId(1)).unwrap_err();
        assert_eq!(err, ProgressError::TaskLocked { section: SectionId(1), task: TaskId(3) });
        assert!(err.is_locked());
        assert_eq!(engine.tree(), &before);
    }

    #[test]
    fn test_toggle_in_locked_section_is_rejected() {
        let mut engine = engine();
        let before = engine.tree().clone();

        // Task 5 has no prerequisite but its section is still locked.
        let err = engine.toggle_step(SectionId(2), TaskId(5), StepId(1)).unwrap_err();
        assert_eq!(err, ProgressError::SectionLocked(SectionId(2)));
        assert_eq!(engine.tree(), &before);
    }

    #[test]
    fn test_unresolved_ids_are_rejected() {
        let mut engine = engine();
        let before = engine.tree().clone();

        let cases = [
            (9, 1, 1, ProgressError::SectionNotFound(SectionId(9))),
            (1, 5, 1, ProgressError::TaskNotFound { section: SectionId(1), task: TaskId(5) }),
            (
                1,
                1,
                9,
                ProgressError::StepNotFound {
                    section: SectionId(1),
                    task: TaskId(1),
                    step: StepId(9),
                },
            ),
        ];
        for (section, task, step, expected) in cases {
            let err = engine
                .toggle_step(SectionId(section), TaskId(task), StepId(step))
                .unwrap_err();
            assert!(err.is_not_found());
            assert_eq!(err, expected);
        }
        assert_eq!(engine.tree(), &before);
    }

    #[test]
    fn test_unlock_survives_reopened_prerequisite() {
        let mut engine = engine();
        complete_task(&mut engine, 1, 1);
        assert!(!locked(&engine, 2));

        let outcome = engine.toggle_step(SectionId(1), TaskId(1), StepId(2)).unwrap();
        assert!(!outcome.step_completed());
        assert!(outcome.events.contains(&ProgressEventKind::TaskReopened {
            section: SectionId(1),
            task: TaskId(1),
        }));

        let task = engine.tree().task(SectionId(1), TaskId(1)).unwrap();
        assert!(!task.completed());
        assert!(!locked(&engine, 2));
        assert_eq!(
            engine.tree().task(SectionId(1), TaskId(2)).unwrap().state(),
            GateState::Unlocked
        );
    }

    #[test]
    fn test_section_unlock_survives_reopened_section() {
        let mut engine = engine();
        for task in 1..=4 {
            complete_task(&mut engine, 1, task);
        }

        let outcome = engine.toggle_step(SectionId(1), TaskId(4), StepId(1)).unwrap();
        assert!(outcome.events.contains(&ProgressEventKind::SectionReopened { section: SectionId(1) }));
        assert_eq!(engine.section_progress(SectionId(1)).unwrap().completed_tasks, 3);
        assert!(!engine.is_section_locked(SectionId(2)).unwrap());
    }

    #[test]
    fn test_double_toggle_restores_tree() {
        let mut engine = engine();
        complete_task(&mut engine, 1, 1);
        let before = engine.tree().clone();

        engine.toggle_step(SectionId(1), TaskId(2), StepId(2)).unwrap();
        engine.toggle_step(SectionId(1), TaskId(2), StepId(2)).unwrap();
        assert_eq!(engine.tree(), &before);
    }

    #[test]
    fn test_released_tree_keeps_gates_and_shape() {
        let mut engine = engine();
        complete_task(&mut engine, 1, 1);

        let mut tree = engine.into_tree();
        // Gate writes on a released tree can only open, never close.
        assert!(!tree.unlock_task(SectionId(1), TaskId(2)));
        assert!(tree.flip_step(SectionId(1), TaskId(1), StepId(1)).is_some());
        assert!(tree.flip_step(SectionId(1), TaskId(1), StepId(1)).is_some());

        let engine = ProgressEngine::new(tree);
        assert!(!locked(&engine, 2));
        let progress = engine.section_progress(SectionId(1)).unwrap();
        assert_eq!(progress.total_tasks, 4);
        assert_eq!(progress.completed_tasks, 1);
        assert_eq!(engine.tree().task(SectionId(1), TaskId(1)).unwrap().total_steps(), 3);
    }

    #[test]
    fn test_queries_against_prerequisites() {
        let mut engine = engine();
        {
            let sections = engine.tree().sections();
            let tasks = &sections[0].tasks;
            assert!(is_task_unlockable(&tasks[0], tasks));
            assert!(!is_task_unlockable(&tasks[1], tasks));
            assert!(is_section_unlockable(&sections[0], sections));
            assert!(!is_section_unlockable(&sections[1], sections));
            assert!(!is_section_complete(&sections[0]));
        }

        complete_task(&mut engine, 1, 1);
        let sections = engine.tree().sections();
        assert!(is_task_unlockable(&sections[0].tasks[1], &sections[0].tasks));
        // Prerequisite lookup is scoped to the slice handed in.
        assert!(!is_task_unlockable(&sections[0].tasks[1], &sections[1].tasks));
    }

    /// Deterministic walk over every step id, valid or gated, checking the
    /// invariants after each call.
    #[test]
    fn test_invariants_hold_over_random_walk() {
        let mut engine = engine();
        let targets: Vec<(SectionId, TaskId, StepId)> = engine
            .tree()
            .sections()
            .iter()
            .flat_map(|s| {
                s.tasks
                    .iter()
                    .flat_map(move |t| t.steps.iter().map(move |st| (s.id, t.id, st.id)))
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(0x2545_f491_4f6c_dd1d);
        let mut unlocked_tasks = std::collections::HashSet::new();
        let mut unlocked_sections = std::collections::HashSet::new();

        for _ in 0..4000 {
            let (section, task, step) = targets[rng.gen_range(0..targets.len())];

            let before = engine.tree().clone();
            match engine.toggle_step(section, task, step) {
                Ok(_) => {}
                Err(err) => {
                    assert!(err.is_locked());
                    assert_eq!(engine.tree(), &before);
                }
            }

            for s in engine.tree().sections() {
                if unlocked_sections.contains(&s.id) {
                    assert!(!s.locked, "section {} re-locked", s.id);
                }
                if !s.locked {
                    unlocked_sections.insert(s.id);
                }
                let progress = s.progress();
                assert_eq!(
                    progress.completed_tasks,
                    s.tasks.iter().filter(|t| t.steps.iter().all(|st| st.completed)).count()
                );
                assert_eq!(progress.total_tasks, s.tasks.len());

                for t in &s.tasks {
                    if unlocked_tasks.contains(&t.id) {
                        assert!(!t.locked, "task {} re-locked", t.id);
                    }
                    if !t.locked {
                        unlocked_tasks.insert(t.id);
                    }
                    assert_eq!(t.completed(), t.steps.iter().all(|st| st.completed));
                }
            }
        }
    }
}
