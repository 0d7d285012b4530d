//! The progression tree: sections own tasks, tasks own steps.
//!
//! Ownership is strictly hierarchical. Prerequisite references are ids that
//! are looked up in the owning collection when needed.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use serde::Serialize;
use crate::definition::{SectionDefinition, StepDefinition, TaskDefinition, TreeDefinition};
use crate::id::{SectionId, StepId, TaskId};
use crate::progress::SectionProgress;
use crate::section::Section;
use crate::task::{Step, Task};

/// Errors raised while building a tree from a definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// No sections at all
    #[error("tree has no sections")]
    EmptyTree,

    /// Two sections share an id
    #[error("duplicate section id {0}")]
    DuplicateSection(SectionId),

    /// Two tasks share an id somewhere in the tree
    #[error("duplicate task id {0}")]
    DuplicateTask(TaskId),

    /// Two steps of one task share an id
    #[error("duplicate step id {step} in task {task}")]
    DuplicateStep {
        /// Owning task
        task: TaskId,
        /// Repeated step id
        step: StepId,
    },

    /// A section without tasks would be complete from the start
    #[error("section {0} has no tasks")]
    EmptySection(SectionId),

    /// A task without steps could never be completed meaningfully
    #[error("task {0} has no steps")]
    EmptyTask(TaskId),

    /// Prerequisite task is not in the same section
    #[error("task {task} requires task {required}, which is not in the same section")]
    UnknownRequiredTask {
        /// Dependent task
        task: TaskId,
        /// Missing prerequisite
        required: TaskId,
    },

    /// Prerequisite section does not exist
    #[error("section {section} requires unknown section {required}")]
    UnknownRequiredSection {
        /// Dependent section
        section: SectionId,
        /// Missing prerequisite
        required: SectionId,
    },

    /// Task prerequisites form a cycle
    #[error("circular task prerequisites: {0:?}")]
    TaskCycle(Vec<TaskId>),

    /// Section prerequisites form a cycle
    #[error("circular section prerequisites: {0:?}")]
    SectionCycle(Vec<SectionId>),
}

/// The full Section → Task → Step hierarchy with its progress state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressTree {
    sections: Vec<Section>,
}

impl ProgressTree {
    /// Build a fresh tree from a definition.
    ///
    /// Every step starts incomplete. Tasks and sections with a prerequisite
    /// start locked, everything else starts unlocked.
    pub fn from_definition(def: &TreeDefinition) -> Result<Self, TreeError> {
        validate(def)?;

        let sections = def.sections.iter().map(build_section).collect();
        Ok(Self { sections })
    }

    /// Static definition of this tree, with progress dropped.
    pub fn to_definition(&self) -> TreeDefinition {
        TreeDefinition {
            sections: self
                .sections
                .iter()
                .map(|section| SectionDefinition {
                    id: section.id,
                    title: section.title.clone(),
                    description: section.description.clone(),
                    required_section_id: section.required_section_id,
                    tasks: section
                        .tasks
                        .iter()
                        .map(|task| TaskDefinition {
                            id: task.id,
                            title: task.title.clone(),
                            description: task.description.clone(),
                            date: task.date.clone(),
                            required_task_id: task.required_task_id,
                            documents: task.documents.clone(),
                            steps: task
                                .steps
                                .iter()
                                .map(|step| StepDefinition {
                                    id: step.id,
                                    text: step.text.clone(),
                                    description: step.description.clone(),
                                    validation: step.validation.clone(),
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Sections in sequence order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Find a section by id.
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Sequence position of a section.
    pub fn position(&self, id: SectionId) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// Find a task by section and task id.
    pub fn task(&self, section: SectionId, task: TaskId) -> Option<&Task> {
        self.section(section)?.task(task)
    }

    /// Id of the first section. Construction guarantees one exists.
    pub fn first_section_id(&self) -> SectionId {
        self.sections[0].id
    }

    /// Read model for every section, in sequence order.
    pub fn progress(&self) -> Vec<SectionProgress> {
        self.sections.iter().map(Section::progress).collect()
    }

    /// Flip one step. Returns its new completion state, or `None` when the
    /// ids do not resolve. Gates are not checked here.
    pub fn flip_step(&mut self, section: SectionId, task: TaskId, step: StepId) -> Option<bool> {
        let step = self
            .sections
            .iter_mut()
            .find(|s| s.id == section)?
            .tasks
            .iter_mut()
            .find(|t| t.id == task)?
            .steps
            .iter_mut()
            .find(|s| s.id == step)?;
        step.completed = !step.completed;
        Some(step.completed)
    }

    /// Open a task's gate. Returns `true` only if it was locked before.
    /// Gates never close again.
    pub fn unlock_task(&mut self, section: SectionId, task: TaskId) -> bool {
        let Some(task) = self
            .sections
            .iter_mut()
            .find(|s| s.id == section)
            .and_then(|s| s.tasks.iter_mut().find(|t| t.id == task))
        else {
            return false;
        };
        std::mem::replace(&mut task.locked, false)
    }

    /// Open a section's gate. Returns `true` only if it was locked before.
    pub fn unlock_section(&mut self, section: SectionId) -> bool {
        match self.sections.iter_mut().find(|s| s.id == section) {
            Some(section) => std::mem::replace(&mut section.locked, false),
            None => false,
        }
    }
}

fn build_section(def: &SectionDefinition) -> Section {
    Section {
        id: def.id,
        title: def.title.clone(),
        description: def.description.clone(),
        tasks: def.tasks.iter().map(build_task).collect(),
        locked: def.required_section_id.is_some(),
        required_section_id: def.required_section_id,
    }
}

fn build_task(def: &TaskDefinition) -> Task {
    Task {
        id: def.id,
        title: def.title.clone(),
        description: def.description.clone(),
        date: def.date.clone(),
        documents: def.documents.clone(),
        steps: def
            .steps
            .iter()
            .map(|step| Step {
                id: step.id,
                text: step.text.clone(),
                description: step.description.clone(),
                validation: step.validation.clone(),
                completed: false,
            })
            .collect(),
        locked: def.required_task_id.is_some(),
        required_task_id: def.required_task_id,
    }
}

fn validate(def: &TreeDefinition) -> Result<(), TreeError> {
    if def.sections.is_empty() {
        return Err(TreeError::EmptyTree);
    }

    let mut section_ids = HashSet::new();
    let mut task_ids = HashSet::new();
    for section in &def.sections {
        if !section_ids.insert(section.id) {
            return Err(TreeError::DuplicateSection(section.id));
        }
        if section.tasks.is_empty() {
            return Err(TreeError::EmptySection(section.id));
        }
        for task in &section.tasks {
            if !task_ids.insert(task.id) {
                return Err(TreeError::DuplicateTask(task.id));
            }
            if task.steps.is_empty() {
                return Err(TreeError::EmptyTask(task.id));
            }
            let mut step_ids = HashSet::new();
            for step in &task.steps {
                if !step_ids.insert(step.id) {
                    return Err(TreeError::DuplicateStep { task: task.id, step: step.id });
                }
            }
        }
    }

    let section_requirements: HashMap<SectionId, Option<SectionId>> = def
        .sections
        .iter()
        .map(|s| (s.id, s.required_section_id))
        .collect();

    for section in &def.sections {
        if let Some(required) = section.required_section_id {
            if !section_requirements.contains_key(&required) {
                return Err(TreeError::UnknownRequiredSection { section: section.id, required });
            }
        }

        // Task prerequisites resolve within the owning section only.
        let task_requirements: HashMap<TaskId, Option<TaskId>> = section
            .tasks
            .iter()
            .map(|t| (t.id, t.required_task_id))
            .collect();

        for task in &section.tasks {
            if let Some(required) = task.required_task_id {
                if !task_requirements.contains_key(&required) {
                    return Err(TreeError::UnknownRequiredTask { task: task.id, required });
                }
            }
        }

        let order = section.tasks.iter().map(|t| t.id);
        if let Some(cycle) = find_cycle(order, |id| task_requirements.get(&id).copied().flatten()) {
            return Err(TreeError::TaskCycle(cycle));
        }
    }

    let order = def.sections.iter().map(|s| s.id);
    if let Some(cycle) = find_cycle(order, |id| section_requirements.get(&id).copied().flatten()) {
        return Err(TreeError::SectionCycle(cycle));
    }

    Ok(())
}

/// Walk single-prerequisite chains and return the first cycle found.
fn find_cycle<K, I, F>(starts: I, next: F) -> Option<Vec<K>>
where
    K: Copy + Eq + Hash,
    I: IntoIterator<Item = K>,
    F: Fn(K) -> Option<K>,
{
    let mut cleared: HashSet<K> = HashSet::new();

    for start in starts {
        let mut path: Vec<K> = Vec::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if cleared.contains(&id) {
                break;
            }
            if let Some(pos) = path.iter().position(|p| *p == id) {
                return Some(path[pos..].to_vec());
            }
            path.push(id);
            current = next(id);
        }

        cleared.extend(path);
    }

    None
}
