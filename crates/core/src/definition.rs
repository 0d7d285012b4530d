//! Tree definitions - the static shape of an onboarding program.
//!
//! A definition carries no progress. It is what sources load and what
//! `export` writes back out.

use serde::{Deserialize, Serialize};
use crate::id::{SectionId, StepId, TaskId};
use crate::task::Document;

/// Static description of a whole progression tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeDefinition {
    /// Sections, in sequence order
    pub sections: Vec<SectionDefinition>,
}

/// Static description of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDefinition {
    /// Unique identifier
    pub id: SectionId,

    /// Section title
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Prerequisite section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_section_id: Option<SectionId>,

    /// Tasks, in display order
    #[serde(default)]
    pub tasks: Vec<TaskDefinition>,
}

/// Static description of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    /// Identifier, unique across the tree
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Optional due date label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Prerequisite task in the same section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_task_id: Option<TaskId>,

    /// Related documents
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<Document>,

    /// Steps, in display order
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

/// Static description of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Identifier, unique within the task
    pub id: StepId,

    /// Short label
    pub text: String,

    /// Longer explanation
    #[serde(default)]
    pub description: String,

    /// Requirement strings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_uses_camel_case_references() {
        let json = r#"{
            "sections": [{
                "id": 2,
                "title": "Learning Resources",
                "requiredSectionId": 1,
                "tasks": [{
                    "id": 6,
                    "title": "Read documentation",
                    "requiredTaskId": 5,
                    "steps": [{ "id": 1, "text": "Review getting started guide" }]
                }]
            }]
        }"#;

        let def: TreeDefinition = serde_json::from_str(json).unwrap();
        let section = &def.sections[0];
        assert_eq!(section.required_section_id, Some(SectionId(1)));
        assert_eq!(section.description, "");
        assert_eq!(section.tasks[0].required_task_id, Some(TaskId(5)));
        assert!(section.tasks[0].documents.is_empty());
        assert!(section.tasks[0].steps[0].validation.is_empty());
    }

    #[test]
    fn test_definition_omits_absent_references() {
        let def = TaskDefinition {
            id: TaskId(1),
            title: "Set up your profile".to_string(),
            description: String::new(),
            date: None,
            required_task_id: None,
            documents: vec![],
            steps: vec![],
        };
        let json = serde_json::to_string(&def).unwrap();
        assert!(!json.contains("requiredTaskId"));
        assert!(!json.contains("documents"));
    }
}
