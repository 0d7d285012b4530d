//! Built-in onboarding catalog.

use async_trait::async_trait;
use onboard_core::TreeDefinition;
use super::{Result, TreeSource};

const ONBOARDING_JSON: &str = include_str!("../data/onboarding.json");

/// The default onboarding program shipped with the crate.
///
/// Two sections: "Getting Started" (tasks 1-4, chained) and
/// "Learning Resources" (tasks 5-7, chained), the second requiring the first.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTreeSource;

impl BuiltinTreeSource {
    /// Create the built-in source.
    pub fn new() -> Self {
        Self
    }

    /// Parse the embedded catalog.
    pub fn definition() -> Result<TreeDefinition> {
        Ok(serde_json::from_str(ONBOARDING_JSON)?)
    }
}

#[async_trait]
impl TreeSource for BuiltinTreeSource {
    fn origin(&self) -> String {
        "built-in onboarding catalog".to_string()
    }

    async fn load_definition(&self) -> Result<TreeDefinition> {
        Self::definition()
    }
}
