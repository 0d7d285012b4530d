//! Definition source abstraction.

use async_trait::async_trait;
use onboard_core::{ProgressTree, TreeDefinition, TreeError};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur while loading tree definitions.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Definition parsed but does not form a valid tree
    #[error("invalid tree: {0}")]
    InvalidTree(#[from] TreeError),
}

/// Where onboarding tree definitions come from.
///
/// Sources only ever hand out static definitions. Learner progress is
/// never read from or written to a source.
#[async_trait]
pub trait TreeSource: Send + Sync {
    /// Human-readable origin, used in logs.
    fn origin(&self) -> String;

    /// Load the raw definition.
    async fn load_definition(&self) -> Result<TreeDefinition>;

    /// Load the definition and build a fresh, validated tree from it.
    async fn load_tree(&self) -> Result<ProgressTree> {
        let def = self.load_definition().await?;
        let tree = ProgressTree::from_definition(&def)?;
        tracing::debug!(
            "Loaded {} sections from {}",
            tree.sections().len(),
            self.origin()
        );
        Ok(tree)
    }
}
