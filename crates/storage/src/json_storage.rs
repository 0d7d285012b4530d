//! JSON file definition source.
//!
//! Reads a tree definition from a single JSON file. The file is only ever
//! read; progress is not written back.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use onboard_core::TreeDefinition;
use super::{Result, TreeSource};
use tokio::fs;
use tracing::debug;

/// File-based JSON definition source.
#[derive(Debug, Clone)]
pub struct JsonTreeSource {
    path: PathBuf,
}

impl JsonTreeSource {
    /// Create a source reading from `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the definition file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TreeSource for JsonTreeSource {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    async fn load_definition(&self) -> Result<TreeDefinition> {
        debug!("Reading tree definition from {}", self.path.display());
        let content = fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}
