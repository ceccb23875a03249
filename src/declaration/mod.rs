//! Project declarations (`packrat.json`).
//!
//! A declaration states what a project publishes and/or consumes:
//!
//! ```json
//! { "alias": "ui/button", "directory": "dist", "packs": ["%eslint-config", "core"] }
//! ```

mod discovery;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PackError;
use crate::runtime::Runtime;

pub use discovery::find_declarations;

pub const DECLARATION_NAME: &str = "packrat.json";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    /// Publish intent.
    pub alias: Option<String>,
    /// Subdirectory to archive instead of the project root.
    pub directory: Option<String>,
    /// Consume intent, in install order.
    pub packs: Option<Vec<String>>,
}

impl Declaration {
    /// Returns: `<dir>/packrat.json`
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(DECLARATION_NAME)
    }

    pub fn is_publish_capable(&self) -> bool {
        self.alias.is_some()
    }

    pub fn is_consume_capable(&self) -> bool {
        self.packs.is_some()
    }

    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid declaration {:?}", path))
    }

    /// Load the declaration of `dir`, failing with `NoDeclaration` if there is none.
    pub fn load_in<R: Runtime>(runtime: &R, dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        if !runtime.exists(&path) {
            return Err(PackError::NoDeclaration(dir.to_path_buf()).into());
        }
        Self::load(runtime, &path)
    }
}
