//! Registry persistence.
//!
//! Every write rewrites the whole document: serialize to a temporary sibling, read it
//! back, and only rename it over `registry.json` when the read-back matches. There is no
//! cross-process lock; two concurrent writers race and the last one wins.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::{Record, Registry, artifact_path};
use crate::error::PackError;
use crate::runtime::Runtime;

pub const DOCUMENT_NAME: &str = "registry.json";
const TEMP_NAME: &str = ".registry.json.tmp";

/// Owns the registry root directory and the document inside it.
pub struct RegistryStore<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
}

impl<'a, R: Runtime> RegistryStore<'a, R> {
    pub fn new(runtime: &'a R, root: PathBuf) -> Self {
        Self { runtime, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns: `<root>/registry.json`
    pub fn document_path(&self) -> PathBuf {
        self.root.join(DOCUMENT_NAME)
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(TEMP_NAME)
    }

    /// Returns: `<root>/<safeAlias>-<version>.tgz`
    pub fn artifact_path(&self, alias: &str, version: u64) -> PathBuf {
        artifact_path(&self.root, alias, version)
    }

    /// Load the registry, creating an empty document if none exists yet.
    #[tracing::instrument(skip(self))]
    pub fn load(&self) -> Result<Registry> {
        match self.read()? {
            Some(registry) => Ok(registry),
            None => {
                debug!("Initializing empty registry at {:?}", self.document_path());
                let registry = Registry::default();
                self.save(&registry)?;
                Ok(registry)
            }
        }
    }

    /// Read the registry without creating anything. `None` if the document is absent.
    pub fn read(&self) -> Result<Option<Registry>> {
        let path = self.document_path();
        if !self.runtime.exists(&path) {
            return Ok(None);
        }

        let content = self
            .runtime
            .read_to_string(&path)
            .with_context(|| format!("Failed to read registry {:?}", path))?;
        let registry = serde_json::from_str(&content).map_err(|e| PackError::DataCorruption {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(registry))
    }

    /// Validate-then-replace the whole document.
    ///
    /// On a failed read-back the temporary file is discarded and the stored document is
    /// left untouched.
    #[tracing::instrument(skip(self, registry))]
    pub fn save(&self, registry: &Registry) -> Result<()> {
        if !self.runtime.exists(&self.root) {
            self.runtime
                .create_dir_all(&self.root)
                .with_context(|| format!("Failed to create registry root {:?}", self.root))?;
        }

        let path = self.document_path();
        let temp = self.temp_path();
        let content = serde_json::to_string_pretty(registry)?;

        self.runtime
            .write(&temp, content.as_bytes())
            .with_context(|| format!("Failed to write {:?}", temp))?;

        if let Err(reason) = self.verify(&temp, registry) {
            if let Err(e) = self.runtime.remove_file(&temp) {
                warn!("Failed to discard {:?}: {}", temp, e);
            }
            return Err(PackError::DataCorruption { path, reason }.into());
        }

        self.runtime
            .rename(&temp, &path)
            .with_context(|| format!("Failed to replace registry {:?}", path))
    }

    fn verify(&self, temp: &Path, expected: &Registry) -> std::result::Result<(), String> {
        let written = self
            .runtime
            .read_to_string(temp)
            .map_err(|e| format!("read-back failed: {}", e))?;
        let parsed: Registry =
            serde_json::from_str(&written).map_err(|e| format!("read-back does not parse: {}", e))?;
        if &parsed != expected {
            return Err("read-back differs from the registry being saved".to_string());
        }
        Ok(())
    }

    /// Valid record for `alias`, without initializing storage.
    pub fn get_record(&self, alias: &str) -> Result<Option<Record>> {
        Ok(self
            .read()?
            .and_then(|registry| registry.get(alias).cloned()))
    }

    /// Replace or insert one record and save the whole document.
    #[tracing::instrument(skip(self))]
    pub fn upsert_record(&self, alias: &str, package_name: &str, version: u64) -> Result<()> {
        let mut registry = self.load()?;
        registry.insert(alias, Record::new(package_name, version));
        self.save(&registry)
    }

    /// All entries in alias order, including malformed ones.
    pub fn records(&self) -> Result<Vec<(String, Record)>> {
        Ok(self
            .read()?
            .map(|registry| {
                registry
                    .iter()
                    .map(|(alias, record)| (alias.clone(), record.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
