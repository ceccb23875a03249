//! `package.json` reader/writer.
//!
//! Only the fields the registry cares about are interpreted; everything else in the
//! document is carried through a rewrite untouched and in its original key order.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::PackError;
use crate::runtime::Runtime;

pub const MANIFEST_NAME: &str = "package.json";

/// Manifest dependency sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Regular,
    Dev,
    Peer,
    Optional,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 4] = [
        DependencyKind::Regular,
        DependencyKind::Dev,
        DependencyKind::Peer,
        DependencyKind::Optional,
    ];

    pub fn section(self) -> &'static str {
        match self {
            DependencyKind::Regular => "dependencies",
            DependencyKind::Dev => "devDependencies",
            DependencyKind::Peer => "peerDependencies",
            DependencyKind::Optional => "optionalDependencies",
        }
    }
}

/// The manifest of one project directory.
pub struct Manifest<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> Manifest<'a, R> {
    pub fn new(runtime: &'a R, project_root: &Path) -> Self {
        Self {
            runtime,
            path: project_root.join(MANIFEST_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.runtime.exists(&self.path)
    }

    fn error(&self, reason: impl Into<String>) -> PackError {
        PackError::Manifest {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn load(&self) -> Result<Map<String, Value>> {
        if !self.exists() {
            return Err(self.error("file not found").into());
        }
        let content = self
            .runtime
            .read_to_string(&self.path)
            .map_err(|e| self.error(e.to_string()))?;
        match serde_json::from_str(&content) {
            Ok(Value::Object(doc)) => Ok(doc),
            Ok(_) => Err(self.error("top level is not an object").into()),
            Err(e) => Err(self.error(e.to_string()).into()),
        }
    }

    /// The non-empty `name` field.
    pub fn read_name(&self) -> Result<String> {
        let doc = self.load()?;
        match doc.get("name").and_then(Value::as_str).map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(self.error("missing \"name\" field").into()),
        }
    }

    /// String entries of one dependency section; empty when the section is absent.
    pub fn dependency_section(&self, kind: DependencyKind) -> Result<BTreeMap<String, String>> {
        let doc = self.load()?;
        Ok(doc
            .get(kind.section())
            .and_then(Value::as_object)
            .map(|section| {
                section
                    .iter()
                    .filter_map(|(name, spec)| Some((name.clone(), spec.as_str()?.to_string())))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Point `package_name` at `reference` in the given section, creating the section if needed.
    #[tracing::instrument(skip(self))]
    pub fn write_dependency(
        &self,
        kind: DependencyKind,
        package_name: &str,
        reference: &str,
    ) -> Result<()> {
        let mut doc = self.load()?;
        let section = doc
            .entry(kind.section())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(section) = section.as_object_mut() else {
            return Err(self.error(format!("\"{}\" is not an object", kind.section())).into());
        };
        section.insert(package_name.to_string(), Value::String(reference.to_string()));

        let mut content = serde_json::to_string_pretty(&Value::Object(doc))?;
        content.push('\n');
        self.runtime
            .write(&self.path, content.as_bytes())
            .with_context(|| format!("Failed to write {:?}", self.path))
    }
}
