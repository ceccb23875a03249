//! Registry data model and storage.
//!
//! The registry maps aliases to [`Record`]s and lives in a single JSON document
//! next to the artifacts it describes:
//!
//! ```text
//! <root>/
//!   registry.json
//!   <safeAlias>-<version>.tgz
//! ```

mod naming;
mod store;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use naming::{ARCHIVE_EXTENSION, artifact_file_name, artifact_path, safe_name};
pub use store::{DOCUMENT_NAME, RegistryStore};

/// Registry entry for one alias.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub version: u64,
}

impl Record {
    pub fn new(package_name: impl Into<String>, version: u64) -> Self {
        Self {
            package_name: package_name.into(),
            version,
        }
    }

    /// A record is usable only with a package name and a version of at least 1.
    pub fn is_valid(&self) -> bool {
        !self.package_name.is_empty() && self.version >= 1
    }
}

/// The whole alias → record mapping, serialized with keys in sorted order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Registry {
    records: BTreeMap<String, Record>,
}

impl Registry {
    /// Valid record for `alias`; malformed entries read as absent.
    pub fn get(&self, alias: &str) -> Option<&Record> {
        self.records.get(alias).filter(|r| r.is_valid())
    }

    /// Replace or insert the record for `alias`.
    pub fn insert(&mut self, alias: impl Into<String>, record: Record) {
        self.records.insert(alias.into(), record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Record)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
