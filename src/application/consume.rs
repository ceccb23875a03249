//! Consume use case - resolve an alias and install its latest artifact into a project.

use anyhow::Result;
use log::{debug, error, info, warn};
use std::path::Path;

use crate::alias::AliasSpec;
use crate::config::Config;
use crate::error::PackError;
use crate::manifest::{DependencyKind, Manifest};
use crate::registry::RegistryStore;
use crate::runtime::{Runtime, expand_home, home_relative};
use crate::toolchain::Toolchain;

const FILE_PREFIX: &str = "file:";

/// Result of consuming one alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The alias carried the ignore marker.
    Ignored { alias: String },
    /// The manifest already references the latest artifact.
    AlreadyInstalled { alias: String, version: u64 },
    Installed {
        alias: String,
        package_name: String,
        version: u64,
        dev: bool,
    },
}

/// Per-alias results of a batch consume.
#[derive(Debug, Default)]
pub struct ConsumeReport {
    pub outcomes: Vec<ConsumeOutcome>,
    pub failures: Vec<(String, anyhow::Error)>,
}

impl ConsumeReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fail if any alias failed, naming them.
    pub fn into_result(self) -> Result<Vec<ConsumeOutcome>> {
        if self.failures.is_empty() {
            return Ok(self.outcomes);
        }
        let names: Vec<&str> = self.failures.iter().map(|(a, _)| a.as_str()).collect();
        anyhow::bail!(
            "{} of {} package(s) failed: {}",
            names.len(),
            names.len() + self.outcomes.len(),
            names.join(", ")
        )
    }
}

pub struct ConsumeUseCase<'a, R: Runtime> {
    runtime: &'a R,
    store: RegistryStore<'a, R>,
    toolchain: Toolchain<'a, R>,
}

impl<'a, R: Runtime> ConsumeUseCase<'a, R> {
    pub fn new(runtime: &'a R, config: &Config) -> Self {
        Self {
            runtime,
            store: RegistryStore::new(runtime, config.root.clone()),
            toolchain: Toolchain::new(runtime, config.commands.clone()),
        }
    }

    /// Install the latest artifact of `alias_input` into the project at `project_root`.
    #[tracing::instrument(skip(self))]
    pub fn add(&self, project_root: &Path, alias_input: &str) -> Result<ConsumeOutcome> {
        let spec = AliasSpec::for_consume(alias_input)?;
        if spec.ignored {
            info!("Skipping ignored alias {}", spec);
            return Ok(ConsumeOutcome::Ignored { alias: spec.base });
        }
        let alias = spec.base.as_str();

        let record = self
            .store
            .get_record(alias)?
            .ok_or_else(|| PackError::AliasNotFound(alias.to_string()))?;
        let artifact = self.store.artifact_path(alias, record.version);
        let reference = self.file_reference(&artifact);

        let manifest = Manifest::new(self.runtime, project_root);
        if self.is_referenced(&manifest, &artifact, &reference)? {
            info!("{} version {} is already installed", alias, record.version);
            return Ok(ConsumeOutcome::AlreadyInstalled {
                alias: alias.to_string(),
                version: record.version,
            });
        }

        if !self.runtime.exists(&artifact) {
            return Err(PackError::ArtifactMissing(artifact).into());
        }

        self.toolchain
            .install(project_root, &artifact, spec.dev_only)?;

        let kind = if spec.dev_only {
            DependencyKind::Dev
        } else {
            DependencyKind::Regular
        };
        if let Err(e) = manifest.write_dependency(kind, &record.package_name, &reference) {
            warn!(
                "{} is installed but {:?} could not be updated: {:#}",
                record.package_name,
                manifest.path(),
                e
            );
        }

        info!("Installed {} version {}", alias, record.version);
        Ok(ConsumeOutcome::Installed {
            alias: alias.to_string(),
            package_name: record.package_name,
            version: record.version,
            dev: spec.dev_only,
        })
    }

    /// Consume every alias in order; one failure does not stop the others.
    pub fn add_all(&self, project_root: &Path, alias_inputs: &[String]) -> ConsumeReport {
        let mut report = ConsumeReport::default();
        for input in alias_inputs {
            match self.add(project_root, input) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    error!("Failed to add {}: {:#}", input, e);
                    report.failures.push((input.clone(), e));
                }
            }
        }
        report
    }

    /// `file:~/<path>` when the artifact lives under home, an absolute `file:` path otherwise.
    fn file_reference(&self, artifact: &Path) -> String {
        let relative = self
            .runtime
            .home_dir()
            .and_then(|home| home_relative(&home, artifact));
        match relative {
            Some(relative) => format!("{}{}", FILE_PREFIX, relative),
            None => format!("{}{}", FILE_PREFIX, artifact.display()),
        }
    }

    /// Whether any dependency section already points at `artifact`.
    fn is_referenced(
        &self,
        manifest: &Manifest<'_, R>,
        artifact: &Path,
        reference: &str,
    ) -> Result<bool> {
        if !manifest.exists() {
            return Ok(false);
        }
        let home = self.runtime.home_dir();
        let file_name = artifact.file_name();

        for kind in DependencyKind::ALL {
            for (name, spec) in manifest.dependency_section(kind)? {
                if spec == reference {
                    debug!("{} in {} matches {}", name, kind.section(), reference);
                    return Ok(true);
                }
                let Some(path) = spec.strip_prefix(FILE_PREFIX) else {
                    continue;
                };
                let path = match &home {
                    Some(home) => expand_home(home, path),
                    None => path.into(),
                };
                if path == artifact || (file_name.is_some() && path.file_name() == file_name) {
                    debug!("{} in {} points at {:?}", name, kind.section(), artifact);
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
