//! Publish use case - build, archive, relocate and register one artifact.
//!
//! Steps run strictly in order and the first fatal error aborts the rest:
//!
//! 1. Validate the alias and read the package name from the manifest
//! 2. Build in the project root
//! 3. Archive in the project root or the declared subdirectory
//! 4. Relocate the archive to `<root>/<safeAlias>-<version>.tgz`
//! 5. Register the new version
//!
//! A failure in step 4 leaves the registry at the previous version. A failure in step 5
//! leaves the relocated artifact on disk with the registry still at the previous version.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::alias::AliasSpec;
use crate::config::Config;
use crate::error::PackError;
use crate::manifest::Manifest;
use crate::registry::RegistryStore;
use crate::runtime::{Runtime, ScopedDir};
use crate::toolchain::Toolchain;

/// Result of one publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The alias carried the ignore marker; nothing was built or registered.
    Skipped { alias: String },
    Published {
        alias: String,
        package_name: String,
        version: u64,
        artifact: PathBuf,
    },
}

pub struct PublishUseCase<'a, R: Runtime> {
    runtime: &'a R,
    store: RegistryStore<'a, R>,
    toolchain: Toolchain<'a, R>,
}

impl<'a, R: Runtime> PublishUseCase<'a, R> {
    pub fn new(runtime: &'a R, config: &Config) -> Self {
        Self {
            runtime,
            store: RegistryStore::new(runtime, config.root.clone()),
            toolchain: Toolchain::new(runtime, config.commands.clone()),
        }
    }

    /// Publish the project at `project_root` under `alias`.
    #[tracing::instrument(skip(self))]
    pub fn publish(
        &self,
        project_root: &Path,
        alias: &str,
        subdirectory: Option<&str>,
    ) -> Result<PublishOutcome> {
        let spec = AliasSpec::for_publish(alias)?;
        if spec.ignored {
            info!("Skipping ignored alias {}", spec);
            return Ok(PublishOutcome::Skipped { alias: spec.base });
        }
        let alias = spec.base.as_str();

        let package_name = Manifest::new(self.runtime, project_root).read_name()?;
        debug!("Publishing {} as {}", package_name, alias);

        self.toolchain.build(project_root)?;

        let produced = self.archive(project_root, subdirectory)?;

        let (version, artifact) = self.relocate(alias, &produced)?;

        self.store
            .upsert_record(alias, &package_name, version)
            .with_context(|| format!("Failed to register {} version {}", alias, version))?;

        info!("Published {} ({}) version {}", alias, package_name, version);
        Ok(PublishOutcome::Published {
            alias: alias.to_string(),
            package_name,
            version,
            artifact,
        })
    }

    /// Run the archive step from inside the archive directory.
    fn archive(&self, project_root: &Path, subdirectory: Option<&str>) -> Result<PathBuf> {
        let dir = match subdirectory {
            Some(sub) => {
                let dir = project_root.join(sub);
                if !self.runtime.is_dir(&dir) {
                    return Err(PackError::DirectoryNotFound(dir).into());
                }
                dir
            }
            None => project_root.to_path_buf(),
        };

        let _cwd = ScopedDir::enter(self.runtime, &dir)?;
        self.toolchain.pack(&dir)
    }

    /// Drop the superseded artifact and move the new one into the registry root.
    fn relocate(&self, alias: &str, produced: &Path) -> Result<(u64, PathBuf)> {
        let current = self
            .store
            .get_record(alias)?
            .map(|record| record.version)
            .unwrap_or(0);
        let version = current + 1;

        if current > 0 {
            let superseded = self.store.artifact_path(alias, current);
            if !self.runtime.exists(&superseded) {
                warn!("Superseded artifact {:?} was already gone", superseded);
            } else if let Err(e) = self.runtime.remove_file(&superseded) {
                warn!("Failed to remove superseded artifact {:?}: {}", superseded, e);
            }
        }

        let target = self.store.artifact_path(alias, version);
        self.move_file(produced, &target)
            .map_err(|e| PackError::RelocationFailure {
                from: produced.to_path_buf(),
                to: target.clone(),
                reason: format!("{:#}", e),
            })?;
        debug!("Moved {:?} to {:?}", produced, target);

        Ok((version, target))
    }

    fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        let root = self.store.root();
        if !self.runtime.exists(root) {
            self.runtime.create_dir_all(root)?;
        }

        if let Err(e) = self.runtime.rename(from, to) {
            // Rename cannot cross filesystems
            debug!("Rename failed ({}), copying instead", e);
            self.runtime.copy(from, to)?;
            if let Err(e) = self.runtime.remove_file(from) {
                warn!("Failed to remove {:?} after copying it: {}", from, e);
            }
        }
        Ok(())
    }
}
