//! Discovery use case - find publish declarations under a tree and publish them in turn.
//!
//! Entries are visited one at a time: the working directory and the registry document
//! are process-wide, so publishes never overlap.

use anyhow::Result;
use log::{error, warn};
use std::path::{Path, PathBuf};

use super::publish::{PublishOutcome, PublishUseCase};
use crate::config::Config;
use crate::declaration::{Declaration, find_declarations};
use crate::runtime::{Runtime, ScopedDir};
use crate::toolchain::Toolchain;

/// A directory whose declaration publishes an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub alias: String,
    pub dir: PathBuf,
    pub subdirectory: Option<String>,
}

/// What a scan found.
#[derive(Debug, Default)]
pub struct Scan {
    /// Every declaration file, publish-capable or not.
    pub declarations: Vec<PathBuf>,
    pub candidates: Vec<Candidate>,
}

/// Results of publishing every candidate.
#[derive(Debug, Default)]
pub struct DiscoverReport {
    pub outcomes: Vec<PublishOutcome>,
    pub failures: Vec<(Candidate, anyhow::Error)>,
}

pub struct DiscoverUseCase<'a, R: Runtime> {
    runtime: &'a R,
    config: &'a Config,
    publish: PublishUseCase<'a, R>,
    toolchain: Toolchain<'a, R>,
}

impl<'a, R: Runtime> DiscoverUseCase<'a, R> {
    pub fn new(runtime: &'a R, config: &'a Config) -> Self {
        Self {
            runtime,
            config,
            publish: PublishUseCase::new(runtime, config),
            toolchain: Toolchain::new(runtime, config.commands.clone()),
        }
    }

    /// Collect every declaration under `root` and the publish candidates among them.
    #[tracing::instrument(skip(self))]
    pub fn scan(&self, root: &Path) -> Result<Scan> {
        let declarations = find_declarations(self.runtime, root, &self.config.excludes)?;

        let mut candidates = Vec::new();
        for path in &declarations {
            let declaration = match Declaration::load(self.runtime, path) {
                Ok(declaration) => declaration,
                Err(e) => {
                    warn!("Ignoring {:?}: {:#}", path, e);
                    continue;
                }
            };
            let (Some(alias), Some(dir)) = (declaration.alias, path.parent()) else {
                continue;
            };
            candidates.push(Candidate {
                alias,
                dir: dir.to_path_buf(),
                subdirectory: declaration.directory,
            });
        }

        Ok(Scan {
            declarations,
            candidates,
        })
    }

    /// Publish each candidate in order, continuing past failures.
    ///
    /// With `install_first`, dependencies are installed before each publish; an install
    /// failure is only a warning.
    #[tracing::instrument(skip(self, candidates))]
    pub fn publish_all(&self, candidates: &[Candidate], install_first: bool) -> DiscoverReport {
        let mut report = DiscoverReport::default();
        for candidate in candidates {
            match self.publish_one(candidate, install_first) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    error!(
                        "Failed to publish {} from {}: {:#}",
                        candidate.alias,
                        candidate.dir.display(),
                        e
                    );
                    report.failures.push((candidate.clone(), e));
                }
            }
        }
        report
    }

    fn publish_one(&self, candidate: &Candidate, install_first: bool) -> Result<PublishOutcome> {
        let _cwd = ScopedDir::enter(self.runtime, &candidate.dir)?;

        if install_first && let Err(e) = self.toolchain.install_dependencies(&candidate.dir) {
            warn!(
                "Installing dependencies in {} failed, publishing anyway: {:#}",
                candidate.dir.display(),
                e
            );
        }

        self.publish.publish(
            &candidate.dir,
            &candidate.alias,
            candidate.subdirectory.as_deref(),
        )
    }
}
