//! External build, archive and install steps.
//!
//! Every step is a blocking command run through the [`Runtime`]; a non-zero exit is
//! reported as the matching [`PackError`].

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::config::{CommandLine, ToolchainCommands};
use crate::error::PackError;
use crate::runtime::{CommandOutput, Runtime};

pub struct Toolchain<'a, R: Runtime> {
    runtime: &'a R,
    commands: ToolchainCommands,
}

impl<'a, R: Runtime> Toolchain<'a, R> {
    pub fn new(runtime: &'a R, commands: ToolchainCommands) -> Self {
        Self { runtime, commands }
    }

    fn run(&self, command: &CommandLine, extra: &[String], dir: &Path) -> Result<CommandOutput> {
        let mut args = command.args.clone();
        args.extend_from_slice(extra);
        self.runtime.run_command(&command.program, &args, dir)
    }

    /// Run the build command in the project root.
    #[tracing::instrument(skip(self))]
    pub fn build(&self, project_root: &Path) -> Result<()> {
        info!("Building {}", project_root.display());
        let output = self
            .run(&self.commands.build, &[], project_root)
            .context(PackError::BuildFailure { code: None })?;
        if !output.success() {
            return Err(PackError::BuildFailure { code: output.code }.into());
        }
        Ok(())
    }

    /// Run the pack command in `dir` and return the archive it reports.
    ///
    /// The produced file is the last non-empty stdout line, relative to `dir` unless absolute.
    #[tracing::instrument(skip(self))]
    pub fn pack(&self, dir: &Path) -> Result<PathBuf> {
        info!("Packing {}", dir.display());
        let output = self
            .run(&self.commands.pack, &[], dir)
            .map_err(|e| PackError::ArchiveFailure(format!("{:#}", e)))?;
        if !output.success() {
            return Err(PackError::ArchiveFailure(format!(
                "'{}' exited with {:?}",
                self.commands.pack.program, output.code
            ))
            .into());
        }

        let reported = output
            .stdout
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .ok_or_else(|| PackError::ArchiveFailure("no archive file reported".to_string()))?;

        let archive = dir.join(reported);
        debug!("Pack reported {:?}", archive);
        if !self.runtime.exists(&archive) {
            return Err(PackError::ArchiveFailure(format!(
                "reported archive {} does not exist",
                archive.display()
            ))
            .into());
        }
        Ok(archive)
    }

    /// Install `artifact` into the project at `project_root`.
    #[tracing::instrument(skip(self))]
    pub fn install(&self, project_root: &Path, artifact: &Path, dev: bool) -> Result<()> {
        let mut extra = vec![artifact.to_string_lossy().into_owned()];
        if dev {
            extra.push(self.commands.dev_flag.clone());
        }
        let output = self
            .run(&self.commands.install, &extra, project_root)
            .context(PackError::InstallFailure { code: None })?;
        if !output.success() {
            return Err(PackError::InstallFailure { code: output.code }.into());
        }
        Ok(())
    }

    /// Install the declared dependencies of the project at `dir`.
    #[tracing::instrument(skip(self))]
    pub fn install_dependencies(&self, dir: &Path) -> Result<()> {
        info!("Installing dependencies in {}", dir.display());
        let output = self.run(&self.commands.install_deps, &[], dir)?;
        if !output.success() {
            anyhow::bail!(
                "'{}' exited with {:?} in {}",
                self.commands.install_deps.program,
                output.code,
                dir.display()
            );
        }
        Ok(())
    }
}
