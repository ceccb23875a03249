//! External command execution.

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};

use super::{CommandOutput, RealRuntime};

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_command_impl(
        &self,
        program: &str,
        args: &[String],
        dir: &Path,
    ) -> Result<CommandOutput> {
        debug!("Running {} {:?} in {}", program, args, dir.display());

        // stderr goes straight to the terminal
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("Failed to start '{}'", program))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
