//! Error taxonomy for registry workflows.
//!
//! Workflows return `anyhow::Result`; the root cause of a fatal failure is one of these
//! variants, so callers can `downcast_ref::<PackError>()` to classify it.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    /// No alias given, only a marker, or one padded with whitespace.
    #[error("an alias is required")]
    MissingAlias,

    /// The project manifest is missing, unreadable or lacks a usable `name`.
    #[error("manifest error in {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// No `packrat.json` in a directory that was expected to carry one.
    #[error("no declaration found at {0}")]
    NoDeclaration(PathBuf),

    #[error("build step failed ({})", describe_code(.code))]
    BuildFailure { code: Option<i32> },

    #[error("archive step failed: {0}")]
    ArchiveFailure(String),

    #[error("install step failed ({})", describe_code(.code))]
    InstallFailure { code: Option<i32> },

    #[error("failed to move {from} to {to}: {reason}")]
    RelocationFailure {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    /// The registry document did not survive a write/read-back, or is unparsable on disk.
    #[error("registry document {path} is corrupt: {reason}")]
    DataCorruption { path: PathBuf, reason: String },

    #[error("alias '{0}' is not registered")]
    AliasNotFound(String),

    #[error("artifact {0} is missing from the registry")]
    ArtifactMissing(PathBuf),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Classify an error by the `PackError` it carries, either as root cause or as context.
pub fn pack_error(err: &anyhow::Error) -> Option<&PackError> {
    err.downcast_ref::<PackError>()
        .or_else(|| err.chain().find_map(|e| e.downcast_ref::<PackError>()))
}
