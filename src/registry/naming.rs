use std::path::{Path, PathBuf};

/// Extension of every stored artifact.
pub const ARCHIVE_EXTENSION: &str = ".tgz";

/// Filesystem-safe form of an alias: every `/` becomes `-`.
pub fn safe_name(alias: &str) -> String {
    alias.replace('/', "-")
}

/// `<safeAlias>-<version>.tgz`
pub fn artifact_file_name(alias: &str, version: u64) -> String {
    format!("{}-{}{}", safe_name(alias), version, ARCHIVE_EXTENSION)
}

/// `<root>/<safeAlias>-<version>.tgz`
pub fn artifact_path(root: &Path, alias: &str, version: u64) -> PathBuf {
    root.join(artifact_file_name(alias, version))
}
