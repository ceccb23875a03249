//! Path utility functions for normalization and home-relative references.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // If we can't pop (e.g., at root), keep the `..`
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => {
                result.push(component);
            }
        }
    }
    result
}

/// Express `path` relative to `home`, as `~/<rest>`.
///
/// For example, with home `/home/user` the artifact `/home/user/.packrat/lib-2.tgz`
/// becomes `~/.packrat/lib-2.tgz`.
///
/// Returns `None` if `path` is not under `home`.
pub fn home_relative(home: &Path, path: &Path) -> Option<String> {
    let path = normalize_path(path);
    let home = normalize_path(home);
    let rest = pathdiff::diff_paths(&path, &home)?;

    if rest.is_absolute()
        || rest
            .components()
            .any(|c| matches!(c, Component::ParentDir))
    {
        return None;
    }

    let rest = rest
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    Some(format!("~/{}", rest))
}

/// Expand a leading `~/` (or a bare `~`) against `home`.
/// Other paths are returned unchanged.
pub fn expand_home(home: &Path, reference: &str) -> PathBuf {
    if reference == "~" {
        home.to_path_buf()
    } else if let Some(rest) = reference.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(reference)
    }
}
