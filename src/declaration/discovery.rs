use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use super::DECLARATION_NAME;
use crate::runtime::Runtime;

/// Dependency cache directory, never descended into.
pub const DEPENDENCY_CACHE_DIR: &str = "node_modules";

/// Find every `packrat.json` under `root`, depth first in directory order.
///
/// Directories named `node_modules`, or whose name matches one of `excludes`, are pruned.
/// Symlinked directories are never followed, so each declaration is found at most once.
#[tracing::instrument(skip(runtime, excludes))]
pub fn find_declarations<R: Runtime>(
    runtime: &R,
    root: &Path,
    excludes: &[glob::Pattern],
) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    if !runtime.is_dir(root) {
        return Ok(found);
    }

    scan_dir(runtime, root, excludes, &mut found)?;
    Ok(found)
}

fn scan_dir<R: Runtime>(
    runtime: &R,
    dir: &Path,
    excludes: &[glob::Pattern],
    found: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in runtime.read_dir(dir)? {
        let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if runtime.is_dir(&entry) {
            if is_excluded(name, excludes) {
                debug!("Skipping {:?}", entry);
                continue;
            }
            if runtime.is_symlink(&entry) {
                debug!("Not following symlinked directory {:?}", entry);
                continue;
            }
            scan_dir(runtime, &entry, excludes, found)?;
        } else if name == DECLARATION_NAME {
            found.push(entry);
        }
    }
    Ok(())
}

fn is_excluded(name: &str, excludes: &[glob::Pattern]) -> bool {
    name == DEPENDENCY_CACHE_DIR || excludes.iter().any(|p| p.matches(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use tempfile::tempdir;

    #[test]
    fn test_find_declarations_nested() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        for sub in ["a", "b/c", "a/node_modules/dep", "b/.git"] {
            std::fs::create_dir_all(root.join(sub)).unwrap();
        }
        for file in [
            "packrat.json",
            "a/packrat.json",
            "b/c/packrat.json",
            "a/node_modules/dep/packrat.json",
            "b/.git/packrat.json",
            "b/package.json",
        ] {
            std::fs::write(root.join(file), "{}").unwrap();
        }

        let excludes = vec![glob::Pattern::new(".git").unwrap()];
        let found = find_declarations(&RealRuntime, root, &excludes).unwrap();

        assert_eq!(
            found,
            vec![
                root.join("a/packrat.json"),
                root.join("b/c/packrat.json"),
                root.join("packrat.json"),
            ]
        );
    }

    #[test]
    fn test_find_declarations_glob_exclude() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("build-cache/x")).unwrap();
        std::fs::write(root.join("build-cache/x/packrat.json"), "{}").unwrap();

        let none: Vec<glob::Pattern> = vec![];
        assert_eq!(find_declarations(&RealRuntime, root, &none).unwrap().len(), 1);

        let excludes = vec![glob::Pattern::new("*-cache").unwrap()];
        assert!(
            find_declarations(&RealRuntime, root, &excludes)
                .unwrap()
                .is_empty()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_find_declarations_skips_symlinked_directories() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("a")).unwrap();
        std::fs::write(root.join("a/packrat.json"), r#"{ "alias": "a" }"#).unwrap();
        // Loop back to the root, and a second path to the same project
        std::os::unix::fs::symlink("..", root.join("a/up")).unwrap();
        std::os::unix::fs::symlink(root.join("a"), root.join("a-again")).unwrap();

        let found = find_declarations(&RealRuntime, root, &[]).unwrap();

        assert_eq!(found, vec![root.join("a/packrat.json")]);
    }

    #[test]
    fn test_find_declarations_missing_root() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/non-existent");

        runtime
            .expect_is_dir()
            .with(eq(root.clone()))
            .returning(|_| false);

        let found = find_declarations(&runtime, &root, &[]).unwrap();
        assert!(found.is_empty());
    }
}
