//! Scoped working directory changes.

use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::Runtime;

/// RAII guard that changes the working directory and restores the original one when dropped.
///
/// Restoration happens on every exit path, including `?` early returns and unwinding.
pub struct ScopedDir<'a, R: Runtime> {
    runtime: &'a R,
    original: PathBuf,
}

impl<'a, R: Runtime> ScopedDir<'a, R> {
    /// Remember the current directory and change into `dir`.
    pub fn enter(runtime: &'a R, dir: &Path) -> Result<Self> {
        let original = runtime.current_dir()?;
        runtime.set_current_dir(dir)?;
        debug!("Entered {} (from {})", dir.display(), original.display());
        Ok(Self { runtime, original })
    }

    pub fn original(&self) -> &Path {
        &self.original
    }
}

impl<R: Runtime> Drop for ScopedDir<'_, R> {
    fn drop(&mut self) {
        if let Err(e) = self.runtime.set_current_dir(&self.original) {
            warn!(
                "Failed to restore working directory {}: {}",
                self.original.display(),
                e
            );
        } else {
            debug!("Restored working directory {}", self.original.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::Sequence;
    use mockall::predicate::eq;

    #[test]
    fn test_scoped_dir_restores_on_drop() {
        let mut runtime = MockRuntime::new();
        let mut seq = Sequence::new();

        runtime
            .expect_current_dir()
            .times(1)
            .returning(|| Ok(PathBuf::from("/work")));
        runtime
            .expect_set_current_dir()
            .with(eq(PathBuf::from("/work/dist")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        runtime
            .expect_set_current_dir()
            .with(eq(PathBuf::from("/work")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        {
            let guard = ScopedDir::enter(&runtime, Path::new("/work/dist")).unwrap();
            assert_eq!(guard.original(), Path::new("/work"));
        }
    }

    #[test]
    fn test_scoped_dir_restores_on_early_return() {
        fn failing_step<R: Runtime>(runtime: &R) -> Result<()> {
            let _guard = ScopedDir::enter(runtime, Path::new("/work/pkg"))?;
            anyhow::bail!("step failed");
        }

        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Ok(PathBuf::from("/work")));
        runtime
            .expect_set_current_dir()
            .with(eq(PathBuf::from("/work/pkg")))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_set_current_dir()
            .with(eq(PathBuf::from("/work")))
            .times(1)
            .returning(|_| Ok(()));

        assert!(failing_step(&runtime).is_err());
    }

    #[test]
    fn test_scoped_dir_enter_failure_does_not_restore() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Ok(PathBuf::from("/work")));
        runtime
            .expect_set_current_dir()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("no such directory")));

        assert!(ScopedDir::enter(&runtime, Path::new("/missing")).is_err());
    }
}
