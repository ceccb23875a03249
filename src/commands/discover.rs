use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::{
    application::{Candidate, DiscoverUseCase},
    config::Config,
    runtime::Runtime,
};

use super::print_publish_outcome;

#[derive(Debug, Default, Clone)]
pub struct DiscoverArgs {
    /// Directory to scan; the current directory when absent.
    pub root: Option<PathBuf>,
    /// Install each project's dependencies before publishing it.
    pub install: bool,
    /// Skip the confirmation prompt.
    pub yes: bool,
}

/// Find every publishable declaration under a directory and publish them one by one.
#[tracing::instrument(skip(runtime, config))]
pub fn discover<R: Runtime>(runtime: &R, config: &Config, args: &DiscoverArgs) -> Result<()> {
    // Candidate paths must survive entering each candidate's directory
    let root = match &args.root {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => runtime.current_dir()?.join(path),
        None => runtime.current_dir()?,
    };
    debug!("Discovering declarations under {:?}", root);

    let usecase = DiscoverUseCase::new(runtime, config);
    let scan = usecase.scan(&root)?;

    if scan.declarations.is_empty() {
        println!("No declarations found under {}.", root.display());
        return Ok(());
    }
    if scan.candidates.is_empty() {
        println!(
            "Found {} declaration(s) under {}, none of them publishes a package.",
            scan.declarations.len(),
            root.display()
        );
        return Ok(());
    }

    if !args.yes {
        show_publish_plan(&root, &scan.candidates, args.install);
        if !runtime.confirm("Proceed with publishing?")? {
            println!("Publishing cancelled.");
            return Ok(());
        }
    }

    let report = usecase.publish_all(&scan.candidates, args.install);
    for outcome in &report.outcomes {
        print_publish_outcome(outcome);
    }
    for (candidate, e) in &report.failures {
        println!(
            "   failed {} {}: {:#}",
            candidate.alias,
            candidate.dir.display(),
            e
        );
    }

    if !report.failures.is_empty() {
        let names: Vec<&str> = report
            .failures
            .iter()
            .map(|(c, _)| c.alias.as_str())
            .collect();
        anyhow::bail!(
            "{} of {} package(s) failed to publish: {}",
            names.len(),
            scan.candidates.len(),
            names.join(", ")
        );
    }
    Ok(())
}

fn show_publish_plan(root: &Path, candidates: &[Candidate], install: bool) {
    println!();
    println!("=== Publish Plan ===");
    println!();
    println!("Found {} package(s) under {}:", candidates.len(), root.display());
    for candidate in candidates {
        let dir = candidate.dir.strip_prefix(root).unwrap_or(&candidate.dir);
        match &candidate.subdirectory {
            Some(sub) => println!("  {} ({}, archiving {})", candidate.alias, dir.display(), sub),
            None => println!("  {} ({})", candidate.alias, dir.display()),
        }
    }
    if install {
        println!();
        println!("Dependencies are installed in each directory first.");
    }
    println!();
}
