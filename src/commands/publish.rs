use anyhow::Result;
use log::debug;

use crate::{
    application::PublishUseCase,
    config::Config,
    declaration::{DECLARATION_NAME, Declaration},
    error::PackError,
    runtime::Runtime,
};

use super::print_publish_outcome;

/// Publish the project in the current directory.
///
/// Without `alias`, the alias and directory come from the project's declaration; an explicit
/// `dir` always wins.
#[tracing::instrument(skip(runtime, config))]
pub fn publish<R: Runtime>(
    runtime: &R,
    config: &Config,
    alias: Option<&str>,
    dir: Option<&str>,
) -> Result<()> {
    let project_root = runtime.current_dir()?;

    let (alias, directory) = match alias {
        Some(alias) => (alias.to_string(), dir.map(String::from)),
        None => {
            debug!("No alias given, reading {}", DECLARATION_NAME);
            let declaration = Declaration::load_in(runtime, &project_root)?;
            let alias = declaration.alias.ok_or(PackError::MissingAlias)?;
            (alias, dir.map(String::from).or(declaration.directory))
        }
    };

    let outcome =
        PublishUseCase::new(runtime, config).publish(&project_root, &alias, directory.as_deref())?;
    print_publish_outcome(&outcome);
    Ok(())
}
