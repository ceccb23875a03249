use anyhow::Result;
use log::debug;

use crate::{application::ConsumeUseCase, config::Config, runtime::Runtime};

use super::print_consume_outcome;

/// Install the latest registered artifact of each alias into the current project.
#[tracing::instrument(skip(runtime, config))]
pub fn add<R: Runtime>(runtime: &R, config: &Config, aliases: &[String]) -> Result<()> {
    let project_root = runtime.current_dir()?;
    debug!("Adding {} package(s) to {:?}", aliases.len(), project_root);

    let report = ConsumeUseCase::new(runtime, config).add_all(&project_root, aliases);
    for outcome in &report.outcomes {
        print_consume_outcome(outcome);
    }
    for (alias, e) in &report.failures {
        println!("   failed {}: {:#}", alias, e);
    }

    report.into_result().map(|_| ())
}
