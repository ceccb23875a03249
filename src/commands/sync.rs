use anyhow::Result;

use crate::{application::SyncUseCase, config::Config, runtime::Runtime};

use super::{print_consume_outcome, print_publish_outcome};

/// Apply the current project's declaration: consume its packs, then publish it.
#[tracing::instrument(skip(runtime, config))]
pub fn sync<R: Runtime>(runtime: &R, config: &Config) -> Result<()> {
    let project_root = runtime.current_dir()?;
    let outcome = SyncUseCase::new(runtime, config).run(&project_root)?;

    for consumed in &outcome.consumed {
        print_consume_outcome(consumed);
    }
    if let Some(published) = &outcome.published {
        print_publish_outcome(published);
    }
    if outcome.consumed.is_empty() && outcome.published.is_none() {
        println!("Nothing to do.");
    }
    Ok(())
}
