use anyhow::Result;
use log::debug;

use crate::{config::Config, registry::RegistryStore, runtime::Runtime};

/// List every registered alias with its package name and latest version
#[tracing::instrument(skip(runtime, config))]
pub fn list<R: Runtime>(runtime: &R, config: &Config) -> Result<()> {
    debug!("Listing registry at {:?}", config.root);
    let store = RegistryStore::new(runtime, config.root.clone());

    let records = store.records()?;
    if records.is_empty() {
        println!("No packages published.");
        return Ok(());
    }

    for (alias, record) in records {
        if !record.is_valid() {
            println!("{} (invalid record)", alias);
            continue;
        }
        let missing = if runtime.exists(&store.artifact_path(&alias, record.version)) {
            ""
        } else {
            " (artifact missing)"
        };
        println!(
            "{} {} {}{}",
            alias, record.package_name, record.version, missing
        );
    }

    Ok(())
}
