//! CLI commands. Each resolves its inputs, runs one use case and prints the result.

mod add;
mod discover;
mod list;
mod publish;
mod sync;

pub use add::add;
pub use discover::{DiscoverArgs, discover};
pub use list::list;
pub use publish::publish;
pub use sync::sync;

use crate::application::{ConsumeOutcome, PublishOutcome};

pub(crate) fn print_publish_outcome(outcome: &PublishOutcome) {
    match outcome {
        PublishOutcome::Skipped { alias } => println!("   skipped {} (ignored)", alias),
        PublishOutcome::Published {
            alias,
            package_name,
            version,
            artifact,
        } => println!(
            "   published {} ({}) version {} {}",
            alias,
            package_name,
            version,
            artifact.display()
        ),
    }
}

pub(crate) fn print_consume_outcome(outcome: &ConsumeOutcome) {
    match outcome {
        ConsumeOutcome::Ignored { alias } => println!("   skipped {} (ignored)", alias),
        ConsumeOutcome::AlreadyInstalled { alias, version } => {
            println!("   {} version {} is already installed", alias, version)
        }
        ConsumeOutcome::Installed {
            alias,
            package_name,
            version,
            dev,
        } => println!(
            "   installed {} ({}) version {}{}",
            alias,
            package_name,
            version,
            if *dev { " as a dev dependency" } else { "" }
        ),
    }
}
