//! Application layer - the publish, consume, discovery and sync workflows.
//!
//! Each use case borrows a [`Runtime`](crate::runtime::Runtime) and the resolved
//! [`Config`](crate::config::Config); the CLI layer only parses arguments and prints.

mod consume;
mod discover;
mod publish;
mod sync;

pub use consume::{ConsumeOutcome, ConsumeReport, ConsumeUseCase};
pub use discover::{Candidate, DiscoverReport, DiscoverUseCase, Scan};
pub use publish::{PublishOutcome, PublishUseCase};
pub use sync::{SyncOutcome, SyncUseCase};
