//! Sync use case - apply a project's own declaration: consume its packs, then publish it.

use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use super::consume::{ConsumeOutcome, ConsumeUseCase};
use super::publish::{PublishOutcome, PublishUseCase};
use crate::config::Config;
use crate::declaration::Declaration;
use crate::runtime::Runtime;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub consumed: Vec<ConsumeOutcome>,
    pub published: Option<PublishOutcome>,
}

pub struct SyncUseCase<'a, R: Runtime> {
    runtime: &'a R,
    consume: ConsumeUseCase<'a, R>,
    publish: PublishUseCase<'a, R>,
}

impl<'a, R: Runtime> SyncUseCase<'a, R> {
    pub fn new(runtime: &'a R, config: &Config) -> Self {
        Self {
            runtime,
            consume: ConsumeUseCase::new(runtime, config),
            publish: PublishUseCase::new(runtime, config),
        }
    }

    /// Consume the declared packs, then publish the declared alias.
    ///
    /// A failed consume aborts before anything is built.
    #[tracing::instrument(skip(self))]
    pub fn run(&self, project_root: &Path) -> Result<SyncOutcome> {
        let declaration = Declaration::load_in(self.runtime, project_root)?;
        let mut outcome = SyncOutcome::default();

        if let Some(packs) = &declaration.packs {
            outcome.consumed = self
                .consume
                .add_all(project_root, packs)
                .into_result()
                .context("Consuming declared packs failed, not publishing")?;
        }

        if let Some(alias) = &declaration.alias {
            outcome.published = Some(self.publish.publish(
                project_root,
                alias,
                declaration.directory.as_deref(),
            )?);
        }

        if !declaration.is_consume_capable() && !declaration.is_publish_capable() {
            info!("Declaration in {} neither publishes nor consumes", project_root.display());
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PackError, pack_error};
    use crate::registry::{Record, RegistryStore};
    use crate::runtime::{CommandOutput, MockRuntime, RealRuntime};
    use crate::test_utils::{Workspace, delegate_fs_to_real, expect_pack_produces};
    use mockall::Sequence;

    fn declare(ws: &Workspace, json: &str) {
        std::fs::write(ws.project.join("packrat.json"), json).unwrap();
    }

    fn register(ws: &Workspace, alias: &str, package_name: &str, version: u64) {
        RegistryStore::new(&RealRuntime, ws.root.clone())
            .upsert_record(alias, package_name, version)
            .unwrap();
        std::fs::write(ws.root.join(format!("{}-{}.tgz", alias, version)), b"archive").unwrap();
    }

    #[test]
    fn test_consumes_before_publishing() {
        let ws = Workspace::new("@acme/app");
        declare(&ws, r#"{ "alias": "app", "packs": ["core"] }"#);
        register(&ws, "core", "@acme/core", 2);

        let mut runtime = MockRuntime::new();
        let mut seq = Sequence::new();
        runtime
            .expect_run_command()
            .withf(|_, args, _| args.first().map(String::as_str) == Some("install"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(CommandOutput::ok("")));
        runtime
            .expect_run_command()
            .withf(|_, args, _| args.first().map(String::as_str) == Some("run"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(CommandOutput::ok("")));
        expect_pack_produces(&mut runtime, "acme-app-0.1.0.tgz");
        delegate_fs_to_real(&mut runtime, &ws.home);

        let config = Config::with_root(ws.root.clone());
        let outcome = SyncUseCase::new(&runtime, &config).run(&ws.project).unwrap();

        assert_eq!(outcome.consumed.len(), 1);
        assert!(matches!(
            outcome.published,
            Some(PublishOutcome::Published { version: 1, .. })
        ));
        assert_eq!(
            RegistryStore::new(&RealRuntime, ws.root.clone())
                .get_record("app")
                .unwrap(),
            Some(Record::new("@acme/app", 1))
        );
    }

    #[test]
    fn test_failed_consume_skips_publish() {
        let ws = Workspace::new("@acme/app");
        declare(&ws, r#"{ "alias": "app", "packs": ["nope"] }"#);

        let mut runtime = MockRuntime::new();
        runtime.expect_run_command().never();
        delegate_fs_to_real(&mut runtime, &ws.home);

        let config = Config::with_root(ws.root.clone());
        let err = SyncUseCase::new(&runtime, &config)
            .run(&ws.project)
            .unwrap_err();

        assert!(format!("{:#}", err).contains("nope"));
        assert!(ws.artifacts().is_empty());
    }

    #[test]
    fn test_missing_declaration() {
        let ws = Workspace::new("@acme/app");

        let mut runtime = MockRuntime::new();
        runtime.expect_run_command().never();
        delegate_fs_to_real(&mut runtime, &ws.home);

        let config = Config::with_root(ws.root.clone());
        let err = SyncUseCase::new(&runtime, &config)
            .run(&ws.project)
            .unwrap_err();

        assert!(matches!(pack_error(&err), Some(PackError::NoDeclaration(_))));
    }

    #[test]
    fn test_consume_only_declaration() {
        let ws = Workspace::new("@acme/app");
        declare(&ws, r#"{ "packs": ["!core"] }"#);

        let mut runtime = MockRuntime::new();
        runtime.expect_run_command().never();
        delegate_fs_to_real(&mut runtime, &ws.home);

        let config = Config::with_root(ws.root.clone());
        let outcome = SyncUseCase::new(&runtime, &config).run(&ws.project).unwrap();

        assert_eq!(
            outcome.consumed,
            vec![ConsumeOutcome::Ignored {
                alias: "core".into()
            }]
        );
        assert_eq!(outcome.published, None);
    }
}
