#![cfg(unix)]

use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// Writes `<dir name>.tgz` into the working directory and reports it, like `npm pack`.
const PACK_SCRIPT: &str = r#"name=$(basename "$(pwd -P)")
echo "archive of $name" > "$name.tgz"
echo "$name.tgz"
"#;

/// Records its arguments instead of installing anything.
const INSTALL_SCRIPT: &str = r#"echo "$@" >> "$HOME/install.log"
"#;

/// A fake home with shell scripts standing in for the package toolchain.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("pack.sh"), PACK_SCRIPT).unwrap();
        std::fs::write(dir.path().join("install.sh"), INSTALL_SCRIPT).unwrap();
        Self { dir }
    }

    fn home(&self) -> &Path {
        self.dir.path()
    }

    fn root(&self) -> PathBuf {
        self.home().join(".packrat")
    }

    fn project(&self, rel: &str, package_name: &str, declaration: Option<&str>) -> PathBuf {
        let dir = self.home().join(rel);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("package.json"),
            format!("{{\n  \"name\": \"{}\",\n  \"version\": \"1.0.0\"\n}}\n", package_name),
        )
        .unwrap();
        if let Some(json) = declaration {
            std::fs::write(dir.join("packrat.json"), json).unwrap();
        }
        dir
    }

    fn packrat(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(cargo::cargo_bin!("packrat"));
        cmd.current_dir(cwd)
            .env("HOME", self.home())
            .env_remove("PACKRAT_ROOT")
            .env("PACKRAT_BUILD_CMD", "true")
            .env(
                "PACKRAT_PACK_CMD",
                format!("sh {}", self.home().join("pack.sh").display()),
            )
            .env(
                "PACKRAT_INSTALL_CMD",
                format!("sh {}", self.home().join("install.sh").display()),
            )
            .env("PACKRAT_INSTALL_DEPS_CMD", "true");
        cmd
    }

    fn registry(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(self.root().join("registry.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    fn artifacts(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".tgz"))
            .collect();
        names.sort();
        names
    }
}

#[test]
fn test_publish_twice_keeps_latest_artifact() {
    let sandbox = Sandbox::new();
    let lib = sandbox.project("work/lib", "@acme/lib", None);

    for _ in 0..2 {
        sandbox
            .packrat(&lib)
            .arg("publish")
            .arg("lib")
            .assert()
            .success()
            .stdout(predicate::str::contains("published lib (@acme/lib)"));
    }

    let registry = sandbox.registry();
    assert_eq!(registry["lib"]["packageName"], "@acme/lib");
    assert_eq!(registry["lib"]["version"], 2);
    assert_eq!(sandbox.artifacts(), vec!["lib-2.tgz"]);
    assert!(!lib.join("lib.tgz").exists());
}

#[test]
fn test_publish_ignored_alias_does_nothing() {
    let sandbox = Sandbox::new();
    let lib = sandbox.project("work/lib", "@acme/lib", None);

    sandbox
        .packrat(&lib)
        .args(["publish", "!lib"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped lib"));

    assert!(!sandbox.root().exists());
}

#[test]
fn test_add_installs_and_records_dependency() {
    let sandbox = Sandbox::new();
    let lib = sandbox.project("work/lib", "@acme/lib", None);
    let tool = sandbox.project("work/tool", "acme-tool", None);
    let app = sandbox.project("work/app", "app", None);

    sandbox.packrat(&lib).args(["publish", "lib"]).assert().success();
    sandbox.packrat(&tool).args(["publish", "tool"]).assert().success();

    sandbox
        .packrat(&app)
        .args(["add", "lib", "%tool"])
        .assert()
        .success()
        .stdout(predicate::str::contains("installed lib (@acme/lib) version 1"))
        .stdout(predicate::str::contains("as a dev dependency"));

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(app.join("package.json")).unwrap()).unwrap();
    assert_eq!(
        manifest["dependencies"]["@acme/lib"],
        "file:~/.packrat/lib-1.tgz"
    );
    assert_eq!(
        manifest["devDependencies"]["acme-tool"],
        "file:~/.packrat/tool-1.tgz"
    );

    let log = std::fs::read_to_string(sandbox.home().join("install.log")).unwrap();
    assert!(log.contains(".packrat/lib-1.tgz\n"));
    assert!(log.contains(".packrat/tool-1.tgz --save-dev\n"));

    // Second run finds both references and installs nothing
    sandbox
        .packrat(&app)
        .args(["add", "lib", "%tool"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed"));
    let log_again = std::fs::read_to_string(sandbox.home().join("install.log")).unwrap();
    assert_eq!(log, log_again);
}

#[test]
fn test_add_unknown_alias_fails() {
    let sandbox = Sandbox::new();
    let app = sandbox.project("work/app", "app", None);

    sandbox
        .packrat(&app)
        .args(["add", "ghost"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("alias 'ghost' is not registered"));

    assert!(!sandbox.root().exists());
}

#[test]
fn test_list_shows_records() {
    let sandbox = Sandbox::new();
    let lib = sandbox.project("work/ui", "@acme/button", None);

    sandbox
        .packrat(&lib)
        .args(["publish", "ui/button"])
        .assert()
        .success();
    assert_eq!(sandbox.artifacts(), vec!["ui-button-1.tgz"]);

    sandbox
        .packrat(sandbox.home())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("ui/button @acme/button 1"));
}

#[test]
fn test_list_with_explicit_root() {
    let sandbox = Sandbox::new();
    let other = sandbox.home().join("elsewhere");

    sandbox
        .packrat(sandbox.home())
        .arg("--root")
        .arg(&other)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No packages published."));
}

#[test]
fn test_discover_declined() {
    let sandbox = Sandbox::new();
    sandbox.project("work/a", "@acme/a", Some(r#"{ "alias": "a" }"#));
    sandbox.project("work/b", "@acme/b", Some(r#"{ "alias": "b" }"#));
    sandbox.project("work/app", "app", Some(r#"{ "packs": ["a", "b"] }"#));

    sandbox
        .packrat(sandbox.home())
        .args(["discover", "work"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 package(s)"))
        .stdout(predicate::str::contains("Publishing cancelled."));

    assert!(!sandbox.root().exists());
}

#[test]
fn test_discover_then_sync() {
    let sandbox = Sandbox::new();
    sandbox.project("work/a", "@acme/a", Some(r#"{ "alias": "a" }"#));
    sandbox.project(
        "work/b",
        "@acme/b",
        Some(r#"{ "alias": "b", "directory": "." }"#),
    );
    let app = sandbox.project(
        "work/app",
        "app",
        Some(r#"{ "alias": "app", "packs": ["a", "%b"] }"#),
    );

    sandbox
        .packrat(sandbox.home())
        .args(["discover", "work", "--install", "-y"])
        .assert()
        .success();
    assert_eq!(sandbox.artifacts(), vec!["a-1.tgz", "app-1.tgz", "b-1.tgz"]);

    sandbox
        .packrat(&app)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("installed a (@acme/a) version 1"))
        .stdout(predicate::str::contains("published app (app) version 2"));

    assert_eq!(sandbox.artifacts(), vec!["a-1.tgz", "app-2.tgz", "b-1.tgz"]);
}

#[test]
fn test_sync_without_declaration_fails() {
    let sandbox = Sandbox::new();
    let app = sandbox.project("work/app", "app", None);

    sandbox
        .packrat(&app)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no declaration found"));
}
