//! Configuration.
//!
//! Precedence, highest first: command line flags, environment variables,
//! `<root>/config.json`, built-in defaults.
//!
//! ```json
//! {
//!   "build": "npm run build",
//!   "pack": "npm pack",
//!   "install": "npm install",
//!   "installDeps": "npm install",
//!   "devFlag": "--save-dev",
//!   "exclude": [".git", "*-cache"]
//! }
//! ```

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

pub const CONFIG_NAME: &str = "config.json";
/// Read by the CLI for `--root`.
pub const ROOT_ENV: &str = "PACKRAT_ROOT";

const BUILD_ENV: &str = "PACKRAT_BUILD_CMD";
const PACK_ENV: &str = "PACKRAT_PACK_CMD";
const INSTALL_ENV: &str = "PACKRAT_INSTALL_CMD";
const INSTALL_DEPS_ENV: &str = "PACKRAT_INSTALL_DEPS_CMD";

const DEFAULT_BUILD: &str = "npm run build";
const DEFAULT_PACK: &str = "npm pack";
const DEFAULT_INSTALL: &str = "npm install";
const DEFAULT_DEV_FLAG: &str = "--save-dev";

/// A program and its leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split on whitespace; the first word is the program.
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace().map(String::from);
        let program = words
            .next()
            .with_context(|| format!("Empty command line {:?}", line))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

/// External commands the workflows drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainCommands {
    pub build: CommandLine,
    pub pack: CommandLine,
    pub install: CommandLine,
    pub install_deps: CommandLine,
    pub dev_flag: String,
}

impl Default for ToolchainCommands {
    fn default() -> Self {
        let npm = |args: &[&str]| CommandLine {
            program: "npm".to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        };
        Self {
            build: npm(&["run", "build"]),
            pack: npm(&["pack"]),
            install: npm(&["install"]),
            install_deps: npm(&["install"]),
            dev_flag: DEFAULT_DEV_FLAG.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    build: Option<String>,
    pack: Option<String>,
    install: Option<String>,
    install_deps: Option<String>,
    dev_flag: Option<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry root holding `registry.json` and the artifacts.
    pub root: PathBuf,
    pub commands: ToolchainCommands,
    /// Extra directory name patterns pruned during discovery.
    pub excludes: Vec<glob::Pattern>,
}

impl Config {
    /// Defaults rooted at `root`, ignoring environment and config file.
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            root,
            commands: ToolchainCommands::default(),
            excludes: Vec::new(),
        }
    }

    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, root: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(path) if path.is_relative() => runtime.current_dir()?.join(path),
            Some(path) => path,
            None => default_root(runtime)?,
        };
        debug!("Using registry root {:?}", root);

        let file = read_config_file(runtime, &root)?;

        let command = |env: &str, configured: Option<String>, default: &str| -> Result<CommandLine> {
            let line = runtime
                .env_var(env)
                .ok()
                .or(configured)
                .unwrap_or_else(|| default.to_string());
            CommandLine::parse(&line).with_context(|| format!("Invalid command for {}", env))
        };

        let commands = ToolchainCommands {
            build: command(BUILD_ENV, file.build, DEFAULT_BUILD)?,
            pack: command(PACK_ENV, file.pack, DEFAULT_PACK)?,
            install: command(INSTALL_ENV, file.install, DEFAULT_INSTALL)?,
            install_deps: command(INSTALL_DEPS_ENV, file.install_deps, DEFAULT_INSTALL)?,
            dev_flag: file
                .dev_flag
                .unwrap_or_else(|| DEFAULT_DEV_FLAG.to_string()),
        };

        let excludes = file
            .exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p).with_context(|| format!("Invalid exclude pattern {:?}", p))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root,
            commands,
            excludes,
        })
    }
}

/// `~/.packrat`
#[tracing::instrument(skip(runtime))]
pub fn default_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home = runtime
        .home_dir()
        .context("Could not find home directory")?;
    Ok(home.join(".packrat"))
}

fn read_config_file<R: Runtime>(runtime: &R, root: &Path) -> Result<ConfigFile> {
    let path = root.join(CONFIG_NAME);
    if !runtime.exists(&path) {
        return Ok(ConfigFile::default());
    }
    let content = runtime.read_to_string(&path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid config file {:?}", path))
}
