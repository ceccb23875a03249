use anyhow::Result;
use clap::Parser;
use packrat::commands::{self, DiscoverArgs};
use packrat::config::{Config, ROOT_ENV};
use std::path::PathBuf;

/// packrat - local package registry
///
/// Publish built packages into a registry on this machine and install the latest
/// published version into other projects.
///
/// Examples:
///   packrat publish ui/button   # Build, pack and register the current project
///   packrat add ui/button %lint # Install the latest ui/button, and lint as a dev dependency
///   packrat discover ~/work     # Publish every project declaring an alias under ~/work
#[derive(Parser, Debug)]
#[command(author, version = env!("PACKRAT_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Registry root directory (defaults to ~/.packrat; also via PACKRAT_ROOT)
    #[arg(long = "root", short = 'r', env = ROOT_ENV, value_name = "PATH", global = true)]
    pub root: Option<PathBuf>,

    /// Show debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Build, pack and register the project in the current directory
    Publish(PublishArgs),

    /// Install the latest published version of one or more aliases
    Add(AddArgs),

    /// Find projects declaring an alias under a directory and publish them all
    Discover(DiscoverCliArgs),

    /// Consume the declared packs, then publish the declared alias
    Sync,

    /// List registered aliases
    List,
}

#[derive(clap::Args, Debug)]
pub struct PublishArgs {
    /// Alias to publish under; read from packrat.json when omitted. Prefix with ! to skip.
    #[arg(value_name = "ALIAS")]
    pub alias: Option<String>,

    /// Subdirectory to pack instead of the project root
    #[arg(long = "dir", short = 'd', value_name = "DIR")]
    pub dir: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Aliases to install. Prefix with % for a dev dependency, ! to skip.
    #[arg(value_name = "ALIAS", required = true)]
    pub aliases: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct DiscoverCliArgs {
    /// Directory to scan (defaults to the current directory)
    #[arg(id = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Install dependencies in each project before publishing it
    #[arg(long)]
    pub install: bool,

    /// Publish without asking for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let runtime = packrat::runtime::RealRuntime;
    let config = Config::load(&runtime, cli.root)?;

    match cli.command {
        Commands::Publish(args) => commands::publish(
            &runtime,
            &config,
            args.alias.as_deref(),
            args.dir.as_deref(),
        )?,
        Commands::Add(args) => commands::add(&runtime, &config, &args.aliases)?,
        Commands::Discover(args) => commands::discover(
            &runtime,
            &config,
            &DiscoverArgs {
                root: args.dir,
                install: args.install,
                yes: args.yes,
            },
        )?,
        Commands::Sync => commands::sync(&runtime, &config)?,
        Commands::List => commands::list(&runtime, &config)?,
    }
    Ok(())
}
