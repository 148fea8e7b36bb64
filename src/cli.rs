//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use ci_core::defaults::{CiPaths, ROOT_ENV_VAR};

use crate::commands;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Central kernel CI - Control plane for downstream kernel repositories
#[derive(Parser, Debug)]
#[command(name = "ci-core")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Root of the central CI repository (configs/, templates/, ...)
    #[arg(long, global = true, value_name = "DIR", env = ROOT_ENV_VAR, default_value = ".")]
    root: PathBuf,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export the PROJECT_* variables of a project
    Parse(commands::parse::ParseArgs),

    /// Export release naming for one build of a branch
    Meta(commands::meta::MetaArgs),

    /// Output the branch build matrix of a project
    Matrix(commands::matrix::MatrixArgs),

    /// Register or replace a project in the registry
    Add(commands::add::AddArgs),

    /// Push the centrally managed files to every project repository
    Setup(commands::setup::SetupArgs),

    /// Check variant upstreams and output the update work items
    Watch(commands::watch::WatchArgs),

    /// Update one variant branch of one project to an upstream commit
    Update(commands::update::UpdateArgs),

    /// Announce a published release on Telegram
    Notify(commands::notify::NotifyArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging();
        let paths = CiPaths::new(self.root);

        match self.command {
            Commands::Parse(args) => commands::parse::execute(args, &paths),
            Commands::Meta(args) => commands::meta::execute(args, &paths),
            Commands::Matrix(args) => commands::matrix::execute(args, &paths),
            Commands::Add(args) => commands::add::execute(args, &paths),
            Commands::Setup(args) => commands::setup::execute(args, &paths),
            Commands::Watch(args) => commands::watch::execute(args, &paths),
            Commands::Update(args) => commands::update::execute(args, &paths),
            Commands::Notify(args) => commands::notify::execute(args, &paths),
        }
    }

    /// Logs go to stderr; `RUST_LOG` wins unless `--log-level` was changed.
    fn init_logging(&self) {
        let rust_log_set = std::env::var_os("RUST_LOG").is_some_and(|v| !v.is_empty());
        let mut builder = if rust_log_set && self.log_level == DEFAULT_LOG_LEVEL {
            env_logger::Builder::from_default_env()
        } else {
            let mut builder = env_logger::Builder::new();
            builder.parse_filters(&self.log_level);
            builder
        };
        builder
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_target(false);
        // Ignore the error if a logger is already installed.
        let _ = builder.try_init();
    }
}
