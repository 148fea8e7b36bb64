//! # Setup Command Implementation
//!
//! Runs the bulk synchronizer over every registered project and logs a
//! per-branch summary.

use anyhow::Result;
use clap::Args;
use log::info;

use ci_core::backend::Backend;
use ci_core::config::Registry;
use ci_core::defaults::{CiPaths, GITHUB_TOKEN_ENV_VAR, SYNC_COMMIT_MESSAGE};
use ci_core::sync::{sync_all, BranchOutcome, SyncOptions};
use ci_core::template::ReadmeLanguage;

/// Push the centrally managed files to every project repository
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// GitHub token used for pushing and repository settings
    #[arg(long, env = GITHUB_TOKEN_ENV_VAR, hide_env_values = true)]
    pub token: Option<String>,

    /// Commit message; the branch name is appended
    #[arg(long, default_value = SYNC_COMMIT_MESSAGE)]
    pub commit_message: String,

    /// README languages to keep (both, zh-CN, en-US)
    #[arg(long, default_value = "both")]
    pub readme_language: ReadmeLanguage,
}

/// Execute the `setup` command.
pub fn execute(args: SetupArgs, paths: &CiPaths) -> Result<()> {
    let registry = Registry::load(&paths.config())?;
    let backend = Backend::system()?;
    let options = SyncOptions {
        token: args.token.filter(|t| !t.is_empty()),
        commit_message: args.commit_message,
        readme_language: args.readme_language,
    };

    let reports = sync_all(&backend, paths, &registry, &options)?;
    for report in &reports {
        let pushed = report
            .branches
            .iter()
            .filter(|(_, outcome)| *outcome == BranchOutcome::Pushed)
            .count();
        info!(
            "{}: {} branch(es) pushed, {} migrated",
            report.key,
            pushed,
            report.migrated.len()
        );
    }
    info!("synchronized {} project(s)", reports.len());
    Ok(())
}
