//! # Update Command Implementation
//!
//! Applies one upstream commit to one variant branch of one project. The
//! variant accepts the legacy identifier. A GitHub token is required; without
//! one the command fails before cloning anything.

use anyhow::Result;
use clap::Args;
use log::info;

use ci_core::backend::Backend;
use ci_core::config::Registry;
use ci_core::defaults::{CiPaths, GITHUB_TOKEN_ENV_VAR};
use ci_core::updater::{update_project, UpdateOutcome, UpdateRequest};
use ci_core::variant::Variant;

/// Update one variant branch of one project to an upstream commit
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// GitHub token with push access to the project repository
    #[arg(long, env = GITHUB_TOKEN_ENV_VAR, hide_env_values = true)]
    pub token: Option<String>,

    /// Project key in configs/projects.json
    #[arg(long)]
    pub project: String,

    /// Variant branch to update (ksu, mksu, resukisu)
    #[arg(long)]
    pub variant: Variant,

    /// Upstream commit id to record
    #[arg(long)]
    pub commit_id: String,
}

/// Execute the `update` command.
pub fn execute(args: UpdateArgs, paths: &CiPaths) -> Result<()> {
    let registry = Registry::load(&paths.config())?;
    let backend = Backend::system()?;
    let request = UpdateRequest {
        project: &args.project,
        variant: args.variant,
        commit_id: &args.commit_id,
        token: args.token.as_deref(),
    };

    match update_project(&backend, paths, &registry, &request)? {
        UpdateOutcome::UpToDate => info!("no changes to push"),
        UpdateOutcome::Pushed { message } => info!("pushed: {}", message),
    }
    Ok(())
}
