//! # Parse Command Implementation
//!
//! Exports the `PROJECT_*` environment of one project for the build workflow.

use anyhow::Result;
use clap::Args;

use ci_core::config::Registry;
use ci_core::defaults::CiPaths;
use ci_core::meta;
use ci_core::output::CiOutput;

/// Export the PROJECT_* variables of a project
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Project key in configs/projects.json
    #[arg(long)]
    pub project: String,
}

/// Execute the `parse` command.
pub fn execute(args: ParseArgs, paths: &CiPaths) -> Result<()> {
    let registry = Registry::load(&paths.config())?;
    let project = registry.project(&args.project)?;
    let vars = meta::project_env(project)?;
    CiOutput::from_env().set_env(&vars)?;
    Ok(())
}
