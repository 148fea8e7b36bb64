//! # Matrix Command Implementation
//!
//! Outputs `{"include": [{"branch": ...}, ...]}` for the build workflow:
//! `main` first, then every supported variant in stored order. The JSON goes
//! to `$GITHUB_OUTPUT` as `matrix=<json>`, or bare to stdout.

use anyhow::Result;
use clap::Args;

use ci_core::config::Registry;
use ci_core::defaults::CiPaths;
use ci_core::meta::build_matrix;
use ci_core::output::CiOutput;

/// Output the branch build matrix of a project
#[derive(Args, Debug)]
pub struct MatrixArgs {
    /// Project key in configs/projects.json
    #[arg(long)]
    pub project: String,

    /// Accepted for workflow compatibility; not used
    #[arg(long, hide = true)]
    pub token: Option<String>,
}

/// Execute the `matrix` command.
pub fn execute(args: MatrixArgs, paths: &CiPaths) -> Result<()> {
    let registry = Registry::load(&paths.config())?;
    let project = registry.project(&args.project)?;
    let matrix = serde_json::to_string(&build_matrix(project))?;
    CiOutput::from_env().set_output_value("matrix", &matrix)?;
    Ok(())
}
