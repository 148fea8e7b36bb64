//! # Meta Command Implementation
//!
//! Exports the version string, release tag, zip name and release title of one
//! build. The date defaults to today in local time; `--date` pins it.

use anyhow::Result;
use clap::Args;

use ci_core::config::Registry;
use ci_core::defaults::CiPaths;
use ci_core::meta::{parse_date, BuildMeta};
use ci_core::output::CiOutput;

/// Export release naming for one build of a branch
#[derive(Args, Debug)]
pub struct MetaArgs {
    /// Project key in configs/projects.json
    #[arg(long)]
    pub project: String,

    /// Branch being built (main, ksu, mksu, resukisu, ...)
    #[arg(long)]
    pub branch: String,

    /// Build date as YYYYMMDD (defaults to today)
    #[arg(long, value_name = "YYYYMMDD")]
    pub date: Option<String>,
}

/// Execute the `meta` command.
pub fn execute(args: MetaArgs, paths: &CiPaths) -> Result<()> {
    let registry = Registry::load(&paths.config())?;
    let project = registry.project(&args.project)?;
    let date = match args.date.as_deref() {
        Some(date) => parse_date(date)?,
        None => chrono::Local::now().date_naive(),
    };

    let meta = BuildMeta::compute(project, &args.branch, date);
    log::info!("{} {} -> {}", args.project, args.branch, meta.release_tag);
    CiOutput::from_env().set_env(&meta.env_vars())?;
    Ok(())
}
