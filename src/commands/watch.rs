//! # Watch Command Implementation
//!
//! Checks every variant upstream, saves the tracker and outputs
//! `matrix=<work items>` plus `found_updates=true|false`.

use anyhow::Result;
use clap::Args;
use log::info;

use ci_core::backend::Backend;
use ci_core::config::Registry;
use ci_core::defaults::CiPaths;
use ci_core::output::CiOutput;
use ci_core::upstream::{watch, UpstreamTracker};

/// Check variant upstreams and output the update work items
#[derive(Args, Debug)]
pub struct WatchArgs {}

/// Execute the `watch` command.
pub fn execute(_args: WatchArgs, paths: &CiPaths) -> Result<()> {
    let registry = Registry::load(&paths.config())?;
    let tracker_path = paths.upstream();
    let mut tracker = UpstreamTracker::load(&tracker_path)?;
    let backend = Backend::system()?;

    let report = watch(&backend.git(), &registry, &mut tracker);
    tracker.save(&tracker_path)?;
    info!(
        "{} variant(s) changed, {} work item(s)",
        report.changed.len(),
        report.work_items.len()
    );

    CiOutput::from_env().set_outputs(&[
        ("matrix", report.matrix_json()?),
        ("found_updates", report.found_updates().to_string()),
    ])?;
    Ok(())
}
