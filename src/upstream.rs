//! # Upstream Watcher
//!
//! `configs/upstream_commits.json` records the last seen head commit of every
//! variant's upstream repository. [`watch`] compares those against the live
//! heads and turns every change into one [`WorkItem`] per project supporting
//! the variant. A variant whose head cannot be fetched is skipped and keeps
//! its stored hash, so one unreachable upstream never blocks the others.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Registry;
use crate::error::{Error, Result};
use crate::git::Git;
use crate::variant::{Variant, LEGACY_NAME};

/// Length of the abbreviated commit id handed to the updater.
pub const SHORT_COMMIT_LEN: usize = 7;

/// Last seen upstream head per variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamTracker {
    commits: BTreeMap<String, String>,
}

impl UpstreamTracker {
    /// Loads the tracker, returning an empty one if the file does not exist.
    ///
    /// A hash stored under the legacy variant name is discarded rather than
    /// carried over, so the renamed variant is treated as never seen.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let mut commits: BTreeMap<String, String> =
            serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        if commits.remove(LEGACY_NAME).is_some() {
            info!("dropping tracker entry for legacy variant '{}'", LEGACY_NAME);
        }
        Ok(Self { commits })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = serde_json::to_string_pretty(&self.commits)?;
        out.push('\n');
        fs::write(path, out)?;
        Ok(())
    }

    pub fn get(&self, variant: Variant) -> Option<&str> {
        self.commits.get(variant.as_str()).map(String::as_str)
    }

    pub fn set(&mut self, variant: Variant, hash: impl Into<String>) {
        self.commits.insert(variant.as_str().to_string(), hash.into());
    }
}

/// One project that needs its variant branch updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub project: String,
    pub variant: Variant,
    pub commit_id: String,
}

/// Result of one watch pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchReport {
    pub work_items: Vec<WorkItem>,
    /// Variants whose head moved.
    pub changed: Vec<Variant>,
}

impl WatchReport {
    pub fn found_updates(&self) -> bool {
        !self.work_items.is_empty()
    }

    /// The work items as a JSON list, the `matrix` step output.
    pub fn matrix_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.work_items)?)
    }
}

fn short_commit(hash: &str) -> String {
    hash.chars().take(SHORT_COMMIT_LEN).collect()
}

/// Checks every variant's upstream head and records the ones that moved.
pub fn watch(git: &Git<'_>, registry: &Registry, tracker: &mut UpstreamTracker) -> WatchReport {
    let mut report = WatchReport::default();
    for variant in Variant::ALL {
        let source = variant.upstream();
        let head = match git.remote_head(source.repo, source.branch) {
            Ok(head) => head,
            Err(e) => {
                warn!("skipping {}: cannot read upstream head: {}", variant, e);
                continue;
            }
        };

        if tracker.get(variant) == Some(head.as_str()) {
            info!("{} is up to date at {}", variant, short_commit(&head));
            continue;
        }

        info!(
            "{} moved {} -> {}",
            variant,
            tracker.get(variant).map(short_commit).unwrap_or_else(|| "(none)".into()),
            short_commit(&head)
        );
        tracker.set(variant, head.as_str());
        report.changed.push(variant);

        let commit_id = short_commit(&head);
        report.work_items.extend(
            registry
                .projects()
                .filter(|(_, project)| project.supports(variant))
                .map(|(key, _)| WorkItem {
                    project: key.to_string(),
                    variant,
                    commit_id: commit_id.clone(),
                }),
        );
    }
    report
}
