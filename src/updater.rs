//! # Per-Project Updater
//!
//! Brings one variant branch of one project repository up to a new upstream
//! commit: clone the branch into a scratch directory, record the commit,
//! refresh the shared `.gitignore`, re-run the variant's setup script and push
//! the result if anything changed.
//!
//! The scratch directory is a [`tempfile::TempDir`] under the CI root, so it
//! is removed on every exit path, including failures halfway through.

use std::fs;

use log::info;

use crate::backend::Backend;
use crate::config::Registry;
use crate::defaults::{CiPaths, GITHUB_TOKEN_ENV_VAR, SETUP_SCRIPT_NAME, VERSION_MARKER_FILE};
use crate::error::{Error, Result};
use crate::git::authenticated_url;
use crate::process::Cmd;
use crate::variant::Variant;

/// What to update.
#[derive(Debug, Clone)]
pub struct UpdateRequest<'a> {
    pub project: &'a str,
    pub variant: Variant,
    pub commit_id: &'a str,
    pub token: Option<&'a str>,
}

/// What the updater did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The branch already matched; nothing was committed.
    UpToDate,
    /// A commit with this message was pushed.
    Pushed { message: String },
}

pub fn commit_message(variant: Variant, commit_id: &str) -> String {
    format!("ci: update {} to {}", variant, commit_id)
}

/// Updates `request.variant` of `request.project` to `request.commit_id`.
///
/// Nothing is cloned or run until the project, the token and the commit id
/// have all been checked.
pub fn update_project(
    backend: &Backend,
    paths: &CiPaths,
    registry: &Registry,
    request: &UpdateRequest<'_>,
) -> Result<UpdateOutcome> {
    let project = registry.project(request.project)?;
    let token = request
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::MissingInput {
            what: GITHUB_TOKEN_ENV_VAR.to_string(),
        })?;
    if request.commit_id.trim().is_empty() {
        return Err(Error::MissingInput {
            what: "commit id".to_string(),
        });
    }
    let branch = request.variant.as_str();
    let git = backend.git();

    let scratch = tempfile::Builder::new()
        .prefix("ci-update-")
        .tempdir_in(paths.root())?;
    let checkout = scratch.path().join("kernel");

    info!("updating {} ({}) to {} {}", request.project, project.repo, branch, request.commit_id);
    let url = authenticated_url(&project.repo, Some(token))?;
    git.clone_repo(&url, &checkout, Some(branch))?;

    fs::write(checkout.join(VERSION_MARKER_FILE), request.commit_id)?;

    let gitignore = paths.universal_gitignore();
    if gitignore.exists() {
        fs::copy(&gitignore, checkout.join(".gitignore"))?;
    }

    if let Some(setup) = request.variant.setup() {
        let script = backend.http().get_text(setup.script_url)?;
        let script_path = checkout.join(SETUP_SCRIPT_NAME);
        fs::write(&script_path, script)?;
        let result = backend.runner().run(
            &Cmd::new("bash")
                .arg(SETUP_SCRIPT_NAME)
                .args(setup.args.iter().copied())
                .current_dir(&checkout),
        );
        fs::remove_file(&script_path)?;
        result?;
    }

    git.set_identity(&checkout)?;
    git.add_all(&checkout)?;
    if !git.is_dirty(&checkout)? {
        info!("{} {} is already up to date", request.project, branch);
        return Ok(UpdateOutcome::UpToDate);
    }

    let message = commit_message(request.variant, request.commit_id);
    git.commit(&checkout, &message)?;
    git.push_current(&checkout)?;
    info!("pushed '{}' to {} {}", message, project.repo, branch);
    Ok(UpdateOutcome::Pushed { message })
}
