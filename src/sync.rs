//! # Bulk Repository Synchronizer
//!
//! Pushes the centrally managed files into every registered project
//! repository: the rendered README, the trigger workflow (the only file left
//! in `.github/workflows/`), the funding file and the shared `.gitignore`.
//! Build scripts from before the central CI are deleted on the way.
//!
//! Every target branch that exists remotely is processed. A branch still
//! published under a variant's legacy name is renamed first, both locally and
//! on the remote.
//!
//! With a token, repository settings are applied afterwards. Those calls are
//! best-effort: a failure is logged and the run continues.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::backend::Backend;
use crate::config::{ProjectRecord, Registry};
use crate::defaults::{CiPaths, CI_TOKEN_SECRET, OBSOLETE_FILES, TARGET_BRANCHES};
use crate::error::Result;
use crate::git::{authenticated_url, Git};
use crate::template::{self, ReadmeLanguage, Templates, TRIGGER_WORKFLOW_FILE};
use crate::variant::Variant;

/// Options of one synchronizer run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub token: Option<String>,
    pub commit_message: String,
    pub readme_language: ReadmeLanguage,
}

/// What happened to one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOutcome {
    Pushed,
    Unchanged,
    Missing,
}

/// Per-branch results of one project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectReport {
    pub key: String,
    pub branches: Vec<(String, BranchOutcome)>,
    /// Legacy branches renamed during this run, as `(old, new)`.
    pub migrated: Vec<(String, String)>,
}

/// Synchronizes every project in registry order.
pub fn sync_all(
    backend: &Backend,
    paths: &CiPaths,
    registry: &Registry,
    options: &SyncOptions,
) -> Result<Vec<ProjectReport>> {
    let templates = Templates::load(paths)?;
    let workspace = paths.workspace();
    fs::create_dir_all(&workspace)?;

    let mut reports = Vec::with_capacity(registry.len());
    for (key, project) in registry.projects() {
        info!("processing project: {} -> {}", key, project.repo);
        let report = sync_project(backend, paths, &templates, key, project, options)?;
        if let Some(token) = options.token.as_deref() {
            apply_repo_settings(backend, project, token);
        }
        reports.push(report);
    }
    Ok(reports)
}

fn sync_project(
    backend: &Backend,
    paths: &CiPaths,
    templates: &Templates,
    key: &str,
    project: &ProjectRecord,
    options: &SyncOptions,
) -> Result<ProjectReport> {
    let git = backend.git();
    let checkout = paths.workspace().join(key);
    if checkout.exists() {
        fs::remove_dir_all(&checkout)?;
    }
    let url = authenticated_url(&project.repo, options.token.as_deref())?;
    git.clone_repo(&url, &checkout, None)?;
    git.set_identity(&checkout)?;

    let readme = template::render_readme(&templates.readme, project, options.readme_language)?;
    let trigger = template::render_trigger(&templates.trigger, key, project.repo_owner())?;

    let remote = git.remote_branches(&checkout)?;
    let mut report = ProjectReport {
        key: key.to_string(),
        ..ProjectReport::default()
    };

    for branch in TARGET_BRANCHES {
        if remote.iter().any(|b| b == branch) {
            git.checkout(&checkout, branch)?;
        } else if let Some(legacy) = legacy_branch(branch, &remote) {
            info!("{}: migrating branch {} -> {}", key, legacy, branch);
            git.checkout(&checkout, legacy)?;
            git.rename_current_branch(&checkout, branch)?;
            git.push_set_upstream(&checkout, branch)?;
            git.delete_remote_branch(&checkout, legacy)?;
            report.migrated.push((legacy.to_string(), branch.to_string()));
        } else {
            info!("{}: branch {} does not exist, skipping", key, branch);
            report.branches.push((branch.to_string(), BranchOutcome::Missing));
            continue;
        }

        write_managed_files(paths, &checkout, &readme, &trigger)?;
        let outcome = commit_branch(&git, &checkout, branch, &options.commit_message)?;
        report.branches.push((branch.to_string(), outcome));
    }
    Ok(report)
}

/// The legacy name of `branch`'s variant, if that is what the remote has.
fn legacy_branch<'a>(branch: &str, remote: &'a [String]) -> Option<&'a str> {
    let legacy = Variant::from_branch(branch)?.legacy_name()?;
    remote
        .iter()
        .find(|b| b.as_str() == legacy)
        .map(String::as_str)
}

fn write_managed_files(paths: &CiPaths, checkout: &Path, readme: &str, trigger: &str) -> Result<()> {
    fs::write(checkout.join("README.md"), readme)?;

    let workflows = checkout.join(".github/workflows");
    if workflows.exists() {
        fs::remove_dir_all(&workflows)?;
    }
    fs::create_dir_all(&workflows)?;
    fs::write(workflows.join(TRIGGER_WORKFLOW_FILE), trigger)?;

    let funding = paths.funding();
    if funding.exists() {
        fs::copy(&funding, checkout.join(".github/FUNDING.yml"))?;
    }

    for name in OBSOLETE_FILES {
        let obsolete = checkout.join(name);
        if obsolete.exists() {
            fs::remove_file(&obsolete)?;
        }
    }

    let gitignore = paths.universal_gitignore();
    if gitignore.exists() {
        fs::copy(&gitignore, checkout.join(".gitignore"))?;
    }
    Ok(())
}

fn commit_branch(git: &Git<'_>, checkout: &Path, branch: &str, message: &str) -> Result<BranchOutcome> {
    git.add_all(checkout)?;
    if !git.is_dirty(checkout)? {
        info!("branch {} has no changes", branch);
        return Ok(BranchOutcome::Unchanged);
    }
    git.commit(checkout, &format!("{} (branch: {})", message, branch))?;
    git.push_branch(checkout, branch)?;
    info!("pushed branch {}", branch);
    Ok(BranchOutcome::Pushed)
}

/// Secret, sponsorship flag and push webhook. Never fails the run.
fn apply_repo_settings(backend: &Backend, project: &ProjectRecord, token: &str) {
    let github = backend.github(Some(token));
    let repo = project.repo.as_str();

    if let Err(e) = github.set_secret(repo, CI_TOKEN_SECRET, token) {
        warn!("{}: failed to set {} secret: {}", repo, CI_TOKEN_SECRET, e);
    }
    if let Err(e) = github.enable_sponsorships(repo) {
        warn!("{}: failed to enable sponsorships: {}", repo, e);
    }
    if let Some(webhook) = project.push_server.as_ref().and_then(|p| p.active_webhook()) {
        match github.ensure_push_webhook(repo, webhook) {
            Ok(true) => info!("{}: created push webhook", repo),
            Ok(false) => info!("{}: push webhook already present, updated", repo),
            Err(e) => warn!("{}: failed to configure push webhook: {}", repo, e),
        }
    }
}
