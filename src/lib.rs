//! # Central Kernel CI Library
//!
//! This library implements the control plane of a central CI repository that
//! builds Android kernels for many downstream device repositories. It is used
//! by the `ci-core` command-line tool, which GitHub Actions workflows invoke
//! step by step.
//!
//! ## Core Concepts
//!
//! - **Registry (`config`)**: `configs/projects.json`, the list of downstream
//!   kernel projects plus global notification settings.
//! - **Variants (`variant`)**: the tracked KernelSU forks (`ksu`, `mksu`,
//!   `resukisu`). Each one is a branch in every project repository.
//! - **Upstream watcher (`upstream`)**: detects new upstream commits and turns
//!   them into work items.
//! - **Updater (`updater`)**: applies one upstream commit to one project
//!   branch.
//! - **Synchronizer (`sync`)**: pushes the centrally managed files (README,
//!   trigger workflow, shared ignore and funding files) to every project.
//! - **Build metadata (`meta`)**: release names, tags and build matrices.
//! - **Notifier (`notify`)**: announces releases on Telegram.
//!
//! ## External Collaborators
//!
//! Everything that leaves the process goes through two traits, bundled in
//! [`backend::Backend`]:
//!
//! - [`process::CommandRunner`] runs `git`, `gh` and `bash`;
//!   [`git::Git`] and [`github::GitHub`] are typed wrappers on top of it.
//! - [`http::HttpClient`] downloads setup scripts and drives the Telegram Bot
//!   API through [`telegram::TelegramBot`].
//!
//! Step results reach the workflow through [`output::CiOutput`], which appends
//! to the files named by `GITHUB_ENV` and `GITHUB_OUTPUT`.
//!
//! ## Quick Example
//!
//! ```
//! use ci_core::config::Registry;
//! use ci_core::meta::{build_matrix, BuildMeta};
//! use chrono::NaiveDate;
//!
//! let registry = Registry::parse(r#"{
//!     "projects": {
//!         "s24": {
//!             "repo": "owner/kernel_s24",
//!             "defconfig": "s24_defconfig",
//!             "localversion_base": "-Kokuban",
//!             "zip_name_prefix": "S24",
//!             "supported_ksu": ["sukisuultra", "ksu"]
//!         }
//!     }
//! }"#, "inline").unwrap();
//!
//! let project = registry.project("s24").unwrap();
//! let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
//! let meta = BuildMeta::compute(project, "resukisu", date);
//! assert_eq!(meta.release_tag, "S24-ReSuki-20240105");
//!
//! let matrix = build_matrix(project);
//! assert_eq!(matrix["include"][1]["branch"], "resukisu");
//! ```

pub mod backend;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod github;
pub mod http;
pub mod meta;
pub mod notify;
pub mod output;
pub mod process;
pub mod sync;
pub mod telegram;
pub mod template;
pub mod updater;
pub mod upstream;
pub mod variant;

#[cfg(test)]
mod test_support;
