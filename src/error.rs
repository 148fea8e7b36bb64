//! # Error Handling
//!
//! This module defines the centralized error type for `ci-core`. Every
//! library operation returns [`Result<T>`], and each [`Error`] variant carries
//! enough context (paths, project keys, commands, URLs) to diagnose a failed
//! CI run from its log alone.
//!
//! Failure classes:
//!
//! - Configuration and tracker files that cannot be parsed.
//! - Unknown project keys, invalid project records and unknown variants.
//! - External commands (`git`, `gh`, `bash`) exiting non-zero.
//! - HTTP and Telegram Bot API failures.
//! - Release tags that resolve to more than one project.
//! - Missing required inputs such as bot tokens.
//! - Template rendering problems.
//!
//! URLs stored in errors are always redacted before they are embedded, so
//! tokens never reach CI logs.

use thiserror::Error;

/// Main error type for ci-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A JSON config or tracker file exists but could not be parsed.
    #[error("Configuration parsing error in {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// The requested project key is not present in the registry.
    #[error("Project not found: {key}")]
    UnknownProject { key: String },

    /// A project record violates a registry invariant.
    #[error("Invalid project '{key}': {message}")]
    InvalidProject { key: String, message: String },

    /// A variant name outside the tracked vocabulary.
    #[error("Unknown variant '{name}' (expected one of: {expected})")]
    UnknownVariant { name: String, expected: String },

    /// An external command could not be spawned or exited non-zero.
    #[error("Command failed: {command} - {stderr}")]
    Command { command: String, stderr: String },

    /// Cloning a project repository failed.
    #[error("Git clone error for {url}@{r#ref}: {message}")]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
    },

    /// An HTTP request failed or returned a non-success status.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// The Telegram Bot API rejected a call.
    #[error("Telegram {method} failed: {message}")]
    Telegram { method: String, message: String },

    /// More than one project claims the release tag with the same prefix.
    #[error("Release tag '{tag}' matches several projects: {projects}")]
    AmbiguousRelease { tag: String, projects: String },

    /// A required input (token, file, value) was not supplied.
    #[error("Missing required input: {what}")]
    MissingInput { what: String },

    /// A template could not be rendered into a valid document.
    #[error("Template processing error in {template}: {message}")]
    Template { template: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
