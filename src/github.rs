//! # GitHub Hosting Operations
//!
//! Repository settings and release data are handled through the `gh` CLI,
//! which is preinstalled on GitHub-hosted runners. When a token is supplied it
//! is handed to the child as `GH_TOKEN`; otherwise `gh` falls back to whatever
//! authentication the environment already provides.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::process::{Cmd, CommandRunner};

/// A release asset as reported by `gh release view --json assets`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub url: String,
}

/// Release metadata as reported by `gh release view --json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct Hook {
    id: u64,
    #[serde(default)]
    config: HookConfig,
}

#[derive(Debug, Default, Deserialize)]
struct HookConfig {
    #[serde(default)]
    url: Option<String>,
}

/// `gh` commands bound to a runner and an optional token.
#[derive(Clone, Copy)]
pub struct GitHub<'a> {
    runner: &'a dyn CommandRunner,
    token: Option<&'a str>,
}

impl<'a> GitHub<'a> {
    pub fn new(runner: &'a dyn CommandRunner, token: Option<&'a str>) -> Self {
        Self {
            runner,
            token: token.filter(|t| !t.is_empty()),
        }
    }

    fn gh(&self) -> Cmd {
        let cmd = Cmd::new("gh");
        match self.token {
            Some(token) => cmd.env("GH_TOKEN", token),
            None => cmd,
        }
    }

    /// Sets a repository Actions secret; the value travels on stdin.
    pub fn set_secret(&self, repo: &str, name: &str, value: &str) -> Result<()> {
        let cmd = self
            .gh()
            .args(["secret", "set", name, "--repo", repo])
            .stdin(value);
        self.runner.run(&cmd)
    }

    /// Enables the sponsor button on the repository.
    pub fn enable_sponsorships(&self, repo: &str) -> Result<()> {
        let cmd = self.gh().args([
            "api".to_string(),
            "--method".to_string(),
            "PATCH".to_string(),
            format!("repos/{}", repo),
            "-F".to_string(),
            "has_sponsorships=true".to_string(),
            "--silent".to_string(),
        ]);
        self.runner.run(&cmd)
    }

    /// Creates the push webhook for `url`, or re-activates an existing one.
    ///
    /// Returns `true` when a new hook was created.
    pub fn ensure_push_webhook(&self, repo: &str, url: &str) -> Result<bool> {
        let listing = self
            .runner
            .capture(&self.gh().args(["api".to_string(), format!("repos/{}/hooks", repo)]))?;
        let hooks: Vec<Hook> = if listing.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&listing)?
        };
        let existing = hooks
            .iter()
            .find(|h| h.config.url.as_deref() == Some(url))
            .map(|h| h.id);

        let (method, endpoint) = match existing {
            Some(id) => ("PATCH", format!("repos/{}/hooks/{}", repo, id)),
            None => ("POST", format!("repos/{}/hooks", repo)),
        };
        let mut cmd = self.gh().args(["api", "--method", method]).arg(endpoint);
        if existing.is_none() {
            cmd = cmd.args(["-f", "name=web"]);
        }
        let cmd = cmd
            .arg("-f")
            .arg(format!("config[url]={}", url))
            .args([
                "-f",
                "config[content_type]=json",
                "-F",
                "active=true",
                "-f",
                "events[]=push",
                "--silent",
            ]);
        self.runner.run(&cmd)?;
        Ok(existing.is_none())
    }

    /// Fetches name, body, URL and assets of a release.
    pub fn release_view(&self, repo: &str, tag: &str) -> Result<Release> {
        let cmd = self.gh().args([
            "release",
            "view",
            tag,
            "--repo",
            repo,
            "--json",
            "assets,body,name,url",
        ]);
        let output = self.runner.capture(&cmd)?;
        let value: Value = serde_json::from_str(&output)?;
        serde_json::from_value(value).map_err(|e| Error::Command {
            command: cmd.to_string(),
            stderr: format!("unexpected release JSON: {}", e),
        })
    }

    /// Downloads one asset of a release into `dir`.
    pub fn release_download(&self, repo: &str, tag: &str, asset: &str, dir: &Path) -> Result<()> {
        let cmd = self
            .gh()
            .args(["release", "download", tag, "--repo", repo, "--pattern", asset])
            .arg("--dir")
            .arg(dir.to_string_lossy())
            .arg("--clobber");
        self.runner.run(&cmd)
    }
}
