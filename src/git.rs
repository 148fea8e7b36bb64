//! Typed `git` operations on top of a [`CommandRunner`].
//!
//! This uses the system git command, so credentials configured on the CI
//! runner (credential helpers, SSH keys) keep working. Tokens are embedded
//! into HTTPS clone URLs by [`authenticated_url`] and scrubbed from anything
//! that is displayed by [`redact_url`].

use std::path::Path;

use url::Url;

use crate::defaults::{BOT_EMAIL, BOT_NAME};
use crate::error::{Error, Result};
use crate::process::{Cmd, CommandRunner};

/// HTTPS clone URL of a GitHub `owner/name` slug, with the token as username.
pub fn authenticated_url(repo: &str, token: Option<&str>) -> Result<String> {
    let mut url = Url::parse(&format!("https://github.com/{}.git", repo))?;
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        url.set_username(token).map_err(|_| Error::Network {
            url: redact_url(url.as_str()),
            message: "cannot embed credentials into URL".to_string(),
        })?;
    }
    Ok(url.into())
}

/// Replaces the userinfo part of every URL in `text` with `***`.
pub fn redact_url(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find("://") {
        let (head, tail) = rest.split_at(idx + 3);
        out.push_str(head);
        let end = tail
            .find(|c: char| c == '/' || c.is_whitespace())
            .unwrap_or(tail.len());
        let authority = &tail[..end];
        match authority.rfind('@') {
            Some(at) => {
                out.push_str("***");
                out.push_str(&authority[at..]);
            }
            None => out.push_str(authority),
        }
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

/// Parses the first `<hash>\t<ref>` line of `git ls-remote` output.
pub fn parse_ls_remote_head(output: &str) -> Option<String> {
    let hash = output.lines().next()?.split_whitespace().next()?;
    let valid = hash.len() >= 7 && hash.chars().all(|c| c.is_ascii_hexdigit());
    valid.then(|| hash.to_ascii_lowercase())
}

/// Git commands bound to a runner.
#[derive(Clone, Copy)]
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn git(dir: &Path) -> Cmd {
        Cmd::new("git").current_dir(dir)
    }

    /// Clones `url` into `target`, optionally a single shallow branch.
    pub fn clone_repo(&self, url: &str, target: &Path, branch: Option<&str>) -> Result<()> {
        let mut cmd = Cmd::new("git").arg("clone");
        if let Some(branch) = branch {
            cmd = cmd.args(["--depth=1", "--branch", branch]);
        }
        let cmd = cmd.arg(url).arg(target.to_string_lossy());
        self.runner.run(&cmd).map_err(|e| Error::GitClone {
            url: redact_url(url),
            r#ref: branch.unwrap_or("HEAD").to_string(),
            message: e.to_string(),
        })
    }

    /// Head commit of `branch` on the remote, without cloning.
    pub fn remote_head(&self, url: &str, branch: &str) -> Result<String> {
        let cmd = Cmd::new("git")
            .arg("ls-remote")
            .arg(url)
            .arg(format!("refs/heads/{}", branch));
        let output = self.runner.capture(&cmd)?;
        parse_ls_remote_head(&output).ok_or_else(|| Error::Command {
            command: cmd.to_string(),
            stderr: format!("no commit found for branch '{}'", branch),
        })
    }

    /// Branch names known on `origin`, without the `origin/` prefix.
    pub fn remote_branches(&self, dir: &Path) -> Result<Vec<String>> {
        let output = self.runner.capture(&Self::git(dir).args(["branch", "-r"]))?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.contains("->"))
            .map(|l| l.trim_start_matches("origin/").to_string())
            .collect())
    }

    pub fn checkout(&self, dir: &Path, branch: &str) -> Result<()> {
        self.runner
            .run(&Self::git(dir).args(["checkout", branch]))
    }

    pub fn rename_current_branch(&self, dir: &Path, new_name: &str) -> Result<()> {
        self.runner
            .run(&Self::git(dir).args(["branch", "-m", new_name]))
    }

    pub fn push_set_upstream(&self, dir: &Path, branch: &str) -> Result<()> {
        self.runner
            .run(&Self::git(dir).args(["push", "origin", "-u", branch]))
    }

    pub fn delete_remote_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        self.runner
            .run(&Self::git(dir).args(["push", "origin", "--delete", branch]))
    }

    pub fn push_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        self.runner
            .run(&Self::git(dir).args(["push", "origin", branch]))
    }

    /// Pushes the checked-out branch to its upstream.
    pub fn push_current(&self, dir: &Path) -> Result<()> {
        self.runner.run(&Self::git(dir).arg("push"))
    }

    /// Configures the bot identity for commits in `dir`.
    pub fn set_identity(&self, dir: &Path) -> Result<()> {
        self.runner
            .run(&Self::git(dir).args(["config", "user.name", BOT_NAME]))?;
        self.runner
            .run(&Self::git(dir).args(["config", "user.email", BOT_EMAIL]))
    }

    pub fn add_all(&self, dir: &Path) -> Result<()> {
        self.runner.run(&Self::git(dir).args(["add", "."]))
    }

    /// True when `git status --porcelain` reports anything.
    pub fn is_dirty(&self, dir: &Path) -> Result<bool> {
        let status = self
            .runner
            .capture(&Self::git(dir).args(["status", "--porcelain"]))?;
        Ok(!status.trim().is_empty())
    }

    pub fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        self.runner
            .run(&Self::git(dir).args(["commit", "-m", message]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockRunner;
    use std::path::PathBuf;

    #[test]
    fn test_authenticated_url() {
        assert_eq!(
            authenticated_url("owner/kernel", Some("ghp_abc")).unwrap(),
            "https://ghp_abc@github.com/owner/kernel.git"
        );
        assert_eq!(
            authenticated_url("owner/kernel", None).unwrap(),
            "https://github.com/owner/kernel.git"
        );
        assert_eq!(
            authenticated_url("owner/kernel", Some("")).unwrap(),
            "https://github.com/owner/kernel.git"
        );
    }

    #[test]
    fn test_redact_url() {
        assert_eq!(
            redact_url("https://ghp_abc@github.com/owner/kernel.git"),
            "https://***@github.com/owner/kernel.git"
        );
        assert_eq!(
            redact_url("fatal: unable to access 'https://user:pw@github.com/o/r.git/': 403"),
            "fatal: unable to access 'https://***@github.com/o/r.git/': 403"
        );
        assert_eq!(
            redact_url("https://github.com/owner/kernel.git"),
            "https://github.com/owner/kernel.git"
        );
        assert_eq!(redact_url("--depth=1"), "--depth=1");
    }

    #[test]
    fn test_parse_ls_remote_head() {
        let out = "0123456789abcdef0123456789abcdef01234567\trefs/heads/main\n";
        assert_eq!(
            parse_ls_remote_head(out),
            Some("0123456789abcdef0123456789abcdef01234567".to_string())
        );
        assert_eq!(parse_ls_remote_head(""), None);
        assert_eq!(parse_ls_remote_head("not-a-hash\trefs/heads/main"), None);
    }

    #[test]
    fn test_remote_head_queries_branch_ref() {
        let runner = MockRunner::new().respond(
            "ls-remote",
            Ok("abcdef0123456789abcdef0123456789abcdef01\trefs/heads/main".into()),
        );
        let git = Git::new(&runner);
        let head = git
            .remote_head("https://github.com/tiann/KernelSU.git", "main")
            .unwrap();
        assert_eq!(head, "abcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(
            runner.calls()[0].argv(),
            vec![
                "git",
                "ls-remote",
                "https://github.com/tiann/KernelSU.git",
                "refs/heads/main"
            ]
        );
    }

    #[test]
    fn test_remote_head_empty_output_is_error() {
        let runner = MockRunner::new().respond("ls-remote", Ok(String::new()));
        let git = Git::new(&runner);
        assert!(git.remote_head("https://example.com/r.git", "main").is_err());
    }

    #[test]
    fn test_remote_branches_parsing() {
        let runner = MockRunner::new().respond(
            "branch -r",
            Ok("  origin/HEAD -> origin/main\n  origin/main\n  origin/ksu\n  origin/sukisuultra".into()),
        );
        let git = Git::new(&runner);
        let branches = git.remote_branches(Path::new("/work/p")).unwrap();
        assert_eq!(branches, vec!["main", "ksu", "sukisuultra"]);
    }

    #[test]
    fn test_is_dirty() {
        let dirty = MockRunner::new().respond("status --porcelain", Ok(" M README.md".into()));
        assert!(Git::new(&dirty).is_dirty(Path::new("/r")).unwrap());

        let clean = MockRunner::new();
        assert!(!Git::new(&clean).is_dirty(Path::new("/r")).unwrap());
    }

    #[test]
    fn test_clone_failure_redacts_token() {
        let runner = MockRunner::new().respond("clone", Err("Authentication failed".into()));
        let git = Git::new(&runner);
        let err = git
            .clone_repo(
                "https://ghp_secret@github.com/o/r.git",
                &PathBuf::from("/tmp/x"),
                Some("ksu"),
            )
            .unwrap_err();
        let shown = err.to_string();
        assert!(!shown.contains("ghp_secret"));
        assert!(shown.contains("@ksu"));
        assert!(shown.contains("Authentication failed"));
    }

    #[test]
    fn test_shallow_clone_arguments() {
        let runner = MockRunner::new();
        let git = Git::new(&runner);
        git.clone_repo("https://github.com/o/r.git", Path::new("/tmp/k"), Some("mksu"))
            .unwrap();
        assert_eq!(
            runner.calls()[0].argv(),
            vec![
                "git",
                "clone",
                "--depth=1",
                "--branch",
                "mksu",
                "https://github.com/o/r.git",
                "/tmp/k"
            ]
        );
    }
}
