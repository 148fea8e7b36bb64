//! Default values and on-disk layout of the central CI repository.
//!
//! This module provides centralized constants used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the CI root directory.
pub const ROOT_ENV_VAR: &str = "CI_CENTRAL_ROOT";

/// Key prefix marking non-project metadata in legacy flat configs.
pub const RESERVED_KEY_PREFIX: &str = "_";

/// Branches synchronized in every project repository, in processing order.
pub const TARGET_BRANCHES: [&str; 4] = ["main", "ksu", "mksu", "resukisu"];

/// The branch every build matrix starts with.
pub const MAIN_BRANCH: &str = "main";

/// Build scripts from the pre-central CI era, removed during sync.
pub const OBSOLETE_FILES: [&str; 4] = [
    "build.sh",
    "build_kernel.sh",
    "update.sh",
    "update-kernelsu.yml",
];

/// Default commit message for the bulk synchronizer.
pub const SYNC_COMMIT_MESSAGE: &str = "[skip ci] ci: Sync central CI files";

/// Git identity used for every commit pushed by the CI.
pub const BOT_NAME: &str = "Kokuban-Bot";
pub const BOT_EMAIL: &str = "bot@kokuban.dev";

/// Repository secret receiving the CI token during sync.
pub const CI_TOKEN_SECRET: &str = "CI_TOKEN";

/// File written into a project checkout to record the variant commit.
pub const VERSION_MARKER_FILE: &str = "KERNELSU_VERSION.txt";

/// Name the downloaded variant setup script is stored under.
pub const SETUP_SCRIPT_NAME: &str = "setup.sh";

/// Project record defaults.
pub const DEFAULT_ZIP_NAME: &str = "Kernel";
pub const DEFAULT_ANYKERNEL_REPO: &str = "https://github.com/YuzakiKokuban/AnyKernel3.git";
pub const DEFAULT_ANYKERNEL_BRANCH: &str = "master";
pub const DEFAULT_VERSION_METHOD: &str = "param";
pub const DEFAULT_DEVICE_NAME_CN: &str = "未知设备";
pub const DEFAULT_DEVICE_NAME_EN: &str = "Unknown Device";

/// Telegram bot uploads are capped at 50 MiB.
pub const MAX_ASSET_BYTES: u64 = 50 * 1024 * 1024;

/// Tags containing this marker are also announced to the secondary chat.
pub const SECONDARY_CHAT_MARKER: &str = "ReSuki";

/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_ENV_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const GITHUB_TOKEN_ENV_VAR: &str = "GH_TOKEN";

/// Paths of every file the CI reads or writes, relative to the CI root.
#[derive(Debug, Clone)]
pub struct CiPaths {
    root: PathBuf,
}

impl CiPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> PathBuf {
        self.root.join("configs/projects.json")
    }

    pub fn upstream(&self) -> PathBuf {
        self.root.join("configs/upstream_commits.json")
    }

    pub fn universal_gitignore(&self) -> PathBuf {
        self.root.join("configs/universal.gitignore")
    }

    pub fn funding(&self) -> PathBuf {
        self.root.join(".github/FUNDING.yml")
    }

    pub fn workspace(&self) -> PathBuf {
        self.root.join("kernel_workspace")
    }

    pub fn template(&self, name: &str) -> PathBuf {
        self.root.join("templates").join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_rooted() {
        let paths = CiPaths::new("/srv/ci");
        assert_eq!(paths.config(), PathBuf::from("/srv/ci/configs/projects.json"));
        assert_eq!(
            paths.upstream(),
            PathBuf::from("/srv/ci/configs/upstream_commits.json")
        );
        assert_eq!(
            paths.template("README.md.tpl"),
            PathBuf::from("/srv/ci/templates/README.md.tpl")
        );
        assert!(paths.workspace().starts_with(paths.root()));
    }

    #[test]
    fn test_target_branches_start_with_main() {
        assert_eq!(TARGET_BRANCHES[0], MAIN_BRANCH);
    }
}
