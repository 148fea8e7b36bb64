//! Shared test utilities for E2E tests.
//!
//! This module provides a fixture that lays out a CI root (registry, tracker,
//! templates) in a temporary directory, plus the registry snippets the tests
//! use.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_registry(registries::SECTIONED);
//!     fixture.command().args(["parse", "--project", "s24"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::registries;
    pub use super::TestFixture;
}

/// Registry files for testing.
#[allow(dead_code)]
pub mod registries {
    /// Two projects in the sectioned layout, with notification globals.
    pub const SECTIONED: &str = r#"{
  "projects": {
    "s24": {
      "repo": "YuzakiKokuban/android_kernel_samsung_s24",
      "defconfig": "s24_defconfig",
      "localversion_base": "-android14-Kokuban",
      "zip_name_prefix": "S24",
      "supported_ksu": ["resukisu", "mksu", "ksu"],
      "toolchain_urls": ["https://example.com/clang.tar.gz"]
    },
    "a54": {
      "repo": "YuzakiKokuban/android_kernel_samsung_a54",
      "defconfig": "a54_defconfig",
      "localversion_base": "-Kokuban",
      "zip_name_prefix": "A54"
    }
  },
  "globals": {}
}
"#;

    /// The flat layout with reserved `_` keys and the legacy variant name.
    pub const LEGACY: &str = r#"{
  "_globals": {"broadcast_channel": "@kokuban_kernels"},
  "_comment": "managed by ci-core",
  "s24": {
    "repo": "YuzakiKokuban/android_kernel_samsung_s24",
    "defconfig": "s24_defconfig",
    "localversion_base": "-android14-Kokuban",
    "zip_name_prefix": "S24",
    "supported_ksu": ["sukisuultra", "ksu"]
  }
}
"#;

    /// Not JSON at all.
    pub const MALFORMED: &str = "{ \"projects\": ";
}

/// A temporary CI root directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new fixture with an empty CI root.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `configs/projects.json`.
    pub fn with_registry(self, content: &str) -> Self {
        self.with_file("configs/projects.json", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the CI root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the registry file.
    #[allow(dead_code)]
    pub fn registry_path(&self) -> PathBuf {
        self.temp_dir.path().join("configs/projects.json")
    }

    /// Create a child path in the CI root.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A command rooted at this fixture with CI output files unset.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ci-core");
        cmd.current_dir(self.path())
            .env_remove("GITHUB_ENV")
            .env_remove("GITHUB_OUTPUT")
            .env_remove("CI_CENTRAL_ROOT")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_registry() {
        let fixture = TestFixture::new().with_registry(registries::SECTIONED);
        assert!(fixture.registry_path().exists());
    }

    #[test]
    fn test_registries_are_valid_json() {
        for content in [registries::SECTIONED, registries::LEGACY] {
            serde_json::from_str::<serde_json::Value>(content).expect("registry should be JSON");
        }
        assert!(serde_json::from_str::<serde_json::Value>(registries::MALFORMED).is_err());
    }
}
