//! # Build Metadata
//!
//! Pure functions turning a project record into the values the build workflow
//! consumes:
//!
//! - [`project_env`]: the `PROJECT_*` variables of one project (`parse`).
//! - [`BuildMeta`]: version string, release tag, zip name and title of one
//!   build of a branch on a given date (`meta`).
//! - [`build_matrix`]: the GitHub Actions matrix of branches to build
//!   (`matrix`).

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::config::ProjectRecord;
use crate::defaults::MAIN_BRANCH;
use crate::error::{Error, Result};

/// Date format used in release tags and titles.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Release suffix of a branch.
pub fn variant_suffix(branch: &str) -> String {
    match branch {
        "main" | "lkm" => "LKM".to_string(),
        "ksu" => "KSU".to_string(),
        "mksu" => "MKSU".to_string(),
        "resukisu" | "sukisuultra" => "ReSuki".to_string(),
        other => other.to_uppercase(),
    }
}

/// Parses a `YYYYMMDD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::MissingInput {
        what: format!("a date in YYYYMMDD form, got '{}' ({})", s, e),
    })
}

/// Naming of a single build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMeta {
    pub suffix: String,
    pub final_localversion: String,
    pub release_tag: String,
    pub final_zip_name: String,
    pub release_title: String,
}

impl BuildMeta {
    pub fn compute(project: &ProjectRecord, branch: &str, date: NaiveDate) -> Self {
        let suffix = variant_suffix(branch);
        let date = date.format(DATE_FORMAT).to_string();
        let prefix = &project.zip_name_prefix;
        let release_tag = format!("{}-{}-{}", prefix, suffix, date);
        Self {
            final_localversion: format!("{}-{}", project.localversion_base, suffix),
            final_zip_name: format!("{}.zip", release_tag),
            release_title: format!("{} {} Build ({})", prefix, suffix, date),
            release_tag,
            suffix,
        }
    }

    /// Environment assignments in the order they are exported.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("BUILD_VARIANT_SUFFIX", self.suffix.clone()),
            ("FINAL_LOCALVERSION", self.final_localversion.clone()),
            ("RELEASE_TAG", self.release_tag.clone()),
            ("FINAL_ZIP_NAME", self.final_zip_name.clone()),
            ("RELEASE_TITLE", self.release_title.clone()),
        ]
    }
}

/// The `PROJECT_*` environment of a project.
pub fn project_env(project: &ProjectRecord) -> Result<Vec<(&'static str, String)>> {
    let mut vars = vec![
        ("PROJECT_REPO", project.repo.clone()),
        ("PROJECT_DEFCONFIG", project.defconfig.clone()),
        ("PROJECT_LOCALVERSION_BASE", project.localversion_base.clone()),
        ("PROJECT_LTO", project.lto.clone().unwrap_or_default()),
        (
            "PROJECT_TOOLCHAIN_PREFIX",
            project.toolchain_path_prefix.clone().unwrap_or_default(),
        ),
        ("PROJECT_ZIP_NAME", project.zip_name_prefix.clone()),
        ("PROJECT_AK3_REPO", project.anykernel_repo.clone()),
        ("PROJECT_AK3_BRANCH", project.anykernel_branch.clone()),
        ("PROJECT_VERSION_METHOD", project.version_method.clone()),
        ("PROJECT_EXTRA_HOST_ENV", project.extra_host_env.to_string()),
        (
            "PROJECT_TOOLCHAIN_EXPORTS",
            serde_json::to_string(&project.toolchain_path_exports)?,
        ),
        (
            "PROJECT_DISABLE_SECURITY",
            serde_json::to_string(&project.disable_security)?,
        ),
    ];
    if let Some(urls) = &project.toolchain_urls {
        vars.push(("PROJECT_TOOLCHAIN_URLS", serde_json::to_string(urls)?));
    }
    Ok(vars)
}

/// `{"include": [{"branch": "main"}, ...]}` for every supported variant.
pub fn build_matrix(project: &ProjectRecord) -> Value {
    let include: Vec<Value> = std::iter::once(MAIN_BRANCH)
        .chain(project.supported_ksu.iter().map(|v| v.as_str()))
        .map(|branch| json!({ "branch": branch }))
        .collect();
    json!({ "include": include })
}
