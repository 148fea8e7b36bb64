//! # Repository Templates
//!
//! The synchronizer writes two generated files into every project repository:
//!
//! - `README.md`, rendered from `templates/README.md.tpl`. The template holds
//!   both a Chinese and an English version, each wrapped in
//!   `<!-- LANG:zh-CN -->...<!-- /LANG:zh-CN -->` or
//!   `<!-- LANG:en-US -->...<!-- /LANG:en-US -->` markers, and
//!   [`ReadmeLanguage`] selects which of them survive.
//! - `.github/workflows/trigger-central-build.yml`, rendered from
//!   `templates/trigger-central-build.yml.tpl`. The result must still be valid
//!   YAML, since a broken workflow file would silently stop all builds of the
//!   project.
//!
//! Substitution is plain token replacement (`__NAME__`); there is no template
//! language.

use std::fmt;
use std::fs;
use std::str::FromStr;

use regex::Regex;

use crate::config::ProjectRecord;
use crate::defaults::CiPaths;
use crate::error::{Error, Result};

pub const README_TEMPLATE: &str = "README.md.tpl";
pub const TRIGGER_TEMPLATE: &str = "trigger-central-build.yml.tpl";

/// File name of the rendered trigger workflow inside `.github/workflows/`.
pub const TRIGGER_WORKFLOW_FILE: &str = "trigger-central-build.yml";

const ZH_CN: &str = "zh-CN";
const EN_US: &str = "en-US";

/// Which language sections of the README are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadmeLanguage {
    #[default]
    Both,
    Chinese,
    English,
}

impl FromStr for ReadmeLanguage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "both" => Ok(ReadmeLanguage::Both),
            ZH_CN => Ok(ReadmeLanguage::Chinese),
            EN_US => Ok(ReadmeLanguage::English),
            other => Err(format!(
                "unknown README language '{}' (expected both, zh-CN or en-US)",
                other
            )),
        }
    }
}

impl fmt::Display for ReadmeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReadmeLanguage::Both => "both",
            ReadmeLanguage::Chinese => ZH_CN,
            ReadmeLanguage::English => EN_US,
        })
    }
}

impl ReadmeLanguage {
    /// The language whose sections are removed, if any.
    fn dropped(self) -> Option<&'static str> {
        match self {
            ReadmeLanguage::Both => None,
            ReadmeLanguage::Chinese => Some(EN_US),
            ReadmeLanguage::English => Some(ZH_CN),
        }
    }
}

/// Both template sources, read once per synchronizer run.
#[derive(Debug, Clone)]
pub struct Templates {
    pub readme: String,
    pub trigger: String,
}

impl Templates {
    pub fn load(paths: &CiPaths) -> Result<Self> {
        let read = |name: &str| {
            let path = paths.template(name);
            fs::read_to_string(&path).map_err(|e| Error::MissingInput {
                what: format!("template {} ({})", path.display(), e),
            })
        };
        Ok(Self {
            readme: read(README_TEMPLATE)?,
            trigger: read(TRIGGER_TEMPLATE)?,
        })
    }
}

/// Renders the README of one project.
pub fn render_readme(template: &str, project: &ProjectRecord, language: ReadmeLanguage) -> Result<String> {
    let (cn, en) = project.device_names();
    let mut content = template
        .replace("__DEVICE_NAME_CN__", cn)
        .replace("__DEVICE_NAME_EN__", en)
        .replace("__PROJECT_REPO__", &project.repo)
        .replace("__LOCALVERSION_BASE__", &project.localversion_base);

    if let Some(lang) = language.dropped() {
        let section = Regex::new(&format!(
            r"(?s)<!--\s*LANG:{lang}\s*-->.*?<!--\s*/LANG:{lang}\s*-->",
            lang = regex::escape(lang)
        ))?;
        content = section.replace_all(&content, "").into_owned();
    }

    let markers = Regex::new(r"<!--\s*/?LANG:(?:zh-CN|en-US)\s*-->")?;
    Ok(markers.replace_all(&content, "").trim().to_string())
}

/// Renders the trigger workflow of one project and checks that it is YAML.
pub fn render_trigger(template: &str, project_key: &str, repo_owner: &str) -> Result<String> {
    let content = template
        .replace("__PROJECT_KEY__", project_key)
        .replace("__REPO_OWNER__", repo_owner);
    serde_yaml::from_str::<serde_yaml::Value>(&content).map_err(|e| Error::Template {
        template: TRIGGER_TEMPLATE.to_string(),
        message: format!("rendered workflow for '{}' is not valid YAML: {}", project_key, e),
    })?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReadmePlaceholders;
    use tempfile::TempDir;

    const README: &str = "\
# Kernel for __DEVICE_NAME_EN__

<!-- LANG:zh-CN -->
适用于 __DEVICE_NAME_CN__ 的内核。
<!-- /LANG:zh-CN -->

<!-- LANG:en-US -->
Kernel for __DEVICE_NAME_EN__, built from __PROJECT_REPO__ (__LOCALVERSION_BASE__).
<!-- /LANG:en-US -->
";

    fn project() -> ProjectRecord {
        let mut p = ProjectRecord::new("YuzakiKokuban/kernel_s24", "s24_defconfig", "-Kokuban");
        p.readme_placeholders = Some(ReadmePlaceholders {
            cn: Some("三星 S24".into()),
            en: Some("Samsung S24".into()),
        });
        p
    }

    #[test]
    fn test_readme_both_languages() {
        let out = render_readme(README, &project(), ReadmeLanguage::Both).unwrap();
        assert!(out.starts_with("# Kernel for Samsung S24"));
        assert!(out.contains("适用于 三星 S24 的内核。"));
        assert!(out.contains("built from YuzakiKokuban/kernel_s24 (-Kokuban)"));
        assert!(!out.contains("LANG:"));
        assert!(!out.contains("__"));
    }

    #[test]
    fn test_readme_chinese_only() {
        let out = render_readme(README, &project(), ReadmeLanguage::Chinese).unwrap();
        assert!(out.contains("三星 S24"));
        assert!(!out.contains("built from"));
        assert!(!out.contains("LANG:"));
    }

    #[test]
    fn test_readme_english_only() {
        let out = render_readme(README, &project(), ReadmeLanguage::English).unwrap();
        assert!(!out.contains("适用于"));
        assert!(out.contains("built from"));
        assert_eq!(out, out.trim());
    }

    #[test]
    fn test_readme_default_device_names() {
        let p = ProjectRecord::new("o/r", "d", "-x");
        let out = render_readme("__DEVICE_NAME_CN__ / __DEVICE_NAME_EN__", &p, ReadmeLanguage::Both).unwrap();
        assert_eq!(out, "未知设备 / Unknown Device");
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("both".parse::<ReadmeLanguage>().unwrap(), ReadmeLanguage::Both);
        assert_eq!("zh-CN".parse::<ReadmeLanguage>().unwrap(), ReadmeLanguage::Chinese);
        assert_eq!("en-US".parse::<ReadmeLanguage>().unwrap(), ReadmeLanguage::English);
        assert!("fr".parse::<ReadmeLanguage>().is_err());
        assert_eq!(ReadmeLanguage::Chinese.to_string(), "zh-CN");
    }

    #[test]
    fn test_render_trigger() {
        let template = "name: Trigger\non:\n  push:\njobs:\n  call:\n    uses: __REPO_OWNER__/ci/.github/workflows/build.yml@main\n    with:\n      project: __PROJECT_KEY__\n";
        let out = render_trigger(template, "s24_sm8650", "YuzakiKokuban").unwrap();
        assert!(out.contains("uses: YuzakiKokuban/ci/"));
        assert!(out.contains("project: s24_sm8650"));
    }

    #[test]
    fn test_render_trigger_rejects_invalid_yaml() {
        let err = render_trigger("jobs: [__PROJECT_KEY__", "p", "o").unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
        assert!(err.to_string().contains("'p'"));
    }

    #[test]
    fn test_shipped_templates_render() {
        let trigger = include_str!("../templates/trigger-central-build.yml.tpl");
        let out = render_trigger(trigger, "s24_sm8650", "YuzakiKokuban").unwrap();
        assert!(out.contains("-f project=s24_sm8650"));
        assert!(out.contains("--repo YuzakiKokuban/"));

        let readme = include_str!("../templates/README.md.tpl");
        for language in [ReadmeLanguage::Both, ReadmeLanguage::Chinese, ReadmeLanguage::English] {
            let out = render_readme(readme, &project(), language).unwrap();
            assert!(!out.contains("__"));
            assert!(!out.contains("<!--"));
        }
    }

    #[test]
    fn test_templates_load_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Templates::load(&CiPaths::new(temp_dir.path())).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
        assert!(err.to_string().contains("README.md.tpl"));
    }
}
