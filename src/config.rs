//! # Project Registry
//!
//! This module defines the JSON registry of downstream kernel projects
//! (`configs/projects.json`) and the global notification settings stored next
//! to them.
//!
//! ## Layout
//!
//! The registry is written as two sections:
//!
//! ```json
//! {
//!   "projects": { "<key>": { "repo": "owner/name", ... } },
//!   "globals": { "broadcast_channel": "@channel" }
//! }
//! ```
//!
//! Older files kept projects at the top level and stored globals under the
//! reserved `_globals` key. Those files still load: `_globals` becomes the
//! `globals` section, any other `_`-prefixed key is ignored, and the next save
//! rewrites the file in the sectioned layout. Nothing outside this module has
//! to filter reserved keys.
//!
//! Project order is the order of the file and is preserved through
//! load/save, since the watcher and the notifier iterate in that order.

use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::{
    DEFAULT_ANYKERNEL_BRANCH, DEFAULT_ANYKERNEL_REPO, DEFAULT_DEVICE_NAME_CN,
    DEFAULT_DEVICE_NAME_EN, DEFAULT_VERSION_METHOD, DEFAULT_ZIP_NAME, RESERVED_KEY_PREFIX,
};
use crate::error::{Error, Result};
use crate::variant::{self, Variant};

const PROJECTS_SECTION: &str = "projects";
const GLOBALS_SECTION: &str = "globals";
const LEGACY_GLOBALS_KEY: &str = "_globals";

fn default_zip_name() -> String {
    DEFAULT_ZIP_NAME.into()
}

fn default_anykernel_repo() -> String {
    DEFAULT_ANYKERNEL_REPO.into()
}

fn default_anykernel_branch() -> String {
    DEFAULT_ANYKERNEL_BRANCH.into()
}

fn default_version_method() -> String {
    DEFAULT_VERSION_METHOD.into()
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One downstream kernel repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// GitHub `owner/name` slug of the project repository.
    pub repo: String,
    pub defconfig: String,
    pub localversion_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain_path_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toolchain_path_exports: Vec<String>,
    /// Passed through to the build workflow untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain_urls: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disable_security: Vec<String>,
    #[serde(default = "default_zip_name")]
    pub zip_name_prefix: String,
    #[serde(default = "default_anykernel_repo")]
    pub anykernel_repo: String,
    #[serde(default = "default_anykernel_branch")]
    pub anykernel_branch: String,
    #[serde(default = "default_version_method")]
    pub version_method: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub extra_host_env: bool,
    #[serde(default)]
    pub supported_ksu: Vec<Variant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_placeholders: Option<ReadmePlaceholders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_server: Option<PushServer>,
    /// Fields this tool does not interpret, kept so saves are lossless.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Device names substituted into the README template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadmePlaceholders {
    #[serde(default, alias = "DEVICE_NAME_CN", skip_serializing_if = "Option::is_none")]
    pub cn: Option<String>,
    #[serde(default, alias = "DEVICE_NAME_EN", skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
}

/// Push notifications from the project repository to an external server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushServer {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl PushServer {
    /// The webhook target, if delivery is switched on.
    pub fn active_webhook(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

impl ProjectRecord {
    /// Creates a record with the defaults used by `add`.
    pub fn new(
        repo: impl Into<String>,
        defconfig: impl Into<String>,
        localversion_base: impl Into<String>,
    ) -> Self {
        Self {
            repo: repo.into(),
            defconfig: defconfig.into(),
            localversion_base: localversion_base.into(),
            lto: None,
            toolchain_path_prefix: None,
            toolchain_path_exports: Vec::new(),
            toolchain_urls: None,
            disable_security: Vec::new(),
            zip_name_prefix: default_zip_name(),
            anykernel_repo: default_anykernel_repo(),
            anykernel_branch: default_anykernel_branch(),
            version_method: default_version_method(),
            extra_host_env: false,
            supported_ksu: Vec::new(),
            readme_placeholders: None,
            push_server: None,
            extra: Map::new(),
        }
    }

    /// The owner half of the `owner/name` slug.
    pub fn repo_owner(&self) -> &str {
        self.repo.split('/').next().unwrap_or_default()
    }

    pub fn supports(&self, variant: Variant) -> bool {
        self.supported_ksu.contains(&variant)
    }

    /// Chinese and English device names, falling back to placeholders.
    pub fn device_names(&self) -> (&str, &str) {
        let placeholders = self.readme_placeholders.as_ref();
        let cn = placeholders
            .and_then(|p| p.cn.as_deref())
            .unwrap_or(DEFAULT_DEVICE_NAME_CN);
        let en = placeholders
            .and_then(|p| p.en.as_deref())
            .unwrap_or(DEFAULT_DEVICE_NAME_EN);
        (cn, en)
    }

    /// Checks the registry invariants for this record.
    pub fn validate(&self, key: &str) -> Result<()> {
        validate_repo_slug(&self.repo).map_err(|message| Error::InvalidProject {
            key: key.to_string(),
            message,
        })
    }
}

/// Checks that `repo` is a non-empty `owner/name` slug.
pub fn validate_repo_slug(repo: &str) -> std::result::Result<(), String> {
    let Some((owner, name)) = repo.split_once('/') else {
        return Err(format!("repo '{}' is not an 'owner/name' slug", repo));
    };
    let valid_part = |s: &str| !s.is_empty() && !s.contains('/') && !s.contains(char::is_whitespace);
    if !valid_part(owner) || !valid_part(name) {
        return Err(format!("repo '{}' is not an 'owner/name' slug", repo));
    }
    Ok(())
}

/// A Telegram chat identifier: numeric id or `@channel` name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Name(String),
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Id(id) => write!(f, "{}", id),
            ChatId::Name(name) => f.write_str(name),
        }
    }
}

/// Notification routing shared by every project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Chat that receives every release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_channel: Option<ChatId>,
    /// Chat that additionally receives ReSuki releases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resukisu_chat_id: Option<ChatId>,
    /// Forum topic inside `resukisu_chat_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resukisu_topic_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The full contents of `configs/projects.json`.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    projects: Vec<(String, ProjectRecord)>,
    pub globals: GlobalConfig,
}

impl Registry {
    /// Loads the registry, returning an empty one if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("{} not found, starting from an empty registry", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parses registry JSON; `origin` names the source in error messages.
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let parse_err = |message: String| Error::ConfigParse {
            path: origin.to_string(),
            message,
        };

        let value: Value = serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?;
        let Value::Object(root) = value else {
            return Err(parse_err("top-level value must be an object".into()));
        };

        let sectioned = matches!(root.get(PROJECTS_SECTION), Some(Value::Object(_)))
            || (!root.is_empty()
                && root
                    .keys()
                    .all(|k| k == PROJECTS_SECTION || k == GLOBALS_SECTION));

        let mut registry = Registry::default();
        let project_entries: Map<String, Value> = if sectioned {
            for key in root.keys() {
                if key != PROJECTS_SECTION && key != GLOBALS_SECTION {
                    debug!("ignoring top-level key '{}'", key);
                }
            }
            if let Some(globals) = root.get(GLOBALS_SECTION) {
                registry.globals = serde_json::from_value(globals.clone())
                    .map_err(|e| parse_err(format!("globals: {}", e)))?;
            }
            match root.get(PROJECTS_SECTION) {
                Some(Value::Object(map)) => map.clone(),
                Some(_) => return Err(parse_err("'projects' must be an object".into())),
                None => Map::new(),
            }
        } else {
            let mut entries = Map::new();
            for (key, value) in root {
                if key == LEGACY_GLOBALS_KEY {
                    registry.globals = serde_json::from_value(value)
                        .map_err(|e| parse_err(format!("{}: {}", LEGACY_GLOBALS_KEY, e)))?;
                } else if key.starts_with(RESERVED_KEY_PREFIX) {
                    debug!("ignoring reserved key '{}'", key);
                } else {
                    entries.insert(key, value);
                }
            }
            entries
        };

        for (key, value) in project_entries {
            let mut record: ProjectRecord = serde_json::from_value(value)
                .map_err(|e| parse_err(format!("project '{}': {}", key, e)))?;
            record.supported_ksu = variant::normalize_list(record.supported_ksu);
            record.validate(&key)?;
            registry.projects.push((key, record));
        }

        Ok(registry)
    }

    /// Serializes the registry in the sectioned layout.
    pub fn to_json_string(&self) -> Result<String> {
        let mut projects = Map::new();
        for (key, record) in &self.projects {
            projects.insert(key.clone(), serde_json::to_value(record)?);
        }
        let mut root = Map::new();
        root.insert(PROJECTS_SECTION.into(), Value::Object(projects));
        root.insert(GLOBALS_SECTION.into(), serde_json::to_value(&self.globals)?);
        let mut out = serde_json::to_string_pretty(&Value::Object(root))?;
        out.push('\n');
        Ok(out)
    }

    /// Overwrites `path` with the registry contents.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&ProjectRecord> {
        self.projects
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, record)| record)
    }

    /// Looks up a project, failing if the key is unknown.
    pub fn project(&self, key: &str) -> Result<&ProjectRecord> {
        self.get(key).ok_or_else(|| Error::UnknownProject {
            key: key.to_string(),
        })
    }

    /// Projects in file order.
    pub fn projects(&self) -> impl Iterator<Item = (&str, &ProjectRecord)> {
        self.projects.iter().map(|(k, record)| (k.as_str(), record))
    }

    /// Inserts or replaces a project, returning the previous record.
    ///
    /// A replaced project keeps its position; new projects are appended.
    pub fn insert(&mut self, key: impl Into<String>, record: ProjectRecord) -> Option<ProjectRecord> {
        let key = key.into();
        if let Some((_, existing)) = self.projects.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(existing, record));
        }
        self.projects.push((key, record));
        None
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
