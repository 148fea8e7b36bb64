//! # Add Command Implementation
//!
//! This module implements the `add` subcommand, which registers a downstream
//! kernel repository in `configs/projects.json`.
//!
//! ## Functionality
//!
//! - **Validation**: `--repo` must be an `owner/name` slug.
//! - **Defaults**: new projects support every variant and have push delivery
//!   switched off.
//! - **Overwrite**: an existing key is replaced in place, with a warning.

use anyhow::{anyhow, Result};
use clap::Args;
use log::{info, warn};

use ci_core::config::{validate_repo_slug, ProjectRecord, PushServer, ReadmePlaceholders, Registry};
use ci_core::defaults::{
    CiPaths, DEFAULT_ANYKERNEL_BRANCH, DEFAULT_ANYKERNEL_REPO, DEFAULT_DEVICE_NAME_CN,
    DEFAULT_DEVICE_NAME_EN, DEFAULT_ZIP_NAME,
};
use ci_core::variant::Variant;

/// Register or replace a project in the registry
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Project key
    #[arg(long)]
    pub key: String,

    /// GitHub repository as owner/name
    #[arg(long)]
    pub repo: String,

    /// Kernel defconfig name
    #[arg(long)]
    pub defconfig: String,

    /// LOCALVERSION base string
    #[arg(long)]
    pub localversion: String,

    /// Device name shown in the Chinese README
    #[arg(long, default_value = DEFAULT_DEVICE_NAME_CN)]
    pub device_cn: String,

    /// Device name shown in the English README
    #[arg(long, default_value = DEFAULT_DEVICE_NAME_EN)]
    pub device_en: String,

    /// AnyKernel3 repository URL
    #[arg(long, default_value = DEFAULT_ANYKERNEL_REPO)]
    pub ak3_repo: String,

    /// AnyKernel3 branch
    #[arg(long, default_value = DEFAULT_ANYKERNEL_BRANCH)]
    pub ak3_branch: String,

    /// Prefix of release zips and tags
    #[arg(long, default_value = DEFAULT_ZIP_NAME)]
    pub zip_name: String,

    /// Toolchain path prefix
    #[arg(long, default_value = "")]
    pub toolchain_prefix: String,
}

impl AddArgs {
    fn into_record(self) -> ProjectRecord {
        let mut record = ProjectRecord::new(self.repo, self.defconfig, self.localversion);
        record.zip_name_prefix = self.zip_name;
        record.anykernel_repo = self.ak3_repo;
        record.anykernel_branch = self.ak3_branch;
        record.toolchain_path_prefix = Some(self.toolchain_prefix).filter(|p| !p.is_empty());
        record.supported_ksu = vec![Variant::Resukisu, Variant::Mksu, Variant::Ksu];
        record.readme_placeholders = Some(ReadmePlaceholders {
            cn: Some(self.device_cn),
            en: Some(self.device_en),
        });
        record.push_server = Some(PushServer::default());
        record
    }
}

/// Execute the `add` command.
pub fn execute(args: AddArgs, paths: &CiPaths) -> Result<()> {
    validate_repo_slug(&args.repo).map_err(|message| anyhow!("invalid --repo: {}", message))?;

    let config_path = paths.config();
    let mut registry = Registry::load(&config_path)?;
    let key = args.key.clone();
    let record = args.into_record();

    if registry.insert(key.clone(), record).is_some() {
        warn!("project '{}' already existed and was overwritten", key);
    }
    registry.save(&config_path)?;
    info!("saved project '{}' to {}", key, config_path.display());
    Ok(())
}
