//! # Notify Command Implementation
//!
//! Announces a published release on Telegram. The bot token comes from
//! `TELEGRAM_BOT_TOKEN` and is only required when the tag matches a project
//! and at least one chat is configured.

use anyhow::Result;
use clap::Args;
use log::info;

use ci_core::backend::Backend;
use ci_core::config::Registry;
use ci_core::defaults::{CiPaths, TELEGRAM_TOKEN_ENV_VAR};
use ci_core::notify::notify_release;

/// Announce a published release on Telegram
#[derive(Args, Debug)]
pub struct NotifyArgs {
    /// Release tag, e.g. S24-ReSuki-20240105
    #[arg(long)]
    pub tag: String,

    /// Telegram bot token
    #[arg(long, env = TELEGRAM_TOKEN_ENV_VAR, hide_env_values = true)]
    pub bot_token: Option<String>,
}

/// Execute the `notify` command.
pub fn execute(args: NotifyArgs, paths: &CiPaths) -> Result<()> {
    let registry = Registry::load(&paths.config())?;
    let backend = Backend::system()?;
    let report = notify_release(
        &backend,
        paths,
        &registry,
        &args.tag,
        args.bot_token.as_deref(),
    )?;

    if report.project.is_some() {
        info!(
            "sent {} message(s) and {} document(s); {} failed, {} asset(s) skipped",
            report.messages_sent,
            report.documents_sent,
            report.failed_sends,
            report.skipped_assets.len()
        );
    }
    Ok(())
}
