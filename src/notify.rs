//! # Release Notifier
//!
//! Announces a published release on Telegram. The release tag is mapped back
//! to its project through the project's zip name prefix (the tag is
//! `<prefix>-<suffix>-<date>`), the release is read with `gh`, and a message
//! followed by every attachable asset is sent to each destination chat.
//!
//! Sends are tolerant: one chat rejecting a message or a file is logged and
//! the others are still served. Reading the release or downloading an asset
//! is fatal, since nothing useful can be sent without them.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::backend::Backend;
use crate::config::{GlobalConfig, ProjectRecord, Registry};
use crate::defaults::{CiPaths, MAX_ASSET_BYTES, SECONDARY_CHAT_MARKER, TELEGRAM_TOKEN_ENV_VAR};
use crate::error::{Error, Result};
use crate::github::Release;
use crate::telegram::{escape_html, Destination, TelegramBot, MAX_MESSAGE_CHARS};

/// Summary of one notifier run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub project: Option<String>,
    pub messages_sent: usize,
    pub documents_sent: usize,
    pub failed_sends: usize,
    pub skipped_assets: Vec<String>,
}

/// Finds the project a release tag belongs to.
///
/// The project with the longest `zip_name_prefix` that prefixes the tag wins.
/// Several projects sharing that longest prefix is an error.
pub fn resolve_project<'r>(registry: &'r Registry, tag: &str) -> Result<Option<(&'r str, &'r ProjectRecord)>> {
    let candidates: Vec<(&str, &ProjectRecord)> = registry
        .projects()
        .filter(|(_, p)| !p.zip_name_prefix.is_empty() && tag.starts_with(p.zip_name_prefix.as_str()))
        .collect();
    let Some(longest) = candidates.iter().map(|(_, p)| p.zip_name_prefix.len()).max() else {
        return Ok(None);
    };
    let best: Vec<(&str, &ProjectRecord)> = candidates
        .into_iter()
        .filter(|(_, p)| p.zip_name_prefix.len() == longest)
        .collect();
    match best.as_slice() {
        [single] => Ok(Some(*single)),
        many => Err(Error::AmbiguousRelease {
            tag: tag.to_string(),
            projects: many.iter().map(|(k, _)| *k).collect::<Vec<_>>().join(", "),
        }),
    }
}

/// Chats that should hear about `tag`, without duplicates.
pub fn destinations(globals: &GlobalConfig, tag: &str) -> Vec<Destination> {
    let mut out: Vec<Destination> = Vec::new();
    if let Some(channel) = &globals.broadcast_channel {
        out.push(Destination::new(channel.clone(), None));
    }
    if tag.contains(SECONDARY_CHAT_MARKER) {
        if let Some(chat) = &globals.resukisu_chat_id {
            let dest = Destination::new(chat.clone(), globals.resukisu_topic_id);
            if !out.contains(&dest) {
                out.push(dest);
            }
        }
    }
    out
}

/// Escapes `text`, cutting it with an ellipsis so the result fits `budget` chars.
fn fit_escaped(text: &str, budget: usize) -> String {
    let escaped = escape_html(text);
    if escaped.chars().count() <= budget {
        return escaped;
    }
    let mut out = String::new();
    let mut used = 0;
    let mut buf = [0u8; 4];
    for c in text.chars() {
        let piece = escape_html(c.encode_utf8(&mut buf));
        let len = piece.chars().count();
        if used + len + 1 > budget {
            break;
        }
        out.push_str(&piece);
        used += len;
    }
    if budget > 0 {
        out.push('…');
    }
    out
}

/// Escaped length budget of the release title line.
const MAX_TITLE_CHARS: usize = 256;

/// Builds the announcement, keeping it within Telegram's length limit.
pub fn compose_message(project_key: &str, tag: &str, release: &Release) -> String {
    let title = if release.name.trim().is_empty() { tag } else { release.name.as_str() };
    let head = format!(
        "🚀 <b>{}</b>\n\n<b>Project:</b> <code>{}</code>\n<b>Tag:</b> <code>{}</code>\n\n",
        fit_escaped(title, MAX_TITLE_CHARS),
        escape_html(project_key),
        escape_html(tag)
    );
    let tail = if release.url.is_empty() {
        String::new()
    } else {
        format!("\n\n<a href=\"{}\">Release page</a>", escape_html(&release.url))
    };

    let budget = MAX_MESSAGE_CHARS
        .saturating_sub(head.chars().count())
        .saturating_sub(tail.chars().count());
    let body = fit_escaped(release.body.trim(), budget);

    format!("{}{}{}", head, body, tail)
}

/// Announces `tag`. `bot_token` is only required once there is someone to notify.
pub fn notify_release(
    backend: &Backend,
    paths: &CiPaths,
    registry: &Registry,
    tag: &str,
    bot_token: Option<&str>,
) -> Result<NotifyReport> {
    let mut report = NotifyReport::default();

    let Some((key, project)) = resolve_project(registry, tag)? else {
        info!("no project matches release tag {}, nothing to do", tag);
        return Ok(report);
    };
    report.project = Some(key.to_string());

    let targets = destinations(&registry.globals, tag);
    if targets.is_empty() {
        info!("no notification destinations configured, nothing to do");
        return Ok(report);
    }

    let bot_token = bot_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::MissingInput {
            what: TELEGRAM_TOKEN_ENV_VAR.to_string(),
        })?;
    let bot = TelegramBot::new(backend.http(), bot_token);
    let github = backend.github(None);

    let release = github.release_view(&project.repo, tag)?;
    let message = compose_message(key, tag, &release);
    for dest in &targets {
        match bot.send_message(dest, &message) {
            Ok(()) => report.messages_sent += 1,
            Err(e) => {
                warn!("failed to notify {}: {}", dest.chat_id, e);
                report.failed_sends += 1;
            }
        }
    }

    let scratch = tempfile::Builder::new()
        .prefix("ci-notify-")
        .tempdir_in(paths.root())?;
    for asset in &release.assets {
        if asset.size > MAX_ASSET_BYTES {
            warn!(
                "skipping {} ({} bytes exceeds the {} byte upload limit)",
                asset.name, asset.size, MAX_ASSET_BYTES
            );
            report.skipped_assets.push(asset.name.clone());
            continue;
        }
        github.release_download(&project.repo, tag, &asset.name, scratch.path())?;
        let local = scratch.path().join(&asset.name);
        send_asset(&bot, &targets, &local, &asset.name, &mut report);
        if local.exists() {
            fs::remove_file(&local)?;
        }
    }
    Ok(report)
}

fn send_asset(bot: &TelegramBot<'_>, targets: &[Destination], file: &Path, name: &str, report: &mut NotifyReport) {
    let caption = format!("<code>{}</code>", escape_html(name));
    for dest in targets {
        match bot.send_document(dest, file, &caption) {
            Ok(()) => report.documents_sent += 1,
            Err(e) => {
                warn!("failed to send {} to {}: {}", name, dest.chat_id, e);
                report.failed_sends += 1;
            }
        }
    }
}
