//! Telegram Bot API client for release announcements.

use std::path::Path;

use serde_json::{json, Value};

use crate::config::ChatId;
use crate::error::{Error, Result};
use crate::http::HttpClient;

pub const API_BASE: &str = "https://api.telegram.org";

/// Hard limit of a Telegram text message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// A chat, optionally narrowed to a forum topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub chat_id: ChatId,
    pub topic_id: Option<i64>,
}

impl Destination {
    pub fn new(chat_id: ChatId, topic_id: Option<i64>) -> Self {
        Self { chat_id, topic_id }
    }
}

/// Escapes text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// A bot identified by its token.
pub struct TelegramBot<'a> {
    http: &'a dyn HttpClient,
    token: String,
    api_base: String,
}

impl<'a> TelegramBot<'a> {
    pub fn new(http: &'a dyn HttpClient, token: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
            api_base: API_BASE.to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    fn check(method: &str, response: Result<Value>) -> Result<()> {
        let response = response.map_err(|e| Error::Telegram {
            method: method.to_string(),
            message: e.to_string(),
        })?;
        if response.get("ok").and_then(Value::as_bool) == Some(false) {
            let description = response
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("request rejected");
            return Err(Error::Telegram {
                method: method.to_string(),
                message: description.to_string(),
            });
        }
        Ok(())
    }

    /// Sends an HTML message without link previews.
    pub fn send_message(&self, dest: &Destination, html: &str) -> Result<()> {
        let mut body = json!({
            "chat_id": dest.chat_id,
            "text": html,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(topic) = dest.topic_id {
            body["message_thread_id"] = json!(topic);
        }
        Self::check(
            "sendMessage",
            self.http.post_json(&self.method_url("sendMessage"), &body),
        )
    }

    /// Uploads `file` as a document with an HTML caption.
    pub fn send_document(&self, dest: &Destination, file: &Path, caption: &str) -> Result<()> {
        let mut fields = vec![
            ("chat_id".to_string(), dest.chat_id.to_string()),
            ("caption".to_string(), caption.to_string()),
            ("parse_mode".to_string(), "HTML".to_string()),
        ];
        if let Some(topic) = dest.topic_id {
            fields.push(("message_thread_id".to_string(), topic.to_string()));
        }
        Self::check(
            "sendDocument",
            self.http
                .post_multipart(&self.method_url("sendDocument"), &fields, "document", file),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{HttpCall, MockHttp};
    use tempfile::TempDir;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>A & "B"</b>"#),
            "&lt;b&gt;A &amp; &quot;B&quot;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_send_message_payload() {
        let http = MockHttp::new();
        let bot = TelegramBot::new(&http, "123:abc");
        bot.send_message(&Destination::new(ChatId::Id(-100), Some(7)), "<b>hi</b>")
            .unwrap();

        let calls = http.calls();
        assert_eq!(calls.len(), 1);
        let HttpCall::Json { url, body } = &calls[0] else {
            panic!("expected JSON call");
        };
        assert_eq!(url, "https://api.telegram.org/bot123:abc/sendMessage");
        assert_eq!(body["chat_id"], -100);
        assert_eq!(body["parse_mode"], "HTML");
        assert_eq!(body["message_thread_id"], 7);
        assert_eq!(body["text"], "<b>hi</b>");
    }

    #[test]
    fn test_send_message_without_topic() {
        let http = MockHttp::new();
        let bot = TelegramBot::new(&http, "t");
        bot.send_message(&Destination::new(ChatId::Name("@chan".into()), None), "x")
            .unwrap();
        let HttpCall::Json { body, .. } = &http.calls()[0] else {
            panic!("expected JSON call");
        };
        assert_eq!(body["chat_id"], "@chan");
        assert!(body.get("message_thread_id").is_none());
    }

    #[test]
    fn test_send_document_fields() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("Kernel.zip");
        std::fs::write(&file, b"zip").unwrap();

        let http = MockHttp::new();
        let bot = TelegramBot::new(&http, "t");
        bot.send_document(&Destination::new(ChatId::Id(5), Some(9)), &file, "<code>Kernel.zip</code>")
            .unwrap();

        let HttpCall::Multipart { url, fields, .. } = &http.calls()[0] else {
            panic!("expected multipart call");
        };
        assert!(url.ends_with("/sendDocument"));
        assert!(fields.contains(&("chat_id".to_string(), "5".to_string())));
        assert!(fields.contains(&("message_thread_id".to_string(), "9".to_string())));
    }

    #[test]
    fn test_http_failure_becomes_telegram_error() {
        let http = MockHttp::new().failing_on("sendMessage");
        let bot = TelegramBot::new(&http, "t");
        let err = bot
            .send_message(&Destination::new(ChatId::Id(1), None), "x")
            .unwrap_err();
        assert!(matches!(err, Error::Telegram { ref method, .. } if method == "sendMessage"));
    }
}
