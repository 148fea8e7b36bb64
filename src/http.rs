//! # HTTP Access
//!
//! The updater downloads variant setup scripts and the notifier talks to the
//! Telegram Bot API. Both go through the [`HttpClient`] trait so tests can
//! record requests instead of touching the network.
//!
//! [`ReqwestClient`] is the production implementation on top of
//! `reqwest::blocking`. Request URLs may carry secrets (Telegram puts the bot
//! token in the path), so every URL is passed through [`display_url`] before
//! it reaches an error or a log line.

use std::path::Path;
use std::time::Duration;

use log::debug;
use reqwest::blocking::{multipart, Client, Response};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::git::redact_url;

/// Longest error body echoed back from a failed request.
const MAX_ERROR_BODY: usize = 512;

/// Blocking HTTP operations used by the CI.
pub trait HttpClient {
    /// GET `url` and return the body as text.
    fn get_text(&self, url: &str) -> Result<String>;

    /// POST `body` as JSON and return the decoded JSON response.
    fn post_json(&self, url: &str, body: &Value) -> Result<Value>;

    /// POST a multipart form with text `fields` plus `file` under `file_field`.
    fn post_multipart(
        &self,
        url: &str,
        fields: &[(String, String)],
        file_field: &str,
        file: &Path,
    ) -> Result<Value>;
}

/// Host of the Telegram Bot API, which carries the token as a `bot<token>` path segment.
const TELEGRAM_HOST: &str = "api.telegram.org";

/// Masks credentials in `url`: userinfo, and the bot token of Telegram URLs.
pub fn display_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return redact_url(url);
    };
    if parsed.host_str() != Some(TELEGRAM_HOST) {
        return redact_url(url);
    }
    let segments: Option<Vec<String>> = parsed.path_segments().map(|segments| {
        segments
            .map(|segment| {
                if segment.starts_with("bot") {
                    "bot***".to_string()
                } else {
                    segment.to_string()
                }
            })
            .collect()
    });
    if let Some(segments) = segments {
        parsed.set_path(&format!("/{}", segments.join("/")));
    }
    redact_url(parsed.as_str())
}

/// [`HttpClient`] backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
    upload_client: Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        let build = |secs: u64| {
            Client::builder()
                .timeout(Duration::from_secs(secs))
                .user_agent(concat!("ci-core/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| Error::Network {
                    url: String::new(),
                    message: format!("failed to build HTTP client: {}", e),
                })
        };
        Ok(Self {
            client: build(60)?,
            upload_client: build(600)?,
        })
    }

    fn send_error(url: &str, err: reqwest::Error) -> Error {
        Error::Network {
            url: display_url(url),
            message: err.without_url().to_string(),
        }
    }

    fn check_status(url: &str, res: Response) -> Result<Response> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().unwrap_or_default();
        let body: String = body.chars().take(MAX_ERROR_BODY).collect();
        Err(Error::Network {
            url: display_url(url),
            message: format!("HTTP {}: {}", status, body.trim()),
        })
    }

    fn decode_json(url: &str, res: Response) -> Result<Value> {
        let res = Self::check_status(url, res)?;
        res.json::<Value>().map_err(|e| Self::send_error(url, e))
    }
}

impl HttpClient for ReqwestClient {
    fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", display_url(url));
        let res = self
            .client
            .get(url)
            .send()
            .map_err(|e| Self::send_error(url, e))?;
        Self::check_status(url, res)?
            .text()
            .map_err(|e| Self::send_error(url, e))
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        debug!("POST {}", display_url(url));
        let res = self
            .client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| Self::send_error(url, e))?;
        Self::decode_json(url, res)
    }

    fn post_multipart(
        &self,
        url: &str,
        fields: &[(String, String)],
        file_field: &str,
        file: &Path,
    ) -> Result<Value> {
        debug!("POST {} ({})", display_url(url), file.display());
        let mut form = multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name.clone(), value.clone());
        }
        let form = form.file(file_field.to_string(), file)?;
        let res = self
            .upload_client
            .post(url)
            .multipart(form)
            .send()
            .map_err(|e| Self::send_error(url, e))?;
        Self::decode_json(url, res)
    }
}
