//! Recording test doubles for the command and HTTP seams.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::process::{Cmd, CommandRunner};

/// A `CommandRunner` that records every command and answers from rules.
///
/// A rule matches when its pattern is a substring of the space-joined argv.
/// The first matching rule wins; unmatched commands succeed with no output.
/// `git clone` creates its target directory (plus any files registered with
/// [`MockRunner::clone_with`]) and `gh release download` creates the requested
/// asset, so code under test can touch the files it expects.
#[derive(Clone, Default)]
pub struct MockRunner {
    calls: Arc<Mutex<Vec<Cmd>>>,
    rules: Arc<Mutex<Vec<(String, std::result::Result<String, String>)>>>,
    clone_files: Arc<Mutex<Vec<(String, String)>>>,
    captures: Arc<Mutex<Vec<Capture>>>,
}

/// Contents of a file read when a matching command runs.
pub type Captured = Arc<Mutex<Option<String>>>;

struct Capture {
    pattern: String,
    relative: String,
    slot: Captured,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, pattern: &str, output: std::result::Result<String, String>) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((pattern.to_string(), output));
        self
    }

    /// Adds a file, relative to the clone target, to every `git clone`.
    pub fn clone_with(self, relative: &str, content: &str) -> Self {
        self.clone_files
            .lock()
            .unwrap()
            .push((relative.to_string(), content.to_string()));
        self
    }

    /// Reads `relative` (from the command's working directory) the next time
    /// a command matching `pattern` runs.
    pub fn capture_file_on(&self, pattern: &str, relative: &str) -> Captured {
        let slot = Captured::default();
        self.captures.lock().unwrap().push(Capture {
            pattern: pattern.to_string(),
            relative: relative.to_string(),
            slot: slot.clone(),
        });
        slot
    }

    pub fn calls(&self) -> Vec<Cmd> {
        self.calls.lock().unwrap().clone()
    }

    /// Space-joined argv of every recorded command.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| c.argv().join(" "))
            .collect()
    }

    fn answer(&self, cmd: &Cmd) -> Result<String> {
        self.calls.lock().unwrap().push(cmd.clone());
        let line = cmd.argv().join(" ");
        for capture in self.captures.lock().unwrap().iter() {
            if line.contains(capture.pattern.as_str()) {
                let dir = cmd.cwd.clone().unwrap_or_default();
                *capture.slot.lock().unwrap() = fs::read_to_string(dir.join(&capture.relative)).ok();
            }
        }
        let rule = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, output)| output.clone());
        match rule {
            Some(Err(stderr)) => Err(Error::Command {
                command: cmd.to_string(),
                stderr,
            }),
            Some(Ok(stdout)) => {
                self.simulate_side_effects(cmd);
                Ok(stdout)
            }
            None => {
                self.simulate_side_effects(cmd);
                Ok(String::new())
            }
        }
    }
}

fn flag_value<'a>(cmd: &'a Cmd, flag: &str) -> Option<&'a str> {
    cmd.args
        .iter()
        .position(|a| a == flag)
        .and_then(|i| cmd.args.get(i + 1))
        .map(String::as_str)
}

impl MockRunner {
    fn simulate_side_effects(&self, cmd: &Cmd) {
        let args: Vec<&str> = cmd.args.iter().map(String::as_str).collect();
        match (cmd.program.as_str(), args.as_slice()) {
            ("git", ["clone", .., target]) => {
                fs::create_dir_all(target).unwrap();
                for (relative, content) in self.clone_files.lock().unwrap().iter() {
                    let path = Path::new(target).join(relative);
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent).unwrap();
                    }
                    fs::write(path, content).unwrap();
                }
            }
            ("gh", ["release", "download", ..]) => {
                if let (Some(dir), Some(name)) = (flag_value(cmd, "--dir"), flag_value(cmd, "--pattern")) {
                    fs::write(Path::new(dir).join(name), b"asset").unwrap();
                }
            }
            _ => {}
        }
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &Cmd) -> Result<()> {
        self.answer(cmd).map(|_| ())
    }

    fn capture(&self, cmd: &Cmd) -> Result<String> {
        self.answer(cmd)
    }
}

/// A recorded HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpCall {
    Get(String),
    Json { url: String, body: Value },
    Multipart {
        url: String,
        fields: Vec<(String, String)>,
        file: PathBuf,
    },
}

impl HttpCall {
    pub fn url(&self) -> &str {
        match self {
            HttpCall::Get(url) => url,
            HttpCall::Json { url, .. } => url,
            HttpCall::Multipart { url, .. } => url,
        }
    }
}

/// An `HttpClient` that records calls and returns canned bodies.
///
/// POSTs to a URL containing one of the `failing` fragments return an error.
#[derive(Clone, Default)]
pub struct MockHttp {
    calls: Arc<Mutex<Vec<HttpCall>>>,
    get_body: String,
    failing: Vec<String>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_get_body(mut self, body: &str) -> Self {
        self.get_body = body.to_string();
        self
    }

    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.failing.push(fragment.to_string());
        self
    }

    pub fn calls(&self) -> Vec<HttpCall> {
        self.calls.lock().unwrap().clone()
    }

    fn post_result(&self, url: &str) -> Result<Value> {
        if self.failing.iter().any(|f| url.contains(f.as_str())) {
            return Err(Error::Network {
                url: url.to_string(),
                message: "HTTP 400 Bad Request".to_string(),
            });
        }
        Ok(json!({"ok": true, "result": {}}))
    }
}

impl HttpClient for MockHttp {
    fn get_text(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(HttpCall::Get(url.to_string()));
        Ok(self.get_body.clone())
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        self.calls.lock().unwrap().push(HttpCall::Json {
            url: url.to_string(),
            body: body.clone(),
        });
        self.post_result(url)
    }

    fn post_multipart(
        &self,
        url: &str,
        fields: &[(String, String)],
        _file_field: &str,
        file: &Path,
    ) -> Result<Value> {
        assert!(file.exists(), "uploaded file must exist: {}", file.display());
        self.calls.lock().unwrap().push(HttpCall::Multipart {
            url: url.to_string(),
            fields: fields.to_vec(),
            file: file.to_path_buf(),
        });
        self.post_result(url)
    }
}
