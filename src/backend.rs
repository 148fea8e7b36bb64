//! The external collaborators every CI operation runs against.

use crate::error::Result;
use crate::git::Git;
use crate::github::GitHub;
use crate::http::{HttpClient, ReqwestClient};
use crate::process::{CommandRunner, SystemRunner};

/// Command runner plus HTTP client.
///
/// Production code uses [`Backend::system`]; tests inject mocks through
/// [`Backend::with_operations`].
pub struct Backend {
    runner: Box<dyn CommandRunner>,
    http: Box<dyn HttpClient>,
}

impl Backend {
    /// Real processes and real HTTP.
    pub fn system() -> Result<Self> {
        Ok(Self::with_operations(
            Box::new(SystemRunner),
            Box::new(ReqwestClient::new()?),
        ))
    }

    pub fn with_operations(runner: Box<dyn CommandRunner>, http: Box<dyn HttpClient>) -> Self {
        Self { runner, http }
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    pub fn git(&self) -> Git<'_> {
        Git::new(self.runner())
    }

    pub fn github<'a>(&'a self, token: Option<&'a str>) -> GitHub<'a> {
        GitHub::new(self.runner(), token)
    }
}
