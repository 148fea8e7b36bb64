//! # CI Output Channels
//!
//! GitHub Actions reads step results from two files whose paths it exports to
//! every step:
//!
//! - `GITHUB_ENV`: `KEY=VALUE` lines that become environment variables of the
//!   following steps (`parse`, `meta`).
//! - `GITHUB_OUTPUT`: `name=value` lines that become step outputs (`matrix`,
//!   `watch`).
//!
//! When a variable is not set, for example when the tool runs on a developer
//! machine, the same lines are printed to stdout instead. Logging goes to
//! stderr, so stdout only ever carries these lines.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::error::Result;

pub const ENV_FILE_VAR: &str = "GITHUB_ENV";
pub const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";

/// Destinations for CI environment variables and step outputs.
#[derive(Debug, Clone, Default)]
pub struct CiOutput {
    env_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

impl CiOutput {
    /// Uses the files named by `GITHUB_ENV` / `GITHUB_OUTPUT`, when set.
    pub fn from_env() -> Self {
        let var = |name: &str| {
            env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            env_file: var(ENV_FILE_VAR),
            output_file: var(OUTPUT_FILE_VAR),
        }
    }

    pub fn with_files(env_file: Option<PathBuf>, output_file: Option<PathBuf>) -> Self {
        Self {
            env_file,
            output_file,
        }
    }

    /// Exports environment variables for later workflow steps.
    pub fn set_env<K, V>(&self, vars: &[(K, V)]) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let lines: Vec<String> = vars
            .iter()
            .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
            .collect();
        emit(self.env_file.as_ref(), &lines)
    }

    /// Records step outputs.
    pub fn set_outputs<K, V>(&self, outputs: &[(K, V)]) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let lines: Vec<String> = outputs
            .iter()
            .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
            .collect();
        emit(self.output_file.as_ref(), &lines)
    }

    /// Records a single step output. Without an output file only the bare
    /// value is printed, so stdout can be piped straight into `jq`.
    pub fn set_output_value(&self, name: &str, value: &str) -> Result<()> {
        match self.output_file.as_ref() {
            Some(path) => emit(Some(path), &[format!("{}={}", name, value)]),
            None => emit(None, &[value.to_string()]),
        }
    }
}

fn emit(file: Option<&PathBuf>, lines: &[String]) -> Result<()> {
    match file {
        Some(path) => {
            let mut f = OpenOptions::new().append(true).create(true).open(path)?;
            for line in lines {
                writeln!(f, "{}", line)?;
            }
        }
        None => {
            for line in lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
