//! # Variant Vocabulary
//!
//! The CI tracks a fixed set of KernelSU forks ("variants"). Each variant maps
//! to a branch of the same name in every project repository, to an upstream
//! source whose head is watched, and to a setup script that wires the variant
//! into a kernel tree.
//!
//! One fork was renamed upstream. Its old identifier still shows up in older
//! config files, tracker files, CLI invocations and project branches, so
//! [`normalize_name`] is the single place that rewrites it. Every boundary where
//! a variant name enters the system goes through it: serde (via an alias),
//! [`Variant::from_str`], the upstream tracker loader and the branch migration
//! in the synchronizer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The identifier `resukisu` was published under before the rename.
pub const LEGACY_NAME: &str = "sukisuultra";

/// A tracked KernelSU fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Ksu,
    Mksu,
    #[serde(alias = "sukisuultra")]
    Resukisu,
}

/// Where a variant's upstream head lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamSource {
    pub repo: &'static str,
    pub branch: &'static str,
}

/// How a variant is installed into a kernel tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupProcedure {
    pub script_url: &'static str,
    pub args: &'static [&'static str],
}

impl Variant {
    /// All variants in declaration order.
    pub const ALL: [Variant; 3] = [Variant::Ksu, Variant::Mksu, Variant::Resukisu];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Ksu => "ksu",
            Variant::Mksu => "mksu",
            Variant::Resukisu => "resukisu",
        }
    }

    /// The name this variant's branch and tracker key used to have, if any.
    pub fn legacy_name(self) -> Option<&'static str> {
        match self {
            Variant::Resukisu => Some(LEGACY_NAME),
            _ => None,
        }
    }

    pub fn upstream(self) -> UpstreamSource {
        match self {
            Variant::Ksu => UpstreamSource {
                repo: "https://github.com/tiann/KernelSU.git",
                branch: "main",
            },
            Variant::Mksu => UpstreamSource {
                repo: "https://github.com/5ec1cff/KernelSU.git",
                branch: "main",
            },
            Variant::Resukisu => UpstreamSource {
                repo: "https://github.com/ReSukiSU/ReSukiSU.git",
                branch: "main",
            },
        }
    }

    pub fn setup(self) -> Option<SetupProcedure> {
        match self {
            Variant::Ksu => Some(SetupProcedure {
                script_url: "https://raw.githubusercontent.com/tiann/KernelSU/main/kernel/setup.sh",
                args: &["main"],
            }),
            Variant::Mksu => Some(SetupProcedure {
                script_url: "https://raw.githubusercontent.com/5ec1cff/KernelSU/main/kernel/setup.sh",
                args: &["main"],
            }),
            Variant::Resukisu => Some(SetupProcedure {
                script_url:
                    "https://raw.githubusercontent.com/ReSukiSU/ReSukiSU/main/kernel/setup.sh",
                args: &["builtin"],
            }),
        }
    }

    /// Looks up the variant owning a branch name, accepting the legacy name.
    pub fn from_branch(branch: &str) -> Option<Variant> {
        branch.parse().ok()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = normalize_name(s.trim());
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str() == name)
            .ok_or_else(|| Error::UnknownVariant {
                name: s.to_string(),
                expected: Variant::ALL.map(Variant::as_str).join(", "),
            })
    }
}

/// Rewrites the legacy variant identifier to its current name.
///
/// Idempotent: names that are already current are returned unchanged.
pub fn normalize_name(name: &str) -> &str {
    if name == LEGACY_NAME {
        Variant::Resukisu.as_str()
    } else {
        name
    }
}

/// Normalizes a variant list, collapsing duplicates but keeping first-seen order.
pub fn normalize_list(variants: impl IntoIterator<Item = Variant>) -> Vec<Variant> {
    let mut out = Vec::new();
    for v in variants {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}
