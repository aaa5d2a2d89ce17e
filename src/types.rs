use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodexfigError;

/// Which physical location a config file resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// `$CODEX_HOME/config.toml`, falling back to `~/.codex/config.toml`.
    Home,
    /// `<workdir>/.codex/config.toml`.
    Project,
    /// An explicit path, made absolute against the current directory.
    Custom,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::Home => "home",
            Scope::Project => "project",
            Scope::Custom => "custom",
        })
    }
}

impl FromStr for Scope {
    type Err = CodexfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Scope::Home),
            "project" => Ok(Scope::Project),
            "custom" => Ok(Scope::Custom),
            other => Err(CodexfigError::PathResolution(format!(
                "invalid scope: {other}"
            ))),
        }
    }
}

/// How desired settings interact with content already on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Merge managed settings into the file, keeping every other key.
    #[default]
    PreserveUnknown,
    /// Overwrite the file with the managed settings only.
    ReplaceAll,
    /// Like `PreserveUnknown`, but refuse to touch a file with unrecognized root keys.
    FailOnUnknown,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MergeStrategy::PreserveUnknown => "preserve_unknown",
            MergeStrategy::ReplaceAll => "replace_all",
            MergeStrategy::FailOnUnknown => "fail_on_unknown",
        })
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "preserve_unknown" => Ok(MergeStrategy::PreserveUnknown),
            "replace_all" => Ok(MergeStrategy::ReplaceAll),
            "fail_on_unknown" => Ok(MergeStrategy::FailOnUnknown),
            other => Err(format!(
                "unknown merge strategy '{other}' (expected preserve_unknown, replace_all or fail_on_unknown)"
            )),
        }
    }
}

/// A write or read target: a scope plus the explicit path `Custom` requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTarget {
    pub scope: Scope,
    pub path: Option<PathBuf>,
}

impl ConfigTarget {
    pub fn home() -> Self {
        Self {
            scope: Scope::Home,
            path: None,
        }
    }

    pub fn project() -> Self {
        Self {
            scope: Scope::Project,
            path: None,
        }
    }

    pub fn custom(path: impl Into<PathBuf>) -> Self {
        Self {
            scope: Scope::Custom,
            path: Some(path.into()),
        }
    }
}
