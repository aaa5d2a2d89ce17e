//! Clap adapter for codexfig.
//!
//! Compiled only with the `clap` feature (on by default). It provides two
//! derive types you can `#[command(flatten)]` into your own parser:
//! [`TargetArgs`] chooses which file an operation touches, and [`WriteArgs`]
//! carries per-invocation write options.
//!
//! The bridge to the core is [`TargetArgs::into_target`] and
//! [`WriteArgs::into_overrides`]; only flags the user actually passed end up
//! in the override table, so compiled defaults stay in charge of the rest.

use std::path::PathBuf;

use clap::Args;
use toml::{Table, Value};

use crate::error::CodexfigError;
use crate::options::WriteOptions;
use crate::types::{ConfigTarget, MergeStrategy, Scope};

fn parse_scope(s: &str) -> Result<Scope, String> {
    s.parse::<Scope>().map_err(|e| e.to_string())
}

/// Which config file to operate on.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Config scope: home, project or custom.
    #[arg(long, default_value = "home", value_parser = parse_scope)]
    pub scope: Scope,

    /// Explicit file path (required for the custom scope).
    #[arg(long)]
    pub path: Option<PathBuf>,
}

impl TargetArgs {
    pub fn into_target(self) -> ConfigTarget {
        ConfigTarget {
            scope: self.scope,
            path: self.path,
        }
    }
}

/// Per-invocation write options.
#[derive(Debug, Args)]
pub struct WriteArgs {
    /// How to combine with the existing file: preserve_unknown, replace_all or fail_on_unknown.
    #[arg(long)]
    pub merge_strategy: Option<MergeStrategy>,

    /// Octal permission bits for the written file (e.g. 0600).
    #[arg(long)]
    pub file_mode: Option<String>,

    /// Skip the `.bak` copy of the previous file.
    #[arg(long)]
    pub no_backup: bool,

    /// Fail instead of creating missing parent directories.
    #[arg(long)]
    pub no_create_dirs: bool,

    /// Skip the typed re-parse before writing.
    #[arg(long)]
    pub no_validate: bool,

    /// Persist MCP server environment maps.
    #[arg(long)]
    pub allow_sensitive_env_writes: bool,

    /// Delete the file on remove instead of keeping it.
    #[arg(long)]
    pub delete_on_remove: bool,
}

impl WriteArgs {
    /// The flags that were given, as a sparse options layer.
    pub fn into_overrides(self) -> Table {
        let mut table = Table::new();
        if let Some(strategy) = self.merge_strategy {
            table.insert("merge_strategy".into(), Value::String(strategy.to_string()));
        }
        if let Some(mode) = self.file_mode {
            table.insert("file_mode".into(), Value::String(mode));
        }
        let flags = [
            ("backup_on_write", self.no_backup, false),
            ("create_directories", self.no_create_dirs, false),
            ("validate_strict", self.no_validate, false),
            (
                "allow_sensitive_env_writes",
                self.allow_sensitive_env_writes,
                true,
            ),
            ("keep_file_on_destroy", self.delete_on_remove, false),
        ];
        for (key, given, value) in flags {
            if given {
                table.insert(key.into(), Value::Boolean(value));
            }
        }
        table
    }

    pub fn into_options(self) -> Result<WriteOptions, CodexfigError> {
        WriteOptions::resolve(self.into_overrides())
    }
}
