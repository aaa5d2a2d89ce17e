//! Resolve, merge and safely persist Codex `config.toml` files.
//!
//! Codex reads its settings from up to two files, a home file and a project
//! file, plus a named profile and a handful of environment variables. codexfig
//! folds those layers into one effective config, and writes settings back
//! without clobbering what a user put there by hand.
//!
//! ```ignore
//! let engine = Codexfig::builder().workdir(".").build();
//! let effective = engine.load()?;
//! println!("model = {:?}", effective.config.model);
//! ```
//!
//! # Layer precedence
//!
//! ```text
//! Home file             $CODEX_HOME/config.toml, else ~/.codex/config.toml
//!        ↑ overridden by
//! Project file          <workdir>/.codex/config.toml
//!        ↑ overridden by
//! Active profile        profiles.<name>, named by the `profile` key
//!        ↑ overridden by
//! Environment           OPENAI_BASE_URL
//! ```
//!
//! Every layer is sparse. A key that a layer leaves out, or sets to an empty
//! string, list or table, falls through to the layer below. `false` and `0`
//! are real values and do override.
//!
//! # Merge rules
//!
//! One recursive merge ([`merge::deep_merge`]) serves file layering, profile
//! overlay and write-time merging. What it does at each key comes from the
//! static field tree in [`schema`]:
//!
//! - **Scalars** are replaced by the higher layer.
//! - **Lists** (`notify`, `args`, `writable_roots`, ...) are replaced
//!   wholesale, never concatenated.
//! - **Records** (`model_providers.<id>`, `mcp_servers.<id>`,
//!   `profiles.<name>`) merge field by field; ids present on only one side
//!   pass through.
//! - **String maps** (`http_headers`, `env`, `shell_environment_policy.set`,
//!   ...) are replaced wholesale by a non-empty higher map.
//! - **Unrecognized tables** recurse with the generic rules.
//!
//! # Writing
//!
//! [`Codexfig::write`] takes a [`CodexConfig`] where every field is optional
//! and writes it under one of three [`MergeStrategy`] values:
//!
//! - **`preserve_unknown`** (default): merge over the existing file, keep
//!   everything else, and stamp a `[__codexfig]` marker table.
//!   Comments and formatting on untouched keys survive.
//! - **`replace_all`**: the file holds exactly the desired settings, under a
//!   `# Managed by codexfig: replace_all` header.
//! - **`fail_on_unknown`**: like `preserve_unknown`, but refuse when the file
//!   has root keys codexfig doesn't recognize.
//!
//! Writes are atomic: content goes to `<path>.tmp`, is synced, and renamed over
//! the target. A failure before the rename leaves the old file untouched.
//! [`WriteOptions`] controls backup, file mode, directory creation, strict
//! re-validation and whether MCP server `env` maps (usually secrets) are
//! written at all.
//!
//! # Secrets
//!
//! Provider API keys are never read. On an effective read, every provider
//! with an `env_key` gets `env_key_is_set`, a presence check on that variable.
//! The flag is never written to disk.
//!
//! # Environment injection
//!
//! The engine sees environment variables only through
//! [`EnvironmentProvider`]. [`ProcessEnv`] is the default; [`MapEnv`] lets
//! tests and embedders supply a fixed set.
//!
//! # Cargo features
//!
//! - **`clap`** (default): [`TargetArgs`] and [`WriteArgs`] derive types.
//! - **`rich-errors`**: `miette::Diagnostic` on [`CodexfigError`].
//!
//! # Logging
//!
//! codexfig emits `tracing` events and installs no subscriber. Secret values
//! never appear in them.

pub mod atomic;
pub mod env;
pub mod error;
pub mod file;
pub mod merge;
pub mod model;
pub mod options;
pub mod persist;
pub mod profile;
pub mod resolve;
pub mod schema;
pub mod types;
pub mod validate;
pub mod view;

mod builder;
#[cfg(feature = "clap")]
mod cli;

#[cfg(test)]
mod fixtures;

pub use builder::{Codexfig, CodexfigBuilder};
#[cfg(feature = "clap")]
pub use cli::{TargetArgs, WriteArgs};
pub use env::{EnvironmentProvider, MapEnv, ProcessEnv};
pub use error::{CodexfigError, WriteOp};
pub use merge::Document;
pub use model::{
    CodexConfig, History, McpServer, ModelProvider, SandboxWorkspaceWrite, ShellEnvPolicy,
};
pub use options::WriteOptions;
pub use persist::{RemoveOutcome, WriteOutcome};
pub use types::{ConfigTarget, MergeStrategy, Scope};
pub use view::EffectiveConfig;
