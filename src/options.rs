use confique::Config;
use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::error::CodexfigError;
use crate::types::MergeStrategy;

/// Knobs for writing and removing a config file.
///
/// Defaults are compiled in; callers override any subset through a sparse
/// TOML table (see [`WriteOptions::resolve`]).
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// How desired settings combine with what is already on disk.
    #[config(default = "preserve_unknown")]
    pub merge_strategy: MergeStrategy,

    /// Octal permission bits applied after each write.
    #[config(default = "0600")]
    pub file_mode: String,

    /// Copy the previous file to `<path>.bak` before replacing it.
    #[config(default = true)]
    pub backup_on_write: bool,

    /// Create missing parent directories.
    #[config(default = true)]
    pub create_directories: bool,

    /// Re-parse the merged result into the typed shape before writing.
    #[config(default = true)]
    pub validate_strict: bool,

    /// Persist `mcp_servers.*.env`, which usually carries secrets.
    #[config(default = false)]
    pub allow_sensitive_env_writes: bool,

    /// Leave the file on disk when the config is removed.
    #[config(default = true)]
    pub keep_file_on_destroy: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            merge_strategy: MergeStrategy::PreserveUnknown,
            file_mode: "0600".into(),
            backup_on_write: true,
            create_directories: true,
            validate_strict: true,
            allow_sensitive_env_writes: false,
            keep_file_on_destroy: true,
        }
    }
}

impl WriteOptions {
    /// Fill every key missing from `overrides` with its compiled default.
    pub fn resolve(overrides: Table) -> Result<Self, CodexfigError> {
        let layer: <WriteOptions as Config>::Layer = Value::Table(overrides)
            .try_into()
            .map_err(|e: toml::de::Error| CodexfigError::InvalidValue {
                key: "<write options>".into(),
                reason: e.to_string(),
            })?;
        WriteOptions::builder()
            .preloaded(layer)
            .load()
            .map_err(CodexfigError::from)
    }

    /// A commented TOML template listing every option and its default.
    pub fn template() -> String {
        confique::toml::template::<WriteOptions>(confique::toml::FormatOptions::default())
    }
}
