use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The filesystem step an atomic write was performing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    CreateDir,
    TempWrite,
    Sync,
    Rename,
    Chmod,
    Remove,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteOp::CreateDir => "create directory",
            WriteOp::TempWrite => "write temp file",
            WriteOp::Sync => "sync temp file",
            WriteOp::Rename => "rename temp file",
            WriteOp::Chmod => "set file mode",
            WriteOp::Remove => "remove file",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum CodexfigError {
    #[error("Path resolution failed: {0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(codexfig::path)))]
    PathResolution(String),

    #[error("Failed to parse {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(codexfig::parse)))]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(codexfig::io)))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("fail_on_unknown: {path} contains unknown keys: {}", keys.join(", "))]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(codexfig::unknown_keys),
            help("remove the keys or switch to the preserve_unknown strategy")
        )
    )]
    UnknownKeys { path: PathBuf, keys: Vec<String> },

    #[error("Strict validation failed for {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(codexfig::strict)))]
    StrictValidation {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to {op} for {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(codexfig::write)))]
    WriteError {
        op: WriteOp,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to back up {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(codexfig::backup)))]
    BackupError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid file mode '{0}' (expected octal digits, e.g. 0600)")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(codexfig::file_mode)))]
    InvalidFileMode(String),

    #[error("Failed to render {path}: {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(codexfig::render)))]
    RenderError { path: PathBuf, reason: String },

    #[error("Invalid value for '{key}': {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(codexfig::invalid_value)))]
    InvalidValue { key: String, reason: String },

    #[error("Invalid write options: {0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(codexfig::options)))]
    ConfigError(#[from] confique::Error),
}

impl CodexfigError {
    pub(crate) fn write(op: WriteOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CodexfigError::WriteError {
            op,
            path: path.into(),
            source,
        }
    }
}
