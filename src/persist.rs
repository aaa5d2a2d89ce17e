//! Writing, reading back and removing a single config file.
//!
//! A write loads whatever is on disk, combines it with the desired settings
//! according to the [`MergeStrategy`], validates the result and hands it to
//! [`atomic::write_atomic`]. Everything up to the atomic write is side-effect
//! free, so a rejected write never touches the file.
//!
//! When an existing file is merged rather than replaced, the new content is
//! produced by patching the old text with `toml_edit`: keys whose value did
//! not change keep their comments and formatting.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use toml::{Table, Value};
use tracing::{debug, info, warn};

use crate::atomic::{self, AtomicWrite};
use crate::error::{CodexfigError, WriteOp};
use crate::file;
use crate::merge::{Document, deep_merge};
use crate::model::CodexConfig;
use crate::options::WriteOptions;
use crate::schema::MARKER_KEY;
use crate::types::MergeStrategy;
use crate::validate;

/// First line of a file written with `replace_all`.
pub const REPLACE_ALL_HEADER: &str = "# Managed by codexfig: replace_all";

/// What a successful write did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub strategy: MergeStrategy,
    /// Where the previous content was copied, if a backup was made.
    pub backup: Option<PathBuf>,
    /// Unmanaged root keys that were carried over from the existing file.
    pub unknown_keys: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// `keep_file_on_destroy` was set; the file was left alone.
    Kept,
    Removed,
    AlreadyAbsent,
}

/// Write `desired` to `path` under `options`.
pub fn write_config(
    path: &Path,
    desired: &CodexConfig,
    options: &WriteOptions,
) -> Result<WriteOutcome, CodexfigError> {
    if !options.file_mode.trim().is_empty() {
        atomic::parse_file_mode(&options.file_mode)?;
    }

    let existing = file::load_file(path)?;
    let desired = if options.allow_sensitive_env_writes {
        desired.clone()
    } else {
        desired.clone().without_mcp_env()
    };
    let desired_doc = desired.to_document()?;

    let strategy = options.merge_strategy;
    let unknown_keys = validate::unknown_root_keys(&existing.document);
    if strategy == MergeStrategy::FailOnUnknown && !unknown_keys.is_empty() {
        warn!(path = %path.display(), keys = ?unknown_keys, "refusing to write over unknown keys");
        return Err(CodexfigError::UnknownKeys {
            path: path.to_path_buf(),
            keys: unknown_keys,
        });
    }

    let (merged, header) = match strategy {
        MergeStrategy::ReplaceAll => (desired_doc, Some(REPLACE_ALL_HEADER)),
        MergeStrategy::PreserveUnknown | MergeStrategy::FailOnUnknown => {
            let mut merged = deep_merge(existing.document.clone(), desired_doc);
            merged.insert(MARKER_KEY.into(), Value::Table(marker_table()));
            (merged, None)
        }
    };

    let serialized = if options.validate_strict {
        Some(validate::strict_round_trip(&merged, path)?)
    } else {
        None
    };

    let content = match existing.content.as_deref() {
        Some(text) if strategy != MergeStrategy::ReplaceAll && !text.trim().is_empty() => {
            patch_document(text, &existing.document, &merged, path)?
        }
        _ => match serialized {
            Some(text) => text,
            None => render_document(&merged, path)?,
        },
    };

    debug!(path = %path.display(), %strategy, "rendered config");
    let backup = atomic::write_atomic(&AtomicWrite {
        path,
        content: &content,
        mode: &options.file_mode,
        backup: options.backup_on_write,
        create_dirs: options.create_directories,
        header,
    })?;

    Ok(WriteOutcome {
        path: path.to_path_buf(),
        strategy,
        backup,
        unknown_keys: match strategy {
            MergeStrategy::ReplaceAll => Vec::new(),
            _ => unknown_keys,
        },
    })
}

/// Read a single file back into the typed shape. `None` if it doesn't exist.
pub fn read_config(path: &Path) -> Result<Option<CodexConfig>, CodexfigError> {
    let loaded = file::load_file(path)?;
    if !loaded.exists() {
        return Ok(None);
    }
    CodexConfig::from_document(&loaded.document, path).map(Some)
}

/// Delete the file at `path` unless `keep_file_on_destroy` is set.
pub fn remove_config(path: &Path, options: &WriteOptions) -> Result<RemoveOutcome, CodexfigError> {
    if options.keep_file_on_destroy {
        debug!(path = %path.display(), "keeping config file on remove");
        return Ok(RemoveOutcome::Kept);
    }
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "removed config file");
            Ok(RemoveOutcome::Removed)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RemoveOutcome::AlreadyAbsent),
        Err(e) => Err(CodexfigError::write(WriteOp::Remove, path, e)),
    }
}

fn marker_table() -> Table {
    let mut marker = Table::new();
    marker.insert("managed".into(), Value::Boolean(true));
    marker.insert(
        "updated_at".into(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    marker
}

/// Serialize a document from scratch.
pub fn render_document(doc: &Document, path: &Path) -> Result<String, CodexfigError> {
    toml::to_string(doc).map_err(|e| CodexfigError::RenderError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Pure function: rewrite `content` so it holds exactly `merged`.
///
/// `existing` is `content` already parsed; entries equal on both sides are
/// left untouched in the text, along with their comments. Removed keys are
/// dropped and changed or new keys are rewritten.
pub fn patch_document(
    content: &str,
    existing: &Document,
    merged: &Document,
    path: &Path,
) -> Result<String, CodexfigError> {
    let mut doc: toml_edit::DocumentMut =
        content
            .parse()
            .map_err(|e: toml_edit::TomlError| CodexfigError::RenderError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
    sync_table(doc.as_table_mut(), Some(existing), merged, path)?;
    Ok(doc.to_string())
}

fn sync_table(
    dst: &mut toml_edit::Table,
    old: Option<&Table>,
    new: &Table,
    path: &Path,
) -> Result<(), CodexfigError> {
    let stale: Vec<String> = dst
        .iter()
        .map(|(k, _)| k.to_string())
        .filter(|k| !new.contains_key(k))
        .collect();
    for key in stale {
        dst.remove(&key);
    }

    for (key, value) in new {
        let previous = old.and_then(|t| t.get(key));
        if previous == Some(value) && dst.contains_key(key) {
            continue;
        }
        if let (Some(toml_edit::Item::Table(sub)), Value::Table(new_sub)) =
            (dst.get_mut(key), value)
        {
            sync_table(sub, previous.and_then(Value::as_table), new_sub, path)?;
            continue;
        }
        let item = match dst.get(key) {
            Some(toml_edit::Item::Value(_)) => value_item(value, path)?,
            _ => to_item(value, path)?,
        };
        dst.insert(key, item);
    }
    Ok(())
}

fn to_item(value: &Value, path: &Path) -> Result<toml_edit::Item, CodexfigError> {
    match value {
        Value::Table(t) => {
            let mut table = toml_edit::Table::new();
            for (k, v) in t {
                table.insert(k, to_item(v, path)?);
            }
            table.set_implicit(!t.is_empty() && t.values().all(Value::is_table));
            Ok(toml_edit::Item::Table(table))
        }
        other => value_item(other, path),
    }
}

/// Render any value, tables included, as an inline TOML value.
fn value_item(value: &Value, path: &Path) -> Result<toml_edit::Item, CodexfigError> {
    let edit_value: toml_edit::Value =
        value
            .to_string()
            .parse()
            .map_err(|e: toml_edit::TomlError| CodexfigError::RenderError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
    Ok(toml_edit::Item::Value(edit_value))
}
