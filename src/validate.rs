//! Key validation for config documents.
//!
//! Three checks with different reach:
//!
//! - [`unknown_root_keys`] looks only at the root table and drives the
//!   `fail_on_unknown` strategy.
//! - [`strict_round_trip`] serializes a merged document and re-parses it into
//!   [`CodexConfig`], catching type mismatches before anything is written.
//! - [`unknown_key_report`] uses `serde_ignored` to list every nested key the
//!   typed shape doesn't consume, with a best-effort line number. It is
//!   advisory: the read path logs the report and carries on.

use std::path::{Path, PathBuf};

use crate::error::CodexfigError;
use crate::merge::Document;
use crate::model::CodexConfig;
use crate::schema;

/// Root keys of `doc` outside the recognized set, sorted.
pub fn unknown_root_keys(doc: &Document) -> Vec<String> {
    let mut keys: Vec<String> = doc
        .keys()
        .filter(|k| !schema::is_known_root_key(k))
        .cloned()
        .collect();
    keys.sort();
    keys
}

/// Serialize `doc` and prove it parses back into the typed shape.
///
/// Returns the serialized text. Unknown keys are not an error here; only
/// values of the wrong type are.
pub fn strict_round_trip(doc: &Document, path: &Path) -> Result<String, CodexfigError> {
    let text = toml::to_string(doc).map_err(|e| CodexfigError::RenderError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    toml::from_str::<CodexConfig>(&text).map_err(|e| CodexfigError::StrictValidation {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(text)
}

/// A key present in a file that the typed shape does not consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey {
    /// Dotted path, e.g. `model_providers.openai.typo`.
    pub key: String,
    pub path: PathBuf,
    /// 1-based line, when it could be located.
    pub line: Option<usize>,
}

/// List every key in `content` that [`CodexConfig`] ignores.
///
/// The managed-marker table is excluded.
pub fn unknown_key_report(content: &str, path: &Path) -> Result<Vec<UnknownKey>, CodexfigError> {
    let mut ignored: Vec<String> = Vec::new();

    let deserializer = toml::Deserializer::new(content);
    let _config: CodexConfig = serde_ignored::deserialize(deserializer, |p| {
        ignored.push(p.to_string());
    })
    .map_err(|e| CodexfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(ignored
        .into_iter()
        .filter(|key| key.split('.').next() != Some(schema::MARKER_KEY))
        .map(|key| {
            let line = find_key_line(content, &key);
            UnknownKey {
                key,
                path: path.to_path_buf(),
                line,
            }
        })
        .collect())
}

/// Find the 1-based line of a dotted key in TOML text.
///
/// Tracks `[section]` headers while scanning and matches the leaf key only
/// inside the expected section. Quoted keys and inline tables are not handled.
fn find_key_line(content: &str, dotted_key: &str) -> Option<usize> {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    let (leaf, expected_section) = segments.split_last()?;

    let mut current_section: Vec<String> = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && !trimmed.starts_with("[[") {
            let header = trimmed.trim_start_matches('[').trim_end_matches(']').trim();
            current_section = header.split('.').map(|s| s.trim().to_string()).collect();
            continue;
        }

        let in_section = expected_section.len() == current_section.len()
            && expected_section
                .iter()
                .zip(&current_section)
                .all(|(a, b)| *a == b);

        if in_section
            && let Some(after_key) = trimmed.strip_prefix(leaf)
            && after_key.trim_start().starts_with('=')
        {
            return Some(i + 1);
        }
    }
    None
}
