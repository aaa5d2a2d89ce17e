//! Core read pipeline: fold config layers into one effective config.
//!
//! Operates on pre-loaded data (`ResolveInput`) and an injected environment,
//! so the full pipeline is testable without touching the filesystem. Steps:
//!
//! 1. Report unknown keys in each file (warnings only)
//! 2. Parse and deep-merge files (later overrides earlier)
//! 3. Pick the active profile and overlay it
//! 4. Apply environment overrides and credential presence flags
//! 5. Deserialize the result into the typed shape

use std::path::{Path, PathBuf};

use toml::Table;
use tracing::{debug, warn};

use crate::env::{self, EnvironmentProvider};
use crate::error::CodexfigError;
use crate::file::{self, LoadedFile};
use crate::merge::deep_merge;
use crate::model::CodexConfig;
use crate::profile;
use crate::validate;
use crate::view::EffectiveConfig;

/// All pre-loaded data needed for an effective read. No I/O happens here.
#[derive(Debug, Clone, Default)]
pub struct ResolveInput {
    /// File contents in precedence order: first = lowest priority, last = highest.
    pub files: Vec<(PathBuf, String)>,
    /// Profile to apply instead of the one named by the merged `profile` key.
    pub profile: Option<String>,
    /// Log keys the typed shape doesn't recognize.
    pub warn_unknown: bool,
}

impl ResolveInput {
    /// Build an input from files loaded off disk, skipping absent ones.
    pub fn from_loaded(files: Vec<LoadedFile>) -> Self {
        Self {
            files: files
                .into_iter()
                .filter_map(|f| f.content.map(|c| (f.path, c)))
                .collect(),
            ..Default::default()
        }
    }
}

pub fn resolve(
    input: ResolveInput,
    env: &dyn EnvironmentProvider,
) -> Result<EffectiveConfig, CodexfigError> {
    let mut merged = Table::new();
    let mut source_files = Vec::with_capacity(input.files.len());

    for (path, content) in &input.files {
        if input.warn_unknown {
            match validate::unknown_key_report(content, path) {
                Ok(report) => {
                    for unknown in report {
                        warn!(
                            path = %unknown.path.display(),
                            key = %unknown.key,
                            line = ?unknown.line,
                            "unknown config key"
                        );
                    }
                }
                // Malformed or mistyped files are reported by the steps below.
                Err(e) => debug!(path = %path.display(), error = %e, "skipped unknown-key report"),
            }
        }
        let doc = file::parse_document(content, path)?;
        merged = deep_merge(merged, doc);
        source_files.push(path.clone());
    }

    let active_profile = input
        .profile
        .filter(|name| !name.is_empty())
        .or_else(|| profile::selected_profile(&merged).map(str::to_string));
    // A name with no matching table stays active; the overlay is a no-op.
    if let Some(name) = active_profile
        .as_deref()
        .filter(|name| !profile::has_profile(&merged, name))
    {
        warn!(profile = %name, "selected profile is not defined");
    }
    let merged = profile::apply_profile(merged, active_profile.as_deref());
    let merged = env::apply_environment(merged, env);

    let origin = source_files
        .last()
        .map(PathBuf::as_path)
        .unwrap_or(Path::new("<effective>"));
    let config = CodexConfig::from_document(&merged, origin)?;

    debug!(
        sources = source_files.len(),
        profile = ?active_profile,
        "resolved effective config"
    );
    Ok(EffectiveConfig {
        source_files,
        active_profile,
        document: merged,
        config,
    })
}
