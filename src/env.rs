//! Environment variables as an input to the effective read.
//!
//! The overlay runs after files and profile are merged. `OPENAI_BASE_URL`, when
//! non-empty, replaces `model_providers.openai.base_url`. Every provider with an
//! `env_key` gets an `env_key_is_set` flag that records whether the variable
//! exists; its value is never copied into the document.

use std::collections::HashMap;

use toml::{Table, Value};
use tracing::debug;

use crate::merge::Document;

/// Overrides `model_providers.openai.base_url` when non-empty.
pub const OPENAI_BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Read access to environment variables.
///
/// The resolver and the overlay only ever see the environment through this
/// trait, so tests and embedders can supply a fixed set of variables.
pub trait EnvironmentProvider {
    fn var(&self, key: &str) -> Option<String>;

    /// Whether `key` is present, whatever its value.
    fn is_set(&self, key: &str) -> bool {
        self.var(key).is_some()
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvironmentProvider for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn is_set(&self, key: &str) -> bool {
        std::env::var_os(key).is_some()
    }
}

/// An in-memory environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvironmentProvider for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Apply environment-derived overrides to a merged document.
///
/// Only two things are touched: the OpenAI base URL, and the
/// `env_key_is_set` flag on every provider that names an `env_key`. The flag
/// is a presence check; the variable's value is never read.
pub fn apply_environment(mut doc: Document, env: &dyn EnvironmentProvider) -> Document {
    if let Some(url) = env.var(OPENAI_BASE_URL_VAR).filter(|v| !v.is_empty()) {
        let mut providers = take_table(&mut doc, "model_providers");
        let mut openai = take_table(&mut providers, "openai");
        openai.insert("base_url".into(), Value::String(url));
        providers.insert("openai".into(), Value::Table(openai));
        doc.insert("model_providers".into(), Value::Table(providers));
        debug!("model_providers.openai.base_url taken from {OPENAI_BASE_URL_VAR}");
    }

    if let Some(Value::Table(providers)) = doc.get_mut("model_providers") {
        for (id, record) in providers.iter_mut() {
            let Value::Table(record) = record else {
                continue;
            };
            let Some(key) = record
                .get("env_key")
                .and_then(Value::as_str)
                .filter(|k| !k.is_empty())
            else {
                continue;
            };
            let present = env.is_set(key);
            debug!(provider = %id, env_key = %key, present, "checked provider credential");
            record.insert("env_key_is_set".into(), Value::Boolean(present));
        }
    }

    doc
}

fn take_table(table: &mut Table, key: &str) -> Table {
    match table.remove(key) {
        Some(Value::Table(t)) => t,
        _ => Table::new(),
    }
}
