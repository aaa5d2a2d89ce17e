//! The result of an effective read and the ways to look at it.

use std::fmt;
use std::path::PathBuf;

use toml::{Table, Value};

use crate::model::CodexConfig;

/// Home, project, profile and environment layers folded into one config.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    /// Files that contributed, lowest precedence first.
    pub source_files: Vec<PathBuf>,
    /// The profile that was applied, if any.
    pub active_profile: Option<String>,
    /// The merged document, including keys outside the typed shape.
    pub document: Table,
    pub config: CodexConfig,
}

impl EffectiveConfig {
    /// Look up a value by dotted key, e.g. `"model_providers.openai.base_url"`.
    pub fn get(&self, dotted_key: &str) -> Option<&Value> {
        table_get(&self.document, dotted_key)
    }

    /// Every leaf as a `(dotted_key, display_value)` pair, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        flatten_into(&self.document, "", &mut out);
        out
    }

    /// The merged document as pretty-printed JSON.
    pub fn to_json(&self) -> String {
        let json = json_value(&Value::Table(self.document.clone()));
        serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
    }
}

impl fmt::Display for EffectiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{key} = {value}")?;
        }
        Ok(())
    }
}

/// Navigate a table by dotted key path.
pub fn table_get<'a>(table: &'a Table, dotted_key: &str) -> Option<&'a Value> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let tbl = match path {
        Some(path) => {
            let mut current = table;
            for segment in path.split('.') {
                current = current.get(segment)?.as_table()?;
            }
            current
        }
        None => table,
    };

    tbl.get(leaf)
}

fn flatten_into(table: &Table, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(sub) if !sub.is_empty() => flatten_into(sub, &full, out),
            other => out.push((full, format_value(other))),
        }
    }
}

/// Format a value for display. Strings print bare.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Datetime(d) => serde_json::Value::String(d.to_string()),
        Value::Array(a) => serde_json::Value::Array(a.iter().map(json_value).collect()),
        Value::Table(t) => serde_json::Value::Object(
            t.iter().map(|(k, v)| (k.clone(), json_value(v))).collect(),
        ),
    }
}
