//! Policy-driven deep merge of TOML documents.

use toml::{Table, Value};

use crate::schema::{self, Field, MergePolicy};

/// A parsed configuration file: a TOML table at the root.
pub type Document = Table;

/// Deep-merge `overlay` on top of `base` using the managed field policies.
///
/// The overlay wins for every key it sets to a non-empty value. Empty strings,
/// empty lists and empty tables in the overlay never erase what `base` holds.
/// Tables recurse; record maps (`model_providers`, `mcp_servers`, `profiles`)
/// merge each record field by field; lists and string maps are replaced
/// wholesale.
pub fn deep_merge(base: Table, overlay: Table) -> Table {
    merge_tables(base, overlay, Some(schema::ROOT_FIELDS))
}

fn merge_tables(mut base: Table, overlay: Table, fields: Option<&'static [Field]>) -> Table {
    for (key, overlay_val) in overlay {
        let policy = fields.and_then(|f| schema::policy_for(f, &key));
        let merged = match base.remove(&key) {
            Some(base_val) => merge_value(base_val, overlay_val, policy),
            None => overlay_val,
        };
        base.insert(key, merged);
    }
    base
}

fn merge_value(base: Value, overlay: Value, policy: Option<MergePolicy>) -> Value {
    match (policy, base, overlay) {
        (Some(MergePolicy::MergeTable(fields)), Value::Table(b), Value::Table(o)) => {
            Value::Table(merge_tables(b, o, Some(fields)))
        }
        (Some(MergePolicy::MergeRecords(fields)), Value::Table(b), Value::Table(o)) => {
            Value::Table(merge_records(b, o, fields))
        }
        (Some(MergePolicy::Profiles), Value::Table(b), Value::Table(o)) => {
            Value::Table(merge_records(b, o, schema::ROOT_FIELDS))
        }
        (Some(MergePolicy::ReplaceMap), b, o) => prefer_non_empty(b, o),
        (_, Value::Table(b), Value::Table(o)) => Value::Table(merge_tables(b, o, None)),
        (_, b, o) => prefer_non_empty(b, o),
    }
}

fn merge_records(mut base: Table, overlay: Table, fields: &'static [Field]) -> Table {
    for (id, record) in overlay {
        let merged = match (base.remove(&id), record) {
            (Some(Value::Table(b)), Value::Table(o)) => {
                Value::Table(merge_tables(b, o, Some(fields)))
            }
            (Some(b), o) => prefer_non_empty(b, o),
            (None, o) => o,
        };
        base.insert(id, merged);
    }
    base
}

fn prefer_non_empty(base: Value, overlay: Value) -> Value {
    if is_empty(&overlay) { base } else { overlay }
}

/// Empty strings, lists and tables count as "not set" during a merge.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Table(t) => t.is_empty(),
        _ => false,
    }
}
