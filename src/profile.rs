//! Named profiles.
//!
//! A document selects a profile with the root `profile` key and defines it
//! under `profiles.<name>`. Applying it overlays that table onto the root with
//! [`deep_merge`], so a profile is just one more sparse layer.

use toml::Value;
use tracing::debug;

use crate::merge::{Document, deep_merge};

/// The profile a document selects through its root `profile` key.
pub fn selected_profile(doc: &Document) -> Option<&str> {
    doc.get("profile")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
}

/// Whether `doc` defines `profiles.<name>` as a table.
pub fn has_profile(doc: &Document, name: &str) -> bool {
    doc.get("profiles")
        .and_then(|p| p.get(name))
        .is_some_and(Value::is_table)
}

/// Overlay `profiles[name]` onto `doc` with the regular merge rules.
///
/// No name, or a name with no matching profile, returns `doc` unchanged.
pub fn apply_profile(doc: Document, name: Option<&str>) -> Document {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return doc;
    };
    let overlay = match doc.get("profiles").and_then(|p| p.get(name)) {
        Some(Value::Table(profile)) => profile.clone(),
        _ => {
            debug!(profile = %name, "profile not found, leaving config unchanged");
            return doc;
        }
    };
    debug!(profile = %name, "applying profile");
    deep_merge(doc, overlay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::Table;

    fn table(toml_str: &str) -> Table {
        toml_str.parse::<Table>().unwrap()
    }

    const DOC: &str = r#"
        model = "gpt-5"
        approval_policy = "on-request"
        profile = "fast"

        [profiles.fast]
        model = "o3"

        [profiles.safe]
        sandbox_mode = "read-only"
    "#;

    #[test]
    fn profile_fields_override_root() {
        let out = apply_profile(table(DOC), Some("fast"));
        assert_eq!(out["model"].as_str().unwrap(), "o3");
        assert_eq!(out["approval_policy"].as_str().unwrap(), "on-request");
    }

    #[test]
    fn profile_adds_new_keys() {
        let out = apply_profile(table(DOC), Some("safe"));
        assert_eq!(out["sandbox_mode"].as_str().unwrap(), "read-only");
        assert_eq!(out["model"].as_str().unwrap(), "gpt-5");
    }

    #[test]
    fn unknown_profile_is_a_no_op() {
        let doc = table(DOC);
        assert_eq!(apply_profile(doc.clone(), Some("missing")), doc);
    }

    #[test]
    fn no_profile_is_a_no_op() {
        let doc = table(DOC);
        assert_eq!(apply_profile(doc.clone(), None), doc);
        assert_eq!(apply_profile(doc.clone(), Some("")), doc);
    }

    #[test]
    fn selected_profile_reads_root_key() {
        assert_eq!(selected_profile(&table(DOC)), Some("fast"));
        assert_eq!(selected_profile(&table("profile = \"\"")), None);
        assert_eq!(selected_profile(&Table::new()), None);
    }

    #[test]
    fn has_profile_checks_table() {
        let doc = table(DOC);
        assert!(has_profile(&doc, "fast"));
        assert!(!has_profile(&doc, "missing"));
        assert!(!has_profile(&table("profiles = 1"), "fast"));
    }

    #[test]
    fn profile_records_merge_field_by_field() {
        let doc = table(
            r#"
            [model_providers.p]
            base_url = "u1"

            [profiles.alt.model_providers.p]
            wire_api = "responses"
            "#,
        );
        let out = apply_profile(doc, Some("alt"));
        let p = out["model_providers"]["p"].as_table().unwrap();
        assert_eq!(p["base_url"].as_str().unwrap(), "u1");
        assert_eq!(p["wire_api"].as_str().unwrap(), "responses");
    }
}
