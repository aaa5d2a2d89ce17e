//! The managed key set as a static field tree.
//!
//! Each field carries the merge policy used for it, so a single recursive
//! merge can treat `model_providers` as a map of records, `notify` as a list
//! that is replaced wholesale, and `http_headers` as a string map that is
//! replaced rather than merged. Keys outside the tree merge with the generic
//! rules (tables recurse, everything else is replaced when non-empty).

/// Root-level table this crate stamps on every merging write.
pub const MARKER_KEY: &str = "__codexfig";

/// How a field combines a lower-precedence value with a higher-precedence one.
#[derive(Debug, Clone, Copy)]
pub enum MergePolicy {
    /// Scalar: the overlay wins when present and non-empty.
    Override,
    /// List: the overlay replaces the base when non-empty; never concatenated.
    ReplaceList,
    /// String map: the overlay replaces the base when non-empty.
    ReplaceMap,
    /// Table with a fixed field set, merged field by field.
    MergeTable(&'static [Field]),
    /// Map of named records, each merged field by field.
    MergeRecords(&'static [Field]),
    /// Map of named profiles; each profile has the root field set.
    Profiles,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub policy: MergePolicy,
}

const fn field(name: &'static str, policy: MergePolicy) -> Field {
    Field { name, policy }
}

use MergePolicy::*;

pub static SANDBOX_WORKSPACE_WRITE_FIELDS: &[Field] = &[
    field("writable_roots", ReplaceList),
    field("network_access", Override),
    field("exclude_tmpdir_env_var", Override),
    field("exclude_slash_tmp", Override),
];

pub static HISTORY_FIELDS: &[Field] = &[
    field("persistence", Override),
    field("max_bytes", Override),
];

pub static SHELL_ENVIRONMENT_POLICY_FIELDS: &[Field] = &[
    field("inherit", Override),
    field("ignore_default_excludes", Override),
    field("exclude", ReplaceList),
    field("set", ReplaceMap),
    field("include_only", ReplaceList),
];

pub static MODEL_PROVIDER_FIELDS: &[Field] = &[
    field("name", Override),
    field("base_url", Override),
    field("env_key", Override),
    field("wire_api", Override),
    field("query_params", ReplaceMap),
    field("http_headers", ReplaceMap),
    field("env_http_headers", ReplaceMap),
    field("request_max_retries", Override),
    field("stream_max_retries", Override),
    field("stream_idle_timeout_ms", Override),
];

pub static MCP_SERVER_FIELDS: &[Field] = &[
    field("command", Override),
    field("args", ReplaceList),
    field("env", ReplaceMap),
];

pub static ROOT_FIELDS: &[Field] = &[
    field("model", Override),
    field("model_provider", Override),
    field("model_context_window", Override),
    field("model_max_output_tokens", Override),
    field("approval_policy", Override),
    field("sandbox_mode", Override),
    field(
        "sandbox_workspace_write",
        MergeTable(SANDBOX_WORKSPACE_WRITE_FIELDS),
    ),
    field("notify", ReplaceList),
    field("history", MergeTable(HISTORY_FIELDS)),
    field("file_opener", Override),
    field("hide_agent_reasoning", Override),
    field("show_raw_agent_reasoning", Override),
    field("model_reasoning_effort", Override),
    field("model_reasoning_summary", Override),
    field("model_verbosity", Override),
    field("model_supports_reasoning_summaries", Override),
    field("project_doc_max_bytes", Override),
    field("tui", ReplaceMap),
    field(
        "shell_environment_policy",
        MergeTable(SHELL_ENVIRONMENT_POLICY_FIELDS),
    ),
    field("model_providers", MergeRecords(MODEL_PROVIDER_FIELDS)),
    field("mcp_servers", MergeRecords(MCP_SERVER_FIELDS)),
    field("profile", Override),
    field("profiles", Profiles),
];

/// Look up the policy for `name` within a field set.
pub fn policy_for(fields: &[Field], name: &str) -> Option<MergePolicy> {
    fields.iter().find(|f| f.name == name).map(|f| f.policy)
}

/// Whether `key` is a root-level key this crate recognizes.
pub fn is_known_root_key(key: &str) -> bool {
    key == MARKER_KEY || ROOT_FIELDS.iter().any(|f| f.name == key)
}
