#[cfg(test)]
pub mod test {
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    use crate::model::{CodexConfig, History, McpServer, ModelProvider, ShellEnvPolicy};

    /// A config with one provider that names `env_key`.
    pub fn provider_config(id: &str, env_key: &str) -> CodexConfig {
        let mut providers = BTreeMap::new();
        providers.insert(
            id.to_string(),
            ModelProvider {
                env_key: Some(env_key.into()),
                ..Default::default()
            },
        );
        CodexConfig {
            model_providers: Some(providers),
            ..Default::default()
        }
    }

    /// A broad config touching every kind of field: scalars, lists, nested
    /// tables, record maps, string maps and profiles. It carries no secrets,
    /// so it survives a write unchanged.
    pub fn sample_config() -> CodexConfig {
        let mut headers = BTreeMap::new();
        headers.insert("X-Team".to_string(), "platform".to_string());

        let mut providers = BTreeMap::new();
        providers.insert(
            "azure".to_string(),
            ModelProvider {
                name: Some("Azure".into()),
                base_url: Some("https://example.openai.azure.com/openai".into()),
                env_key: Some("AZURE_OPENAI_API_KEY".into()),
                wire_api: Some("responses".into()),
                http_headers: Some(headers),
                request_max_retries: Some(4),
                ..Default::default()
            },
        );

        let mut servers = BTreeMap::new();
        servers.insert(
            "docs".to_string(),
            McpServer {
                command: Some("npx".into()),
                args: Some(vec!["-y".into(), "docs-server".into()]),
                env: None,
            },
        );

        let mut set = BTreeMap::new();
        set.insert("CI".to_string(), "1".to_string());

        let mut profiles = BTreeMap::new();
        profiles.insert(
            "fast".to_string(),
            CodexConfig {
                model: Some("o4-mini".into()),
                approval_policy: Some("never".into()),
                ..Default::default()
            },
        );

        CodexConfig {
            model: Some("gpt-5".into()),
            model_provider: Some("azure".into()),
            model_context_window: Some(200_000),
            approval_policy: Some("on-request".into()),
            sandbox_mode: Some("workspace-write".into()),
            notify: Some(vec!["notify-send".into(), "codex".into()]),
            history: Some(History {
                persistence: Some("save-all".into()),
                max_bytes: Some(0),
            }),
            hide_agent_reasoning: Some(false),
            shell_environment_policy: Some(ShellEnvPolicy {
                inherit: Some("core".into()),
                set: Some(set),
                ..Default::default()
            }),
            model_providers: Some(providers),
            mcp_servers: Some(servers),
            profile: Some("fast".into()),
            profiles: Some(profiles),
            ..Default::default()
        }
    }

    /// Write `content` to `<dir>/<rel>`, creating parents. Returns the full path.
    pub fn write_file(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn sample_config_serializes() {
        let doc = sample_config().to_document().unwrap();
        assert_eq!(doc["model"].as_str().unwrap(), "gpt-5");
        assert!(doc["mcp_servers"]["docs"].get("env").is_none());
    }
}
