//! Path resolution and loading for config files.
//!
//! # Resolution
//!
//! A [`Scope`] maps to exactly one file:
//!
//! - `Home` : `$CODEX_HOME/config.toml`, or `~/.codex/config.toml` when the
//!   variable is unset or blank.
//! - `Project` : `<workdir>/.codex/config.toml`. Requires a workdir.
//! - `Custom` : the caller's path, joined onto the current directory when it
//!   is relative.
//!
//! Resolution is path arithmetic only; nothing is created or checked.
//!
//! # Loading
//!
//! A missing file loads as an empty document, and so does a file that is empty
//! or whitespace-only. Only real I/O errors and malformed TOML are reported.

use std::path::{Path, PathBuf};

use toml::Table;
use tracing::debug;

use crate::env::EnvironmentProvider;
use crate::error::CodexfigError;
use crate::merge::Document;
use crate::types::Scope;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const PROJECT_DIR_NAME: &str = ".codex";
pub const HOME_ENV_VAR: &str = "CODEX_HOME";

/// The base directory for the `Home` scope.
pub fn home_dir(env: &dyn EnvironmentProvider) -> Result<PathBuf, CodexfigError> {
    if let Some(dir) = env.var(HOME_ENV_VAR).filter(|v| !v.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let user = directories::UserDirs::new().ok_or_else(|| {
        CodexfigError::PathResolution("cannot determine the user home directory".into())
    })?;
    Ok(user.home_dir().join(PROJECT_DIR_NAME))
}

/// Resolve a scope to the absolute path of its config file.
pub fn resolve_path(
    scope: Scope,
    workdir: Option<&Path>,
    custom: Option<&Path>,
    env: &dyn EnvironmentProvider,
) -> Result<PathBuf, CodexfigError> {
    match scope {
        Scope::Home => Ok(home_dir(env)?.join(CONFIG_FILE_NAME)),
        Scope::Project => {
            let workdir = workdir.filter(|w| !is_blank(w)).ok_or_else(|| {
                CodexfigError::PathResolution("workdir not configured for project scope".into())
            })?;
            Ok(workdir.join(PROJECT_DIR_NAME).join(CONFIG_FILE_NAME))
        }
        Scope::Custom => {
            let path = custom.filter(|p| !is_blank(p)).ok_or_else(|| {
                CodexfigError::PathResolution("custom scope requires 'path'".into())
            })?;
            if path.is_absolute() {
                return Ok(path.to_path_buf());
            }
            let cwd = std::env::current_dir().map_err(|e| CodexfigError::IoError {
                path: PathBuf::from("."),
                source: e,
            })?;
            Ok(cwd.join(path))
        }
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

/// A config file as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFile {
    pub path: PathBuf,
    /// Raw text, `None` when the file does not exist.
    pub content: Option<String>,
    pub document: Document,
}

impl LoadedFile {
    pub fn exists(&self) -> bool {
        self.content.is_some()
    }
}

/// Load a config file, keeping its raw text alongside the parsed document.
pub fn load_file(path: &Path) -> Result<LoadedFile, CodexfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, using empty document");
            return Ok(LoadedFile {
                path: path.to_path_buf(),
                content: None,
                document: Table::new(),
            });
        }
        Err(e) => {
            return Err(CodexfigError::IoError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let document = parse_document(&content, path)?;
    Ok(LoadedFile {
        path: path.to_path_buf(),
        content: Some(content),
        document,
    })
}

/// Load a config file as a document. Missing files yield an empty table.
pub fn load_document(path: &Path) -> Result<Document, CodexfigError> {
    Ok(load_file(path)?.document)
}

/// Parse TOML text. Blank text is an empty document.
pub fn parse_document(content: &str, path: &Path) -> Result<Document, CodexfigError> {
    if content.trim().is_empty() {
        return Ok(Table::new());
    }
    toml::from_str(content).map_err(|e| CodexfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Candidate source paths for an effective read, lowest precedence first:
/// the home file, then the project file when a workdir is known.
///
/// `home` replaces the `$CODEX_HOME` / `~/.codex` lookup. Blank `home` and
/// `workdir` values count as absent.
pub fn source_paths(
    home: Option<&Path>,
    workdir: Option<&Path>,
    env: &dyn EnvironmentProvider,
) -> Result<Vec<PathBuf>, CodexfigError> {
    let home_file = match home.filter(|h| !is_blank(h)) {
        Some(dir) => dir.join(CONFIG_FILE_NAME),
        None => resolve_path(Scope::Home, None, None, env)?,
    };
    let mut paths = vec![home_file];
    if let Some(dir) = workdir.filter(|w| !is_blank(w)) {
        paths.push(resolve_path(Scope::Project, Some(dir), None, env)?);
    }
    Ok(paths)
}

/// Load every existing file among `paths`, preserving order. Missing files
/// are skipped; I/O and parse errors are propagated.
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<LoadedFile>, CodexfigError> {
    let mut found = Vec::new();
    for path in paths {
        let file = load_file(path)?;
        if file.exists() {
            debug!(path = %path.display(), "loaded config source");
            found.push(file);
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use std::fs;
    use tempfile::TempDir;

    fn env_with_home(home: &Path) -> MapEnv {
        MapEnv::from_pairs([(HOME_ENV_VAR, home.to_string_lossy().into_owned())])
    }

    #[test]
    fn home_uses_codex_home_variable() {
        let env = MapEnv::from_pairs([(HOME_ENV_VAR, "/opt/codex")]);
        let path = resolve_path(Scope::Home, None, None, &env).unwrap();
        assert_eq!(path, PathBuf::from("/opt/codex/config.toml"));
    }

    #[test]
    fn blank_codex_home_falls_back_to_user_home() {
        let env = MapEnv::from_pairs([(HOME_ENV_VAR, "  ")]);
        if let Some(user) = directories::UserDirs::new() {
            let path = resolve_path(Scope::Home, None, None, &env).unwrap();
            assert_eq!(path, user.home_dir().join(".codex").join("config.toml"));
        }
    }

    #[test]
    fn project_joins_workdir() {
        let path = resolve_path(
            Scope::Project,
            Some(Path::new("/work")),
            None,
            &MapEnv::default(),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/work/.codex/config.toml"));
    }

    #[test]
    fn project_without_workdir_fails() {
        let err = resolve_path(Scope::Project, None, None, &MapEnv::default()).unwrap_err();
        assert!(matches!(err, CodexfigError::PathResolution(msg) if msg.contains("workdir")));

        let err = resolve_path(Scope::Project, Some(Path::new("")), None, &MapEnv::default())
            .unwrap_err();
        assert!(matches!(err, CodexfigError::PathResolution(_)));
    }

    #[test]
    fn custom_blank_path_fails() {
        let err = resolve_path(Scope::Custom, None, Some(Path::new("  ")), &MapEnv::default())
            .unwrap_err();
        assert!(matches!(err, CodexfigError::PathResolution(msg) if msg.contains("path")));
    }

    #[test]
    fn custom_absolute_path_is_kept() {
        let path = resolve_path(
            Scope::Custom,
            None,
            Some(Path::new("/etc/codex/c.toml")),
            &MapEnv::default(),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/etc/codex/c.toml"));
    }

    #[test]
    fn custom_relative_path_resolves_against_cwd() {
        let path = resolve_path(
            Scope::Custom,
            None,
            Some(Path::new("rel/c.toml")),
            &MapEnv::default(),
        )
        .unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(path, cwd.join("rel").join("c.toml"));
        assert!(path.is_absolute());
    }

    #[test]
    fn missing_file_is_empty_document() {
        let dir = TempDir::new().unwrap();
        let file = load_file(&dir.path().join("config.toml")).unwrap();
        assert!(!file.exists());
        assert!(file.document.is_empty());
    }

    #[test]
    fn whitespace_file_is_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "  \n\t\n").unwrap();
        let file = load_file(&path).unwrap();
        assert!(file.exists());
        assert!(file.document.is_empty());
    }

    #[test]
    fn malformed_file_is_parse_error_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "model = \n").unwrap();
        let err = load_document(&path).unwrap_err();
        match err {
            CodexfigError::ParseError { path: p, .. } => assert_eq!(p, path),
            other => panic!("Expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn loads_valid_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "model = \"o3\"\n[history]\nmax_bytes = 10\n").unwrap();
        let doc = load_document(&path).unwrap();
        assert_eq!(doc["model"].as_str().unwrap(), "o3");
        assert_eq!(doc["history"]["max_bytes"].as_integer().unwrap(), 10);
    }

    #[test]
    fn source_paths_order_home_then_project() {
        let home = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let env = env_with_home(home.path());
        let paths = source_paths(None, Some(work.path()), &env).unwrap();
        assert_eq!(
            paths,
            vec![
                home.path().join("config.toml"),
                work.path().join(".codex").join("config.toml"),
            ]
        );
    }

    #[test]
    fn source_paths_ignore_blank_workdir() {
        let env = MapEnv::from_pairs([(HOME_ENV_VAR, "/codex-home")]);
        let paths = source_paths(None, Some(Path::new("")), &env).unwrap();
        assert_eq!(paths, vec![PathBuf::from("/codex-home/config.toml")]);
    }

    #[test]
    fn source_paths_home_override_beats_env() {
        let env = MapEnv::from_pairs([(HOME_ENV_VAR, "/codex-home")]);
        let paths = source_paths(Some(Path::new("/override")), None, &env).unwrap();
        assert_eq!(paths, vec![PathBuf::from("/override/config.toml")]);
    }

    #[test]
    fn load_sources_skips_missing_files() {
        let home = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        fs::write(home.path().join("config.toml"), "model = \"a\"\n").unwrap();
        let env = env_with_home(home.path());

        let paths = source_paths(None, Some(work.path()), &env).unwrap();
        let found = load_sources(&paths).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, home.path().join("config.toml"));
    }
}
