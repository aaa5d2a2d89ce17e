use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::env::{EnvironmentProvider, ProcessEnv};
use crate::error::CodexfigError;
use crate::file;
use crate::model::CodexConfig;
use crate::options::WriteOptions;
use crate::persist::{self, RemoveOutcome, WriteOutcome};
use crate::resolve::{self, ResolveInput};
use crate::types::{ConfigTarget, Scope};
use crate::view::EffectiveConfig;

/// Reads, writes and removes Codex config files for one working directory.
///
/// Build one with [`Codexfig::builder`]:
///
/// ```no_run
/// use codexfig::{Codexfig, ConfigTarget, CodexConfig, WriteOptions};
///
/// let engine = Codexfig::builder().workdir("/work/repo").build();
/// let effective = engine.load()?;
/// println!("{effective}");
///
/// let desired = CodexConfig {
///     model: Some("o3".into()),
///     ..Default::default()
/// };
/// engine.write(&ConfigTarget::project(), &desired, &WriteOptions::default())?;
/// # Ok::<(), codexfig::CodexfigError>(())
/// ```
#[derive(Clone)]
pub struct Codexfig {
    workdir: Option<PathBuf>,
    home: Option<PathBuf>,
    profile: Option<String>,
    env: Arc<dyn EnvironmentProvider + Send + Sync>,
    warn_unknown: bool,
}

impl Codexfig {
    pub fn builder() -> CodexfigBuilder {
        CodexfigBuilder::new()
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    /// Resolve a target to the file it refers to.
    pub fn path_for(&self, target: &ConfigTarget) -> Result<PathBuf, CodexfigError> {
        match (target.scope, &self.home) {
            (Scope::Home, Some(home)) => Ok(home.join(file::CONFIG_FILE_NAME)),
            (scope, _) => file::resolve_path(
                scope,
                self.workdir.as_deref(),
                target.path.as_deref(),
                self.env.as_ref(),
            ),
        }
    }

    /// Candidate files for an effective read, lowest precedence first.
    pub fn source_paths(&self) -> Result<Vec<PathBuf>, CodexfigError> {
        file::source_paths(
            self.home.as_deref(),
            self.workdir.as_deref(),
            self.env.as_ref(),
        )
    }

    /// Merge the home and project files, apply the active profile and the
    /// environment, and return the result.
    pub fn load(&self) -> Result<EffectiveConfig, CodexfigError> {
        let paths = self.source_paths()?;
        debug!(candidates = ?paths, "loading effective config");
        let files = file::load_sources(&paths)?;
        let input = ResolveInput {
            profile: self.profile.clone(),
            warn_unknown: self.warn_unknown,
            ..ResolveInput::from_loaded(files)
        };
        resolve::resolve(input, self.env.as_ref())
    }

    /// Write `desired` to the target's file.
    pub fn write(
        &self,
        target: &ConfigTarget,
        desired: &CodexConfig,
        options: &WriteOptions,
    ) -> Result<WriteOutcome, CodexfigError> {
        let path = self.path_for(target)?;
        persist::write_config(&path, desired, options)
    }

    /// Read the target's file alone, without layering. `None` if absent.
    pub fn read(&self, target: &ConfigTarget) -> Result<Option<CodexConfig>, CodexfigError> {
        let path = self.path_for(target)?;
        persist::read_config(&path)
    }

    /// Remove the target's file, honoring `keep_file_on_destroy`.
    pub fn remove(
        &self,
        target: &ConfigTarget,
        options: &WriteOptions,
    ) -> Result<RemoveOutcome, CodexfigError> {
        let path = self.path_for(target)?;
        persist::remove_config(&path, options)
    }
}

impl std::fmt::Debug for Codexfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codexfig")
            .field("workdir", &self.workdir)
            .field("home", &self.home)
            .field("profile", &self.profile)
            .field("warn_unknown", &self.warn_unknown)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Codexfig`].
pub struct CodexfigBuilder {
    workdir: Option<PathBuf>,
    home: Option<PathBuf>,
    profile: Option<String>,
    env: Option<Arc<dyn EnvironmentProvider + Send + Sync>>,
    warn_unknown: bool,
}

impl CodexfigBuilder {
    fn new() -> Self {
        Self {
            workdir: None,
            home: None,
            profile: None,
            env: None,
            warn_unknown: true,
        }
    }

    /// Directory whose `.codex/config.toml` is the project layer.
    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Use `dir` as the home config directory instead of `$CODEX_HOME` or `~/.codex`.
    pub fn home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home = Some(dir.into());
        self
    }

    /// Apply this profile on read, whatever the files' `profile` key says.
    pub fn profile(mut self, name: impl Into<String>) -> Self {
        self.profile = Some(name.into());
        self
    }

    /// Read environment variables from `env` instead of the process.
    pub fn env(mut self, env: impl EnvironmentProvider + Send + Sync + 'static) -> Self {
        self.env = Some(Arc::new(env));
        self
    }

    /// Log unknown keys found while reading (default: `true`).
    pub fn warn_unknown(mut self, warn: bool) -> Self {
        self.warn_unknown = warn;
        self
    }

    pub fn build(self) -> Codexfig {
        let not_blank = |p: &PathBuf| !p.as_os_str().is_empty();
        Codexfig {
            workdir: self.workdir.filter(not_blank),
            home: self.home.filter(not_blank),
            profile: self.profile.filter(|p| !p.is_empty()),
            env: self.env.unwrap_or_else(|| Arc::new(ProcessEnv)),
            warn_unknown: self.warn_unknown,
        }
    }
}
