//! Crash-safe file replacement.
//!
//! Content is written to `<path>.tmp`, synced, then renamed over the target.
//! Anything that fails before the rename leaves the target byte-for-byte as it
//! was. A chmod failure after the rename leaves the new content in place with
//! the old permissions.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{CodexfigError, WriteOp};

/// Mode applied when the mode string is all zeros.
const DEFAULT_MODE: &str = "600";

/// One atomic write request.
#[derive(Debug, Clone)]
pub struct AtomicWrite<'a> {
    pub path: &'a Path,
    pub content: &'a str,
    /// Octal mode string such as `"0600"`. Blank leaves permissions alone.
    pub mode: &'a str,
    /// Copy an existing target to `<path>.bak` first.
    pub backup: bool,
    pub create_dirs: bool,
    /// Single line written above the content.
    pub header: Option<&'a str>,
}

/// Parse an octal mode string.
///
/// Leading zeros are stripped and an all-zero string means `600`.
pub fn parse_file_mode(mode: &str) -> Result<u32, CodexfigError> {
    let stripped = mode.trim().trim_start_matches('0');
    let digits = if stripped.is_empty() {
        DEFAULT_MODE
    } else {
        stripped
    };
    if digits.len() > 4 || !digits.chars().all(|c| ('0'..='7').contains(&c)) {
        return Err(CodexfigError::InvalidFileMode(mode.to_string()));
    }
    u32::from_str_radix(digits, 8).map_err(|_| CodexfigError::InvalidFileMode(mode.to_string()))
}

/// `<path>.<suffix>`, keeping the full file name.
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Write `req.content` to `req.path` atomically.
///
/// Returns the backup path when a backup was made. A `Chmod` error is
/// returned after the rename has already replaced the target; callers see the
/// failure but the new content stays.
pub fn write_atomic(req: &AtomicWrite<'_>) -> Result<Option<PathBuf>, CodexfigError> {
    let path = req.path;
    let mode = match req.mode.trim() {
        "" => None,
        m => Some(parse_file_mode(m)?),
    };

    if req.create_dirs
        && let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)
            .map_err(|e| CodexfigError::write(WriteOp::CreateDir, parent, e))?;
    }

    let backup = if req.backup && path.exists() {
        let bak = sibling_path(path, "bak");
        fs::copy(path, &bak).map_err(|e| CodexfigError::BackupError {
            path: bak.clone(),
            source: e,
        })?;
        debug!(path = %bak.display(), "backed up existing config");
        Some(bak)
    } else {
        None
    };

    let mut body = String::with_capacity(req.content.len() + 64);
    if let Some(header) = req.header.filter(|h| !h.trim().is_empty()) {
        body.push_str(header);
        body.push('\n');
    }
    body.push_str(req.content);

    let tmp = sibling_path(path, "tmp");
    let mut file = open_temp(&tmp).map_err(|e| CodexfigError::write(WriteOp::TempWrite, &tmp, e))?;
    file.write_all(body.as_bytes())
        .map_err(|e| CodexfigError::write(WriteOp::TempWrite, &tmp, e))?;
    file.sync_all()
        .map_err(|e| CodexfigError::write(WriteOp::Sync, &tmp, e))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|e| CodexfigError::write(WriteOp::Rename, path, e))?;

    if let Some(mode) = mode {
        set_mode(path, mode).map_err(|e| CodexfigError::write(WriteOp::Chmod, path, e))?;
    }

    info!(path = %path.display(), bytes = body.len(), "wrote config");
    Ok(backup)
}

#[cfg(unix)]
fn open_temp(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_temp(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request<'a>(path: &'a Path, content: &'a str) -> AtomicWrite<'a> {
        AtomicWrite {
            path,
            content,
            mode: "0600",
            backup: false,
            create_dirs: true,
            header: None,
        }
    }

    #[test]
    fn file_mode_parsing() {
        assert_eq!(parse_file_mode("0600").unwrap(), 0o600);
        assert_eq!(parse_file_mode("644").unwrap(), 0o644);
        assert_eq!(parse_file_mode("0755").unwrap(), 0o755);
        assert_eq!(parse_file_mode("0").unwrap(), 0o600);
        assert_eq!(parse_file_mode("000").unwrap(), 0o600);
    }

    #[test]
    fn file_mode_rejects_non_octal() {
        for bad in ["0986", "rw-r--r--", "6a4", "77777"] {
            let err = parse_file_mode(bad).unwrap_err();
            assert!(matches!(err, CodexfigError::InvalidFileMode(ref m) if m == bad));
        }
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/config.toml");
        write_atomic(&request(&path, "model = \"o3\"\n")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "model = \"o3\"\n");
        assert!(!sibling_path(&path, "tmp").exists());
    }

    #[test]
    fn missing_parent_without_create_dirs_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing/config.toml");
        let mut req = request(&path, "x = 1\n");
        req.create_dirs = false;
        let err = write_atomic(&req).unwrap_err();
        assert!(matches!(
            err,
            CodexfigError::WriteError {
                op: WriteOp::TempWrite,
                ..
            }
        ));
    }

    #[test]
    fn header_is_prepended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut req = request(&path, "model = \"o3\"\n");
        req.header = Some("# managed");
        write_atomic(&req).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# managed\nmodel = \"o3\"\n"
        );
    }

    #[test]
    fn blank_header_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut req = request(&path, "x = 1\n");
        req.header = Some("  ");
        write_atomic(&req).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x = 1\n");
    }

    #[test]
    fn backup_copies_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "old = true\n").unwrap();

        let mut req = request(&path, "new = true\n");
        req.backup = true;
        let backup = write_atomic(&req).unwrap();

        let bak = dir.path().join("config.toml.bak");
        assert_eq!(backup, Some(bak.clone()));
        assert_eq!(fs::read_to_string(&bak).unwrap(), "old = true\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "new = true\n");
    }

    #[test]
    fn no_backup_for_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut req = request(&path, "x = 1\n");
        req.backup = true;
        assert_eq!(write_atomic(&req).unwrap(), None);
        assert!(!dir.path().join("config.toml.bak").exists());
    }

    #[test]
    fn failure_before_rename_leaves_target_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "original = 1\n").unwrap();
        // A directory squatting on the temp path makes the temp write fail.
        fs::create_dir(dir.path().join("config.toml.tmp")).unwrap();

        let err = write_atomic(&request(&path, "replacement = 2\n")).unwrap_err();
        assert!(matches!(
            err,
            CodexfigError::WriteError {
                op: WriteOp::TempWrite,
                ..
            }
        ));
        assert_eq!(fs::read(&path).unwrap(), b"original = 1\n");
    }

    #[test]
    fn invalid_mode_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub/config.toml");
        let mut req = request(&path, "x = 1\n");
        req.mode = "0999";
        let err = write_atomic(&req).unwrap_err();
        assert!(matches!(err, CodexfigError::InvalidFileMode(_)));
        assert!(!dir.path().join("sub").exists());
    }

    #[cfg(unix)]
    #[test]
    fn mode_is_applied_after_rename() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut req = request(&path, "x = 1\n");
        req.mode = "0640";
        write_atomic(&req).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn blank_mode_keeps_temp_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut req = request(&path, "x = 1\n");
        req.mode = "";
        write_atomic(&req).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
