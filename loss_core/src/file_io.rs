//! # Project Files
//!
//! Reading and writing `.tsl` project files:
//! - **Atomic saves**: the project is written to a sibling `.tsl.tmp` file,
//!   synced, then renamed over the target
//! - **Locking**: a `.tsl.lock` file holds an OS-level exclusive lock (fs2)
//!   and records who holds it
//! - **Version check**: files written by an incompatible schema are rejected
//!
//! ## Example
//!
//! ```rust,no_run
//! use loss_core::file_io::{load_project, save_project, FileLock};
//! use loss_core::project::Project;
//! use std::path::Path;
//!
//! let path = Path::new("girder_line.tsl");
//! let lock = FileLock::acquire(path, "engineer@agency.gov")?;
//! save_project(&Project::new("Engineer", "25-001", "Client"), path)?;
//! let project = load_project(path)?;
//! drop(lock);
//! # let _ = project;
//! # Ok::<(), loss_core::errors::LossError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};
use crate::project::{Project, PROJECT_EXTENSION, SCHEMA_VERSION};

/// Locks older than this are considered abandoned
const STALE_LOCK_HOURS: i64 = 24;

/// Who holds a project lock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// True when the holder is gone or the lock has been left behind
    fn is_stale(&self) -> bool {
        if Utc::now() - self.locked_at > Duration::hours(STALE_LOCK_HOURS) {
            return true;
        }
        let same_machine = hostname().map_or(false, |machine| machine == self.machine);
        same_machine && !process_alive(self.pid)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

fn io_error<'a>(
    operation: &str,
    path: &'a Path,
) -> impl FnOnce(std::io::Error) -> LossError + 'a {
    let operation = operation.to_string();
    move |e| LossError::file_error(operation, path.display().to_string(), e.to_string())
}

/// Exclusive lock on a project file, released on drop
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    _handle: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Lock a project file for editing.
    ///
    /// Fails with `LossError::FileLocked` when someone else holds a live lock.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> LossResult<Self> {
        if let Some(holder) = FileLock::check(path) {
            return Err(LossError::file_locked(
                path.display().to_string(),
                format!("{} ({})", holder.user_id, holder.machine),
                holder.locked_at.to_rfc3339(),
            ));
        }

        let lock_path = lock_path_for(path);
        let mut handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(io_error("create lock", &lock_path))?;
        handle
            .try_lock_exclusive()
            .map_err(|_| {
                LossError::file_locked(path.display().to_string(), "another process", "unknown")
            })?;

        let info = LockInfo::new(user_id);
        let json = serde_json::to_string_pretty(&info)?;
        handle
            .write_all(json.as_bytes())
            .map_err(io_error("write lock", &lock_path))?;
        handle.sync_all().map_err(io_error("sync lock", &lock_path))?;

        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _handle: handle,
            info,
        })
    }

    /// Current holder of a live lock on `path`, if any
    pub fn check(path: &Path) -> Option<LockInfo> {
        let contents = fs::read_to_string(lock_path_for(path)).ok()?;
        let info: LockInfo = serde_json::from_str(&contents).ok()?;
        (!info.is_stale()).then_some(info)
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `project.tsl` -> `project.tsl.lock`
fn lock_path_for(project_path: &Path) -> PathBuf {
    let extension = project_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    project_path.with_extension(extension)
}

/// Save a project with atomic write semantics.
pub fn save_project(project: &Project, path: &Path) -> LossResult<()> {
    let json = serde_json::to_string_pretty(project)?;
    let tmp_path = path.with_extension(format!("{}.tmp", PROJECT_EXTENSION));

    let mut tmp = File::create(&tmp_path).map_err(io_error("create temp file", &tmp_path))?;
    tmp.write_all(json.as_bytes())
        .map_err(io_error("write temp file", &tmp_path))?;
    tmp.sync_all().map_err(io_error("sync temp file", &tmp_path))?;
    drop(tmp);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        LossError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;
    log::debug!("Saved project {} to {}", project.meta.job_id, path.display());
    Ok(())
}

/// Load a project and check its schema version.
pub fn load_project(path: &Path) -> LossResult<Project> {
    let contents = fs::read_to_string(path).map_err(io_error("read", path))?;
    let project: Project =
        serde_json::from_str(&contents).map_err(|e| LossError::SerializationError {
            reason: format!("Invalid project file {}: {}", path.display(), e),
        })?;
    validate_version(&project.meta.version)?;
    log::debug!("Loaded project {} from {}", project.meta.job_id, path.display());
    Ok(project)
}

/// Load a project along with the current lock holder, if any
pub fn load_project_with_lock_check(path: &Path) -> LossResult<(Project, Option<LockInfo>)> {
    let project = load_project(path)?;
    Ok((project, FileLock::check(path)))
}

/// Major versions must match; within 0.x a newer minor version is rejected.
fn validate_version(file_version: &str) -> LossResult<()> {
    let parse = |version: &str| -> Vec<u32> {
        version.split('.').filter_map(|p| p.parse().ok()).collect()
    };
    let file = parse(file_version);
    let current = parse(SCHEMA_VERSION);
    let mismatch = || LossError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    match (file.as_slice(), current.as_slice()) {
        ([file_major, ..], [major, ..]) if file_major != major => Err(mismatch()),
        ([0, file_minor, ..], [0, minor, ..]) if file_minor > minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_project_path(name: &str) -> PathBuf {
        temp_dir().join(format!("loss_core_test_{}_{}.tsl", name, std::process::id()))
    }

    #[test]
    fn test_lock_path() {
        assert_eq!(
            lock_path_for(Path::new("/jobs/25-001/girders.tsl")),
            Path::new("/jobs/25-001/girders.tsl.lock")
        );
        assert_eq!(lock_path_for(Path::new("girders")), Path::new("girders.lock"));
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_project_path("roundtrip");
        let project = Project::new("Test Engineer", "TEST-001", "Test Client");
        save_project(&project, &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.id, project.meta.id);
        assert_eq!(loaded.meta.job_id, "TEST-001");
        assert_eq!(loaded.settings, project.settings);
        assert!(!path.with_extension("tsl.tmp").exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_lock_blocks_second_holder() {
        let path = temp_project_path("lock");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "first@example.com").unwrap();
        assert!(lock_path_for(&path).exists());
        assert_eq!(FileLock::check(&path).unwrap().user_id, "first@example.com");

        let err = FileLock::acquire(&path, "second@example.com").err().unwrap();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(err.is_recoverable());

        drop(lock);
        assert!(!lock_path_for(&path).exists());
        assert!(FileLock::check(&path).is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_stale_lock() {
        let mut info = LockInfo::new("someone");
        assert!(!info.is_stale());
        info.locked_at = Utc::now() - Duration::hours(STALE_LOCK_HOURS + 1);
        assert!(info.is_stale());
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_invalid_json() {
        let path = temp_project_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        let err = load_project(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let err = load_project(Path::new("/nonexistent/project.tsl")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
