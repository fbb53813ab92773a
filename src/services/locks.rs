use crate::error::{OpsError, OpsResult};
use crate::models::{AuditAction, AuditEntry};
use crate::services::audit::AuditLog;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, File, OpenOptions};
use std::io;

/// Suffix appended to a file name to form its marker
pub const LOCK_SUFFIX: &str = ".lock";

/// Advisory lock registry backed by marker files.
///
/// `<dir>/<filename>.lock` existing means `filename` is locked. The marker is
/// empty and carries no owner or expiry. Nothing stops other programs, or this
/// console's own file operations, from touching the locked file: the lock is a
/// cooperative signal only.
///
/// Every successful lock/unlock appends exactly one audit entry; a failed
/// attempt appends none.
#[derive(Debug, Clone)]
pub struct LockRegistry {
    dir: Utf8PathBuf,
    audit: AuditLog,
}

impl LockRegistry {
    /// Registry keeping its markers and audit log in `dir`
    pub fn new<P: AsRef<Utf8Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            audit: AuditLog::new(&dir),
            dir,
        }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Marker path for `filename`.
    ///
    /// # Errors
    /// [`OpsError::InvalidInput`] unless `filename` is a plain file name.
    pub fn marker_path(&self, filename: &str) -> OpsResult<Utf8PathBuf> {
        validate_lock_name(filename)?;
        Ok(self.dir.join(format!("{}{}", filename, LOCK_SUFFIX)))
    }

    /// Take the lock on `filename`.
    ///
    /// The marker is created with an exclusive create, so two sessions racing
    /// on the same name cannot both succeed.
    ///
    /// # Errors
    /// [`OpsError::AlreadyExists`] if the marker is already present.
    pub fn lock(&self, filename: &str) -> OpsResult<AuditEntry> {
        let marker = self.marker_path(filename)?;

        fs::create_dir_all(&self.dir).map_err(|e| OpsError::Io {
            context: format!("Failed to create lock directory {}", self.dir),
            source: e,
        })?;

        match OpenOptions::new().write(true).create_new(true).open(&marker) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::warn!("Lock refused, {} is already locked", filename);
                return Err(OpsError::AlreadyExists(format!(
                    "{} is already locked",
                    filename
                )));
            }
            Err(e) => {
                return Err(OpsError::from_io(
                    format!("Failed to create lock marker {}", marker),
                    e,
                ));
            }
        }

        match self.audit.append(AuditAction::Lock, filename) {
            Ok(entry) => {
                tracing::info!("Locked {}", filename);
                Ok(entry)
            }
            Err(e) => {
                // An unaudited lock must not survive
                if let Err(rollback) = fs::remove_file(&marker) {
                    tracing::error!("Failed to roll back marker {}: {}", marker, rollback);
                }
                Err(e)
            }
        }
    }

    /// Release the lock on `filename`.
    ///
    /// # Errors
    /// [`OpsError::NotFound`] if no marker exists.
    pub fn unlock(&self, filename: &str) -> OpsResult<AuditEntry> {
        let marker = self.marker_path(filename)?;

        match fs::remove_file(&marker) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("Unlock refused, {} is not locked", filename);
                return Err(OpsError::NotFound(format!("{} is not locked", filename)));
            }
            Err(e) => {
                return Err(OpsError::from_io(
                    format!("Failed to remove lock marker {}", marker),
                    e,
                ));
            }
        }

        match self.audit.append(AuditAction::Unlock, filename) {
            Ok(entry) => {
                tracing::info!("Unlocked {}", filename);
                Ok(entry)
            }
            Err(e) => {
                if let Err(rollback) = File::create(&marker) {
                    tracing::error!("Failed to restore marker {}: {}", marker, rollback);
                }
                Err(e)
            }
        }
    }

    /// Whether a marker exists for `filename`. No side effects.
    pub fn is_locked(&self, filename: &str) -> bool {
        match self.marker_path(filename) {
            Ok(marker) => marker.exists(),
            Err(_) => false,
        }
    }

    /// Names of all currently locked files, sorted.
    pub fn locked_files(&self) -> OpsResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(OpsError::from_io(
                    format!("Failed to read lock directory {}", self.dir),
                    e,
                ));
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| name.strip_suffix(LOCK_SUFFIX).map(str::to_string))
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();

        Ok(names)
    }
}

fn validate_lock_name(filename: &str) -> OpsResult<()> {
    if filename.is_empty() || filename == "." || filename == ".." {
        return Err(OpsError::InvalidInput(format!(
            "'{}' is not a valid file name to lock",
            filename
        )));
    }
    if filename.contains(['/', '\\']) {
        return Err(OpsError::InvalidInput(format!(
            "'{}' must be a file name, not a path",
            filename
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_registry() -> (LockRegistry, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (LockRegistry::new(dir), temp_dir)
    }

    #[test]
    fn test_marker_is_empty_file_next_to_audit_log() {
        let (registry, _temp_dir) = create_test_registry();
        registry.lock("report.txt").unwrap();

        let marker = registry.dir().join("report.txt.lock");
        assert_eq!(fs::metadata(&marker).unwrap().len(), 0);
        assert!(registry.audit_log().path().exists());
    }

    #[test]
    fn test_rejects_paths_as_names() {
        let (registry, _temp_dir) = create_test_registry();

        for name in ["", ".", "..", "../escape.txt", "sub/dir.txt", "sub\\dir.txt"] {
            assert!(
                matches!(registry.lock(name), Err(OpsError::InvalidInput(_))),
                "{:?} should be rejected",
                name
            );
        }
        assert!(registry.audit_log().entries().unwrap().is_empty());
        assert!(!registry.is_locked("../escape.txt"));
    }

    #[test]
    fn test_lock_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().join("nested/out")).unwrap();
        let registry = LockRegistry::new(&dir);

        registry.lock("a.txt").unwrap();
        assert!(registry.is_locked("a.txt"));
    }

    #[test]
    fn test_locked_files_lists_sorted_names() {
        let (registry, _temp_dir) = create_test_registry();
        registry.lock("zeta.txt").unwrap();
        registry.lock("alpha.txt").unwrap();

        assert_eq!(registry.locked_files().unwrap(), vec!["alpha.txt", "zeta.txt"]);

        registry.unlock("zeta.txt").unwrap();
        assert_eq!(registry.locked_files().unwrap(), vec!["alpha.txt"]);
    }

    #[test]
    fn test_locked_files_on_missing_directory() {
        let registry = LockRegistry::new("/nonexistent/opsconsole/out");
        assert!(registry.locked_files().unwrap().is_empty());
    }
}
