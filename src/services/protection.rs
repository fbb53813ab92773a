use crate::error::{OpsError, OpsResult};
use crate::models::ProtectionState;
use crate::platform::PlatformFamily;
use camino::Utf8Path;
use std::sync::Arc;

/// Platform capability for OS-level write protection.
///
/// Windows exposes a read-only attribute bit; POSIX has three write bits in
/// the mode. Both are reduced to the same binary read-only/writable view.
#[cfg_attr(test, mockall::automock)]
pub trait ProtectionBackend: Send + Sync {
    fn set_read_only(&self, path: &Utf8Path) -> OpsResult<()>;

    fn unset_read_only(&self, path: &Utf8Path) -> OpsResult<()>;

    fn is_read_only(&self, path: &Utf8Path) -> OpsResult<bool>;
}

/// Build the protection backend for a platform family.
///
/// # Errors
/// [`OpsError::Unsupported`] when the family's OS API is not available in this build.
pub fn protection_backend(family: PlatformFamily) -> OpsResult<Arc<dyn ProtectionBackend>> {
    match family {
        PlatformFamily::Windows => windows_backend(),
        PlatformFamily::Posix => posix_backend(),
    }
}

#[cfg(windows)]
fn windows_backend() -> OpsResult<Arc<dyn ProtectionBackend>> {
    Ok(Arc::new(windows_attributes::WindowsAttributes))
}

#[cfg(not(windows))]
fn windows_backend() -> OpsResult<Arc<dyn ProtectionBackend>> {
    Err(OpsError::Unsupported(
        "Windows file attributes are not available in this build".to_string(),
    ))
}

#[cfg(unix)]
fn posix_backend() -> OpsResult<Arc<dyn ProtectionBackend>> {
    Ok(Arc::new(posix_mode::PosixModeBits))
}

#[cfg(not(unix))]
fn posix_backend() -> OpsResult<Arc<dyn ProtectionBackend>> {
    Err(OpsError::Unsupported(
        "POSIX mode bits are not available in this build".to_string(),
    ))
}

/// Protection backend for an OS with no known permission model.
///
/// Every call fails with [`OpsError::Unsupported`] naming the OS.
#[derive(Debug, Clone)]
pub struct UnsupportedProtection {
    os: String,
}

impl UnsupportedProtection {
    pub fn new(os: impl Into<String>) -> Self {
        Self { os: os.into() }
    }

    fn refuse(&self) -> OpsResult<()> {
        Err(OpsError::Unsupported(self.os.clone()))
    }
}

impl ProtectionBackend for UnsupportedProtection {
    fn set_read_only(&self, _path: &Utf8Path) -> OpsResult<()> {
        self.refuse()
    }

    fn unset_read_only(&self, _path: &Utf8Path) -> OpsResult<()> {
        self.refuse()
    }

    fn is_read_only(&self, _path: &Utf8Path) -> OpsResult<bool> {
        self.refuse().map(|()| false)
    }
}

#[cfg(unix)]
pub use posix_mode::PosixModeBits;

#[cfg(windows)]
pub use windows_attributes::WindowsAttributes;

#[cfg(unix)]
mod posix_mode {
    use super::ProtectionBackend;
    use crate::error::{OpsError, OpsResult};
    use camino::Utf8Path;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    /// Owner, group and other write bits
    const WRITE_BITS: u32 = 0o222;

    /// Permission bits proper (including setuid/setgid/sticky), without file type
    const PERMISSION_MASK: u32 = 0o7777;

    /// Clears or sets the three write bits; every other mode bit is kept.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PosixModeBits;

    impl PosixModeBits {
        fn mode(path: &Utf8Path) -> OpsResult<u32> {
            let metadata = fs::metadata(path)
                .map_err(|e| OpsError::from_io(format!("Cannot stat {}", path), e))?;
            Ok(metadata.permissions().mode() & PERMISSION_MASK)
        }

        fn set_mode(path: &Utf8Path, mode: u32) -> OpsResult<()> {
            fs::set_permissions(path, fs::Permissions::from_mode(mode))
                .map_err(|e| OpsError::from_io(format!("Cannot change mode of {}", path), e))?;
            tracing::debug!("Mode of {} set to {:o}", path, mode);
            Ok(())
        }
    }

    impl ProtectionBackend for PosixModeBits {
        fn set_read_only(&self, path: &Utf8Path) -> OpsResult<()> {
            let mode = Self::mode(path)?;
            Self::set_mode(path, mode & !WRITE_BITS)
        }

        fn unset_read_only(&self, path: &Utf8Path) -> OpsResult<()> {
            let mode = Self::mode(path)?;
            Self::set_mode(path, mode | WRITE_BITS)
        }

        fn is_read_only(&self, path: &Utf8Path) -> OpsResult<bool> {
            Ok(Self::mode(path)? & WRITE_BITS == 0)
        }
    }
}

#[cfg(windows)]
mod windows_attributes {
    use super::ProtectionBackend;
    use crate::error::{OpsError, OpsResult};
    use camino::Utf8Path;
    use std::io;
    use std::os::windows::ffi::OsStrExt;
    use windows::Win32::Storage::FileSystem::{
        FILE_ATTRIBUTE_NORMAL, FILE_ATTRIBUTE_READONLY, FILE_FLAGS_AND_ATTRIBUTES,
        GetFileAttributesW, SetFileAttributesW,
    };
    use windows::core::PCWSTR;

    // Returned by GetFileAttributesW on failure.
    const INVALID_FILE_ATTRIBUTES: u32 = u32::MAX;

    /// Toggles `FILE_ATTRIBUTE_READONLY` through the Win32 attribute API.
    ///
    /// Clearing only drops the read-only bit; hidden/system/archive survive.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct WindowsAttributes;

    fn wide(path: &Utf8Path) -> Vec<u16> {
        path.as_std_path()
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect()
    }

    impl WindowsAttributes {
        fn attributes(path: &Utf8Path) -> OpsResult<u32> {
            let wide_path = wide(path);
            let attrs = unsafe { GetFileAttributesW(PCWSTR(wide_path.as_ptr())) };
            if attrs == INVALID_FILE_ATTRIBUTES {
                return Err(OpsError::from_io(
                    format!("Cannot read attributes of {}", path),
                    io::Error::last_os_error(),
                ));
            }
            Ok(attrs)
        }

        fn set_attributes(path: &Utf8Path, attrs: u32) -> OpsResult<()> {
            // FILE_ATTRIBUTE_NORMAL is only valid on its own
            let attrs = if attrs == 0 {
                FILE_ATTRIBUTE_NORMAL.0
            } else {
                attrs
            };

            let wide_path = wide(path);
            unsafe {
                SetFileAttributesW(
                    PCWSTR(wide_path.as_ptr()),
                    FILE_FLAGS_AND_ATTRIBUTES(attrs),
                )
            }
            .map_err(|e| {
                OpsError::from_io(
                    format!("Cannot change attributes of {}", path),
                    io::Error::from(e),
                )
            })?;

            tracing::debug!("Attributes of {} set to {:#x}", path, attrs);
            Ok(())
        }
    }

    impl ProtectionBackend for WindowsAttributes {
        fn set_read_only(&self, path: &Utf8Path) -> OpsResult<()> {
            let attrs = Self::attributes(path)? & !FILE_ATTRIBUTE_NORMAL.0;
            Self::set_attributes(path, attrs | FILE_ATTRIBUTE_READONLY.0)
        }

        fn unset_read_only(&self, path: &Utf8Path) -> OpsResult<()> {
            let attrs = Self::attributes(path)?;
            Self::set_attributes(path, attrs & !FILE_ATTRIBUTE_READONLY.0)
        }

        fn is_read_only(&self, path: &Utf8Path) -> OpsResult<bool> {
            Ok(Self::attributes(path)? & FILE_ATTRIBUTE_READONLY.0 != 0)
        }
    }
}

/// Protection Toggle: sets or clears write protection on a file.
#[derive(Clone)]
pub struct ProtectionToggle {
    backend: Arc<dyn ProtectionBackend>,
}

impl ProtectionToggle {
    pub fn new(backend: Arc<dyn ProtectionBackend>) -> Self {
        Self { backend }
    }

    pub fn set_read_only(&self, path: &Utf8Path) -> OpsResult<()> {
        self.backend.set_read_only(path).inspect_err(|e| {
            tracing::warn!("Failed to set {} read-only: {}", path, e);
        })?;
        tracing::info!("Set {} read-only", path);
        Ok(())
    }

    pub fn unset_read_only(&self, path: &Utf8Path) -> OpsResult<()> {
        self.backend.unset_read_only(path).inspect_err(|e| {
            tracing::warn!("Failed to clear read-only on {}: {}", path, e);
        })?;
        tracing::info!("Cleared read-only on {}", path);
        Ok(())
    }
}

/// Permission Auditor: read-only observation, no mutation and no audit entry.
#[derive(Clone)]
pub struct PermissionAuditor {
    backend: Arc<dyn ProtectionBackend>,
}

impl PermissionAuditor {
    pub fn new(backend: Arc<dyn ProtectionBackend>) -> Self {
        Self { backend }
    }

    pub fn check_permissions(&self, path: &Utf8Path) -> OpsResult<ProtectionState> {
        let state = ProtectionState::from_read_only(self.backend.is_read_only(path)?);
        tracing::debug!("{} is {}", path, state);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use mockall::predicate::eq;

    #[test]
    fn test_auditor_maps_backend_answer() {
        let mut backend = MockProtectionBackend::new();
        backend
            .expect_is_read_only()
            .with(eq(Utf8Path::new("locked.txt")))
            .returning(|_| Ok(true));
        backend
            .expect_is_read_only()
            .with(eq(Utf8Path::new("open.txt")))
            .returning(|_| Ok(false));

        let auditor = PermissionAuditor::new(Arc::new(backend));
        assert_eq!(
            auditor.check_permissions(Utf8Path::new("locked.txt")).unwrap(),
            ProtectionState::ReadOnly
        );
        assert_eq!(
            auditor.check_permissions(Utf8Path::new("open.txt")).unwrap(),
            ProtectionState::Writable
        );
    }

    #[test]
    fn test_toggle_surfaces_backend_failure() {
        let mut backend = MockProtectionBackend::new();
        backend
            .expect_set_read_only()
            .times(1)
            .returning(|path| Err(OpsError::PermissionDenied(path.to_string())));

        let toggle = ProtectionToggle::new(Arc::new(backend));
        let err = toggle
            .set_read_only(Utf8Path::new("C:/Windows/system.ini"))
            .unwrap_err();
        assert!(matches!(err, OpsError::PermissionDenied(_)));
    }

    #[test]
    fn test_backend_for_foreign_family_is_unsupported() {
        let foreign = if cfg!(windows) {
            PlatformFamily::Posix
        } else {
            PlatformFamily::Windows
        };
        assert!(matches!(
            protection_backend(foreign),
            Err(OpsError::Unsupported(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_posix_keeps_non_write_bits() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("tool.sh")).unwrap();
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o754)).unwrap();

        let backend = PosixModeBits;
        backend.set_read_only(&path).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o7777, 0o554);
        assert!(backend.is_read_only(&path).unwrap());

        backend.unset_read_only(&path).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o7777, 0o776);
        assert!(!backend.is_read_only(&path).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_posix_missing_file_is_not_found() {
        let backend = PosixModeBits;
        let err = backend
            .set_read_only(Utf8Path::new("/nonexistent/opsconsole/file.txt"))
            .unwrap_err();
        assert!(matches!(err, OpsError::NotFound(_)));
    }

    #[test]
    fn test_unsupported_protection_refuses_every_call() {
        let backend: Arc<dyn ProtectionBackend> = Arc::new(UnsupportedProtection::new("haiku"));
        let toggle = ProtectionToggle::new(Arc::clone(&backend));
        let auditor = PermissionAuditor::new(backend);
        let path = Utf8Path::new("report.txt");

        assert!(matches!(toggle.set_read_only(path), Err(OpsError::Unsupported(ref os)) if os == "haiku"));
        assert!(matches!(toggle.unset_read_only(path), Err(OpsError::Unsupported(_))));
        assert!(matches!(auditor.check_permissions(path), Err(OpsError::Unsupported(_))));
    }
}
