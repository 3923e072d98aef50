//! Platform-conditional executable resolution
//!
//! The reference player ships under a fixed `install/bin` layout, with a
//! `.exe` suffix on Windows and none elsewhere. The resolver takes the
//! platform as a value so tests can exercise both spellings on one host.

use std::path::{Path, PathBuf};

use avdut_core::{HarnessError, Result};

/// Base name of the reference-player executable.
pub const PLAYER_EXE_STEM: &str = "TestMediaPlayer";

/// Platform family, as far as executable naming is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    /// The platform this harness was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    fn exe_name(self) -> String {
        match self {
            Platform::Windows => format!("{}.exe", PLAYER_EXE_STEM),
            Platform::Unix => PLAYER_EXE_STEM.to_string(),
        }
    }
}

/// Resolve the reference-player executable beneath `install_root`.
///
/// Fails with `ExecutableNotFound` (carrying the resolved path) when the
/// file does not exist; the caller must not have spawned anything or
/// allocated any per-instance resources yet.
pub fn resolve_player_exe(install_root: &Path, platform: Platform) -> Result<PathBuf> {
    let path = install_root
        .join("install")
        .join("bin")
        .join(platform.exe_name());

    if path.is_file() {
        Ok(path)
    } else {
        Err(HarnessError::ExecutableNotFound(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_resolution_appends_exe_suffix() {
        let root = tempfile::tempdir().unwrap();
        let bin = root.path().join("install").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("TestMediaPlayer.exe"), b"").unwrap();

        let path = resolve_player_exe(root.path(), Platform::Windows).unwrap();
        assert!(path.ends_with("install/bin/TestMediaPlayer.exe"));
    }

    #[test]
    fn unix_resolution_uses_bare_name() {
        let root = tempfile::tempdir().unwrap();
        let bin = root.path().join("install").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("TestMediaPlayer"), b"").unwrap();

        let path = resolve_player_exe(root.path(), Platform::Unix).unwrap();
        assert!(path.ends_with("install/bin/TestMediaPlayer"));
    }

    #[test]
    fn missing_executable_reports_resolved_path() {
        let root = tempfile::tempdir().unwrap();
        match resolve_player_exe(root.path(), Platform::Unix) {
            Err(HarnessError::ExecutableNotFound(path)) => {
                assert!(path.ends_with("install/bin/TestMediaPlayer"));
            }
            other => panic!("expected ExecutableNotFound, got {:?}", other),
        }
    }
}
