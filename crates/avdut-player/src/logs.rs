//! Per-instance player log
//!
//! Each supervised player writes its stdout/stderr into one log file owned
//! by the supervisor. The handle is flushed when the player stops and
//! removed by the explicit cleanup step afterwards.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Log resources opened for one reference-player instance.
#[derive(Debug)]
pub struct PlayerLog {
    path: PathBuf,
    file: File,
}

impl PlayerLog {
    /// Create the log file for a player on `odp_port` under `dir`.
    ///
    /// The file name carries the harness PID and the diagnostics port, the
    /// two values that make an instance unique on one host.
    pub fn create(dir: &Path, odp_port: u16) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("player-{}-{}.log", std::process::id(), odp_port));
        let file = File::create(&path)?;
        tracing::debug!(path = %path.display(), "Opened player log");
        Ok(Self { path, file })
    }

    /// Stdio pair redirecting a child's stdout and stderr into this log.
    pub fn stdio(&self) -> io::Result<(Stdio, Stdio)> {
        Ok((
            Stdio::from(self.file.try_clone()?),
            Stdio::from(self.file.try_clone()?),
        ))
    }

    /// Flush buffered log data to disk.
    pub fn flush(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the handle and remove the log file.
    pub fn cleanup(self) -> io::Result<()> {
        let path = self.path.clone();
        drop(self);
        std::fs::remove_file(&path)?;
        tracing::debug!(path = %path.display(), "Removed player log");
        Ok(())
    }
}
