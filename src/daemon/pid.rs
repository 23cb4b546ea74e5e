// PID file handle for the detached process

use crate::error::{LaunchError, Result, StreamPurpose};
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// An open, truncated pidfile waiting for the detached process id
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    file: File,
}

impl PidFile {
    /// Open (create or truncate) the pidfile for writing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| LaunchError::FileOpenFailure {
                path: path.clone(),
                purpose: StreamPurpose::Pidfile,
                source,
            })?;

        Ok(Self { path, file })
    }

    /// Write `pid` as a decimal line and close the file
    pub fn write_pid(mut self, pid: impl Display) -> Result<()> {
        writeln!(self.file, "{}", pid)
            .and_then(|_| self.file.sync_all())
            .map_err(|source| LaunchError::PidFileWriteFailure {
                path: self.path.clone(),
                source,
            })
    }

    /// Get the path to the PID file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
