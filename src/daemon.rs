//! Running detached from the terminal
//!
//! [`detach`] must run before the async runtime exists: `daemon(3)` forks and
//! only the calling thread survives in the child. The PID file lock taken by
//! [`lock_pid_file`] lives as long as the returned [`PidFile`].

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const PID_FILE_MODE: u32 = 0o640;

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("Failed to detach from terminal: {0}")]
    DetachError(String),

    #[error("PID file {path}: {reason}")]
    PidFileError { path: PathBuf, reason: String },
}

/// Held PID file; the lock is released when this is dropped
#[derive(Debug)]
pub struct PidFile {
    _file: File,
}

#[derive(Debug)]
pub enum PidLock {
    Acquired(PidFile),
    /// Another process holds the lock
    HeldElsewhere,
}

/// Fork into the background, chdir to `/` and point stdio at `/dev/null`
pub fn detach() -> Result<(), DaemonError> {
    // SAFETY: no other threads exist yet and no locks are held across the fork.
    let rc = unsafe { libc::daemon(0, 0) };
    if rc != 0 {
        return Err(DaemonError::DetachError(io::Error::last_os_error().to_string()));
    }
    Ok(())
}

pub fn lock_pid_file(path: &Path) -> Result<PidLock, DaemonError> {
    let pid_error = |reason: String| DaemonError::PidFileError {
        path: path.to_path_buf(),
        reason,
    };

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .mode(PID_FILE_MODE)
        .open(path)
        .map_err(|e| pid_error(e.to_string()))?;

    // SAFETY: the descriptor belongs to `file`, which outlives the call.
    let rc = unsafe { libc::lockf(file.as_raw_fd(), libc::F_TLOCK, 0) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        return match err.raw_os_error() {
            Some(libc::EACCES) | Some(libc::EAGAIN) => {
                warn!("PID file {} is locked by another instance", path.display());
                Ok(PidLock::HeldElsewhere)
            }
            _ => Err(pid_error(err.to_string())),
        };
    }

    file.set_len(0).map_err(|e| pid_error(e.to_string()))?;
    writeln!(file, "{}", std::process::id()).map_err(|e| pid_error(e.to_string()))?;
    file.flush().map_err(|e| pid_error(e.to_string()))?;

    info!("PID file {} locked", path.display());
    Ok(PidLock::Acquired(PidFile { _file: file }))
}
