// Standard stream redirection and inherited descriptor release

use crate::config::DaemonizeConfig;
use crate::error::{LaunchError, Result, StreamPurpose};
use nix::libc;
use nix::sys::resource::{getrlimit, Resource};
use nix::unistd::{close, dup2};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{IntoRawFd, RawFd};
use std::path::Path;
use tracing::{debug, warn};

/// Creation mode for explicit stdout/stderr files
pub const STREAM_FILE_MODE: u32 = 0o640;

/// Highest descriptor bound the scrub will use, and the bound when the limit is unknown
pub const FALLBACK_DESCRIPTOR_BOUND: RawFd = 65_536;

/// One of the three standard descriptor slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardSlot {
    Stdin,
    Stdout,
    Stderr,
}

impl StandardSlot {
    pub fn fd(self) -> RawFd {
        match self {
            StandardSlot::Stdin => libc::STDIN_FILENO,
            StandardSlot::Stdout => libc::STDOUT_FILENO,
            StandardSlot::Stderr => libc::STDERR_FILENO,
        }
    }

    pub fn purpose(self) -> StreamPurpose {
        match self {
            StandardSlot::Stdin => StreamPurpose::Stdin,
            StandardSlot::Stdout => StreamPurpose::Stdout,
            StandardSlot::Stderr => StreamPurpose::Stderr,
        }
    }
}

/// The files that will become descriptors 0, 1 and 2
#[derive(Debug)]
pub struct DescriptorTriple {
    stdin: File,
    stdout: File,
    stderr: File,
}

impl DescriptorTriple {
    /// Open all three stream files without touching the current descriptors
    pub fn open(config: &DaemonizeConfig) -> Result<Self> {
        let stdin = open_stream(config.resolved_stdin(), StandardSlot::Stdin, false)?;
        let stdout = open_stream(
            config.resolved_stdout(),
            StandardSlot::Stdout,
            config.stdout.is_some(),
        )?;
        let stderr = open_stream(
            config.resolved_stderr(),
            StandardSlot::Stderr,
            config.stderr.is_some(),
        )?;

        Ok(Self {
            stdin,
            stdout,
            stderr,
        })
    }

    /// Substitute descriptors 0, 1 and 2, in that order
    pub fn redirect(self) -> Result<()> {
        redirect_standard_stream(StandardSlot::Stdin, self.stdin)?;
        redirect_standard_stream(StandardSlot::Stdout, self.stdout)?;
        redirect_standard_stream(StandardSlot::Stderr, self.stderr)?;
        Ok(())
    }
}

fn open_stream(path: &Path, slot: StandardSlot, explicit: bool) -> Result<File> {
    let mut options = OpenOptions::new();
    match slot {
        StandardSlot::Stdin => {
            options.read(true);
        }
        StandardSlot::Stdout | StandardSlot::Stderr if explicit => {
            options
                .append(true)
                .create(true)
                .mode(STREAM_FILE_MODE);
        }
        StandardSlot::Stdout | StandardSlot::Stderr => {
            options.write(true);
        }
    }

    debug!("Opening {} source {}", slot.purpose(), path.display());
    options.open(path).map_err(|source| LaunchError::FileOpenFailure {
        path: path.to_path_buf(),
        purpose: slot.purpose(),
        source,
    })
}

/// Make `file` the process's descriptor for `slot`, consuming it
pub fn redirect_standard_stream(slot: StandardSlot, file: File) -> Result<()> {
    move_descriptor(file.into_raw_fd(), slot.fd()).map_err(|source| {
        LaunchError::DescriptorRedirectFailure {
            purpose: slot.purpose(),
            source: source.into(),
        }
    })
}

/// `dup2` `fd` onto `target`, then release `fd`.
///
/// When `fd` already is `target` the `dup2` is a no-op and `fd` stays open.
fn move_descriptor(fd: RawFd, target: RawFd) -> nix::Result<()> {
    let result = dup2(fd, target).map(|_| ());
    if fd != target {
        let _ = close(fd);
    }
    result
}

/// Exclusive upper bound for descriptor numbers this process can hold
pub fn descriptor_bound() -> RawFd {
    match getrlimit(Resource::RLIMIT_NOFILE) {
        Ok((soft, _)) => bound_for_limit(soft),
        Err(e) => {
            warn!(
                "Could not query open file limit ({}), closing descriptors below {}",
                e, FALLBACK_DESCRIPTOR_BOUND
            );
            FALLBACK_DESCRIPTOR_BOUND
        }
    }
}

/// Descriptor bound for a soft `RLIMIT_NOFILE`, capped at the fallback bound
fn bound_for_limit(soft: libc::rlim_t) -> RawFd {
    match RawFd::try_from(soft) {
        Ok(bound) if soft != libc::RLIM_INFINITY && bound <= FALLBACK_DESCRIPTOR_BOUND => bound,
        _ => {
            debug!(
                "Open file limit {} is above {}, using {}",
                soft, FALLBACK_DESCRIPTOR_BOUND, FALLBACK_DESCRIPTOR_BOUND
            );
            FALLBACK_DESCRIPTOR_BOUND
        }
    }
}

/// Close every descriptor above stderr, returning the bound that was used
pub fn scrub_inherited_descriptors() -> RawFd {
    let bound = descriptor_bound();
    for fd in (libc::STDERR_FILENO + 1)..bound {
        // EBADF for slots that were never open
        let _ = close(fd);
    }
    debug!("Released descriptors 3..{}", bound);
    bound
}
