// Daemonization support: prepare, redirect, detach, finalize

use crate::cli::ArgumentList;
use crate::config::DaemonizeConfig;
#[cfg(not(unix))]
use crate::error::LaunchError;
use crate::error::Result;
use tracing::debug;

#[cfg(unix)]
pub use nix::unistd::Pid;
#[cfg(not(unix))]
pub type Pid = u32;

/// Progress of the daemonization sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    NotRequested,
    Preparing,
    Redirected,
    Detached,
    Failed,
}

/// Which side of the fork the caller is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRole {
    Parent(Pid),
    Child,
}

/// What the entry point should do once launching has been handled
#[derive(Debug)]
pub enum Launch {
    /// The invoking process; it should exit with status 0 right away
    Parent(Pid),
    /// Run the runtime with these (flag-stripped) arguments
    Ready(ArgumentList),
}

/// Strip daemonization flags from `args` and daemonize if they ask for it
pub fn launch(mut args: ArgumentList) -> Result<Launch> {
    let config = DaemonizeConfig::from_args(&mut args)?;
    if !config.daemonize {
        debug!("Daemonization not requested");
        return Ok(Launch::Ready(args));
    }

    match Daemonizer::new().run(&config)? {
        ProcessRole::Parent(pid) => Ok(Launch::Parent(pid)),
        ProcessRole::Child => Ok(Launch::Ready(args)),
    }
}

/// Runs the daemonization sequence once, tracking its state
#[derive(Debug)]
pub struct Daemonizer {
    state: DaemonState,
}

impl Daemonizer {
    pub fn new() -> Self {
        Self {
            state: DaemonState::NotRequested,
        }
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    fn transition(&mut self, next: DaemonState) {
        debug!("Daemon state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn step<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.transition(DaemonState::Failed);
        }
        result
    }

    /// Prepare, redirect, detach and finalize according to `config`
    #[cfg(unix)]
    pub fn run(&mut self, config: &DaemonizeConfig) -> Result<ProcessRole> {
        use super::descriptors::{scrub_inherited_descriptors, DescriptorTriple};
        use super::pid::PidFile;
        use crate::error::LaunchError;
        use nix::unistd::{getpid, setsid};
        use tracing::info;

        if !config.daemonize {
            return Ok(ProcessRole::Child);
        }

        // All files are opened before descriptor 0 is replaced
        self.transition(DaemonState::Preparing);
        let pidfile = self.step(config.pidfile.as_deref().map(PidFile::open).transpose())?;
        let triple = self.step(DescriptorTriple::open(config))?;

        self.step(triple.redirect())?;
        self.transition(DaemonState::Redirected);

        match self.step(spawn_detached())? {
            ProcessRole::Parent(child) => {
                info!("Detached into background process {}", child);
                return Ok(ProcessRole::Parent(child));
            }
            ProcessRole::Child => {}
        }

        self.step(
            setsid()
                .map(|_| ())
                .map_err(|e| LaunchError::SessionDetachFailure(e.into())),
        )?;

        if let Some(pidfile) = pidfile {
            self.step(pidfile.write_pid(getpid()))?;
        }

        scrub_inherited_descriptors();
        self.transition(DaemonState::Detached);
        Ok(ProcessRole::Child)
    }

    #[cfg(not(unix))]
    pub fn run(&mut self, config: &DaemonizeConfig) -> Result<ProcessRole> {
        if !config.daemonize {
            return Ok(ProcessRole::Child);
        }
        self.transition(DaemonState::Failed);
        Err(LaunchError::Unsupported(
            "Daemonization is only supported on Unix systems".to_string(),
        ))
    }
}

impl Default for Daemonizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Fork, telling the caller which process it now is
#[cfg(unix)]
pub fn spawn_detached() -> Result<ProcessRole> {
    use crate::error::LaunchError;
    use nix::unistd::{fork, ForkResult};

    // Only the calling thread survives in the child
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => Ok(ProcessRole::Parent(child)),
        Ok(ForkResult::Child) => Ok(ProcessRole::Child),
        Err(e) => Err(LaunchError::ForkFailure(e.into())),
    }
}

#[cfg(not(unix))]
pub fn spawn_detached() -> Result<ProcessRole> {
    Err(LaunchError::Unsupported(
        "Forking is only supported on Unix systems".to_string(),
    ))
}
