// Daemon module - Detaching the launcher into the background

pub mod daemonize;
#[cfg(unix)]
pub mod descriptors;
pub mod pid;

pub use daemonize::{launch, spawn_detached, DaemonState, Daemonizer, Launch, Pid, ProcessRole};
pub use pid::PidFile;
