// Library exports for the dlaunch daemonizing launcher

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod logs;
pub mod runtime;
