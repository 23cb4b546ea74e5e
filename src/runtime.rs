use crate::cli::ArgumentList;
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Exit status when no command follows the launcher flags
pub const USAGE_EXIT_CODE: i32 = 2;

/// Exit status when the command could not be started
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// The program entry point that runs once launching is done
pub trait Runtime {
    /// Run with the final argument list and produce the process exit status
    fn start(&mut self, args: ArgumentList) -> i32;
}

/// How `CommandRuntime` runs its command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandMode {
    /// Spawn a child, wait for it and return its status
    #[default]
    Spawn,
    /// Replace the current process image (Unix); only a failed exec returns
    Exec,
}

/// Runs `args[1..]` as a command and reports its exit status.
///
/// The command inherits the launcher's standard descriptors, so after
/// daemonization it writes to the redirected files. In `Exec` mode the
/// command keeps the launcher's pid, which is the pid in the pidfile.
#[derive(Debug, Default)]
pub struct CommandRuntime {
    mode: CommandMode,
}

impl CommandRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: CommandMode) -> Self {
        Self { mode }
    }

    /// `Exec` where the platform supports it, `Spawn` elsewhere
    pub fn native() -> Self {
        if cfg!(unix) {
            Self::with_mode(CommandMode::Exec)
        } else {
            Self::with_mode(CommandMode::Spawn)
        }
    }

    pub fn mode(&self) -> CommandMode {
        self.mode
    }
}

impl Runtime for CommandRuntime {
    fn start(&mut self, args: ArgumentList) -> i32 {
        let mut args = args.into_iter();
        let launcher = args.next();
        let Some(program) = args.next() else {
            let name = launcher
                .as_ref()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "dlaunch".to_string());
            eprintln!(
                "Usage: {} [-d] [-f pidfile] [-0 stdin] [-1 stdout] [-2 stderr] <command> [args...]",
                name
            );
            return USAGE_EXIT_CODE;
        };

        debug!("Starting command {:?} ({:?})", program, self.mode);
        let mut command = Command::new(&program);
        command.args(args);

        let result = match self.mode {
            CommandMode::Spawn => command.status().map(exit_code),
            CommandMode::Exec => Err(exec(&mut command)),
        };

        result.unwrap_or_else(|e| {
            eprintln!("Error: Could not start '{}': {}", program.to_string_lossy(), e);
            SPAWN_FAILURE_EXIT_CODE
        })
    }
}

#[cfg(unix)]
fn exec(command: &mut Command) -> std::io::Error {
    use std::os::unix::process::CommandExt;
    command.exec()
}

#[cfg(not(unix))]
fn exec(_command: &mut Command) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "exec is only supported on Unix systems",
    )
}

/// Shell-style exit code for a finished child
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_command_exit_status_is_returned() {
        let mut runtime = CommandRuntime::new();
        let code = runtime.start(ArgumentList::from(["dlaunch", "sh", "-c", "exit 7"]));
        assert_eq!(code, 7);
    }

    #[test]
    fn test_missing_command_is_usage_error() {
        let mut runtime = CommandRuntime::new();
        assert_eq!(runtime.start(ArgumentList::from(["dlaunch"])), USAGE_EXIT_CODE);
    }

    #[test]
    fn test_unknown_command_is_spawn_failure() {
        let mut runtime = CommandRuntime::new();
        let code = runtime.start(ArgumentList::from(["dlaunch", "/nonexistent/dlaunch-command"]));
        assert_eq!(code, SPAWN_FAILURE_EXIT_CODE);
    }

    #[test]
    fn test_native_mode_replaces_process_on_unix() {
        let expected = if cfg!(unix) {
            CommandMode::Exec
        } else {
            CommandMode::Spawn
        };
        assert_eq!(CommandRuntime::native().mode(), expected);
        assert_eq!(CommandRuntime::new().mode(), CommandMode::Spawn);
    }

    #[test]
    fn test_failed_exec_returns_spawn_failure() {
        let mut runtime = CommandRuntime::with_mode(CommandMode::Exec);
        let code = runtime.start(ArgumentList::from(["dlaunch", "/nonexistent/dlaunch-command"]));
        assert_eq!(code, SPAWN_FAILURE_EXIT_CODE);
    }

    #[test]
    #[cfg(unix)]
    fn test_signal_death_maps_above_128() {
        let mut runtime = CommandRuntime::new();
        let code = runtime.start(ArgumentList::from(["dlaunch", "sh", "-c", "kill -TERM $$"]));
        assert_eq!(code, 128 + 15);
    }
}
