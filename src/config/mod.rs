use crate::cli::{ArgumentList, DAEMONIZE, PIDFILE, STDERR, STDIN, STDOUT};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Platform discard device used when a stream path is not given
#[cfg(not(windows))]
pub const NULL_DEVICE: &str = "/dev/null";
#[cfg(windows)]
pub const NULL_DEVICE: &str = "NUL";

/// Environment variable holding the tracing filter directive
pub const LOG_ENV: &str = "DLAUNCH_LOG";

/// Filter used when `DLAUNCH_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Daemonization settings pulled out of the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonizeConfig {
    /// Whether to detach into the background
    pub daemonize: bool,

    /// File to receive the detached process id
    pub pidfile: Option<PathBuf>,

    /// Source for standard input
    pub stdin: Option<PathBuf>,

    /// Destination for standard output
    pub stdout: Option<PathBuf>,

    /// Destination for standard error
    pub stderr: Option<PathBuf>,
}

impl DaemonizeConfig {
    /// Strip the daemonization flags from `args` and build the configuration.
    ///
    /// Value flags are only recognized once `-d`/`--daemonize` is present;
    /// otherwise they are left in place for the runtime.
    pub fn from_args(args: &mut ArgumentList) -> Result<Self> {
        if !args.extract_flag(DAEMONIZE.long, DAEMONIZE.short) {
            return Ok(Self::default());
        }

        let pidfile = args.extract_flag_with_value(PIDFILE.long, PIDFILE.short)?;
        let stdin = args.extract_flag_with_value(STDIN.long, STDIN.short)?;
        let stdout = args.extract_flag_with_value(STDOUT.long, STDOUT.short)?;
        let stderr = args.extract_flag_with_value(STDERR.long, STDERR.short)?;

        Ok(Self {
            daemonize: true,
            pidfile: pidfile.map(PathBuf::from),
            stdin: stdin.map(PathBuf::from),
            stdout: stdout.map(PathBuf::from),
            stderr: stderr.map(PathBuf::from),
        })
    }

    pub fn resolved_stdin(&self) -> &Path {
        resolve(self.stdin.as_deref())
    }

    pub fn resolved_stdout(&self) -> &Path {
        resolve(self.stdout.as_deref())
    }

    pub fn resolved_stderr(&self) -> &Path {
        resolve(self.stderr.as_deref())
    }
}

fn resolve(path: Option<&Path>) -> &Path {
    path.unwrap_or_else(|| Path::new(NULL_DEVICE))
}

/// Tracing filter directive from the environment, or the default
pub fn log_filter() -> String {
    std::env::var(LOG_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaunchError;

    #[test]
    fn test_defaults_resolve_to_null_device() {
        let mut args = ArgumentList::from(["prog", "-d", "app.js"]);
        let config = DaemonizeConfig::from_args(&mut args).unwrap();

        assert!(config.daemonize);
        assert_eq!(config.resolved_stdin(), Path::new(NULL_DEVICE));
        assert_eq!(config.resolved_stdout(), Path::new(NULL_DEVICE));
        assert_eq!(config.resolved_stderr(), Path::new(NULL_DEVICE));
        assert_eq!(args, ArgumentList::from(["prog", "app.js"]));
    }

    #[test]
    fn test_all_flags_extracted() {
        let mut args = ArgumentList::from([
            "prog", "--stdout", "out.log", "app.js", "-f", "app.pid", "-0", "in.txt",
            "--daemonize", "-2", "err.log", "--port", "8080",
        ]);
        let config = DaemonizeConfig::from_args(&mut args).unwrap();

        assert_eq!(
            config,
            DaemonizeConfig {
                daemonize: true,
                pidfile: Some(PathBuf::from("app.pid")),
                stdin: Some(PathBuf::from("in.txt")),
                stdout: Some(PathBuf::from("out.log")),
                stderr: Some(PathBuf::from("err.log")),
            }
        );
        assert_eq!(config.resolved_stdout(), Path::new("out.log"));
        assert_eq!(args, ArgumentList::from(["prog", "app.js", "--port", "8080"]));
    }

    #[test]
    fn test_value_flags_untouched_without_daemonize() {
        let mut args = ArgumentList::from(["prog", "-f", "file.txt", "-1"]);
        let before = args.clone();
        let config = DaemonizeConfig::from_args(&mut args).unwrap();

        assert!(!config.daemonize);
        assert_eq!(config, DaemonizeConfig::default());
        assert_eq!(args, before);
    }

    #[test]
    fn test_missing_stream_value_is_error() {
        let mut args = ArgumentList::from(["prog", "-d", "app.js", "--stderr"]);
        let result = DaemonizeConfig::from_args(&mut args);
        assert!(matches!(
            result,
            Err(LaunchError::MissingArgumentValue { ref flag }) if flag == "--stderr"
        ));
    }
}
