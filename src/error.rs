use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit status used for every launcher failure (-1 truncated to a byte)
pub const FAILURE_EXIT_CODE: i32 = 255;

/// Which file a failed open or redirect was meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPurpose {
    Pidfile,
    Stdin,
    Stdout,
    Stderr,
}

impl fmt::Display for StreamPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamPurpose::Pidfile => "pidfile",
            StreamPurpose::Stdin => "stdin",
            StreamPurpose::Stdout => "stdout",
            StreamPurpose::Stderr => "stderr",
        };
        f.write_str(name)
    }
}

/// Main error type for the launcher
#[derive(Debug, Error)]
pub enum LaunchError {
    // Argument errors
    #[error("No value given for {flag}")]
    MissingArgumentValue { flag: String },

    #[error("Could not convert argument {index} to UTF-8")]
    ConversionFailure { index: usize },

    // Preparation errors
    #[error("Could not open {purpose} file '{}': {source}", path.display())]
    FileOpenFailure {
        path: PathBuf,
        purpose: StreamPurpose,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not switch {purpose} descriptor: {source}")]
    DescriptorRedirectFailure {
        purpose: StreamPurpose,
        #[source]
        source: std::io::Error,
    },

    // Detach errors
    #[error("Could not fork the process to daemonize it: {0}")]
    ForkFailure(#[source] std::io::Error),

    #[error("Could not start a new session: {0}")]
    SessionDetachFailure(#[source] std::io::Error),

    #[error("Could not write pidfile '{}': {source}", path.display())]
    PidFileWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Unsupported(String),
}

impl LaunchError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        FAILURE_EXIT_CODE
    }
}

/// Result type alias for launcher operations
pub type Result<T> = std::result::Result<T, LaunchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_open_failure_names_path_and_purpose() {
        let err = LaunchError::FileOpenFailure {
            path: PathBuf::from("/missing/in.txt"),
            purpose: StreamPurpose::Stdin,
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let message = err.to_string();
        assert!(message.contains("stdin"));
        assert!(message.contains("/missing/in.txt"));
        assert_eq!(err.exit_code(), 255);
    }

    #[test]
    #[cfg(unix)]
    fn test_os_failures_keep_errno() {
        use std::error::Error as _;

        let err = LaunchError::ForkFailure(nix::Error::EAGAIN.into());
        let source = err
            .source()
            .and_then(|s| s.downcast_ref::<std::io::Error>())
            .unwrap();
        assert_eq!(source.raw_os_error(), Some(nix::libc::EAGAIN));
        assert!(err.to_string().starts_with("Could not fork"));
    }

    #[test]
    fn test_missing_value_message() {
        let err = LaunchError::MissingArgumentValue {
            flag: "--pidfile".to_string(),
        };
        assert_eq!(err.to_string(), "No value given for --pidfile");
    }
}
