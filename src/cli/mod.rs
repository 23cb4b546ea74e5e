// CLI module - Argument list and daemonization flag extraction

pub mod source;

use crate::error::{LaunchError, Result};
use std::ffi::{OsStr, OsString};

pub use source::{native, ArgumentSource, OsArgs, WideArgs};

/// A recognized launcher flag with its short and long alias
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag {
    pub long: &'static str,
    pub short: &'static str,
}

impl Flag {
    const fn new(long: &'static str, short: &'static str) -> Self {
        Self { long, short }
    }
}

pub const DAEMONIZE: Flag = Flag::new("--daemonize", "-d");
pub const PIDFILE: Flag = Flag::new("--pidfile", "-f");
pub const STDIN: Flag = Flag::new("--stdin", "-0");
pub const STDOUT: Flag = Flag::new("--stdout", "-1");
pub const STDERR: Flag = Flag::new("--stderr", "-2");

/// Ordered, owned invocation arguments (program name first)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentList {
    args: Vec<OsString>,
}

impl ArgumentList {
    pub fn new(args: Vec<OsString>) -> Self {
        Self { args }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OsStr> {
        self.args.get(index).map(OsString::as_os_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsString::as_os_str)
    }

    pub fn as_slice(&self) -> &[OsString] {
        &self.args
    }

    pub fn into_inner(self) -> Vec<OsString> {
        self.args
    }

    /// Remove `count` elements starting at `index`, keeping the order of the rest
    pub fn remove_at(&mut self, index: usize, count: usize) {
        let end = (index + count).min(self.args.len());
        if index < end {
            self.args.drain(index..end);
        }
    }

    fn position(&self, long: &str, short: &str) -> Option<usize> {
        self.args.iter().position(|arg| arg == long || arg == short)
    }

    /// Remove the first occurrence of either alias, returning whether one was found
    pub fn extract_flag(&mut self, long: &str, short: &str) -> bool {
        match self.position(long, short) {
            Some(index) => {
                self.remove_at(index, 1);
                true
            }
            None => false,
        }
    }

    /// Remove the first occurrence of either alias together with the value after it.
    ///
    /// A flag in last position is an error and leaves the list untouched.
    pub fn extract_flag_with_value(&mut self, long: &str, short: &str) -> Result<Option<OsString>> {
        let Some(index) = self.position(long, short) else {
            return Ok(None);
        };

        if index + 1 >= self.args.len() {
            let flag = self.args[index].to_string_lossy().into_owned();
            return Err(LaunchError::MissingArgumentValue { flag });
        }

        let value = self.args.remove(index + 1);
        self.args.remove(index);
        Ok(Some(value))
    }
}

impl<S: Into<OsString>> FromIterator<S> for ArgumentList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<OsString>, const N: usize> From<[S; N]> for ArgumentList {
    fn from(args: [S; N]) -> Self {
        args.into_iter().collect()
    }
}

impl IntoIterator for ArgumentList {
    type Item = OsString;
    type IntoIter = std::vec::IntoIter<OsString>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.into_iter()
    }
}
