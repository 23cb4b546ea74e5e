// Platform argument sources, normalized into an ArgumentList

use super::ArgumentList;
use crate::error::{LaunchError, Result};
use std::ffi::OsString;

/// Something that can produce the process's invocation arguments
pub trait ArgumentSource {
    fn arguments(self) -> Result<ArgumentList>;
}

/// Byte-string arguments taken verbatim (Unix)
pub struct OsArgs<I> {
    args: I,
}

impl<I: IntoIterator<Item = OsString>> OsArgs<I> {
    pub fn new(args: I) -> Self {
        Self { args }
    }
}

impl<I: IntoIterator<Item = OsString>> ArgumentSource for OsArgs<I> {
    fn arguments(self) -> Result<ArgumentList> {
        Ok(self.args.into_iter().collect())
    }
}

/// Wide-character arguments that must convert cleanly to UTF-8 (Windows)
pub struct WideArgs<I> {
    args: I,
}

impl<I: IntoIterator<Item = OsString>> WideArgs<I> {
    pub fn new(args: I) -> Self {
        Self { args }
    }
}

impl<I: IntoIterator<Item = OsString>> ArgumentSource for WideArgs<I> {
    fn arguments(self) -> Result<ArgumentList> {
        self.args
            .into_iter()
            .enumerate()
            .map(|(index, arg)| {
                arg.into_string()
                    .map(OsString::from)
                    .map_err(|_| LaunchError::ConversionFailure { index })
            })
            .collect::<Result<Vec<_>>>()
            .map(ArgumentList::new)
    }
}

/// Arguments of the current process, read the way this platform requires
#[cfg(not(windows))]
pub fn native() -> Result<ArgumentList> {
    OsArgs::new(std::env::args_os()).arguments()
}

#[cfg(windows)]
pub fn native() -> Result<ArgumentList> {
    WideArgs::new(std::env::args_os()).arguments()
}
