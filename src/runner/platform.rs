//! Per-OS process creation configuration.

use std::process::Command;

use crate::error::RunnerError;

/// How the child process is attached to the console/desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LaunchMode {
    /// Independent process group with no console inherited from the parent.
    Detached,
    /// Console window suppressed.
    NoConsole,
}

impl LaunchMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Detached => "detached",
            Self::NoConsole => "no-console",
        }
    }
}

/// Append the verbatim argument string to the command line.
///
/// Windows children receive the string exactly as written; their runtimes
/// re-parse the raw command line, so quoting must be preserved. Other
/// platforms have no single-string command line; the string is split
/// shell-style into discrete arguments instead.
#[cfg(windows)]
pub(crate) fn append_args(command: &mut Command, args: &str) -> Result<(), RunnerError> {
    use std::os::windows::process::CommandExt;

    if !args.is_empty() {
        command.raw_arg(args);
    }
    Ok(())
}

#[cfg(unix)]
pub(crate) fn append_args(command: &mut Command, args: &str) -> Result<(), RunnerError> {
    let words = shell_words::split(args).map_err(|e| RunnerError::MalformedArguments {
        reason: e.to_string(),
    })?;
    command.args(words);
    Ok(())
}

#[cfg(not(any(unix, windows)))]
pub(crate) fn append_args(command: &mut Command, args: &str) -> Result<(), RunnerError> {
    command.args(args.split_whitespace());
    Ok(())
}

/// Apply the creation mode to the command.
#[cfg(windows)]
pub(crate) fn configure(command: &mut Command, mode: LaunchMode) {
    use std::os::windows::process::CommandExt;
    use windows::Win32::System::Threading::{
        CREATE_NEW_PROCESS_GROUP, CREATE_NO_WINDOW, DETACHED_PROCESS,
    };

    let flags = match mode {
        LaunchMode::Detached => CREATE_NEW_PROCESS_GROUP.0 | DETACHED_PROCESS.0,
        LaunchMode::NoConsole => CREATE_NO_WINDOW.0,
    };
    command.creation_flags(flags);
}

#[cfg(unix)]
pub(crate) fn configure(command: &mut Command, mode: LaunchMode) {
    use std::os::unix::process::CommandExt;

    if mode == LaunchMode::Detached {
        // Closest analogue of a detached console process: a fresh process
        // group independent of the parent's job control.
        command.process_group(0);
    }
}

#[cfg(not(any(unix, windows)))]
pub(crate) fn configure(_command: &mut Command, _mode: LaunchMode) {}
