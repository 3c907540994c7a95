use std::io;
use thiserror::Error;

use crate::folders::KnownFolder;

/// Library-level error type.
///
/// Operations return their concern-specific error (`RunnerError`, `FsError`);
/// this umbrella exists so callers composing both groups can use a single
/// [`Result`] alias with `?`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Process runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("Filesystem error: {0}")]
    Fs(#[from] FsError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized Result type for wincommon operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from launching or communicating with a child process.
///
/// Hard failures carry the originating `io::Error` as a source so the native
/// OS error code stays available via `raw_os_error()`. Timeouts are not
/// errors; see [`ReadOutcome`](crate::runner::ReadOutcome) and
/// [`WaitOutcome`](crate::runner::WaitOutcome).
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Process or pipe creation failed.
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The argument string could not be split into arguments.
    ///
    /// Only reachable on platforms where the verbatim command-line contract
    /// degrades to shell-style splitting.
    #[error("Malformed argument string: {reason}")]
    MalformedArguments { reason: String },

    /// Writing to the child's stdin failed; usually a broken pipe after the
    /// child exited or closed its end.
    #[error("Write to child stdin failed: {0}")]
    StdinWrite(#[source] io::Error),

    /// The child's stdin handle was already closed via `close_stdin`.
    #[error("Child stdin is closed")]
    StdinClosed,

    /// The blocking read on the child's stdout failed.
    #[error("Read from child stdout failed: {0}")]
    StdoutRead(#[source] io::Error),

    /// The background read worker could not be started.
    #[error("Failed to spawn read worker thread: {0}")]
    WorkerSpawn(#[source] io::Error),

    /// The background read worker died without reporting a result.
    #[error("Read worker thread terminated unexpectedly")]
    WorkerLost,

    /// Polling the child's exit status failed.
    #[error("Failed to wait for child process: {0}")]
    Wait(#[source] io::Error),

    /// Terminating the child failed.
    #[error("Failed to kill child process {pid}: {source}")]
    Kill {
        pid: u32,
        #[source]
        source: io::Error,
    },
}

/// Errors from the path and folder helpers.
#[derive(Error, Debug)]
pub enum FsError {
    /// Creating the final directory level failed for a reason other than
    /// "already exists".
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: io::Error,
    },

    /// `make_path` requires both a directory and a file name.
    #[error("Invalid (missing) directory name or file name")]
    EmptyPathComponent,

    /// The OS did not resolve the known folder.
    #[error("Failed to resolve known folder {folder:?}: {reason}")]
    KnownFolder { folder: KnownFolder, reason: String },

    /// The known folder has no equivalent on this platform.
    #[error("Known folder {folder:?} is not available on this platform")]
    KnownFolderUnsupported { folder: KnownFolder },

    /// Toggling filesystem path redirection failed.
    #[error("Failed to {action} file system redirection: {reason}")]
    Redirection { action: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_source_preserves_os_error_code() {
        let os_err = io::Error::from_raw_os_error(5);
        let err = RunnerError::StdinWrite(os_err);
        match err {
            RunnerError::StdinWrite(source) => assert_eq!(source.raw_os_error(), Some(5)),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn umbrella_converts_with_question_mark() {
        fn fails() -> Result<()> {
            Err(FsError::EmptyPathComponent)?
        }
        assert!(matches!(fails(), Err(Error::Fs(FsError::EmptyPathComponent))));
    }

    #[test]
    fn display_names_the_program() {
        let err = RunnerError::Launch {
            program: "helper.exe".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("helper.exe"));
        assert!(msg.contains("no such file"));
    }
}
