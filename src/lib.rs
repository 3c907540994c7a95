//! # wincommon
//!
//! Foundation utilities for tools that launch and supervise helper processes on
//! Windows, with portable degradations for other platforms.
//!
//! Two independent utility groups:
//!
//! - [`runner`]: [`AppRunner`] starts a child process with its standard input and
//!   output redirected over anonymous pipes, and mediates blocking writes,
//!   timeout-bounded reads, and timeout-bounded joins.
//! - Path helpers: [`paths`] for pure path-string transforms and recursive
//!   directory creation, [`folders`] for known-folder resolution, and
//!   [`redirection`] for a scoped suppression of WOW64 filesystem redirection.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use wincommon::{AppRunner, ReadOutcome, WaitOutcome};
//!
//! # fn main() -> wincommon::Result<()> {
//! let mut child = AppRunner::spawn_no_console("helper", "--version")?;
//! match child.read(4096, Duration::from_secs(5))? {
//!     ReadOutcome::Data(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
//!     ReadOutcome::Eof => println!("helper produced no output"),
//!     ReadOutcome::TimedOut => println!("helper is still working"),
//! }
//! if let WaitOutcome::Exited(status) = child.join(Duration::from_secs(5))? {
//!     println!("helper exited with {status}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod folders;
pub mod logging;
pub mod paths;
pub mod redirection;
pub mod runner;

pub use error::{Error, FsError, Result, RunnerError};
pub use folders::KnownFolder;
pub use redirection::FsRedirectionGuard;
pub use runner::{AppRunner, ReadOutcome, WaitOutcome};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_send_sync<T: Send + Sync>() {}

    /// `AppRunner` must be movable across threads; it is deliberately not `Sync`
    /// (one outstanding read at a time, mediated through `&mut self`).
    #[test]
    fn runner_is_send() {
        assert_send::<AppRunner>();
        assert_send::<ReadOutcome>();
        assert_send::<WaitOutcome>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send_sync::<Error>();
        assert_send_sync::<RunnerError>();
        assert_send_sync::<FsError>();
    }
}
