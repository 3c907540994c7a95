//! Child process launching with piped standard streams.
//!
//! [`AppRunner`] owns exactly one child process and the parent-side ends of its
//! stdin/stdout pipes. Writes block; reads are bounded by a caller-supplied
//! timeout (the blocking OS read runs on a background worker thread); joins are
//! bounded waits for process exit.
//!
//! # Concurrency Model
//!
//! Only `read` spawns concurrency: one native worker thread per in-flight read,
//! handing the stdout handle and buffer back over a channel when the blocking
//! read returns. A timed-out read does not cancel the worker; the next `read`
//! call picks up the same outstanding operation, so the pipe is never consumed
//! by two readers at once.

mod app;
mod platform;

pub use app::{AppRunner, ReadOutcome, WaitOutcome};
