//! End-to-end behavior of `AppRunner` against real child processes.
//!
//! Scripts run through the platform's command interpreter: `cmd /C` on
//! Windows, `sh -c` elsewhere.

use std::time::{Duration, Instant};

use wincommon::{AppRunner, ReadOutcome, RunnerError, WaitOutcome};

const READ_BUDGET: usize = 4096;

#[cfg(windows)]
fn spawn_script(script: &str) -> AppRunner {
    AppRunner::spawn_no_console("cmd", &format!("/C \"{script}\"")).expect("spawn cmd")
}

#[cfg(not(windows))]
fn spawn_script(script: &str) -> AppRunner {
    AppRunner::spawn_no_console("sh", &format!("-c '{script}'")).expect("spawn sh")
}

#[cfg(windows)]
fn spawn_script_detached(script: &str) -> AppRunner {
    AppRunner::spawn_detached("cmd", &format!("/C \"{script}\"")).expect("spawn cmd detached")
}

#[cfg(not(windows))]
fn spawn_script_detached(script: &str) -> AppRunner {
    AppRunner::spawn_detached("sh", &format!("-c '{script}'")).expect("spawn sh detached")
}

/// Read until end of stream, failing the test on an unexpected timeout.
fn drain(runner: &mut AppRunner) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        match runner
            .read(READ_BUDGET, Duration::from_secs(10))
            .expect("read from child")
        {
            ReadOutcome::Data(chunk) => out.extend_from_slice(&chunk),
            ReadOutcome::Eof => return out,
            ReadOutcome::TimedOut => panic!("child produced no output within 10s"),
        }
    }
}

fn exit_code(runner: &mut AppRunner, timeout: Duration) -> Option<i32> {
    match runner.join(timeout).expect("join child") {
        WaitOutcome::Exited(status) => status.code(),
        WaitOutcome::TimedOut => panic!("child did not exit within {timeout:?}"),
    }
}

#[test]
fn known_output_and_exit_code_round_trip() {
    #[cfg(windows)]
    let script = "echo hello& exit 7";
    #[cfg(not(windows))]
    let script = "printf hello; exit 7";

    let mut child = spawn_script(script);
    let output = drain(&mut child);
    assert!(
        output.starts_with(b"hello"),
        "unexpected output: {:?}",
        String::from_utf8_lossy(&output)
    );
    assert_eq!(exit_code(&mut child, Duration::from_secs(10)), Some(7));
}

#[test]
fn detached_child_round_trips_output() {
    #[cfg(windows)]
    let script = "echo hello& exit 0";
    #[cfg(not(windows))]
    let script = "printf hello; exit 0";

    let mut child = spawn_script_detached(script);
    let output = drain(&mut child);
    assert!(output.starts_with(b"hello"));
    assert_eq!(exit_code(&mut child, Duration::from_secs(10)), Some(0));
}

#[test]
fn short_timeout_read_returns_not_complete_without_blocking() {
    #[cfg(windows)]
    let script = "ping -n 2 127.0.0.1 >nul & echo late";
    #[cfg(not(windows))]
    let script = "sleep 1; echo late";

    let mut child = spawn_script(script);

    let started = Instant::now();
    let first = child
        .read(READ_BUDGET, Duration::from_millis(50))
        .expect("read with short timeout");
    assert_eq!(first, ReadOutcome::TimedOut);
    assert!(
        started.elapsed() < Duration::from_millis(900),
        "short-timeout read blocked for {:?}",
        started.elapsed()
    );

    // The outstanding worker finishes the same read; a later call collects it.
    let output = drain(&mut child);
    assert!(
        output.starts_with(b"late"),
        "late output lost after timed-out read: {:?}",
        String::from_utf8_lossy(&output)
    );
    exit_code(&mut child, Duration::from_secs(10));
}

#[test]
fn write_feeds_child_stdin() {
    #[cfg(windows)]
    let script = "more";
    #[cfg(not(windows))]
    let script = "cat";

    let mut child = spawn_script(script);
    child.write(b"ping\n").expect("write to child stdin");
    child.close_stdin();

    let output = drain(&mut child);
    assert!(
        output.windows(4).any(|w| w == b"ping"),
        "child did not echo stdin: {:?}",
        String::from_utf8_lossy(&output)
    );
    exit_code(&mut child, Duration::from_secs(10));
}

#[test]
fn write_to_exited_child_reports_broken_pipe() {
    let mut child = spawn_script("exit 0");
    assert_eq!(exit_code(&mut child, Duration::from_secs(10)), Some(0));

    let err = child.write(b"too late\n").unwrap_err();
    assert!(
        matches!(err, RunnerError::StdinWrite(_)),
        "expected a broken-pipe write failure, got: {err:?}"
    );
}

#[test]
fn join_timeout_leaves_child_running() {
    #[cfg(windows)]
    let script = "ping -n 6 127.0.0.1 >nul";
    #[cfg(not(windows))]
    let script = "sleep 5";

    let mut child = spawn_script(script);

    let outcome = child
        .join(Duration::from_millis(100))
        .expect("join with short timeout");
    assert_eq!(outcome, WaitOutcome::TimedOut);

    // Timeout must not have terminated the child; explicit kill reaps it.
    child.kill().expect("kill child");
    match child.join(Duration::from_secs(10)).expect("join after kill") {
        WaitOutcome::Exited(status) => assert!(!status.success()),
        WaitOutcome::TimedOut => panic!("child survived kill"),
    }
}

#[test]
fn zero_budget_read_is_distinct_from_eof() {
    #[cfg(windows)]
    let script = "echo hello";
    #[cfg(not(windows))]
    let script = "printf hello";

    let mut child = spawn_script(script);
    let empty = child
        .read(0, Duration::from_secs(1))
        .expect("zero-budget read");
    assert_eq!(empty, ReadOutcome::Data(Vec::new()));

    let output = drain(&mut child);
    assert!(output.starts_with(b"hello"));
    exit_code(&mut child, Duration::from_secs(10));
}

#[test]
fn reads_after_eof_keep_reporting_eof() {
    #[cfg(windows)]
    let script = "echo done";
    #[cfg(not(windows))]
    let script = "printf done";

    let mut child = spawn_script(script);
    drain(&mut child);
    let again = child
        .read(READ_BUDGET, Duration::from_millis(100))
        .expect("read after eof");
    assert_eq!(again, ReadOutcome::Eof);
    exit_code(&mut child, Duration::from_secs(10));
}
