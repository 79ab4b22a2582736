//! Encoder process execution with progress streaming and cancellation.
//!
//! The encoder writes diagnostics to stderr. A reader thread forwards
//! every line to the log sink and feeds the progress parser; parsed
//! events flow over a channel back to the waiting thread, which invokes
//! the caller's callback between exit polls. Cancellation is checked on
//! the same cadence and terminates the child directly.

use crate::cancel::CancellationToken;
use crate::compiler::CompiledCommand;
use crate::error::{CoreError, CoreResult};
use crate::progress::{ProgressEvent, ProgressParser};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Terminal state of one encoder run. There is no way back from a
/// terminal state; a new run is a new invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Clean exit and the expected output file exists.
    Succeeded,
    /// Non-zero exit, or a clean exit without the expected output file.
    Failed { exit_code: Option<i32> },
    /// Terminated after a cancellation request. Distinct from failure so
    /// the orchestrator can clean up partial output without treating it
    /// as a corrupt successful file.
    Cancelled,
}

/// Runs one compiled command against the encoder to a terminal state.
///
/// Failure to start the process is an error (precondition class);
/// everything after a successful spawn resolves to a `RunStatus`.
pub fn run_encode(
    encoder: &Path,
    command: &CompiledCommand,
    parser: ProgressParser,
    poll_interval: Duration,
    on_progress: &mut dyn FnMut(ProgressEvent),
    cancel: &CancellationToken,
) -> CoreResult<RunStatus> {
    log::debug!(
        "Spawning encoder: {} {}",
        encoder.display(),
        command.args.join(" ")
    );

    let mut child = Command::new(encoder)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| {
            CoreError::CommandStart(format!("failed to start {}: {err}", encoder.display()))
        })?;

    let stderr = child.stderr.take().ok_or_else(|| {
        CoreError::CommandStart("encoder stderr was not captured".to_string())
    })?;

    let (tx, rx) = mpsc::channel();
    let reader = thread::spawn(move || {
        let mut parser = parser;
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            // Every diagnostic line reaches the log sink, matched or not.
            log::debug!(target: "clipforge::encoder", "{line}");
            if let Some(event) = parser.parse_line(&line) {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
    });

    let status = loop {
        while let Ok(event) = rx.try_recv() {
            on_progress(event);
        }

        if cancel.is_cancelled() {
            log::info!("Cancellation requested, terminating encoder");
            if let Err(err) = child.kill() {
                log::warn!("Failed to kill encoder process: {err}");
            }
            let _ = child.wait();
            let _ = reader.join();
            return Ok(RunStatus::Cancelled);
        }

        match child.try_wait()? {
            Some(status) => break status,
            None => thread::sleep(poll_interval),
        }
    };

    // Pick up anything parsed between the last poll and process exit.
    let _ = reader.join();
    while let Ok(event) = rx.try_recv() {
        on_progress(event);
    }

    if status.success() && command.output_path.is_file() {
        Ok(RunStatus::Succeeded)
    } else {
        if status.success() {
            log::error!(
                "Encoder exited cleanly but produced no output at {}",
                command.output_path.display()
            );
        } else {
            log::error!("Encoder exited with status {status}");
        }
        Ok(RunStatus::Failed {
            exit_code: status.code(),
        })
    }
}
