//! Reaper: wait for a terminated child once all of its streams are closed,
//! record exit status and elapsed time, and optionally print the one-line
//! exit summary.

use std::io::Write;

use crate::clock::Clock;
use crate::color::Colors;
use crate::error::{EngineError, EngineResult};
use crate::host::{ChildRecord, ExitInfo};

/// Reap `record`'s child process. Must only be called after
/// `record.all_streams_closed()`: a child is reaped exactly once, and only
/// after all of its streams have hit EOF.
///
/// `newline_pending` reports whether the last byte written to stdout was not
/// a newline, so the exit summary (like the reaper's group-mode counterpart)
/// can insert a separating newline before its own line. It's a snapshot, not
/// a handle: the caller's writer already updates its own pending-newline
/// state as a side effect of every write this function makes through `out`.
pub fn reap(
    host_name: &str,
    record: &mut ChildRecord,
    clock: &Clock,
    print_exit_summary: bool,
    colors: &Colors,
    newline_pending: bool,
    out: &mut dyn Write,
) -> EngineResult<()> {
    let mut process = record
        .process
        .take()
        .ok_or(EngineError::Invariant("reap called with no process handle"))?;

    let status = process.wait().map_err(|source| EngineError::Wait {
        host: host_name.to_string(),
        source,
    })?;

    // A signal-killed child has no exit code in the usual sense; report 1.
    let exit_code = status.code().unwrap_or(1);
    let finished_ms = clock.now_ms();

    record.exit = Some(ExitInfo {
        exit_code,
        started_ms: record.started_ms,
        finished_ms,
    });

    if print_exit_summary {
        if newline_pending {
            out.write_all(b"\n").map_err(EngineError::StdoutWrite)?;
        }
        let elapsed = finished_ms.saturating_sub(record.started_ms);
        let code_str = if exit_code == 0 {
            colors.green(&exit_code.to_string())
        } else {
            colors.red(&exit_code.to_string())
        };
        writeln!(
            out,
            "[{}] exited: {} ({} ms)",
            colors.cyan(host_name),
            code_str,
            colors.magenta(&elapsed.to_string())
        )
        .map_err(EngineError::StdoutWrite)?;
    }

    Ok(())
}
