//! Child spawner.
//!
//! Builds the pipe(s), wires the write end(s) onto the child's stdout/stderr,
//! and executes the composed argument vector. No waiting happens here; that
//! is the reaper's job once the scheduler observes every stream drained.

use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::process::{Command, Stdio};

use crate::error::{EngineError, EngineResult};
use crate::host::{ChildRecord, Descriptor};
use crate::pipe::create_pipe;

/// Duplicate an owned fd (used to feed the same pipe's write end to both
/// stdout and stderr in merged/join mode).
///
/// Uses `F_DUPFD_CLOEXEC` rather than plain `dup()`: `dup()` does not copy
/// `FD_CLOEXEC` onto the new descriptor, which would otherwise leak this
/// duplicate into the spawned transport process past its `exec`, undoing
/// the close-on-exec guarantee `pipe.rs` establishes atomically at creation.
fn dup_owned(fd: &OwnedFd) -> EngineResult<OwnedFd> {
    // SAFETY: `fd` is a valid, open descriptor for the lifetime of this call.
    let dup = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_DUPFD_CLOEXEC, 0) };
    if dup < 0 {
        return Err(EngineError::DescriptorFlags(std::io::Error::last_os_error()));
    }
    // SAFETY: fcntl succeeded, returning a freshly-owned descriptor.
    Ok(unsafe { OwnedFd::from_raw_fd(dup) })
}

/// Spawn a child executing `argv` (`argv[0]` is the program, the rest its
/// arguments — already fully composed: transport program, host name, then
/// the remote command).
///
/// `merged` selects a single shared stdout+stderr pipe (join mode) versus
/// one pipe per stream (line-by-line / group modes).
pub fn spawn_child(
    host_name: &str,
    argv: &[String],
    merged: bool,
    started_ms: u64,
) -> EngineResult<ChildRecord> {
    let Some((program, args)) = argv.split_first() else {
        return Err(EngineError::Invariant("empty composed argument vector"));
    };

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());

    let (stdout_read, stderr_read, merged_read) = if merged {
        let pair = create_pipe()?;
        let stdout_write = pair.write_end;
        let stderr_write = dup_owned(&stdout_write)?;
        cmd.stdout(Stdio::from(stdout_write));
        cmd.stderr(Stdio::from(stderr_write));
        (None, None, Some(pair.read_end))
    } else {
        let stdout_pair = create_pipe()?;
        let stderr_pair = create_pipe()?;
        cmd.stdout(Stdio::from(stdout_pair.write_end));
        cmd.stderr(Stdio::from(stderr_pair.write_end));
        (Some(stdout_pair.read_end), Some(stderr_pair.read_end), None)
    };

    let child = cmd.spawn().map_err(|source| EngineError::Spawn {
        host: host_name.to_string(),
        source,
    })?;

    let mut record = ChildRecord::new(child, started_ms);
    if let Some(fd) = stdout_read {
        record.stdout = Descriptor::Open(fd);
    }
    if let Some(fd) = stderr_read {
        record.stderr = Descriptor::Open(fd);
    }
    if let Some(fd) = merged_read {
        record.merged = Descriptor::Open(fd);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_split_streams_yields_two_open_descriptors() {
        let argv = vec!["/bin/echo".to_string(), "hi".to_string()];
        let record = spawn_child("h", &argv, false, 0).expect("spawn");
        assert!(record.stdout.is_open());
        assert!(record.stderr.is_open());
        assert!(!record.merged.is_open());
    }

    #[test]
    fn spawn_merged_yields_one_open_descriptor() {
        let argv = vec!["/bin/echo".to_string(), "hi".to_string()];
        let record = spawn_child("h", &argv, true, 0).expect("spawn");
        assert!(!record.stdout.is_open());
        assert!(!record.stderr.is_open());
        assert!(record.merged.is_open());
    }

    #[test]
    fn dup_owned_preserves_close_on_exec() {
        let pair = create_pipe().expect("pipe");
        let dup = dup_owned(&pair.write_end).expect("dup");
        let flags = unsafe { libc::fcntl(dup.as_raw_fd(), libc::F_GETFD) };
        assert!(flags & libc::FD_CLOEXEC != 0, "expected FD_CLOEXEC set on dup");
    }

    #[test]
    fn spawn_rejects_empty_argv() {
        let err = spawn_child("h", &[], false, 0).unwrap_err();
        assert!(matches!(err, EngineError::Invariant(_)));
    }
}
