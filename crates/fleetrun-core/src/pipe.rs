//! Pipe factory.
//!
//! Creates a pipe pair with both ends non-blocking and close-on-exec before
//! returning. Built directly on `libc::pipe2`, which sets both flags
//! atomically at creation time, avoiding the TOCTOU window a separate
//! `pipe()` + `fcntl(F_SETFL)` + `fcntl(F_SETFD)` sequence would leave open
//! across a `fork()`.

use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use crate::error::{EngineError, EngineResult};

/// A pipe's two ends. The read end is non-blocking; the write end is
/// close-on-exec but left blocking, since it is handed to the child as its
/// own stdout/stderr (see `create_pipe`).
pub struct PipePair {
    pub read_end: OwnedFd,
    pub write_end: OwnedFd,
}

/// Create a close-on-exec pipe pair whose read end is non-blocking.
///
/// `pipe2(O_NONBLOCK | O_CLOEXEC)` sets both flags atomically on both ends,
/// avoiding the TOCTOU window a separate `pipe()` + `fcntl(F_SETFL)` +
/// `fcntl(F_SETFD)` sequence would leave open across a `fork()`. But
/// `O_NONBLOCK` is a file-status flag on the shared open file description,
/// not a per-descriptor one, so the spawned child would otherwise inherit a
/// non-blocking stdout/stderr and see spurious `EAGAIN` on its own writes.
/// Clear it on the write end only, immediately after creation and still
/// before any child exists to observe the non-blocking window.
pub fn create_pipe() -> EngineResult<PipePair> {
    let mut fds: [libc::c_int; 2] = [-1, -1];
    // SAFETY: `fds` is a valid 2-element buffer for `pipe2` to fill in.
    let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_NONBLOCK | libc::O_CLOEXEC) };
    if rc != 0 {
        return Err(EngineError::PipeCreate(std::io::Error::last_os_error()));
    }
    // SAFETY: pipe2 succeeded, so both fds are freshly-owned, open descriptors.
    let read_end = unsafe { OwnedFd::from_raw_fd(fds[0]) };
    let write_end = unsafe { OwnedFd::from_raw_fd(fds[1]) };
    clear_nonblock(&write_end)?;
    Ok(PipePair {
        read_end,
        write_end,
    })
}

fn clear_nonblock(fd: &OwnedFd) -> EngineResult<()> {
    // SAFETY: `fd` is a valid, open descriptor for the lifetime of this call.
    let flags = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) };
    if flags < 0 {
        return Err(EngineError::DescriptorFlags(std::io::Error::last_os_error()));
    }
    // SAFETY: `fd` is a valid, open descriptor; `flags` was just read from it.
    let rc = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags & !libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(EngineError::DescriptorFlags(std::io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::fd::AsRawFd;

    #[test]
    fn create_pipe_sets_cloexec_on_both_ends() {
        let pair = create_pipe().expect("pipe2 should succeed");
        for fd in [pair.read_end.as_raw_fd(), pair.write_end.as_raw_fd()] {
            let fdflags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
            assert!(fdflags & libc::FD_CLOEXEC != 0, "expected FD_CLOEXEC set");
        }
    }

    #[test]
    fn create_pipe_read_end_nonblock_write_end_blocking() {
        let pair = create_pipe().expect("pipe2 should succeed");
        let read_flags = unsafe { libc::fcntl(pair.read_end.as_raw_fd(), libc::F_GETFL) };
        assert!(read_flags & libc::O_NONBLOCK != 0, "expected read end non-blocking");
        let write_flags = unsafe { libc::fcntl(pair.write_end.as_raw_fd(), libc::F_GETFL) };
        assert!(
            write_flags & libc::O_NONBLOCK == 0,
            "expected write end blocking so the child's own writes don't see spurious EAGAIN"
        );
    }
}
