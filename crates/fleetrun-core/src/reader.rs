//! Stream reader: drains one ready descriptor until it would block or
//! signals EOF, dispatching bytes to the active mode formatter.

use std::io::{self, Write};
use std::os::fd::RawFd;

use crate::error::{EngineError, EngineResult};
use crate::format::{Mode, StreamMeta};

/// The platform's natural I/O chunk size.
const READ_CHUNK_SIZE: usize = 8192;

#[derive(Debug, PartialEq, Eq)]
pub enum ReadStatus {
    /// Would block; caller should wait for the next readiness event.
    WouldBlock,
    /// EOF observed; the descriptor should be deregistered and closed.
    Closed,
}

/// Read from `fd` until it would block or hits EOF, dispatching each
/// nonempty chunk to `mode`. In silent mode bytes are consumed but never
/// handed to the formatter, and the line/capture buffer is left untouched.
pub fn drain_ready_stream(
    fd: RawFd,
    meta: StreamMeta,
    buffer: &mut Vec<u8>,
    silent: bool,
    mode: &mut Mode,
    out: &mut dyn Write,
) -> EngineResult<ReadStatus> {
    let mut scratch = [0u8; READ_CHUNK_SIZE];
    loop {
        // SAFETY: `scratch` is a valid buffer of `READ_CHUNK_SIZE` bytes and
        // `fd` is a descriptor the caller guarantees is open and readable.
        let n = unsafe {
            libc::read(
                fd,
                scratch.as_mut_ptr() as *mut libc::c_void,
                scratch.len(),
            )
        };

        if n > 0 {
            if !silent {
                mode.on_chunk(meta, buffer, &scratch[..n as usize], out)
                    .map_err(EngineError::StdoutWrite)?;
            }
            continue;
        }

        if n == 0 {
            if !silent {
                mode.on_eof(meta, buffer, out).map_err(EngineError::StdoutWrite)?;
            }
            return Ok(ReadStatus::Closed);
        }

        let source = io::Error::last_os_error();
        if source.kind() == io::ErrorKind::WouldBlock {
            return Ok(ReadStatus::WouldBlock);
        }
        return Err(EngineError::Read {
            host: meta.host_name.to_string(),
            source,
        });
    }
}
