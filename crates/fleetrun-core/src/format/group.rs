//! Group mode. No per-stream buffering; a chunk is written straight to
//! stdout, framed by the stream's color, as soon as it arrives.

use std::io::{self, Write};

use super::{write_host_header, StreamFormatter, StreamMeta};
use crate::color::{Colors, StreamColor};
use crate::host::StreamKind;

pub struct GroupFormatter {
    anonymous: bool,
    colors: Colors,
    /// The host whose chunk was most recently written; process-wide across
    /// all stream contexts; this is process-wide state, not per-context.
    /// `None` before the first chunk of the run.
    last_emitter: Option<String>,
    /// Whether the last byte written to stdout was a newline, tracked
    /// across chunks and across hosts.
    last_byte_was_newline: bool,
}

impl GroupFormatter {
    pub fn new(anonymous: bool, colors: Colors) -> Self {
        Self {
            anonymous,
            colors,
            last_emitter: None,
            // Treated as true initially so the very first header doesn't
            // get a spurious leading blank line.
            last_byte_was_newline: true,
        }
    }
}

impl StreamFormatter for GroupFormatter {
    fn on_chunk(
        &mut self,
        meta: StreamMeta,
        _buffer: &mut Vec<u8>,
        chunk: &[u8],
        out: &mut dyn Write,
    ) -> io::Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }

        if self.last_emitter.as_deref() != Some(meta.host_name) {
            if !self.last_byte_was_newline {
                out.write_all(b"\n")?;
            }
            if !self.anonymous {
                write_host_header(out, &self.colors, meta.host_name)?;
                out.write_all(b"\n")?;
            }
        }

        let color = match meta.kind {
            StreamKind::Stdout => self.colors.open(StreamColor::Stdout),
            StreamKind::Stderr => self.colors.open(StreamColor::Stderr),
            StreamKind::Merged => unreachable!("group mode never uses a merged stream"),
        };
        out.write_all(color.as_bytes())?;
        out.write_all(chunk)?;
        out.write_all(self.colors.reset().as_bytes())?;

        self.last_byte_was_newline = chunk.last() == Some(&b'\n');
        self.last_emitter = Some(meta.host_name.to_string());
        Ok(())
    }

    fn on_eof(&mut self, _meta: StreamMeta, _buffer: &mut Vec<u8>, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}
