//! Join mode. Buffers each stream's bytes for later equivalence-class
//! aggregation (`crate::aggregate`); emits nothing while reading.
//!
//! One rule governs the capacity cap: append bytes until the buffer fills,
//! then silently discard the rest, terminating with a NUL at capacity on
//! EOF.

use std::io::{self, Write};

use super::{StreamFormatter, StreamMeta};

pub struct JoinFormatter {
    max_output_length: usize,
}

impl JoinFormatter {
    pub fn new(max_output_length: usize) -> Self {
        Self { max_output_length }
    }
}

impl StreamFormatter for JoinFormatter {
    fn on_chunk(
        &mut self,
        _meta: StreamMeta,
        buffer: &mut Vec<u8>,
        chunk: &[u8],
        _out: &mut dyn Write,
    ) -> io::Result<()> {
        if buffer.len() >= self.max_output_length {
            return Ok(());
        }
        let room = self.max_output_length - buffer.len();
        let take = room.min(chunk.len());
        buffer.extend_from_slice(&chunk[..take]);
        Ok(())
    }

    fn on_eof(&mut self, _meta: StreamMeta, buffer: &mut Vec<u8>, _out: &mut dyn Write) -> io::Result<()> {
        if buffer.len() >= self.max_output_length {
            buffer.truncate(self.max_output_length);
            buffer.push(0);
        }
        Ok(())
    }
}
