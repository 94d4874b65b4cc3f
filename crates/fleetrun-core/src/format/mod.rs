//! Mode formatters: three strategies, one active per run.
//!
//! A closed sum type dispatches by tag rather than scattering a mode match
//! across the reader and reaper.

mod group;
mod join;
mod line;

pub use group::GroupFormatter;
pub use join::JoinFormatter;
pub use line::LineFormatter;

use std::io::{self, Write};

use crate::color::Colors;
use crate::host::StreamKind;

/// Per-call metadata the reader hands to a formatter; never owned by it.
#[derive(Clone, Copy)]
pub struct StreamMeta<'a> {
    pub host_name: &'a str,
    pub kind: StreamKind,
}

/// A mode's reaction to bytes arriving on one stream, and to that stream's
/// EOF. `buffer` is the owning `StreamContext`'s scratch buffer — a line-
/// assembly buffer for [`LineFormatter`], a capture buffer for
/// [`JoinFormatter`], unused (always empty) for [`GroupFormatter`].
pub trait StreamFormatter {
    fn on_chunk(
        &mut self,
        meta: StreamMeta,
        buffer: &mut Vec<u8>,
        chunk: &[u8],
        out: &mut dyn Write,
    ) -> io::Result<()>;

    /// Called once, when the stream hits EOF, before the descriptor is
    /// closed. For line-by-line this flushes a trailing partial line; for
    /// join this is a no-op (the scheduler moves `buffer` itself); for group
    /// there is nothing to do.
    fn on_eof(&mut self, meta: StreamMeta, buffer: &mut Vec<u8>, out: &mut dyn Write) -> io::Result<()>;
}

/// Which run mode is active. Selected once at startup.
pub enum Mode {
    LineByLine(LineFormatter),
    Group(GroupFormatter),
    Join(JoinFormatter),
}

impl Mode {
    pub fn is_join(&self) -> bool {
        matches!(self, Mode::Join(_))
    }

    /// Capacity to pre-allocate for a stream context's buffer in this mode.
    pub fn buffer_capacity(&self, max_line_length: usize, max_output_length: usize) -> usize {
        match self {
            Mode::LineByLine(_) => max_line_length + 2,
            Mode::Group(_) => 0,
            Mode::Join(_) => max_output_length + 1,
        }
    }

    pub fn on_chunk(
        &mut self,
        meta: StreamMeta,
        buffer: &mut Vec<u8>,
        chunk: &[u8],
        out: &mut dyn Write,
    ) -> io::Result<()> {
        match self {
            Mode::LineByLine(f) => f.on_chunk(meta, buffer, chunk, out),
            Mode::Group(f) => f.on_chunk(meta, buffer, chunk, out),
            Mode::Join(f) => f.on_chunk(meta, buffer, chunk, out),
        }
    }

    pub fn on_eof(&mut self, meta: StreamMeta, buffer: &mut Vec<u8>, out: &mut dyn Write) -> io::Result<()> {
        match self {
            Mode::LineByLine(f) => f.on_eof(meta, buffer, out),
            Mode::Group(f) => f.on_eof(meta, buffer, out),
            Mode::Join(f) => f.on_eof(meta, buffer, out),
        }
    }
}

/// Shared helper: print `[cyan hostname reset]` the way every mode's host
/// header does.
pub(crate) fn write_host_header(out: &mut dyn Write, colors: &Colors, host_name: &str) -> io::Result<()> {
    write!(out, "[{}]", colors.cyan(host_name))
}
