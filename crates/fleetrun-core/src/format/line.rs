//! Line-by-line mode. The default.

use std::io::{self, Write};

use super::{write_host_header, StreamFormatter, StreamMeta};
use crate::color::{Colors, StreamColor};
use crate::host::StreamKind;

pub struct LineFormatter {
    anonymous: bool,
    colors: Colors,
    max_line_length: usize,
}

impl LineFormatter {
    pub fn new(anonymous: bool, colors: Colors, max_line_length: usize) -> Self {
        Self {
            anonymous,
            colors,
            max_line_length,
        }
    }

    fn stream_color(&self, kind: StreamKind) -> &'static str {
        match kind {
            StreamKind::Stdout => self.colors.open(StreamColor::Stdout),
            StreamKind::Stderr => self.colors.open(StreamColor::Stderr),
            StreamKind::Merged => unreachable!("line-by-line mode never uses a merged stream"),
        }
    }

    /// Emit one line (the buffer's current contents, expected to already
    /// include a trailing newline) with host header and stream color.
    fn emit(&self, meta: StreamMeta, line: &[u8], out: &mut dyn Write) -> io::Result<()> {
        if !self.anonymous {
            write_host_header(out, &self.colors, meta.host_name)?;
            out.write_all(b" ")?;
        }
        out.write_all(self.stream_color(meta.kind).as_bytes())?;
        out.write_all(line)?;
        out.write_all(self.colors.reset().as_bytes())?;
        Ok(())
    }
}

impl StreamFormatter for LineFormatter {
    fn on_chunk(
        &mut self,
        meta: StreamMeta,
        buffer: &mut Vec<u8>,
        chunk: &[u8],
        out: &mut dyn Write,
    ) -> io::Result<()> {
        for &byte in chunk {
            if buffer.len() == self.max_line_length {
                // Over-long line: force a boundary by injecting a newline
                // and emitting what's buffered so far, then keep going. The
                // current byte starts the next line rather than being
                // dropped.
                buffer.push(b'\n');
                self.emit(meta, buffer, out)?;
                buffer.clear();
            }

            buffer.push(byte);

            if byte == b'\n' {
                self.emit(meta, buffer, out)?;
                buffer.clear();
            }
        }
        Ok(())
    }

    fn on_eof(&mut self, meta: StreamMeta, buffer: &mut Vec<u8>, out: &mut dyn Write) -> io::Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        if buffer.last() != Some(&b'\n') {
            buffer.push(b'\n');
        }
        self.emit(meta, buffer, out)?;
        buffer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorMode;

    fn meta(kind: StreamKind) -> StreamMeta<'static> {
        StreamMeta {
            host_name: "h",
            kind,
        }
    }

    #[test]
    fn short_line_emitted_on_newline() {
        let mut f = LineFormatter::new(false, Colors::resolve(ColorMode::Off), 1024);
        let mut buf = Vec::new();
        let mut out = Vec::new();
        f.on_chunk(meta(StreamKind::Stdout), &mut buf, b"hello\n", &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[h] hello\n");
        assert!(buf.is_empty());
    }

    #[test]
    fn over_long_line_is_split_once() {
        // max_line_length=4, "abcdef\n" -> "[h] abcd\n" then "[h] ef\n"
        let mut f = LineFormatter::new(false, Colors::resolve(ColorMode::Off), 4);
        let mut buf = Vec::new();
        let mut out = Vec::new();
        f.on_chunk(meta(StreamKind::Stdout), &mut buf, b"abcdef\n", &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[h] abcd\n[h] ef\n");
    }

    #[test]
    fn eof_with_no_trailing_newline_appends_one() {
        let mut f = LineFormatter::new(false, Colors::resolve(ColorMode::Off), 1024);
        let mut buf = b"partial".to_vec();
        let mut out = Vec::new();
        f.on_eof(meta(StreamKind::Stdout), &mut buf, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[h] partial\n");
    }

    #[test]
    fn eof_with_empty_buffer_emits_nothing() {
        let mut f = LineFormatter::new(false, Colors::resolve(ColorMode::Off), 1024);
        let mut buf = Vec::new();
        let mut out = Vec::new();
        f.on_eof(meta(StreamKind::Stdout), &mut buf, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn anonymous_suppresses_host_header() {
        let mut f = LineFormatter::new(true, Colors::resolve(ColorMode::Off), 1024);
        let mut buf = Vec::new();
        let mut out = Vec::new();
        f.on_chunk(meta(StreamKind::Stderr), &mut buf, b"oops\n", &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "oops\n");
    }
}
