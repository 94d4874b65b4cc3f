//! ANSI color palette and resolution of `-c on|off|auto`.
//!
//! Only the palette the core actually emits is kept: stdout/stderr stream
//! color, host-name cyan, exit-code green/red, progress magenta.

use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    On,
    Off,
    /// Resolved to On iff standard output is a terminal.
    Auto,
}

#[derive(Debug, Clone, Copy)]
pub struct Colors {
    enabled: bool,
}

impl Colors {
    pub fn resolve(mode: ColorMode) -> Self {
        let enabled = match mode {
            ColorMode::On => true,
            ColorMode::Off => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        };
        Self { enabled }
    }

    fn wrap(&self, code: &str, s: &str) -> String {
        if self.enabled {
            format!("{code}{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.wrap("\x1b[0;32m", s)
    }

    pub fn red(&self, s: &str) -> String {
        self.wrap("\x1b[0;31m", s)
    }

    pub fn cyan(&self, s: &str) -> String {
        self.wrap("\x1b[0;36m", s)
    }

    pub fn magenta(&self, s: &str) -> String {
        self.wrap("\x1b[0;35m", s)
    }

    /// The bare opening escape for `code`, with no matching reset — used by
    /// group mode, which frames an entire multi-write chunk in one color
    /// and emits the reset separately.
    pub fn open(&self, code: StreamColor) -> &'static str {
        if !self.enabled {
            return "";
        }
        match code {
            StreamColor::Stdout => "\x1b[0;32m",
            StreamColor::Stderr => "\x1b[0;31m",
        }
    }

    pub fn reset(&self) -> &'static str {
        if self.enabled { "\x1b[0m" } else { "" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamColor {
    Stdout,
    Stderr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_mode_never_wraps() {
        let colors = Colors::resolve(ColorMode::Off);
        assert_eq!(colors.green("x"), "x");
        assert_eq!(colors.open(StreamColor::Stdout), "");
        assert_eq!(colors.reset(), "");
    }

    #[test]
    fn on_mode_wraps_with_reset() {
        let colors = Colors::resolve(ColorMode::On);
        assert_eq!(colors.red("x"), "\x1b[0;31mx\x1b[0m");
    }
}
