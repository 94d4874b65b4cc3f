//! Data model: `Host`, `ChildRecord`, descriptor state, and `StreamContext`.
//!
//! `Descriptor` models a readable fd's lifecycle as a sum type
//! (`Uninitialised` / `Open` / `Closed`) so "closed" can't be mistaken for a
//! valid fd at the type level.

use std::os::fd::OwnedFd;

/// Which stream a descriptor carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
    /// Single merged stdout+stderr descriptor (join mode).
    Merged,
}

/// Lifecycle state of one of a child's readable descriptors.
#[derive(Debug, Default)]
pub enum Descriptor {
    #[default]
    Uninitialised,
    Open(OwnedFd),
    Closed,
}

impl Descriptor {
    pub fn is_open(&self) -> bool {
        matches!(self, Descriptor::Open(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Descriptor::Closed)
    }

    /// Take the fd out, leaving `Closed` behind. Used by the stream reader's
    /// EOF path: deregistering and closing must happen before the state
    /// transitions, so callers close the returned fd themselves.
    pub fn close(&mut self) -> Option<OwnedFd> {
        match std::mem::replace(self, Descriptor::Closed) {
            Descriptor::Open(fd) => Some(fd),
            other => {
                // Nothing to close; restore prior state (Uninitialised stays
                // Uninitialised rather than becoming spuriously Closed).
                *self = other;
                None
            }
        }
    }
}

/// Per-host exit accounting, recorded once by the reaper.
#[derive(Debug, Clone, Copy)]
pub struct ExitInfo {
    pub exit_code: i32,
    pub started_ms: u64,
    pub finished_ms: u64,
}

impl ExitInfo {
    pub fn elapsed_ms(&self) -> u64 {
        self.finished_ms.saturating_sub(self.started_ms)
    }
}

/// A spawned child's process record.
pub struct ChildRecord {
    /// `None` only in the brief window before `spawn` returns; `Some` for
    /// the rest of the record's life, until the reaper takes and waits on
    /// it exactly once.
    pub process: Option<std::process::Child>,
    pub stdout: Descriptor,
    pub stderr: Descriptor,
    /// Only populated in join mode; stdout/stderr stay `Uninitialised`.
    pub merged: Descriptor,
    pub started_ms: u64,
    pub exit: Option<ExitInfo>,
    /// Join mode only: captured output, filled as the stream context's
    /// buffer transfers ownership on EOF.
    pub captured: Option<Vec<u8>>,
}

impl ChildRecord {
    pub fn new(process: std::process::Child, started_ms: u64) -> Self {
        Self {
            process: Some(process),
            stdout: Descriptor::Uninitialised,
            stderr: Descriptor::Uninitialised,
            merged: Descriptor::Uninitialised,
            started_ms,
            exit: None,
            captured: None,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(|c| c.id())
    }

    /// All of this child's registered descriptors have reached `Closed`.
    pub fn all_streams_closed(&self) -> bool {
        let stdout_done = !self.stdout.is_open();
        let stderr_done = !self.stderr.is_open();
        let merged_done = !self.merged.is_open();
        stdout_done && stderr_done && merged_done
    }
}

/// A roster entry.
pub struct Host {
    /// Display name; truncated in place by the trim option on admission.
    pub name: String,
    pub child: Option<ChildRecord>,
    /// Position in the insertion-ordered roster; canonical iteration order.
    pub index: usize,
}

impl Host {
    pub fn new(name: String, index: usize) -> Self {
        Self {
            name,
            child: None,
            index,
        }
    }

    /// Truncate the display name at the first `.`, per `-t`/`--trim`.
    pub fn trim_domain(&mut self) {
        if let Some(dot) = self.name.find('.') {
            self.name.truncate(dot);
        }
    }
}

/// Per-descriptor state attached to readiness events.
///
/// The `host` reference is a non-owning lookup handle: the watcher's event
/// payload carries it, but the `Host`/`ChildRecord` own the descriptor and
/// any buffers. `host_index` indexes into the engine's roster `Vec<Host>`.
pub struct StreamContext {
    pub host_index: usize,
    pub kind: StreamKind,
    /// Line-assembly buffer (line-by-line mode) or capture buffer (join
    /// mode). Unused (empty, zero-capacity) in group mode.
    pub buffer: Vec<u8>,
}

impl StreamContext {
    pub fn new(host_index: usize, kind: StreamKind, buffer_capacity: usize) -> Self {
        Self {
            host_index,
            kind,
            buffer: Vec::with_capacity(buffer_capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_close_on_uninitialised_is_noop() {
        let mut d = Descriptor::Uninitialised;
        assert!(d.close().is_none());
        assert!(matches!(d, Descriptor::Uninitialised));
    }

    #[test]
    fn all_streams_closed_true_when_never_opened() {
        let process = std::process::Command::new("true")
            .spawn()
            .expect("spawn `true`");
        let mut cp = ChildRecord::new(process, 0);
        assert!(cp.all_streams_closed());
        // Reap so the test doesn't leave a zombie behind.
        let _ = cp.process.take().unwrap().wait();
    }

    #[test]
    fn trim_domain_truncates_at_first_dot() {
        let mut h = Host::new("web01.internal.example.com".to_string(), 0);
        h.trim_domain();
        assert_eq!(h.name, "web01");
    }

    #[test]
    fn trim_domain_noop_without_dot() {
        let mut h = Host::new("web01".to_string(), 0);
        h.trim_domain();
        assert_eq!(h.name, "web01");
    }
}
