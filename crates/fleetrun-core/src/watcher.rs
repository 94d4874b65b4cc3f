//! Readiness watcher: wraps `mio::Poll` for level-triggered, readable-only
//! interest across every registered descriptor.
//!
//! `wait` blocks with no deadline — the scheduler's only termination
//! condition is the roster running dry with nothing outstanding, so there is
//! no use for a wait timeout — and must tolerate waking with zero or many
//! events.

use std::os::fd::RawFd;

use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};

use crate::error::{EngineError, EngineResult};

/// A caller-chosen handle returned verbatim by `wait`. The watcher does not
/// interpret it; the scheduler encodes a stream context lookup key into it.
pub type Handle = Token;

const EVENTS_CAPACITY: usize = 64;

pub struct ReadinessWatcher {
    poll: Poll,
    events: Events,
}

impl ReadinessWatcher {
    pub fn new() -> EngineResult<Self> {
        let poll = Poll::new().map_err(EngineError::WatcherRegister)?;
        Ok(Self {
            poll,
            events: Events::with_capacity(EVENTS_CAPACITY),
        })
    }

    /// Register `fd` for readable-readiness under `handle`.
    ///
    /// `fd` must remain open and valid until `deregister` is called; the
    /// watcher borrows it for the duration via `SourceFd` and does not take
    /// ownership; the watcher only ever holds lookup handles.
    pub fn register(&mut self, fd: RawFd, handle: Handle) -> EngineResult<()> {
        self.poll
            .registry()
            .register(&mut SourceFd(&fd), handle, Interest::READABLE)
            .map_err(EngineError::WatcherRegister)
    }

    /// Remove `fd` from the watched set. Must be called before the fd is
    /// closed: removal from the watcher always precedes descriptor close.
    pub fn deregister(&mut self, fd: RawFd) -> EngineResult<()> {
        self.poll
            .registry()
            .deregister(&mut SourceFd(&fd))
            .map_err(EngineError::WatcherRegister)
    }

    /// Block until one or more registered descriptors are readable, then
    /// return their handles.
    pub fn wait(&mut self) -> EngineResult<Vec<Handle>> {
        self.poll
            .poll(&mut self.events, None)
            .map_err(EngineError::WatcherWait)?;
        Ok(self.events.iter().map(|e| e.token()).collect())
    }
}
