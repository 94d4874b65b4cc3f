//! Engine-level error taxonomy.
//!
//! Engine errors (resource acquisition, syscalls, integrity checks) are a
//! distinct tier from configuration errors. Configuration errors live in
//! `fleetrun-config`; this enum covers only failures that can occur once the
//! engine is already running, and every variant maps to exit code 3 at the
//! binary boundary.

use std::io;

/// A fatal failure of the execution engine.
///
/// Fail fast, print to stderr, exit 3. No partial recovery is attempted
/// anywhere in `fleetrun-core`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to create pipe: {0}")]
    PipeCreate(#[source] io::Error),

    #[error("failed to set descriptor flags: {0}")]
    DescriptorFlags(#[source] io::Error),

    #[error("failed to spawn child for host {host}: {source}")]
    Spawn {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("readiness watcher registration failed: {0}")]
    WatcherRegister(#[source] io::Error),

    #[error("readiness watcher wait failed: {0}")]
    WatcherWait(#[source] io::Error),

    #[error("read failed on host {host}: {source}")]
    Read {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("waitpid failed for host {host}: {source}")]
    Wait {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("write to stdout failed: {0}")]
    StdoutWrite(#[source] io::Error),

    #[error("internal invariant violated: {0}")]
    Invariant(&'static str),
}

pub type EngineResult<T> = Result<T, EngineError>;
