//! The parallel execution engine: bounded-concurrency scheduling, readiness-
//! based I/O multiplexing, per-mode output formatting, and join-mode
//! equivalence-class aggregation over a roster of spawned child processes.
//!
//! This crate owns none of the surrounding CLI surface — argument parsing,
//! the roster file format, and transport-argument composition live in
//! `fleetrun-config`. It consumes a roster, a way to build each host's
//! argument vector, and a run configuration, and emits formatted bytes plus
//! (in join mode) a captured-output report.

pub mod aggregate;
pub mod clock;
pub mod color;
pub mod error;
pub mod format;
pub mod host;
pub mod pipe;
pub mod reader;
pub mod reaper;
pub mod scheduler;
pub mod spawn;
pub mod watcher;

pub use color::{ColorMode, Colors};
pub use error::{EngineError, EngineResult};
pub use format::Mode;
pub use host::Host;
pub use scheduler::{run, EngineConfig, RunReport};
