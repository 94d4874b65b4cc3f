//! The CLI surface: argument parsing, the roster file format, transport
//! argument composition, and configuration validation. Produces a
//! [`ResolvedConfig`] that `fleetrun-core` can run directly.

pub mod argv;
pub mod cli;
pub mod error;
pub mod resolve;
pub mod roster;

pub use cli::Cli;
pub use error::{ConfigError, ConfigResult};
pub use resolve::{resolve, ResolvedConfig};
