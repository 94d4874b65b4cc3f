//! Configuration-time error taxonomy: bad options, conflicting modes,
//! invalid roster, anything discoverable before a single child is spawned.
//! Every variant maps to exit code 2 at the binary boundary.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for `-m`/`--max-jobs`: must be positive")]
    InvalidMaxJobs,

    #[error("`-j`/`--join` and `-s`/`--silent` are mutually exclusive")]
    JoinAndSilent,

    #[error("`-j`/`--join` and `-a`/`--anonymous` are mutually exclusive")]
    JoinAndAnonymous,

    #[error("invalid value for `--max-line-length`: must be positive")]
    InvalidMaxLineLength,

    #[error("invalid value for `--max-output-length`: must be positive")]
    InvalidMaxOutputLength,

    #[error("invalid value for `-c`/`--color`: '{0}'")]
    InvalidColor(String),

    #[error("failed to read roster file {path}: {source}")]
    RosterFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("hosts file line {line} too long (>= {limit} chars)")]
    HostNameTooLong { line: usize, limit: usize },

    #[error("empty roster: no hosts to run against")]
    EmptyRoster,

    #[error("no command specified")]
    MissingCommand,

    #[error("too many composed arguments: {count} exceeds the limit of {limit}")]
    TooManyArguments { count: usize, limit: usize },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
