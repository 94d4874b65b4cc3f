//! Roster file parsing: one hostname per line, comments and indentation
//! ignored, read from a named file, `-`, or standard input.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};

use crate::error::{ConfigError, ConfigResult};

/// Read a roster from `path` (`None` or `Some("-")` means standard input),
/// enforcing the host-name length bound and rejecting an empty result.
pub fn read_roster(path: Option<&str>) -> ConfigResult<Vec<String>> {
    let reader: Box<dyn BufRead> = match path {
        None | Some("-") => Box::new(BufReader::new(io::stdin())),
        Some(path) => {
            let file = File::open(path).map_err(|source| ConfigError::RosterFile {
                path: path.to_string(),
                source,
            })?;
            Box::new(BufReader::new(file))
        }
    };
    parse_roster(reader)
}

fn parse_roster(mut reader: impl Read) -> ConfigResult<Vec<String>> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| ConfigError::RosterFile {
            path: "<roster>".to_string(),
            source,
        })?;

    let limit = host_name_max();
    let mut hosts = Vec::new();

    for (lineno, raw_line) in text.lines().enumerate() {
        if raw_line.is_empty() || raw_line.starts_with('#') || raw_line.starts_with(' ') || raw_line.starts_with('\t') {
            continue;
        }
        if raw_line.len() >= limit {
            return Err(ConfigError::HostNameTooLong {
                line: lineno + 1,
                limit,
            });
        }
        hosts.push(raw_line.to_string());
    }

    if hosts.is_empty() {
        return Err(ConfigError::EmptyRoster);
    }

    Ok(hosts)
}

fn host_name_max() -> usize {
    libc::HOST_NAME_MAX as usize
}
