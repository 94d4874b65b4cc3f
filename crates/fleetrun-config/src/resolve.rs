//! Turn a parsed `Cli` into a validated, ready-to-run configuration:
//! mutual-exclusion checks, numeric validation, roster loading, transport
//! argument composition, and the `MAX_ARGS` bound.

use fleetrun_core::color::ColorMode;
use fleetrun_core::format::Mode;
use fleetrun_core::format::{GroupFormatter, JoinFormatter, LineFormatter};
use fleetrun_core::Colors;

use crate::argv::{build_transport_prefix, MAX_ARGS};
use crate::cli::Cli;
use crate::error::{ConfigError, ConfigResult};
use crate::roster::read_roster;

pub struct ResolvedConfig {
    pub hosts: Vec<String>,
    pub transport_prefix: Vec<String>,
    pub remote_command: Vec<String>,
    pub max_jobs: usize,
    pub mode: Mode,
    pub colors: Colors,
    pub trim: bool,
    pub silent: bool,
    pub print_exit_summary: bool,
    pub debug: bool,
    pub dry_run: bool,
    pub max_line_length: usize,
    pub max_output_length: usize,
}

pub fn resolve(cli: Cli) -> ConfigResult<ResolvedConfig> {
    if cli.max_jobs < 1 {
        return Err(ConfigError::InvalidMaxJobs);
    }
    if cli.join && cli.silent {
        return Err(ConfigError::JoinAndSilent);
    }
    if cli.join && cli.anonymous {
        return Err(ConfigError::JoinAndAnonymous);
    }
    if cli.max_line_length <= 0 {
        return Err(ConfigError::InvalidMaxLineLength);
    }
    if cli.max_output_length <= 0 {
        return Err(ConfigError::InvalidMaxOutputLength);
    }
    if cli.command.is_empty() {
        return Err(ConfigError::MissingCommand);
    }

    let color_mode = match cli.color.as_str() {
        "on" => ColorMode::On,
        "off" => ColorMode::Off,
        "auto" => ColorMode::Auto,
        other => return Err(ConfigError::InvalidColor(other.to_string())),
    };
    let colors = Colors::resolve(color_mode);

    let hosts = read_roster(cli.file.as_deref())?;
    let transport_prefix = build_transport_prefix(&cli);
    let remote_command = cli.command.clone();

    let composed_word_count = transport_prefix.len() + 1 + remote_command.len();
    if composed_word_count > MAX_ARGS {
        return Err(ConfigError::TooManyArguments {
            count: composed_word_count,
            limit: MAX_ARGS,
        });
    }

    let max_line_length = cli.max_line_length as usize;
    let max_output_length = cli.max_output_length as usize;

    let mode = if cli.join {
        Mode::Join(JoinFormatter::new(max_output_length))
    } else if cli.group {
        Mode::Group(GroupFormatter::new(cli.anonymous, colors))
    } else {
        Mode::LineByLine(LineFormatter::new(cli.anonymous, colors, max_line_length))
    };

    Ok(ResolvedConfig {
        hosts,
        transport_prefix,
        remote_command,
        max_jobs: cli.max_jobs as usize,
        mode,
        colors,
        trim: cli.trim,
        silent: cli.silent,
        print_exit_summary: cli.exit_codes || cli.debug,
        debug: cli.debug,
        dry_run: cli.dry_run,
        max_line_length,
        max_output_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli_with_roster(extra: &[&str], roster_path: &str) -> Cli {
        let mut args = vec!["fleetrun".to_string(), "-f".to_string(), roster_path.to_string()];
        args.extend(extra.iter().map(|s| s.to_string()));
        Cli::parse_from(args)
    }

    #[test]
    fn join_and_group_together_is_rejected_by_clap() {
        // -g/-j are declared `conflicts_with` each other in `cli.rs`, so this
        // is rejected at parse time, before `resolve()` ever runs.
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "web01").unwrap();
        let args = [
            "fleetrun",
            "-f",
            file.path().to_str().unwrap(),
            "-j",
            "-g",
            "uptime",
        ];
        let err = Cli::try_parse_from(args).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn missing_command_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "web01").unwrap();
        let cli = cli_with_roster(&[], file.path().to_str().unwrap());
        let err = resolve(cli).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCommand));
    }

    #[test]
    fn valid_config_resolves_transport_prefix_and_hosts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "web01\nweb02").unwrap();
        let cli = cli_with_roster(&["uptime"], file.path().to_str().unwrap());
        let resolved = resolve(cli).unwrap();
        assert_eq!(resolved.hosts, vec!["web01".to_string(), "web02".to_string()]);
        assert_eq!(resolved.transport_prefix, vec!["ssh".to_string()]);
        assert_eq!(resolved.remote_command, vec!["uptime".to_string()]);
    }
}
