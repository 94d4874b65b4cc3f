use std::io::{self, Write};

use clap::Parser;
use fleetrun_config::{resolve, Cli, ConfigError};
use fleetrun_core::scheduler::EngineConfig;
use fleetrun_core::EngineError;

fn main() {
    let cli = Cli::parse();
    let debug = cli.debug;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(if debug {
            tracing_subscriber::EnvFilter::new("debug")
        } else {
            tracing_subscriber::EnvFilter::from_default_env()
        })
        .try_init()
        .ok();

    let resolved = match resolve(cli) {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("fleetrun: {err}");
            std::process::exit(exit_code_for_config_error(&err));
        }
    };

    if resolved.dry_run {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for host in &resolved.hosts {
            let argv = fleetrun_config::argv::composed_argv(&resolved.transport_prefix, host, &resolved.remote_command);
            let _ = writeln!(out, "{}", argv.join(" "));
        }
        std::process::exit(0);
    }

    tracing::debug!(hosts = resolved.hosts.len(), max_jobs = resolved.max_jobs, "starting run");

    let hosts = resolved
        .hosts
        .iter()
        .enumerate()
        .map(|(index, name)| fleetrun_core::Host::new(name.clone(), index))
        .collect();

    let config = EngineConfig {
        concurrency: resolved.max_jobs,
        mode: resolved.mode,
        colors: resolved.colors,
        trim: resolved.trim,
        silent: resolved.silent,
        print_exit_summary: resolved.print_exit_summary,
        max_line_length: resolved.max_line_length,
        max_output_length: resolved.max_output_length,
    };

    let transport_prefix = resolved.transport_prefix;
    let remote_command = resolved.remote_command;
    let is_join = matches!(config.mode, fleetrun_core::Mode::Join(_));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let report = fleetrun_core::run(
        hosts,
        |host| fleetrun_config::argv::composed_argv(&transport_prefix, host, &remote_command),
        config,
        &mut out,
    );

    let report = match report {
        Ok(report) => report,
        Err(err) => {
            eprintln!("fleetrun: {err}");
            std::process::exit(exit_code_for_engine_error(&err));
        }
    };

    if is_join {
        let classes_input: Vec<(&str, &[u8])> = report
            .join_captures
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
            .collect();
        let classes = fleetrun_core::aggregate::partition(&classes_input);
        if let Err(err) = fleetrun_core::aggregate::write_report(&classes, report.total_hosts, &resolved.colors, &mut out) {
            eprintln!("fleetrun: write to stdout failed: {err}");
            std::process::exit(3);
        }
    }

    std::process::exit(0);
}

fn exit_code_for_config_error(_err: &ConfigError) -> i32 {
    2
}

fn exit_code_for_engine_error(_err: &EngineError) -> i32 {
    3
}
