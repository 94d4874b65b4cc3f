//! Composition of the transport program's argument prefix and the bound on
//! total composed argument count.

use crate::cli::Cli;

/// Upper bound on `transport-prefix + host-name + remote-command` words.
/// Composing more than this is a configuration error, not a silent
/// truncation.
pub const MAX_ARGS: usize = 256;

const TRANSPORT_PROGRAM: &str = "ssh";

/// Build the transport program's fixed argument prefix: the program name
/// followed by any passthrough flags, in the order the transport program
/// expects them.
pub fn build_transport_prefix(cli: &Cli) -> Vec<String> {
    let mut prefix = vec![TRANSPORT_PROGRAM.to_string()];

    if cli.quiet {
        prefix.push("-q".to_string());
    }
    if let Some(identity) = &cli.identity {
        prefix.push("-i".to_string());
        prefix.push(identity.clone());
    }
    if let Some(login) = &cli.login {
        prefix.push("-l".to_string());
        prefix.push(login.clone());
    }
    if let Some(port) = &cli.port {
        prefix.push("-p".to_string());
        prefix.push(port.clone());
    }
    if cli.no_strict_host_key_checking {
        prefix.push("-o".to_string());
        prefix.push("StrictHostKeyChecking=no".to_string());
        prefix.push("-o".to_string());
        prefix.push("UserKnownHostsFile=/dev/null".to_string());
    }
    for option in &cli.extra_options {
        prefix.push("-o".to_string());
        prefix.push(option.clone());
    }

    prefix
}

/// Build one host's fully composed argument vector:
/// `transport-prefix... host-name remote-command...`.
pub fn composed_argv(transport_prefix: &[String], host: &str, remote_command: &[String]) -> Vec<String> {
    let mut argv = Vec::with_capacity(transport_prefix.len() + 1 + remote_command.len());
    argv.extend(transport_prefix.iter().cloned());
    argv.push(host.to_string());
    argv.extend(remote_command.iter().cloned());
    argv
}
