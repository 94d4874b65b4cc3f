use clap::Parser;

/// Run a command across a roster of hosts in parallel over an external
/// transport program, streaming or aggregating their output.
#[derive(Parser, Debug)]
#[command(name = "fleetrun", version, about)]
pub struct Cli {
    /// Concurrency cap: maximum number of hosts running at once
    #[arg(short = 'm', long = "max-jobs", default_value_t = 50)]
    pub max_jobs: i64,

    /// Roster file (one hostname per line); `-` or omitted means stdin
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Group mode: stream each host's output in contiguous blocks
    #[arg(short = 'g', long, conflicts_with = "join")]
    pub group: bool,

    /// Join mode: capture output and report equivalence classes at the end
    #[arg(short = 'j', long, conflicts_with = "group")]
    pub join: bool,

    /// Suppress host-name prefixes (not permitted with `-j`)
    #[arg(short = 'a', long)]
    pub anonymous: bool,

    /// Silent: consume output without printing it (not permitted with `-j`)
    #[arg(short = 's', long)]
    pub silent: bool,

    /// Print a one-line exit-code summary per host
    #[arg(short = 'e', long = "exit-codes")]
    pub exit_codes: bool,

    /// Emit engine-level debug lines prefixed with the program name
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Trim hostnames at the first `.` for display only
    #[arg(short = 't', long)]
    pub trim: bool,

    /// Color mode
    #[arg(short = 'c', long = "color", default_value = "auto", value_parser = ["on", "off", "auto"])]
    pub color: String,

    /// Maximum buffered line length before a forced line break
    #[arg(long = "max-line-length", default_value_t = 1024)]
    pub max_line_length: i64,

    /// Maximum captured output length per host in join mode
    #[arg(long = "max-output-length", default_value_t = 8192)]
    pub max_output_length: i64,

    /// Print the composed command for each host without running anything
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Append `-o StrictHostKeyChecking=no -o UserKnownHostsFile=/dev/null`
    /// to the transport command ahead of any user-supplied `-o` values
    #[arg(short = 'N', long = "no-strict-host-key-checking")]
    pub no_strict_host_key_checking: bool,

    /// Quiet flag passed through to the transport program (`ssh -q`)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Identity file passed through to the transport program (`ssh -i`)
    #[arg(short = 'i', long)]
    pub identity: Option<String>,

    /// Remote login name passed through to the transport program (`ssh -l`)
    #[arg(short = 'l', long)]
    pub login: Option<String>,

    /// Remote port passed through to the transport program (`ssh -p`)
    #[arg(short = 'p', long)]
    pub port: Option<String>,

    /// Extra `-o key=value` option passed through to the transport program;
    /// may be repeated
    #[arg(short = 'o', long = "option")]
    pub extra_options: Vec<String>,

    /// Remote command and its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}
