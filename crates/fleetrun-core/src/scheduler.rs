//! Main loop: admits hosts up to the concurrency cap, waits for readiness,
//! dispatches reads, and reaps children whose streams have all closed.

use std::io::{self, IsTerminal, Write};
use std::os::fd::{AsRawFd, RawFd};

use mio::Token;

use crate::clock::Clock;
use crate::color::Colors;
use crate::error::{EngineError, EngineResult};
use crate::format::{Mode, StreamMeta};
use crate::host::{ChildRecord, Descriptor, Host, StreamContext, StreamKind};
use crate::reader::{drain_ready_stream, ReadStatus};
use crate::reaper::reap;
use crate::spawn::spawn_child;
use crate::watcher::ReadinessWatcher;

/// What the engine needs from the outside world to run one pass over a
/// roster. Every field here is something `fleetrun-config` composes.
pub struct EngineConfig {
    pub concurrency: usize,
    pub mode: Mode,
    pub colors: Colors,
    pub trim: bool,
    pub silent: bool,
    pub print_exit_summary: bool,
    pub max_line_length: usize,
    pub max_output_length: usize,
}

/// The bytes a completed run handed back, per host, in roster order.
/// Populated only in join mode; empty otherwise.
pub struct RunReport {
    pub total_hosts: usize,
    pub done: usize,
    pub join_captures: Vec<(String, Vec<u8>)>,
}

/// Wraps the shared stdout writer so every call site that writes through it
/// keeps `*pending` in sync with whether the last byte written was a
/// newline, regardless of which mode formatter or which bookkeeping line
/// (exit summary, progress line) did the writing. This is what lets the
/// reaper's "insert a leading newline if the last emission didn't end in
/// one" rule (spec'd in §4.6) hold across every mode, not just the ones that
/// happen to always end a write on a newline.
struct TrackedOut<'a> {
    inner: &'a mut dyn Write,
    pending: &'a mut bool,
}

impl Write for TrackedOut<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        if n > 0 {
            *self.pending = buf[n - 1] != b'\n';
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Encode a host index and stream kind into a watcher token. Three tokens
/// are reserved per host regardless of mode, so the scheme stays uniform.
fn token_for(host_index: usize, kind: StreamKind) -> Token {
    let slot = match kind {
        StreamKind::Stdout => 0,
        StreamKind::Stderr => 1,
        StreamKind::Merged => 2,
    };
    Token(host_index * 3 + slot)
}

/// Run the engine over `hosts`, invoking `argv_for_host` to build each
/// child's composed argument vector. Blocks until every host has been
/// admitted, drained, and reaped.
pub fn run(
    mut hosts: Vec<Host>,
    argv_for_host: impl Fn(&str) -> Vec<String>,
    config: EngineConfig,
    out: &mut dyn Write,
) -> EngineResult<RunReport> {
    let total_hosts = hosts.len();
    let clock = Clock::start();
    let mut watcher = ReadinessWatcher::new()?;
    let mut mode = config.mode;
    let is_join = mode.is_join();
    let buffer_capacity = mode.buffer_capacity(config.max_line_length, config.max_output_length);

    let mut contexts: std::collections::HashMap<Token, StreamContext> = std::collections::HashMap::new();

    let mut cursor = 0usize;
    let mut outstanding = 0usize;
    let mut done = 0usize;
    let mut newline_pending = false;
    let mut out = TrackedOut {
        inner: out,
        pending: &mut newline_pending,
    };
    let show_progress = is_join && io::stdout().is_terminal();

    if show_progress {
        print_progress_line(&mut out, &config.colors, done, total_hosts)?;
    }

    while cursor < hosts.len() || outstanding > 0 {
        while cursor < hosts.len() && outstanding < config.concurrency {
            // Connect using the full roster name; `-t`/`--trim` only affects
            // the name used for display afterward, not the transport target.
            let argv = argv_for_host(&hosts[cursor].name);
            let started_ms = clock.now_ms();
            tracing::debug!(host = %hosts[cursor].name, outstanding, "admitting host");
            let mut record = spawn_child(&hosts[cursor].name, &argv, is_join, started_ms)?;
            tracing::trace!(host = %hosts[cursor].name, pid = ?record.pid(), "spawned child");

            if config.trim {
                hosts[cursor].trim_domain();
            }

            register_streams(&mut watcher, &mut record, cursor, &mut contexts, buffer_capacity)?;

            hosts[cursor].child = Some(record);
            outstanding += 1;
            cursor += 1;
        }

        tracing::trace!(outstanding, done, "waiting on readiness watcher");
        let ready = watcher.wait()?;
        for token in ready {
            let Some(ctx) = contexts.get_mut(&token) else {
                continue;
            };
            let host_index = ctx.host_index;
            let kind = ctx.kind;
            let fd = active_fd(&hosts[host_index], kind)
                .ok_or(EngineError::Invariant("ready token has no open descriptor"))?;

            let meta = StreamMeta {
                host_name: &hosts[host_index].name,
                kind,
            };
            let status =
                drain_ready_stream(fd, meta, &mut ctx.buffer, config.silent, &mut mode, &mut out)?;

            if status == ReadStatus::Closed {
                let buffer = std::mem::take(&mut ctx.buffer);
                watcher.deregister(fd)?;
                contexts.remove(&token);
                close_stream(&mut hosts[host_index], kind, buffer);

                // Bind the name before taking a mutable borrow of `record`:
                // `hosts[host_index]` borrows the whole `Vec<Host>` through
                // `IndexMut`, which the borrow checker can't field-split, so
                // a later shared borrow of `hosts` (for the host name) would
                // conflict with `record` staying alive across the `reap`
                // call below.
                let host_name = hosts[host_index].name.clone();
                let record = hosts[host_index]
                    .child
                    .as_mut()
                    .expect("stream close observed on host with no child record");
                if record.all_streams_closed() {
                    let pending_before = *out.pending;
                    tracing::debug!(host = %host_name, "reaping child");
                    reap(
                        &host_name,
                        record,
                        &clock,
                        config.print_exit_summary,
                        &config.colors,
                        pending_before,
                        &mut out,
                    )?;
                    outstanding -= 1;
                    done += 1;

                    if show_progress {
                        print_progress_line(&mut out, &config.colors, done, total_hosts)?;
                        if done == total_hosts {
                            out.write_all(b"\n").map_err(EngineError::StdoutWrite)?;
                        }
                    }
                }
            }
        }
    }

    let join_captures = if is_join {
        hosts
            .iter_mut()
            .map(|h| {
                let captured = h
                    .child
                    .as_mut()
                    .and_then(|c| c.captured.take())
                    .unwrap_or_default();
                (h.name.clone(), captured)
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(RunReport {
        total_hosts,
        done,
        join_captures,
    })
}

fn register_streams(
    watcher: &mut ReadinessWatcher,
    record: &mut ChildRecord,
    host_index: usize,
    contexts: &mut std::collections::HashMap<Token, StreamContext>,
    buffer_capacity: usize,
) -> EngineResult<()> {
    for (descriptor, kind) in [
        (&record.stdout, StreamKind::Stdout),
        (&record.stderr, StreamKind::Stderr),
        (&record.merged, StreamKind::Merged),
    ] {
        if let Descriptor::Open(fd) = descriptor {
            let token = token_for(host_index, kind);
            watcher.register(fd.as_raw_fd(), token)?;
            contexts.insert(token, StreamContext::new(host_index, kind, buffer_capacity));
        }
    }
    Ok(())
}

fn active_fd(host: &Host, kind: StreamKind) -> Option<RawFd> {
    let record = host.child.as_ref()?;
    let descriptor = match kind {
        StreamKind::Stdout => &record.stdout,
        StreamKind::Stderr => &record.stderr,
        StreamKind::Merged => &record.merged,
    };
    match descriptor {
        Descriptor::Open(fd) => Some(fd.as_raw_fd()),
        _ => None,
    }
}

fn close_stream(host: &mut Host, kind: StreamKind, buffer: Vec<u8>) {
    let record = match &mut host.child {
        Some(r) => r,
        None => return,
    };
    let descriptor = match kind {
        StreamKind::Stdout => &mut record.stdout,
        StreamKind::Stderr => &mut record.stderr,
        StreamKind::Merged => &mut record.merged,
    };
    descriptor.close();
    if kind == StreamKind::Merged {
        record.captured = Some(buffer);
    }
}

const PROGRAM_NAME: &str = "fleetrun";

fn print_progress_line(out: &mut dyn Write, colors: &Colors, done: usize, total: usize) -> EngineResult<()> {
    write!(
        out,
        "[{}] finished {}/{}\r",
        colors.cyan(PROGRAM_NAME),
        colors.magenta(&done.to_string()),
        colors.magenta(&total.to_string())
    )
    .map_err(EngineError::StdoutWrite)?;
    out.flush().map_err(EngineError::StdoutWrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorMode;
    use crate::format::{GroupFormatter, JoinFormatter, LineFormatter, Mode};

    fn host(name: &str, index: usize) -> Host {
        Host::new(name.to_string(), index)
    }

    #[test]
    fn run_reaps_every_admitted_host() {
        let hosts = vec![host("a", 0), host("b", 1), host("c", 2)];
        let config = EngineConfig {
            concurrency: 2,
            mode: Mode::LineByLine(LineFormatter::new(true, Colors::resolve(ColorMode::Off), 1024)),
            colors: Colors::resolve(ColorMode::Off),
            trim: false,
            silent: false,
            print_exit_summary: false,
            max_line_length: 1024,
            max_output_length: 8192,
        };
        let mut out = Vec::new();
        let report = run(
            hosts,
            |_host| vec!["/bin/echo".to_string(), "hi".to_string()],
            config,
            &mut out,
        )
        .unwrap();
        assert_eq!(report.done, 3);
        assert_eq!(report.total_hosts, 3);
    }

    #[test]
    fn trim_affects_display_name_not_the_connection_target() {
        // -t truncates the name used for display, but `argv_for_host` (which
        // builds the actual ssh invocation) must still see the full name.
        let hosts = vec![host("web01.internal.example.com", 0)];
        let config = EngineConfig {
            concurrency: 1,
            mode: Mode::LineByLine(LineFormatter::new(true, Colors::resolve(ColorMode::Off), 1024)),
            colors: Colors::resolve(ColorMode::Off),
            trim: true,
            silent: false,
            print_exit_summary: false,
            max_line_length: 1024,
            max_output_length: 8192,
        };
        let seen_names = std::cell::RefCell::new(Vec::new());
        let mut out = Vec::new();
        run(
            hosts,
            |host_name| {
                seen_names.borrow_mut().push(host_name.to_string());
                vec!["/bin/echo".to_string(), "hi".to_string()]
            },
            config,
            &mut out,
        )
        .unwrap();
        assert_eq!(
            seen_names.into_inner(),
            vec!["web01.internal.example.com".to_string()]
        );
    }

    #[test]
    fn join_mode_captures_matching_output_into_one_class() {
        let hosts = vec![host("a", 0), host("b", 1)];
        let config = EngineConfig {
            concurrency: 2,
            mode: Mode::Join(JoinFormatter::new(64)),
            colors: Colors::resolve(ColorMode::Off),
            trim: false,
            silent: false,
            print_exit_summary: false,
            max_line_length: 1024,
            max_output_length: 64,
        };
        let mut out = Vec::new();
        let report = run(
            hosts,
            |_host| vec!["/bin/echo".to_string(), "hello".to_string()],
            config,
            &mut out,
        )
        .unwrap();
        assert_eq!(report.join_captures.len(), 2);
        assert_eq!(report.join_captures[0].1, report.join_captures[1].1);
    }

    #[test]
    fn exit_summary_gets_leading_newline_after_unterminated_group_output() {
        // printf with no trailing newline leaves group mode's last written
        // byte as non-newline; the exit-codes summary must still start on
        // its own line.
        let hosts = vec![host("a", 0)];
        let config = EngineConfig {
            concurrency: 1,
            mode: Mode::Group(GroupFormatter::new(true, Colors::resolve(ColorMode::Off))),
            colors: Colors::resolve(ColorMode::Off),
            trim: false,
            silent: false,
            print_exit_summary: true,
            max_line_length: 1024,
            max_output_length: 8192,
        };
        let mut out = Vec::new();
        run(
            hosts,
            |_host| {
                vec![
                    "/usr/bin/printf".to_string(),
                    "no-newline".to_string(),
                ]
            },
            config,
            &mut out,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(
            text.starts_with("no-newline\n[a] exited: 0 ("),
            "expected a newline inserted before the exit summary, got: {text:?}"
        );
    }
}
