//! Stderr logger for the scorer binaries.
//!
//! Unlike a plain `eprintln!` sink, each record carries the seconds elapsed
//! since installation and the last path segment of its target, so a line
//! reads `[  0.412s  INFO blobs] blob filter kept 2 of 5` and pipeline
//! stages can be told apart. Records above the level filter are dropped
//! before formatting. Every line goes out in a single write, so lines from
//! concurrent sessions do not interleave.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

struct StageLogger {
    level: LevelFilter,
    started: Instant,
}

fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn format_line(elapsed: f64, level: Level, target: &str, args: fmt::Arguments<'_>) -> String {
    let target = short_target(target);
    format!("[{elapsed:7.3}s {level:>5} {target}] {args}\n")
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        let line = format_line(elapsed, record.level(), record.target(), *record.args());
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Install the stage logger with `level` as both its own filter and the
/// global `log` max level.
///
/// Only the first call installs anything; later calls keep the first
/// level and return `Ok`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut installed_now = false;
    let logger = LOGGER.get_or_init(|| {
        installed_now = true;
        StageLogger {
            level,
            started: Instant::now(),
        }
    });
    if installed_now {
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber on stderr that reports span timings on
/// close, so each pipeline stage shows up with its duration.
///
/// `RUST_LOG` wins over `level` when set. Errors from an already installed
/// subscriber are ignored.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    if json {
        let _ = builder.json().flatten_event(true).finish().try_init();
    } else {
        let _ = builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_trimmed_to_last_segment() {
        assert_eq!(short_target("puckscore_detect::blobs"), "blobs");
        assert_eq!(short_target("puckscore"), "puckscore");
    }

    #[test]
    fn line_carries_elapsed_level_and_stage() {
        let line = format_line(
            1.5,
            Level::Warn,
            "puckscore_detect::blobs",
            format_args!("kept {} of {}", 2, 5),
        );
        assert_eq!(line, "[  1.500s  WARN blobs] kept 2 of 5\n");
    }
}
