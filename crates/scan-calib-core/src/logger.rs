//! Stderr backend for the `log` facade used by every `scan-calib-*` crate.
//!
//! Each record becomes one line tagged with the crate that emitted it:
//! `[  0.123s  INFO scan_calib_block] estimated block height -0.190`.
//! With the `tracing` feature, [`init_tracing`] routes the stage spans to
//! `tracing-subscriber` instead.

use std::fmt::Arguments;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, fmt::format::FmtSpan, util::SubscriberInitExt, EnvFilter};

/// Directive used when `RUST_LOG` is unset.
#[cfg(feature = "tracing")]
const DEFAULT_DIRECTIVE: &str = "scan_calib=info,scan_calib_core=info,scan_calib_block=info";

struct ScanLogger {
    level: LevelFilter,
    started: Instant,
}

/// Leading path segment of a log target (`scan_calib_block::locator` → `scan_calib_block`).
fn crate_name(target: &str) -> &str {
    target.split("::").next().unwrap_or(target)
}

fn format_line(elapsed_s: f64, level: Level, target: &str, args: &Arguments<'_>) -> String {
    format!("[{elapsed_s:7.3}s {level:>5} {}] {args}", crate_name(target))
}

impl Log for ScanLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<ScanLogger> = OnceLock::new();

/// Route `log` records at or above `level` to stderr.
///
/// Only the first call installs the logger; later calls keep the original
/// level and return `Ok(())`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| ScanLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Install a global `tracing` subscriber filtered by `RUST_LOG`, falling back
/// to `info` for the calibration crates. Span close events carry the stage
/// timings. Returns `false` when another subscriber is already installed.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true);
    let installed = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder.compact().finish().try_init()
    };
    installed.is_ok()
}
