//! Stderr logger for batch runs.
//!
//! Lines look like `[  0.012s  WARN merge::layers] message`: elapsed time
//! since installation, level, and the emitting module with the `summits_`
//! crate prefix dropped. Warnings and errors are counted so a command can
//! report them once the run is over. Install it once at startup with
//! [`init_with_level`].

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Warnings and errors seen by the batch logger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogTally {
    pub warnings: usize,
    pub errors: usize,
}

struct BatchLogger {
    level: LevelFilter,
    started: Instant,
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

fn short_target(target: &str) -> &str {
    target.strip_prefix("summits_").unwrap_or(target)
}

impl Log for BatchLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error => self.errors.fetch_add(1, Ordering::Relaxed),
            Level::Warn => self.warnings.fetch_add(1, Ordering::Relaxed),
            _ => 0,
        };

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<BatchLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization; the first level wins.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| BatchLogger {
            level,
            started: Instant::now(),
            warnings: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Warnings and errors logged since [`init_with_level`]; zero when the
/// batch logger is not installed.
pub fn log_tally() -> LogTally {
    LOGGER
        .get()
        .map(|l| LogTally {
            warnings: l.warnings.load(Ordering::Relaxed),
            errors: l.errors.load(Ordering::Relaxed),
        })
        .unwrap_or_default()
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    if json {
        let _ = builder.json().flatten_event(true).finish().try_init();
    } else {
        let _ = builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
