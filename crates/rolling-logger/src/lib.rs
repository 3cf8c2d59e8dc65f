//! Rolling Logger
//!
//! Installs a tracing subscriber that writes to stderr and to a size-rotated
//! log file, keeping the newest lines in a circular buffer for diagnostics.
//! Records emitted through the `log` facade are forwarded as well.

mod buffer;
mod writer;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub use writer::RollingFileWriter;

pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;
pub const MAX_FILES: usize = 3;
pub const BUFFER_LINES: usize = 500;

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

/// Shared handle to one rolling log file
#[derive(Clone)]
pub struct RollingLogger {
    inner: Arc<Mutex<RollingFileWriter>>,
}

impl RollingLogger {
    pub fn open(dir: &Path, app_name: &str) -> Result<Self, String> {
        Self::with_limits(dir, app_name, MAX_FILE_BYTES, MAX_FILES, BUFFER_LINES)
    }

    pub fn with_limits(
        dir: &Path,
        app_name: &str,
        max_bytes: u64,
        max_files: usize,
        buffer_lines: usize,
    ) -> Result<Self, String> {
        let writer = RollingFileWriter::open(dir, app_name, max_bytes, max_files, buffer_lines)
            .map_err(|e| format!("Failed to open log file in {}: {}", dir.display(), e))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(writer)),
        })
    }

    pub fn live_path(&self) -> PathBuf {
        self.lock().live_path()
    }

    pub fn recent_lines(&self) -> Vec<String> {
        self.lock().recent_lines()
    }

    /// Subscriber writing to stderr and to this logger's file
    pub fn subscriber(&self, filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync + 'static {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_timer(LocalTime).with_writer(io::stderr))
            .with(
                fmt::layer()
                    .with_timer(LocalTime)
                    .with_ansi(false)
                    .with_writer(self.clone()),
            )
    }

    fn lock(&self) -> MutexGuard<'_, RollingFileWriter> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Per-event writer handed out to the fmt layer
pub struct LogWriter {
    inner: Arc<Mutex<RollingFileWriter>>,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .flush()
    }
}

impl<'a> MakeWriter<'a> for RollingLogger {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Install the process-wide logger. `RUST_LOG` overrides the default `info` filter.
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    let logger = RollingLogger::open(&log_dir, app_name)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    logger
        .subscriber(filter)
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;
    LOGGER
        .set(logger)
        .map_err(|_| "Logger already initialized".to_string())?;

    tracing::info!("{} logging to {}", app_name, log_dir.display());
    Ok(())
}

fn installed() -> Result<&'static RollingLogger, String> {
    LOGGER.get().ok_or_else(|| "Logger not initialized".to_string())
}

pub fn info(msg: &str) -> Result<(), String> {
    installed()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), String> {
    installed()?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    installed()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Newest buffered lines of the installed logger, oldest first
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(RollingLogger::recent_lines).unwrap_or_default()
}
