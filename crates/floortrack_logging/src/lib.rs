//! Shared logging setup for Floortrack binaries.
//!
//! Log lines go to a size-capped file under the Floortrack home directory
//! and, filtered, to stderr. The scan terminal runs in raw mode, so the
//! stderr layer is quieted while it is active.

use anyhow::{Context, Result};
use floortrack_protocol::paths::default_logs_dir;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "floortrack=info,floortrack_engine=info,floortrack_store=info";
const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Logging configuration for a Floortrack binary.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    /// Raw-mode scan terminal: keep stderr to warnings only.
    pub terminal_mode: bool,
}

/// Initialize tracing with a size-capped file writer and stderr output.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = default_logs_dir();
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_writer = CappedFileWriter::open(log_dir.join(format!("{}.log", config.app_name)))
        .context("Failed to open log file")?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.terminal_mode {
        EnvFilter::new("warn")
    } else if config.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(DEFAULT_LOG_FILTER)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    Ok(())
}

struct CappedFileInner {
    path: PathBuf,
    file: File,
    written: u64,
}

impl CappedFileInner {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            file,
            written,
        })
    }

    /// Move the full file aside as `<name>.old` and start fresh. One
    /// generation of history is enough for a floor terminal.
    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let old = self.path.with_extension("log.old");
        fs::rename(&self.path, &old)?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for CappedFileInner {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() as u64 > MAX_LOG_FILE_SIZE {
            self.roll()?;
        }
        let bytes = self.file.write(buf)?;
        self.written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Clonable `MakeWriter` over the shared capped file.
#[derive(Clone)]
struct CappedFileWriter {
    inner: Arc<Mutex<CappedFileInner>>,
}

impl CappedFileWriter {
    fn open(path: PathBuf) -> Result<Self> {
        let inner = CappedFileInner::open(path.clone())
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
        })
    }
}

struct CappedFileGuard {
    inner: Arc<Mutex<CappedFileInner>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CappedFileWriter {
    type Writer = CappedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        CappedFileGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for CappedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        inner.flush()
    }
}
