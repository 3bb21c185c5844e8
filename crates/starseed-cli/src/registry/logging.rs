use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

use super::{RegistryError, RegistryResult};

/// JSON events go to the run's `logs.ndjson`; a readable copy goes to
/// stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_run_logging(path: &Path) -> RegistryResult<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let file = Arc::new(Mutex::new(file));

    let make_writer = BoxMakeWriter::new(move || LogFile {
        file: Arc::clone(&file),
    });

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(make_writer)
        .with_filter(LevelFilter::INFO);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|err| RegistryError::Logging(err.to_string()))
}

struct LogFile {
    file: Arc<Mutex<File>>,
}

impl LogFile {
    fn locked(&self) -> io::Result<std::sync::MutexGuard<'_, File>> {
        self.file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.locked()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.locked()?.flush()
    }
}
