//! Helpers shared by the in-crate test modules.

use crate::config::DatabaseConfig;
use crate::database::{Database, DatabaseDriver};
use crate::telemetry::Logger;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;

/// In-memory log sink. Each [`CapturedLogs::logger`] writes flattened JSON
/// lines into the shared buffer.
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn logger(&self, level: LevelFilter) -> Logger {
        let buffer = Arc::clone(&self.buffer);
        Logger::with_writer(level, move || SharedWriter(Arc::clone(&buffer)))
    }

    pub(crate) fn entries(&self) -> Vec<serde_json::Value> {
        let bytes = self.buffer.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|entry| entry["message"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

pub(crate) fn sqlite_config(dsn: &str) -> DatabaseConfig {
    DatabaseConfig {
        dsn: dsn.to_string(),
        driver: DatabaseDriver::Sqlite,
        pool_max_idle: 1,
        pool_max_open: 4,
        pool_max_lifetime: Duration::from_secs(3600),
    }
}

/// Connects to a fresh in-memory sqlite store with the schema in place.
pub(crate) async fn memory_database() -> Database {
    let database = Database::connect(&sqlite_config(":memory:"), &Logger::discard())
        .await
        .unwrap();
    database.ensure_schema().await.unwrap();
    database
}
