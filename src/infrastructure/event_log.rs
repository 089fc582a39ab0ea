use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::{Map, Value};

/// Relative `--event-log` paths are placed under this folder.
pub const EVENT_LOG_DIR: &str = ".repol";

/// One JSONL line: `{"ts":..,"event":..,"kind":..,"data":{..}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Milliseconds since the unix epoch.
    pub ts: u64,
    /// Flow that emitted it, e.g. `launch` or `selection`.
    pub event: String,
    pub kind: String,
    pub data: Map<String, Value>,
}

impl Event {
    pub fn new(event: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            ts: now_millis(),
            event: event.into(),
            kind: kind.into(),
            data: Map::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn with_path(self, key: impl Into<String>, path: &Path) -> Self {
        self.with_data(key, Value::from(path.display().to_string()))
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

pub trait EventLogger: Send {
    fn log(&self, event: Event);
}

pub struct NullEventLogger;

impl EventLogger for NullEventLogger {
    fn log(&self, _event: Event) {}
}

/// Absolute paths and paths already under `.repol/` are kept as given.
pub fn resolve_log_path(path: PathBuf) -> PathBuf {
    let log_dir = Path::new(EVENT_LOG_DIR);
    if path.is_absolute() || path.starts_with(log_dir) {
        return path;
    }
    log_dir.join(path)
}

/// Appends one serialized [`Event`] per line, flushing after each.
pub struct FileEventLogger {
    writer: Mutex<BufWriter<File>>,
}

impl FileEventLogger {
    /// Opens for append, creating the file and any missing parent folders.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn append(writer: &mut BufWriter<File>, event: &Event) -> std::io::Result<()> {
        serde_json::to_writer(&mut *writer, event)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl EventLogger for FileEventLogger {
    /// Logging never interrupts a launch; write failures are dropped.
    fn log(&self, event: Event) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = Self::append(&mut writer, &event);
        }
    }
}
