//! JSONL file writer for batch reports.
//!
//! Each [`ReportEvent`] is serialized as a single JSON line with a `type`
//! field and an RFC 3339 `timestamp`, appended to the report file.

use geotools_application::ports::report_sink::{ReportEvent, ReportSink};
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL report writer that appends one JSON object per line.
///
/// Lines are flushed as they are recorded so an interrupted batch still
/// leaves every finished item in the report. Write failures are logged,
/// never returned: losing a report line must not fail the run.
pub struct JsonlReportWriter<W: Write + Send = File> {
    writer: Mutex<BufWriter<W>>,
    path: PathBuf,
}

impl JsonlReportWriter {
    /// Open the report at `path` for appending.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(path = %parent.display(), error = %e, "Could not create report directory");
            return None;
        }

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Self::with_writer(path, file)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not open report file");
                None
            }
        }
    }
}

impl<W: Write + Send> JsonlReportWriter<W> {
    fn with_writer(path: &Path, writer: W) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            path: path.to_path_buf(),
        }
    }

    /// Get the path to the report file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

/// `event` as one report record: object payloads gain `type` and
/// `timestamp` keys, anything else is nested under `data`.
fn to_record(event: ReportEvent, timestamp: String) -> Value {
    match event.payload {
        Value::Object(mut map) => {
            map.insert("type".to_string(), Value::from(event.event_type));
            map.insert("timestamp".to_string(), Value::from(timestamp));
            Value::Object(map)
        }
        data => json!({
            "type": event.event_type,
            "timestamp": timestamp,
            "data": data,
        }),
    }
}

impl<W: Write + Send> ReportSink for JsonlReportWriter<W> {
    fn record(&self, event: ReportEvent) {
        let event_type = event.event_type;
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let line = match serde_json::to_string(&to_record(event, timestamp)) {
            Ok(line) => line,
            Err(e) => {
                warn!(event = event_type, error = %e, "Failed to serialize report event");
                return;
            }
        };

        if let Err(e) = self.append(&line) {
            warn!(
                path = %self.path.display(),
                event = event_type,
                error = %e,
                "Failed to append report event"
            );
        }
    }
}

impl<W: Write + Send> Drop for JsonlReportWriter<W> {
    fn drop(&mut self) {
        let writer = self.writer.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writer.flush() {
            warn!(path = %self.path.display(), error = %e, "Failed to flush report file");
        }
    }
}
