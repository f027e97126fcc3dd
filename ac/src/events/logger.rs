//! Activity Logger - persists request events to a JSONL file
//!
//! Subscribes to the ActivityBus and appends every event to
//! `<dir>/activity.jsonl` for `ac activity` and debugging.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use super::bus::ActivityBus;
use super::types::{ApiEvent, EventLogEntry};

/// File name of the activity log inside its directory
pub const ACTIVITY_FILE: &str = "activity.jsonl";

/// Event logger that appends events to a JSONL file
pub struct ActivityLogger {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl ActivityLogger {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(ACTIVITY_FILE);
        debug!(?path, "ActivityLogger::new: creating logger");
        Self { path, writer: None }
    }

    /// Append an event to the log file, opening it on first use
    pub fn write_event(&mut self, event: &ApiEvent) -> eyre::Result<()> {
        debug!(request_id = event.request_id(), event_type = event.event_type(), "ActivityLogger::write_event");

        if self.writer.is_none() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            self.writer = Some(BufWriter::new(file));
        }

        let entry = EventLogEntry::new(event.clone());
        let json = serde_json::to_string(&entry)?;
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Consume events until every sender is gone
    ///
    /// This is meant to be spawned as a background task.
    pub async fn run(mut self, mut rx: broadcast::Receiver<ApiEvent>) {
        debug!("ActivityLogger::run: starting activity logger");
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = self.write_event(&event) {
                        error!(request_id = event.request_id(), error = %e, "ActivityLogger: failed to write event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "ActivityLogger: lagged behind, missed events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("ActivityLogger: channel closed, shutting down");
                    break;
                }
            }
        }

        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

/// Read back the last `limit` entries of the activity log (all when `None`)
pub fn read_activity(dir: impl AsRef<Path>, limit: Option<usize>) -> eyre::Result<Vec<EventLogEntry>> {
    let log_path = dir.as_ref().join(ACTIVITY_FILE);
    debug!(?log_path, "read_activity: reading log file");

    if !log_path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&log_path)?;
    let mut entries = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<EventLogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(line, error = %e, "read_activity: failed to parse line");
            }
        }
    }

    if let Some(limit) = limit {
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
    }

    debug!(count = entries.len(), "read_activity: loaded entries");
    Ok(entries)
}

/// Spawn the activity logger as a background task writing under `dir`
///
/// The task ends once the bus is dropped.
pub fn spawn_activity_logger(bus: &ActivityBus, dir: impl AsRef<Path>) -> tokio::task::JoinHandle<()> {
    let logger = ActivityLogger::new(dir);
    let rx = bus.subscribe();
    tokio::spawn(async move {
        logger.run(rx).await;
    })
}
