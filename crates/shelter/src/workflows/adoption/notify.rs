use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

/// Fire-and-forget event sink. Implementations must not fail the caller.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &str);
}

/// Forwards events to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, event: &str) {
        info!(target: "shelter::events", event, "shelter event");
    }
}

/// Appends `timestamp - event` lines to a log file.
#[derive(Debug, Clone)]
pub struct LogFileNotifier {
    path: PathBuf,
}

impl LogFileNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, event: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{} - {}", Utc::now().to_rfc3339(), event)
    }
}

impl NotificationSink for LogFileNotifier {
    fn notify(&self, event: &str) {
        if let Err(err) = self.append(event) {
            warn!(path = %self.path.display(), error = %err, "failed to append event log");
        }
    }
}

/// Observer list fanning each event out to every subscribed sink.
#[derive(Default)]
pub struct NotificationHub {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: impl NotificationSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn with(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.subscribe(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl NotificationSink for NotificationHub {
    fn notify(&self, event: &str) {
        for sink in &self.sinks {
            sink.notify(event);
        }
    }
}
