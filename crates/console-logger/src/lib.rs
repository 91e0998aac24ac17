//! Console Logger
//!
//! A `tracing` layer for browser apps. Every event is formatted into a single
//! line, written to the browser console at the matching level (stderr when not
//! running on wasm), and kept in a rolling buffer so the app can show or dump
//! the most recent lines.

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

/// Lines kept in the rolling buffer
pub const DEFAULT_CAPACITY: usize = 200;

static RECENT: OnceLock<Arc<RollingBuffer>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("A global logger is already installed")]
    AlreadyInitialized,
}

/// Install the console layer as the global `tracing` subscriber.
///
/// `level` is any level name `tracing` understands (`trace`, `debug`,
/// `info`, `warn`, `error`, `off`).
pub fn init_logger(app_name: &str, level: &str) -> Result<(), LoggerError> {
    let filter: LevelFilter = level
        .trim()
        .parse()
        .map_err(|_| LoggerError::InvalidLevel(level.to_string()))?;

    let buffer = RECENT
        .get_or_init(|| Arc::new(RollingBuffer::new(DEFAULT_CAPACITY)))
        .clone();

    let subscriber = Registry::default().with(ConsoleLayer::new(app_name, buffer).with_filter(filter));
    tracing::subscriber::set_global_default(subscriber).map_err(|_| LoggerError::AlreadyInitialized)
}

/// Most recent lines written by the global logger, oldest first
pub fn recent_lines() -> Vec<String> {
    RECENT.get().map(|buffer| buffer.lines()).unwrap_or_default()
}

// ========================
// Rolling Buffer
// ========================

/// Fixed-capacity line buffer; pushing past capacity drops the oldest line
#[derive(Debug)]
pub struct RollingBuffer {
    capacity: usize,
    lines: Mutex<VecDeque<String>>,
}

impl RollingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            lines: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    pub fn push(&self, line: String) {
        // A poisoned lock only means another thread panicked mid-push
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    pub fn lines(&self) -> Vec<String> {
        let lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ========================
// Layer
// ========================

/// Formats events and writes them to the console
pub struct ConsoleLayer {
    app_name: String,
    buffer: Arc<RollingBuffer>,
}

impl ConsoleLayer {
    pub fn new(app_name: &str, buffer: Arc<RollingBuffer>) -> Self {
        Self {
            app_name: app_name.to_string(),
            buffer,
        }
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        let line = format_line(
            &self.app_name,
            Local::now(),
            *meta.level(),
            meta.target(),
            &visitor.message,
            &visitor.fields,
        );

        write_console(*meta.level(), &line);
        self.buffer.push(line);
    }
}

/// Collects the `message` field and renders the rest as `key=value`
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// `[App] 12:30:01.250 INFO target: message key=value`
pub fn format_line(
    app_name: &str,
    time: DateTime<Local>,
    level: Level,
    target: &str,
    message: &str,
    fields: &str,
) -> String {
    format!(
        "[{}] {} {} {}: {}{}",
        app_name,
        time.format("%H:%M:%S%.3f"),
        level,
        target,
        message,
        fields
    )
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    use web_sys::console;

    let value = &line.into();
    match level {
        Level::ERROR => console::error_1(value),
        Level::WARN => console::warn_1(value),
        Level::INFO => console::info_1(value),
        Level::DEBUG => console::log_1(value),
        _ => console::debug_1(value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, line: &str) {
    eprintln!("{}", line);
}
