//! Event sinks and the level-filtering service

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use crate::config::runtime::LoggingPreferences;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

// A poisoned sink still holds usable state
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// SINKS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFormat {
    /// `[LEVEL] CODE - message (k=v, ...)`
    Text,
    /// One JSON object per line
    Json,
}

impl EventFormat {
    pub fn render(self, event: &LogEvent) -> String {
        match self {
            EventFormat::Text => event.format(),
            EventFormat::Json => event.format_json().unwrap_or_else(|_| event.format()),
        }
    }
}

/// Writes one rendered event per line
pub struct WriterLogger {
    writer: Mutex<Box<dyn Write + Send>>,
    format: EventFormat,
}

impl WriterLogger {
    pub fn new(writer: Box<dyn Write + Send>, format: EventFormat) -> Self {
        Self {
            writer: Mutex::new(writer),
            format,
        }
    }

    /// stdout carries tokens, so diagnostics go to stderr
    pub fn stderr(format: EventFormat) -> Self {
        Self::new(Box::new(io::stderr()), format)
    }

    pub fn format(&self) -> EventFormat {
        self.format
    }
}

impl Logger for WriterLogger {
    fn log(&self, event: &LogEvent) {
        let line = self.format.render(event);
        // Write failures are ignored
        let _ = writeln!(lock(&self.writer), "{}", line);
    }
}

/// Bounded in-memory sink; the oldest event is dropped at capacity
pub struct MemoryLogger {
    events: Mutex<VecDeque<LogEvent>>,
    capacity: usize,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::with_capacity(config::get_event_buffer_size())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn events(&self) -> Vec<LogEvent> {
        lock(&self.events).iter().cloned().collect()
    }

    pub fn with_code(&self, code: Code) -> Vec<LogEvent> {
        lock(&self.events)
            .iter()
            .filter(|e| e.code == code)
            .cloned()
            .collect()
    }

    pub fn contains(&self, level: LogLevel, code: Code) -> bool {
        lock(&self.events)
            .iter()
            .any(|e| e.level == level && e.code == code)
    }

    pub fn len(&self) -> usize {
        lock(&self.events).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.events).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = lock(&self.events);
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}

// ============================================================================
// SERVICE
// ============================================================================

/// Filters by level and fans each event out to every sink
pub struct LoggingService {
    sinks: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl LoggingService {
    /// A service with no sinks drops everything
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            sinks: Vec::new(),
            min_level,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn Logger>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// JSON lines on stderr when structured output is on, plain text on
    /// stderr when console output is on, silent otherwise.
    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        let service = Self::new(preferences.min_log_level);
        if preferences.use_structured_logging {
            service.with_sink(Arc::new(WriterLogger::stderr(EventFormat::Json)))
        } else if preferences.enable_console_logging {
            service.with_sink(Arc::new(WriterLogger::stderr(EventFormat::Text)))
        } else {
            service
        }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        !self.sinks.is_empty() && level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            for sink in &self.sinks {
                sink.log(&event);
            }
        }
    }
}
