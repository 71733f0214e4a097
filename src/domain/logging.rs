use std::fmt;
use std::sync::OnceLock;

use derive_more::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum LogLevel {
    #[display(fmt = "TRACE")]
    Trace,
    #[display(fmt = "DEBUG")]
    Debug,
    #[display(fmt = " INFO")]
    Info,
    #[display(fmt = " WARN")]
    Warn,
    #[display(fmt = "ERROR")]
    Error,
}

/// Part of the drawing layer a log line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LogComponent {
    #[display(fmt = "store")]
    Store,
    #[display(fmt = "controller")]
    Controller,
    #[display(fmt = "canvas")]
    Canvas,
    #[display(fmt = "api")]
    Api,
}

/// One log line: a message plus `name=value` context such as the chart
/// key or the size of a rejected payload.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: u64,
    pub level: LogLevel,
    pub component: LogComponent,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: LogComponent, message: impl Into<String>) -> Self {
        Self {
            timestamp: now_ms(),
            level,
            component,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((name, value.to_string()));
        self
    }
}

/// `LEVEL component | message | name=value ...`, without the timestamp.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} | {}", self.level, self.component, self.message)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            let sep = if i == 0 { " | " } else { " " };
            write!(f, "{sep}{name}={value}")?;
        }
        Ok(())
    }
}

/// Wall clock in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

pub trait Logger: Send + Sync {
    fn log(&self, entry: LogEntry);

    fn debug(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Debug, component, message));
    }

    fn info(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Info, component, message));
    }

    fn warn(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Warn, component, message));
    }

    fn error(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Error, component, message));
    }
}

static GLOBAL_LOGGER: OnceLock<Box<dyn Logger>> = OnceLock::new();
static GLOBAL_CLOCK: OnceLock<Box<dyn Clock>> = OnceLock::new();

/// Install the global logger. Later calls are ignored.
pub fn init_logger(logger: Box<dyn Logger>) {
    let _ = GLOBAL_LOGGER.set(logger);
}

/// Install the global clock. Later calls are ignored.
pub fn init_clock(clock: Box<dyn Clock>) {
    let _ = GLOBAL_CLOCK.set(clock);
}

pub fn get_logger() -> &'static dyn Logger {
    GLOBAL_LOGGER.get().map(|logger| logger.as_ref()).unwrap_or(&NoOpLogger)
}

pub fn now_ms() -> u64 {
    GLOBAL_CLOCK.get().map_or_else(next_tick, |clock| clock.now_ms())
}

struct NoOpLogger;
impl Logger for NoOpLogger {
    fn log(&self, _entry: LogEntry) {}
}

/// Stand-in clock until a real one is installed: strictly increasing, so
/// ids minted in native tests stay distinct.
fn next_tick() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static TICKS: AtomicU64 = AtomicU64::new(0);
    TICKS.fetch_add(1, Ordering::Relaxed)
}

#[macro_export]
macro_rules! log_trace {
    ($component:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::domain::logging::get_logger().log($crate::domain::logging::LogEntry::new(
                $crate::domain::logging::LogLevel::Trace,
                $component,
                format!($($arg)*),
            ));
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($component:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::domain::logging::get_logger().debug($component, &format!($($arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_renders_fields_after_the_message() {
        let entry = LogEntry::new(LogLevel::Warn, LogComponent::Store, "unreadable drawings")
            .with_field("key", "omar_terminal_drawings")
            .with_field("bytes", 42);
        assert_eq!(
            entry.to_string(),
            " WARN store | unreadable drawings | key=omar_terminal_drawings bytes=42"
        );
    }

    #[test]
    fn entry_without_fields_ends_at_the_message() {
        let entry = LogEntry::new(LogLevel::Debug, LogComponent::Controller, "tool off");
        assert_eq!(entry.to_string(), "DEBUG controller | tool off");
    }

    #[test]
    fn fallback_clock_never_repeats() {
        let first = now_ms();
        assert!(now_ms() > first);
    }
}
