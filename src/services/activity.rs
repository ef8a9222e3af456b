//! Activity log for catalog operations

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Info,
    Warning,
    Error,
}

/// One structured catalog event
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    pub level: ActivityLevel,
    /// Operation name, e.g. `update`
    pub operation: &'static str,
    pub book_id: Option<String>,
    pub count: Option<usize>,
    pub message: String,
}

impl ActivityEvent {
    fn new(level: ActivityLevel, operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            operation,
            book_id: None,
            count: None,
            message: message.into(),
        }
    }

    pub fn info(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ActivityLevel::Info, operation, message)
    }

    pub fn warning(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ActivityLevel::Warning, operation, message)
    }

    pub fn error(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ActivityLevel::Error, operation, message)
    }

    /// Ids are kept as received, so unparseable ids still show up in logs
    pub fn book(mut self, id: impl ToString) -> Self {
        self.book_id = Some(id.to_string());
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Sink for catalog events. Write-only: nothing reads events back into
/// business logic.
pub trait ActivityLog: Send + Sync {
    fn record(&self, event: ActivityEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActivityLog;

impl ActivityLog for TracingActivityLog {
    fn record(&self, event: ActivityEvent) {
        let ActivityEvent {
            level,
            operation,
            book_id,
            count,
            message,
        } = event;
        let book_id = book_id.as_deref();

        match level {
            ActivityLevel::Info => {
                tracing::info!(target: "katalog::activity", operation, book_id, count, "{}", message)
            }
            ActivityLevel::Warning => {
                tracing::warn!(target: "katalog::activity", operation, book_id, count, "{}", message)
            }
            ActivityLevel::Error => {
                tracing::error!(target: "katalog::activity", operation, book_id, count, "{}", message)
            }
        }
    }
}

/// Keeps events in memory so tests can inspect them
#[derive(Debug, Default)]
pub struct MemoryActivityLog {
    events: Mutex<Vec<ActivityEvent>>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ActivityEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ActivityLog for MemoryActivityLog {
    fn record(&self, event: ActivityEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
