//! Logging utilities for structured tracing

use std::time::{Duration, Instant};
use tracing::Span;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("slack_broadcast={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Logger handle passed into each component at construction.
///
/// Wraps a span so every event a component emits carries its name, and so
/// callers can scope a whole broadcast under one parent span.
#[derive(Debug, Clone)]
pub struct Logger {
    span: Span,
}

impl Logger {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    /// Root logger for one broadcast invocation.
    pub fn for_broadcast(list_name: &str, dry_run: bool) -> Self {
        Self::new(tracing::info_span!("broadcast", list = %list_name, dry_run))
    }

    /// Child logger for a named component.
    pub fn component(&self, name: &'static str) -> Self {
        Self::new(tracing::debug_span!(parent: &self.span, "component", component = name))
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Run `f` with this logger's span entered.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Span::none())
    }
}

/// Track operation timing and log on drop
pub struct Timer {
    start: Instant,
    operation: String,
}

impl Timer {
    /// Create a new timer for an operation
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            operation: operation.into(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration_ms = self.elapsed().as_millis() as u64;
        tracing::debug!(
            operation = %self.operation,
            duration_ms = duration_ms,
            "Operation completed"
        );
    }
}

/// Log an error with structured context
pub fn log_error(operation: &str, error: &impl std::error::Error) {
    tracing::error!(
        operation = %operation,
        error = %error,
        error_kind = std::any::type_name_of_val(error),
        "Operation failed"
    );
}
