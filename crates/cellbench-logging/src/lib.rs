//! ---
//! cb_section: "03-logging"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Structured logging context and macros."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Structured logging helpers shared by the bench crates and binaries.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber suitable for development.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Test bench name.
    pub bench: Option<&'a str>,
    /// Cell identifier associated with the log event.
    pub cell: Option<&'a str>,
    /// Task identifier associated with the log event.
    pub task: Option<&'a str>,
    /// Simulation tick.
    pub tick: Option<u64>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a bench name.
    pub fn with_bench(mut self, bench: &'a str) -> Self {
        self.bench = Some(bench);
        self
    }

    /// Attach a cell identifier.
    pub fn with_cell(mut self, cell: &'a str) -> Self {
        self.cell = Some(cell);
        self
    }

    /// Attach a task identifier.
    pub fn with_task(mut self, task: &'a str) -> Self {
        self.task = Some(task);
        self
    }

    /// Attach a tick value.
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }
}

/// Outcome attached to bench lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchEventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation was refused or aborted.
    Fault,
}

impl BenchEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            BenchEventOutcome::Success => "success",
            BenchEventOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized bench lifecycle event (bench configured, task started,
/// emergency stop, ...).
pub fn log_bench_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: BenchEventOutcome,
) {
    let ctx = context.cloned().unwrap_or_default();
    match outcome {
        BenchEventOutcome::Success => tracing::event!(
            Level::INFO,
            event,
            outcome = outcome.as_str(),
            bench = ctx.bench.unwrap_or(""),
            cell = ctx.cell.unwrap_or(""),
            task = ctx.task.unwrap_or(""),
            tick = ctx.tick.unwrap_or_default(),
            message = %message
        ),
        BenchEventOutcome::Fault => tracing::event!(
            Level::ERROR,
            event,
            outcome = outcome.as_str(),
            bench = ctx.bench.unwrap_or(""),
            cell = ctx.cell.unwrap_or(""),
            task = ctx.task.unwrap_or(""),
            tick = ctx.tick.unwrap_or_default(),
            message = %message
        ),
    }
}
