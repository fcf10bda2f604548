//! ---
//! cb_section: "03-logging"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Context-enriched logging macros."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---

/// Shared body of the level-specific macros. Not part of the public API.
#[doc(hidden)]
#[macro_export]
macro_rules! __bench_event {
    ($level:expr, $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            $level,
            bench = ctx.bench.unwrap_or(""),
            cell = ctx.cell.unwrap_or(""),
            task = ctx.task.unwrap_or(""),
            tick = ctx.tick.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an informational log enriched with bench context.
#[macro_export]
macro_rules! bench_info {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__bench_event!(tracing::Level::INFO, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__bench_event!(tracing::Level::INFO, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a debug log enriched with bench context.
#[macro_export]
macro_rules! bench_debug {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__bench_event!(tracing::Level::DEBUG, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__bench_event!(tracing::Level::DEBUG, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a warning enriched with bench context.
#[macro_export]
macro_rules! bench_warn {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__bench_event!(tracing::Level::WARN, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__bench_event!(tracing::Level::WARN, $crate::LogContext::default(), $($arg)+)
    };
}
