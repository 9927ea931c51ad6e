//! Structured logging macros.
//!
//! Every event carries a `subsystem` field so log pipelines can split the
//! account store, ledger, engine, rollback and service streams.

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (error, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a committed or rejected account mutation with the standard fields.
#[macro_export]
macro_rules! log_mutation_event {
    ($level:ident, $subsystem:expr, $msg:expr, $user_id:expr, $operation:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            user_id = %$user_id,
            operation = %$operation,
            $($($field)*,)?
            $msg
        )
    };
}
