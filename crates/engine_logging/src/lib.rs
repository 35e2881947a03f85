#![deny(missing_docs)]
//! Shared logging utilities for the transcribe workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message is
//! prefixed with the event-loop tick of the calling thread so that log lines
//! from one render interval can be grouped together.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Thread-local storage for the current event-loop tick count.
    static LOOP_TICK: Cell<u64> = const { Cell::new(0) };
}

/// Sets the event-loop tick count for the current thread.
/// The application loop calls this once per render tick.
pub fn set_loop_tick(tick: u64) {
    LOOP_TICK.with(|v| v.set(tick));
}

/// Retrieves the event-loop tick count for the current thread.
/// Returns 0 if the tick has not been set.
pub fn loop_tick() -> u64 {
    LOOP_TICK.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("[tick {}] {}", $crate::loop_tick(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("[tick {}] {}", $crate::loop_tick(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("[tick {}] {}", $crate::loop_tick(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("[tick {}] {}", $crate::loop_tick(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("[tick {}] {}", $crate::loop_tick(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_is_per_thread() {
        set_loop_tick(7);
        assert_eq!(loop_tick(), 7);

        let other = std::thread::spawn(loop_tick).join().unwrap();
        assert_eq!(other, 0);
    }

    #[test]
    fn macros_accept_format_arguments() {
        initialize_for_tests();
        engine_debug!("job {} scheduled in {}s", 1, 10);
        engine_info!("plain message");
    }
}
