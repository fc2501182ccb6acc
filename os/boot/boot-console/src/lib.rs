//! # Boot Console Diagnostics
//!
//! Early diagnostics for the boot flow: a [`log`] backend and a raw trace
//! macro, both writing to a console sink the board installs (typically a
//! polled UART transmit routine).
//!
//! ## Output Mechanism
//! ```text
//! log::info!(..)           console_trace!(..)
//!     ↓                          ↓
//! ConsoleLogger            format_args!
//!     ↓                          ↓
//!     └──────► SinkWriter (fmt::Write) ◄──┘
//!                    ↓
//!           board sink: fn(&str)
//! ```
//!
//! Nothing allocates; formatting goes straight to the sink. Until a sink is
//! installed all output is dropped.
//!
//! ## Usage
//! ```rust,no_run
//! use boot_console::ConsoleLogger;
//! use log::{LevelFilter, info};
//!
//! fn uart_write(s: &str) {
//!     // push bytes into the UART FIFO
//! #   let _ = s;
//! }
//!
//! static LOGGER: ConsoleLogger = ConsoleLogger::new(LevelFilter::Debug);
//!
//! boot_console::install_sink(uart_write);
//! LOGGER.init().expect("logger initialization");
//! info!("boot items assembled");
//! ```
//!
//! ## Feature `enabled` (default)
//! Without it the trace macro and the logger compile to no-ops.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;

pub use logger::ConsoleLogger;

/// Console output routine supplied by the board.
pub type ConsoleSink = fn(&str);

#[cfg(feature = "enabled")]
static mut SINK: Option<ConsoleSink> = None;

/// Route console output to `sink`. Call once before any output.
#[cfg(feature = "enabled")]
pub fn install_sink(sink: ConsoleSink) {
    // SAFETY: the boot flow is single-threaded and installs the sink before
    // the first write.
    unsafe {
        SINK = Some(sink);
    }
}

#[cfg(not(feature = "enabled"))]
pub fn install_sink(_sink: ConsoleSink) {}

#[cfg(feature = "enabled")]
#[doc(hidden)]
pub mod console_fmt {
    use core::fmt::{self, Write};

    struct SinkWriter(super::ConsoleSink);

    impl Write for SinkWriter {
        #[inline]
        fn write_str(&mut self, s: &str) -> fmt::Result {
            (self.0)(s);
            Ok(())
        }
    }

    #[doc(hidden)]
    #[inline]
    pub fn console_write(args: fmt::Arguments) {
        // SAFETY: read by value; see `install_sink`.
        let sink = unsafe { super::SINK };
        if let Some(sink) = sink {
            // Ignore errors; this is best-effort debug output.
            let _ = fmt::write(&mut SinkWriter(sink), args);
        }
    }
}

#[cfg(not(feature = "enabled"))]
#[doc(hidden)]
pub mod console_fmt {
    use core::fmt;

    #[doc(hidden)]
    #[inline]
    pub fn console_write(_: fmt::Arguments) {
        // no-op when feature disabled
    }
}

/// Write formatted text to the console sink, bypassing the log framework.
#[macro_export]
macro_rules! console_trace {
    ($($arg:tt)*) => {{
        $crate::console_fmt::console_write(core::format_args!($($arg)*));
    }};
}
