//! Host tool for boot item containers and sysconfig images.
//!
//! ```text
//! bootdata pack <board> <out> [partition-table] [key=value ...]
//! bootdata dump <container>
//! bootdata sysconfig <out> <default-slot> [oneshot-slot]
//! bootdata bootconfig <sysconfig-image> <slot-a> <slot-b> <slot-r>
//! ```
//!
//! Diagnostics go to stderr; set `BOOTDATA_LOG` (e.g. `debug`) to change the
//! level.

mod commands;
mod error;
mod files;

use boot_console::ConsoleLogger;
use error::ToolError;
use log::LevelFilter;
use std::env;
use std::process::ExitCode;

const USAGE: &str = "bootdata <pack|dump|sysconfig|bootconfig> ...";

fn stderr_sink(s: &str) {
    eprint!("{s}");
}

fn init_logging() {
    let level = env::var("BOOTDATA_LOG")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(LevelFilter::Info);
    let logger: &'static ConsoleLogger = Box::leak(Box::new(ConsoleLogger::new(level)));
    boot_console::install_sink(stderr_sink);
    if logger.init().is_err() {
        eprintln!("logger already initialized");
    }
}

fn run(args: &[String]) -> Result<(), ToolError> {
    let Some((command, rest)) = args.split_first() else {
        return Err(ToolError::Usage(USAGE));
    };
    match command.as_str() {
        "pack" => commands::pack(rest),
        "dump" => commands::dump(rest),
        "sysconfig" => commands::sysconfig(rest),
        "bootconfig" => commands::bootconfig(rest),
        _ => Err(ToolError::Usage(USAGE)),
    }
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
