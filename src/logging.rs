//! Log output for the binary

use flexi_logger::{DeferredNow, FlexiLoggerError, Logger, LoggerHandle};
use log::Record;

/// Start logging to stdout at `level`; `RUST_LOG` takes precedence when set
///
/// The returned handle must be kept alive for as long as logging is needed.
pub fn init_logger(level: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(level)?
        .log_to_stdout()
        .format(line_format)
        .start()
}

fn line_format(
    writer: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(
        writer,
        "[{}][{}][{}:{}] {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.line().unwrap_or(0),
        record.args()
    )
}
