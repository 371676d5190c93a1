// WafLogCheck - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr, optionally mirrored to a file from [logging] file.
// Stdout is reserved for the collected log lines.

use std::sync::Mutex;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the level from config.toml (if present).
/// `log_file` is the optional log file path from config.toml.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
pub fn init(debug_flag: bool, config_level: Option<&str>, log_file: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    // A log file that cannot be opened degrades to stderr only; the failure
    // is reported once the subscriber is up.
    let mut file_error = None;
    let writer = match log_file {
        Some(path) => match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
        {
            Ok(file) => BoxMakeWriter::new(std::io::stderr.and(Mutex::new(file))),
            Err(e) => {
                file_error = Some((path.to_string(), e));
                BoxMakeWriter::new(std::io::stderr)
            }
        },
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .init();

    if let Some((path, e)) = file_error {
        tracing::warn!(file = %path, error = %e, "Could not open log file; logging to stderr only");
    }

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        "Logging initialised"
    );
}

/// Shorten `line` to at most `DEBUG_MAX_LINE_PREVIEW` characters for
/// inclusion in debug output.
pub fn preview(line: &str) -> &str {
    match line
        .char_indices()
        .nth(super::constants::DEBUG_MAX_LINE_PREVIEW)
    {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
