// WafLogCheck - platform/fs.rs
//
// Filesystem entry points for the core readers. Each call opens its own
// handle; the handle is released when the returned value is dropped.

use crate::core::directives;
use crate::core::model::DebugLogSettings;
use crate::core::reverse::ReverseLines;
use crate::util::error::ConfigError;
use std::fs::File;
use std::io;
use std::path::Path;

/// Open `path` and position a reverse line reader at its end.
pub fn reverse_lines(path: &Path, chunk_size: usize) -> io::Result<ReverseLines<File>> {
    let file = File::open(path)?;
    ReverseLines::with_chunk_size(file, chunk_size)
}

/// Read the debug-log directives from the WAF configuration file at `path`.
pub fn read_debug_log_settings(path: &Path) -> Result<DebugLogSettings, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    directives::read_debug_log_settings(io::BufReader::new(file), path)
}
