// WafLogCheck - core/directives.rs
//
// Fail-fast check of the WAF configuration: the debug log path and the
// debug log level must both be configured before any log can be read.
// Core layer: accepts BufRead values; the caller opens the file.

use crate::core::model::DebugLogSettings;
use crate::util::constants::{
    CONF_COMMENT_MARKER, DIRECTIVE_DEBUG_LOG, DIRECTIVE_DEBUG_LOG_LEVEL, MAX_DEBUG_LOG_LEVEL,
};
use crate::util::error::ConfigError;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Scan `reader` for `SecDebugLog` and `SecDebugLogLevel`.
///
/// Comment lines are ignored. Directive names compare case-insensitively and
/// the first occurrence of each wins. Reading stops as soon as both are found.
/// `conf_path` is used for error context only.
pub fn read_debug_log_settings<R: BufRead>(
    reader: R,
    conf_path: &Path,
) -> Result<DebugLogSettings, ConfigError> {
    let mut log_file: Option<PathBuf> = None;
    let mut level: Option<u8> = None;

    for line in reader.lines() {
        let line = line.map_err(|source| ConfigError::Io {
            path: conf_path.to_path_buf(),
            source,
        })?;

        let Some((name, value)) = split_directive(&line) else {
            continue;
        };

        if log_file.is_none() && name.eq_ignore_ascii_case(DIRECTIVE_DEBUG_LOG) {
            if let Some(v) = value {
                tracing::debug!(path = %v, "Found debug log directive");
                log_file = Some(PathBuf::from(v));
            }
        } else if level.is_none() && name.eq_ignore_ascii_case(DIRECTIVE_DEBUG_LOG_LEVEL) {
            if let Some(v) = value {
                level = Some(parse_level(v)?);
            }
        }

        if log_file.is_some() && level.is_some() {
            break;
        }
    }

    match (log_file, level) {
        (Some(log_file), Some(level)) => {
            if level == 0 {
                tracing::warn!(
                    conf = %conf_path.display(),
                    "{DIRECTIVE_DEBUG_LOG_LEVEL} is 0; the debug log will stay empty"
                );
            }
            Ok(DebugLogSettings { log_file, level })
        }
        (log_file, level) => {
            let mut missing = Vec::new();
            if log_file.is_none() {
                missing.push(DIRECTIVE_DEBUG_LOG);
            }
            if level.is_none() {
                missing.push(DIRECTIVE_DEBUG_LOG_LEVEL);
            }
            Err(ConfigError::MissingDirectives {
                path: conf_path.to_path_buf(),
                missing,
            })
        }
    }
}

/// Split a configuration line into directive name and argument (the rest of
/// the line).
/// Returns `None` for blank and comment lines. Double quotes around the
/// argument are removed.
fn split_directive(line: &str) -> Option<(&str, Option<&str>)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(CONF_COMMENT_MARKER) {
        return None;
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let name = parts.next()?;
    let value = parts
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .unwrap_or(v)
        });
    Some((name, value))
}

fn parse_level(value: &str) -> Result<u8, ConfigError> {
    value
        .parse::<u8>()
        .ok()
        .filter(|l| *l <= MAX_DEBUG_LOG_LEVEL)
        .ok_or_else(|| ConfigError::ValueOutOfRange {
            field: DIRECTIVE_DEBUG_LOG_LEVEL.to_string(),
            value: value.to_string(),
            expected: format!("an integer from 0 to {MAX_DEBUG_LOG_LEVEL}"),
        })
}
