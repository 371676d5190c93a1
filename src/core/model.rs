// WafLogCheck - core/model.rs
//
// Core data types shared across the core and app layers.

use crate::util::constants;
use serde::Serialize;
use std::path::PathBuf;

/// Explicit configuration for a log checker.
///
/// Built once from config.toml plus CLI overrides and handed to
/// `LogChecker::new`; nothing reads configuration from global state.
#[derive(Debug, Clone, PartialEq)]
pub struct LogCheckConfig {
    /// WAF configuration file holding the debug-log directives.
    pub waf_conf_file: PathBuf,
    /// Pattern recognising a timestamped entry header; group 1 is the date.
    pub log_date_regex: String,
    /// `chrono` format for the captured date after the suffix is trimmed.
    pub log_date_format: String,
    /// Trailing characters dropped from the captured date before parsing.
    pub timestamp_suffix_len: usize,
    /// Chunk size for the backward scan.
    pub chunk_size: usize,
}

impl Default for LogCheckConfig {
    fn default() -> Self {
        Self {
            waf_conf_file: PathBuf::from(constants::DEFAULT_WAF_CONF_FILE),
            log_date_regex: constants::DEFAULT_LOG_DATE_REGEX.to_string(),
            log_date_format: constants::DEFAULT_LOG_DATE_FORMAT.to_string(),
            timestamp_suffix_len: constants::DEFAULT_TIMESTAMP_SUFFIX_LEN,
            chunk_size: constants::DEFAULT_REVERSE_CHUNK_SIZE,
        }
    }
}

/// Debug-log settings extracted from the WAF configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugLogSettings {
    /// Value of `SecDebugLog`.
    pub log_file: PathBuf,
    /// Value of `SecDebugLogLevel` (0-9).
    pub level: u8,
}

/// Outcome of a reverse scan with a timestamp cutoff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectResult {
    /// Lines at or after the cutoff, most recent first.
    pub lines: Vec<String>,
    /// Lines read from the log (including the stopping line).
    pub lines_scanned: u64,
    /// Lines without a recognised timestamp header.
    pub lines_skipped: u64,
    /// True when the scan ended on a line older than the cutoff rather than
    /// at the start of the file.
    pub stopped_at_cutoff: bool,
}

/// Result of evaluating a `LogExpectation` against collected lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    /// Human-readable explanation, set when the verdict failed.
    pub reason: Option<String>,
    /// Line that satisfied `log_contains` or violated `no_log_contains`.
    pub line: Option<String>,
}

impl Verdict {
    pub fn pass(line: Option<String>) -> Self {
        Self {
            passed: true,
            reason: None,
            line,
        }
    }

    pub fn fail(reason: String, line: Option<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason),
            line,
        }
    }
}
