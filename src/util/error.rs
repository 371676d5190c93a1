// WafLogCheck - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; every error keeps its source.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all WafLogCheck operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum WafLogCheckError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Reverse scan of the debug log failed.
    Scan(ScanError),

    /// A log expectation could not be built.
    Expectation(ExpectationError),
}

impl fmt::Display for WafLogCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Scan(e) => write!(f, "Scan error: {e}"),
            Self::Expectation(e) => write!(f, "Expectation error: {e}"),
        }
    }
}

impl std::error::Error for WafLogCheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Scan(e) => Some(e),
            Self::Expectation(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading and the WAF directive check.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading a config file.
    Io { path: PathBuf, source: io::Error },

    /// Required WAF directives are absent (or only present as comments).
    MissingDirectives {
        path: PathBuf,
        missing: Vec<&'static str>,
    },

    /// A configured regex pattern is invalid.
    InvalidRegex {
        field: &'static str,
        pattern: String,
        source: regex::Error,
    },

    /// A configured regex pattern exceeds the maximum allowed length.
    RegexTooLong {
        field: &'static str,
        length: usize,
        max_length: usize,
    },

    /// The timestamp pattern has no capture group to extract the date from.
    MissingCaptureGroup { field: &'static str, pattern: String },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// Logs were requested before the test start time was recorded.
    StartNotRecorded,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
            Self::MissingDirectives { path, missing } => write!(
                f,
                "Please make sure that {} {} set in '{}'",
                missing.join(" & "),
                if missing.len() == 1 { "is" } else { "are" },
                path.display()
            ),
            Self::InvalidRegex {
                field,
                pattern,
                source,
            } => write!(f, "Invalid regex in '{field}' ('{pattern}'): {source}"),
            Self::RegexTooLong {
                field,
                length,
                max_length,
            } => write!(
                f,
                "Regex in '{field}' is {length} chars, exceeds maximum of {max_length}"
            ),
            Self::MissingCaptureGroup { field, pattern } => write!(
                f,
                "Regex in '{field}' ('{pattern}') must have a capture group around the timestamp"
            ),
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::StartNotRecorded => {
                write!(f, "Test start time was not recorded before reading logs")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::InvalidRegex { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for WafLogCheckError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Scan errors
// ---------------------------------------------------------------------------

/// Errors raised while scanning the debug log backwards.
#[derive(Debug)]
pub enum ScanError {
    /// I/O error while reading the log file.
    Io { file: PathBuf, source: io::Error },

    /// A line matched the timestamp pattern but the captured text does not
    /// fit the configured format.
    TimestampParse {
        file: PathBuf,
        line: String,
        raw_timestamp: String,
        format: String,
    },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { file, source } => {
                write!(f, "'{}': I/O error: {source}", file.display())
            }
            Self::TimestampParse {
                file,
                line,
                raw_timestamp,
                format,
            } => write!(
                f,
                "'{}': cannot parse timestamp '{raw_timestamp}' with format '{format}' \
                 in line: {line}",
                file.display()
            ),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ScanError> for WafLogCheckError {
    fn from(e: ScanError) -> Self {
        Self::Scan(e)
    }
}

// ---------------------------------------------------------------------------
// Expectation errors
// ---------------------------------------------------------------------------

/// Errors related to building log expectations.
#[derive(Debug)]
pub enum ExpectationError {
    /// User-provided regex is invalid.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },
}

impl fmt::Display for ExpectationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex { pattern, source } => {
                write!(f, "Invalid expectation regex '{pattern}': {source}")
            }
        }
    }
}

impl std::error::Error for ExpectationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
        }
    }
}

impl From<ExpectationError> for WafLogCheckError {
    fn from(e: ExpectationError) -> Self {
        Self::Expectation(e)
    }
}

/// Convenience type alias for WafLogCheck results.
pub type Result<T> = std::result::Result<T, WafLogCheckError>;
