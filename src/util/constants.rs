// WafLogCheck - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "WafLogCheck";

/// Application identifier used for config directories.
pub const APP_ID: &str = "WafLogCheck";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// WAF configuration directives
// =============================================================================

/// Default location of the ModSecurity configuration file.
pub const DEFAULT_WAF_CONF_FILE: &str = "/etc/modsecurity/modsecurity.conf";

/// Directive naming the debug log file path.
pub const DIRECTIVE_DEBUG_LOG: &str = "SecDebugLog";

/// Directive setting the debug log verbosity.
pub const DIRECTIVE_DEBUG_LOG_LEVEL: &str = "SecDebugLogLevel";

/// Highest verbosity accepted by `SecDebugLogLevel`.
pub const MAX_DEBUG_LOG_LEVEL: u8 = 9;

/// Comment marker for WAF configuration lines.
pub const CONF_COMMENT_MARKER: char = '#';

// =============================================================================
// Debug log timestamp recognition
// =============================================================================

/// Default pattern recognising the timestamp header of a ModSecurity debug
/// log line, e.g. `[15/Jan/2024:14:30:22 +0000] [host/sid#...]`.
/// Capture group 1 holds the timestamp text.
pub const DEFAULT_LOG_DATE_REGEX: &str =
    r"^\[(\d{2}/\w{3}/\d{4}:\d{2}:\d{2}:\d{2} [+-]\d{4})\]";

/// Default `chrono` format applied after the suffix is trimmed.
pub const DEFAULT_LOG_DATE_FORMAT: &str = "%d/%b/%Y:%H:%M:%S";

/// Number of trailing characters dropped from the captured timestamp before
/// parsing. Six covers the ` +0000` zone offset of the default layout.
pub const DEFAULT_TIMESTAMP_SUFFIX_LEN: usize = 6;

/// Upper bound on the suffix length (prevents configuration mistakes).
pub const MAX_TIMESTAMP_SUFFIX_LEN: usize = 64;

/// Maximum regex pattern length to prevent ReDoS.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

// =============================================================================
// Reverse reader limits
// =============================================================================

/// Default read chunk size in bytes for the backward scan.
pub const DEFAULT_REVERSE_CHUNK_SIZE: usize = 64 * 1024; // 64 KB

/// Minimum configurable chunk size. One byte is the degenerate
/// byte-at-a-time scan and is allowed.
pub const MIN_REVERSE_CHUNK_SIZE: usize = 1;

/// Maximum configurable chunk size.
pub const MAX_REVERSE_CHUNK_SIZE: usize = 16 * 1024 * 1024; // 16 MB

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// CLI exit codes
// =============================================================================

/// A log expectation did not hold.
pub const EXIT_EXPECTATION_FAILED: i32 = 1;

/// Configuration, I/O, or timestamp parse failure.
pub const EXIT_ERROR: i32 = 2;
