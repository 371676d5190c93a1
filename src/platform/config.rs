// WafLogCheck - platform/config.rs
//
// Platform config directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::LogCheckConfig;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for WafLogCheck configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/waflogcheck/ or %APPDATA%\WafLogCheck\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[waf]` section.
    pub waf: WafSection,
    /// `[log]` section.
    pub log: LogSection,
    /// `[reader]` section.
    pub reader: ReaderSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[waf]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct WafSection {
    /// WAF configuration file holding SecDebugLog / SecDebugLogLevel.
    pub conf_file: Option<String>,
}

/// `[log]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Timestamp header pattern; capture group 1 is the date.
    pub date_regex: Option<String>,
    /// chrono format of the captured date.
    pub date_format: Option<String>,
    /// Trailing characters dropped before parsing.
    pub timestamp_suffix_len: Option<usize>,
}

/// `[reader]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ReaderSection {
    /// Backward read chunk size in bytes.
    pub chunk_size_bytes: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated configuration derived from `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Settings handed to the log checker.
    pub check: LogCheckConfig,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

/// Load and validate the config file at `config_path`.
///
/// A missing file yields defaults with no warnings. Unreadable or
/// unparseable files are errors. Out-of-range values are reported as
/// warnings and replaced by defaults.
pub fn load_config(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return Ok((AppConfig::default(), Vec::new()));
    }

    let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
        path: config_path.to_path_buf(),
        source,
    })?;

    let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    Ok(validate(raw))
}

/// Validate each field against named constants, accumulating warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    // -- WAF: conf_file --
    if let Some(file) = raw.waf.conf_file {
        if file.trim().is_empty() {
            warnings.push(format!(
                "[waf] conf_file is empty. Using default ({}).",
                constants::DEFAULT_WAF_CONF_FILE
            ));
        } else {
            config.check.waf_conf_file = PathBuf::from(file);
        }
    }

    // -- Log: date_regex / date_format --
    // Compiled later by the checker, where an invalid pattern is fatal.
    if let Some(regex) = raw.log.date_regex {
        config.check.log_date_regex = regex;
    }
    if let Some(format) = raw.log.date_format {
        if format.is_empty() {
            warnings.push(format!(
                "[log] date_format is empty. Using default ({}).",
                constants::DEFAULT_LOG_DATE_FORMAT
            ));
        } else {
            config.check.log_date_format = format;
        }
    }

    // -- Log: timestamp_suffix_len --
    if let Some(len) = raw.log.timestamp_suffix_len {
        if len <= constants::MAX_TIMESTAMP_SUFFIX_LEN {
            config.check.timestamp_suffix_len = len;
        } else {
            warnings.push(format!(
                "[log] timestamp_suffix_len = {len} is out of range (0-{}). Using default ({}).",
                constants::MAX_TIMESTAMP_SUFFIX_LEN,
                constants::DEFAULT_TIMESTAMP_SUFFIX_LEN,
            ));
        }
    }

    // -- Reader: chunk_size_bytes --
    if let Some(size) = raw.reader.chunk_size_bytes {
        if (constants::MIN_REVERSE_CHUNK_SIZE..=constants::MAX_REVERSE_CHUNK_SIZE).contains(&size)
        {
            config.check.chunk_size = size;
        } else {
            warnings.push(format!(
                "[reader] chunk_size_bytes = {size} is out of range ({}-{}). Using default ({}).",
                constants::MIN_REVERSE_CHUNK_SIZE,
                constants::MAX_REVERSE_CHUNK_SIZE,
                constants::DEFAULT_REVERSE_CHUNK_SIZE,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    (config, warnings)
}
