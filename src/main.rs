// WafLogCheck - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and CLI overrides
// 3. Logging initialisation (debug mode support)
// 4. WAF configuration check, reverse scan, and expectation evaluation
//
// Stdout carries only the collected lines (or JSON); diagnostics go to stderr.

use waf_logcheck::app::checker::LogChecker;
use waf_logcheck::core::expectation::LogExpectation;
use waf_logcheck::core::model::{CollectResult, Verdict};
use waf_logcheck::platform;
use waf_logcheck::util::error::WafLogCheckError;
use waf_logcheck::util::{self, constants};

use chrono::NaiveDateTime;
use clap::Parser;
use std::path::PathBuf;

/// WafLogCheck - debug log lines written since a test stage started.
///
/// Reads the WAF debug log backwards and prints every timestamped entry at or
/// after --since, most recent first. Optional expectations turn the run into
/// a pass/fail check.
#[derive(Parser, Debug)]
#[command(name = "waf-logcheck", version, about)]
struct Cli {
    /// Stage start time ("YYYY-MM-DD HH:MM:SS[.ffffff]" local time, or RFC 3339).
    #[arg(short = 's', long = "since", value_parser = parse_since)]
    since: NaiveDateTime,

    /// Regex that at least one collected line must match.
    #[arg(long = "contains")]
    contains: Option<String>,

    /// Regex that no collected line may match.
    #[arg(long = "not-contains")]
    not_contains: Option<String>,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// WAF configuration file holding SecDebugLog / SecDebugLogLevel.
    #[arg(long = "waf-conf")]
    waf_conf: Option<PathBuf>,

    /// Timestamp header pattern; capture group 1 is the date.
    #[arg(long = "date-regex")]
    date_regex: Option<String>,

    /// chrono format of the captured date.
    #[arg(long = "date-format")]
    date_format: Option<String>,

    /// Trailing characters dropped from the captured date before parsing.
    #[arg(long = "suffix-len")]
    suffix_len: Option<usize>,

    /// Print the result as JSON instead of one line per entry.
    #[arg(long = "json")]
    json: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Accept the naive forms first (the debug log is in local time), then
/// RFC 3339 converted to local time.
fn parse_since(s: &str) -> Result<NaiveDateTime, String> {
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ndt);
        }
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Local).naive_local())
        .map_err(|e| format!("cannot parse '{s}' as a date-time: {e}"))
}

#[derive(serde::Serialize)]
struct JsonReport<'a> {
    log_file: String,
    since: String,
    #[serde(flatten)]
    result: &'a CollectResult,
    verdict: Option<&'a Verdict>,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform::config::PlatformPaths::resolve().config_file());

    let (app_config, warnings) = match platform::config::load_config(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(constants::EXIT_ERROR);
        }
    };

    util::logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "WafLogCheck starting"
    );

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    // CLI flags override config.toml.
    let mut check_config = app_config.check;
    if let Some(path) = cli.waf_conf {
        check_config.waf_conf_file = path;
    }
    if let Some(regex) = cli.date_regex {
        check_config.log_date_regex = regex;
    }
    if let Some(format) = cli.date_format {
        check_config.log_date_format = format;
    }
    if let Some(len) = cli.suffix_len {
        check_config.timestamp_suffix_len = len;
    }

    let expectation =
        match LogExpectation::new(cli.contains.as_deref(), cli.not_contains.as_deref()) {
            Ok(e) => e,
            Err(e) => fail(&WafLogCheckError::from(e)),
        };

    let mut checker = match LogChecker::new(check_config) {
        Ok(c) => c,
        Err(e) => fail(&e),
    };
    checker.set_start(cli.since);

    let (verdict, result) = match checker.check(&expectation) {
        Ok(out) => out,
        Err(e) => fail(&e),
    };

    if cli.json {
        let report = JsonReport {
            log_file: checker.log_file().display().to_string(),
            since: cli.since.to_string(),
            result: &result,
            verdict: (!expectation.is_empty()).then_some(&verdict),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialise report");
                std::process::exit(constants::EXIT_ERROR);
            }
        }
    } else {
        for line in &result.lines {
            println!("{line}");
        }
    }

    if !verdict.passed {
        if let Some(reason) = &verdict.reason {
            eprintln!("FAILED: {reason}");
        }
        if let Some(line) = &verdict.line {
            eprintln!("  offending line: {line}");
        }
        std::process::exit(constants::EXIT_EXPECTATION_FAILED);
    }
}

fn fail(e: &WafLogCheckError) -> ! {
    tracing::error!(error = %e, "Log check aborted");
    eprintln!("Error: {e}");
    std::process::exit(constants::EXIT_ERROR);
}
