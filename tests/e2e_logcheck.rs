// WafLogCheck - tests/e2e_logcheck.rs
//
// End-to-end tests for the log checker pipeline.
//
// These tests exercise the real filesystem, a real WAF configuration file,
// the real backward reader, and real chrono timestamp parsing. The path is
// the one a stage runner takes: validate modsecurity.conf, record the stage
// start, read the debug log, evaluate expectations.

use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use waf_logcheck::app::checker::LogChecker;
use waf_logcheck::core::expectation::LogExpectation;
use waf_logcheck::core::model::LogCheckConfig;
use waf_logcheck::platform;
use waf_logcheck::util::error::{ConfigError, ScanError, WafLogCheckError};

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
}

/// Write a modsecurity.conf pointing at `log` and return a config using it.
fn write_conf(dir: &Path, log: &Path) -> LogCheckConfig {
    let conf = dir.join("modsecurity.conf");
    fs::write(
        &conf,
        format!(
            "# ModSecurity configuration\n\
             SecRuleEngine On\n\
             #SecDebugLog /tmp/old_debug.log\n\
             SecDebugLog {}\n\
             SecDebugLogLevel 4\n",
            log.display()
        ),
    )
    .unwrap();
    LogCheckConfig {
        waf_conf_file: conf,
        ..Default::default()
    }
}

// =============================================================================
// Reverse reader E2E
// =============================================================================

/// Reversing the backward read reproduces a forward read of the fixture.
#[test]
fn e2e_reverse_read_round_trips_fixture() {
    let path = fixture("modsec_debug_sample.log");
    let forward: Vec<String> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();

    for chunk_size in [1, 13, 64 * 1024] {
        let mut backward: Vec<String> = platform::fs::reverse_lines(&path, chunk_size)
            .unwrap()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(backward.len(), forward.len());
        backward.reverse();
        assert_eq!(backward, forward, "chunk size {chunk_size}");
    }
}

/// An empty debug log yields no lines.
#[test]
fn e2e_empty_log_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.log");
    fs::write(&path, "").unwrap();
    assert_eq!(platform::fs::reverse_lines(&path, 16).unwrap().count(), 0);
}

// =============================================================================
// Checker E2E
// =============================================================================

/// A stage that started at 10:00:00.5 sees the three timestamped entries of
/// the blocked request and skips the continuation lines between them.
#[test]
fn e2e_fixture_collects_stage_lines() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_conf(dir.path(), &fixture("modsec_debug_sample.log"));

    let mut checker = LogChecker::new(config).unwrap();
    assert_eq!(checker.settings().level, 4);
    checker.set_start(at("2024-01-15 10:00:00.500"));

    let result = checker.scan().unwrap();
    assert_eq!(result.lines.len(), 3);
    assert!(result.lines[0].contains("Access denied with code 403"));
    assert!(result.lines[1].contains("Recipe: Invoking rule"));
    assert!(result.lines[2].contains("Initialising transaction"));
    assert_eq!(result.lines_skipped, 2);
    assert!(result.stopped_at_cutoff);
}

/// Expectations evaluated end to end against the fixture.
#[test]
fn e2e_fixture_expectations() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_conf(dir.path(), &fixture("modsec_debug_sample.log"));
    let mut checker = LogChecker::new(config).unwrap();
    checker.set_start(at("2024-01-15 10:00:00"));

    let blocked = LogExpectation::new(Some(r#"\[id "942100"\]"#), None).unwrap();
    let (verdict, _) = checker.check(&blocked).unwrap();
    assert!(verdict.passed);

    let not_blocked = LogExpectation::new(None, Some("Access denied")).unwrap();
    let (verdict, _) = checker.check(&not_blocked).unwrap();
    assert!(!verdict.passed);
    assert!(verdict.line.unwrap().contains("code 403"));
}

/// A stage that starts after the last entry collects nothing and reads only
/// the final line.
#[test]
fn e2e_start_after_last_entry_collects_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_conf(dir.path(), &fixture("modsec_debug_sample.log"));
    let mut checker = LogChecker::new(config).unwrap();
    checker.set_start(at("2024-01-15 10:00:02"));

    let result = checker.scan().unwrap();
    assert!(result.lines.is_empty());
    assert_eq!(result.lines_scanned, 1);
}

/// Missing directives abort before the log is touched, naming both.
#[test]
fn e2e_missing_directives_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let conf = dir.path().join("modsecurity.conf");
    fs::write(
        &conf,
        "SecRuleEngine On\n# SecDebugLog /var/log/x.log\n# SecDebugLogLevel 3\n",
    )
    .unwrap();

    let config = LogCheckConfig {
        waf_conf_file: conf.clone(),
        ..Default::default()
    };
    match LogChecker::new(config) {
        Err(WafLogCheckError::Config(ConfigError::MissingDirectives { path, missing })) => {
            assert_eq!(path, conf);
            assert_eq!(missing, vec!["SecDebugLog", "SecDebugLogLevel"]);
        }
        Err(other) => panic!("expected MissingDirectives, got {other:?}"),
        Ok(_) => panic!("expected MissingDirectives, got a checker"),
    }
}

/// A timestamp header that does not fit the format aborts the scan.
#[test]
fn e2e_format_mismatch_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("debug.log");
    fs::write(
        &log,
        "[15/Jan/2024:10:00:00 +0000] [h/sid#1][rid#1][/][4] ok\n",
    )
    .unwrap();

    let mut config = write_conf(dir.path(), &log);
    config.log_date_format = "%Y-%m-%d %H:%M:%S".to_string();
    let mut checker = LogChecker::new(config).unwrap();
    checker.set_start(at("2024-01-15 09:00:00"));

    assert!(matches!(
        checker.get_logs().unwrap_err(),
        WafLogCheckError::Scan(ScanError::TimestampParse { .. })
    ));
}

/// config.toml values flow into the checker.
#[test]
fn e2e_config_file_drives_checker() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("debug.log");
    fs::write(
        &log,
        "[2024-01-15 09:59:59.999999] old\n\
         [2024-01-15 10:00:00.000001] new\n\
         continuation\n",
    )
    .unwrap();
    let waf_conf = write_conf(dir.path(), &log).waf_conf_file;

    let config_toml = dir.path().join("config.toml");
    fs::write(
        &config_toml,
        format!(
            "[waf]\nconf_file = '{}'\n\n\
             [log]\n\
             date_regex = '^\\[(\\d{{4}}-\\d{{2}}-\\d{{2}} \\d{{2}}:\\d{{2}}:\\d{{2}}\\.\\d{{6}})\\]'\n\
             date_format = \"%Y-%m-%d %H:%M:%S\"\n\
             timestamp_suffix_len = 7\n\n\
             [reader]\nchunk_size_bytes = 8\n",
            waf_conf.display()
        ),
    )
    .unwrap();

    let (app_config, warnings) = platform::config::load_config(&config_toml).unwrap();
    assert!(warnings.is_empty(), "{warnings:?}");

    let mut checker = LogChecker::new(app_config.check).unwrap();
    checker.set_start(at("2024-01-15 10:00:00.300"));
    assert_eq!(
        checker.get_logs().unwrap(),
        vec!["[2024-01-15 10:00:00.000001] new"]
    );
}
