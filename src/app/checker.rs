// WafLogCheck - app/checker.rs
//
// Log checker used by the stage runner: validates the WAF configuration up
// front, records the stage start, and returns the debug log lines written
// since the test started.
//
// Every `get_logs` call reopens the debug log, so the checker can be reused
// across stages while the WAF keeps appending.

use crate::core::collector::{self, TimestampMatcher};
use crate::core::expectation::LogExpectation;
use crate::core::model::{CollectResult, DebugLogSettings, LogCheckConfig, Verdict};
use crate::platform;
use crate::util::error::{ConfigError, Result, ScanError};
use chrono::NaiveDateTime;
use std::path::Path;

pub struct LogChecker {
    config: LogCheckConfig,
    settings: DebugLogSettings,
    matcher: TimestampMatcher,
    start: Option<NaiveDateTime>,
}

impl LogChecker {
    /// Build a checker from an explicit configuration.
    ///
    /// Fails when the WAF configuration file lacks the debug-log directives
    /// or the timestamp pattern is unusable.
    pub fn new(config: LogCheckConfig) -> Result<Self> {
        let settings = platform::fs::read_debug_log_settings(&config.waf_conf_file)?;
        Self::with_settings(config, settings)
    }

    /// Build a checker with already-known debug-log settings, skipping the
    /// WAF configuration file.
    pub fn with_settings(config: LogCheckConfig, settings: DebugLogSettings) -> Result<Self> {
        let matcher = TimestampMatcher::new(
            &config.log_date_regex,
            &config.log_date_format,
            config.timestamp_suffix_len,
        )?;

        tracing::info!(
            waf_conf = %config.waf_conf_file.display(),
            debug_log = %settings.log_file.display(),
            level = settings.level,
            "Log checker ready"
        );

        Ok(Self {
            config,
            settings,
            matcher,
            start: None,
        })
    }

    pub fn log_file(&self) -> &Path {
        &self.settings.log_file
    }

    pub fn settings(&self) -> &DebugLogSettings {
        &self.settings
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start
    }

    /// Record the start of the stage about to be checked.
    pub fn set_start(&mut self, start: NaiveDateTime) {
        tracing::debug!(start = %start, "Test start recorded");
        self.start = Some(start);
    }

    /// Record "now" (local wall clock, matching the WAF's log timestamps)
    /// as the stage start.
    pub fn mark_start_now(&mut self) -> NaiveDateTime {
        let now = chrono::Local::now().naive_local();
        self.set_start(now);
        now
    }

    /// Lines written to the debug log since the recorded start, most recent
    /// first.
    pub fn get_logs(&self) -> Result<Vec<String>> {
        Ok(self.scan()?.lines)
    }

    /// Like `get_logs`, with scan statistics.
    pub fn scan(&self) -> Result<CollectResult> {
        let start = self.start.ok_or(ConfigError::StartNotRecorded)?;
        let path = self.settings.log_file.as_path();

        tracing::debug!(file = %path.display(), start = %start, "Reading debug log backwards");

        let lines = platform::fs::reverse_lines(path, self.config.chunk_size).map_err(|source| {
            ScanError::Io {
                file: path.to_path_buf(),
                source,
            }
        })?;

        let result = collector::collect_since(lines, &self.matcher, start, path)?;

        tracing::info!(
            file = %path.display(),
            collected = result.lines.len(),
            scanned = result.lines_scanned,
            "Debug log lines collected"
        );
        Ok(result)
    }

    /// Collect the stage's lines and evaluate `expectation` against them.
    pub fn check(&self, expectation: &LogExpectation) -> Result<(Verdict, CollectResult)> {
        let result = self.scan()?;
        let verdict = expectation.evaluate(&result.lines);
        if verdict.passed {
            tracing::info!("Log expectation passed");
        } else {
            tracing::warn!(reason = ?verdict.reason, "Log expectation failed");
        }
        Ok((verdict, result))
    }
}
