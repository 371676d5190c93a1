// WafLogCheck - core/collector.rs
//
// Timestamp filter over a reverse line stream.
//
// Walking backward from the end of the log, lines whose header timestamp is
// at or after the cutoff are collected. The first recognised line older than
// the cutoff ends the scan. This relies on the writer appending entries in
// non-decreasing timestamp order; an out-of-order entry older than the
// cutoff ends the scan early and anything before it is not collected.

use crate::core::model::CollectResult;
use crate::util::constants::MAX_REGEX_PATTERN_LENGTH;
use crate::util::error::{ConfigError, ScanError};
use crate::util::logging::preview;
use chrono::{NaiveDateTime, SubsecRound};
use regex::Regex;
use std::io;
use std::path::Path;

/// Recognises and parses the timestamp header of a log line.
#[derive(Debug, Clone)]
pub struct TimestampMatcher {
    /// The configured pattern, anchored at the start of the line.
    pattern: Regex,
    format: String,
    suffix_len: usize,
}

/// How a single line relates to the timestamp header rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineTimestamp {
    /// The line does not start with a timestamp header (continuation line).
    Unrecognised,
    /// Header recognised and parsed.
    Parsed(NaiveDateTime),
}

impl TimestampMatcher {
    /// Compile `pattern` (capture group 1 must hold the timestamp text).
    ///
    /// The pattern is anchored at the start of the line whether or not it
    /// begins with `^` itself.
    pub fn new(pattern: &str, format: &str, suffix_len: usize) -> Result<Self, ConfigError> {
        if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(ConfigError::RegexTooLong {
                field: "log.date_regex",
                length: pattern.len(),
                max_length: MAX_REGEX_PATTERN_LENGTH,
            });
        }

        let anchored = format!(r"\A(?:{pattern})");
        let compiled = Regex::new(&anchored).map_err(|source| ConfigError::InvalidRegex {
            field: "log.date_regex",
            pattern: pattern.to_string(),
            source,
        })?;

        // captures_len counts the implicit whole-match group.
        if compiled.captures_len() < 2 {
            return Err(ConfigError::MissingCaptureGroup {
                field: "log.date_regex",
                pattern: pattern.to_string(),
            });
        }

        Ok(Self {
            pattern: compiled,
            format: format.to_string(),
            suffix_len,
        })
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Classify `line`. Returns the raw captured text on parse failure so the
    /// caller can report it.
    pub fn classify(&self, line: &str) -> Result<LineTimestamp, String> {
        let Some(caps) = self.pattern.captures(line) else {
            return Ok(LineTimestamp::Unrecognised);
        };
        // Group 1 may be optional in the pattern; an empty capture fails
        // to parse below like any other malformed date.
        let raw = caps.get(1).map_or("", |m| m.as_str());
        let trimmed = strip_suffix_chars(raw, self.suffix_len);

        parse_timestamp(trimmed, &self.format)
            .map(LineTimestamp::Parsed)
            .ok_or_else(|| raw.to_string())
    }
}

/// Drop the last `n` characters of `s` (the whole string if it is shorter).
fn strip_suffix_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return s;
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &s[..idx],
        None => "",
    }
}

/// Parse `raw` with `format`, accepting date-only formats as midnight.
fn parse_timestamp(raw: &str, format: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();

    if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, format) {
        return Some(ndt);
    }

    chrono::NaiveDate::parse_from_str(trimmed, format)
        .ok()
        .and_then(|nd| nd.and_hms_opt(0, 0, 0))
}

/// Collect lines from a reverse line stream down to `start`.
///
/// `start` is truncated to whole seconds before comparison, so an entry
/// written in the same second the test started is always included.
/// `file` is only used for error context.
pub fn collect_since<I>(
    lines: I,
    matcher: &TimestampMatcher,
    start: NaiveDateTime,
    file: &Path,
) -> Result<CollectResult, ScanError>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let cutoff = start.trunc_subsecs(0);
    let mut result = CollectResult::default();

    for line in lines {
        let line = line.map_err(|source| ScanError::Io {
            file: file.to_path_buf(),
            source,
        })?;
        result.lines_scanned += 1;

        match matcher.classify(&line) {
            Ok(LineTimestamp::Unrecognised) => {
                result.lines_skipped += 1;
            }
            Ok(LineTimestamp::Parsed(ts)) if ts >= cutoff => {
                result.lines.push(line);
            }
            Ok(LineTimestamp::Parsed(ts)) => {
                tracing::debug!(
                    timestamp = %ts,
                    cutoff = %cutoff,
                    line = preview(&line),
                    "Reached entry older than test start"
                );
                result.stopped_at_cutoff = true;
                break;
            }
            Err(raw_timestamp) => {
                return Err(ScanError::TimestampParse {
                    file: file.to_path_buf(),
                    line,
                    raw_timestamp,
                    format: matcher.format().to_string(),
                });
            }
        }
    }

    tracing::debug!(
        file = %file.display(),
        collected = result.lines.len(),
        scanned = result.lines_scanned,
        skipped = result.lines_skipped,
        stopped_at_cutoff = result.stopped_at_cutoff,
        "Reverse scan complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reverse::ReverseLines;
    use crate::util::constants;
    use std::io::Cursor;

    fn default_matcher() -> TimestampMatcher {
        TimestampMatcher::new(
            constants::DEFAULT_LOG_DATE_REGEX,
            constants::DEFAULT_LOG_DATE_FORMAT,
            constants::DEFAULT_TIMESTAMP_SUFFIX_LEN,
        )
        .unwrap()
    }

    fn iso_matcher() -> TimestampMatcher {
        TimestampMatcher::new(r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})", "%Y-%m-%d %H:%M:%S", 0)
            .unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    fn lines(content: &str) -> ReverseLines<Cursor<Vec<u8>>> {
        ReverseLines::new(Cursor::new(content.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn test_out_of_order_old_entry_at_end_stops_scan() {
        let content = "2024-01-15 10:00:00 a\n\
                       2024-01-15 10:05:00 b\n\
                       2024-01-15 10:10:00 c\n\
                       2024-01-15 09:50:00 d\n";
        let result = collect_since(
            lines(content),
            &iso_matcher(),
            at("2024-01-15 10:00:00"),
            Path::new("debug.log"),
        )
        .unwrap();

        // Known limitation: the last physical line (09:50) is read first and
        // is already older than the cutoff, so nothing before it is reached.
        assert!(result.lines.is_empty());
        assert!(result.stopped_at_cutoff);
        assert_eq!(result.lines_scanned, 1);
    }

    #[test]
    fn test_collects_newest_first_and_stops_before_older() {
        let content = "2024-01-15 09:50:00 d\n\
                       2024-01-15 10:00:00 a\n\
                       2024-01-15 10:05:00 b\n\
                       2024-01-15 10:10:00 c\n";
        let result = collect_since(
            lines(content),
            &iso_matcher(),
            at("2024-01-15 10:00:00"),
            Path::new("debug.log"),
        )
        .unwrap();

        assert_eq!(
            result.lines,
            vec![
                "2024-01-15 10:10:00 c",
                "2024-01-15 10:05:00 b",
                "2024-01-15 10:00:00 a",
            ]
        );
        assert!(result.stopped_at_cutoff);
        assert_eq!(result.lines_scanned, 4);
    }

    #[test]
    fn test_continuation_lines_are_skipped_not_fatal() {
        let content = "2024-01-15 10:00:00 request start\n\
                       \tcontinuation detail\n\
                       2024-01-15 10:00:01 request end\n\
                       trailing free text\n";
        let result = collect_since(
            lines(content),
            &iso_matcher(),
            at("2024-01-15 10:00:00"),
            Path::new("debug.log"),
        )
        .unwrap();

        assert_eq!(
            result.lines,
            vec![
                "2024-01-15 10:00:01 request end",
                "2024-01-15 10:00:00 request start",
            ]
        );
        assert_eq!(result.lines_skipped, 2);
        assert!(!result.stopped_at_cutoff);
    }

    #[test]
    fn test_cutoff_truncated_to_whole_seconds() {
        let content = "2024-01-15 10:00:00 same second\n";
        let result = collect_since(
            lines(content),
            &iso_matcher(),
            at("2024-01-15 10:00:00.900"),
            Path::new("debug.log"),
        )
        .unwrap();
        assert_eq!(result.lines, vec!["2024-01-15 10:00:00 same second"]);
    }

    #[test]
    fn test_unparseable_timestamp_is_fatal() {
        // 99 is not a valid month.
        let content = "2024-99-15 10:00:00 broken\n";
        let err = collect_since(
            lines(content),
            &iso_matcher(),
            at("2024-01-15 10:00:00"),
            Path::new("debug.log"),
        )
        .unwrap_err();

        match err {
            ScanError::TimestampParse { raw_timestamp, .. } => {
                assert_eq!(raw_timestamp, "2024-99-15 10:00:00");
            }
            other => panic!("expected TimestampParse, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_log_collects_nothing() {
        let result = collect_since(
            lines(""),
            &iso_matcher(),
            at("2024-01-15 10:00:00"),
            Path::new("debug.log"),
        )
        .unwrap();
        assert_eq!(result, CollectResult::default());
    }

    #[test]
    fn test_default_modsecurity_layout() {
        let content = "[15/Jan/2024:09:59:59 +0000] [localhost/sid#1][rid#2][/][4] old\n\
                       [15/Jan/2024:10:00:00 +0000] [localhost/sid#1][rid#3][/][4] Recipe: rule 942100\n\
                       [15/Jan/2024:10:00:01 +0000] [localhost/sid#1][rid#3][/][1] Access denied with code 403\n";
        let result = collect_since(
            lines(content),
            &default_matcher(),
            at("2024-01-15 10:00:00.250"),
            Path::new("modsec_debug.log"),
        )
        .unwrap();

        assert_eq!(result.lines.len(), 2);
        assert!(result.lines[0].contains("Access denied"));
        assert!(result.lines[1].contains("942100"));
    }

    #[test]
    fn test_match_is_anchored_at_line_start() {
        let m = iso_matcher();
        assert_eq!(
            m.classify("prefix 2024-01-15 10:00:00").unwrap(),
            LineTimestamp::Unrecognised
        );
        assert_eq!(
            m.classify("2024-01-15 10:00:00 x").unwrap(),
            LineTimestamp::Parsed(at("2024-01-15 10:00:00"))
        );
    }

    #[test]
    fn test_suffix_trim_counts_characters() {
        assert_eq!(strip_suffix_chars("10:00:00.123456", 7), "10:00:00");
        assert_eq!(strip_suffix_chars("abc", 0), "abc");
        assert_eq!(strip_suffix_chars("abc", 5), "");
        assert_eq!(strip_suffix_chars("déjà", 1), "déj");
    }

    #[test]
    fn test_fractional_suffix_trimmed_before_parse() {
        let m = TimestampMatcher::new(
            r"\[(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{6})\]",
            "%Y-%m-%d %H:%M:%S",
            7,
        )
        .unwrap();
        assert_eq!(
            m.classify("[2024-01-15 10:00:00.123456] hit").unwrap(),
            LineTimestamp::Parsed(at("2024-01-15 10:00:00"))
        );
    }

    #[test]
    fn test_date_only_format_parses_as_midnight() {
        let m = TimestampMatcher::new(r"(\d{4}-\d{2}-\d{2})", "%Y-%m-%d", 0).unwrap();
        assert_eq!(
            m.classify("2024-01-15 something").unwrap(),
            LineTimestamp::Parsed(at("2024-01-15 00:00:00"))
        );
    }

    #[test]
    fn test_pattern_without_capture_group_rejected() {
        let err = TimestampMatcher::new(r"\d{4}", "%Y", 0).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCaptureGroup { .. }));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = TimestampMatcher::new(r"([", "%Y", 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { .. }));
    }

    #[test]
    fn test_overlong_pattern_rejected() {
        let pattern = format!("({})", "a".repeat(MAX_REGEX_PATTERN_LENGTH));
        let err = TimestampMatcher::new(&pattern, "%Y", 0).unwrap_err();
        assert!(matches!(err, ConfigError::RegexTooLong { .. }));
    }

    #[test]
    fn test_io_error_is_propagated() {
        let failing = vec![
            Ok("2024-01-15 10:00:05 fine".to_string()),
            Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
        ];
        let err = collect_since(
            failing,
            &iso_matcher(),
            at("2024-01-15 10:00:00"),
            Path::new("debug.log"),
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }
}
