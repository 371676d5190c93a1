// WafLogCheck - core/expectation.rs
//
// Log assertions evaluated against the lines collected for one stage:
// `log_contains` must match at least one line, `no_log_contains` must match
// none.

use crate::core::model::Verdict;
use crate::util::error::ExpectationError;
use crate::util::logging::preview;
use regex::Regex;

/// Compiled log assertions for a single stage.
#[derive(Debug, Clone, Default)]
pub struct LogExpectation {
    log_contains: Option<Regex>,
    no_log_contains: Option<Regex>,
}

impl LogExpectation {
    pub fn new(
        log_contains: Option<&str>,
        no_log_contains: Option<&str>,
    ) -> Result<Self, ExpectationError> {
        Ok(Self {
            log_contains: log_contains.map(compile).transpose()?,
            no_log_contains: no_log_contains.map(compile).transpose()?,
        })
    }

    /// True when no assertion is configured.
    pub fn is_empty(&self) -> bool {
        self.log_contains.is_none() && self.no_log_contains.is_none()
    }

    /// Evaluate against `lines`. The forbidden pattern is checked first so a
    /// stage with both assertions reports the violating line.
    pub fn evaluate(&self, lines: &[String]) -> Verdict {
        if let Some(ref forbidden) = self.no_log_contains {
            if let Some(line) = lines.iter().find(|l| forbidden.is_match(l)) {
                tracing::debug!(
                    pattern = %forbidden,
                    line = preview(line),
                    "no_log_contains violated"
                );
                return Verdict::fail(
                    format!("log contains forbidden pattern '{forbidden}'"),
                    Some(line.clone()),
                );
            }
        }

        match self.log_contains {
            Some(ref wanted) => match lines.iter().find(|l| wanted.is_match(l)) {
                Some(line) => Verdict::pass(Some(line.clone())),
                None => Verdict::fail(
                    format!(
                        "no log line matches '{wanted}' ({} lines collected)",
                        lines.len()
                    ),
                    None,
                ),
            },
            None => Verdict::pass(None),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, ExpectationError> {
    Regex::new(pattern).map_err(|source| ExpectationError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}
