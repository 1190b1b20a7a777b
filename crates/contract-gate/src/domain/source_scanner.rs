//! # Source Scanner
//!
//! Two passes over Solidity source, merged by finding code:
//!
//! 1. line by line, recording the first matching line of each rule;
//! 2. over the whole text, for matches spanning several lines, added only
//!    when the code has not been reported yet.
//!
//! One finding per rule, not one per occurrence. Structural checks (version
//! gate, reentrancy heuristic, size) run after the rule passes.

use crate::domain::findings::{ReportBuilder, ScanType, SecurityFinding, SecurityReport, Severity};
use crate::domain::rules::{codes, rules};
use crate::domain::version::SolidityVersion;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Sources longer than this many bytes get a `LARGE_SOURCE` note.
pub const LARGE_SOURCE_BYTES: usize = 50_000;

static PRAGMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bpragma\s+solidity\s+([^;]+);").expect("valid pragma regex")
});

static VALUE_TRANSFER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.call\s*\{\s*value\s*:|\.send\s*\(|\.transfer\s*\(")
        .expect("valid value transfer regex")
});

static REENTRANCY_GUARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:ReentrancyGuard\w*|nonReentrant)\b")
        .expect("valid reentrancy guard regex")
});

/// Scans Solidity source with the default thresholds.
#[must_use]
pub fn scan_source_code(code: &str) -> SecurityReport {
    SourceScanner::default().scan(code)
}

/// Configurable source scanner.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    large_source_bytes: usize,
}

impl Default for SourceScanner {
    fn default() -> Self {
        Self {
            large_source_bytes: LARGE_SOURCE_BYTES,
        }
    }
}

impl SourceScanner {
    /// Creates a scanner with a custom size threshold.
    #[must_use]
    pub fn new(large_source_bytes: usize) -> Self {
        Self { large_source_bytes }
    }

    /// Scans `code` and returns a source report.
    #[must_use]
    pub fn scan(&self, code: &str) -> SecurityReport {
        let mut report = ReportBuilder::new(ScanType::Source);

        scan_lines(code, &mut report);
        scan_whole_source(code, &mut report);
        check_version(code, &mut report);
        check_reentrancy(code, &mut report);

        if code.len() > self.large_source_bytes {
            report.push(SecurityFinding::new(
                Severity::Info,
                codes::LARGE_SOURCE,
                format!(
                    "Source is {} bytes (threshold {}); large contracts are harder to review",
                    code.len(),
                    self.large_source_bytes
                ),
            ));
        }

        let report = report.build();
        debug!(
            critical = report.critical().len(),
            warnings = report.warnings().len(),
            info = report.info().len(),
            score = report.score(),
            "Source scan complete"
        );
        report
    }
}

fn scan_lines(code: &str, report: &mut ReportBuilder) {
    for (index, line) in code.lines().enumerate() {
        for rule in rules() {
            if report.has_code(rule.code) {
                continue;
            }
            if let Some(captures) = rule.pattern.captures(line) {
                debug!(code = rule.code, line = index + 1, "Source rule matched");
                report.push(rule.finding(&captures).at_line(index + 1));
            }
        }
    }
}

fn scan_whole_source(code: &str, report: &mut ReportBuilder) {
    for rule in rules() {
        if report.has_code(rule.code) {
            continue;
        }
        if let Some(captures) = rule.whole_source_pattern().captures(code) {
            let start = captures.get(0).map_or(0, |m| m.start());
            let line = line_of(code, start);
            debug!(code = rule.code, line, "Source rule matched across lines");
            report.push(rule.finding(&captures).at_line(line));
        }
    }
}

fn check_version(code: &str, report: &mut ReportBuilder) {
    let mut lowest: Option<(SolidityVersion, usize)> = None;
    let mut seen = false;

    for captures in PRAGMA.captures_iter(code) {
        seen = true;
        let (Some(whole), Some(constraint)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let line = line_of(code, whole.start());

        match SolidityVersion::parse_constraint(constraint.as_str()) {
            Some(version) => {
                if lowest.map_or(true, |(low, _)| version < low) {
                    lowest = Some((version, line));
                }
            }
            None => {
                if !report.has_code(codes::UNPARSEABLE_PRAGMA) {
                    report.push(
                        SecurityFinding::new(
                            Severity::Critical,
                            codes::UNPARSEABLE_PRAGMA,
                            format!(
                                "Cannot determine compiler version from pragma `{}`",
                                constraint.as_str().trim()
                            ),
                        )
                        .at_line(line),
                    );
                }
            }
        }
    }

    if !seen {
        report.push(SecurityFinding::new(
            Severity::Critical,
            codes::NO_PRAGMA,
            format!(
                "Missing `pragma solidity` version declaration (>= {} required)",
                SolidityVersion::MINIMUM
            ),
        ));
        return;
    }

    if let Some((version, line)) = lowest {
        if !version.is_supported() {
            report.push(
                SecurityFinding::new(
                    Severity::Critical,
                    codes::OLD_SOLIDITY,
                    format!(
                        "Solidity {version} is below the minimum supported version {}",
                        SolidityVersion::MINIMUM
                    ),
                )
                .at_line(line),
            );
        }
    }
}

fn check_reentrancy(code: &str, report: &mut ReportBuilder) {
    let Some(site) = VALUE_TRANSFER.find(code) else {
        return;
    };
    if REENTRANCY_GUARD.is_match(code) {
        return;
    }
    report.push(
        SecurityFinding::new(
            Severity::Warning,
            codes::REENTRANCY_RISK,
            "Value transfer without ReentrancyGuard; use nonReentrant or checks-effects-interactions",
        )
        .at_line(line_of(code, site.start())),
    );
}

/// 1-based line containing byte `offset`.
fn line_of(code: &str, offset: usize) -> usize {
    code.as_bytes()[..offset.min(code.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

// =============================================================================
// TESTS
// =============================================================================
