//! # Findings and Reports
//!
//! Value types produced by the scanners. A [`SecurityReport`] can only be
//! built through [`ReportBuilder`], which derives `passed` and `score` from
//! the finding lists.

use crate::domain::scoring::score;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// SEVERITY
// =============================================================================

/// Severity of a finding. Only `Critical` blocks deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, never blocks.
    Info,
    /// Suspicious, never blocks.
    Warning,
    /// Forbidden, always blocks.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

// =============================================================================
// FINDING
// =============================================================================

/// A single scanner finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFinding {
    /// Severity class.
    pub severity: Severity,
    /// Stable machine-readable code, e.g. `SELFDESTRUCT`.
    pub code: String,
    /// Human-readable explanation.
    pub message: String,
    /// 1-based source line, for source findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Byte offset into decoded bytecode, for bytecode findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl SecurityFinding {
    /// Creates a finding without location.
    pub fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            line: None,
            offset: None,
        }
    }

    /// Attaches a 1-based source line.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attaches a bytecode offset.
    #[must_use]
    pub fn at_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for SecurityFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Which scanner produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// Solidity source pattern scan.
    Source,
    /// Compiled bytecode walk.
    Bytecode,
}

/// Result of one scan.
///
/// `passed` is true exactly when there are no critical findings; `score`
/// is informational and never decides the verdict.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    passed: bool,
    critical: Vec<SecurityFinding>,
    warnings: Vec<SecurityFinding>,
    info: Vec<SecurityFinding>,
    scan_type: ScanType,
    timestamp: DateTime<Utc>,
    score: u8,
}

impl SecurityReport {
    /// True iff there are no critical findings.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Critical findings.
    #[must_use]
    pub fn critical(&self) -> &[SecurityFinding] {
        &self.critical
    }

    /// Warning findings.
    #[must_use]
    pub fn warnings(&self) -> &[SecurityFinding] {
        &self.warnings
    }

    /// Informational findings.
    #[must_use]
    pub fn info(&self) -> &[SecurityFinding] {
        &self.info
    }

    /// Scanner that produced the report.
    #[must_use]
    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    /// Creation time.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Score in `[0, 100]`.
    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    /// All findings, critical first.
    pub fn findings(&self) -> impl Iterator<Item = &SecurityFinding> {
        self.critical
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }

    /// Finds the first finding with the given code.
    #[must_use]
    pub fn find(&self, code: &str) -> Option<&SecurityFinding> {
        self.findings().find(|f| f.code == code)
    }
}

/// Accumulates findings and produces a [`SecurityReport`].
#[derive(Debug)]
pub struct ReportBuilder {
    scan_type: ScanType,
    critical: Vec<SecurityFinding>,
    warnings: Vec<SecurityFinding>,
    info: Vec<SecurityFinding>,
}

impl ReportBuilder {
    /// Starts an empty report.
    #[must_use]
    pub fn new(scan_type: ScanType) -> Self {
        Self {
            scan_type,
            critical: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
        }
    }

    /// Routes a finding into the list matching its severity.
    pub fn push(&mut self, finding: SecurityFinding) {
        match finding.severity {
            Severity::Critical => self.critical.push(finding),
            Severity::Warning => self.warnings.push(finding),
            Severity::Info => self.info.push(finding),
        }
    }

    /// True if a finding with this code was already recorded.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.critical
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
            .any(|f| f.code == code)
    }

    /// Finalizes the report.
    #[must_use]
    pub fn build(self) -> SecurityReport {
        let score = score(self.critical.len(), self.warnings.len(), self.info.len());
        SecurityReport {
            passed: self.critical.is_empty(),
            critical: self.critical,
            warnings: self.warnings,
            info: self.info,
            scan_type: self.scan_type,
            timestamp: Utc::now(),
            score,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
