//! # Error Types
//!
//! Failure taxonomy of the gate. Every blocking error renders as a
//! newline-joined list of `CODE: message` entries so the text can be shown to
//! a reviewer or fed back verbatim into a regeneration loop.

use crate::domain::findings::SecurityFinding;
use thiserror::Error;

// =============================================================================
// GATE ERRORS
// =============================================================================

/// Pipeline stage that rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStage {
    /// Input validation before any scanning.
    Input,
    /// Source pattern scan.
    SourceScan,
    /// Compiler invocation.
    Compile,
    /// Bytecode opcode walk.
    BytecodeScan,
}

/// Errors returned by the pipeline orchestrator.
#[derive(Debug, Error, Clone)]
pub enum GateError {
    /// At least one critical finding in the concatenated source.
    #[error("{}", join_findings(findings))]
    SourceScanFailure {
        /// Every critical source finding.
        findings: Vec<SecurityFinding>,
    },

    /// Syntax/type errors or unresolved imports.
    #[error(transparent)]
    CompileFailure(#[from] CompileError),

    /// Forbidden opcode or oversized bytecode in the primary artifact.
    #[error("{}", join_findings(findings))]
    BytecodeScanFailure {
        /// Every critical bytecode finding.
        findings: Vec<SecurityFinding>,
    },

    /// Input that cannot be processed at all (empty source map, bad hex).
    #[error("MALFORMED_INPUT: {0}")]
    MalformedInput(String),

    /// The compiler did not finish in time and was killed.
    #[error("COMPILE_TIMEOUT: compiler did not finish within {timeout_ms}ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },
}

impl GateError {
    /// The stage that produced this error.
    #[must_use]
    pub fn stage(&self) -> GateStage {
        match self {
            Self::MalformedInput(_) => GateStage::Input,
            Self::SourceScanFailure { .. } => GateStage::SourceScan,
            Self::CompileFailure(_) | Self::Timeout { .. } => GateStage::Compile,
            Self::BytecodeScanFailure { .. } => GateStage::BytecodeScan,
        }
    }

    /// Finding codes carried by a scan failure. Empty for other variants.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        match self {
            Self::SourceScanFailure { findings } | Self::BytecodeScanFailure { findings } => {
                findings.iter().map(|f| f.code.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl From<BytecodeError> for GateError {
    fn from(err: BytecodeError) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

fn join_findings(findings: &[SecurityFinding]) -> String {
    findings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// BYTECODE ERRORS
// =============================================================================

/// Errors decoding a hex bytecode string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BytecodeError {
    /// Nothing left after stripping the `0x` prefix.
    #[error("bytecode is empty")]
    Empty,

    /// Hex text must encode whole bytes.
    #[error("bytecode hex has odd length ({len} characters)")]
    OddLength {
        /// Number of hex digits after the prefix.
        len: usize,
    },

    /// Character outside `[0-9a-fA-F]`.
    #[error("invalid hex character {character:?} at position {position}")]
    InvalidHex {
        /// Index into the hex text after the prefix.
        position: usize,
        /// Offending character.
        character: char,
    },
}

// =============================================================================
// COMPILE ERRORS
// =============================================================================

/// Errors from the compiler port.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Error-severity compiler diagnostics, one entry per message.
    #[error("{}", .0.join("\n"))]
    Diagnostics(Vec<String>),

    /// Imports outside the trusted namespace or missing on disk.
    #[error("{}", .0.iter().map(|p| format!("IMPORT_NOT_FOUND: {p}")).collect::<Vec<_>>().join("\n"))]
    UnresolvedImports(Vec<String>),

    /// The compiler binary could not be started.
    #[error("COMPILER_UNAVAILABLE: {0}")]
    CompilerUnavailable(String),

    /// The compiler produced output that could not be parsed.
    #[error("INVALID_COMPILER_OUTPUT: {0}")]
    InvalidOutput(String),

    /// The same contract name appears in more than one source file.
    #[error("DUPLICATE_CONTRACT: contract {name} is declared in more than one file")]
    DuplicateContract {
        /// Contract name.
        name: String,
    },

    /// Compilation succeeded but produced no contract artifacts.
    #[error("NO_CONTRACTS: compilation produced no contract artifacts")]
    NoContracts,

    /// I/O failure talking to the compiler process.
    #[error("COMPILER_IO: {0}")]
    Io(String),
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// IMPORT ERRORS
// =============================================================================

/// Reasons an import cannot be served by a resolver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Path lies outside the trusted namespace.
    #[error("{path} is outside the trusted namespace {namespace}")]
    OutsideNamespace {
        /// Requested path.
        path: String,
        /// Trusted prefix.
        namespace: String,
    },

    /// Path contains `..` or is absolute.
    #[error("{0} escapes the import search paths")]
    Traversal(String),

    /// No search path contains the file.
    #[error("{0} not found in any import path")]
    NotFound(String),

    /// The file exists but could not be read.
    #[error("{path} could not be read: {reason}")]
    Unreadable {
        /// Requested path.
        path: String,
        /// I/O error text.
        reason: String,
    },
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Optimizer runs must be positive.
    #[error("optimizer_runs cannot be 0")]
    ZeroOptimizerRuns,

    /// Timeouts must be positive.
    #[error("compile timeout cannot be 0")]
    ZeroTimeout,

    /// At least one compilation slot is needed.
    #[error("max_concurrent_compilations cannot be 0")]
    ZeroConcurrency,

    /// Trusted import namespace must be set.
    #[error("trusted import namespace cannot be empty")]
    EmptyNamespace,

    /// Size ceiling must be positive.
    #[error("max_code_size cannot be 0")]
    ZeroCodeSize,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::findings::{SecurityFinding, Severity};

    #[test]
    fn test_scan_failure_display_lists_every_code() {
        let err = GateError::SourceScanFailure {
            findings: vec![
                SecurityFinding::new(Severity::Critical, "SELFDESTRUCT", "selfdestruct is forbidden"),
                SecurityFinding::new(Severity::Critical, "NO_PRAGMA", "missing pragma"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "SELFDESTRUCT: selfdestruct is forbidden\nNO_PRAGMA: missing pragma"
        );
        assert_eq!(err.codes(), vec!["SELFDESTRUCT", "NO_PRAGMA"]);
        assert_eq!(err.stage(), GateStage::SourceScan);
    }

    #[test]
    fn test_compile_error_display() {
        let err = CompileError::Diagnostics(vec![
            "ParserError: Expected ';'".to_string(),
            "TypeError: Undeclared identifier".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "ParserError: Expected ';'\nTypeError: Undeclared identifier"
        );

        let err = CompileError::UnresolvedImports(vec!["evil/Backdoor.sol".to_string()]);
        assert_eq!(err.to_string(), "IMPORT_NOT_FOUND: evil/Backdoor.sol");
    }

    #[test]
    fn test_compile_failure_is_transparent() {
        let err: GateError = CompileError::NoContracts.into();
        assert!(err.to_string().starts_with("NO_CONTRACTS"));
        assert_eq!(err.stage(), GateStage::Compile);
        assert!(err.codes().is_empty());
    }

    #[test]
    fn test_bytecode_error_converts_to_malformed_input() {
        let err: GateError = BytecodeError::OddLength { len: 3 }.into();
        assert_eq!(err.stage(), GateStage::Input);
        assert!(err.to_string().starts_with("MALFORMED_INPUT"));
    }
}
