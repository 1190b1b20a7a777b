//! # Contract Gate - Pre-Deployment Security Gate for Solidity
//!
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Decides whether machine-generated Solidity may be deployed by a
//! governance workflow. Source is pattern-scanned, compiled with a pinned
//! optimizer configuration, and the runtime bytecode is walked for
//! forbidden opcodes. A passing contract receives a score and an integrity
//! attestation binding its source to its creation bytecode.
//!
//! ## Gate Order (fail-closed)
//!
//! | Step | Rejects on | Error |
//! |------|-----------|-------|
//! | Input | empty source map | `MalformedInput` |
//! | Source scan | any critical finding | `SourceScanFailure` |
//! | Compile | error diagnostics, unresolved imports, timeout | `CompileFailure` / `Timeout` |
//! | Bytecode scan | forbidden opcode, size over ceiling | `BytecodeScanFailure` |
//! | Hashing | (never) | |
//!
//! ## Protocol Constants
//!
//! | Constant | Value | Purpose |
//! |----------|-------|---------|
//! | Minimum compiler | 0.8.20 | Older pragmas are critical |
//! | `MAX_CODE_SIZE` | 24 576 bytes (EIP-170) | Deployable runtime size |
//! | `LARGE_SOURCE_BYTES` | 50 000 | Informational size note |
//! | Optimizer runs | 200 | Always enabled |
//! | Score penalties | 50 / 10 / 2 | critical / warning / info |
//!
//! ## Forbidden Opcodes
//!
//! | Opcode | Byte | Finding |
//! |--------|------|---------|
//! | `SELFDESTRUCT` | `0xFF` | `SELFDESTRUCT_OPCODE` |
//! | `DELEGATECALL` | `0xF4` | `DELEGATECALL_OPCODE` |
//! | `CALLCODE` | `0xF2` | `CALLCODE_OPCODE` |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Adapter | Purpose |
//! |-------|---------|---------|
//! | `SolidityCompiler` | `adapters::SolcCompiler` | `solc --standard-json` |
//! | `ImportResolver` | `adapters::FilesystemImportResolver` | Trusted namespace only |
//!
//! ## Usage Example
//!
//! ```ignore
//! use contract_gate::prelude::*;
//!
//! let config = GateConfig::from_env();
//! let gate = GateService::new(SolcCompiler::from_config(&config.compiler), config)?;
//!
//! let verdict = gate.compile_and_scan(sources).await?;
//! println!("{} scored {}", verdict.primary_contract, verdict.combined_score);
//! println!("attestation: {}", verdict.integrity_hashes.combined_hash);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::{
        combined_score, create_integrity_hash, decode_bytecode, scan_bytecode, scan_source_code,
        score, validate_contract, BytecodeScanner, CompilationOutput, CompiledContract,
        CompilerInput, GasEstimates, IntegrityHashes, ScanType, SecurityFinding, SecurityReport,
        Severity, SolidityVersion, SourceMap, SourceScanner, ValidationResult, MAX_CODE_SIZE,
    };

    // Ports
    pub use crate::ports::inbound::{CompileAndScanResult, ContractGateApi, ScanOptions};
    pub use crate::ports::outbound::{ImportResolver, NoImports, SolidityCompiler};

    // Adapters
    pub use crate::adapters::{FilesystemImportResolver, SolcCompiler};

    // Service
    pub use crate::config::{CompilerConfig, GateConfig, LimitsConfig};
    pub use crate::service::{GateService, GateStats};

    // Errors
    pub use crate::errors::{
        BytecodeError, CompileError, ConfigError, GateError, GateStage, ImportError,
    };
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_exports() {
        let report = scan_source_code("pragma solidity ^0.8.20;\ncontract A {}");
        assert_eq!(report.scan_type(), ScanType::Source);
        assert_eq!(MAX_CODE_SIZE, 24_576);
        assert!(!super::VERSION.is_empty());
    }
}
