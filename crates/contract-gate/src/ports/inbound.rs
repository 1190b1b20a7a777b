//! # Driving Ports (API - Inbound)
//!
//! The public API of the gate. Governance workflows call these to vet a
//! generated contract before deployment.

use crate::domain::artifacts::{CompiledContract, SourceMap};
use crate::domain::findings::SecurityReport;
use crate::domain::integrity::IntegrityHashes;
use crate::domain::validation::ValidationResult;
use crate::errors::{BytecodeError, GateError};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

// =============================================================================
// REQUEST / RESULT
// =============================================================================

/// Per-request options for [`ContractGateApi::compile_and_scan_with`].
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Contract to treat as the deployment target. Defaults to the first
    /// contract with runtime code in compiler output order.
    pub primary_contract: Option<String>,
}

/// Successful pipeline verdict.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileAndScanResult {
    /// Correlation ID of this run.
    pub run_id: Uuid,
    /// Report over the concatenated sources.
    pub source_report: SecurityReport,
    /// Report over the primary contract's deployed bytecode.
    pub bytecode_report: SecurityReport,
    /// Attestation binding source to creation bytecode.
    pub integrity_hashes: IntegrityHashes,
    /// Rounded mean of both report scores.
    pub combined_score: u8,
    /// Name of the contract that was gated.
    pub primary_contract: String,
    /// Compiler warnings, unmodified.
    pub compiler_warnings: Vec<String>,
    /// Every compiled artifact, keyed by contract name.
    pub contracts: BTreeMap<String, CompiledContract>,
}

impl CompileAndScanResult {
    /// The gated artifact.
    #[must_use]
    pub fn primary(&self) -> Option<&CompiledContract> {
        self.contracts.get(&self.primary_contract)
    }
}

// =============================================================================
// GATE API
// =============================================================================

/// Primary API of the gate.
#[async_trait]
pub trait ContractGateApi: Send + Sync {
    /// Runs source scan, compile, bytecode scan, hashing and scoring.
    ///
    /// # Errors
    ///
    /// Fails closed at the first gate that rejects; see [`GateError`].
    async fn compile_and_scan(&self, sources: SourceMap) -> Result<CompileAndScanResult, GateError> {
        self.compile_and_scan_with(sources, ScanOptions::default())
            .await
    }

    /// [`Self::compile_and_scan`] with explicit options.
    ///
    /// # Errors
    ///
    /// Fails closed at the first gate that rejects; see [`GateError`].
    async fn compile_and_scan_with(
        &self,
        sources: SourceMap,
        options: ScanOptions,
    ) -> Result<CompileAndScanResult, GateError>;

    /// Source pattern scan only.
    fn scan_source(&self, code: &str) -> SecurityReport;

    /// Bytecode walk only.
    ///
    /// # Errors
    ///
    /// Returns [`BytecodeError`] for malformed hex.
    fn scan_bytecode(&self, bytecode_hex: &str) -> Result<SecurityReport, BytecodeError>;

    /// Cheap structural pre-check.
    fn validate(&self, source: &str) -> ValidationResult;

    /// Integrity triple for a source/bytecode pair.
    ///
    /// # Errors
    ///
    /// Returns [`BytecodeError`] for malformed hex.
    fn create_integrity_hash(
        &self,
        source: &str,
        bytecode_hex: &str,
    ) -> Result<IntegrityHashes, BytecodeError>;
}
