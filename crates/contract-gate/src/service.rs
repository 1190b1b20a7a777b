//! # Contract Gate Service
//!
//! Fail-closed orchestration of the gate:
//!
//! 1. Source scan over the concatenated sources
//! 2. Compilation (bounded concurrency, hard timeout)
//! 3. Bytecode scan of the primary contract's runtime code
//! 4. Integrity hashing of source and creation bytecode
//! 5. Combined scoring
//!
//! Each step runs only if every earlier step passed. A rejection carries the
//! findings or diagnostics of the step that produced it.

use crate::config::GateConfig;
use crate::domain::artifacts::{CompilationOutput, CompiledContract, CompilerInput, SourceMap};
use crate::domain::bytecode_scanner::{decode_bytecode, BytecodeScanner};
use crate::domain::findings::{SecurityFinding, SecurityReport};
use crate::domain::integrity::{create_integrity_hash, hash_parts, IntegrityHashes};
use crate::domain::scoring::combined_score;
use crate::domain::source_scanner::SourceScanner;
use crate::domain::validation::{validate_contract, ValidationResult};
use crate::errors::{BytecodeError, CompileError, ConfigError, GateError, GateStage};
use crate::ports::inbound::{CompileAndScanResult, ContractGateApi, ScanOptions};
use crate::ports::outbound::SolidityCompiler;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{RwLock, Semaphore};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Pipeline counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GateStats {
    /// Pipeline runs started.
    pub runs: u64,
    /// Runs that produced a verdict.
    pub passed: u64,
    /// Rejected before scanning (empty input, bad hex, unknown contract).
    pub rejected_input: u64,
    /// Rejected by the source scan.
    pub rejected_source: u64,
    /// Rejected by the compiler or its timeout.
    pub rejected_compile: u64,
    /// Rejected by the bytecode scan.
    pub rejected_bytecode: u64,
}

impl GateStats {
    fn record(&mut self, outcome: Result<(), GateStage>) {
        match outcome {
            Ok(()) => self.passed += 1,
            Err(GateStage::Input) => self.rejected_input += 1,
            Err(GateStage::SourceScan) => self.rejected_source += 1,
            Err(GateStage::Compile) => self.rejected_compile += 1,
            Err(GateStage::BytecodeScan) => self.rejected_bytecode += 1,
        }
    }
}

/// The gate.
///
/// Holds no per-request state; any number of pipeline runs may share one
/// instance. Compiler invocations are bounded by
/// `limits.max_concurrent_compilations`.
pub struct GateService<C: SolidityCompiler> {
    config: GateConfig,
    compiler: Arc<C>,
    compile_slots: Arc<Semaphore>,
    source_scanner: SourceScanner,
    stats: Arc<RwLock<GateStats>>,
}

impl<C: SolidityCompiler> GateService<C> {
    /// Creates a gate over `compiler`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid.
    pub fn new(compiler: C, config: GateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            compile_slots: Arc::new(Semaphore::new(config.limits.max_concurrent_compilations)),
            source_scanner: SourceScanner::new(config.limits.large_source_bytes),
            compiler: Arc::new(compiler),
            stats: Arc::new(RwLock::new(GateStats::default())),
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// The compiler backend.
    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Current pipeline counters.
    pub async fn stats(&self) -> GateStats {
        self.stats.read().await.clone()
    }

    fn pipeline_scanner(&self) -> BytecodeScanner {
        let scanner = BytecodeScanner::new(self.config.limits.max_code_size);
        if self.config.limits.skip_metadata {
            scanner.skipping_metadata()
        } else {
            scanner
        }
    }

    async fn compile(&self, sources: SourceMap) -> Result<CompilationOutput, GateError> {
        let input = CompilerInput {
            sources,
            optimizer_runs: self.config.compiler.optimizer_runs,
            evm_version: self.config.compiler.evm_version.clone(),
        };

        let _permit = self.compile_slots.acquire().await.map_err(|_| {
            CompileError::CompilerUnavailable("compilation pool is closed".to_string())
        })?;

        let timeout = self.config.compiler.timeout();
        let started = Instant::now();
        let output = tokio::time::timeout(timeout, self.compiler.compile(&input))
            .await
            .map_err(|_| GateError::Timeout {
                timeout_ms: self.config.compiler.timeout_ms,
            })??;

        info!(
            compiler = self.compiler.name(),
            contracts = output.contracts.len(),
            warnings = output.warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Compilation finished"
        );
        Ok(output)
    }

    async fn run_pipeline(
        &self,
        run_id: Uuid,
        sources: SourceMap,
        options: ScanOptions,
    ) -> Result<CompileAndScanResult, GateError> {
        if sources.is_empty() {
            return Err(GateError::MalformedInput(
                "no source files were provided".to_string(),
            ));
        }

        let combined_source = sources.values().map(String::as_str).collect::<Vec<_>>().join("\n");

        let source_report = self.source_scanner.scan(&combined_source);
        if !source_report.passed() {
            return Err(GateError::SourceScanFailure {
                findings: source_report.critical().to_vec(),
            });
        }
        info!(score = source_report.score(), "Source scan passed");

        let output = self.compile(sources).await?;

        let primary = select_primary(&output.contracts, options.primary_contract.as_deref())?;
        let primary_name = primary.name.clone();

        let bytecode_report = self.pipeline_scanner().scan_hex(&primary.deployed_bytecode)?;
        if !bytecode_report.passed() {
            return Err(GateError::BytecodeScanFailure {
                findings: bytecode_report.critical().to_vec(),
            });
        }
        info!(score = bytecode_report.score(), "Bytecode scan passed");

        let creation = decode_bytecode(&primary.creation_bytecode)?;
        let integrity_hashes = hash_parts(&combined_source, &creation);

        let combined = combined_score(source_report.score(), bytecode_report.score());

        Ok(CompileAndScanResult {
            run_id,
            source_report,
            bytecode_report,
            integrity_hashes,
            combined_score: combined,
            primary_contract: primary_name,
            compiler_warnings: output.warnings.clone(),
            contracts: output.into_map(),
        })
    }
}

/// Picks the deployment target from compiled artifacts.
fn select_primary<'a>(
    contracts: &'a [CompiledContract],
    requested: Option<&str>,
) -> Result<&'a CompiledContract, GateError> {
    match requested {
        Some(name) => {
            let contract = contracts.iter().find(|c| c.name == name).ok_or_else(|| {
                GateError::MalformedInput(format!("contract {name} was not produced by compilation"))
            })?;
            if contract.is_deployable() {
                Ok(contract)
            } else {
                Err(GateError::MalformedInput(format!(
                    "contract {name} has no runtime bytecode"
                )))
            }
        }
        None => contracts
            .iter()
            .find(|c| c.is_deployable())
            .ok_or(GateError::CompileFailure(CompileError::NoContracts)),
    }
}

fn summarize(findings: &[SecurityFinding]) -> String {
    findings
        .iter()
        .map(|f| f.code.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl<C: SolidityCompiler> ContractGateApi for GateService<C> {
    #[instrument(skip_all, fields(run_id = tracing::field::Empty, files = sources.len()))]
    async fn compile_and_scan_with(
        &self,
        sources: SourceMap,
        options: ScanOptions,
    ) -> Result<CompileAndScanResult, GateError> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        self.stats.write().await.runs += 1;

        let result = self.run_pipeline(run_id, sources, options).await;

        match &result {
            Ok(verdict) => {
                info!(
                    contract = %verdict.primary_contract,
                    score = verdict.combined_score,
                    combined_hash = %verdict.integrity_hashes.combined_hash,
                    "Contract passed the gate"
                );
            }
            Err(GateError::SourceScanFailure { findings })
            | Err(GateError::BytecodeScanFailure { findings }) => {
                warn!(codes = %summarize(findings), "Contract rejected by security scan");
            }
            Err(e) => {
                warn!(stage = ?e.stage(), error = %e, "Contract rejected");
            }
        }

        self.stats
            .write()
            .await
            .record(result.as_ref().map(|_| ()).map_err(GateError::stage));
        result
    }

    fn scan_source(&self, code: &str) -> SecurityReport {
        self.source_scanner.scan(code)
    }

    fn scan_bytecode(&self, bytecode_hex: &str) -> Result<SecurityReport, BytecodeError> {
        BytecodeScanner::new(self.config.limits.max_code_size).scan_hex(bytecode_hex)
    }

    fn validate(&self, source: &str) -> ValidationResult {
        validate_contract(source)
    }

    fn create_integrity_hash(
        &self,
        source: &str,
        bytecode_hex: &str,
    ) -> Result<IntegrityHashes, BytecodeError> {
        create_integrity_hash(source, bytecode_hex)
    }
}
