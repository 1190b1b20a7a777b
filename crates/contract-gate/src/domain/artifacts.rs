//! # Compiled Artifacts
//!
//! Compiler inputs and outputs as seen by the domain. Artifacts are created
//! once by a compiler adapter and consumed read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Filename → Solidity source.
pub type SourceMap = BTreeMap<String, String>;

/// Optimizer runs used for every compilation unless configured otherwise.
pub const DEFAULT_OPTIMIZER_RUNS: u32 = 200;

/// What a compiler port is asked to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerInput {
    /// Caller-provided sources, before import resolution.
    pub sources: SourceMap,
    /// Optimizer runs; the optimizer is always enabled.
    pub optimizer_runs: u32,
    /// Target EVM version, compiler default if `None`.
    pub evm_version: Option<String>,
}

impl CompilerInput {
    /// Input with the default optimizer settings.
    #[must_use]
    pub fn new(sources: SourceMap) -> Self {
        Self {
            sources,
            optimizer_runs: DEFAULT_OPTIMIZER_RUNS,
            evm_version: None,
        }
    }
}

/// Deployment cost estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationGas {
    /// Cost of storing the deployed code.
    pub code_deposit_cost: String,
    /// Cost of running the constructor.
    pub execution_cost: String,
    /// Sum of both.
    pub total_cost: String,
}

/// Gas estimates reported by the compiler. Values are decimal strings or
/// `"infinite"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimates {
    /// Deployment cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation: Option<CreationGas>,
    /// External/public function signature → estimate.
    #[serde(default)]
    pub external: BTreeMap<String, String>,
    /// Internal function signature → estimate.
    #[serde(default)]
    pub internal: BTreeMap<String, String>,
}

/// One compiled contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledContract {
    /// Contract name, unique within a compilation.
    pub name: String,
    /// File that declares the contract.
    pub source_file: String,
    /// ABI as emitted by the compiler.
    pub abi: serde_json::Value,
    /// Creation (init) bytecode, `0x`-prefixed hex.
    pub creation_bytecode: String,
    /// Runtime bytecode, `0x`-prefixed hex.
    pub deployed_bytecode: String,
    /// Gas estimates.
    pub gas_estimates: GasEstimates,
}

impl CompiledContract {
    /// True if the contract has runtime code (interfaces and abstract
    /// contracts do not).
    #[must_use]
    pub fn is_deployable(&self) -> bool {
        let code = self
            .deployed_bytecode
            .strip_prefix("0x")
            .unwrap_or(&self.deployed_bytecode);
        !code.is_empty()
    }
}

/// Result of a successful compilation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompilationOutput {
    /// Artifacts in compiler output order: files by name, then contracts by
    /// name within each file.
    pub contracts: Vec<CompiledContract>,
    /// Warning-severity diagnostics, unmodified.
    pub warnings: Vec<String>,
}

impl CompilationOutput {
    /// Looks up a contract by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CompiledContract> {
        self.contracts.iter().find(|c| c.name == name)
    }

    /// The deployment target: the first contract with runtime code.
    #[must_use]
    pub fn primary(&self) -> Option<&CompiledContract> {
        self.contracts.iter().find(|c| c.is_deployable())
    }

    /// Contracts keyed by name.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, CompiledContract> {
        self.contracts
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect()
    }
}
