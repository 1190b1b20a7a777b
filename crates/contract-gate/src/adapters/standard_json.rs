//! # Solidity Standard-JSON Wire Types
//!
//! Request and response shapes of the compiler's `--standard-json`
//! interface, and the translation of a response into domain artifacts.

use crate::domain::artifacts::{CompilationOutput, CompiledContract, GasEstimates, SourceMap};
use crate::errors::CompileError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Outputs requested for every contract.
pub const OUTPUT_SELECTION: [&str; 4] = [
    "abi",
    "evm.bytecode.object",
    "evm.deployedBytecode.object",
    "evm.gasEstimates",
];

// =============================================================================
// REQUEST
// =============================================================================

/// Standard-JSON compiler input.
#[derive(Debug, Clone, Serialize)]
pub struct StandardJsonInput {
    language: &'static str,
    sources: BTreeMap<String, SourceContent>,
    settings: Settings,
}

#[derive(Debug, Clone, Serialize)]
struct SourceContent {
    content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    optimizer: Optimizer,
    #[serde(skip_serializing_if = "Option::is_none")]
    evm_version: Option<String>,
    output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize)]
struct Optimizer {
    enabled: bool,
    runs: u32,
}

impl StandardJsonInput {
    /// Builds a request over fully resolved sources.
    #[must_use]
    pub fn new(sources: &SourceMap, optimizer_runs: u32, evm_version: Option<&str>) -> Self {
        let selection: Vec<String> = OUTPUT_SELECTION.iter().map(ToString::to_string).collect();
        let output_selection = BTreeMap::from([(
            "*".to_string(),
            BTreeMap::from([("*".to_string(), selection)]),
        )]);

        Self {
            language: "Solidity",
            sources: sources
                .iter()
                .map(|(name, content)| {
                    (
                        name.clone(),
                        SourceContent {
                            content: content.clone(),
                        },
                    )
                })
                .collect(),
            settings: Settings {
                optimizer: Optimizer {
                    enabled: true,
                    runs: optimizer_runs,
                },
                evm_version: evm_version.map(str::to_string),
                output_selection,
            },
        }
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Standard-JSON compiler output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandardJsonOutput {
    #[serde(default)]
    errors: Vec<Diagnostic>,
    #[serde(default)]
    contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Diagnostic {
    severity: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    message: String,
    #[serde(default)]
    formatted_message: Option<String>,
    #[serde(default)]
    source_location: Option<SourceLocation>,
}

#[derive(Debug, Clone, Deserialize)]
struct SourceLocation {
    file: String,
    #[serde(default)]
    start: i64,
}

impl Diagnostic {
    fn summary(&self) -> String {
        let kind = self.kind.as_deref().unwrap_or("Error");
        match &self.source_location {
            Some(loc) if loc.start >= 0 => {
                format!("{kind}: {} ({}:{})", self.message, loc.file, loc.start)
            }
            Some(loc) => format!("{kind}: {} ({})", self.message, loc.file),
            None => format!("{kind}: {}", self.message),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ContractOutput {
    #[serde(default)]
    abi: serde_json::Value,
    #[serde(default)]
    evm: EvmOutput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvmOutput {
    #[serde(default)]
    bytecode: BytecodeOutput,
    #[serde(default)]
    deployed_bytecode: BytecodeOutput,
    #[serde(default)]
    gas_estimates: Option<GasEstimates>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BytecodeOutput {
    #[serde(default)]
    object: String,
}

impl StandardJsonOutput {
    /// Parses raw compiler stdout.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidOutput`] if stdout is not valid output JSON.
    pub fn parse(stdout: &[u8]) -> Result<Self, CompileError> {
        serde_json::from_slice(stdout).map_err(|e| CompileError::InvalidOutput(e.to_string()))
    }

    /// Converts the response into domain artifacts.
    ///
    /// Artifacts from `primary_files` come first, in that order, followed by
    /// artifacts of resolved dependencies.
    ///
    /// # Errors
    ///
    /// - [`CompileError::Diagnostics`] if any diagnostic has error severity
    ///   or a contract needs library linking
    /// - [`CompileError::DuplicateContract`] if a name is declared twice
    /// - [`CompileError::NoContracts`] if nothing was produced
    pub fn into_compilation(self, primary_files: &[String]) -> Result<CompilationOutput, CompileError> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for diagnostic in &self.errors {
            match diagnostic.severity.as_str() {
                "error" => errors.push(diagnostic.summary()),
                "warning" => warnings.push(
                    diagnostic
                        .formatted_message
                        .clone()
                        .unwrap_or_else(|| diagnostic.message.clone()),
                ),
                other => debug!(severity = other, message = %diagnostic.message, "Compiler note"),
            }
        }
        if !errors.is_empty() {
            return Err(CompileError::Diagnostics(errors));
        }

        let mut ordered_files: Vec<&String> = primary_files
            .iter()
            .filter(|f| self.contracts.contains_key(*f))
            .collect();
        ordered_files.extend(
            self.contracts
                .keys()
                .filter(|f| !primary_files.contains(f)),
        );

        let mut seen = HashSet::new();
        let mut unlinked = Vec::new();
        let mut contracts = Vec::new();

        for file in ordered_files {
            let Some(file_contracts) = self.contracts.get(file) else {
                continue;
            };
            for (name, output) in file_contracts {
                if !seen.insert(name.clone()) {
                    return Err(CompileError::DuplicateContract { name: name.clone() });
                }
                let creation = &output.evm.bytecode.object;
                let deployed = &output.evm.deployed_bytecode.object;
                if creation.contains("__$") || deployed.contains("__$") {
                    unlinked.push(format!(
                        "UNLINKED_LIBRARY: contract {name} in {file} requires external library linking"
                    ));
                    continue;
                }
                contracts.push(CompiledContract {
                    name: name.clone(),
                    source_file: file.clone(),
                    abi: output.abi.clone(),
                    creation_bytecode: normalize_hex(creation),
                    deployed_bytecode: normalize_hex(deployed),
                    gas_estimates: output.evm.gas_estimates.clone().unwrap_or_default(),
                });
            }
        }

        if !unlinked.is_empty() {
            return Err(CompileError::Diagnostics(unlinked));
        }
        if contracts.is_empty() {
            return Err(CompileError::NoContracts);
        }

        Ok(CompilationOutput {
            contracts,
            warnings,
        })
    }
}

fn normalize_hex(object: &str) -> String {
    let digits = object.strip_prefix("0x").unwrap_or(object);
    format!("0x{}", digits.to_ascii_lowercase())
}
