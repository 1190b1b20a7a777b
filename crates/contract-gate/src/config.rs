//! Gate configuration with validation.
//!
//! Defaults match the protocol constants; `from_env` overrides them from
//! `CG_*` environment variables.

use crate::domain::artifacts::DEFAULT_OPTIMIZER_RUNS;
use crate::domain::bytecode_scanner::MAX_CODE_SIZE;
use crate::domain::source_scanner::LARGE_SOURCE_BYTES;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Main gate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Compiler invocation settings.
    pub compiler: CompilerConfig,
    /// Scanner and concurrency limits.
    pub limits: LimitsConfig,
}

impl GateConfig {
    /// Builds a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CG_SOLC_PATH`: compiler binary (default: `solc`)
    /// - `CG_EVM_VERSION`: target EVM version (default: compiler default)
    /// - `CG_COMPILE_TIMEOUT_MS`: compile timeout (default: 60000)
    /// - `CG_IMPORT_PATHS`: colon-separated import search paths (default: `node_modules`)
    /// - `CG_TRUSTED_NAMESPACE`: importable namespace (default: `@openzeppelin/contracts/`)
    /// - `CG_MAX_COMPILATIONS`: concurrent compiler runs (default: 4)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let compiler = CompilerConfig {
            solc_path: env::var("CG_SOLC_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.compiler.solc_path),
            solc_args: defaults.compiler.solc_args,
            evm_version: env::var("CG_EVM_VERSION").ok().or(defaults.compiler.evm_version),
            timeout_ms: env::var("CG_COMPILE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.compiler.timeout_ms),
            import_paths: env::var("CG_IMPORT_PATHS")
                .map(|v| env::split_paths(&v).collect())
                .unwrap_or(defaults.compiler.import_paths),
            trusted_namespace: env::var("CG_TRUSTED_NAMESPACE")
                .unwrap_or(defaults.compiler.trusted_namespace),
            optimizer_runs: defaults.compiler.optimizer_runs,
        };

        let limits = LimitsConfig {
            max_concurrent_compilations: env::var("CG_MAX_COMPILATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.limits.max_concurrent_compilations),
            ..defaults.limits
        };

        Self { compiler, limits }
    }

    /// Validates configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compiler.optimizer_runs == 0 {
            return Err(ConfigError::ZeroOptimizerRuns);
        }
        if self.compiler.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.compiler.trusted_namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        if self.limits.max_concurrent_compilations == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.limits.max_code_size == 0 {
            return Err(ConfigError::ZeroCodeSize);
        }
        Ok(())
    }
}

/// Compiler invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Path or name of the `solc` binary.
    pub solc_path: PathBuf,
    /// Arguments placed before `--standard-json`, for wrappers such as
    /// `docker run ... solc`.
    pub solc_args: Vec<String>,
    /// Optimizer runs; the optimizer is always on.
    pub optimizer_runs: u32,
    /// Target EVM version.
    pub evm_version: Option<String>,
    /// Compile timeout in milliseconds.
    pub timeout_ms: u64,
    /// Only imports under this prefix are resolved from disk.
    pub trusted_namespace: String,
    /// Directories searched for trusted imports.
    pub import_paths: Vec<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            solc_path: PathBuf::from("solc"),
            solc_args: Vec::new(),
            optimizer_runs: DEFAULT_OPTIMIZER_RUNS,
            evm_version: None,
            timeout_ms: 60_000,
            trusted_namespace: "@openzeppelin/contracts/".to_string(),
            import_paths: vec![PathBuf::from("node_modules")],
        }
    }
}

impl CompilerConfig {
    /// Compile timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Scanner and concurrency limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Concurrent compiler invocations.
    pub max_concurrent_compilations: usize,
    /// Deployed bytecode size ceiling in bytes.
    pub max_code_size: usize,
    /// Source size above which `LARGE_SOURCE` is reported.
    pub large_source_bytes: usize,
    /// Stop the pipeline's bytecode walk at a trailing CBOR metadata block.
    /// Off by default so every byte of deployed code is inspected.
    pub skip_metadata: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_compilations: 4,
            max_code_size: MAX_CODE_SIZE,
            large_source_bytes: LARGE_SOURCE_BYTES,
            skip_metadata: false,
        }
    }
}
