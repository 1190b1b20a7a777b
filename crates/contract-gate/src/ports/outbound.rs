//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the gate depends on. Adapters implement these to provide:
//! - Solidity compilation (an external, versioned tool)
//! - Import contents for the trusted dependency namespace
//!
//! Scanning and hashing never see these traits; swapping a compiler backend
//! does not touch them.

use crate::domain::artifacts::{CompilationOutput, CompilerInput};
use crate::errors::{CompileError, ImportError};
use async_trait::async_trait;

// =============================================================================
// COMPILER
// =============================================================================

/// Narrow `compile(sources) -> artifacts | diagnostics` interface.
///
/// ## Implementation Notes
///
/// Implementations must:
/// 1. Compile with the optimizer enabled using `input.optimizer_runs`
/// 2. Fail with every error-severity diagnostic aggregated
/// 3. Pass warning-severity diagnostics through unmodified
/// 4. Index artifacts by contract name
/// 5. Stop the underlying tool when the returned future is dropped
#[async_trait]
pub trait SolidityCompiler: Send + Sync {
    /// Compiles `input` into artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] on diagnostics, unresolved imports or tool
    /// failure.
    async fn compile(&self, input: &CompilerInput) -> Result<CompilationOutput, CompileError>;

    /// Human-readable backend name for logs.
    fn name(&self) -> &str {
        "solidity-compiler"
    }
}

// =============================================================================
// IMPORT RESOLUTION
// =============================================================================

/// Supplies source text for imports the caller did not provide.
pub trait ImportResolver: Send + Sync {
    /// Returns the contents of the source unit `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] if the path is not trusted or not found.
    fn resolve(&self, path: &str) -> Result<String, ImportError>;
}

/// Resolver that serves nothing. Every import must be caller-provided.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImports;

impl ImportResolver for NoImports {
    fn resolve(&self, path: &str) -> Result<String, ImportError> {
        Err(ImportError::NotFound(path.to_string()))
    }
}
