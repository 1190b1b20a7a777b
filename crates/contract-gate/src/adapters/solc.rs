//! # `solc` Process Adapter
//!
//! Runs the native compiler in `--standard-json` mode. Imports are expanded
//! before the process starts, so the compiler never touches the filesystem.

use super::import_resolver::{resolve_sources, FilesystemImportResolver};
use super::standard_json::{StandardJsonInput, StandardJsonOutput};
use crate::config::CompilerConfig;
use crate::domain::artifacts::{CompilationOutput, CompilerInput};
use crate::errors::CompileError;
use crate::ports::outbound::{ImportResolver, SolidityCompiler};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Compiler backed by a `solc` binary.
#[derive(Clone)]
pub struct SolcCompiler {
    program: PathBuf,
    args: Vec<String>,
    resolver: Arc<dyn ImportResolver>,
}

impl SolcCompiler {
    /// Creates an adapter for `program` with the given import resolver.
    pub fn new(program: impl Into<PathBuf>, resolver: Arc<dyn ImportResolver>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            resolver,
        }
    }

    /// Adapter configured from compiler settings, resolving imports from
    /// the filesystem.
    #[must_use]
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            program: config.solc_path.clone(),
            args: config.solc_args.clone(),
            resolver: Arc::new(FilesystemImportResolver::from_config(config)),
        }
    }

    /// Arguments placed before `--standard-json`.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    async fn run(&self, request: Vec<u8>) -> Result<Vec<u8>, CompileError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CompileError::CompilerUnavailable(format!("{}: {e}", self.program.display()))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CompileError::Io("compiler stdin not captured".to_string()))?;
        let write = async move {
            stdin.write_all(&request).await?;
            stdin.shutdown().await
        };
        let (_, output) = tokio::try_join!(write, child.wait_with_output())?;

        if !output.status.success() && output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CompileError::CompilerUnavailable(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

impl std::fmt::Debug for SolcCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolcCompiler")
            .field("program", &self.program)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SolidityCompiler for SolcCompiler {
    #[instrument(skip_all, fields(files = input.sources.len()))]
    async fn compile(&self, input: &CompilerInput) -> Result<CompilationOutput, CompileError> {
        let sources = resolve_sources(&input.sources, self.resolver.as_ref())?;
        debug!(
            resolved = sources.len() - input.sources.len(),
            "Imports resolved"
        );

        let request =
            StandardJsonInput::new(&sources, input.optimizer_runs, input.evm_version.as_deref());
        let payload = serde_json::to_vec(&request)
            .map_err(|e| CompileError::Io(format!("encoding compiler input: {e}")))?;

        let stdout = self.run(payload).await?;
        let primary_files: Vec<String> = input.sources.keys().cloned().collect();
        StandardJsonOutput::parse(&stdout)?.into_compilation(&primary_files)
    }

    fn name(&self) -> &str {
        "solc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::artifacts::SourceMap;
    use crate::ports::outbound::NoImports;

    fn input(source: &str) -> CompilerInput {
        CompilerInput::new(SourceMap::from([(
            "Token.sol".to_string(),
            source.to_string(),
        )]))
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let compiler = SolcCompiler::new("/nonexistent/bin/solc", Arc::new(NoImports));
        let err = compiler.compile(&input("contract Token {}")).await.unwrap_err();
        assert!(matches!(err, CompileError::CompilerUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unresolved_imports_fail_before_spawn() {
        let compiler = SolcCompiler::new("/nonexistent/bin/solc", Arc::new(NoImports));
        let err = compiler
            .compile(&input("import \"./Base.sol\";\ncontract Token is Base {}"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::UnresolvedImports(vec!["Base.sol".to_string()])
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_canned_compiler_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fake-solc.sh");
        std::fs::write(
            &script,
            r#"cat > /dev/null
cat <<'EOF'
{"contracts":{"Token.sol":{"Token":{"abi":[],"evm":{"bytecode":{"object":"6080604052"},"deployedBytecode":{"object":"6080"}}}}}}
EOF
"#,
        )
        .unwrap();

        let compiler = SolcCompiler::new("sh", Arc::new(NoImports))
            .with_args(vec![script.display().to_string()]);
        let output = compiler.compile(&input("contract Token {}")).await.unwrap();
        let token = output.primary().unwrap();
        assert_eq!(token.name, "Token");
        assert_eq!(token.creation_bytecode, "0x6080604052");
        assert_eq!(compiler.name(), "solc");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_process_without_output() {
        let compiler = SolcCompiler::new("sh", Arc::new(NoImports))
            .with_args(vec!["-c".to_string(), "cat > /dev/null; echo boom >&2; exit 3".to_string()]);
        let err = compiler.compile(&input("contract Token {}")).await.unwrap_err();
        match err {
            CompileError::CompilerUnavailable(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
