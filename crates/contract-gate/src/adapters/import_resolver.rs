//! # Filesystem Import Resolution
//!
//! Serves imports under a single trusted namespace from local search paths,
//! and expands a caller's source map into the closure of everything it
//! imports.

use crate::config::CompilerConfig;
use crate::domain::artifacts::SourceMap;
use crate::domain::imports::{extract_imports, resolve_import};
use crate::errors::{CompileError, ImportError};
use crate::ports::outbound::ImportResolver;
use std::collections::VecDeque;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Resolves imports under `namespace` from the first search path that
/// contains them.
#[derive(Debug, Clone)]
pub struct FilesystemImportResolver {
    namespace: String,
    search_paths: Vec<PathBuf>,
}

impl FilesystemImportResolver {
    /// Creates a resolver for `namespace` (e.g. `@openzeppelin/contracts/`).
    ///
    /// A trailing `/` is added when missing so the namespace only matches
    /// whole path segments.
    pub fn new(namespace: impl Into<String>, search_paths: Vec<PathBuf>) -> Self {
        let mut namespace = namespace.into();
        if !namespace.ends_with('/') {
            namespace.push('/');
        }
        Self {
            namespace,
            search_paths,
        }
    }

    /// Resolver configured from compiler settings.
    #[must_use]
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self::new(config.trusted_namespace.clone(), config.import_paths.clone())
    }

    /// The trusted prefix.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl ImportResolver for FilesystemImportResolver {
    fn resolve(&self, path: &str) -> Result<String, ImportError> {
        if !path.starts_with(&self.namespace) {
            return Err(ImportError::OutsideNamespace {
                path: path.to_string(),
                namespace: self.namespace.clone(),
            });
        }

        let relative = Path::new(path);
        let escapes = path.contains('\\')
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(ImportError::Traversal(path.to_string()));
        }

        for root in &self.search_paths {
            let candidate = root.join(relative);
            match fs::read_to_string(&candidate) {
                Ok(contents) => {
                    debug!(import = path, file = %candidate.display(), "Resolved import");
                    return Ok(contents);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ImportError::Unreadable {
                        path: path.to_string(),
                        reason: e.to_string(),
                    })
                }
            }
        }

        Err(ImportError::NotFound(path.to_string()))
    }
}

/// Expands `sources` with every transitively imported source unit.
///
/// Caller-provided files always win over resolver contents. Every import
/// that cannot be served is collected before failing, so the caller sees the
/// complete list at once.
///
/// # Errors
///
/// Returns [`CompileError::UnresolvedImports`] listing each import path that
/// escapes the source tree or that `resolver` refused.
pub fn resolve_sources(
    sources: &SourceMap,
    resolver: &dyn ImportResolver,
) -> Result<SourceMap, CompileError> {
    let mut resolved = sources.clone();
    let mut pending: VecDeque<String> = sources.keys().cloned().collect();
    let mut unresolved: Vec<String> = Vec::new();

    while let Some(file) = pending.pop_front() {
        let Some(content) = resolved.get(&file) else {
            continue;
        };

        for import in extract_imports(content) {
            let Some(unit) = resolve_import(&file, &import) else {
                warn!(importer = %file, import = %import, "Import escapes source tree");
                if !unresolved.contains(&import) {
                    unresolved.push(import);
                }
                continue;
            };
            if resolved.contains_key(&unit) || unresolved.contains(&unit) {
                continue;
            }
            match resolver.resolve(&unit) {
                Ok(contents) => {
                    resolved.insert(unit.clone(), contents);
                    pending.push_back(unit);
                }
                Err(e) => {
                    warn!(importer = %file, error = %e, "Import rejected");
                    unresolved.push(unit);
                }
            }
        }
    }

    if unresolved.is_empty() {
        Ok(resolved)
    } else {
        Err(CompileError::UnresolvedImports(unresolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::NoImports;
    use tempfile::TempDir;

    const NAMESPACE: &str = "@openzeppelin/contracts/";

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn fixture() -> (TempDir, FilesystemImportResolver) {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "@openzeppelin/contracts/access/Ownable.sol",
            "pragma solidity ^0.8.20;\nimport \"../utils/Context.sol\";\nabstract contract Ownable is Context {}",
        );
        write(
            dir.path(),
            "@openzeppelin/contracts/utils/Context.sol",
            "pragma solidity ^0.8.20;\nabstract contract Context {}",
        );
        write(dir.path(), "evil/Backdoor.sol", "contract Backdoor {}");
        let resolver = FilesystemImportResolver::new(NAMESPACE, vec![dir.path().to_path_buf()]);
        (dir, resolver)
    }

    fn sources(entries: &[(&str, &str)]) -> SourceMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_resolves_trusted_file() {
        let (_dir, resolver) = fixture();
        let contents = resolver
            .resolve("@openzeppelin/contracts/utils/Context.sol")
            .unwrap();
        assert!(contents.contains("abstract contract Context"));
    }

    #[test]
    fn test_rejects_outside_namespace() {
        let (_dir, resolver) = fixture();
        assert!(matches!(
            resolver.resolve("evil/Backdoor.sol"),
            Err(ImportError::OutsideNamespace { .. })
        ));
        assert!(matches!(
            resolver.resolve("@openzeppelin/contracts-upgradeable/proxy/utils/UUPSUpgradeable.sol"),
            Err(ImportError::OutsideNamespace { .. })
        ));
    }

    #[test]
    fn test_namespace_matches_whole_segments() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "@openzeppelin/contracts/utils/Context.sol",
            "abstract contract Context {}",
        );
        write(
            dir.path(),
            "@openzeppelin/contracts-upgradeable/proxy/utils/UUPSUpgradeable.sol",
            "abstract contract UUPSUpgradeable {}",
        );
        let resolver = FilesystemImportResolver::new(
            "@openzeppelin/contracts",
            vec![dir.path().to_path_buf()],
        );

        assert_eq!(resolver.namespace(), NAMESPACE);
        assert!(resolver
            .resolve("@openzeppelin/contracts/utils/Context.sol")
            .is_ok());
        assert_eq!(
            resolver.resolve("@openzeppelin/contracts-upgradeable/proxy/utils/UUPSUpgradeable.sol"),
            Err(ImportError::OutsideNamespace {
                path: "@openzeppelin/contracts-upgradeable/proxy/utils/UUPSUpgradeable.sol"
                    .to_string(),
                namespace: NAMESPACE.to_string(),
            })
        );
    }

    #[test]
    fn test_rejects_traversal() {
        let (_dir, resolver) = fixture();
        assert_eq!(
            resolver.resolve("@openzeppelin/contracts/../../evil/Backdoor.sol"),
            Err(ImportError::Traversal(
                "@openzeppelin/contracts/../../evil/Backdoor.sol".to_string()
            ))
        );
    }

    #[test]
    fn test_missing_file() {
        let (_dir, resolver) = fixture();
        assert_eq!(
            resolver.resolve("@openzeppelin/contracts/Missing.sol"),
            Err(ImportError::NotFound(
                "@openzeppelin/contracts/Missing.sol".to_string()
            ))
        );
    }

    #[test]
    fn test_search_paths_in_order() {
        let (first, _) = fixture();
        let second = TempDir::new().unwrap();
        write(
            second.path(),
            "@openzeppelin/contracts/utils/Extra.sol",
            "library Extra {}",
        );
        let resolver = FilesystemImportResolver::new(
            NAMESPACE,
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
        );
        assert_eq!(
            resolver
                .resolve("@openzeppelin/contracts/utils/Extra.sol")
                .unwrap(),
            "library Extra {}"
        );
    }

    #[test]
    fn test_transitive_closure() {
        let (_dir, resolver) = fixture();
        let input = sources(&[(
            "Token.sol",
            "import \"@openzeppelin/contracts/access/Ownable.sol\";\ncontract Token is Ownable {}",
        )]);
        let all = resolve_sources(&input, &resolver).unwrap();
        let names: Vec<&str> = all.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "@openzeppelin/contracts/access/Ownable.sol",
                "@openzeppelin/contracts/utils/Context.sol",
                "Token.sol",
            ]
        );
    }

    #[test]
    fn test_caller_files_satisfy_relative_imports() {
        let input = sources(&[
            ("Token.sol", "import \"./Base.sol\";\ncontract Token is Base {}"),
            ("Base.sol", "contract Base {}"),
        ]);
        let all = resolve_sources(&input, &NoImports).unwrap();
        assert_eq!(all, input);
    }

    #[test]
    fn test_every_unresolved_import_is_reported() {
        let (_dir, resolver) = fixture();
        let input = sources(&[(
            "Token.sol",
            "import \"evil/Backdoor.sol\";\nimport \"./Missing.sol\";\nimport \"../Up.sol\";\ncontract Token {}",
        )]);
        assert_eq!(
            resolve_sources(&input, &resolver),
            Err(CompileError::UnresolvedImports(vec![
                "evil/Backdoor.sol".to_string(),
                "Missing.sol".to_string(),
                "../Up.sol".to_string(),
            ]))
        );
    }
}
