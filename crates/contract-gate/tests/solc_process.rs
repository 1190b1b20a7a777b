//! # Compiler Process Tests
//!
//! Drives the gate through the `solc` adapter with a shell stand-in for the
//! compiler binary and a temporary `node_modules` tree.

#![cfg(unix)]

use contract_gate::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TOKEN: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import "@openzeppelin/contracts/access/Ownable.sol";

contract Token is Ownable {
    constructor() Ownable(msg.sender) {}
}
"#;

const OWNABLE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import "../utils/Context.sol";

abstract contract Ownable is Context {
    constructor(address) {}
}
"#;

const CONTEXT: &str = "// SPDX-License-Identifier: MIT\npragma solidity ^0.8.20;\nabstract contract Context {}\n";

/// Canned standard-JSON response. The library file sorts before the
/// caller's file, so artifact ordering must still prefer `Token.sol`.
const RESPONSE: &str = r#"{
  "errors": [
    {"severity": "warning", "type": "Warning", "message": "Function state mutability can be restricted to pure",
     "formattedMessage": "Warning: Function state mutability can be restricted to pure"}
  ],
  "contracts": {
    "@openzeppelin/contracts/access/Ownable.sol": {
      "Ownable": {"abi": [], "evm": {"bytecode": {"object": ""}, "deployedBytecode": {"object": ""}}}
    },
    "@openzeppelin/contracts/utils/Context.sol": {
      "Context": {"abi": [], "evm": {"bytecode": {"object": ""}, "deployedBytecode": {"object": ""}}}
    },
    "Token.sol": {
      "Token": {"abi": [], "evm": {
        "bytecode": {"object": "6080604052348015600e575f80fd5b50"},
        "deployedBytecode": {"object": "6080604052600436106100295760003560e01c"}
      }}
    }
  }
}"#;

struct Fixture {
    _dir: TempDir,
    config: GateConfig,
    request_log: std::path::PathBuf,
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Shell script that saves the request and prints `response`.
fn fixture(response: &str) -> Fixture {
    gate_telemetry::init_test_logging();
    let dir = TempDir::new().unwrap();
    let modules = dir.path().join("node_modules");
    write(&modules, "@openzeppelin/contracts/access/Ownable.sol", OWNABLE);
    write(&modules, "@openzeppelin/contracts/utils/Context.sol", CONTEXT);

    let request_log = dir.path().join("request.json");
    let response_file = dir.path().join("response.json");
    fs::write(&response_file, response).unwrap();
    let script = dir.path().join("solc.sh");
    fs::write(
        &script,
        format!(
            "cat > '{}'\ncat '{}'\n",
            request_log.display(),
            response_file.display()
        ),
    )
    .unwrap();

    let mut config = GateConfig::default();
    config.compiler.solc_path = "sh".into();
    config.compiler.solc_args = vec![script.display().to_string()];
    config.compiler.import_paths = vec![modules];

    Fixture {
        _dir: dir,
        config,
        request_log,
    }
}

fn gate(fixture: &Fixture) -> GateService<SolcCompiler> {
    let compiler = SolcCompiler::from_config(&fixture.config.compiler);
    GateService::new(compiler, fixture.config.clone()).unwrap()
}

fn token_sources(source: &str) -> SourceMap {
    SourceMap::from([("Token.sol".to_string(), source.to_string())])
}

#[tokio::test]
async fn test_trusted_imports_are_inlined_into_request() {
    let fixture = fixture(RESPONSE);
    let verdict = gate(&fixture)
        .compile_and_scan(token_sources(TOKEN))
        .await
        .unwrap();

    assert_eq!(verdict.primary_contract, "Token");
    assert_eq!(verdict.contracts.len(), 3);
    assert_eq!(verdict.compiler_warnings.len(), 1);

    let request: serde_json::Value =
        serde_json::from_slice(&fs::read(&fixture.request_log).unwrap()).unwrap();
    let sources = request["sources"].as_object().unwrap();
    assert_eq!(sources.len(), 3);
    assert_eq!(
        request["sources"]["@openzeppelin/contracts/utils/Context.sol"]["content"],
        CONTEXT
    );
    assert_eq!(request["settings"]["optimizer"]["enabled"], true);
    assert_eq!(request["settings"]["optimizer"]["runs"], 200);
}

#[tokio::test]
async fn test_untrusted_import_fails_compilation() {
    let fixture = fixture(RESPONSE);
    let source = TOKEN.replace(
        "@openzeppelin/contracts/access/Ownable.sol",
        "evil/Ownable.sol",
    );

    let err = gate(&fixture)
        .compile_and_scan(token_sources(&source))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), GateStage::Compile);
    assert_eq!(err.to_string(), "IMPORT_NOT_FOUND: evil/Ownable.sol");
    assert!(!fixture.request_log.exists());
}

#[tokio::test]
async fn test_error_diagnostics_are_aggregated() {
    let fixture = fixture(
        r#"{"errors": [
            {"severity": "error", "type": "ParserError", "message": "Expected ';' but got '}'"},
            {"severity": "error", "type": "DeclarationError", "message": "Undeclared identifier."}
        ]}"#,
    );

    let err = gate(&fixture)
        .compile_and_scan(token_sources(TOKEN))
        .await
        .unwrap_err();

    match err {
        GateError::CompileFailure(CompileError::Diagnostics(messages)) => {
            assert_eq!(messages.len(), 2);
            assert!(messages[0].starts_with("ParserError"));
            assert!(messages[1].starts_with("DeclarationError"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
