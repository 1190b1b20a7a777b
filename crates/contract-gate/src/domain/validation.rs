//! # Contract Pre-check
//!
//! Cheap structural checks run before the compile and scan path. Advisory
//! only: passing here never substitutes for the scanners.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static LICENSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SPDX-License-Identifier:\s*\S+").expect("valid license regex")
});

static PRAGMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bpragma\s+solidity\b").expect("valid pragma regex")
});

static CONTRACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcontract\s+[A-Za-z_$][A-Za-z0-9_$]*").expect("valid contract regex")
});

/// Outcome of [`validate_contract`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when `errors` is empty.
    pub valid: bool,
    /// One message per failed check.
    pub errors: Vec<String>,
}

/// Checks for a license header, a version pragma and a contract declaration.
#[must_use]
pub fn validate_contract(source: &str) -> ValidationResult {
    let mut errors = Vec::new();

    if !LICENSE.is_match(source) {
        errors.push("Missing SPDX license identifier".to_string());
    }
    if !PRAGMA.is_match(source) {
        errors.push("Missing pragma solidity version declaration".to_string());
    }
    if !CONTRACT.is_match(source) {
        errors.push("No contract declaration found".to_string());
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}
