//! # Domain Layer (Inner Hexagon)
//!
//! Pure analysis logic: scanners, scorer, hasher and artifact model.
//! NO I/O, NO async.

pub mod artifacts;
pub mod bytecode_scanner;
pub mod findings;
pub mod imports;
pub mod integrity;
pub mod opcodes;
pub mod rules;
pub mod scoring;
pub mod source_scanner;
pub mod validation;
pub mod version;

pub use artifacts::*;
pub use bytecode_scanner::{decode_bytecode, scan_bytecode, BytecodeScanner, MAX_CODE_SIZE};
pub use findings::*;
pub use integrity::*;
pub use scoring::{combined_score, score};
pub use source_scanner::{scan_source_code, SourceScanner, LARGE_SOURCE_BYTES};
pub use validation::*;
pub use version::SolidityVersion;
