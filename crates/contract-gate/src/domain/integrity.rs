//! # Integrity Hashing
//!
//! Binds reviewed source to compiled bytecode:
//!
//! - `source_hash   = SHA256(utf8(source))`
//! - `bytecode_hash = SHA256(decoded bytecode bytes)`
//! - `combined_hash = SHA256(hex(source_hash) ++ hex(bytecode_hash))`
//!
//! Bytecode is hashed as raw bytes, so the `0x` prefix and hex letter case
//! never change the digest.

use crate::domain::bytecode_scanner::decode_bytecode;
use crate::errors::BytecodeError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The attestation triple. Each field is `0x` + 64 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityHashes {
    /// Digest of the source text.
    pub source_hash: String,
    /// Digest of the decoded bytecode.
    pub bytecode_hash: String,
    /// Digest binding both.
    pub combined_hash: String,
}

impl IntegrityHashes {
    /// Re-hashes `source` and `bytecode` and compares against this triple.
    ///
    /// # Errors
    ///
    /// Returns [`BytecodeError`] if `bytecode` is not valid hex.
    pub fn verify(&self, source: &str, bytecode: &str) -> Result<bool, BytecodeError> {
        Ok(create_integrity_hash(source, bytecode)?.combined_hash == self.combined_hash)
    }
}

/// Computes the integrity triple for `source` and hex `bytecode`.
///
/// # Errors
///
/// Returns [`BytecodeError`] if `bytecode` is not valid hex.
pub fn create_integrity_hash(source: &str, bytecode: &str) -> Result<IntegrityHashes, BytecodeError> {
    let code = decode_bytecode(bytecode)?;
    Ok(hash_parts(source, &code))
}

/// Computes the integrity triple for already-decoded bytecode.
#[must_use]
pub fn hash_parts(source: &str, bytecode: &[u8]) -> IntegrityHashes {
    let source_digest = hex::encode(Sha256::digest(source.as_bytes()));
    let bytecode_digest = hex::encode(Sha256::digest(bytecode));

    let mut combined = Sha256::new();
    combined.update(source_digest.as_bytes());
    combined.update(bytecode_digest.as_bytes());
    let combined_digest = hex::encode(combined.finalize());

    IntegrityHashes {
        source_hash: format!("0x{source_digest}"),
        bytecode_hash: format!("0x{bytecode_digest}"),
        combined_hash: format!("0x{combined_digest}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_digest(value: &str) -> bool {
        value.len() == 66
            && value.starts_with("0x")
            && value[2..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn test_known_digests() {
        let hashes = create_integrity_hash("", "0x00").unwrap();
        // SHA-256 of the empty string.
        assert_eq!(
            hashes.source_hash,
            "0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        // SHA-256 of a single zero byte.
        assert_eq!(
            hashes.bytecode_hash,
            "0x6e340b9cffb37a989ca544e6bb780a2c78901d3fb33738768511a30617afa01d"
        );
    }

    #[test]
    fn test_format() {
        let hashes = create_integrity_hash("contract A {}", "0x6080").unwrap();
        assert!(is_digest(&hashes.source_hash));
        assert!(is_digest(&hashes.bytecode_hash));
        assert!(is_digest(&hashes.combined_hash));
    }

    #[test]
    fn test_combined_is_hash_of_hex_digests() {
        let hashes = create_integrity_hash("src", "6080").unwrap();
        let text = format!("{}{}", &hashes.source_hash[2..], &hashes.bytecode_hash[2..]);
        let expected = format!("0x{}", hex::encode(Sha256::digest(text.as_bytes())));
        assert_eq!(hashes.combined_hash, expected);
    }

    #[test]
    fn test_prefix_and_case_invariant() {
        let a = create_integrity_hash("src", "0x60ABcd").unwrap();
        let b = create_integrity_hash("src", "60abcd").unwrap();
        let c = create_integrity_hash("src", "0X60ABCD").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_same_bytecode_different_source() {
        let a = create_integrity_hash("contract A { }", "0x6080604052").unwrap();
        let b = create_integrity_hash("contract A {}", "0x6080604052").unwrap();
        assert_eq!(a.bytecode_hash, b.bytecode_hash);
        assert_ne!(a.source_hash, b.source_hash);
        assert_ne!(a.combined_hash, b.combined_hash);
    }

    #[test]
    fn test_verify() {
        let hashes = create_integrity_hash("src", "0x6080").unwrap();
        assert!(hashes.verify("src", "6080").unwrap());
        assert!(!hashes.verify("src", "6081").unwrap());
        assert!(!hashes.verify("src2", "6080").unwrap());
        assert!(hashes.verify("src", "xyz").is_err());
    }

    #[test]
    fn test_malformed_bytecode() {
        assert_eq!(
            create_integrity_hash("src", "0x6"),
            Err(BytecodeError::OddLength { len: 1 })
        );
    }

    proptest! {
        #[test]
        fn prop_idempotent(source in ".*", code in prop::collection::vec(any::<u8>(), 1..64)) {
            let hex_code = hex::encode(&code);
            let first = create_integrity_hash(&source, &hex_code).unwrap();
            let second = create_integrity_hash(&source, &format!("0x{}", hex_code.to_uppercase())).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_combined_tracks_components(source in ".{0,32}", code in prop::collection::vec(any::<u8>(), 1..32)) {
            let base = hash_parts(&source, &code);
            let mut other_code = code.clone();
            other_code[0] ^= 0x01;
            let changed = hash_parts(&source, &other_code);
            prop_assert_ne!(&base.bytecode_hash, &changed.bytecode_hash);
            prop_assert_ne!(&base.combined_hash, &changed.combined_hash);

            let other_source = format!("{source}!");
            let changed = hash_parts(&other_source, &code);
            prop_assert_ne!(&base.source_hash, &changed.source_hash);
            prop_assert_ne!(&base.combined_hash, &changed.combined_hash);
        }
    }
}
