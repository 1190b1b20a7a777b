//! # Bytecode Scanner
//!
//! Linear instruction-boundary walk over EVM bytecode.
//!
//! PUSH1..PUSH32 carry up to 32 bytes of immediate data which may contain any
//! byte value, including the forbidden opcodes. Searching raw bytes for
//! `0xFF` therefore produces false positives; the walker skips every PUSH
//! immediate untouched and inspects only bytes that start an instruction.

use crate::domain::findings::{ReportBuilder, ScanType, SecurityFinding, SecurityReport, Severity};
use crate::domain::opcodes::{push_size, ForbiddenOpcode};
use crate::errors::BytecodeError;
use tracing::debug;

/// EIP-170 deployed code size ceiling.
pub const MAX_CODE_SIZE: usize = 24_576;

/// Finding codes emitted by the bytecode scanner besides the opcode codes.
pub mod codes {
    /// Deployed code above the size ceiling.
    pub const CONTRACT_TOO_LARGE: &str = "CONTRACT_TOO_LARGE";
    /// Size and utilisation, always emitted.
    pub const BYTECODE_SIZE: &str = "BYTECODE_SIZE";
}

// =============================================================================
// HEX DECODING
// =============================================================================

/// Decodes hex bytecode, accepting an optional `0x`/`0X` prefix and either
/// letter case.
///
/// # Errors
///
/// Returns [`BytecodeError`] for empty input, odd length or non-hex
/// characters.
pub fn decode_bytecode(bytecode: &str) -> Result<Vec<u8>, BytecodeError> {
    let trimmed = bytecode.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(BytecodeError::Empty);
    }

    hex::decode(digits).map_err(|err| match err {
        hex::FromHexError::InvalidHexCharacter { c, index } => BytecodeError::InvalidHex {
            position: index,
            character: c,
        },
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            BytecodeError::OddLength { len: digits.len() }
        }
    })
}

// =============================================================================
// INSTRUCTION WALK
// =============================================================================

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// Byte offset of the opcode.
    pub offset: usize,
    /// Opcode byte.
    pub opcode: u8,
    /// Immediate data; shorter than declared if the code is truncated.
    pub immediate: &'a [u8],
}

/// Iterator over instruction boundaries.
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    code: &'a [u8],
    pos: usize,
}

impl<'a> Instructions<'a> {
    /// Starts a walk at offset 0.
    #[must_use]
    pub fn new(code: &'a [u8]) -> Self {
        Self { code, pos: 0 }
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Instruction<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.pos;
        let opcode = *self.code.get(offset)?;
        let width = push_size(opcode).unwrap_or(0);

        let start = offset + 1;
        let end = (start + width).min(self.code.len());
        self.pos = start + width;

        Some(Instruction {
            offset,
            opcode,
            immediate: &self.code[start.min(end)..end],
        })
    }
}

/// Start of the Solidity CBOR metadata trailer, if one is present.
///
/// The last two bytes hold the big-endian trailer length. The trailer is
/// accepted only when the instruction walk ends on an `INVALID` (`0xFE`)
/// exactly at its first byte and the trailer parses completely as a CBOR
/// map of text keys that includes `solc`. Anything else is treated as code.
#[must_use]
pub fn metadata_start(code: &[u8]) -> Option<usize> {
    let len = code.len();
    if len < 3 {
        return None;
    }
    let declared = usize::from(u16::from_be_bytes([code[len - 2], code[len - 1]]));
    if declared < 2 || declared + 3 > len {
        return None;
    }
    let start = len - 2 - declared;

    // A PUSH immediate straddling the boundary would mean the trailer is
    // reachable code.
    let last = Instructions::new(&code[..start]).last()?;
    if last.opcode != 0xFE || last.offset + 1 != start {
        return None;
    }

    is_solc_metadata(&code[start..len - 2]).then_some(start)
}

/// Parses `map { text => bytes | text | bool | small uint }` and requires
/// the whole slice to be consumed.
fn is_solc_metadata(trailer: &[u8]) -> bool {
    let mut cursor = Cbor { data: trailer, pos: 0 };
    let Some(header) = cursor.byte() else {
        return false;
    };
    if !(0xA1..=0xB7).contains(&header) {
        return false;
    }

    let mut saw_solc = false;
    for _ in 0..(header - 0xA0) {
        let Some(key) = cursor.text() else {
            return false;
        };
        saw_solc |= key == b"solc";
        if !cursor.value() {
            return false;
        }
    }
    saw_solc && cursor.pos == trailer.len()
}

/// Minimal CBOR cursor for the metadata subset.
struct Cbor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cbor<'a> {
    fn byte(&mut self) -> Option<u8> {
        let b = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    /// Length argument for major types 2 (bytes) and 3 (text).
    fn length(&mut self, info: u8) -> Option<usize> {
        match info {
            0..=23 => Some(usize::from(info)),
            24 => self.byte().map(usize::from),
            25 => {
                let hi = self.byte()?;
                let lo = self.byte()?;
                Some(usize::from(u16::from_be_bytes([hi, lo])))
            }
            _ => None,
        }
    }

    fn text(&mut self) -> Option<&'a [u8]> {
        let head = self.byte()?;
        if head >> 5 != 3 {
            return None;
        }
        let n = self.length(head & 0x1F)?;
        self.take(n)
    }

    fn value(&mut self) -> bool {
        let Some(head) = self.byte() else {
            return false;
        };
        match head >> 5 {
            // Small unsigned integer.
            0 => head <= 0x17,
            // Byte or text string.
            2 | 3 => self
                .length(head & 0x1F)
                .and_then(|n| self.take(n))
                .is_some(),
            // false / true
            7 => head == 0xF4 || head == 0xF5,
            _ => false,
        }
    }
}

// =============================================================================
// SCANNER
// =============================================================================

/// Scans hex bytecode with the default limits.
///
/// # Errors
///
/// Returns [`BytecodeError`] if the hex text is malformed.
pub fn scan_bytecode(bytecode_hex: &str) -> Result<SecurityReport, BytecodeError> {
    BytecodeScanner::default().scan_hex(bytecode_hex)
}

/// Configurable bytecode scanner.
#[derive(Debug, Clone)]
pub struct BytecodeScanner {
    max_code_size: usize,
    skip_metadata: bool,
}

impl Default for BytecodeScanner {
    fn default() -> Self {
        Self {
            max_code_size: MAX_CODE_SIZE,
            skip_metadata: false,
        }
    }
}

impl BytecodeScanner {
    /// Creates a scanner with a custom size ceiling.
    #[must_use]
    pub fn new(max_code_size: usize) -> Self {
        Self {
            max_code_size,
            ..Self::default()
        }
    }

    /// Stops the walk at a Solidity metadata trailer.
    ///
    /// Only for bytecode produced by a trusted compiler run: the trailer
    /// holds hashes that may contain any byte value.
    #[must_use]
    pub fn skipping_metadata(mut self) -> Self {
        self.skip_metadata = true;
        self
    }

    /// Decodes and scans hex bytecode.
    ///
    /// # Errors
    ///
    /// Returns [`BytecodeError`] if the hex text is malformed.
    pub fn scan_hex(&self, bytecode_hex: &str) -> Result<SecurityReport, BytecodeError> {
        let code = decode_bytecode(bytecode_hex)?;
        Ok(self.scan(&code))
    }

    /// Scans decoded bytecode.
    #[must_use]
    pub fn scan(&self, code: &[u8]) -> SecurityReport {
        let mut report = ReportBuilder::new(ScanType::Bytecode);

        let code_end = if self.skip_metadata {
            metadata_start(code).unwrap_or(code.len())
        } else {
            code.len()
        };
        if code_end < code.len() {
            debug!(
                metadata_bytes = code.len() - code_end,
                "Skipping metadata trailer"
            );
        }

        for instruction in Instructions::new(&code[..code_end]) {
            if let Some(op) = ForbiddenOpcode::from_byte(instruction.opcode) {
                debug!(opcode = op.mnemonic(), offset = instruction.offset, "Forbidden opcode");
                report.push(
                    SecurityFinding::new(
                        Severity::Critical,
                        op.finding_code(),
                        format!(
                            "{} ({}, 0x{:02x}) at byte offset {}",
                            op.description(),
                            op.mnemonic(),
                            op.byte(),
                            instruction.offset
                        ),
                    )
                    .at_offset(instruction.offset),
                );
            }
        }

        let size = code.len();
        if size > self.max_code_size {
            report.push(SecurityFinding::new(
                Severity::Critical,
                codes::CONTRACT_TOO_LARGE,
                format!(
                    "Bytecode is {size} bytes, exceeding the {} byte contract size limit",
                    self.max_code_size
                ),
            ));
        }

        let percent = if self.max_code_size == 0 {
            0.0
        } else {
            size as f64 * 100.0 / self.max_code_size as f64
        };
        report.push(SecurityFinding::new(
            Severity::Info,
            codes::BYTECODE_SIZE,
            format!(
                "Bytecode size: {size} bytes ({percent:.1}% of {} byte limit)",
                self.max_code_size
            ),
        ));

        report.build()
    }
}

// =============================================================================
// TESTS
// =============================================================================
