//! # EVM Opcodes
//!
//! The handful of opcode facts the bytecode walker needs: PUSH immediate
//! widths and the forbidden execution-context opcodes.

/// PUSH1, first opcode carrying immediate data.
pub const PUSH1: u8 = 0x60;
/// PUSH32, last opcode carrying immediate data.
pub const PUSH32: u8 = 0x7F;

/// Number of immediate bytes following `byte`, if it is PUSH1..PUSH32.
///
/// PUSH0 (0x5F) carries no immediate and is treated as a plain opcode.
#[must_use]
pub fn push_size(byte: u8) -> Option<usize> {
    if (PUSH1..=PUSH32).contains(&byte) {
        Some(usize::from(byte - PUSH1) + 1)
    } else {
        None
    }
}

/// Opcodes that must never appear in deployable code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ForbiddenOpcode {
    /// CALLCODE: runs foreign code in the caller's storage.
    CallCode = 0xF2,
    /// DELEGATECALL: runs foreign code in the caller's storage and context.
    DelegateCall = 0xF4,
    /// SELFDESTRUCT: destroys the contract and sweeps its balance.
    SelfDestruct = 0xFF,
}

impl ForbiddenOpcode {
    /// All forbidden opcodes.
    pub const ALL: [Self; 3] = [Self::CallCode, Self::DelegateCall, Self::SelfDestruct];

    /// Maps a byte to a forbidden opcode.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0xF2 => Some(Self::CallCode),
            0xF4 => Some(Self::DelegateCall),
            0xFF => Some(Self::SelfDestruct),
            _ => None,
        }
    }

    /// Opcode byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::CallCode => "CALLCODE",
            Self::DelegateCall => "DELEGATECALL",
            Self::SelfDestruct => "SELFDESTRUCT",
        }
    }

    /// Finding code reported by the walker.
    #[must_use]
    pub const fn finding_code(self) -> &'static str {
        match self {
            Self::CallCode => "CALLCODE_OPCODE",
            Self::DelegateCall => "DELEGATECALL_OPCODE",
            Self::SelfDestruct => "SELFDESTRUCT_OPCODE",
        }
    }

    /// Human-readable reason.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::CallCode => "borrowed-context call opcode",
            Self::DelegateCall => "delegated-context call opcode",
            Self::SelfDestruct => "self-destruct opcode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_size() {
        assert_eq!(push_size(0x5F), None);
        assert_eq!(push_size(0x60), Some(1));
        assert_eq!(push_size(0x73), Some(20));
        assert_eq!(push_size(0x7F), Some(32));
        assert_eq!(push_size(0x80), None);
    }

    #[test]
    fn test_forbidden_roundtrip() {
        for op in ForbiddenOpcode::ALL {
            assert_eq!(ForbiddenOpcode::from_byte(op.byte()), Some(op));
        }
        assert_eq!(ForbiddenOpcode::from_byte(0xF1), None);
        assert_eq!(ForbiddenOpcode::from_byte(0xFA), None);
    }
}
