//! # Source Pattern Rules
//!
//! Static rule table for the source scanner, compiled once on first use.
//!
//! | Code | Severity |
//! |------|----------|
//! | `SELFDESTRUCT` | Critical |
//! | `DELEGATECALL` | Critical |
//! | `CALLCODE` | Critical |
//! | `ERC1967_PROXY` | Critical |
//! | `UUPS_PROXY` | Critical |
//! | `TRANSPARENT_PROXY` | Critical |
//! | `UPGRADEABLE_IMPORT` | Critical |
//! | `TX_ORIGIN` | Warning |
//! | `CREATE2_ASSEMBLY` | Warning |
//! | `SOLIDITY_VERSION` | Info |

use crate::domain::findings::{SecurityFinding, Severity};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Finding codes emitted by the source scanner.
pub mod codes {
    /// `selfdestruct` / `suicide` call.
    pub const SELFDESTRUCT: &str = "SELFDESTRUCT";
    /// `delegatecall` usage.
    pub const DELEGATECALL: &str = "DELEGATECALL";
    /// `callcode` usage.
    pub const CALLCODE: &str = "CALLCODE";
    /// ERC-1967 proxy marker.
    pub const ERC1967_PROXY: &str = "ERC1967_PROXY";
    /// UUPS proxy marker.
    pub const UUPS_PROXY: &str = "UUPS_PROXY";
    /// Transparent proxy marker.
    pub const TRANSPARENT_PROXY: &str = "TRANSPARENT_PROXY";
    /// Import of an upgradeable package.
    pub const UPGRADEABLE_IMPORT: &str = "UPGRADEABLE_IMPORT";
    /// `tx.origin` usage.
    pub const TX_ORIGIN: &str = "TX_ORIGIN";
    /// Inline assembly `create2`.
    pub const CREATE2_ASSEMBLY: &str = "CREATE2_ASSEMBLY";
    /// Declared compiler version.
    pub const SOLIDITY_VERSION: &str = "SOLIDITY_VERSION";
    /// Declared version below the floor.
    pub const OLD_SOLIDITY: &str = "OLD_SOLIDITY";
    /// No version pragma.
    pub const NO_PRAGMA: &str = "NO_PRAGMA";
    /// Version pragma that cannot be read.
    pub const UNPARSEABLE_PRAGMA: &str = "UNPARSEABLE_PRAGMA";
    /// Value transfer without a reentrancy guard.
    pub const REENTRANCY_RISK: &str = "REENTRANCY_RISK";
    /// Source above the review-size threshold.
    pub const LARGE_SOURCE: &str = "LARGE_SOURCE";
}

/// How a rule builds its finding message.
#[derive(Debug, Clone, Copy)]
pub enum MessageTemplate {
    /// Same text for every match.
    Fixed(&'static str),
    /// Built from the first capture group (or the whole match).
    Captured(fn(&str) -> String),
}

/// One entry of the rule table.
#[derive(Debug)]
pub struct PatternRule {
    /// Finding code.
    pub code: &'static str,
    /// Finding severity.
    pub severity: Severity,
    /// Pattern applied line by line.
    pub pattern: Regex,
    /// Pattern applied to the whole source; falls back to `pattern`.
    pub spanning: Option<Regex>,
    /// Message template.
    pub message: MessageTemplate,
}

impl PatternRule {
    fn new(
        code: &'static str,
        severity: Severity,
        pattern: &str,
        spanning: Option<&str>,
        message: MessageTemplate,
    ) -> Self {
        Self {
            code,
            severity,
            pattern: compile(pattern),
            spanning: spanning.map(compile),
            message,
        }
    }

    /// Pattern used by the whole-source pass.
    #[must_use]
    pub fn whole_source_pattern(&self) -> &Regex {
        self.spanning.as_ref().unwrap_or(&self.pattern)
    }

    /// Builds the finding for a match.
    #[must_use]
    pub fn finding(&self, captures: &Captures<'_>) -> SecurityFinding {
        let message = match self.message {
            MessageTemplate::Fixed(text) => text.to_string(),
            MessageTemplate::Captured(render) => {
                let captured = captures
                    .get(1)
                    .or_else(|| captures.get(0))
                    .map_or("", |m| m.as_str());
                render(captured.trim())
            }
        };
        SecurityFinding::new(self.severity, self.code, message)
    }
}

fn compile(pattern: &str) -> Regex {
    // Patterns are compile-time constants covered by tests.
    Regex::new(pattern).expect("valid rule pattern")
}

fn version_message(version: &str) -> String {
    format!("Solidity compiler version: {version}")
}

static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    use MessageTemplate::{Captured, Fixed};
    use Severity::{Critical, Info, Warning};

    vec![
        PatternRule::new(
            codes::SELFDESTRUCT,
            Critical,
            r"\b(?:selfdestruct|suicide)\s*\(",
            None,
            Fixed("selfdestruct is forbidden: it lets the contract be destroyed and its funds swept"),
        ),
        PatternRule::new(
            codes::DELEGATECALL,
            Critical,
            r"\bdelegatecall\s*[({]",
            None,
            Fixed("delegatecall is forbidden: it executes foreign code in this contract's storage context"),
        ),
        PatternRule::new(
            codes::CALLCODE,
            Critical,
            r"\bcallcode\s*[({]",
            None,
            Fixed("callcode is forbidden: it executes foreign code in this contract's storage context"),
        ),
        PatternRule::new(
            codes::ERC1967_PROXY,
            Critical,
            r"\bERC1967\w*",
            None,
            Fixed("ERC1967 proxy patterns are forbidden: deployed contracts must not be upgradeable"),
        ),
        PatternRule::new(
            codes::UUPS_PROXY,
            Critical,
            r"\bUUPS\w*",
            None,
            Fixed("UUPS upgradeability is forbidden: deployed contracts must not be upgradeable"),
        ),
        PatternRule::new(
            codes::TRANSPARENT_PROXY,
            Critical,
            r"\b(?:I?TransparentUpgradeableProxy|ProxyAdmin)\b",
            None,
            Fixed("transparent proxies are forbidden: deployed contracts must not be upgradeable"),
        ),
        PatternRule::new(
            codes::UPGRADEABLE_IMPORT,
            Critical,
            r"\bimport\b[^;]*(?i:upgradeable)",
            Some(r"(?s)\bimport\b[^;]*?(?i:upgradeable)[^;]*;"),
            Fixed("imports from upgradeable packages are forbidden"),
        ),
        PatternRule::new(
            codes::TX_ORIGIN,
            Warning,
            r"\btx\.origin\b",
            None,
            Fixed("tx.origin used: authorization based on it is vulnerable to phishing, use msg.sender"),
        ),
        PatternRule::new(
            codes::CREATE2_ASSEMBLY,
            Warning,
            r"\bassembly\b[^{]*\{[^}]*\bcreate2\s*\(",
            Some(r"(?s)\bassembly\b[^{]*\{(?:[^{}]|\{[^{}]*\})*?\bcreate2\s*\("),
            Fixed("inline assembly create2 deploys code that is not reviewed by this gate"),
        ),
        PatternRule::new(
            codes::SOLIDITY_VERSION,
            Info,
            r"\bpragma\s+solidity\s+([^;]+);",
            None,
            Captured(version_message),
        ),
    ]
});

/// The rule table.
#[must_use]
pub fn rules() -> &'static [PatternRule] {
    &RULES
}
