use thiserror::Error;

/// Execution faults raised by the engine and the memory write path.
///
/// Every fault is terminal for the current run: auto-run stops, and continuing
/// requires an explicit reset or reload. State mutated before the fault point
/// is kept as-is (in particular `IR`, which is assigned before dispatch).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// Instruction word was not exactly eight binary digits.
    #[error("malformed instruction word {0:?}: expected 8 binary digits")]
    MalformedWord(String),
    /// Operation nibble is outside the fixed five-entry table.
    #[error("unknown operation nibble {0:04b}")]
    UnknownOperation(u8),
    /// Register nibble is outside the fixed four-entry table.
    #[error("unknown register nibble {0:04b}")]
    UnknownRegister(u8),
    /// A write resolved to an address outside the user region.
    #[error("write to address {address} rejected: outside the user region")]
    ProtectedWrite {
        /// Absolute address the write resolved to (may be negative for STORE
        /// with a negative register offset).
        address: i64,
    },
}
