//! Machine model for the MC-8 teaching computer.
//!
//! The MC-8 is a minimal 8-bit instruction machine: five operations over four
//! general-purpose registers, encoded as one 4-bit operation nibble followed
//! by one 4-bit register nibble. This crate holds the machine itself — the
//! encoding tables, the segmented memory store, the register file, and the
//! fetch/decode/execute engine. Program loading and run control live in the
//! `mc8-asm` crate.

/// Deterministic operation/register nibble tables and word encodings.
pub mod encoding;
pub use encoding::{
    decode, encode, encode_binary, encode_immediate, immediate_binary, Operation,
    IMMEDIATE_MAGNITUDE_MAX, WORD_BITS,
};

/// Execution fault taxonomy.
pub mod fault;
pub use fault::Fault;

/// Segmented word store with label annotations.
pub mod memory;
pub use memory::{
    ConfigError, Memory, MemoryCell, MemoryRegion, DEFAULT_OS_SIZE, DEFAULT_TOTAL_SIZE,
    MIN_OS_SIZE, MIN_TOTAL_SIZE, MIN_USER_SIZE,
};

/// Register identifiers and the engine-owned register file.
pub mod registers;
pub use registers::{GeneralRegister, RegisterFile, GENERAL_REGISTER_COUNT};

/// Fetch/decode/execute engine.
pub mod engine;
pub use engine::{Cpu, CpuSnapshot};

/// Driver-facing run-state machine.
pub mod run_state;
pub use run_state::RunState;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
