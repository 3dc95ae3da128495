//! Assembler front end and driver for the MC-8 teaching computer.
//!
//! This crate turns `OPERATION REGISTER[, VALUE]` source text into binary
//! instruction words, loads the result into the machine model from
//! `mc8-core`, and drives execution one step at a time or on a fixed-interval
//! auto-run loop.

/// Source-line instruction codec.
pub mod parser;
pub use parser::{Instruction, ParseError};

/// Whole-program loading and listings.
pub mod program;
pub use program::{LoadError, Program};

/// Driver over one machine instance.
pub mod session;
pub use session::{Session, StepOutcome};

/// Cooperative fixed-interval auto-run loop.
pub mod ticker;
pub use ticker::{auto_run, RunOutcome, RunSummary};

#[cfg(test)]
use tempfile as _;
