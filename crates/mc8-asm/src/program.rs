//! Whole-program loading and listings.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::parser::{Instruction, ParseError};

/// A source file rejected at load time.
///
/// Loading is all-or-nothing: one bad line aborts the whole program.
#[derive(Debug)]
pub enum LoadError {
    /// The source file could not be read.
    Io(io::Error),
    /// A non-skipped line failed to parse.
    Line {
        /// 1-based line number in the source.
        number: usize,
        /// The offending line, trimmed.
        text: String,
        /// The grammar error.
        cause: ParseError,
    },
    /// The source contained no instructions at all.
    Empty,
    /// More instructions than the user region can hold.
    TooLarge {
        /// Number of instructions in the program.
        instructions: usize,
        /// Number of words available in the user region.
        capacity: usize,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "cannot read program: {error}"),
            Self::Line {
                number,
                text,
                cause,
            } => write!(f, "line {number} ({text:?}): {cause}"),
            Self::Empty => write!(f, "program contains no instructions"),
            Self::TooLarge {
                instructions,
                capacity,
            } => write!(
                f,
                "program has {instructions} instructions but the user region holds {capacity}"
            ),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Line { cause, .. } => Some(cause),
            Self::Empty | Self::TooLarge { .. } => None,
        }
    }
}

/// An ordered, validated list of instructions ready to load.
///
/// Guaranteed non-empty by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Parses a whole source text, one instruction per line.
    ///
    /// Blank lines and lines starting with `;` or `//` are skipped.
    ///
    /// # Errors
    ///
    /// [`LoadError::Line`] on the first malformed line (nothing partial is
    /// kept), or [`LoadError::Empty`] when no instruction lines remain.
    pub fn parse(source: &str) -> Result<Self, LoadError> {
        let mut instructions = Vec::new();

        for (index, line) in source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with("//") {
                continue;
            }

            let instruction =
                Instruction::parse(trimmed).map_err(|cause| LoadError::Line {
                    number: index + 1,
                    text: trimmed.to_string(),
                    cause,
                })?;
            instructions.push(instruction);
        }

        if instructions.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self { instructions })
    }

    /// Reads and parses a source file.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] when the file cannot be read, otherwise as
    /// [`Program::parse`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let source = fs::read_to_string(path).map_err(LoadError::Io)?;
        Self::parse(&source)
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Always false: a program holds at least one instruction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The instruction at a 0-based position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// All instructions, in source order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Ordered (assembly text, binary text) pairs for display.
    ///
    /// The binary column holds every word of the instruction, so `MOV` with
    /// a nonzero immediate shows its primary word and its signed-magnitude
    /// value word separated by a space.
    #[must_use]
    pub fn listing(&self) -> Vec<(String, String)> {
        self.instructions
            .iter()
            .map(|instruction| (instruction.text().to_string(), instruction.words().join(" ")))
            .collect()
    }
}
