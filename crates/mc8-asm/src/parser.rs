//! Source-line instruction codec.
//!
//! Grammar: `OPERATION REGISTER[, VALUE]`, tokens separated by any run of
//! spaces and commas, keywords ASCII case-insensitive. Tokens past the third
//! are ignored. Parsing is deterministic and table-driven; there is no
//! extensibility beyond the five operations and four registers.

use std::error::Error;
use std::fmt;

use mc8_core::{
    encode, encode_binary, immediate_binary, GeneralRegister, Operation,
};

/// A source line rejected by the instruction grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Fewer than two tokens on the line.
    TooFewTokens(String),
    /// First token is not one of the five operation mnemonics.
    UnknownOperation(String),
    /// Second token is not one of the four register names.
    UnknownRegister(String),
    /// Third token present but not a signed integer.
    BadImmediate(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewTokens(line) => {
                write!(f, "expected OPERATION REGISTER[, VALUE], got {line:?}")
            }
            Self::UnknownOperation(token) => write!(f, "unknown operation {token:?}"),
            Self::UnknownRegister(token) => write!(f, "unknown register {token:?}"),
            Self::BadImmediate(token) => write!(f, "invalid immediate value {token:?}"),
        }
    }
}

impl Error for ParseError {}

/// One parsed source instruction with its derived 8-bit code.
///
/// Immutable after parse: collaborators read from it, nothing rewrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    text: String,
    operation: Operation,
    register: GeneralRegister,
    immediate: i32,
    code: u8,
}

impl Instruction {
    /// Parses one source line.
    ///
    /// The immediate defaults to 0 only when the third token is absent; a
    /// present-but-unparsable token is a hard error, including an explicit
    /// `MOV AX, x`.
    ///
    /// # Errors
    ///
    /// One [`ParseError`] naming the offending token or the whole line.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let text = line.trim();
        let mut tokens = text
            .split(|c: char| c == ' ' || c == ',')
            .filter(|token| !token.is_empty());

        let (Some(op_token), Some(reg_token)) = (tokens.next(), tokens.next()) else {
            return Err(ParseError::TooFewTokens(text.to_string()));
        };

        let operation = Operation::from_mnemonic(op_token)
            .ok_or_else(|| ParseError::UnknownOperation(op_token.to_string()))?;
        let register = GeneralRegister::from_name(reg_token)
            .ok_or_else(|| ParseError::UnknownRegister(reg_token.to_string()))?;

        let immediate = match tokens.next() {
            Some(token) => token
                .parse()
                .map_err(|_| ParseError::BadImmediate(token.to_string()))?,
            None => 0,
        };

        Ok(Self {
            text: text.to_string(),
            operation,
            register,
            immediate,
            code: encode(operation, register),
        })
    }

    /// Non-throwing grammar check over the same rules as [`Instruction::parse`].
    #[must_use]
    pub fn validate(line: &str) -> bool {
        Self::parse(line).is_ok()
    }

    /// The trimmed source text this instruction was parsed from.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The parsed operation.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// The parsed register.
    #[must_use]
    pub const fn register(&self) -> GeneralRegister {
        self.register
    }

    /// The immediate value, 0 when the token was absent.
    #[must_use]
    pub const fn immediate(&self) -> i32 {
        self.immediate
    }

    /// The derived 8-bit instruction code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        self.code
    }

    /// Whether this is `MOV` with a nonzero immediate, the form whose value
    /// is applied at load time instead of through dispatch.
    #[must_use]
    pub const fn is_immediate_mov(&self) -> bool {
        matches!(self.operation, Operation::Mov) && self.immediate != 0
    }

    /// The primary 8-digit binary word.
    #[must_use]
    pub fn binary(&self) -> String {
        encode_binary(self.operation, self.register)
    }

    /// Every binary word this instruction renders to: the primary word, plus
    /// the signed-magnitude immediate word for `MOV` with a nonzero
    /// immediate. The immediate word is a listing artifact; it is never
    /// placed in memory or fetched.
    #[must_use]
    pub fn words(&self) -> Vec<String> {
        let mut words = vec![self.binary()];
        if self.is_immediate_mov() {
            words.push(immediate_binary(self.immediate));
        }
        words
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{Instruction, ParseError};
    use mc8_core::{decode, GeneralRegister, Operation};

    #[test]
    fn parses_the_two_token_form() {
        let instruction = Instruction::parse("ADD DX").expect("valid line");
        assert_eq!(instruction.operation(), Operation::Add);
        assert_eq!(instruction.register(), GeneralRegister::Dx);
        assert_eq!(instruction.immediate(), 0);
        assert_eq!(instruction.code(), 0b0101_0100);
        assert_eq!(instruction.binary(), "01010100");
        assert!(!instruction.is_immediate_mov());
    }

    #[test]
    fn parses_the_immediate_form_with_flexible_separators() {
        for line in ["MOV AX,10", "MOV AX, 10", "mov ax  ,,  10", "MOV AX 10"] {
            let instruction = Instruction::parse(line).expect("valid line");
            assert_eq!(instruction.operation(), Operation::Mov);
            assert_eq!(instruction.register(), GeneralRegister::Ax);
            assert_eq!(instruction.immediate(), 10);
            assert!(instruction.is_immediate_mov());
        }
    }

    #[test]
    fn keeps_the_trimmed_source_text() {
        let instruction = Instruction::parse("  LOAD BX  ").expect("valid line");
        assert_eq!(instruction.text(), "LOAD BX");
    }

    #[test]
    fn negative_immediates_parse() {
        let instruction = Instruction::parse("MOV CX, -42").expect("valid line");
        assert_eq!(instruction.immediate(), -42);
        assert!(instruction.is_immediate_mov());
    }

    #[test]
    fn mov_with_explicit_zero_is_not_the_immediate_form() {
        let instruction = Instruction::parse("MOV AX, 0").expect("valid line");
        assert_eq!(instruction.immediate(), 0);
        assert!(!instruction.is_immediate_mov());
        assert_eq!(instruction.words(), vec!["00110001".to_string()]);
    }

    #[test]
    fn immediate_mov_renders_two_words() {
        let instruction = Instruction::parse("MOV AX, -10").expect("valid line");
        assert_eq!(
            instruction.words(),
            vec!["00110001".to_string(), "10001010".to_string()]
        );
    }

    #[test]
    fn rejects_lines_outside_the_grammar() {
        assert_eq!(
            Instruction::parse(""),
            Err(ParseError::TooFewTokens(String::new()))
        );
        assert_eq!(
            Instruction::parse("ADD"),
            Err(ParseError::TooFewTokens("ADD".to_string()))
        );
        assert_eq!(
            Instruction::parse("JMP AX"),
            Err(ParseError::UnknownOperation("JMP".to_string()))
        );
        assert_eq!(
            Instruction::parse("ADD EX"),
            Err(ParseError::UnknownRegister("EX".to_string()))
        );
        assert_eq!(
            Instruction::parse("MOV AX, ten"),
            Err(ParseError::BadImmediate("ten".to_string()))
        );
    }

    #[test]
    fn validate_mirrors_parse() {
        assert!(Instruction::validate("STORE BX"));
        assert!(Instruction::validate("mov dx, 99"));
        assert!(!Instruction::validate("STORE"));
        assert!(!Instruction::validate("HALT AX"));
    }

    #[test]
    fn tokens_past_the_third_are_ignored() {
        let instruction = Instruction::parse("MOV AX, 10 garbage").expect("valid line");
        assert_eq!(instruction.immediate(), 10);
    }

    #[test]
    fn every_mnemonic_pair_round_trips_through_the_code() {
        for operation in Operation::ALL {
            for register in GeneralRegister::ALL {
                let line = format!("{} {}", operation.mnemonic(), register.name());
                let instruction = Instruction::parse(&line).expect("valid line");
                assert_eq!(decode(instruction.code()), Ok((operation, register)));
            }
        }
    }

    proptest! {
        #[test]
        fn parsed_lines_survive_the_encode_decode_round_trip(
            op_index in 0_usize..Operation::ALL.len(),
            reg_index in 0_usize..GeneralRegister::ALL.len(),
            immediate in proptest::option::of(-200_i32..200),
            lowercase in any::<bool>(),
        ) {
            let operation = Operation::ALL[op_index];
            let register = GeneralRegister::ALL[reg_index];
            let mut line = match immediate {
                Some(value) => {
                    format!("{} {}, {}", operation.mnemonic(), register.name(), value)
                }
                None => format!("{} {}", operation.mnemonic(), register.name()),
            };
            if lowercase {
                line = line.to_ascii_lowercase();
            }

            let instruction = Instruction::parse(&line).expect("valid line");

            prop_assert_eq!(decode(instruction.code()), Ok((operation, register)));
            prop_assert_eq!(instruction.immediate(), immediate.unwrap_or(0));
        }
    }
}
