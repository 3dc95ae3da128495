//! Deterministic operation/register nibble tables and word encodings.
//!
//! An instruction word is one 4-bit operation nibble followed by one 4-bit
//! register nibble, read as an unsigned 8-bit code. Both tables are closed:
//! any nibble outside them is a decode fault, and no extensibility beyond the
//! fixed set exists.

use crate::fault::Fault;
use crate::registers::GeneralRegister;

/// Number of binary digits in one machine word.
pub const WORD_BITS: usize = 8;

/// Largest magnitude representable by the 7 magnitude bits of an immediate
/// word.
pub const IMMEDIATE_MAGNITUDE_MAX: i32 = 127;

/// Machine operation with its assigned 4-bit nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Operation {
    /// `LOAD reg` — copy the register into the accumulator.
    Load = 0b0001,
    /// `STORE reg` — write the accumulator at `user_start + reg`.
    Store = 0b0010,
    /// `MOV reg[, value]` — copy the accumulator (or a load-time immediate)
    /// into the register.
    Mov = 0b0011,
    /// `SUB reg` — subtract the register from the accumulator.
    Sub = 0b0100,
    /// `ADD reg` — add the register to the accumulator.
    Add = 0b0101,
}

impl Operation {
    /// Ordered list of every machine operation.
    pub const ALL: [Self; 5] = [Self::Load, Self::Store, Self::Mov, Self::Sub, Self::Add];

    /// Returns the assigned 4-bit operation nibble.
    #[must_use]
    pub const fn nibble(self) -> u8 {
        self as u8
    }

    /// Decodes a 4-bit operation nibble. `None` means unassigned.
    #[must_use]
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0b0001 => Some(Self::Load),
            0b0010 => Some(Self::Store),
            0b0011 => Some(Self::Mov),
            0b0100 => Some(Self::Sub),
            0b0101 => Some(Self::Add),
            _ => None,
        }
    }

    /// Returns the canonical source mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::Store => "STORE",
            Self::Mov => "MOV",
            Self::Sub => "SUB",
            Self::Add => "ADD",
        }
    }

    /// Resolves a source mnemonic, ASCII case-insensitively.
    #[must_use]
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|operation| operation.mnemonic().eq_ignore_ascii_case(name))
    }
}

/// Packs an operation and register into the primary 8-bit code.
///
/// The operation nibble occupies the high 4 bits and the register nibble the
/// low 4 bits.
#[must_use]
pub const fn encode(operation: Operation, register: GeneralRegister) -> u8 {
    (operation.nibble() << 4) | register.nibble()
}

/// Renders the primary code as its canonical 8-digit binary word.
#[must_use]
pub fn encode_binary(operation: Operation, register: GeneralRegister) -> String {
    format!("{:08b}", encode(operation, register))
}

/// Splits an 8-bit code back into its operation and register.
///
/// Exact inverse of [`encode`] over the two fixed tables.
///
/// # Errors
///
/// Returns [`Fault::UnknownOperation`] or [`Fault::UnknownRegister`] when a
/// nibble falls outside its table.
pub fn decode(code: u8) -> Result<(Operation, GeneralRegister), Fault> {
    let op_nibble = code >> 4;
    let reg_nibble = code & 0x0F;

    let operation =
        Operation::from_nibble(op_nibble).ok_or(Fault::UnknownOperation(op_nibble))?;
    let register =
        GeneralRegister::from_nibble(reg_nibble).ok_or(Fault::UnknownRegister(reg_nibble))?;

    Ok((operation, register))
}

/// Encodes a signed value as an 8-bit signed-magnitude word.
///
/// The leading bit is the sign (1 = negative) and the remaining 7 bits hold
/// the absolute magnitude, clamped to 127. Zero encodes as all zeros.
///
/// This word exists only as the secondary listing artifact for `MOV` with an
/// immediate; the engine never fetches it.
#[must_use]
pub fn encode_immediate(value: i32) -> u8 {
    if value == 0 {
        return 0;
    }

    let magnitude = value.unsigned_abs().min(127);
    let sign = if value < 0 { 0b1000_0000 } else { 0 };

    #[allow(clippy::cast_possible_truncation)]
    let magnitude = magnitude as u8;
    sign | magnitude
}

/// Renders a signed value as its 8-digit signed-magnitude word.
#[must_use]
pub fn immediate_binary(value: i32) -> String {
    format!("{:08b}", encode_immediate(value))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{
        decode, encode, encode_binary, encode_immediate, immediate_binary, Operation,
    };
    use crate::fault::Fault;
    use crate::registers::GeneralRegister;

    #[rstest]
    #[case(Operation::Load, GeneralRegister::Ax, "00010001")]
    #[case(Operation::Add, GeneralRegister::Dx, "01010100")]
    #[case(Operation::Store, GeneralRegister::Bx, "00100010")]
    #[case(Operation::Mov, GeneralRegister::Cx, "00110011")]
    #[case(Operation::Sub, GeneralRegister::Ax, "01000001")]
    fn encode_matches_reference_vectors(
        #[case] operation: Operation,
        #[case] register: GeneralRegister,
        #[case] expected: &str,
    ) {
        assert_eq!(encode_binary(operation, register), expected);
    }

    #[test]
    fn decode_inverts_encode_for_every_pair() {
        for operation in Operation::ALL {
            for register in GeneralRegister::ALL {
                let code = encode(operation, register);
                assert_eq!(decode(code), Ok((operation, register)));
            }
        }
    }

    #[test]
    fn unassigned_nibbles_are_decode_faults() {
        assert_eq!(decode(0b0110_0001), Err(Fault::UnknownOperation(0b0110)));
        assert_eq!(decode(0b0000_0001), Err(Fault::UnknownOperation(0b0000)));
        assert_eq!(decode(0b0001_0101), Err(Fault::UnknownRegister(0b0101)));
        assert_eq!(decode(0b0001_0000), Err(Fault::UnknownRegister(0b0000)));
    }

    #[test]
    fn operation_nibble_errors_take_precedence_over_register_errors() {
        assert_eq!(decode(0b1111_1111), Err(Fault::UnknownOperation(0b1111)));
    }

    #[test]
    fn mnemonic_lookup_is_case_insensitive() {
        assert_eq!(Operation::from_mnemonic("LOAD"), Some(Operation::Load));
        assert_eq!(Operation::from_mnemonic("store"), Some(Operation::Store));
        assert_eq!(Operation::from_mnemonic("mOv"), Some(Operation::Mov));
        assert_eq!(Operation::from_mnemonic("JMP"), None);
        assert_eq!(Operation::from_mnemonic(""), None);
    }

    #[test]
    fn every_mnemonic_resolves_to_its_operation() {
        for operation in Operation::ALL {
            assert_eq!(Operation::from_mnemonic(operation.mnemonic()), Some(operation));
        }
    }

    #[rstest]
    #[case(0, "00000000")]
    #[case(10, "00001010")]
    #[case(-10, "10001010")]
    #[case(127, "01111111")]
    #[case(-127, "11111111")]
    fn immediate_encoding_is_signed_magnitude(#[case] value: i32, #[case] expected: &str) {
        assert_eq!(immediate_binary(value), expected);
    }

    #[test]
    fn immediate_magnitude_clamps_at_127() {
        assert_eq!(encode_immediate(300), encode_immediate(127));
        assert_eq!(encode_immediate(-300), encode_immediate(-127));
        assert_eq!(encode_immediate(i32::MIN), encode_immediate(-127));
    }
}
