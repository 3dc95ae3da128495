//! Register identifiers and the engine-owned register file.

/// Number of general-purpose registers (`AX`..`DX`).
pub const GENERAL_REGISTER_COUNT: usize = 4;

/// General-purpose register with its assigned 4-bit nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum GeneralRegister {
    /// `AX`, nibble `0001`.
    Ax = 0b0001,
    /// `BX`, nibble `0010`.
    Bx = 0b0010,
    /// `CX`, nibble `0011`.
    Cx = 0b0011,
    /// `DX`, nibble `0100`.
    Dx = 0b0100,
}

impl GeneralRegister {
    /// Ordered list of every general-purpose register.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [Self::Ax, Self::Bx, Self::Cx, Self::Dx];

    /// Returns the assigned 4-bit register nibble.
    #[must_use]
    pub const fn nibble(self) -> u8 {
        self as u8
    }

    /// Decodes a 4-bit register nibble. `None` means unassigned.
    #[must_use]
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0b0001 => Some(Self::Ax),
            0b0010 => Some(Self::Bx),
            0b0011 => Some(Self::Cx),
            0b0100 => Some(Self::Dx),
            _ => None,
        }
    }

    /// Returns the canonical source name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ax => "AX",
            Self::Bx => "BX",
            Self::Cx => "CX",
            Self::Dx => "DX",
        }
    }

    /// Resolves a source name, ASCII case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|register| register.name().eq_ignore_ascii_case(name))
    }
}

/// Register file owned exclusively by the processing engine.
///
/// `AX`..`DX` are general purpose, `AC` is the accumulator, `IR` holds the
/// raw code of the instruction currently being processed, and `PC` holds the
/// address of the next instruction inside the user region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    ax: i32,
    bx: i32,
    cx: i32,
    dx: i32,
    ac: i32,
    ir: i32,
    pc: usize,
}

impl RegisterFile {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn get(&self, register: GeneralRegister) -> i32 {
        match register {
            GeneralRegister::Ax => self.ax,
            GeneralRegister::Bx => self.bx,
            GeneralRegister::Cx => self.cx,
            GeneralRegister::Dx => self.dx,
        }
    }

    /// Writes a general-purpose register.
    pub const fn set(&mut self, register: GeneralRegister, value: i32) {
        match register {
            GeneralRegister::Ax => self.ax = value,
            GeneralRegister::Bx => self.bx = value,
            GeneralRegister::Cx => self.cx = value,
            GeneralRegister::Dx => self.dx = value,
        }
    }

    /// Reads the accumulator.
    #[must_use]
    pub const fn ac(&self) -> i32 {
        self.ac
    }

    /// Writes the accumulator.
    pub const fn set_ac(&mut self, value: i32) {
        self.ac = value;
    }

    /// Reads the instruction register.
    #[must_use]
    pub const fn ir(&self) -> i32 {
        self.ir
    }

    /// Writes the instruction register.
    pub const fn set_ir(&mut self, value: i32) {
        self.ir = value;
    }

    /// Reads the program counter.
    #[must_use]
    pub const fn pc(&self) -> usize {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, address: usize) {
        self.pc = address;
    }

    /// Zeroes every register and points `PC` at the start of the user region.
    pub const fn reset(&mut self, user_start: usize) {
        self.ax = 0;
        self.bx = 0;
        self.cx = 0;
        self.dx = 0;
        self.ac = 0;
        self.ir = 0;
        self.pc = user_start;
    }
}
