//! Fetch/decode/execute engine.
//!
//! The engine owns the register file and is handed one binary instruction
//! word at a time. It never advances the program counter on its own: the
//! driver decides when a step is complete and calls [`Cpu::advance_pc`]
//! explicitly, so a faulting step leaves `PC` pointing at the instruction
//! that failed.

use std::fmt;

use crate::encoding::{decode, Operation, WORD_BITS};
use crate::fault::Fault;
use crate::memory::Memory;
use crate::registers::{GeneralRegister, RegisterFile};

/// The MC-8 processing engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cpu {
    registers: RegisterFile,
}

impl Cpu {
    /// Read-only view of the register file.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Zeroes every register and points `PC` at the start of the user region.
    pub const fn reset(&mut self, user_start: usize) {
        self.registers.reset(user_start);
    }

    /// Presets `PC` to the first instruction address of a freshly loaded
    /// program.
    pub const fn set_program_start(&mut self, address: usize) {
        self.registers.set_pc(address);
    }

    /// Moves `PC` to the next word. Called by the driver after a successful
    /// step, never by [`Cpu::execute`] itself.
    pub const fn advance_pc(&mut self) {
        let next = self.registers.pc() + 1;
        self.registers.set_pc(next);
    }

    /// Latches an instruction code into `IR` without dispatching it.
    ///
    /// Used by the driver when it handles an instruction itself, such as the
    /// load-time immediate form of `MOV`.
    pub fn latch_ir(&mut self, code: u8) {
        self.registers.set_ir(i32::from(code));
    }

    /// Writes a general-purpose register directly, outside of dispatch.
    ///
    /// Used by the driver for the load-time immediate form of `MOV`, which
    /// never passes through [`Cpu::execute`].
    pub const fn load_register(&mut self, register: GeneralRegister, value: i32) {
        self.registers.set(register, value);
    }

    /// Decodes and executes one 8-digit binary instruction word.
    ///
    /// Once the word passes the shape check, its integer value is latched
    /// into `IR` unconditionally, so a decode fault still leaves `IR` holding
    /// the offending code. Arithmetic on `AC` uses native `i32` semantics;
    /// overflow behavior is not part of the machine definition.
    ///
    /// # Errors
    ///
    /// [`Fault::MalformedWord`] when the word is not exactly eight binary
    /// digits (nothing is mutated); [`Fault::UnknownOperation`] or
    /// [`Fault::UnknownRegister`] when a nibble is unassigned;
    /// [`Fault::ProtectedWrite`] when `STORE` resolves outside the user
    /// region.
    pub fn execute(&mut self, word: &str, memory: &mut Memory) -> Result<(), Fault> {
        if word.len() != WORD_BITS || !word.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(Fault::MalformedWord(word.to_string()));
        }
        let code = word
            .bytes()
            .fold(0_u8, |acc, b| (acc << 1) | u8::from(b == b'1'));

        self.registers.set_ir(i32::from(code));
        let (operation, register) = decode(code)?;

        match operation {
            Operation::Load => {
                let value = self.registers.get(register);
                self.registers.set_ac(value);
            }
            Operation::Store => self.store(register, memory)?,
            Operation::Mov => {
                let ac = self.registers.ac();
                self.registers.set(register, ac);
            }
            Operation::Add => {
                let value = self.registers.get(register);
                self.registers.set_ac(self.registers.ac() + value);
            }
            Operation::Sub => {
                let value = self.registers.get(register);
                self.registers.set_ac(self.registers.ac() - value);
            }
        }
        Ok(())
    }

    /// `STORE reg`: the register value is a word offset into the user region,
    /// so the write lands at `user_start + reg`. On success the register is
    /// also overwritten with `AC`, matching the machine definition.
    fn store(&mut self, register: GeneralRegister, memory: &mut Memory) -> Result<(), Fault> {
        let offset = self.registers.get(register);
        let absolute = i64::try_from(memory.user_start()).unwrap_or(i64::MAX) + i64::from(offset);
        let address =
            usize::try_from(absolute).map_err(|_| Fault::ProtectedWrite { address: absolute })?;

        memory.write(address, self.registers.ac(), None)?;
        self.registers.set(register, self.registers.ac());
        Ok(())
    }

    /// Copies the current register file into a display-ready snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            ax: self.registers.get(GeneralRegister::Ax),
            bx: self.registers.get(GeneralRegister::Bx),
            cx: self.registers.get(GeneralRegister::Cx),
            dx: self.registers.get(GeneralRegister::Dx),
            ac: self.registers.ac(),
            ir: self.registers.ir(),
            pc: self.registers.pc(),
        }
    }
}

/// Point-in-time copy of the register file, for status rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuSnapshot {
    /// General-purpose register `AX`.
    pub ax: i32,
    /// General-purpose register `BX`.
    pub bx: i32,
    /// General-purpose register `CX`.
    pub cx: i32,
    /// General-purpose register `DX`.
    pub dx: i32,
    /// Accumulator.
    pub ac: i32,
    /// Instruction register, holding the raw code of the instruction
    /// currently being processed.
    pub ir: i32,
    /// Program counter, holding the address of the next instruction.
    pub pc: usize,
}

impl CpuSnapshot {
    /// The low byte of `IR`, rendered back as an instruction code.
    #[must_use]
    pub fn ir_code(&self) -> u8 {
        u8::try_from(self.ir & 0xFF).unwrap_or(0)
    }
}

impl fmt::Display for CpuSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== CPU REGISTERS ===")?;
        writeln!(f, "AX: {}", self.ax)?;
        writeln!(f, "BX: {}", self.bx)?;
        writeln!(f, "CX: {}", self.cx)?;
        writeln!(f, "DX: {}", self.dx)?;
        writeln!(f, "AC: {}", self.ac)?;
        writeln!(
            f,
            "IR: {} ({:08b}) - current instruction",
            self.ir,
            self.ir_code()
        )?;
        write!(f, "PC: {} - next instruction", self.pc)
    }
}
