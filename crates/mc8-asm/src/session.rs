//! Driver over one machine instance.
//!
//! A [`Session`] owns the engine, the memory, and the loaded program, and
//! advances them through the run-state machine. Stepping semantics are
//! identical whether a human steps manually or the auto-run ticker steps on
//! an interval; the ticker is just a loop over [`Session::step`].

use mc8_core::{ConfigError, Cpu, CpuSnapshot, Fault, Memory, MemoryCell, RunState};

use crate::program::{LoadError, Program};

/// Result of advancing the session by one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// One instruction executed; more remain.
    Stepped,
    /// The final instruction executed; the run is complete.
    Completed,
    /// Execution stopped on a fault, now latched in the run state.
    Faulted(Fault),
    /// Nothing to step: no program is loaded, or the run already ended.
    NoProgram,
}

/// One machine instance plus its loaded program and run state.
#[derive(Debug)]
pub struct Session {
    cpu: Cpu,
    memory: Memory,
    program: Option<Program>,
    cursor: usize,
    state: RunState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session over the default 100/20 memory layout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_memory(Memory::default())
    }

    /// A session over an explicit memory layout.
    #[must_use]
    pub fn with_memory(memory: Memory) -> Self {
        let mut cpu = Cpu::default();
        cpu.reset(memory.user_start());
        Self {
            cpu,
            memory,
            program: None,
            cursor: 0,
            state: RunState::Idle,
        }
    }

    /// Replaces the memory with a freshly validated layout.
    ///
    /// On success the loaded program and all register state are discarded and
    /// the session returns to idle. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// The [`ConfigError`] from [`Memory::new`]; the session is untouched.
    pub fn configure_memory(&mut self, total_size: usize, os_size: usize) -> Result<(), ConfigError> {
        let memory = Memory::new(total_size, os_size)?;
        self.cpu.reset(memory.user_start());
        self.memory = memory;
        self.program = None;
        self.cursor = 0;
        self.state = RunState::Idle;
        Ok(())
    }

    /// Loads a program into the user region and processes its first
    /// instruction.
    ///
    /// The capacity check runs before any mutation, so a rejected load leaves
    /// the previous program runnable. On success the machine is reset, the
    /// user region cleared, and each instruction's code written at
    /// consecutive addresses from `user_start` with its source text as the
    /// cell label. The first instruction is then processed in place: its code
    /// is latched into `IR`, `PC` moves to the second address, and the
    /// load-time immediate form of `MOV` applies its value directly to the
    /// register file. The session ends up in [`RunState::Loaded`] with the
    /// cursor past the first instruction.
    ///
    /// # Errors
    ///
    /// [`LoadError::TooLarge`] when the program does not fit the user region.
    pub fn load(&mut self, program: Program) -> Result<(), LoadError> {
        let capacity = self.memory.user_size();
        if program.len() > capacity {
            return Err(LoadError::TooLarge {
                instructions: program.len(),
                capacity,
            });
        }

        let user_start = self.memory.user_start();
        self.cpu.reset(user_start);
        self.memory.clear_user();

        for (offset, instruction) in program.instructions().iter().enumerate() {
            let placed = self.memory.write(
                user_start + offset,
                i32::from(instruction.code()),
                Some(instruction.text()),
            );
            debug_assert!(placed.is_ok(), "capacity-checked address in the user region");
        }

        if let Some(first) = program.get(0) {
            self.cpu.set_program_start(user_start);
            self.cpu.latch_ir(first.code());
            self.cpu.advance_pc();
            if first.is_immediate_mov() {
                self.cpu.load_register(first.register(), first.immediate());
            }
        }

        self.program = Some(program);
        self.cursor = 1;
        self.state = RunState::Loaded;
        Ok(())
    }

    /// Reloads the current program from scratch.
    ///
    /// Equivalent to loading it again: registers cleared, user region
    /// rewritten, first instruction reprocessed. Also the only way to leave
    /// a terminal state without a new program.
    pub fn restart(&mut self) {
        if let Some(program) = self.program.take() {
            // The memory layout cannot shrink while a program is loaded, so
            // a program that fit before still fits.
            let reloaded = self.load(program);
            debug_assert!(reloaded.is_ok(), "previously loaded program still fits");
        }
    }

    /// Advances execution by exactly one instruction.
    ///
    /// The instruction at the cursor is fetched from the program listing, its
    /// code latched into `IR`, and either dispatched through the engine or,
    /// for the immediate form of `MOV`, applied directly to the register
    /// file. On success `PC` and the cursor advance; past the final
    /// instruction the run completes. A fault halts the run and latches into
    /// the run state; further steps return [`StepOutcome::NoProgram`].
    pub fn step(&mut self) -> StepOutcome {
        if self.state.is_terminal() {
            return StepOutcome::NoProgram;
        }
        let Some(program) = &self.program else {
            return StepOutcome::NoProgram;
        };

        let Some(instruction) = program.get(self.cursor).cloned() else {
            self.state = RunState::Completed;
            return StepOutcome::Completed;
        };

        self.cpu.latch_ir(instruction.code());
        if instruction.is_immediate_mov() {
            self.cpu
                .load_register(instruction.register(), instruction.immediate());
        } else if let Err(fault) = self.cpu.execute(&instruction.binary(), &mut self.memory) {
            self.state = RunState::Halted(fault.clone());
            return StepOutcome::Faulted(fault);
        }

        self.cpu.advance_pc();
        self.cursor += 1;
        self.state = RunState::Stepping;

        if self.cursor == self.program.as_ref().map_or(0, Program::len) {
            self.state = RunState::Completed;
            StepOutcome::Completed
        } else {
            StepOutcome::Stepped
        }
    }

    /// Marks the session as auto-running. The ticker sets this before its
    /// loop so observers can tell the two stepping modes apart.
    pub fn mark_running(&mut self) {
        if !self.state.is_terminal() && self.program.is_some() {
            self.state = RunState::Running;
        }
    }

    /// Current run state.
    #[must_use]
    pub const fn state(&self) -> &RunState {
        &self.state
    }

    /// 0-based index of the next instruction to step.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether a program is currently loaded.
    #[must_use]
    pub const fn has_program(&self) -> bool {
        self.program.is_some()
    }

    /// The loaded program's (assembly, binary) listing, empty when idle.
    #[must_use]
    pub fn listing(&self) -> Vec<(String, String)> {
        self.program.as_ref().map_or_else(Vec::new, Program::listing)
    }

    /// Snapshot of the register file.
    #[must_use]
    pub fn cpu_snapshot(&self) -> CpuSnapshot {
        self.cpu.snapshot()
    }

    /// Snapshot of every memory cell.
    #[must_use]
    pub fn memory_snapshot(&self) -> Vec<MemoryCell> {
        self.memory.snapshot()
    }

    /// The memory this session drives.
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
}
