//! Driver-facing run-state machine.

use crate::fault::Fault;

/// Lifecycle of a program run, as observed by the driver.
///
/// Terminal states latch: a completed or halted run never resumes, and
/// continuing requires a reload or restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// No program loaded.
    #[default]
    Idle,
    /// Program loaded; its first instruction has already been processed.
    Loaded,
    /// Advancing one instruction at a time under manual control.
    Stepping,
    /// Advancing automatically on a fixed interval.
    Running,
    /// Every instruction executed successfully.
    Completed,
    /// Execution stopped on a fault, which stays latched here.
    Halted(Fault),
}

impl RunState {
    /// The fault that halted the run, if any.
    #[must_use]
    pub const fn latched_fault(&self) -> Option<&Fault> {
        match self {
            Self::Halted(fault) => Some(fault),
            _ => None,
        }
    }

    /// Whether the run can no longer advance.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Halted(_))
    }
}
