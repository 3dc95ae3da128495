//! Cooperative fixed-interval auto-run loop.
//!
//! Auto-run is a plain loop over [`Session::step`] with a sleep between
//! steps, so its semantics are exactly those of manual stepping. The
//! cancellation flag is checked once per step boundary and never mid-step:
//! a step that has started always finishes, and cancellation takes effect
//! before the next one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use mc8_core::Fault;

use crate::session::{Session, StepOutcome};

/// Why an auto-run loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every remaining instruction executed.
    Completed,
    /// A step faulted; the fault is also latched in the session.
    Halted(Fault),
    /// The cancellation flag was raised at a step boundary.
    Cancelled,
    /// There was nothing to run.
    NoProgram,
}

/// What an auto-run loop did before stopping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of instructions that executed successfully.
    pub steps: usize,
    /// Why the loop stopped.
    pub outcome: RunOutcome,
}

/// Steps the session until it completes, halts, or is cancelled.
///
/// Sleeps `interval` between consecutive steps, not before the first or
/// after the last. A cancelled session is left as-is and can be resumed
/// with [`Session::step`] or another call here.
pub fn auto_run(session: &mut Session, interval: Duration, cancel: &AtomicBool) -> RunSummary {
    session.mark_running();
    let mut steps = 0;

    loop {
        if cancel.load(Ordering::Relaxed) {
            return RunSummary {
                steps,
                outcome: RunOutcome::Cancelled,
            };
        }

        let cursor_before = session.cursor();
        match session.step() {
            StepOutcome::Stepped => {
                steps += 1;
                session.mark_running();
                thread::sleep(interval);
            }
            StepOutcome::Completed => {
                // A run whose last instruction was already consumed (at load
                // time, or by an earlier manual step) completes without
                // dispatching anything; only a moved cursor counts as a step.
                return RunSummary {
                    steps: steps + usize::from(session.cursor() != cursor_before),
                    outcome: RunOutcome::Completed,
                };
            }
            StepOutcome::Faulted(fault) => {
                return RunSummary {
                    steps,
                    outcome: RunOutcome::Halted(fault),
                };
            }
            StepOutcome::NoProgram => {
                return RunSummary {
                    steps,
                    outcome: RunOutcome::NoProgram,
                };
            }
        }
    }
}
