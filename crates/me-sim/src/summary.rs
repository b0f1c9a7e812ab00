//! End-of-run reporting.

use std::fmt;

use crate::EventCounts;

/// How a successful run ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RunOutcome {
    /// The clock reached the end time.
    Completed,
    /// The component requested termination at `at`.  Still a success.
    Terminated { at: f64 },
}

/// Totals reported after a run, whether it succeeded or aborted.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub start_time: f64,
    pub end_time:   f64,
    /// Clock time when the run stopped.
    pub final_time: f64,
    /// Completed integration steps (one sample row each).
    pub steps:      u64,
    pub step_size:  f64,
    pub events:     EventCounts,
    /// `None` until the run has finished or if it aborted.
    pub outcome:    Option<RunOutcome>,
    pub aborted:    bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.aborted {
            writeln!(
                f,
                "Simulation from {} to {} aborted at t={}",
                self.start_time, self.end_time, self.final_time
            )?;
        } else {
            writeln!(
                f,
                "Simulation from {} to {} terminated successful",
                self.start_time, self.end_time
            )?;
        }
        writeln!(f, "  steps ............ {}", self.steps)?;
        writeln!(f, "  fixed step size .. {}", self.step_size)?;
        writeln!(f, "  time events ...... {}", self.events.time_events)?;
        writeln!(f, "  state events ..... {}", self.events.state_events)?;
        write!(f, "  step events ...... {}", self.events.step_events)
    }
}
