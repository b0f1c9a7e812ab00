//! The driver's lifecycle state machine.

use std::fmt;

/// The lifecycle phase a component instance is in, as tracked by the driver.
///
/// ```text
/// Instantiated ─▶ Initializing ─▶ EventSettling ◀─▶ ContinuousTime
///       │               │               │                 │
///       └───────────────┴───────────────┴─────────────────┴─▶ Terminated
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Mode {
    Instantiated,
    Initializing,
    EventSettling,
    ContinuousTime,
    Terminated,
}

impl Mode {
    /// Whether the call-ordering contract permits moving from `self` to `next`.
    ///
    /// Every live mode may drop straight to `Terminated`; that is the only
    /// exit taken on a fatal error or a requested termination.
    pub fn can_transition_to(self, next: Mode) -> bool {
        use Mode::*;
        matches!(
            (self, next),
            (Instantiated, Initializing)
                | (Initializing, EventSettling)
                | (EventSettling, ContinuousTime)
                | (ContinuousTime, EventSettling)
                | (Instantiated | Initializing | EventSettling | ContinuousTime, Terminated)
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Instantiated   => "instantiated",
            Mode::Initializing   => "initializing",
            Mode::EventSettling  => "event settling",
            Mode::ContinuousTime => "continuous time",
            Mode::Terminated     => "terminated",
        };
        f.write_str(name)
    }
}
