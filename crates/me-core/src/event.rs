//! Records exchanged with the component during event handling.

/// Filled in by every discrete-state-update call.
///
/// Only the most recent value matters; the driver keeps it between calls
/// solely to read the pending `next_event_time`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventInfo {
    /// Another discrete-state update is required before the event settles.
    pub new_discrete_states_needed:            bool,
    /// The component asks the driver to stop.
    pub terminate_simulation:                  bool,
    pub nominals_of_continuous_states_changed: bool,
    pub values_of_continuous_states_changed:   bool,
    /// `next_event_time` is meaningful only when this is set.
    pub next_event_time_defined:               bool,
    pub next_event_time:                       f64,
}

impl EventInfo {
    /// The state an event iteration starts from: one update is always
    /// requested and no termination is pending.
    pub fn settling() -> Self {
        Self {
            new_discrete_states_needed: true,
            ..Self::default()
        }
    }

    /// `true` while the settling loop must keep calling the update entry point.
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.new_discrete_states_needed && !self.terminate_simulation
    }

    /// The announced time event, if any.
    #[inline]
    pub fn pending_event_time(&self) -> Option<f64> {
        self.next_event_time_defined.then_some(self.next_event_time)
    }
}

/// Result of telling the component an integrator step has completed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompletedStep {
    /// The component wants event mode (a step event).
    pub enter_event_mode:     bool,
    pub terminate_simulation: bool,
}
