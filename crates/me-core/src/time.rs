//! Simulation time model.
//!
//! # Design
//!
//! Time is a plain `f64` advanced in fixed steps of `step_size`, clipped at
//! `end_time` and shortened whenever the component announces a time event
//! that falls inside the next step:
//!
//!   next = min(time + step_size, end_time, pending_event_time)
//!
//! Repeated addition of a step size such as 0.1 drifts (ten steps reach
//! 0.9999999999999999, not 1.0).  A candidate within `END_SNAP * step_size`
//! of `end_time` therefore lands exactly on `end_time`, so a run never ends
//! with a sliver step.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Relative distance from `end_time` below which a step is snapped onto it.
const END_SNAP: f64 = 1e-9;

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The simulation clock.
///
/// `time` is monotonically non-decreasing and never exceeds `end_time`.
#[derive(Clone, Debug, PartialEq)]
pub struct SimClock {
    /// Current simulated time.
    pub time:       f64,
    pub start_time: f64,
    pub end_time:   f64,
    /// Fixed integration step.
    pub step_size:  f64,
}

/// Where the next integration step lands and why.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepPlan {
    pub next_time:  f64,
    /// `next_time - time`.
    pub dt:         f64,
    /// The step was shortened to hit an announced time event.
    pub time_event: bool,
}

impl SimClock {
    /// Create a clock positioned at `start_time`.
    pub fn new(start_time: f64, end_time: f64, step_size: f64) -> Self {
        Self {
            time: start_time,
            start_time,
            end_time,
            step_size,
        }
    }

    /// `true` once the clock has reached `end_time`.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.time >= self.end_time
    }

    /// Plan the next step without moving the clock.
    ///
    /// A pending event time clamps the step only when it lies strictly after
    /// the current time and at or before the candidate; a stale event time
    /// (at or before `time`) is ignored rather than moving the clock back.
    pub fn plan_step(&self, pending_event: Option<f64>) -> StepPlan {
        let mut next_time = self.time + self.step_size;
        if next_time >= self.end_time || self.end_time - next_time <= END_SNAP * self.step_size {
            next_time = self.end_time;
        }

        let mut time_event = false;
        if let Some(event_time) = pending_event {
            if event_time > self.time && event_time <= next_time {
                next_time = event_time;
                time_event = true;
            }
        }

        StepPlan {
            next_time,
            dt: next_time - self.time,
            time_event,
        }
    }

    /// Move the clock to `next_time`.
    ///
    /// # Panics
    /// Panics in debug mode if `next_time` goes backwards or past `end_time`.
    #[inline]
    pub fn advance_to(&mut self, next_time: f64) {
        debug_assert!(next_time >= self.time, "clock moved backwards");
        debug_assert!(next_time <= self.end_time, "clock moved past end time");
        self.time = next_time;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} ({}..{}, h={})", self.time, self.start_time, self.end_time, self.step_size)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Experiment configuration for one run.
///
/// Typically assembled from command-line flags by the application crate and
/// passed to the simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    pub start_time: f64,

    /// Fixed end time.  The final recorded sample lands exactly here unless
    /// the component requests termination earlier.
    pub end_time: f64,

    /// Fixed forward-Euler step.  Default: 0.1.
    pub step_size: f64,

    /// Relative tolerance handed to the component.  `None` leaves the
    /// tolerance undefined.
    pub tolerance: Option<f64>,

    /// Ask the component to emit its own log messages.
    pub logging_on: bool,

    /// Debug-log categories enabled on the component.  Empty means the
    /// set-debug-logging entry point is not called at all.
    pub log_categories: Vec<String>,

    /// Whether the component may show a user interface.
    pub visible: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_time:     0.0,
            end_time:       1.0,
            step_size:      0.1,
            tolerance:      None,
            logging_on:     false,
            log_categories: Vec::new(),
            visible:        false,
        }
    }
}

impl SimConfig {
    /// Check that the experiment is well-formed.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.start_time.is_finite() {
            return Err(CoreError::NonFinite("start time"));
        }
        if !self.end_time.is_finite() {
            return Err(CoreError::NonFinite("end time"));
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(CoreError::InvalidStepSize(self.step_size));
        }
        if self.end_time < self.start_time {
            return Err(CoreError::InvalidInterval {
                start: self.start_time,
                end:   self.end_time,
            });
        }
        // Time must move on every step anywhere in the interval.
        let widest = self.start_time.abs().max(self.end_time.abs());
        if widest + self.step_size == widest {
            return Err(CoreError::StepTooSmall { step: self.step_size, at: widest });
        }
        if let Some(tol) = self.tolerance {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(CoreError::InvalidTolerance(tol));
            }
        }
        Ok(())
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_time, self.end_time, self.step_size)
    }
}
