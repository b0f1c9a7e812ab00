//! Zero-crossing detection on event indicators.
//!
//! A state event is reported when some indicator has strictly opposite signs
//! in two successive refreshes: `previous[i] * current[i] < 0`.  An indicator
//! that is exactly zero on either side does not count, so a trajectory that
//! touches zero and leaves with the same sign, or that lands on zero at the
//! end of a step, is not flagged at that step.
//!
//! Both vectors start zeroed and are only touched by [`EventDetector::refresh`],
//! so the first step of a run never reports a crossing, and the step after an
//! event compares against the values read before that event.

use std::fmt;

/// Running totals of handled events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub time_events:  u64,
    pub state_events: u64,
    pub step_events:  u64,
}

/// Sign change direction of a crossing indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Rising,
    Falling,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rising  => f.write_str("-/-"),
            Direction::Falling => f.write_str("-\\-"),
        }
    }
}

/// One indicator that changed sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crossing {
    pub index:     usize,
    pub direction: Direction,
}

/// `true` iff some index changed sign strictly between `previous` and `current`.
pub fn has_state_event(previous: &[f64], current: &[f64]) -> bool {
    previous.iter().zip(current).any(|(p, c)| p * c < 0.0)
}

/// Holds the current and previous indicator vectors and the event totals.
#[derive(Debug)]
pub struct EventDetector {
    previous: Vec<f64>,
    current:  Vec<f64>,
    counts:   EventCounts,
}

impl EventDetector {
    /// Wrap two pre-allocated vectors of equal length.
    ///
    /// # Panics
    /// Panics in debug mode if the lengths differ.
    pub fn new(previous: Vec<f64>, current: Vec<f64>) -> Self {
        debug_assert_eq!(previous.len(), current.len());
        Self {
            previous,
            current,
            counts: EventCounts::default(),
        }
    }

    /// Number of indicators (nz).
    #[inline]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn previous(&self) -> &[f64] {
        &self.previous
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// Snapshot current into previous, fetch new values, and report whether
    /// a state event occurred.
    pub fn refresh<E>(&mut self, fetch: impl FnOnce(&mut [f64]) -> Result<(), E>) -> Result<bool, E> {
        self.previous.copy_from_slice(&self.current);
        fetch(&mut self.current)?;
        Ok(has_state_event(&self.previous, &self.current))
    }

    /// Indicators that changed sign in the last refresh.
    pub fn crossings(&self) -> impl Iterator<Item = Crossing> + '_ {
        self.previous
            .iter()
            .zip(&self.current)
            .enumerate()
            .filter(|(_, (p, c))| *p * *c < 0.0)
            .map(|(index, (p, _))| Crossing {
                index,
                direction: if *p > 0.0 { Direction::Falling } else { Direction::Rising },
            })
    }

    /// Add one handled event step to the totals.
    pub fn record(&mut self, time_event: bool, state_event: bool, step_event: bool) {
        self.counts.time_events += u64::from(time_event);
        self.counts.state_events += u64::from(state_event);
        self.counts.step_events += u64::from(step_event);
    }

    pub fn counts(&self) -> EventCounts {
        self.counts
    }
}
