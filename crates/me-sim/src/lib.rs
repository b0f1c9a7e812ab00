//! `me-sim`: the simulation driver for model-exchange components.
//!
//! # Run loop
//!
//! ```text
//! instantiate → setup experiment → initialization mode → settle events
//! enter continuous time, write header + first sample
//! while time < end_time:
//!   ① get states and derivatives
//!   ② plan step: min(t + h, end, next time event)
//!   ③ set time, forward-Euler step, set states
//!   ④ refresh event indicators, look for sign changes
//!   ⑤ completed integrator step → step event / termination
//!   ⑥ any event → event mode, settle, back to continuous time
//!   ⑦ write sample
//! terminate + free instance
//! ```
//!
//! State events are only noticed at the end of the step in which an
//! indicator changed sign; they are never root-found.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use me_core::SimConfig;
//! use me_sim::{NoopSink, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), fmu).build()?;
//! let outcome = sim.run(&mut NoopSink)?;
//! println!("{}", sim.summary());
//! ```

pub mod builder;
pub mod detector;
pub mod error;
pub mod integrator;
pub mod sim;
pub mod sink;
pub mod summary;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use detector::{Crossing, Direction, EventCounts, EventDetector, has_state_event};
pub use error::{SimError, SimResult};
pub use integrator::forward_euler;
pub use sim::Sim;
pub use sink::{NoopSink, ResultSink, Row, SinkError, SinkResult};
pub use summary::{RunOutcome, RunSummary};
