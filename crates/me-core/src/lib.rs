//! `me-core`: foundational types for the model-exchange simulation driver.
//!
//! This crate is a dependency of every other `me-*` crate.  It has no `me-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                               |
//! |------------|--------------------------------------------------------|
//! | [`status`] | `Status`: severity reported by every component call   |
//! | [`event`]  | `EventInfo`, `CompletedStep`                           |
//! | [`mode`]   | `Mode`: the driver's lifecycle state machine          |
//! | [`time`]   | `SimClock`, `StepPlan`, `SimConfig`                    |
//! | [`error`]  | `CoreError`, `CoreResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to config and event types.  |

pub mod error;
pub mod event;
pub mod mode;
pub mod status;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use event::{CompletedStep, EventInfo};
pub use mode::Mode;
pub use status::Status;
pub use time::{SimClock, SimConfig, StepPlan};
