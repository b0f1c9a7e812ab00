//! `me-models`: built-in model-exchange components.
//!
//! Each component is a plain [`Model`] (state, derivatives, event
//! indicators, discrete updates) wrapped in [`TemplateFmu`], which supplies
//! everything a loaded component would otherwise implement by hand: the
//! call-order checks per lifecycle mode, the GUID check at instantiation,
//! and category-filtered logging through the host's logger.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                |
//! |-------------------|---------------------------------------------------------|
//! | [`model`]         | `Model` trait                                           |
//! | [`template`]      | `TemplateFmu<M>`, `TemplateInstance<M>`, log categories |
//! | [`bouncing_ball`] | Ball under gravity with restitution; state events       |
//! | [`inc`]           | Integer counter driven by time events                   |
//! | [`dq`]            | Dahlquist test equation `dx/dt = -k·x`                  |
//! | [`van_der_pol`]   | Van der Pol oscillator                                  |
//!
//! # Usage
//!
//! ```rust,ignore
//! use me_models::{BouncingBall, TemplateFmu};
//!
//! let fmu = TemplateFmu::<BouncingBall>::new();
//! let mut sim = SimBuilder::new(config, fmu).build()?;
//! ```

pub mod bouncing_ball;
pub mod dq;
pub mod inc;
pub mod model;
pub mod template;
pub mod van_der_pol;


pub use bouncing_ball::BouncingBall;
pub use dq::Dq;
pub use inc::Inc;
pub use model::Model;
pub use template::{LOG_CATEGORIES, TemplateFmu, TemplateInstance};
pub use van_der_pol::VanDerPol;

/// Names and one-line descriptions of the built-in components.
pub const BUILTIN_MODELS: [(&str, &str); 4] = [
    ("bouncing_ball", "ball dropped from 1 m, bouncing with restitution 0.7"),
    ("inc",           "integer counter incremented every second, stops at 13"),
    ("dq",            "Dahlquist test equation dx/dt = -k*x"),
    ("van_der_pol",   "Van der Pol oscillator with mu = 1"),
];
