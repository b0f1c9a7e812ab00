//! The `Model` trait: what a built-in component computes.

use me_core::EventInfo;
use me_fmu::{ModelMetadata, ValueReference};

/// Equations and discrete behaviour of one component.
///
/// [`TemplateFmu`][crate::TemplateFmu] handles lifecycle, argument checks and
/// logging; a `Model` only maps its own state onto the entry points.  Start
/// values come from `Default`.
///
/// Slice arguments always have the lengths declared in
/// [`metadata`][Self::metadata]; the template rejects anything else before
/// the model sees it.
///
/// Value getters return `None` for references the model does not know.
pub trait Model: Default + Send + 'static {
    /// Identity, dimensions and variables.  Log categories are added by the
    /// template.
    fn metadata() -> ModelMetadata;

    /// Called when initialization mode is left, at the start time.
    fn start(&mut self, _time: f64) {}

    fn real(&self, vr: ValueReference) -> Option<f64>;

    fn integer(&self, _vr: ValueReference) -> Option<i32> {
        None
    }

    fn boolean(&self, _vr: ValueReference) -> Option<bool> {
        None
    }

    fn string(&self, _vr: ValueReference) -> Option<&str> {
        None
    }

    fn states(&self, _x: &mut [f64]) {}

    fn set_states(&mut self, _x: &[f64]) {}

    fn derivatives(&self, _time: f64, _dx: &mut [f64]) {}

    fn event_indicators(&self, _z: &mut [f64]) {}

    /// One discrete-state update.  `info` arrives cleared; set the flags and
    /// the next event time that apply after this update.
    fn event_update(&mut self, _time: f64, _info: &mut EventInfo) {}
}
