//! Ball dropped onto a rigid floor.
//!
//! | vr  | Name      | Kind    |
//! |-----|-----------|---------|
//! | r0  | `h`       | state   |
//! | r1  | `der(h)`  | derived |
//! | r2  | `v`       | state   |
//! | r3  | `der(v)`  | derived |
//! | r4  | `g`       | param   |
//! | r5  | `e`       | param   |
//! | i0  | `bounces` | counter |
//!
//! The single event indicator is the height.  When it crosses zero the ball
//! is put back on the floor with its velocity reversed and scaled by `e`.
//! Once the rebound speed drops below [`V_MIN`] the ball comes to rest.

use me_core::EventInfo;
use me_fmu::{ModelMetadata, ValueReference, VariableKind};

use crate::Model;

/// Rebound speed below which the ball stays on the floor.
pub const V_MIN: f64 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct BouncingBall {
    pub h:       f64,
    pub v:       f64,
    pub g:       f64,
    pub e:       f64,
    pub bounces: i32,
}

impl Default for BouncingBall {
    fn default() -> Self {
        Self { h: 1.0, v: 0.0, g: 9.81, e: 0.7, bounces: 0 }
    }
}

impl Model for BouncingBall {
    fn metadata() -> ModelMetadata {
        ModelMetadata::new("{8c4e810f-3df3-4a00-8276-176fa3c9f003}", "bouncingBall", 2, 1)
            .with_variable("h", 0, VariableKind::Real)
            .with_variable("der(h)", 1, VariableKind::Real)
            .with_variable("v", 2, VariableKind::Real)
            .with_variable("der(v)", 3, VariableKind::Real)
            .with_variable("g", 4, VariableKind::Real)
            .with_variable("e", 5, VariableKind::Real)
            .with_variable("bounces", 0, VariableKind::Integer)
    }

    fn real(&self, vr: ValueReference) -> Option<f64> {
        match vr {
            0 => Some(self.h),
            1 | 2 => Some(self.v),
            3 => Some(-self.g),
            4 => Some(self.g),
            5 => Some(self.e),
            _ => None,
        }
    }

    fn integer(&self, vr: ValueReference) -> Option<i32> {
        (vr == 0).then_some(self.bounces)
    }

    fn states(&self, x: &mut [f64]) {
        x[0] = self.h;
        x[1] = self.v;
    }

    fn set_states(&mut self, x: &[f64]) {
        self.h = x[0];
        self.v = x[1];
    }

    fn derivatives(&self, _time: f64, dx: &mut [f64]) {
        dx[0] = self.v;
        dx[1] = -self.g;
    }

    fn event_indicators(&self, z: &mut [f64]) {
        z[0] = self.h;
    }

    fn event_update(&mut self, _time: f64, info: &mut EventInfo) {
        if self.h > 0.0 || self.v >= 0.0 {
            return;
        }
        self.h = 0.0;
        self.v *= -self.e;
        self.bounces += 1;
        if self.v < V_MIN {
            self.v = 0.0;
            self.g = 0.0;
        }
        info.values_of_continuous_states_changed = true;
    }
}
