//! Dahlquist test equation `dx/dt = -k·x`, `x(0) = 1`, `k = 1`.

use me_fmu::{ModelMetadata, ValueReference, VariableKind};

use crate::Model;

#[derive(Clone, Debug, PartialEq)]
pub struct Dq {
    pub x: f64,
    pub k: f64,
}

impl Default for Dq {
    fn default() -> Self {
        Self { x: 1.0, k: 1.0 }
    }
}

impl Model for Dq {
    fn metadata() -> ModelMetadata {
        ModelMetadata::new("{8c4e810f-3df3-4a00-8276-176fa3c9f000}", "dq", 1, 0)
            .with_variable("x", 0, VariableKind::Real)
            .with_variable("der(x)", 1, VariableKind::Real)
            .with_variable("k", 2, VariableKind::Real)
    }

    fn real(&self, vr: ValueReference) -> Option<f64> {
        match vr {
            0 => Some(self.x),
            1 => Some(-self.k * self.x),
            2 => Some(self.k),
            _ => None,
        }
    }

    fn states(&self, x: &mut [f64]) {
        x[0] = self.x;
    }

    fn set_states(&mut self, x: &[f64]) {
        self.x = x[0];
    }

    fn derivatives(&self, _time: f64, dx: &mut [f64]) {
        dx[0] = -self.k * self.x;
    }
}
