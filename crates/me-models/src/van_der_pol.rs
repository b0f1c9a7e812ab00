//! Van der Pol oscillator.
//!
//! ```text
//! dx0/dt = x1
//! dx1/dt = mu·(1 - x0²)·x1 - x0
//! ```
//!
//! Starts at `x0 = 2`, `x1 = 0` with `mu = 1`.

use me_fmu::{ModelMetadata, ValueReference, VariableKind};

use crate::Model;

#[derive(Clone, Debug, PartialEq)]
pub struct VanDerPol {
    pub x0: f64,
    pub x1: f64,
    pub mu: f64,
}

impl Default for VanDerPol {
    fn default() -> Self {
        Self { x0: 2.0, x1: 0.0, mu: 1.0 }
    }
}

impl VanDerPol {
    fn der_x1(&self) -> f64 {
        self.mu * (1.0 - self.x0 * self.x0) * self.x1 - self.x0
    }
}

impl Model for VanDerPol {
    fn metadata() -> ModelMetadata {
        ModelMetadata::new("{8c4e810f-3da3-4a00-8276-176fa3c9f000}", "vanDerPol", 2, 0)
            .with_variable("x0", 0, VariableKind::Real)
            .with_variable("der(x0)", 1, VariableKind::Real)
            .with_variable("x1", 2, VariableKind::Real)
            .with_variable("der(x1)", 3, VariableKind::Real)
            .with_variable("mu", 4, VariableKind::Real)
    }

    fn real(&self, vr: ValueReference) -> Option<f64> {
        match vr {
            0 => Some(self.x0),
            1 | 2 => Some(self.x1),
            3 => Some(self.der_x1()),
            4 => Some(self.mu),
            _ => None,
        }
    }

    fn states(&self, x: &mut [f64]) {
        x[0] = self.x0;
        x[1] = self.x1;
    }

    fn set_states(&mut self, x: &[f64]) {
        self.x0 = x[0];
        self.x1 = x[1];
    }

    fn derivatives(&self, _time: f64, dx: &mut [f64]) {
        dx[0] = self.x1;
        dx[1] = self.der_x1();
    }
}
