//! Integer counter with no continuous states.
//!
//! `counter` (i0) starts at 1 and is incremented by a time event at every
//! whole second after the start time.  When it reaches 13 the component asks
//! the driver to terminate.

use me_core::EventInfo;
use me_fmu::{ModelMetadata, ValueReference, VariableKind};

use crate::Model;

/// Counter value at which termination is requested.
pub const LAST: i32 = 13;

#[derive(Clone, Debug, PartialEq)]
pub struct Inc {
    pub counter: i32,
    next_tick:   f64,
}

impl Default for Inc {
    fn default() -> Self {
        Self { counter: 1, next_tick: 1.0 }
    }
}

impl Model for Inc {
    fn metadata() -> ModelMetadata {
        ModelMetadata::new("{8c4e810f-3df3-4a00-8276-176fa3c9f008}", "inc", 0, 0)
            .with_variable("counter", 0, VariableKind::Integer)
    }

    fn start(&mut self, time: f64) {
        self.next_tick = time.floor() + 1.0;
    }

    fn real(&self, _vr: ValueReference) -> Option<f64> {
        None
    }

    fn integer(&self, vr: ValueReference) -> Option<i32> {
        (vr == 0).then_some(self.counter)
    }

    fn event_update(&mut self, time: f64, info: &mut EventInfo) {
        if time >= self.next_tick {
            self.counter += 1;
            self.next_tick += 1.0;
        }
        if self.counter == LAST {
            info.terminate_simulation = true;
        } else {
            info.next_event_time_defined = true;
            info.next_event_time = self.next_tick;
        }
    }
}
