//! Generic component wrapper around a [`Model`].
//!
//! `TemplateInstance` tracks its own lifecycle mode and rejects any entry
//! point called in a mode that does not permit it with `Status::Error`,
//! logged under `logStatusError`.  Slice lengths are checked against the
//! declared dimensions before the model is touched.
//!
//! Messages are filtered by category: a message is forwarded when its
//! category (or `logAll`) is enabled and logging is on.  `Error` and `Fatal`
//! messages are always forwarded.

use std::marker::PhantomData;

use me_core::Mode::{self, ContinuousTime, EventSettling, Initializing, Instantiated, Terminated};
use me_core::{CompletedStep, EventInfo, Status};
use me_fmu::{Fmu, LogRecord, ModelInstance, ModelMetadata, SharedLogger, ValueReference};
use tracing::debug;

use crate::Model;

/// Debug-log categories every built-in component understands.
pub const LOG_CATEGORIES: [&str; 5] = ["logAll", "logError", "logFmiCall", "logEvent", "logStatusError"];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Category {
    All,
    Error,
    FmiCall,
    Event,
    StatusError,
}

impl Category {
    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        LOG_CATEGORIES[self.index()]
    }
}

// ── Mode sets ─────────────────────────────────────────────────────────────────

const LIVE: &[Mode] = &[Instantiated, Initializing, EventSettling, ContinuousTime];
const READABLE: &[Mode] = &[Initializing, EventSettling, ContinuousTime, Terminated];
const TIMED: &[Mode] = &[Instantiated, EventSettling, ContinuousTime];

// ── TemplateFmu ───────────────────────────────────────────────────────────────

/// A component package for model `M`.
pub struct TemplateFmu<M: Model> {
    metadata: ModelMetadata,
    _model:   PhantomData<fn() -> M>,
}

impl<M: Model> TemplateFmu<M> {
    pub fn new() -> Self {
        let metadata = LOG_CATEGORIES
            .iter()
            .fold(M::metadata(), |md, category| md.with_log_category(*category));
        Self { metadata, _model: PhantomData }
    }
}

impl<M: Model> Default for TemplateFmu<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Fmu for TemplateFmu<M> {
    type Instance = TemplateInstance<M>;

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn instantiate(
        &self,
        instance_name:      &str,
        guid:               &str,
        _resource_location: &str,
        logger:             SharedLogger,
        _visible:           bool,
        logging_on:         bool,
    ) -> Option<TemplateInstance<M>> {
        let refuse = |message: String| {
            logger.log(&LogRecord {
                instance_name,
                status: Status::Error,
                category: Category::Error.name(),
                message: &message,
            });
            debug!(model = %self.metadata.model_identifier, "instantiation refused: {message}");
        };
        if instance_name.is_empty() {
            refuse("missing instance name".to_owned());
            return None;
        }
        if guid != self.metadata.guid {
            refuse(format!("wrong GUID {guid}, expected {}", self.metadata.guid));
            return None;
        }

        let instance = TemplateInstance {
            name:       instance_name.to_owned(),
            model:      M::default(),
            time:       0.0,
            mode:       Instantiated,
            nx:         self.metadata.num_states,
            nz:         self.metadata.num_event_indicators,
            logger,
            logging_on,
            enabled:    [logging_on; LOG_CATEGORIES.len()],
        };
        instance.log_call(|| "instantiate".to_owned());
        Some(instance)
    }
}

// ── TemplateInstance ──────────────────────────────────────────────────────────

/// One live instance of model `M`.
pub struct TemplateInstance<M: Model> {
    name:       String,
    model:      M,
    time:       f64,
    mode:       Mode,
    nx:         usize,
    nz:         usize,
    logger:     SharedLogger,
    logging_on: bool,
    enabled:    [bool; LOG_CATEGORIES.len()],
}

impl<M: Model> TemplateInstance<M> {
    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn is_logged(&self, category: Category, status: Status) -> bool {
        matches!(status, Status::Error | Status::Fatal)
            || (self.logging_on
                && (self.enabled[category.index()] || self.enabled[Category::All.index()]))
    }

    fn log(&self, category: Category, status: Status, message: &str) {
        if self.is_logged(category, status) {
            self.logger.log(&LogRecord {
                instance_name: &self.name,
                status,
                category: category.name(),
                message,
            });
        }
    }

    /// Formats the message only when the call would be logged.
    fn log_call(&self, message: impl FnOnce() -> String) {
        if self.is_logged(Category::FmiCall, Status::Ok) {
            self.log(Category::FmiCall, Status::Ok, &message());
        }
    }

    fn fail(&self, message: &str) -> Status {
        self.log(Category::Error, Status::Error, message);
        Status::Error
    }

    fn allowed(&self, call: &str, modes: &[Mode]) -> bool {
        if modes.contains(&self.mode) {
            return true;
        }
        self.log(
            Category::StatusError,
            Status::Error,
            &format!("{call}: illegal call sequence in mode {}", self.mode),
        );
        false
    }

    /// Mode check plus length check in one.
    fn guard(&self, call: &str, modes: &[Mode], len: usize, expected: usize) -> Option<Status> {
        if !self.allowed(call, modes) {
            return Some(Status::Error);
        }
        if len != expected {
            return Some(self.fail(&format!("{call}: expected {expected} values, got {len}")));
        }
        None
    }

    fn get_values<T>(
        &self,
        call:   &str,
        refs:   &[ValueReference],
        values: &mut [T],
        read:   impl Fn(&M, ValueReference) -> Option<T>,
    ) -> Status {
        if let Some(status) = self.guard(call, READABLE, values.len(), refs.len()) {
            return status;
        }
        for (vr, out) in refs.iter().zip(values.iter_mut()) {
            match read(&self.model, *vr) {
                Some(v) => *out = v,
                None => return self.fail(&format!("{call}: unknown value reference {vr}")),
            }
        }
        Status::Ok
    }
}

impl<M: Model> ModelInstance for TemplateInstance<M> {
    fn set_debug_logging(&mut self, logging_on: bool, categories: &[String]) -> Status {
        self.logging_on = logging_on;
        if categories.is_empty() {
            self.enabled = [logging_on; LOG_CATEGORIES.len()];
        } else {
            self.enabled = [false; LOG_CATEGORIES.len()];
            for category in categories {
                match LOG_CATEGORIES.iter().position(|c| c == category) {
                    Some(i) => self.enabled[i] = logging_on,
                    None => {
                        return self.fail(&format!("set_debug_logging: unknown category {category}"));
                    }
                }
            }
        }
        self.log_call(|| format!("set_debug_logging: on={logging_on} categories={categories:?}"));
        Status::Ok
    }

    fn setup_experiment(&mut self, tolerance: Option<f64>, start_time: f64, stop_time: Option<f64>) -> Status {
        if !self.allowed("setup_experiment", &[Instantiated]) {
            return Status::Error;
        }
        self.log_call(|| {
            format!("setup_experiment: tolerance={tolerance:?} start={start_time} stop={stop_time:?}")
        });
        self.time = start_time;
        Status::Ok
    }

    fn enter_initialization_mode(&mut self) -> Status {
        if !self.allowed("enter_initialization_mode", &[Instantiated]) {
            return Status::Error;
        }
        self.log_call(|| "enter_initialization_mode".to_owned());
        self.mode = Initializing;
        Status::Ok
    }

    fn exit_initialization_mode(&mut self) -> Status {
        if !self.allowed("exit_initialization_mode", &[Initializing]) {
            return Status::Error;
        }
        self.log_call(|| "exit_initialization_mode".to_owned());
        self.model.start(self.time);
        self.mode = EventSettling;
        Status::Ok
    }

    fn enter_event_mode(&mut self) -> Status {
        if !self.allowed("enter_event_mode", &[EventSettling, ContinuousTime]) {
            return Status::Error;
        }
        self.log_call(|| format!("enter_event_mode: t={}", self.time));
        self.mode = EventSettling;
        Status::Ok
    }

    fn new_discrete_states(&mut self, info: &mut EventInfo) -> Status {
        if !self.allowed("new_discrete_states", &[EventSettling]) {
            return Status::Error;
        }
        self.log_call(|| "new_discrete_states".to_owned());
        *info = EventInfo::default();
        self.model.event_update(self.time, info);

        if info.terminate_simulation {
            self.log(Category::Event, Status::Ok, &format!("terminate requested at t={}", self.time));
        } else if let Some(next) = info.pending_event_time() {
            self.log(Category::Event, Status::Ok, &format!("next time event at t={next}"));
        }
        Status::Ok
    }

    fn enter_continuous_time_mode(&mut self) -> Status {
        if !self.allowed("enter_continuous_time_mode", &[EventSettling]) {
            return Status::Error;
        }
        self.log_call(|| "enter_continuous_time_mode".to_owned());
        self.mode = ContinuousTime;
        Status::Ok
    }

    fn set_time(&mut self, time: f64) -> Status {
        if !self.allowed("set_time", TIMED) {
            return Status::Error;
        }
        self.log_call(|| format!("set_time: t={time}"));
        self.time = time;
        Status::Ok
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Status {
        if let Some(status) = self.guard("get_continuous_states", READABLE, states.len(), self.nx) {
            return status;
        }
        self.model.states(states);
        Status::Ok
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> Status {
        if let Some(status) = self.guard("set_continuous_states", &[ContinuousTime], states.len(), self.nx) {
            return status;
        }
        self.model.set_states(states);
        Status::Ok
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> Status {
        if let Some(status) = self.guard("get_derivatives", READABLE, derivatives.len(), self.nx) {
            return status;
        }
        self.model.derivatives(self.time, derivatives);
        Status::Ok
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status {
        if let Some(status) = self.guard("get_event_indicators", READABLE, indicators.len(), self.nz) {
            return status;
        }
        self.model.event_indicators(indicators);
        Status::Ok
    }

    fn completed_integrator_step(&mut self, _no_set_state_prior: bool, result: &mut CompletedStep) -> Status {
        if !self.allowed("completed_integrator_step", &[ContinuousTime]) {
            return Status::Error;
        }
        *result = CompletedStep::default();
        Status::Ok
    }

    fn get_real(&mut self, refs: &[ValueReference], values: &mut [f64]) -> Status {
        self.get_values("get_real", refs, values, M::real)
    }

    fn get_integer(&mut self, refs: &[ValueReference], values: &mut [i32]) -> Status {
        self.get_values("get_integer", refs, values, M::integer)
    }

    fn get_boolean(&mut self, refs: &[ValueReference], values: &mut [bool]) -> Status {
        self.get_values("get_boolean", refs, values, M::boolean)
    }

    fn get_string(&mut self, refs: &[ValueReference], values: &mut [String]) -> Status {
        self.get_values("get_string", refs, values, |m, vr| m.string(vr).map(str::to_owned))
    }

    fn terminate(&mut self) -> Status {
        if !self.allowed("terminate", LIVE) {
            return Status::Error;
        }
        self.log_call(|| format!("terminate: t={}", self.time));
        self.mode = Terminated;
        Status::Ok
    }

    fn free_instance(self) {
        self.log_call(|| "free_instance".to_owned());
    }
}
