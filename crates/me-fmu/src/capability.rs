//! The capability table: every entry point a model-exchange component offers.

use me_core::{CompletedStep, EventInfo, Status};

use crate::{ModelMetadata, SharedLogger, ValueReference};

/// A loaded component package that can produce instances.
///
/// Implementations wrap whatever binds the entry points: a dynamically
/// loaded library, a model written directly in Rust, or a test double.
///
/// # Example
///
/// ```rust,ignore
/// let fmu = BouncingBall::fmu();
/// let logger: SharedLogger = Arc::new(TracingLogger::new(fmu.metadata()));
/// let instance = fmu.instantiate("ball", &fmu.metadata().guid, "", logger, false, true);
/// ```
pub trait Fmu {
    type Instance: ModelInstance;

    /// Structural facts about the component.
    fn metadata(&self) -> &ModelMetadata;

    /// Create one instance.
    ///
    /// Returns `None` when the component refuses, e.g. because `guid` does
    /// not match the one it was built with.
    fn instantiate(
        &self,
        instance_name:     &str,
        guid:              &str,
        resource_location: &str,
        logger:            SharedLogger,
        visible:           bool,
        logging_on:        bool,
    ) -> Option<Self::Instance>;
}

/// One live component instance.
///
/// Calls must follow the lifecycle order enforced by the driver; a call made
/// in the wrong mode is undefined behavior for a real component.  Every method
/// reports a [`Status`]; results are written through the `&mut` arguments.
pub trait ModelInstance {
    fn set_debug_logging(&mut self, logging_on: bool, categories: &[String]) -> Status;

    /// Describe the experiment.  `None` leaves tolerance or stop time undefined.
    fn setup_experiment(
        &mut self,
        tolerance:  Option<f64>,
        start_time: f64,
        stop_time:  Option<f64>,
    ) -> Status;

    fn enter_initialization_mode(&mut self) -> Status;
    fn exit_initialization_mode(&mut self) -> Status;

    fn enter_event_mode(&mut self) -> Status;

    /// One discrete-state update.  May need to be repeated until
    /// `info.new_discrete_states_needed` clears.
    fn new_discrete_states(&mut self, info: &mut EventInfo) -> Status;

    fn enter_continuous_time_mode(&mut self) -> Status;

    fn set_time(&mut self, time: f64) -> Status;

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Status;
    fn set_continuous_states(&mut self, states: &[f64]) -> Status;
    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> Status;
    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status;

    fn completed_integrator_step(
        &mut self,
        no_set_state_prior: bool,
        result:             &mut CompletedStep,
    ) -> Status;

    // ── Variable access ───────────────────────────────────────────────────

    fn get_real(&mut self, refs: &[ValueReference], values: &mut [f64]) -> Status;
    fn get_integer(&mut self, refs: &[ValueReference], values: &mut [i32]) -> Status;
    fn get_boolean(&mut self, refs: &[ValueReference], values: &mut [bool]) -> Status;
    fn get_string(&mut self, refs: &[ValueReference], values: &mut [String]) -> Status;

    // ── Teardown ──────────────────────────────────────────────────────────

    fn terminate(&mut self) -> Status;

    /// Release the instance.  Consumes it, so it can happen only once.
    fn free_instance(self);
}
