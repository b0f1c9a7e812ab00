//! The `Sim` struct and its run loop.

use std::sync::Arc;

use me_core::{CompletedStep, EventInfo, Mode, SimClock, SimConfig, Status};
use me_fmu::{Fmu, ModelInstance, ModelMetadata, ScalarVariable, SharedLogger, VariableKind, VariableValue};
use tracing::{debug, error, info, warn};

use crate::{
    EventCounts, EventDetector, ResultSink, Row, RunOutcome, RunSummary, SimError, SimResult,
    forward_euler,
};

// ── Per-run buffers ───────────────────────────────────────────────────────────

/// Vectors owned for exactly one run.  Allocated before the component is
/// instantiated and dropped when `run` returns, on every path.
struct Workspace {
    states:      Vec<f64>,
    derivatives: Vec<f64>,
    detector:    EventDetector,
    /// Scratch buffer for one sample row.
    row:         Vec<VariableValue>,
}

impl Workspace {
    fn allocate(metadata: &ModelMetadata) -> SimResult<Self> {
        let nx = metadata.num_states;
        let nz = metadata.num_event_indicators;
        Ok(Self {
            states:      zeroed(nx, "continuous states")?,
            derivatives: zeroed(nx, "derivatives")?,
            detector:    EventDetector::new(
                zeroed(nz, "previous event indicators")?,
                zeroed(nz, "event indicators")?,
            ),
            row:         reserve(metadata.variables.len(), "result row")?,
        })
    }
}

fn reserve<T>(len: usize, what: &'static str) -> SimResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| SimError::Allocation { what, len })?;
    Ok(v)
}

fn zeroed(len: usize, what: &'static str) -> SimResult<Vec<f64>> {
    let mut v = reserve(len, what)?;
    v.resize(len, 0.0);
    Ok(v)
}

// ── Instance guard ────────────────────────────────────────────────────────────

/// Owns a live component instance.  Terminates and frees it on
/// [`release`][Self::release] or on drop, whichever comes first.
struct InstanceGuard<I: ModelInstance> {
    instance: Option<I>,
}

impl<I: ModelInstance> InstanceGuard<I> {
    fn new(instance: I) -> Self {
        Self { instance: Some(instance) }
    }

    fn get_mut(&mut self) -> Option<&mut I> {
        self.instance.as_mut()
    }

    /// Terminate, then free.  Later calls do nothing.
    fn release(&mut self) {
        let Some(mut instance) = self.instance.take() else {
            return;
        };
        let status = instance.terminate();
        if status.is_fatal() {
            warn!(%status, "terminate reported failure; freeing instance anyway");
        }
        instance.free_instance();
    }
}

impl<I: ModelInstance> Drop for InstanceGuard<I> {
    fn drop(&mut self) {
        self.release();
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation driver.
///
/// `Sim<F>` owns the component package, the clock and the run counters, and
/// drives exactly one component instance through its lifecycle:
///
/// 1. **Instantiated**: optional debug-logging setup.
/// 2. **Initializing**: experiment setup, start time, initialization mode.
/// 3. **EventSettling**: discrete-state updates until the component settles.
/// 4. **ContinuousTime**: fixed-step forward Euler with event detection,
///    dropping back to event settling whenever a time, state or step event
///    occurs.
/// 5. **Terminated**: `terminate` + `free_instance`, on every exit path.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<F: Fmu> {
    /// Experiment configuration (interval, step size, tolerance, logging).
    pub config: SimConfig,

    /// Simulation clock.  Starts at `config.start_time`.
    pub clock: SimClock,

    pub(crate) fmu:               F,
    pub(crate) instance_name:     String,
    pub(crate) resource_location: String,
    pub(crate) logger:            SharedLogger,

    mode:       Option<Mode>,
    event_info: EventInfo,
    steps:      u64,
    counts:     EventCounts,
    outcome:    Option<RunOutcome>,
    aborted:    bool,
    started:    bool,
}

impl<F: Fmu> Sim<F> {
    pub(crate) fn new(
        config:            SimConfig,
        fmu:               F,
        instance_name:     String,
        resource_location: String,
        logger:            SharedLogger,
    ) -> Self {
        Self {
            clock: config.make_clock(),
            config,
            fmu,
            instance_name,
            resource_location,
            logger,
            mode:       None,
            event_info: EventInfo::default(),
            steps:      0,
            counts:     EventCounts::default(),
            outcome:    None,
            aborted:    false,
            started:    false,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run the experiment from `config.start_time` to `config.end_time`,
    /// writing every sample to `sink`.
    ///
    /// A component-requested termination returns
    /// [`RunOutcome::Terminated`]; any call reporting a status above
    /// `Warning` aborts with the matching [`SimError`].  A `Sim` runs once.
    pub fn run<S: ResultSink>(&mut self, sink: &mut S) -> SimResult<RunOutcome> {
        if self.started {
            return Err(SimError::AlreadyRun);
        }
        self.started = true;

        let md = self.fmu.metadata();
        info!(
            model = %md.model_identifier,
            nx    = md.num_states,
            nz    = md.num_event_indicators,
            start = self.config.start_time,
            end   = self.config.end_time,
            step  = self.config.step_size,
            "starting simulation"
        );

        let result = self.run_instance(sink);
        match &result {
            Ok(outcome) => self.outcome = Some(*outcome),
            Err(e) => {
                self.aborted = true;
                error!(time = self.clock.time, "simulation aborted: {e}");
            }
        }
        info!(
            steps        = self.steps,
            time_events  = self.counts.time_events,
            state_events = self.counts.state_events,
            step_events  = self.counts.step_events,
            "simulation finished at t={}",
            self.clock.time
        );
        result
    }

    /// Totals for the run so far.  Meaningful after [`run`][Self::run]
    /// returns, whether it succeeded or not.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            start_time: self.config.start_time,
            end_time:   self.config.end_time,
            final_time: self.clock.time,
            steps:      self.steps,
            step_size:  self.config.step_size,
            events:     self.counts,
            outcome:    self.outcome,
            aborted:    self.aborted,
        }
    }

    /// The lifecycle mode of the component instance; `None` before the first
    /// instantiation.
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// The last record returned by a discrete-state update.
    pub fn event_info(&self) -> &EventInfo {
        &self.event_info
    }

    pub fn metadata(&self) -> &ModelMetadata {
        self.fmu.metadata()
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Allocate, instantiate, drive, release.  The instance is released and
    /// the sink finished no matter how `drive` returns; a panic inside `drive`
    /// still releases the instance through the guard.
    fn run_instance<S: ResultSink>(&mut self, sink: &mut S) -> SimResult<RunOutcome> {
        let mut work = Workspace::allocate(self.fmu.metadata())?;

        let instance = self.fmu.instantiate(
            &self.instance_name,
            &self.fmu.metadata().guid,
            &self.resource_location,
            Arc::clone(&self.logger),
            self.config.visible,
            self.config.logging_on,
        );
        let Some(instance) = instance else {
            return Err(SimError::Instantiation);
        };
        let mut guard = InstanceGuard::new(instance);
        self.transition(Mode::Instantiated);

        let result = match guard.get_mut() {
            Some(inst) => self.drive(inst, &mut work, sink),
            None => Err(SimError::Instantiation),
        };
        self.counts = work.detector.counts();
        drop(work);
        guard.release();
        self.transition(Mode::Terminated);

        let closed = sink.finish().map_err(SimError::OutputWrite);
        match result {
            Ok(outcome) => closed.map(|()| outcome),
            Err(e) => {
                if let Err(close_err) = closed {
                    warn!("could not close result output after abort: {close_err}");
                }
                Err(e)
            }
        }
    }

    fn drive<S: ResultSink>(
        &mut self,
        inst: &mut F::Instance,
        work: &mut Workspace,
        sink: &mut S,
    ) -> SimResult<RunOutcome> {
        if !self.config.log_categories.is_empty() {
            check(
                inst.set_debug_logging(true, &self.config.log_categories),
                "set_debug_logging",
                SimError::DebugLogging,
            )?;
        }
        sink.begin().map_err(SimError::OutputOpen)?;

        // ── Initialization ────────────────────────────────────────────────
        self.transition(Mode::Initializing);
        check(
            inst.setup_experiment(
                self.config.tolerance,
                self.config.start_time,
                Some(self.config.end_time),
            ),
            "setup_experiment",
            SimError::ExperimentSetup,
        )?;
        check(inst.set_time(self.clock.time), "set_time", SimError::TimeSet)?;
        check(
            inst.enter_initialization_mode(),
            "enter_initialization_mode",
            SimError::InitializationEntry,
        )?;
        check(
            inst.exit_initialization_mode(),
            "exit_initialization_mode",
            SimError::InitializationExit,
        )?;
        self.transition(Mode::EventSettling);

        if settle(inst, &mut self.event_info)? {
            return Ok(self.terminated());
        }

        // ── Continuous time ───────────────────────────────────────────────
        self.enter_continuous_time(inst)?;
        let header = Row::Header {
            time:      self.clock.time,
            variables: &self.fmu.metadata().variables,
        };
        sink.write_row(&header).map_err(SimError::OutputWrite)?;
        self.write_sample(inst, work, sink)?;

        while !self.clock.is_finished() {
            if let Some(outcome) = self.step(inst, work, sink)? {
                return Ok(outcome);
            }
        }
        Ok(RunOutcome::Completed)
    }

    /// One integration step plus any event handling it triggers.
    ///
    /// Returns `Some` when the component requested termination.
    fn step<S: ResultSink>(
        &mut self,
        inst: &mut F::Instance,
        work: &mut Workspace,
        sink: &mut S,
    ) -> SimResult<Option<RunOutcome>> {
        check(
            inst.get_continuous_states(&mut work.states),
            "get_continuous_states",
            SimError::StateRetrieval,
        )?;
        check(
            inst.get_derivatives(&mut work.derivatives),
            "get_derivatives",
            SimError::DerivativeRetrieval,
        )?;

        let plan = self.clock.plan_step(self.event_info.pending_event_time());
        self.clock.advance_to(plan.next_time);
        check(inst.set_time(self.clock.time), "set_time", SimError::TimeSet)?;

        forward_euler(&mut work.states, &work.derivatives, plan.dt);
        check(
            inst.set_continuous_states(&work.states),
            "set_continuous_states",
            SimError::StateWrite,
        )?;
        debug!(step = self.steps, time = self.clock.time, dt = plan.dt, "step");

        let state_event = work.detector.refresh(|z| {
            check(
                inst.get_event_indicators(z),
                "get_event_indicators",
                SimError::EventIndicatorRetrieval,
            )
        })?;

        let mut completed = CompletedStep::default();
        check(
            inst.completed_integrator_step(true, &mut completed),
            "completed_integrator_step",
            SimError::IntegratorStep,
        )?;
        if completed.terminate_simulation {
            return Ok(Some(self.terminated()));
        }

        let time_event = plan.time_event;
        let step_event = completed.enter_event_mode;
        if (time_event || state_event || step_event)
            && self.handle_events(inst, work, time_event, state_event, step_event)?
        {
            return Ok(Some(self.terminated()));
        }

        self.write_sample(inst, work, sink)?;
        self.steps += 1;
        Ok(None)
    }

    /// Event mode → settle → continuous time.  Returns `true` when the
    /// component requested termination while settling.
    fn handle_events(
        &mut self,
        inst:        &mut F::Instance,
        work:        &mut Workspace,
        time_event:  bool,
        state_event: bool,
        step_event:  bool,
    ) -> SimResult<bool> {
        check(inst.enter_event_mode(), "enter_event_mode", SimError::EventModeEntry)?;
        self.transition(Mode::EventSettling);

        let time = self.clock.time;
        work.detector.record(time_event, state_event, step_event);
        if time_event {
            debug!(time, "time event");
        }
        if state_event {
            for crossing in work.detector.crossings() {
                debug!(time, indicator = crossing.index, direction = %crossing.direction, "state event");
            }
        }
        if step_event {
            debug!(time, "step event");
        }

        if settle(inst, &mut self.event_info)? {
            return Ok(true);
        }
        self.enter_continuous_time(inst)?;

        if self.event_info.values_of_continuous_states_changed {
            debug!(time, "continuous state values changed");
        }
        if self.event_info.nominals_of_continuous_states_changed {
            debug!(time, "nominals of continuous states changed");
        }
        Ok(false)
    }

    /// Enter continuous-time mode.  The indicator vectors are left alone: the
    /// next refresh compares against the last values read during a step, or
    /// against zeros before the first step.
    fn enter_continuous_time(&mut self, inst: &mut F::Instance) -> SimResult<()> {
        check(
            inst.enter_continuous_time_mode(),
            "enter_continuous_time_mode",
            SimError::ContinuousTimeEntry,
        )?;
        self.transition(Mode::ContinuousTime);
        Ok(())
    }

    fn write_sample<S: ResultSink>(
        &self,
        inst: &mut F::Instance,
        work: &mut Workspace,
        sink: &mut S,
    ) -> SimResult<()> {
        read_values(inst, &self.fmu.metadata().variables, &mut work.row)?;
        let row = Row::Sample { time: self.clock.time, values: &work.row };
        sink.write_row(&row).map_err(SimError::OutputWrite)
    }

    fn terminated(&self) -> RunOutcome {
        info!(time = self.clock.time, "model requested termination at t={}", self.clock.time);
        RunOutcome::Terminated { at: self.clock.time }
    }

    fn transition(&mut self, next: Mode) {
        match self.mode {
            Some(current) => debug_assert!(
                current.can_transition_to(next),
                "illegal mode transition {current} -> {next}"
            ),
            None => debug_assert_eq!(next, Mode::Instantiated),
        }
        debug!(from = ?self.mode, to = %next, "mode transition");
        self.mode = Some(next);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Map a call status onto the run's error policy: above `Warning` is fatal,
/// `Warning` is logged and tolerated.
fn check(status: Status, call: &'static str, fail: fn(Status) -> SimError) -> SimResult<()> {
    if status.is_fatal() {
        return Err(fail(status));
    }
    if status == Status::Warning {
        warn!(call, "component returned a warning");
    }
    Ok(())
}

/// Discrete-state update iteration.  Runs until the component no longer asks
/// for another update; returns `true` if it requested termination.  Each
/// settling starts from a fresh record, so flags left by an earlier event do
/// not carry over.
fn settle<I: ModelInstance>(inst: &mut I, info: &mut EventInfo) -> SimResult<bool> {
    *info = EventInfo::settling();
    let mut iterations = 0u32;
    while info.needs_update() {
        check(inst.new_discrete_states(info), "new_discrete_states", SimError::DiscreteUpdate)?;
        iterations += 1;
    }
    debug!(iterations, next_event = ?info.pending_event_time(), "discrete states settled");
    Ok(info.terminate_simulation)
}

/// Read every variable, in metadata order, into `row`.
fn read_values<I: ModelInstance>(
    inst:      &mut I,
    variables: &[ScalarVariable],
    row:       &mut Vec<VariableValue>,
) -> SimResult<()> {
    row.clear();
    for var in variables {
        let refs = [var.value_reference];
        let (status, value) = match var.kind {
            VariableKind::Real => {
                let mut v = [0.0];
                (inst.get_real(&refs, &mut v), VariableValue::Real(v[0]))
            }
            VariableKind::Integer | VariableKind::Enumeration => {
                let mut v = [0];
                (inst.get_integer(&refs, &mut v), VariableValue::Integer(v[0]))
            }
            VariableKind::Boolean => {
                let mut v = [false];
                (inst.get_boolean(&refs, &mut v), VariableValue::Boolean(v[0]))
            }
            VariableKind::String => {
                let mut v = [String::new()];
                let status = inst.get_string(&refs, &mut v);
                let [text] = v;
                (status, VariableValue::String(text))
            }
        };
        if status.is_fatal() {
            return Err(SimError::VariableRead {
                name: var.name.clone(),
                kind: var.kind,
                status,
            });
        }
        row.push(value);
    }
    Ok(())
}
