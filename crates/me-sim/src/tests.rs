//! Integration tests for me-sim.

use std::cell::RefCell;
use std::rc::Rc;

use me_core::{CompletedStep, EventInfo, SimConfig, Status};
use me_fmu::{
    Fmu, ModelInstance, ModelMetadata, NoopLogger, SharedLogger, ValueReference, VariableKind,
    VariableValue,
};

use crate::{ResultSink, Row, SimBuilder, SinkResult};

// ── Test double ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Call {
    Instantiate,
    SetDebugLogging,
    SetupExperiment,
    EnterInit,
    ExitInit,
    EnterEvent,
    NewDiscreteStates,
    EnterContinuous,
    SetTime,
    GetStates,
    SetStates,
    GetDerivatives,
    GetIndicators,
    CompletedStep,
    GetReal,
    GetInteger,
    Terminate,
    FreeInstance,
}

type Rhs = fn(t: f64, x: &[f64], out: &mut [f64]);

/// Behaviour of the scripted component.
#[derive(Clone)]
struct Script {
    nx:                 usize,
    nz:                 usize,
    x0:                 Vec<f64>,
    derivatives:        Rhs,
    indicators:         Rhs,
    /// Announced one at a time: the first entry after the current time.
    time_events:        Vec<f64>,
    /// Calls per discrete-state settling before it converges.
    settle_iterations:  u32,
    /// Event times at which the update reports changed state values.  The
    /// flag is never cleared by the component itself.
    changes_states_at:  Vec<f64>,
    /// 1-based `completed_integrator_step` calls that report a step event.
    step_events:        Vec<usize>,
    /// 1-based `completed_integrator_step` call that requests termination.
    terminate_at_step:  Option<usize>,
    terminate_on_init:  bool,
    terminate_on_event: bool,
    refuse:             bool,
    fail:               Option<(Call, Status)>,
}

fn unit_slope(_t: f64, _x: &[f64], dx: &mut [f64]) {
    dx.iter_mut().for_each(|d| *d = 1.0);
}

fn no_indicators(_t: f64, _x: &[f64], _z: &mut [f64]) {}

impl Default for Script {
    fn default() -> Self {
        Self {
            nx:                 1,
            nz:                 0,
            x0:                 vec![0.0],
            derivatives:        unit_slope,
            indicators:         no_indicators,
            time_events:        vec![],
            settle_iterations:  1,
            changes_states_at:  vec![],
            step_events:        vec![],
            terminate_at_step:  None,
            terminate_on_init:  false,
            terminate_on_event: false,
            refuse:             false,
            fail:               None,
        }
    }
}

#[derive(Default)]
struct Journal {
    calls: Vec<Call>,
    times: Vec<f64>,
}

type SharedJournal = Rc<RefCell<Journal>>;

struct ScriptedFmu {
    metadata: ModelMetadata,
    script:   Script,
    journal:  SharedJournal,
}

impl ScriptedFmu {
    fn new(script: Script) -> Self {
        let metadata = ModelMetadata::new("{scripted}", "scripted", script.nx, script.nz)
            .with_variable("x", 0, VariableKind::Real)
            .with_variable("steps", 0, VariableKind::Integer)
            .with_log_category("logAll");
        Self { metadata, script, journal: SharedJournal::default() }
    }

    fn journal(&self) -> SharedJournal {
        Rc::clone(&self.journal)
    }
}

struct ScriptedInstance {
    script:    Script,
    journal:   SharedJournal,
    time:      f64,
    x:         Vec<f64>,
    completed: usize,
    remaining: Option<u32>,
    in_init:   bool,
}

impl ScriptedInstance {
    fn call(&mut self, call: Call) -> Status {
        self.journal.borrow_mut().calls.push(call);
        match self.script.fail {
            Some((failing, status)) if failing == call => status,
            _ => Status::Ok,
        }
    }
}

impl Fmu for ScriptedFmu {
    type Instance = ScriptedInstance;

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn instantiate(
        &self,
        _instance_name:     &str,
        guid:               &str,
        _resource_location: &str,
        _logger:            SharedLogger,
        _visible:           bool,
        _logging_on:        bool,
    ) -> Option<ScriptedInstance> {
        self.journal.borrow_mut().calls.push(Call::Instantiate);
        if self.script.refuse || guid != self.metadata.guid {
            return None;
        }
        Some(ScriptedInstance {
            script:    self.script.clone(),
            journal:   Rc::clone(&self.journal),
            time:      0.0,
            x:         self.script.x0.clone(),
            completed: 0,
            remaining: None,
            in_init:   true,
        })
    }
}

impl ModelInstance for ScriptedInstance {
    fn set_debug_logging(&mut self, _on: bool, _categories: &[String]) -> Status {
        self.call(Call::SetDebugLogging)
    }

    fn setup_experiment(&mut self, _tol: Option<f64>, start: f64, _stop: Option<f64>) -> Status {
        self.time = start;
        self.call(Call::SetupExperiment)
    }

    fn enter_initialization_mode(&mut self) -> Status {
        self.call(Call::EnterInit)
    }

    fn exit_initialization_mode(&mut self) -> Status {
        self.call(Call::ExitInit)
    }

    fn enter_event_mode(&mut self) -> Status {
        self.call(Call::EnterEvent)
    }

    fn new_discrete_states(&mut self, info: &mut EventInfo) -> Status {
        let status = self.call(Call::NewDiscreteStates);
        let remaining = self.remaining.get_or_insert(self.script.settle_iterations);
        *remaining = remaining.saturating_sub(1);
        info.new_discrete_states_needed = *remaining > 0;
        if !info.new_discrete_states_needed {
            self.remaining = None;
        }

        let next = self.script.time_events.iter().copied().find(|&t| t > self.time);
        info.next_event_time_defined = next.is_some();
        info.next_event_time = next.unwrap_or(0.0);
        if self.script.changes_states_at.contains(&self.time) {
            info.values_of_continuous_states_changed = true;
        }
        info.terminate_simulation = if self.in_init {
            self.script.terminate_on_init
        } else {
            self.script.terminate_on_event
        };
        status
    }

    fn enter_continuous_time_mode(&mut self) -> Status {
        self.in_init = false;
        self.call(Call::EnterContinuous)
    }

    fn set_time(&mut self, time: f64) -> Status {
        self.journal.borrow_mut().times.push(time);
        self.time = time;
        self.call(Call::SetTime)
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Status {
        assert_eq!(states.len(), self.script.nx);
        states.copy_from_slice(&self.x);
        self.call(Call::GetStates)
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> Status {
        assert_eq!(states.len(), self.script.nx);
        self.x.copy_from_slice(states);
        self.call(Call::SetStates)
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> Status {
        assert_eq!(derivatives.len(), self.script.nx);
        (self.script.derivatives)(self.time, &self.x, derivatives);
        self.call(Call::GetDerivatives)
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status {
        assert_eq!(indicators.len(), self.script.nz);
        (self.script.indicators)(self.time, &self.x, indicators);
        self.call(Call::GetIndicators)
    }

    fn completed_integrator_step(&mut self, _no_prior: bool, result: &mut CompletedStep) -> Status {
        self.completed += 1;
        result.enter_event_mode = self.script.step_events.contains(&self.completed);
        result.terminate_simulation = self.script.terminate_at_step == Some(self.completed);
        self.call(Call::CompletedStep)
    }

    fn get_real(&mut self, refs: &[ValueReference], values: &mut [f64]) -> Status {
        for (vr, v) in refs.iter().zip(values.iter_mut()) {
            *v = self.x.get(*vr as usize).copied().unwrap_or(0.0);
        }
        self.call(Call::GetReal)
    }

    fn get_integer(&mut self, _refs: &[ValueReference], values: &mut [i32]) -> Status {
        values.iter_mut().for_each(|v| *v = self.completed as i32);
        self.call(Call::GetInteger)
    }

    fn get_boolean(&mut self, _refs: &[ValueReference], _values: &mut [bool]) -> Status {
        Status::Ok
    }

    fn get_string(&mut self, _refs: &[ValueReference], _values: &mut [String]) -> Status {
        Status::Ok
    }

    fn terminate(&mut self) -> Status {
        self.call(Call::Terminate)
    }

    fn free_instance(mut self) {
        self.call(Call::FreeInstance);
    }
}

// ── Recording sink ────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSink {
    began:      usize,
    finished:   usize,
    headers:    Vec<Vec<String>>,
    rows:       Vec<(f64, Vec<VariableValue>)>,
    fail_begin: bool,
}

impl RecordingSink {
    fn times(&self) -> Vec<f64> {
        self.rows.iter().map(|(t, _)| *t).collect()
    }

    fn last_x(&self) -> f64 {
        match self.rows.last() {
            Some((_, values)) => match values[0] {
                VariableValue::Real(x) => x,
                ref other => panic!("expected real, got {other:?}"),
            },
            None => panic!("no rows recorded"),
        }
    }
}

impl ResultSink for RecordingSink {
    fn begin(&mut self) -> SinkResult<()> {
        self.began += 1;
        if self.fail_begin {
            return Err("disk full".into());
        }
        Ok(())
    }

    fn write_row(&mut self, row: &Row<'_>) -> SinkResult<()> {
        match *row {
            Row::Header { variables, .. } => {
                assert!(self.rows.is_empty(), "header after data");
                self.headers.push(variables.iter().map(|v| v.name.clone()).collect());
            }
            Row::Sample { time, values } => {
                assert_eq!(self.headers.len(), 1, "sample before header");
                if let Some((last, _)) = self.rows.last() {
                    assert!(time > *last, "rows out of order: {last} then {time}");
                }
                self.rows.push((time, values.to_vec()));
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> SinkResult<()> {
        self.finished += 1;
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn config(end_time: f64, step_size: f64) -> SimConfig {
    SimConfig { end_time, step_size, ..SimConfig::default() }
}

fn build(script: Script, cfg: SimConfig) -> (crate::Sim<ScriptedFmu>, SharedJournal) {
    let fmu = ScriptedFmu::new(script);
    let journal = fmu.journal();
    let sim = SimBuilder::new(cfg, fmu)
        .logger(std::sync::Arc::new(NoopLogger))
        .build()
        .unwrap();
    (sim, journal)
}

fn count(journal: &SharedJournal, call: Call) -> usize {
    journal.borrow().calls.iter().filter(|&&c| c == call).count()
}

// ── Protocol order ────────────────────────────────────────────────────────────

#[cfg(test)]
mod protocol_tests {
    use super::*;
    use me_core::Mode;

    #[test]
    fn two_step_run_follows_call_order() {
        let (mut sim, journal) = build(Script::default(), config(0.2, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();

        let step = [
            Call::GetStates,
            Call::GetDerivatives,
            Call::SetTime,
            Call::SetStates,
            Call::GetIndicators,
            Call::CompletedStep,
            Call::GetReal,
            Call::GetInteger,
        ];
        let mut expected = vec![
            Call::Instantiate,
            Call::SetupExperiment,
            Call::SetTime,
            Call::EnterInit,
            Call::ExitInit,
            Call::NewDiscreteStates,
            Call::EnterContinuous,
            Call::GetReal,
            Call::GetInteger,
        ];
        expected.extend(step);
        expected.extend(step);
        expected.extend([Call::Terminate, Call::FreeInstance]);
        assert_eq!(journal.borrow().calls, expected);
        assert_eq!(sim.mode(), Some(Mode::Terminated));
    }

    #[test]
    fn debug_logging_only_with_categories() {
        let (mut sim, journal) = build(Script::default(), config(0.1, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();
        assert_eq!(count(&journal, Call::SetDebugLogging), 0);

        let cfg = SimConfig { log_categories: vec!["logAll".into()], ..config(0.1, 0.1) };
        let (mut sim, journal) = build(Script::default(), cfg);
        sim.run(&mut RecordingSink::default()).unwrap();
        assert_eq!(journal.borrow().calls[..2], [Call::Instantiate, Call::SetDebugLogging]);
    }

    #[test]
    fn settling_repeats_until_converged() {
        let script = Script { settle_iterations: 3, ..Script::default() };
        let (mut sim, journal) = build(script, config(0.1, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();
        assert_eq!(count(&journal, Call::NewDiscreteStates), 3);
    }

    #[test]
    fn indicators_read_once_per_step_only() {
        fn rising(_t: f64, x: &[f64], z: &mut [f64]) {
            z[0] = x[0] - 0.05;
        }
        let script = Script { nz: 1, indicators: rising, time_events: vec![0.5], ..Script::default() };
        let (mut sim, journal) = build(script, config(1.0, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();
        assert_eq!(count(&journal, Call::GetIndicators), sim.summary().steps as usize);
    }

    #[test]
    fn first_step_compares_against_zeros() {
        // Negative at the start and positive after one step, but the value at
        // the start is never read, so no crossing is seen.
        fn rising(_t: f64, x: &[f64], z: &mut [f64]) {
            z[0] = x[0] - 0.05;
        }
        let script = Script { nz: 1, indicators: rising, ..Script::default() };
        let (mut sim, journal) = build(script, config(1.0, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();
        assert_eq!(sim.summary().events.state_events, 0);
        assert_eq!(count(&journal, Call::GetIndicators), 10);
    }

    #[test]
    fn step_after_event_compares_against_pre_event_values() {
        // The time event at 0.3 must not reset the indicator history: the
        // crossing between 0.3 and 0.4 is still found against the value read
        // at the end of the step that triggered the event.
        fn crossing(_t: f64, x: &[f64], z: &mut [f64]) {
            z[0] = x[0] - 0.35;
        }
        let script = Script { nz: 1, indicators: crossing, time_events: vec![0.3], ..Script::default() };
        let (mut sim, _) = build(script, config(1.0, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();
        assert_eq!(sim.summary().events.state_events, 1);
        assert_eq!(sim.summary().events.time_events, 1);
    }

    #[test]
    fn settling_starts_from_fresh_event_info() {
        let script = Script {
            time_events:       vec![0.25, 0.7],
            changes_states_at: vec![0.25],
            ..Script::default()
        };
        let (mut sim, _) = build(script, config(1.0, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();
        assert_eq!(sim.summary().events.time_events, 2);
        assert!(!sim.event_info().values_of_continuous_states_changed);
    }

    #[test]
    fn clock_never_passes_end_time() {
        let (mut sim, journal) = build(Script::default(), config(0.95, 0.1));
        let mut sink = RecordingSink::default();
        sim.run(&mut sink).unwrap();
        assert!(journal.borrow().times.iter().all(|&t| t <= 0.95));
        assert_eq!(sink.times().last().copied(), Some(0.95));
        assert_eq!(sim.clock.time, 0.95);
    }

    #[test]
    fn second_run_rejected() {
        let (mut sim, journal) = build(Script::default(), config(0.1, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();
        let err = sim.run(&mut RecordingSink::default()).unwrap_err();
        assert!(matches!(err, crate::SimError::AlreadyRun));
        assert_eq!(count(&journal, Call::Instantiate), 1);
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::RunOutcome;

    #[test]
    fn unit_slope_reaches_one_in_ten_steps() {
        let (mut sim, _) = build(Script::default(), config(1.0, 0.1));
        let mut sink = RecordingSink::default();
        let outcome = sim.run(&mut sink).unwrap();

        assert_eq!(outcome, RunOutcome::Completed);
        let summary = sim.summary();
        assert_eq!(summary.steps, 10);
        assert_eq!(summary.events, crate::EventCounts::default());
        assert_eq!(sink.headers.len(), 1);
        assert_eq!(sink.rows.len(), 11);
        assert_eq!(sink.times().last().copied(), Some(1.0));
        assert_relative_eq!(sink.last_x(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn time_event_clamps_step_and_adds_row() {
        let script = Script { time_events: vec![0.55], ..Script::default() };
        let (mut sim, journal) = build(script, config(1.0, 0.1));
        let mut sink = RecordingSink::default();
        sim.run(&mut sink).unwrap();

        assert_eq!(sink.rows.len(), 12);
        assert!(sink.times().contains(&0.55));
        assert_eq!(sim.summary().events.time_events, 1);
        assert_eq!(sim.summary().steps, 11);
        assert_eq!(count(&journal, Call::EnterEvent), 1);
        assert_relative_eq!(sink.last_x(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn state_event_seen_at_end_of_step() {
        fn crossing(_t: f64, x: &[f64], z: &mut [f64]) {
            z[0] = x[0] - 0.35;
        }
        let script = Script { nz: 1, indicators: crossing, ..Script::default() };
        let (mut sim, journal) = build(script, config(1.0, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();

        assert_eq!(sim.summary().events.state_events, 1);
        let journal = journal.borrow();
        let calls = &journal.calls;
        let event_at = calls.iter().position(|&c| c == Call::EnterEvent).unwrap();
        let completed_before = calls[..event_at].iter().filter(|&&c| c == Call::CompletedStep).count();
        // Root lies in (0.3, 0.4); the event is handled after the 4th step.
        assert_eq!(completed_before, 4);
    }

    #[test]
    fn indicator_touching_zero_is_not_an_event() {
        fn via_zero(t: f64, _x: &[f64], z: &mut [f64]) {
            z[0] = if t < 0.25 { -1.0 } else if t < 0.35 { 0.0 } else { 1.0 };
        }
        let script = Script { nz: 1, indicators: via_zero, ..Script::default() };
        let (mut sim, _) = build(script, config(1.0, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();
        assert_eq!(sim.summary().events.state_events, 0);
    }

    #[test]
    fn step_event_counted() {
        let script = Script { step_events: vec![2], ..Script::default() };
        let (mut sim, journal) = build(script, config(0.5, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();
        assert_eq!(sim.summary().events.step_events, 1);
        // Initial settle plus one event settle.
        assert_eq!(count(&journal, Call::NewDiscreteStates), 2);
        assert_eq!(count(&journal, Call::EnterContinuous), 2);
    }

    #[test]
    fn identical_runs_are_deterministic() {
        let script = Script {
            time_events: vec![0.25, 0.7],
            step_events: vec![3],
            ..Script::default()
        };
        let mut results = Vec::new();
        for _ in 0..2 {
            let (mut sim, _) = build(script.clone(), config(1.0, 0.1));
            let mut sink = RecordingSink::default();
            sim.run(&mut sink).unwrap();
            results.push((sink.rows, sim.summary().events));
        }
        assert_eq!(results[0], results[1]);
    }
}

// ── Termination ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod termination_tests {
    use super::*;
    use crate::RunOutcome;

    #[test]
    fn terminate_from_completed_step() {
        let script = Script { terminate_at_step: Some(3), ..Script::default() };
        let (mut sim, journal) = build(script, config(1.0, 0.1));
        let mut sink = RecordingSink::default();
        let outcome = sim.run(&mut sink).unwrap();

        let RunOutcome::Terminated { at } = outcome else {
            panic!("expected termination, got {outcome:?}");
        };
        assert!((at - 0.3).abs() < 1e-12);
        assert_eq!(sink.rows.len(), 3);
        assert_eq!(sim.summary().steps, 2);
        assert!(!sim.summary().aborted);
        assert_eq!(count(&journal, Call::Terminate), 1);
        assert_eq!(count(&journal, Call::FreeInstance), 1);
    }

    #[test]
    fn terminate_while_initializing_skips_continuous_time() {
        let script = Script { terminate_on_init: true, ..Script::default() };
        let (mut sim, journal) = build(script, config(1.0, 0.1));
        let mut sink = RecordingSink::default();
        let outcome = sim.run(&mut sink).unwrap();

        assert_eq!(outcome, RunOutcome::Terminated { at: 0.0 });
        assert!(sink.headers.is_empty());
        assert!(sink.rows.is_empty());
        assert_eq!(sink.finished, 1);
        assert_eq!(count(&journal, Call::EnterContinuous), 0);
        assert_eq!(count(&journal, Call::FreeInstance), 1);
    }

    #[test]
    fn terminate_while_handling_event() {
        let script = Script {
            time_events:        vec![0.25],
            terminate_on_event: true,
            ..Script::default()
        };
        let (mut sim, _) = build(script, config(1.0, 0.1));
        let mut sink = RecordingSink::default();
        let outcome = sim.run(&mut sink).unwrap();

        assert_eq!(outcome, RunOutcome::Terminated { at: 0.25 });
        assert_eq!(sim.summary().events.time_events, 1);
        // Start sample plus the 0.1 and 0.2 steps; the event step is not written.
        assert_eq!(sink.rows.len(), 3);
    }
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod failure_tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::SimError;

    #[test]
    fn refused_instantiation() {
        let script = Script { refuse: true, ..Script::default() };
        let (mut sim, journal) = build(script, config(1.0, 0.1));
        let mut sink = RecordingSink::default();
        let err = sim.run(&mut sink).unwrap_err();

        assert!(matches!(err, SimError::Instantiation));
        assert_eq!(sink.began, 0);
        assert_eq!(count(&journal, Call::Terminate), 0);
        assert_eq!(count(&journal, Call::FreeInstance), 0);
        assert!(sim.summary().aborted);
    }

    #[test]
    fn derivative_error_aborts_and_releases() {
        let script = Script { fail: Some((Call::GetDerivatives, Status::Error)), ..Script::default() };
        let (mut sim, journal) = build(script, config(1.0, 0.1));
        let mut sink = RecordingSink::default();
        let err = sim.run(&mut sink).unwrap_err();

        assert!(matches!(err, SimError::DerivativeRetrieval(Status::Error)));
        assert_eq!(count(&journal, Call::Terminate), 1);
        assert_eq!(count(&journal, Call::FreeInstance), 1);
        assert_eq!(sink.finished, 1);
        assert_eq!(sink.rows.len(), 1);
        assert!(sim.summary().aborted);
        assert!(sim.summary().to_string().contains("aborted at t=0"));
    }

    #[test]
    fn panicking_sink_still_releases_instance() {
        struct Exploding;

        impl ResultSink for Exploding {
            fn write_row(&mut self, row: &Row<'_>) -> SinkResult<()> {
                if let Row::Sample { time, .. } = *row {
                    if time > 0.25 {
                        panic!("sink exploded at t={time}");
                    }
                }
                Ok(())
            }
        }

        let (mut sim, journal) = build(Script::default(), config(1.0, 0.1));
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sim.run(&mut Exploding)));

        assert!(outcome.is_err());
        assert_eq!(count(&journal, Call::Terminate), 1);
        assert_eq!(count(&journal, Call::FreeInstance), 1);
        assert_eq!(journal.borrow().calls.last().copied(), Some(Call::FreeInstance));
    }

    #[test]
    fn each_phase_maps_to_its_error() {
        let cases: [(Call, fn(&SimError) -> bool); 8] = [
            (Call::SetupExperiment, |e| matches!(e, SimError::ExperimentSetup(_))),
            (Call::SetTime,         |e| matches!(e, SimError::TimeSet(_))),
            (Call::EnterInit,       |e| matches!(e, SimError::InitializationEntry(_))),
            (Call::ExitInit,        |e| matches!(e, SimError::InitializationExit(_))),
            (Call::NewDiscreteStates, |e| matches!(e, SimError::DiscreteUpdate(_))),
            (Call::GetStates,       |e| matches!(e, SimError::StateRetrieval(_))),
            (Call::SetStates,       |e| matches!(e, SimError::StateWrite(_))),
            (Call::CompletedStep,   |e| matches!(e, SimError::IntegratorStep(_))),
        ];
        for (call, is_expected) in cases {
            let script = Script { fail: Some((call, Status::Fatal)), ..Script::default() };
            let (mut sim, journal) = build(script, config(1.0, 0.1));
            let err = sim.run(&mut RecordingSink::default()).unwrap_err();
            assert!(is_expected(&err), "{call:?} produced {err:?}");
            assert_eq!(count(&journal, Call::FreeInstance), 1, "{call:?} leaked the instance");
        }
    }

    #[test]
    fn indicator_failure_reported() {
        let script = Script {
            nz:   1,
            fail: Some((Call::GetIndicators, Status::Discard)),
            ..Script::default()
        };
        let (mut sim, _) = build(script, config(1.0, 0.1));
        let err = sim.run(&mut RecordingSink::default()).unwrap_err();
        assert!(matches!(err, SimError::EventIndicatorRetrieval(Status::Discard)));
    }

    #[test]
    fn variable_read_failure_names_variable() {
        let script = Script { fail: Some((Call::GetReal, Status::Error)), ..Script::default() };
        let (mut sim, _) = build(script, config(1.0, 0.1));
        let err = sim.run(&mut RecordingSink::default()).unwrap_err();
        assert!(matches!(err, SimError::VariableRead { ref name, .. } if name == "x"));
    }

    #[test]
    fn sink_open_failure() {
        let (mut sim, journal) = build(Script::default(), config(1.0, 0.1));
        let mut sink = RecordingSink { fail_begin: true, ..RecordingSink::default() };
        let err = sim.run(&mut sink).unwrap_err();
        assert!(matches!(err, SimError::OutputOpen(_)));
        assert_eq!(count(&journal, Call::SetupExperiment), 0);
        assert_eq!(count(&journal, Call::FreeInstance), 1);
    }

    #[test]
    #[traced_test]
    fn warnings_are_tolerated() {
        let script = Script { fail: Some((Call::SetTime, Status::Warning)), ..Script::default() };
        let (mut sim, _) = build(script, config(0.3, 0.1));
        sim.run(&mut RecordingSink::default()).unwrap();
        assert_eq!(sim.summary().steps, 3);
        assert!(logs_contain("component returned a warning"));
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;
    use crate::SimError;

    #[test]
    fn invalid_config_rejected() {
        let fmu = ScriptedFmu::new(Script::default());
        let result = SimBuilder::new(config(1.0, -0.1), fmu).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn invalid_metadata_rejected() {
        let mut fmu = ScriptedFmu::new(Script::default());
        fmu.metadata.guid.clear();
        let result = SimBuilder::new(config(1.0, 0.1), fmu).build();
        assert!(matches!(result, Err(SimError::Metadata(_))));
    }

    #[test]
    fn instance_name_defaults_to_identifier() {
        let sim = SimBuilder::new(config(1.0, 0.1), ScriptedFmu::new(Script::default()))
            .build()
            .unwrap();
        assert_eq!(sim.instance_name(), "scripted");

        let sim = SimBuilder::new(config(1.0, 0.1), ScriptedFmu::new(Script::default()))
            .instance_name("inst1")
            .build()
            .unwrap();
        assert_eq!(sim.instance_name(), "inst1");
    }
}

// ── Detector, integrator, summary ─────────────────────────────────────────────

#[cfg(test)]
mod detector_tests {
    use crate::{Direction, EventDetector, has_state_event};

    #[test]
    fn strict_sign_change_detected() {
        assert!(has_state_event(&[-1.0], &[1.0]));
        assert!(has_state_event(&[2.0, 1.0], &[2.0, -0.5]));
    }

    #[test]
    fn zero_on_either_side_is_not_a_crossing() {
        assert!(!has_state_event(&[0.0], &[1.0]));
        assert!(!has_state_event(&[-1.0], &[0.0]));
    }

    #[test]
    fn no_indicators_no_events() {
        assert!(!has_state_event(&[], &[]));
    }

    #[test]
    fn refresh_snapshots_previous_first() {
        let mut d = EventDetector::new(vec![0.0; 2], vec![0.0; 2]);
        let first = d
            .refresh(|z| -> Result<(), ()> {
                z.copy_from_slice(&[1.0, -1.0]);
                Ok(())
            })
            .unwrap();
        assert!(!first, "zeroed history never crosses");
        let event = d
            .refresh(|z| -> Result<(), ()> {
                z.copy_from_slice(&[-2.0, -1.0]);
                Ok(())
            })
            .unwrap();
        assert!(event);
        assert_eq!(d.previous(), [1.0, -1.0]);
        assert_eq!(d.current(), [-2.0, -1.0]);

        let crossings: Vec<_> = d.crossings().collect();
        assert_eq!(crossings.len(), 1);
        assert_eq!(crossings[0].index, 0);
        assert_eq!(crossings[0].direction, Direction::Falling);
    }

    #[test]
    fn counts_accumulate() {
        let mut d = EventDetector::new(vec![], vec![]);
        d.record(true, false, true);
        d.record(true, true, false);
        let c = d.counts();
        assert_eq!((c.time_events, c.state_events, c.step_events), (2, 1, 1));
    }
}

#[cfg(test)]
mod integrator_tests {
    use approx::assert_relative_eq;

    use crate::forward_euler;

    #[test]
    fn constant_derivative_step() {
        let mut x = [1.0];
        forward_euler(&mut x, &[2.0], 0.1);
        assert_relative_eq!(x[0], 1.2, epsilon = 1e-12);
    }

    #[test]
    fn components_independent() {
        let mut x = [0.0, 10.0];
        forward_euler(&mut x, &[1.0, -4.0], 0.5);
        assert_eq!(x, [0.5, 8.0]);
    }
}

#[cfg(test)]
mod summary_tests {
    use crate::{EventCounts, RunOutcome, RunSummary};

    #[test]
    fn display_matches_report_layout() {
        let summary = RunSummary {
            start_time: 0.0,
            end_time:   1.0,
            final_time: 1.0,
            steps:      10,
            step_size:  0.1,
            events:     EventCounts { time_events: 1, state_events: 2, step_events: 0 },
            outcome:    Some(RunOutcome::Completed),
            aborted:    false,
        };
        let text = summary.to_string();
        assert!(text.starts_with("Simulation from 0 to 1 terminated successful"));
        assert!(text.contains("  steps ............ 10"));
        assert!(text.contains("  fixed step size .. 0.1"));
        assert!(text.contains("  state events ..... 2"));
    }
}
