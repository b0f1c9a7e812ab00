use me_core::{CoreError, Status};
use me_fmu::{MetadataError, VariableKind};
use thiserror::Error;

use crate::SinkError;

/// Every way a run can fail.
///
/// All variants are fatal: the run stops at the first one, the component is
/// released, and nothing is retried.  A component asking to terminate is not
/// an error; see [`RunOutcome::Terminated`][crate::RunOutcome::Terminated].
#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("invalid model metadata: {0}")]
    Metadata(#[from] MetadataError),

    #[error("this simulation has already been run")]
    AlreadyRun,

    #[error("could not instantiate model")]
    Instantiation,

    #[error("could not initialize model; failed set debug logging ({0})")]
    DebugLogging(Status),

    #[error("out of memory allocating {what} ({len} values)")]
    Allocation { what: &'static str, len: usize },

    #[error("could not open result output: {0}")]
    OutputOpen(#[source] SinkError),

    #[error("could not write result output: {0}")]
    OutputWrite(#[source] SinkError),

    #[error("could not initialize model; failed setup experiment ({0})")]
    ExperimentSetup(Status),

    #[error("could not set time ({0})")]
    TimeSet(Status),

    #[error("could not initialize model; failed enter initialization mode ({0})")]
    InitializationEntry(Status),

    #[error("could not initialize model; failed exit initialization mode ({0})")]
    InitializationExit(Status),

    #[error("could not set a new discrete state ({0})")]
    DiscreteUpdate(Status),

    #[error("could not enter event mode ({0})")]
    EventModeEntry(Status),

    #[error("could not enter continuous-time mode ({0})")]
    ContinuousTimeEntry(Status),

    #[error("could not retrieve states ({0})")]
    StateRetrieval(Status),

    #[error("could not retrieve derivatives ({0})")]
    DerivativeRetrieval(Status),

    #[error("could not set states ({0})")]
    StateWrite(Status),

    #[error("could not retrieve event indicators ({0})")]
    EventIndicatorRetrieval(Status),

    #[error("could not complete integrator step ({0})")]
    IntegratorStep(Status),

    #[error("could not read {kind} variable {name:?} ({status})")]
    VariableRead { name: String, kind: VariableKind, status: Status },
}

pub type SimResult<T> = Result<T, SimError>;
