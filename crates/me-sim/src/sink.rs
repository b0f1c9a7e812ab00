//! Result sink trait: where sampled rows go.

use me_fmu::{ScalarVariable, VariableValue};

/// Boxed error returned by sink backends.
pub type SinkError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type SinkResult<T> = Result<T, SinkError>;

/// One row handed to a [`ResultSink`].
#[derive(Clone, Copy, Debug)]
pub enum Row<'a> {
    /// Column names.  Written exactly once, right after the component first
    /// enters continuous-time mode and before the first sample.
    Header {
        time:      f64,
        variables: &'a [ScalarVariable],
    },
    /// Variable values at `time`, in the same order as the header.
    Sample {
        time:   f64,
        values: &'a [VariableValue],
    },
}

impl Row<'_> {
    pub fn time(&self) -> f64 {
        match *self {
            Row::Header { time, .. } | Row::Sample { time, .. } => time,
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, Row::Header { .. })
    }
}

/// Receives the rows produced by [`Sim::run`][crate::Sim::run].
///
/// The driver guarantees one header before any sample, and samples in
/// strictly increasing time order.
///
/// # Example: row counter
///
/// ```rust,ignore
/// struct Counter(usize);
///
/// impl ResultSink for Counter {
///     fn write_row(&mut self, row: &Row<'_>) -> SinkResult<()> {
///         if !row.is_header() { self.0 += 1; }
///         Ok(())
///     }
/// }
/// ```
pub trait ResultSink {
    /// Called once before the experiment is set up.  Backends that write to a
    /// file create it here; a failure aborts the run.
    fn begin(&mut self) -> SinkResult<()> {
        Ok(())
    }

    fn write_row(&mut self, row: &Row<'_>) -> SinkResult<()>;

    /// Called once on every exit path, including after a fatal error.
    fn finish(&mut self) -> SinkResult<()> {
        Ok(())
    }
}

/// A [`ResultSink`] that discards every row.
pub struct NoopSink;

impl ResultSink for NoopSink {
    fn write_row(&mut self, _row: &Row<'_>) -> SinkResult<()> {
        Ok(())
    }
}
