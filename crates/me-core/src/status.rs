//! Severity reported by every capability-table call.

use std::fmt;

/// Return status of a component call, ordered by severity.
///
/// Anything above [`Status::Warning`] is fatal to a simulation run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    #[default]
    Ok,
    Warning,
    Discard,
    Error,
    Fatal,
    Pending,
}

impl Status {
    /// `true` when the status is more severe than a warning.
    #[inline]
    pub fn is_fatal(self) -> bool {
        self > Status::Warning
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok      => "ok",
            Status::Warning => "warning",
            Status::Discard => "discard",
            Status::Error   => "error",
            Status::Fatal   => "fatal",
            Status::Pending => "pending",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
