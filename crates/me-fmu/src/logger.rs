//! Structured logging callback handed to components at instantiation.
//!
//! A component reports `(instance, status, category, message)`; nothing is
//! pre-formatted.  [`TracingLogger`] forwards records to `tracing` with those
//! four values as fields and resolves `#r12#`-style value references in the
//! message into variable names.

use std::borrow::Cow;
use std::sync::Arc;

use me_core::Status;

use crate::{ModelMetadata, ScalarVariable, ValueReference};

/// One message emitted by a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub instance_name: &'a str,
    pub status:        Status,
    pub category:      &'a str,
    pub message:       &'a str,
}

/// Sink for component log messages.
pub trait ComponentLogger: Send + Sync {
    fn log(&self, record: &LogRecord<'_>);
}

/// The logger handle passed to [`Fmu::instantiate`][crate::Fmu::instantiate].
pub type SharedLogger = Arc<dyn ComponentLogger>;

/// A [`ComponentLogger`] that drops everything.
pub struct NoopLogger;

impl ComponentLogger for NoopLogger {
    fn log(&self, _record: &LogRecord<'_>) {}
}

// ── TracingLogger ─────────────────────────────────────────────────────────────

/// Forwards component messages to `tracing`.
///
/// | Status                      | Level   |
/// |-----------------------------|---------|
/// | `Ok`, `Pending`             | `DEBUG` |
/// | `Warning`                   | `WARN`  |
/// | `Discard`, `Error`, `Fatal` | `ERROR` |
pub struct TracingLogger {
    variables: Vec<ScalarVariable>,
}

impl TracingLogger {
    /// Create a logger that resolves references against `metadata`'s variables.
    pub fn new(metadata: &ModelMetadata) -> Self {
        Self { variables: metadata.variables.clone() }
    }
}

impl ComponentLogger for TracingLogger {
    fn log(&self, record: &LogRecord<'_>) {
        let message = expand_references(record.message, &self.variables);
        let instance = record.instance_name;
        let category = record.category;
        let status = record.status.as_str();
        match record.status {
            Status::Ok | Status::Pending => {
                tracing::debug!(instance, category, status, "{message}")
            }
            Status::Warning => tracing::warn!(instance, category, status, "{message}"),
            Status::Discard | Status::Error | Status::Fatal => {
                tracing::error!(instance, category, status, "{message}")
            }
        }
    }
}

// ── Reference expansion ───────────────────────────────────────────────────────

/// Replace `#<t><vr>#` markers with variable names.
///
/// `<t>` is one of `r`, `i`, `b`, `s` (see [`VariableKind::type_code`]) and
/// `<vr>` a decimal value reference.  `##` is an escaped `#`.  Markers that do
/// not resolve to a known variable are copied through unchanged.
///
/// [`VariableKind::type_code`]: crate::VariableKind::type_code
pub fn expand_references<'a>(message: &'a str, variables: &[ScalarVariable]) -> Cow<'a, str> {
    if !message.contains('#') {
        return Cow::Borrowed(message);
    }

    let mut out = String::with_capacity(message.len());
    let mut rest = message;
    while let Some(pos) = rest.find('#') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(after) = tail.strip_prefix('#') {
            out.push('#');
            rest = after;
            continue;
        }

        match parse_reference(tail) {
            Some((code, vr, consumed)) => {
                let found = variables
                    .iter()
                    .find(|v| v.value_reference == vr && v.kind.type_code() == code);
                match found {
                    Some(var) => out.push_str(&var.name),
                    None => out.push_str(&rest[pos..pos + 1 + consumed]),
                }
                rest = &tail[consumed..];
            }
            None => {
                out.push('#');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Parse `<t><digits>#` at the start of `tail`.
///
/// Returns the type code, the reference, and the number of bytes consumed
/// including the closing `#`.
fn parse_reference(tail: &str) -> Option<(char, ValueReference, usize)> {
    let code = tail.chars().next()?;
    if !matches!(code, 'r' | 'i' | 'b' | 's') {
        return None;
    }
    let digits = tail[1..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || tail.as_bytes().get(1 + digits) != Some(&b'#') {
        return None;
    }
    let vr = tail[1..1 + digits].parse().ok()?;
    Some((code, vr, digits + 2))
}
