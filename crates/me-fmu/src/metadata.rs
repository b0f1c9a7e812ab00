//! Read-only facts about a component: identity, dimensions, variables.
//!
//! Parsing these out of a description document is the loader's job; this
//! module only holds the result.

use std::collections::HashSet;
use std::fmt;

use crate::{MetadataError, MetadataResult};

/// Handle the component uses to address one scalar variable.
///
/// References are unique per [`VariableKind`], not globally; aliases may
/// share a reference.
pub type ValueReference = u32;

/// Base type of a scalar variable.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariableKind {
    Real,
    Integer,
    Boolean,
    String,
    /// Read and written through the integer entry points.
    Enumeration,
}

impl VariableKind {
    /// One-letter code used in `#<code><vr>#` log-message references.
    pub fn type_code(self) -> char {
        match self {
            VariableKind::Real                                => 'r',
            VariableKind::Integer | VariableKind::Enumeration => 'i',
            VariableKind::Boolean                             => 'b',
            VariableKind::String                              => 's',
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableKind::Real        => "real",
            VariableKind::Integer     => "integer",
            VariableKind::Boolean     => "boolean",
            VariableKind::String      => "string",
            VariableKind::Enumeration => "enumeration",
        };
        f.write_str(name)
    }
}

/// One named variable exposed by the component.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarVariable {
    pub name:            String,
    pub value_reference: ValueReference,
    pub kind:            VariableKind,
    pub description:     Option<String>,
}

/// A variable value read back from the component for a result row.
#[derive(Clone, Debug, PartialEq)]
pub enum VariableValue {
    Real(f64),
    Integer(i32),
    Boolean(bool),
    String(String),
}

/// Everything the driver needs to know about a component before
/// instantiating it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelMetadata {
    /// Identity string; must match the one compiled into the component.
    pub guid: String,

    /// Default instance name.
    pub model_identifier: String,

    /// Number of continuous states (nx).
    pub num_states: usize,

    /// Number of event indicators (nz).
    pub num_event_indicators: usize,

    /// Variables in result-file column order.
    pub variables: Vec<ScalarVariable>,

    /// Debug-log categories the component understands.
    pub log_categories: Vec<String>,
}

impl ModelMetadata {
    pub fn new(
        guid:                 impl Into<String>,
        model_identifier:     impl Into<String>,
        num_states:           usize,
        num_event_indicators: usize,
    ) -> Self {
        Self {
            guid:             guid.into(),
            model_identifier: model_identifier.into(),
            num_states,
            num_event_indicators,
            variables:        Vec::new(),
            log_categories:   Vec::new(),
        }
    }

    /// Append a variable (builder style).
    pub fn with_variable(mut self, name: impl Into<String>, vr: ValueReference, kind: VariableKind) -> Self {
        self.variables.push(ScalarVariable {
            name:            name.into(),
            value_reference: vr,
            kind,
            description:     None,
        });
        self
    }

    /// Append a debug-log category (builder style).
    pub fn with_log_category(mut self, category: impl Into<String>) -> Self {
        self.log_categories.push(category.into());
        self
    }

    /// Look up a variable by kind and reference.
    ///
    /// Enumerations and integers share the integer reference space.
    pub fn variable_by_ref(&self, type_code: char, vr: ValueReference) -> Option<&ScalarVariable> {
        self.variables
            .iter()
            .find(|v| v.value_reference == vr && v.kind.type_code() == type_code)
    }

    /// Column names of a result row, without the leading time column.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    pub fn validate(&self) -> MetadataResult<()> {
        if self.guid.trim().is_empty() {
            return Err(MetadataError::EmptyGuid);
        }
        if self.model_identifier.trim().is_empty() {
            return Err(MetadataError::EmptyIdentifier);
        }
        let mut seen = HashSet::with_capacity(self.variables.len());
        for var in &self.variables {
            if !seen.insert(var.name.as_str()) {
                return Err(MetadataError::DuplicateName(var.name.clone()));
            }
        }
        Ok(())
    }
}
