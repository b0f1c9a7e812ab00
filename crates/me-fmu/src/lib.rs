//! `me-fmu`: the component side of the driver: capability-table traits,
//! model metadata, and the structured logging callback.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`capability`] | `Fmu` (instantiate) and `ModelInstance` (entry points)     |
//! | [`metadata`]   | `ModelMetadata`, `ScalarVariable`, `VariableValue`         |
//! | [`logger`]     | `ComponentLogger`, `LogRecord`, `TracingLogger`            |
//! | [`error`]      | `MetadataError`, `MetadataResult<T>`                       |
//!
//! # Design notes
//!
//! A loaded component is a table of entry points bound at load time.  Here it
//! is a pair of traits: [`Fmu`] produces an owned instance, and every other
//! entry point is a method on [`ModelInstance`].  The driver in `me-sim`
//! depends only on these traits, so a native Rust model, a dynamically
//! loaded library wrapper, and a test double are interchangeable.

pub mod capability;
pub mod error;
pub mod logger;
pub mod metadata;


pub use capability::{Fmu, ModelInstance};
pub use error::{MetadataError, MetadataResult};
pub use logger::{ComponentLogger, LogRecord, NoopLogger, SharedLogger, TracingLogger, expand_references};
pub use metadata::{ModelMetadata, ScalarVariable, ValueReference, VariableKind, VariableValue};
