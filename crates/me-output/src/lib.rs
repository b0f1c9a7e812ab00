//! `me-output`: result-file backend for the model-exchange driver.
//!
//! [`CsvSink`] implements `me_sim::ResultSink` and writes one delimited text
//! file per run:
//!
//! ```text
//! time,h,v
//! 0,1,0
//! 0.1,1,-0.981
//! ```
//!
//! The separator is any single ASCII character.  With a separator other than
//! `,` real values use a decimal comma, so `;`-separated output opens cleanly
//! in spreadsheet tools that expect one.
//!
//! # Usage
//!
//! ```rust,ignore
//! use me_output::CsvSink;
//!
//! let mut sink = CsvSink::new("result.csv", ',')?;
//! sim.run(&mut sink)?;
//! ```

pub mod csv;
pub mod error;


pub use csv::{CsvSink, format_real};
pub use error::{OutputError, OutputResult};
