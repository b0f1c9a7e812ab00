//! CSV result-file backend.

use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use me_fmu::VariableValue;
use me_sim::{ResultSink, Row, SinkResult};
use tracing::debug;

use crate::{OutputError, OutputResult};

/// Writes the header and one row per sample to a single delimited file.
///
/// The file is created (or truncated) by `begin`, not by [`CsvSink::new`], so
/// a run that fails before output starts leaves no file behind.
pub struct CsvSink {
    path:          PathBuf,
    separator:     u8,
    decimal_comma: bool,
    header:        bool,
    writer:        Option<Writer<File>>,
    rows:          u64,
    finished:      bool,
}

impl CsvSink {
    /// Prepare a sink writing to `path` with the given field separator.
    pub fn new(path: impl Into<PathBuf>, separator: char) -> OutputResult<Self> {
        let valid = separator == '\t' || (separator.is_ascii_graphic() && separator != '"');
        if !valid {
            return Err(OutputError::InvalidSeparator(separator));
        }
        Ok(Self {
            path:          path.into(),
            separator:     separator as u8,
            decimal_comma: separator != ',',
            header:        true,
            writer:        None,
            rows:          0,
            finished:      false,
        })
    }

    /// Write the `time,<names...>` header row (default: on).
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sample rows written so far (the header is not counted).
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    fn open(&mut self) -> OutputResult<()> {
        let writer = WriterBuilder::new()
            .delimiter(self.separator)
            .from_path(&self.path)?;
        debug!(path = %self.path.display(), "result file opened");
        self.writer = Some(writer);
        self.rows = 0;
        self.finished = false;
        Ok(())
    }

    fn write(&mut self, row: &Row<'_>) -> OutputResult<()> {
        let decimal_comma = self.decimal_comma;
        let writer = self.writer.as_mut().ok_or(OutputError::NotOpen)?;
        match *row {
            Row::Header { .. } if !self.header => return Ok(()),
            Row::Header { variables, .. } => {
                writer.write_field("time")?;
                for var in variables {
                    writer.write_field(&var.name)?;
                }
            }
            Row::Sample { time, values } => {
                writer.write_field(format_real(time, decimal_comma).as_bytes())?;
                for value in values {
                    writer.write_field(format_value(value, decimal_comma).as_bytes())?;
                }
                self.rows += 1;
            }
        }
        writer.write_record(None::<&[u8]>)?;
        Ok(())
    }

    fn close(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
            debug!(path = %self.path.display(), rows = self.rows, "result file closed");
        }
        Ok(())
    }
}

impl ResultSink for CsvSink {
    fn begin(&mut self) -> SinkResult<()> {
        Ok(self.open()?)
    }

    fn write_row(&mut self, row: &Row<'_>) -> SinkResult<()> {
        Ok(self.write(row)?)
    }

    fn finish(&mut self) -> SinkResult<()> {
        Ok(self.close()?)
    }
}

// ── Formatting ────────────────────────────────────────────────────────────────

/// Shortest round-trip text for `v`, with `,` as the decimal mark when
/// `decimal_comma` is set.
pub fn format_real(v: f64, decimal_comma: bool) -> String {
    let text = v.to_string();
    if decimal_comma {
        text.replace('.', ",")
    } else {
        text
    }
}

fn format_value(value: &VariableValue, decimal_comma: bool) -> Cow<'_, str> {
    match value {
        VariableValue::Real(v) => Cow::Owned(format_real(*v, decimal_comma)),
        VariableValue::Integer(v) => Cow::Owned(v.to_string()),
        VariableValue::Boolean(v) => Cow::Borrowed(if *v { "1" } else { "0" }),
        VariableValue::String(s) => Cow::Borrowed(s),
    }
}
