//! Streaming record sinks.
//!
//! Records reach the sink one at a time as they are accepted so that
//! partial results survive an interrupted run.

use std::io::Write;

use super::error::SinkError;
use super::model::CommentRecord;

/// Destination for the records of one repository.
pub trait RecordSink {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when serialisation or the write fails.
    fn write_record(&mut self, record: &CommentRecord) -> Result<(), SinkError>;

    /// Completes the output. Further calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the trailing write or flush fails.
    fn finish(&mut self) -> Result<(), SinkError>;
}

/// JSON Lines output, flushed after every record.
#[derive(Debug)]
pub struct JsonlSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonlSink<W> {
    /// Wraps `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonlSink<W> {
    fn write_record(&mut self, record: &CommentRecord) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, record).map_err(|e| SinkError::serialize(&e))?;
        writeln!(self.writer).map_err(|e| SinkError::write(&e))?;
        self.writer.flush().map_err(|e| SinkError::write(&e))
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(|e| SinkError::write(&e))
    }
}

/// A single pretty-printed JSON array, written incrementally.
///
/// The opening bracket goes out with the first record and the closing one
/// on [`RecordSink::finish`]; an empty run produces `[]`.
#[derive(Debug)]
pub struct JsonArraySink<W: Write> {
    writer: W,
    written: usize,
    finished: bool,
}

impl<W: Write> JsonArraySink<W> {
    /// Wraps `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            finished: false,
        }
    }

    /// Returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonArraySink<W> {
    fn write_record(&mut self, record: &CommentRecord) -> Result<(), SinkError> {
        let separator = if self.written == 0 { "[\n" } else { ",\n" };
        let rendered = serde_json::to_string_pretty(record).map_err(|e| SinkError::serialize(&e))?;
        write!(self.writer, "{separator}{rendered}").map_err(|e| SinkError::write(&e))?;
        self.written = self.written.saturating_add(1);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if self.finished {
            return Ok(());
        }
        let closing = if self.written == 0 { "[]\n" } else { "\n]\n" };
        self.writer
            .write_all(closing.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|e| SinkError::write(&e))?;
        self.finished = true;
        Ok(())
    }
}
