//! Assembling records from a line-oriented source.
//!
//! [`SeqReader`] pulls lines from any [`BufRead`] source, classifies them,
//! and groups consecutive fragments sharing a record identifier into one
//! [`MarcRecord`]. A record is emitted exactly when the identifier changes or
//! input ends; the line that revealed the boundary starts the next record.
//!
//! Reading is single-pass and not restartable. Unclassifiable lines are
//! logged and skipped; an I/O error ends the sequence and is returned to the
//! caller.
//!
//! # Examples
//!
//! ```
//! use marcseq::{SchemaRegistry, SeqReader};
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! let data = "\
//! 000000001 LDR   L -----nam^a22-----^a^4500
//! 000000001 001   L 000000001
//! 000000001 24510 L $$aTitle
//! 000000002 LDR   L -----nam^a22-----^a^4500
//! 000000002 24500 L $$aAnother title
//! ";
//! let registry = Arc::new(SchemaRegistry::marc21());
//! let mut reader = SeqReader::new(Cursor::new(data), registry);
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("{}: {:?}", record.record_id(), record.title());
//! }
//! assert_eq!(reader.records_read(), 2);
//! # Ok::<(), marcseq::MarcError>(())
//! ```

use crate::error::{MarcError, Result};
use crate::format::LineFormat;
use crate::line::RawFragment;
use crate::record::MarcRecord;
use crate::record_builder::build_record;
use crate::schema::SchemaRegistry;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Reader assembling records from a line-oriented source.
///
/// The reader owns its source; dropping the reader closes it on every exit
/// path.
#[derive(Debug)]
pub struct SeqReader<R: BufRead> {
    reader: R,
    registry: Arc<SchemaRegistry>,
    format: LineFormat,
    current_id: Option<String>,
    buffer: Vec<RawFragment>,
    line: Vec<u8>,
    lines_read: usize,
    lines_rejected: usize,
    records_read: usize,
    finished: bool,
}

impl SeqReader<BufReader<File>> {
    /// Open a file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn from_path(path: impl AsRef<Path>, registry: Arc<SchemaRegistry>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(SeqReader::new(BufReader::new(file), registry))
    }
}

impl<R: BufRead> SeqReader<R> {
    /// Create a reader using the Aleph sequential line format.
    pub fn new(reader: R, registry: Arc<SchemaRegistry>) -> Self {
        SeqReader {
            reader,
            registry,
            format: LineFormat::alephseq(),
            current_id: None,
            buffer: Vec::new(),
            line: Vec::new(),
            lines_read: 0,
            lines_rejected: 0,
            records_read: 0,
            finished: false,
        }
    }

    /// Use a different line format.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::ConfigError`] if the format is inconsistent.
    pub fn with_format(mut self, format: LineFormat) -> Result<Self> {
        format.validate()?;
        self.format = format;
        Ok(self)
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` once input is exhausted; every later call also
    /// returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::IoError`] if reading the source fails. The
    /// reader is finished afterwards.
    pub fn read_record(&mut self) -> Result<Option<MarcRecord>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                },
            };

            let fragment = match self.format.classify(&line, self.lines_read) {
                Ok(fragment) => fragment,
                Err(e) => {
                    self.lines_rejected += 1;
                    tracing::warn!(error = %e, "skipping line");
                    continue;
                },
            };

            // Every classified line marks record membership, even a local tag.
            let previous = self.current_id.replace(fragment.record_id.clone());
            let completed = match previous {
                Some(previous) if previous != fragment.record_id && !self.buffer.is_empty() => {
                    Some(self.flush(previous))
                },
                _ => None,
            };

            if fragment.has_valid_tag() {
                self.buffer.push(fragment);
            }

            if completed.is_some() {
                return Ok(completed);
            }
        }

        self.finished = true;
        match self.current_id.take() {
            Some(current) if !self.buffer.is_empty() => Ok(Some(self.flush(current))),
            _ => Ok(None),
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Number of lines rejected by the classifier.
    #[must_use]
    pub fn lines_rejected(&self) -> usize {
        self.lines_rejected
    }

    /// Number of records emitted so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Read every remaining record.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error; records read before it are discarded.
    pub fn read_all(&mut self) -> Result<Vec<MarcRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    fn flush(&mut self, record_id: String) -> MarcRecord {
        let fragments = std::mem::take(&mut self.buffer);
        tracing::debug!(record_id = %record_id, fragments = fragments.len(), "assembled record");
        self.records_read += 1;
        build_record(&record_id, fragments, &self.registry)
    }

    /// Next line without its terminator, decoding invalid UTF-8 lossily.
    fn next_line(&mut self) -> Result<Option<String>> {
        self.line.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.line)
            .map_err(MarcError::IoError)?;
        if n == 0 {
            return Ok(None);
        }
        self.lines_read += 1;
        while matches!(self.line.last(), Some(b'\n' | b'\r')) {
            self.line.pop();
        }
        Ok(Some(String::from_utf8_lossy(&self.line).into_owned()))
    }
}

impl<R: BufRead> Iterator for SeqReader<R> {
    type Item = Result<MarcRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

impl<R: BufRead> std::iter::FusedIterator for SeqReader<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};

    fn reader(data: &str) -> SeqReader<Cursor<Vec<u8>>> {
        SeqReader::new(
            Cursor::new(data.as_bytes().to_vec()),
            Arc::new(SchemaRegistry::marc21()),
        )
    }

    #[test]
    fn test_single_record() {
        let mut r = reader(
            "000000001 001   L 000000001\n\
             000000001 24510 L $$aTitle\n",
        );
        let record = r.read_record().unwrap().unwrap();
        assert_eq!(record.record_id(), "000000001");
        assert_eq!(record.control_fields().count(), 1);
        let title = record.data_fields().next().unwrap();
        assert_eq!(title.tag(), "245");
        assert_eq!(title.subfields.len(), 1);
        assert_eq!(title.subfields[0].code, 'a');
        assert_eq!(title.subfields[0].value, "Title");
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn test_boundary_line_starts_next_record() {
        let mut r = reader(
            "000000001 24510 L $$aFirst\n\
             000000002 001   L 000000002\n\
             000000002 24510 L $$aSecond\n",
        );
        let first = r.read_record().unwrap().unwrap();
        assert_eq!(first.record_id(), "000000001");
        assert_eq!(first.fields().len(), 1);

        let second = r.read_record().unwrap().unwrap();
        assert_eq!(second.record_id(), "000000002");
        assert_eq!(second.fields().len(), 2);
        assert_eq!(second.control_number(), Some("000000002"));

        assert!(r.read_record().unwrap().is_none());
        assert!(r.read_record().unwrap().is_none());
        assert_eq!(r.records_read(), 2);
    }

    #[test]
    fn test_rejected_lines_are_skipped() {
        let mut r = reader(
            "000000001 24510 L $$aTitle\n\
             broken\n\
             \n\
             000000001 500   L $$aNote\n",
        );
        let record = r.read_record().unwrap().unwrap();
        assert_eq!(record.data_fields().count(), 2);
        assert_eq!(r.lines_read(), 4);
        assert_eq!(r.lines_rejected(), 2);
    }

    #[test]
    fn test_local_tags_only_yield_no_record() {
        let mut r = reader(
            "000000001 FMT   L BK\n\
             000000001 CAT   L $$aIMPORT\n\
             000000002 24510 L $$aTitle\n",
        );
        let record = r.read_record().unwrap().unwrap();
        assert_eq!(record.record_id(), "000000002");
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn test_local_tag_marks_boundary() {
        let mut r = reader(
            "000000001 24510 L $$aFirst\n\
             000000002 FMT   L BK\n\
             000000002 24510 L $$aSecond\n",
        );
        let first = r.read_record().unwrap().unwrap();
        assert_eq!(first.record_id(), "000000001");
        let second = r.read_record().unwrap().unwrap();
        assert_eq!(second.record_id(), "000000002");
        assert_eq!(second.fields().len(), 1);
    }

    #[test]
    fn test_missing_leader_still_emitted() {
        let mut r = reader("000000001 24510 L $$aTitle\n");
        let record = r.read_record().unwrap().unwrap();
        assert!(record.leader().is_none());
        assert_eq!(record.diagnostics().len(), 1);
    }

    #[test]
    fn test_crlf_and_no_trailing_newline() {
        let mut r = reader("000000001 001   L 1\r\n000000001 24510 L $$aTitle");
        let record = r.read_record().unwrap().unwrap();
        assert_eq!(record.control_number(), Some("1"));
        assert_eq!(record.title(), Some("Title"));
    }

    #[test]
    fn test_empty_input() {
        let mut r = reader("");
        assert!(r.read_record().unwrap().is_none());
        assert_eq!(r.lines_read(), 0);
    }

    #[test]
    fn test_iterator() {
        let r = reader(
            "000000001 24510 L $$aA\n\
             000000002 24510 L $$aB\n\
             000000003 24510 L $$aC\n",
        );
        let ids: Vec<String> = r
            .map(|res| res.unwrap().record_id().to_string())
            .collect();
        assert_eq!(ids, vec!["000000001", "000000002", "000000003"]);
    }

    struct FailingSource {
        data: Cursor<Vec<u8>>,
        fail_after: usize,
    }

    impl Read for FailingSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.position() as usize >= self.fail_after {
                return Err(io::Error::new(io::ErrorKind::Other, "disk gone"));
            }
            let limit = (self.fail_after - self.data.position() as usize).min(buf.len());
            self.data.read(&mut buf[..limit])
        }
    }

    #[test]
    fn test_io_error_is_fatal() {
        let data = b"000000001 24510 L $$aA\n000000002 24510 L $$aB\n".to_vec();
        let source = FailingSource {
            data: Cursor::new(data),
            fail_after: 30,
        };
        let mut r = SeqReader::new(
            io::BufReader::with_capacity(8, source),
            Arc::new(SchemaRegistry::marc21()),
        );
        assert!(matches!(r.read_record(), Err(MarcError::IoError(_))));
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn test_with_format_validates() {
        let bad = LineFormat {
            id_width: 0,
            ..LineFormat::alephseq()
        };
        assert!(reader("").with_format(bad).is_err());
    }
}
