//! Parallel extraction and validation over assembled records.
//!
//! Assembly is inherently sequential: a record boundary is only known once
//! the next identifier appears. Once records exist they are independent, so
//! these helpers fan the per-record work out over Rayon's thread pool. The
//! shared [`SchemaRegistry`](crate::schema::SchemaRegistry) is immutable and
//! needs no locking.
//!
//! Output order always matches input order.
//!
//! # Examples
//!
//! ```
//! use marcseq::batch::{extract_batch, validate_batch};
//! use marcseq::{KeyPolicy, SchemaRegistry, SchemaVersion, SeqReader, Validator};
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! let data = "\
//! 000000001 24510 L $$aFirst
//! 000000002 24510 L $$aSecond
//! ";
//! let registry = Arc::new(SchemaRegistry::marc21());
//! let records = SeqReader::new(Cursor::new(data), Arc::clone(&registry)).read_all()?;
//!
//! let maps = extract_batch(&records, KeyPolicy::Raw);
//! assert_eq!(maps[1]["245a"], vec!["Second"]);
//!
//! let findings = validate_batch(&records, &Validator::new(registry), SchemaVersion::new(1, 0));
//! assert!(findings.iter().all(|f| f.len() == 1)); // no leaders
//! # Ok::<(), marcseq::MarcError>(())
//! ```

use crate::extract::{extract, Extraction, KeyPolicy};
use crate::record::MarcRecord;
use crate::schema::SchemaVersion;
use crate::validation::{ValidationError, Validator};
use rayon::prelude::*;

/// Extract every record in parallel.
#[must_use]
pub fn extract_batch(records: &[MarcRecord], policy: KeyPolicy) -> Vec<Extraction> {
    records
        .par_iter()
        .map(|record| extract(record, policy))
        .collect()
}

/// Validate every record in parallel, returning one finding list per record.
#[must_use]
pub fn validate_batch(
    records: &[MarcRecord],
    validator: &Validator,
    version: SchemaVersion,
) -> Vec<Vec<ValidationError>> {
    records
        .par_iter()
        .map(|record| validator.validate(record, version))
        .collect()
}

/// Validate every record in parallel and attach the findings to it.
///
/// Returns the total number of findings.
pub fn validate_batch_in_place(
    records: &mut [MarcRecord],
    validator: &Validator,
    version: SchemaVersion,
) -> usize {
    records
        .par_iter_mut()
        .map(|record| validator.validate_and_attach(record, version))
        .sum()
}
