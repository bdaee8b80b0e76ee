#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marcseq: line-oriented MARC records
//!
//! Streaming assembly of MARC records from line-oriented exports (Aleph
//! sequential and similar Pica-style layouts), a schema-backed field model
//! with validation, and flattening of records into key/value mappings for
//! search indexing.
//!
//! ## Quick Start
//!
//! ```
//! use marcseq::{extract, KeyPolicy, SchemaRegistry, SchemaVersion, SeqReader, Validator};
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = "\
//! 000000001 LDR   L -----nam^a22-----^a^4500
//! 000000001 001   L 000000001
//! 000000001 24510 L $$aThe great Gatsby$$cF. Scott Fitzgerald
//! 000000001 650 0 L $$aRich people$$zNew York (State)
//! ";
//! let registry = Arc::new(SchemaRegistry::marc21());
//! let validator = Validator::new(Arc::clone(&registry));
//!
//! for record in SeqReader::new(Cursor::new(data), registry) {
//!     let record = record?;
//!     assert!(validator.validate(&record, SchemaVersion::new(1, 0)).is_empty());
//!
//!     let map = extract(&record, KeyPolicy::Mixed);
//!     assert_eq!(map["245a_Title_mainTitle"], vec!["The great Gatsby"]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`format`] — Line layout configuration ([`LineFormat`])
//! - [`line`] — Classifying raw lines into fragments
//! - [`reader`] — Record assembly from a line stream ([`SeqReader`])
//! - [`record_builder`] — Building a record from a closed fragment group
//! - [`record`] — The field model (`MarcRecord`, `Field`, `Subfield`)
//! - [`schema`] — Field definitions and the [`SchemaRegistry`]
//! - [`definitions`] — Built-in MARC 21 definitions
//! - [`validation`] — Schema validation findings
//! - [`extract`](mod@extract) — Key/value extraction under a [`KeyPolicy`]
//! - [`batch`] — Parallel extraction and validation
//! - [`linkage`] — `$6` linkage parsing
//! - [`error`] — Error types and result type

pub mod batch;
pub mod definitions;
pub mod error;
pub mod extract;
pub mod format;
pub mod line;
pub mod linkage;
pub mod reader;
pub mod record;
pub mod record_builder;
pub mod schema;
pub mod validation;

pub use error::{MarcError, Result};
pub use extract::{extract, extract_occurrences, extract_values, Extraction, KeyPolicy};
pub use format::LineFormat;
pub use linkage::LinkageInfo;
pub use reader::SeqReader;
pub use record::{ControlField, DataField, Field, MarcRecord, Subfield};
pub use schema::{
    Cardinality, FieldDefinition, SchemaRegistry, SchemaVersion, SubfieldDefinition, VersionRange,
};
pub use validation::{ValidationError, ValidationErrorType, Validator};
