//! Common test helpers and utilities shared across test suite.

use marcseq::{MarcRecord, SchemaRegistry, SeqReader};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared built-in registry.
pub fn registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::marc21())
}

/// Path of a file under `tests/data`.
#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Reader over in-memory text using the built-in registry.
pub fn reader(data: &str) -> SeqReader<Cursor<Vec<u8>>> {
    SeqReader::new(Cursor::new(data.as_bytes().to_vec()), registry())
}

/// Every record in the sample fixture.
#[allow(dead_code)]
pub fn sample_records() -> Vec<MarcRecord> {
    SeqReader::from_path(fixture_path("sample.seq"), registry())
        .expect("Could not open sample fixture")
        .read_all()
        .expect("Failed to read sample fixture")
}

/// One Aleph sequential line: id padded to 9, tag, indicators, content.
#[allow(dead_code)]
pub fn line(id: &str, tag: &str, indicators: &str, content: &str) -> String {
    format!("{id:0>9} {tag}{indicators:<2} L {content}\n")
}
