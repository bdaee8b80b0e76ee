//! The validated, queryable field model of one record.
//!
//! - [`MarcRecord`] — one record: identifier, optional leader, fields
//! - [`Field`] — either a [`ControlField`] or a [`DataField`]
//! - [`Subfield`] — a code/value pair inside a data field
//!
//! Every field holds a shared reference to its
//! [`FieldDefinition`](crate::schema::FieldDefinition). Fields keep source
//! order, and subfields keep their order within the field; repeated subfield
//! codes are preserved, never merged.
//!
//! # Examples
//!
//! ```
//! use marcseq::{DataField, MarcRecord, SchemaRegistry};
//!
//! let registry = SchemaRegistry::marc21();
//! let mut record = MarcRecord::new("000000001");
//! record.add_control_field(registry.resolve("001", true), "000000001");
//!
//! let mut title = DataField::new(registry.resolve("245", false), '1', '0');
//! title.add_subfield('a', "Title");
//! record.add_data_field(title);
//!
//! assert_eq!(record.control_number(), Some("000000001"));
//! assert_eq!(record.title(), Some("Title"));
//! ```

use crate::schema::FieldDefinition;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// A subfield within a data field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

impl Subfield {
    /// Create a subfield.
    pub fn new(code: char, value: impl Into<String>) -> Self {
        Subfield {
            code,
            value: value.into(),
        }
    }
}

/// A control field: unstructured content, no indicators or subfields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlField {
    definition: Arc<FieldDefinition>,
    content: String,
}

impl ControlField {
    /// Create a control field.
    pub fn new(definition: Arc<FieldDefinition>, content: impl Into<String>) -> Self {
        ControlField {
            definition,
            content: content.into(),
        }
    }

    /// The field's definition.
    #[must_use]
    pub fn definition(&self) -> &FieldDefinition {
        &self.definition
    }

    /// The field tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.definition.tag
    }

    /// The content; empty is valid.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A data field: two indicators and an ordered list of subfields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataField {
    definition: Arc<FieldDefinition>,
    /// First indicator
    pub indicator1: char,
    /// Second indicator
    pub indicator2: char,
    /// Subfields in source order (stored in `SmallVec`, most fields have few)
    pub subfields: SmallVec<[Subfield; 4]>,
}

impl DataField {
    /// Create a data field with no subfields.
    #[must_use]
    pub fn new(definition: Arc<FieldDefinition>, indicator1: char, indicator2: char) -> Self {
        DataField {
            definition,
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// The field's definition.
    #[must_use]
    pub fn definition(&self) -> &FieldDefinition {
        &self.definition
    }

    /// The field tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.definition.tag
    }

    /// Indicator by position (1 or 2).
    #[must_use]
    pub fn indicator(&self, position: u8) -> Option<char> {
        match position {
            1 => Some(self.indicator1),
            2 => Some(self.indicator2),
            _ => None,
        }
    }

    /// Append a subfield.
    pub fn add_subfield(&mut self, code: char, value: impl Into<String>) {
        self.subfields.push(Subfield::new(code, value));
    }

    /// Value of the first subfield with `code`.
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.value.as_str())
    }

    /// Values of every subfield with `code`, in order.
    pub fn subfields_by_code(&self, code: char) -> impl Iterator<Item = &str> {
        self.subfields
            .iter()
            .filter(move |s| s.code == code)
            .map(|s| s.value.as_str())
    }
}

/// A field of either shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Control field (conventionally tags 001-009)
    Control(ControlField),
    /// Data field
    Data(DataField),
}

impl Field {
    /// The field tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.definition().tag.as_str()
    }

    /// The field's definition.
    #[must_use]
    pub fn definition(&self) -> &FieldDefinition {
        match self {
            Field::Control(field) => field.definition(),
            Field::Data(field) => field.definition(),
        }
    }
}

/// One catalog record.
///
/// Built in one shot by the reader from a group of lines sharing a record
/// identifier; afterwards only validation results are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarcRecord {
    record_id: String,
    leader: Option<String>,
    fields: Vec<Field>,
    diagnostics: Vec<ValidationError>,
    validation_errors: Vec<ValidationError>,
}

impl MarcRecord {
    /// Create an empty record.
    pub fn new(record_id: impl Into<String>) -> Self {
        MarcRecord {
            record_id: record_id.into(),
            leader: None,
            fields: Vec::new(),
            diagnostics: Vec::new(),
            validation_errors: Vec::new(),
        }
    }

    /// The record identifier shared by all of the record's lines.
    #[must_use]
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    /// The leader, if the record had one.
    #[must_use]
    pub fn leader(&self) -> Option<&str> {
        self.leader.as_deref()
    }

    /// Set the leader.
    pub fn set_leader(&mut self, leader: impl Into<String>) {
        self.leader = Some(leader.into());
    }

    /// Append a control field.
    pub fn add_control_field(&mut self, definition: Arc<FieldDefinition>, content: impl Into<String>) {
        self.fields
            .push(Field::Control(ControlField::new(definition, content)));
    }

    /// Append a data field.
    pub fn add_data_field(&mut self, field: DataField) {
        self.fields.push(Field::Data(field));
    }

    /// All fields in source order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Control fields in source order.
    pub fn control_fields(&self) -> impl Iterator<Item = &ControlField> {
        self.fields.iter().filter_map(|f| match f {
            Field::Control(field) => Some(field),
            Field::Data(_) => None,
        })
    }

    /// Data fields in source order.
    pub fn data_fields(&self) -> impl Iterator<Item = &DataField> {
        self.fields.iter().filter_map(|f| match f {
            Field::Data(field) => Some(field),
            Field::Control(_) => None,
        })
    }

    /// First control field with `tag`.
    #[must_use]
    pub fn control_field(&self, tag: &str) -> Option<&ControlField> {
        self.control_fields().find(|f| f.tag() == tag)
    }

    /// Every occurrence of data field `tag`.
    pub fn data_fields_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a DataField> + 'a {
        self.data_fields().filter(move |f| f.tag() == tag)
    }

    /// Whether the record has at least one data field `tag`.
    #[must_use]
    pub fn has_data_field(&self, tag: &str) -> bool {
        self.data_fields_by_tag(tag).next().is_some()
    }

    /// All values of subfield `code` across every occurrence of `tag`.
    #[must_use]
    pub fn subfield_values(&self, tag: &str, code: char) -> Vec<&str> {
        self.data_fields()
            .filter(|f| f.tag() == tag)
            .flat_map(|f| f.subfields_by_code(code))
            .collect()
    }

    /// Content of control field 001.
    #[must_use]
    pub fn control_number(&self) -> Option<&str> {
        self.control_field("001").map(ControlField::content)
    }

    /// First 245 $a.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.data_fields_by_tag("245")
            .find_map(|f| f.get_subfield('a'))
    }

    /// Findings raised while the record was assembled (e.g. a missing leader).
    #[must_use]
    pub fn diagnostics(&self) -> &[ValidationError] {
        &self.diagnostics
    }

    pub(crate) fn add_diagnostic(&mut self, diagnostic: ValidationError) {
        self.diagnostics.push(diagnostic);
    }

    /// Validation findings attached with [`attach_validation_errors`](Self::attach_validation_errors).
    #[must_use]
    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.validation_errors
    }

    /// Attach validator findings to the record.
    pub fn attach_validation_errors(&mut self, errors: Vec<ValidationError>) {
        self.validation_errors.extend(errors);
    }
}
