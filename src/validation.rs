//! Schema-driven validation of assembled records.
//!
//! [`Validator::validate`] walks a [`MarcRecord`] against the
//! [`SchemaRegistry`] for one [`SchemaVersion`] and returns every finding it
//! makes. Each field is checked against the validator's registry; a field
//! whose tag the registry does not define keeps the definition it was built
//! with. It never fails and never stops early: one bad field does not hide
//! problems in the next.
//!
//! Checks per field:
//! - unknown tag
//! - field defined in the requested version
//! - field cardinality (a non-repeatable tag occurring more than once)
//! - indicator values
//! - subfield code legality and version
//! - subfield cardinality within the field
//! - code list membership and content format
//!
//! # Examples
//!
//! ```
//! use marcseq::{DataField, MarcRecord, SchemaRegistry, SchemaVersion, Validator};
//! use marcseq::validation::ValidationErrorType;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(SchemaRegistry::marc21());
//! let mut record = MarcRecord::new("1");
//! record.set_leader("00000nam a2200000 a 4500");
//! let mut title = DataField::new(registry.resolve("245", false), '9', '0');
//! title.add_subfield('a', "Title");
//! record.add_data_field(title);
//!
//! let validator = Validator::new(registry);
//! let errors = validator.validate(&record, SchemaVersion::new(1, 0));
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors[0].kind, ValidationErrorType::InvalidIndicator);
//! ```

use crate::record::{DataField, Field, MarcRecord};
use crate::schema::{Cardinality, FieldDefinition, SchemaRegistry, SchemaVersion};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Kind of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationErrorType {
    /// Record has no leader
    MissingLeader,
    /// Tag has no schema definition
    UnknownTag,
    /// Non-repeatable field or subfield occurs more than once
    CardinalityViolation,
    /// Subfield code not defined for the field
    IllegalSubfieldCode,
    /// Indicator value not allowed in its position
    InvalidIndicator,
    /// Subfield value missing from its code list
    CodeListViolation,
    /// Element not defined in the requested schema version
    VersionMismatch,
    /// Subfield content does not match its required format
    InvalidContent,
}

impl fmt::Display for ValidationErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingLeader => "missing leader",
            Self::UnknownTag => "unknown tag",
            Self::CardinalityViolation => "cardinality violation",
            Self::IllegalSubfieldCode => "illegal subfield code",
            Self::InvalidIndicator => "invalid indicator",
            Self::CodeListViolation => "code list violation",
            Self::VersionMismatch => "version mismatch",
            Self::InvalidContent => "invalid content",
        };
        f.write_str(name)
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Identifier of the record the finding belongs to
    pub record_id: String,
    /// Tag of the offending field (`LDR` for the leader)
    pub field_tag: String,
    /// Offending subfield code, if the finding is about a subfield
    pub subfield_code: Option<char>,
    /// Kind of finding
    pub kind: ValidationErrorType,
    /// Human-readable description
    pub message: String,
}

impl ValidationError {
    /// Create a field-level finding.
    pub fn new(
        record_id: &str,
        field_tag: &str,
        kind: ValidationErrorType,
        message: impl Into<String>,
    ) -> Self {
        ValidationError {
            record_id: record_id.to_string(),
            field_tag: field_tag.to_string(),
            subfield_code: None,
            kind,
            message: message.into(),
        }
    }

    /// Attach the offending subfield code.
    #[must_use]
    pub fn with_subfield(mut self, code: char) -> Self {
        self.subfield_code = Some(code);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.record_id, self.field_tag)?;
        if let Some(code) = self.subfield_code {
            write!(f, "${code}")?;
        }
        write!(f, ": {}: {}", self.kind, self.message)
    }
}

/// Validator over one schema registry.
#[derive(Debug, Clone)]
pub struct Validator {
    registry: Arc<SchemaRegistry>,
}

impl Validator {
    /// Create a validator.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Validator { registry }
    }

    /// The registry checks run against.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Validate `record` against `version`, returning every finding.
    #[must_use]
    pub fn validate(&self, record: &MarcRecord, version: SchemaVersion) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let id = record.record_id();

        if record.leader().is_none() {
            errors.push(ValidationError::new(
                id,
                "LDR",
                ValidationErrorType::MissingLeader,
                "record does not have a leader",
            ));
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for field in record.fields() {
            *counts.entry(field.tag()).or_default() += 1;
        }

        let mut reported_repeats: Vec<&str> = Vec::new();
        for field in record.fields() {
            let definition = self.definition_for(field);
            let tag = field.tag();

            // Unknown tags get no further checks.
            if definition.is_unknown() {
                errors.push(ValidationError::new(
                    id,
                    tag,
                    ValidationErrorType::UnknownTag,
                    format!("field {tag} is not defined"),
                ));
                continue;
            }

            if !definition.versions.contains(version) {
                errors.push(ValidationError::new(
                    id,
                    tag,
                    ValidationErrorType::VersionMismatch,
                    format!(
                        "field {tag} is defined for {}, not {version}",
                        definition.versions
                    ),
                ));
            }

            let count = counts.get(tag).copied().unwrap_or(0);
            if definition.cardinality == Cardinality::NonRepeatable
                && count > 1
                && !reported_repeats.contains(&tag)
            {
                reported_repeats.push(tag);
                errors.push(ValidationError::new(
                    id,
                    tag,
                    ValidationErrorType::CardinalityViolation,
                    format!("non-repeatable field {tag} occurs {count} times"),
                ));
            }

            // Control field content is positional and not checked here.
            if let Field::Data(data) = field {
                Self::validate_data(id, definition, data, version, &mut errors);
            }
        }

        errors
    }

    /// Validate and attach the findings to the record.
    pub fn validate_and_attach(&self, record: &mut MarcRecord, version: SchemaVersion) -> usize {
        let errors = self.validate(record, version);
        let count = errors.len();
        record.attach_validation_errors(errors);
        count
    }

    /// The registry's definition for `field`, or the one the field was
    /// built with when the registry has no definition of the same shape.
    fn definition_for<'a>(&'a self, field: &'a Field) -> &'a FieldDefinition {
        let is_control = matches!(field, Field::Control(_));
        match self.registry.lookup(field.tag()) {
            Some(definition) if definition.is_control_field == is_control => definition,
            _ => field.definition(),
        }
    }

    fn validate_data(
        id: &str,
        definition: &FieldDefinition,
        field: &DataField,
        version: SchemaVersion,
        errors: &mut Vec<ValidationError>,
    ) {
        let tag = field.tag();

        for (position, value) in [(1u8, field.indicator1), (2u8, field.indicator2)] {
            let Some(indicator) = definition.indicator(position) else {
                continue;
            };
            if !indicator.is_valid(value) {
                let expected = if indicator.is_defined() {
                    format!("one of the codes for {:?}", indicator.label)
                } else {
                    "blank (undefined indicator)".to_string()
                };
                errors.push(ValidationError::new(
                    id,
                    tag,
                    ValidationErrorType::InvalidIndicator,
                    format!("indicator {position} has value {value:?}, expected {expected}"),
                ));
            }
        }

        let mut seen: Vec<(char, usize)> = Vec::new();
        for subfield in &field.subfields {
            match seen.iter_mut().find(|(code, _)| *code == subfield.code) {
                Some((_, n)) => *n += 1,
                None => seen.push((subfield.code, 1)),
            }
        }

        for &(code, count) in &seen {
            let Some(sub_def) = definition.get_subfield(code) else {
                errors.push(
                    ValidationError::new(
                        id,
                        tag,
                        ValidationErrorType::IllegalSubfieldCode,
                        format!("subfield ${code} is not defined for field {tag}"),
                    )
                    .with_subfield(code),
                );
                continue;
            };
            if !sub_def.versions.contains(version) {
                errors.push(
                    ValidationError::new(
                        id,
                        tag,
                        ValidationErrorType::VersionMismatch,
                        format!(
                            "subfield ${code} is defined for {}, not {version}",
                            sub_def.versions
                        ),
                    )
                    .with_subfield(code),
                );
            }
            if sub_def.cardinality == Cardinality::NonRepeatable && count > 1 {
                errors.push(
                    ValidationError::new(
                        id,
                        tag,
                        ValidationErrorType::CardinalityViolation,
                        format!("non-repeatable subfield ${code} occurs {count} times"),
                    )
                    .with_subfield(code),
                );
            }
        }

        for subfield in &field.subfields {
            let Some(sub_def) = definition.get_subfield(subfield.code) else {
                continue;
            };
            if let Some(list) = &sub_def.code_list {
                if !list.contains(&subfield.value) {
                    errors.push(
                        ValidationError::new(
                            id,
                            tag,
                            ValidationErrorType::CodeListViolation,
                            format!("{:?} is not in {}", subfield.value, list.name),
                        )
                        .with_subfield(subfield.code),
                    );
                }
            }
            if let Some(problem) = sub_def.content_parser.and_then(|p| p.check(&subfield.value)) {
                errors.push(
                    ValidationError::new(id, tag, ValidationErrorType::InvalidContent, problem)
                        .with_subfield(subfield.code),
                );
            }
        }
    }
}
