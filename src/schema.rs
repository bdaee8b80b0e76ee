//! Field definitions and the schema registry.
//!
//! A [`SchemaRegistry`] holds one immutable [`FieldDefinition`] per tag. It is
//! populated once, before any record is read, and then shared by reference
//! (`Arc`) with the reader, validator and extractor. Records hold
//! `Arc<FieldDefinition>` handles into it.
//!
//! Tags with no definition resolve to a synthetic "unknown field" definition
//! so their content is retained rather than dropped.
//!
//! # Examples
//!
//! ```
//! use marcseq::schema::{Cardinality, FieldDefinition, SchemaRegistry, SubfieldDefinition};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register(
//!     FieldDefinition::data("502", "Dissertation Note", "DissertationNote", Cardinality::Repeatable)
//!         .subfield(SubfieldDefinition::new('a', "Dissertation note", "note", Cardinality::NonRepeatable)),
//! )?;
//!
//! assert!(registry.lookup("502").is_some());
//! assert!(registry.resolve("599", false).is_unknown());
//! # Ok::<(), marcseq::MarcError>(())
//! ```

use crate::error::{MarcError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;

/// Whether a field or subfield may repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cardinality {
    /// May occur at most once
    #[serde(rename = "NR", alias = "NonRepeatable")]
    NonRepeatable,
    /// May occur any number of times
    #[default]
    #[serde(rename = "R", alias = "Repeatable")]
    Repeatable,
}

/// A schema revision, ordered by `(major, minor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    /// Major revision
    pub major: u16,
    /// Minor revision
    pub minor: u16,
}

impl SchemaVersion {
    /// Create a version.
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        SchemaVersion { major, minor }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for SchemaVersion {
    type Err = MarcError;

    fn from_str(s: &str) -> Result<Self> {
        let (major, minor) = s.split_once('.').unwrap_or((s, "0"));
        let parse = |part: &str| {
            part.trim()
                .parse::<u16>()
                .map_err(|_| MarcError::ParseError(format!("invalid schema version {s:?}")))
        };
        Ok(SchemaVersion::new(parse(major)?, parse(minor)?))
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The half-open range of schema versions in which an element is defined.
///
/// `introduced` is inclusive, `retired` exclusive. Open ends are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionRange {
    /// First version that defines the element
    pub introduced: Option<SchemaVersion>,
    /// First version that no longer defines the element
    pub retired: Option<SchemaVersion>,
}

impl VersionRange {
    /// A range covering every version.
    #[must_use]
    pub const fn always() -> Self {
        VersionRange {
            introduced: None,
            retired: None,
        }
    }

    /// Whether `version` falls inside the range.
    #[must_use]
    pub fn contains(&self, version: SchemaVersion) -> bool {
        self.introduced.is_none_or(|start| version >= start)
            && self.retired.is_none_or(|end| version < end)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.introduced, self.retired) {
            (None, None) => write!(f, "all versions"),
            (Some(start), None) => write!(f, "{start} and later"),
            (None, Some(end)) => write!(f, "before {end}"),
            (Some(start), Some(end)) => write!(f, "{start} to {end}"),
        }
    }
}

/// One entry of a code list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    /// The code as it appears in data
    pub code: String,
    /// Human-readable meaning
    pub label: String,
}

/// An enumeration constraining a subfield's or indicator's legal values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeList {
    /// Name of the list
    pub name: String,
    /// The codes, in definition order
    pub codes: Vec<Code>,
}

impl CodeList {
    /// Build a list from `(code, label)` pairs.
    #[must_use]
    pub fn new(name: &str, codes: &[(&str, &str)]) -> Self {
        CodeList {
            name: name.to_string(),
            codes: codes_from_pairs(codes),
        }
    }

    /// Whether `code` is in the list.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c.code == code)
    }

    /// Meaning of `code`, if listed.
    #[must_use]
    pub fn label(&self, code: &str) -> Option<&str> {
        self.codes
            .iter()
            .find(|c| c.code == code)
            .map(|c| c.label.as_str())
    }
}

fn codes_from_pairs(codes: &[(&str, &str)]) -> Vec<Code> {
    codes
        .iter()
        .map(|(code, label)| Code {
            code: (*code).to_string(),
            label: (*label).to_string(),
        })
        .collect()
}

/// Parsers checking the internal format of a subfield's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentParser {
    /// `$6` linkage: `TAG-OCC[/script][/r]`
    Linkage,
}

impl ContentParser {
    /// Check `value`, returning a description of the problem if it does not
    /// conform.
    #[must_use]
    pub fn check(&self, value: &str) -> Option<String> {
        match self {
            ContentParser::Linkage => {
                if crate::linkage::LinkageInfo::parse(value).is_some() {
                    None
                } else {
                    Some(format!("{value:?} is not a valid linkage (TAG-OCC[/script][/r])"))
                }
            },
        }
    }
}

/// Definition of one indicator position.
///
/// An indicator with an empty label is undefined: it must be blank.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorDefinition {
    /// Human-readable label; empty when the indicator is undefined
    pub label: String,
    /// Label used for extraction keys
    pub mq_label: String,
    /// Allowed codes (`#` stands for blank)
    pub codes: Vec<Code>,
}

impl IndicatorDefinition {
    /// An undefined (blank) indicator.
    #[must_use]
    pub fn undefined() -> Self {
        IndicatorDefinition::default()
    }

    /// A defined indicator.
    #[must_use]
    pub fn new(label: &str, mq_label: &str) -> Self {
        IndicatorDefinition {
            label: label.to_string(),
            mq_label: mq_label.to_string(),
            codes: Vec::new(),
        }
    }

    /// Set the allowed codes from `(code, label)` pairs.
    #[must_use]
    pub fn codes(mut self, codes: &[(&str, &str)]) -> Self {
        self.codes = codes_from_pairs(codes);
        self
    }

    /// Whether the indicator carries meaning.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        !self.label.is_empty()
    }

    /// Whether `value` is allowed in this position.
    #[must_use]
    pub fn is_valid(&self, value: char) -> bool {
        if !self.is_defined() {
            return is_blank(value);
        }
        self.find(value).is_some()
    }

    /// Meaning of `value`, if it is a listed code.
    #[must_use]
    pub fn resolve(&self, value: char) -> Option<&str> {
        self.find(value).map(|c| c.label.as_str())
    }

    fn find(&self, value: char) -> Option<&Code> {
        self.codes.iter().find(|c| {
            let mut chars = c.code.chars();
            match (chars.next(), chars.next()) {
                (Some(code), None) => code == value || (is_blank(code) && is_blank(value)),
                _ => false,
            }
        })
    }
}

/// Blank indicator: space or the `#` placeholder.
#[must_use]
pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '#'
}

/// Definition of one subfield code within a data field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubfieldDefinition {
    /// Subfield code
    pub code: char,
    /// Human-readable label
    pub label: String,
    /// Label used for extraction keys
    #[serde(default)]
    pub mq_label: String,
    /// Whether the subfield may repeat within one field
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Allowed values
    #[serde(default)]
    pub code_list: Option<Arc<CodeList>>,
    /// Content format check
    #[serde(default)]
    pub content_parser: Option<ContentParser>,
    /// Versions defining this subfield
    #[serde(default)]
    pub versions: VersionRange,
}

impl SubfieldDefinition {
    /// Create a subfield definition valid in every version.
    #[must_use]
    pub fn new(code: char, label: &str, mq_label: &str, cardinality: Cardinality) -> Self {
        SubfieldDefinition {
            code,
            label: label.to_string(),
            mq_label: mq_label.to_string(),
            cardinality,
            code_list: None,
            content_parser: None,
            versions: VersionRange::always(),
        }
    }

    /// Constrain values to a code list.
    #[must_use]
    pub fn code_list(mut self, list: Arc<CodeList>) -> Self {
        self.code_list = Some(list);
        self
    }

    /// Check content with a parser.
    #[must_use]
    pub fn content_parser(mut self, parser: ContentParser) -> Self {
        self.content_parser = Some(parser);
        self
    }

    /// Restrict the subfield to a version range.
    #[must_use]
    pub fn versions(mut self, versions: VersionRange) -> Self {
        self.versions = versions;
        self
    }

    /// Label used for extraction keys, falling back to the code.
    #[must_use]
    pub fn key_label(&self) -> String {
        if self.mq_label.is_empty() {
            self.code.to_string()
        } else {
            self.mq_label.clone()
        }
    }
}

/// Definition of one field tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Three-character tag
    pub tag: String,
    /// Human-readable label
    pub label: String,
    /// Label used for extraction keys
    #[serde(default)]
    pub mq_label: String,
    /// Whether the field may repeat within a record
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Control fields carry unstructured content and no subfields
    #[serde(default)]
    pub is_control_field: bool,
    /// First indicator
    #[serde(default)]
    pub indicator1: IndicatorDefinition,
    /// Second indicator
    #[serde(default)]
    pub indicator2: IndicatorDefinition,
    /// Subfield definitions in definition order
    #[serde(default)]
    pub subfields: Vec<SubfieldDefinition>,
    /// Versions defining this field
    #[serde(default)]
    pub versions: VersionRange,
    #[serde(skip)]
    unknown: bool,
}

impl FieldDefinition {
    /// Define a data field with undefined indicators and no subfields yet.
    #[must_use]
    pub fn data(tag: &str, label: &str, mq_label: &str, cardinality: Cardinality) -> Self {
        FieldDefinition {
            tag: tag.to_string(),
            label: label.to_string(),
            mq_label: mq_label.to_string(),
            cardinality,
            is_control_field: false,
            indicator1: IndicatorDefinition::undefined(),
            indicator2: IndicatorDefinition::undefined(),
            subfields: Vec::new(),
            versions: VersionRange::always(),
            unknown: false,
        }
    }

    /// Define a control field.
    #[must_use]
    pub fn control(tag: &str, label: &str, mq_label: &str, cardinality: Cardinality) -> Self {
        FieldDefinition {
            is_control_field: true,
            ..Self::data(tag, label, mq_label, cardinality)
        }
    }

    /// The synthetic definition used for tags missing from the registry.
    #[must_use]
    pub fn unknown(tag: &str, is_control_field: bool) -> Self {
        FieldDefinition {
            is_control_field,
            unknown: true,
            ..Self::data(tag, "Unknown field", tag, Cardinality::Repeatable)
        }
    }

    /// Whether this is the synthetic unknown-field definition.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.unknown
    }

    /// Set the first indicator.
    #[must_use]
    pub fn indicator1(mut self, indicator: IndicatorDefinition) -> Self {
        self.indicator1 = indicator;
        self
    }

    /// Set the second indicator.
    #[must_use]
    pub fn indicator2(mut self, indicator: IndicatorDefinition) -> Self {
        self.indicator2 = indicator;
        self
    }

    /// Append a subfield definition.
    #[must_use]
    pub fn subfield(mut self, subfield: SubfieldDefinition) -> Self {
        self.subfields.push(subfield);
        self
    }

    /// Restrict the field to a version range.
    #[must_use]
    pub fn versions(mut self, versions: VersionRange) -> Self {
        self.versions = versions;
        self
    }

    /// Look up a subfield definition by code.
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&SubfieldDefinition> {
        self.subfields.iter().find(|s| s.code == code)
    }

    /// Indicator definition by position (1 or 2).
    #[must_use]
    pub fn indicator(&self, position: u8) -> Option<&IndicatorDefinition> {
        match position {
            1 => Some(&self.indicator1),
            2 => Some(&self.indicator2),
            _ => None,
        }
    }

    /// Label used for extraction keys, falling back to the tag.
    #[must_use]
    pub fn key_label(&self) -> String {
        if self.mq_label.is_empty() {
            self.tag.clone()
        } else {
            self.mq_label.clone()
        }
    }

    fn check(&self) -> Result<()> {
        if self.tag.len() != 3 {
            return Err(MarcError::InvalidDefinition(format!(
                "tag {:?} must be 3 characters",
                self.tag
            )));
        }
        if self.is_control_field && !self.subfields.is_empty() {
            return Err(MarcError::InvalidDefinition(format!(
                "control field {} cannot define subfields",
                self.tag
            )));
        }
        for (i, subfield) in self.subfields.iter().enumerate() {
            if self.subfields[..i].iter().any(|s| s.code == subfield.code) {
                return Err(MarcError::InvalidDefinition(format!(
                    "field {} defines subfield ${} twice",
                    self.tag, subfield.code
                )));
            }
        }
        Ok(())
    }
}

/// Immutable lookup of field definitions by tag.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    definitions: HashMap<String, Arc<FieldDefinition>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        SchemaRegistry {
            definitions: HashMap::new(),
        }
    }

    /// Build a registry from definitions.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidDefinition`] for a malformed or duplicate
    /// definition.
    pub fn from_definitions<I>(definitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = FieldDefinition>,
    {
        let mut registry = SchemaRegistry::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Load a registry from a JSON array of definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a definition is invalid.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let definitions: Vec<FieldDefinition> = serde_json::from_reader(reader)?;
        let registry = Self::from_definitions(definitions)?;
        tracing::info!(definitions = registry.len(), "loaded schema registry");
        Ok(registry)
    }

    /// Add a definition.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidDefinition`] if the definition is malformed
    /// or its tag is already registered.
    pub fn register(&mut self, definition: FieldDefinition) -> Result<()> {
        definition.check()?;
        if self.definitions.contains_key(&definition.tag) {
            return Err(MarcError::InvalidDefinition(format!(
                "tag {} defined twice",
                definition.tag
            )));
        }
        self.definitions
            .insert(definition.tag.clone(), Arc::new(definition));
        Ok(())
    }

    /// Look up the definition for `tag`.
    #[must_use]
    pub fn lookup(&self, tag: &str) -> Option<&Arc<FieldDefinition>> {
        self.definitions.get(tag)
    }

    /// The definition for `tag`, or a synthetic unknown-field definition of
    /// the requested shape.
    ///
    /// A registered definition whose shape (control vs data) disagrees with
    /// `is_control_field` is also treated as unknown.
    #[must_use]
    pub fn resolve(&self, tag: &str, is_control_field: bool) -> Arc<FieldDefinition> {
        match self.definitions.get(tag) {
            Some(definition) if definition.is_control_field == is_control_field => {
                Arc::clone(definition)
            },
            _ => {
                tracing::debug!(tag, "no definition, using unknown field");
                Arc::new(FieldDefinition::unknown(tag, is_control_field))
            },
        }
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Registered tags in ascending order.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse_and_order() {
        let v: SchemaVersion = "2.1".parse().unwrap();
        assert_eq!(v, SchemaVersion::new(2, 1));
        assert_eq!("3".parse::<SchemaVersion>().unwrap(), SchemaVersion::new(3, 0));
        assert!(SchemaVersion::new(1, 9) < SchemaVersion::new(2, 0));
        assert!("x.1".parse::<SchemaVersion>().is_err());
        assert_eq!(v.to_string(), "2.1");
    }

    #[test]
    fn test_version_range_half_open() {
        let range = VersionRange {
            introduced: Some(SchemaVersion::new(1, 0)),
            retired: Some(SchemaVersion::new(2, 0)),
        };
        assert!(!range.contains(SchemaVersion::new(0, 9)));
        assert!(range.contains(SchemaVersion::new(1, 0)));
        assert!(range.contains(SchemaVersion::new(1, 5)));
        assert!(!range.contains(SchemaVersion::new(2, 0)));
        assert!(VersionRange::always().contains(SchemaVersion::new(0, 0)));
    }

    #[test]
    fn test_undefined_indicator_requires_blank() {
        let ind = IndicatorDefinition::undefined();
        assert!(ind.is_valid(' '));
        assert!(ind.is_valid('#'));
        assert!(!ind.is_valid('0'));
    }

    #[test]
    fn test_defined_indicator_codes() {
        let ind = IndicatorDefinition::new("Title added entry", "titleAddedEntry")
            .codes(&[("0", "No added entry"), ("1", "Added entry"), ("#", "No information")]);
        assert!(ind.is_valid('0'));
        assert!(ind.is_valid(' '));
        assert!(!ind.is_valid('9'));
        assert_eq!(ind.resolve('1'), Some("Added entry"));
        assert_eq!(ind.resolve(' '), Some("No information"));
        assert_eq!(ind.resolve('9'), None);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = SchemaRegistry::new();
        let def = FieldDefinition::data("245", "Title", "Title", Cardinality::NonRepeatable);
        registry.register(def.clone()).unwrap();
        assert!(matches!(
            registry.register(def),
            Err(MarcError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_register_rejects_malformed() {
        let mut registry = SchemaRegistry::new();
        let bad_tag = FieldDefinition::data("24", "Title", "Title", Cardinality::Repeatable);
        assert!(registry.register(bad_tag).is_err());

        let control_with_subfields =
            FieldDefinition::control("001", "Control Number", "ControlNumber", Cardinality::NonRepeatable)
                .subfield(SubfieldDefinition::new('a', "x", "x", Cardinality::Repeatable));
        assert!(registry.register(control_with_subfields).is_err());

        let twice = FieldDefinition::data("500", "Note", "Note", Cardinality::Repeatable)
            .subfield(SubfieldDefinition::new('a', "a", "a", Cardinality::Repeatable))
            .subfield(SubfieldDefinition::new('a', "a", "a", Cardinality::Repeatable));
        assert!(registry.register(twice).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_unknown_keeps_shape() {
        let registry = SchemaRegistry::from_definitions([FieldDefinition::control(
            "001",
            "Control Number",
            "ControlNumber",
            Cardinality::NonRepeatable,
        )])
        .unwrap();

        assert!(!registry.resolve("001", true).is_unknown());
        let mismatched = registry.resolve("001", false);
        assert!(mismatched.is_unknown());
        assert!(!mismatched.is_control_field);

        let unknown = registry.resolve("999", false);
        assert!(unknown.is_unknown());
        assert_eq!(unknown.key_label(), "999");
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"tag": "001", "label": "Control Number", "mq_label": "ControlNumber",
             "cardinality": "NR", "is_control_field": true},
            {"tag": "502", "label": "Dissertation Note", "mq_label": "DissertationNote",
             "subfields": [
                {"code": "a", "label": "Dissertation note", "mq_label": "note", "cardinality": "NR"},
                {"code": "c", "label": "Granting institution", "versions": {"introduced": "2.0"}}
             ]}
        ]"#;
        let registry = SchemaRegistry::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(registry.tags(), vec!["001", "502"]);
        let def = registry.lookup("502").unwrap();
        assert_eq!(def.cardinality, Cardinality::Repeatable);
        assert_eq!(
            def.get_subfield('a').unwrap().cardinality,
            Cardinality::NonRepeatable
        );
        assert_eq!(
            def.get_subfield('c').unwrap().versions.introduced,
            Some(SchemaVersion::new(2, 0))
        );
    }
}
