//! Flattening records into key/value mappings for indexing.
//!
//! [`extract`] turns a [`MarcRecord`] into an ordered mapping from string
//! keys to ordered value lists. Keys are built from a tag and a label under a
//! [`KeyPolicy`]:
//!
//! | policy  | field `245` | subfield `245$a`        | indicator        |
//! |---------|-------------|-------------------------|------------------|
//! | `Raw`   | `245`       | `245a`                  | `245ind1`        |
//! | `Human` | `Title`     | `Title_mainTitle`       | `Title_titleAddedEntry` |
//! | `Mixed` | `245_Title` | `245a_Title_mainTitle`  | `245ind1_Title_titleAddedEntry` |
//!
//! Values for a key repeat in encounter order, so repeated subfields and
//! repeated fields concatenate under one key. Use [`extract_occurrences`]
//! when values must stay grouped by field occurrence.
//!
//! # Examples
//!
//! ```
//! use marcseq::{extract, DataField, KeyPolicy, MarcRecord, SchemaRegistry};
//!
//! let registry = SchemaRegistry::marc21();
//! let mut record = MarcRecord::new("1");
//! let mut title = DataField::new(registry.resolve("245", false), '1', '0');
//! title.add_subfield('a', "Title");
//! record.add_data_field(title);
//!
//! let map = extract(&record, KeyPolicy::Raw);
//! assert_eq!(map["245a"], vec!["Title"]);
//! assert_eq!(map["245ind1"], vec!["Added entry"]);
//! ```

use crate::error::{MarcError, Result};
use crate::record::{Field, MarcRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered key/value mapping produced by [`extract`].
pub type Extraction = IndexMap<String, Vec<String>>;

/// How a (tag, label) pair becomes one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    /// The tag alone
    #[default]
    Raw,
    /// The human-readable label alone
    Human,
    /// `tag_label`
    Mixed,
}

impl KeyPolicy {
    /// Render a key. Never empty for a non-empty tag: an empty label falls
    /// back to the tag.
    #[must_use]
    pub fn key(self, tag: &str, label: &str) -> String {
        let label = if label.is_empty() { tag } else { label };
        match self {
            KeyPolicy::Raw => tag.to_string(),
            KeyPolicy::Human => label.to_string(),
            KeyPolicy::Mixed => format!("{tag}_{label}"),
        }
    }
}

impl fmt::Display for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyPolicy::Raw => "raw",
            KeyPolicy::Human => "human",
            KeyPolicy::Mixed => "mixed",
        })
    }
}

impl FromStr for KeyPolicy {
    type Err = MarcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(KeyPolicy::Raw),
            "human" => Ok(KeyPolicy::Human),
            "mixed" => Ok(KeyPolicy::Mixed),
            _ => Err(MarcError::ParseError(format!("unknown key policy {s:?}"))),
        }
    }
}

const LEADER_TAG: &str = "LDR";
const LEADER_LABEL: &str = "leader";

/// Flatten `record` under `policy`.
///
/// Order of keys is first-encounter order: the leader, then fields in source
/// order, and within a data field its indicators followed by its subfields.
/// Undefined indicators are skipped; defined ones map to the label of their
/// code, or the raw character if the code is not listed.
#[must_use]
pub fn extract(record: &MarcRecord, policy: KeyPolicy) -> Extraction {
    let mut map = Extraction::new();
    let mut push = |key: String, value: String| map.entry(key).or_default().push(value);

    if let Some(leader) = record.leader() {
        push(policy.key(LEADER_TAG, LEADER_LABEL), leader.to_string());
    }

    for field in record.fields() {
        match field {
            Field::Control(control) => {
                let label = control.definition().key_label();
                push(policy.key(control.tag(), &label), control.content().to_string());
            },
            Field::Data(data) => {
                let definition = data.definition();
                let tag = data.tag();
                let field_label = definition.key_label();

                for position in 1..=2u8 {
                    let (Some(indicator), Some(value)) =
                        (definition.indicator(position), data.indicator(position))
                    else {
                        continue;
                    };
                    if !indicator.is_defined() {
                        continue;
                    }
                    let label = if indicator.mq_label.is_empty() {
                        format!("{field_label}_ind{position}")
                    } else {
                        format!("{field_label}_{}", indicator.mq_label)
                    };
                    let resolved = indicator
                        .resolve(value)
                        .map_or_else(|| value.to_string(), str::to_string);
                    push(policy.key(&format!("{tag}ind{position}"), &label), resolved);
                }

                for subfield in &data.subfields {
                    let sub_label = definition
                        .get_subfield(subfield.code)
                        .map_or_else(|| subfield.code.to_string(), |s| s.key_label());
                    push(
                        policy.key(
                            &format!("{tag}{}", subfield.code),
                            &format!("{field_label}_{sub_label}"),
                        ),
                        subfield.value.clone(),
                    );
                }
            },
        }
    }

    map
}

/// Values at `tag` + `path` across every occurrence, in order.
///
/// `path` is a subfield code (`"a"`), `"ind1"` or `"ind2"`. For a control
/// field tag, an empty path selects its content. Any other path matches
/// nothing.
#[must_use]
pub fn extract_values(record: &MarcRecord, tag: &str, path: &str) -> Vec<String> {
    let mut values = Vec::new();
    for field in record.fields().iter().filter(|f| f.tag() == tag) {
        match field {
            Field::Control(control) if path.is_empty() => {
                values.push(control.content().to_string());
            },
            Field::Control(_) => {},
            Field::Data(data) => match path {
                "ind1" => values.push(data.indicator1.to_string()),
                "ind2" => values.push(data.indicator2.to_string()),
                _ => {
                    let mut chars = path.chars();
                    if let (Some(code), None) = (chars.next(), chars.next()) {
                        values.extend(data.subfields_by_code(code).map(str::to_string));
                    }
                },
            },
        }
    }
    values
}

/// Values of subfield `code`, grouped per occurrence of `tag`.
///
/// Every occurrence yields one list, empty when it lacks the subfield.
#[must_use]
pub fn extract_occurrences<'a>(record: &'a MarcRecord, tag: &str, code: char) -> Vec<Vec<&'a str>> {
    record
        .data_fields()
        .filter(|f| f.tag() == tag)
        .map(|f| f.subfields_by_code(code).collect())
        .collect()
}
