//! Parsing of subfield `$6` (Linkage) values.
//!
//! Linkage connects a field with its alternate graphical representation in
//! field 880. The value has the form `TAG-OCC[/script][/r]`:
//!
//! - `TAG`: the linked field's three-digit tag
//! - `OCC`: a two- or three-digit occurrence number
//! - `/script`: optional script identification code (`(2`, `(3`, `$1`, ...)
//! - `/r`: optional right-to-left orientation flag
//!
//! The validator uses [`LinkageInfo::parse`] through
//! [`ContentParser::Linkage`](crate::schema::ContentParser::Linkage).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINKAGE: Regex =
        Regex::new(r"^(\d{3})-(\d{2,3})(?:/([\(\$][A-Za-z0-9]))?(/r)?$")
            .unwrap_or_else(|e| unreachable!("linkage pattern is valid: {e}"));
}

/// Information extracted from a `$6` value.
///
/// # Examples
///
/// ```
/// use marcseq::linkage::LinkageInfo;
///
/// let info = LinkageInfo::parse("880-01/(3/r").unwrap();
/// assert_eq!(info.tag, "880");
/// assert_eq!(info.occurrence, "01");
/// assert_eq!(info.script_id, "(3");
/// assert!(info.is_reverse);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkageInfo {
    /// Linked field tag
    pub tag: String,
    /// Occurrence number pairing the fields
    pub occurrence: String,
    /// Script identification code, empty if absent
    pub script_id: String,
    /// Right-to-left flag
    pub is_reverse: bool,
}

impl LinkageInfo {
    /// Parse a linkage value, returning `None` if it does not conform.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let caps = LINKAGE.captures(value)?;
        Some(LinkageInfo {
            tag: caps.get(1)?.as_str().to_string(),
            occurrence: caps.get(2)?.as_str().to_string(),
            script_id: caps
                .get(3)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            is_reverse: caps.get(4).is_some(),
        })
    }

    /// Whether the occurrence is `00`, meaning no paired field exists.
    #[must_use]
    pub fn is_unpaired(&self) -> bool {
        self.occurrence.bytes().all(|b| b == b'0')
    }
}
