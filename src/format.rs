//! Line format configuration.
//!
//! A [`LineFormat`] describes where the record identifier, tag, indicators and
//! content sit on each line of a line-oriented MARC export, and how subfields
//! are delimited. The default is the Aleph sequential layout:
//!
//! ```text
//! 000000001 LDR   L -----nam^a22-----^a^4500
//! 000000001 001   L 000000001
//! 000000001 24510 L $$aTitle$$bsubtitle
//! ```
//!
//! Columns are byte offsets into the line. Everything before
//! [`content_start`](LineFormat::content_start) is expected to be ASCII.
//!
//! # Examples
//!
//! ```
//! use marcseq::LineFormat;
//!
//! let format = LineFormat {
//!     subfield_delimiter: "|".to_string(),
//!     ..LineFormat::alephseq()
//! };
//! assert!(format.validate().is_ok());
//! ```

use crate::error::{MarcError, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Column layout and delimiters of a line-oriented MARC format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineFormat {
    /// Width of the record identifier at the start of each line
    pub id_width: usize,
    /// Byte offset of the 3-character tag
    pub tag_start: usize,
    /// Byte offset of the first indicator (the second follows it)
    pub indicator_start: usize,
    /// Byte offset where field content begins
    pub content_start: usize,
    /// Marker preceding every subfield code in data field content
    pub subfield_delimiter: String,
    /// Pseudo-tag carrying the record leader
    pub leader_tag: String,
    /// Character written in place of blanks in fixed-length content
    pub blank_fill: Option<char>,
    /// Numeric tags below this value are control fields
    pub control_field_threshold: u16,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self::alephseq()
    }
}

impl LineFormat {
    /// The Aleph sequential layout.
    #[must_use]
    pub fn alephseq() -> Self {
        LineFormat {
            id_width: 9,
            tag_start: 10,
            indicator_start: 13,
            content_start: 18,
            subfield_delimiter: "$$".to_string(),
            leader_tag: "LDR".to_string(),
            blank_fill: Some('^'),
            control_field_threshold: 10,
        }
    }

    /// Load a format from a JSON document. Missing keys take the Aleph
    /// sequential defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the resulting layout is
    /// inconsistent.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let format: LineFormat = serde_json::from_reader(reader)?;
        format.validate()?;
        Ok(format)
    }

    /// Check that the columns do not overlap.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::ConfigError`] describing the first inconsistency.
    pub fn validate(&self) -> Result<()> {
        if self.id_width == 0 {
            return Err(MarcError::ConfigError(
                "record identifier width must be positive".to_string(),
            ));
        }
        if self.tag_start < self.id_width {
            return Err(MarcError::ConfigError(format!(
                "tag column {} overlaps the record identifier (width {})",
                self.tag_start, self.id_width
            )));
        }
        if self.indicator_start < self.tag_start + 3 {
            return Err(MarcError::ConfigError(format!(
                "indicator column {} overlaps the tag",
                self.indicator_start
            )));
        }
        if self.content_start < self.indicator_start + 2 {
            return Err(MarcError::ConfigError(format!(
                "content column {} overlaps the indicators",
                self.content_start
            )));
        }
        if self.subfield_delimiter.is_empty() {
            return Err(MarcError::ConfigError(
                "subfield delimiter must not be empty".to_string(),
            ));
        }
        if self.leader_tag.len() != 3 {
            return Err(MarcError::ConfigError(format!(
                "leader tag {:?} must be 3 characters",
                self.leader_tag
            )));
        }
        Ok(())
    }

    /// Whether `tag` is a numeric tag below the control field threshold.
    #[must_use]
    pub fn is_control_tag(&self, tag: &str) -> bool {
        is_numeric_tag(tag)
            && tag
                .parse::<u16>()
                .is_ok_and(|n| n < self.control_field_threshold)
    }

    /// Replace the blank fill character with spaces.
    #[must_use]
    pub fn unfill(&self, content: &str) -> String {
        match self.blank_fill {
            Some(fill) => content.replace(fill, " "),
            None => content.to_string(),
        }
    }
}

/// Whether `tag` consists of exactly three ASCII digits.
#[must_use]
pub fn is_numeric_tag(tag: &str) -> bool {
    tag.len() == 3 && tag.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_alephseq() {
        assert_eq!(LineFormat::default(), LineFormat::alephseq());
        assert!(LineFormat::default().validate().is_ok());
    }

    #[test]
    fn test_control_tag_threshold() {
        let format = LineFormat::alephseq();
        assert!(format.is_control_tag("001"));
        assert!(format.is_control_tag("008"));
        assert!(!format.is_control_tag("010"));
        assert!(!format.is_control_tag("245"));
        assert!(!format.is_control_tag("LDR"));
        assert!(!format.is_control_tag("00"));
    }

    #[test]
    fn test_unfill() {
        let format = LineFormat::alephseq();
        assert_eq!(format.unfill("nam^a22^"), "nam a22 ");

        let plain = LineFormat {
            blank_fill: None,
            ..LineFormat::alephseq()
        };
        assert_eq!(plain.unfill("nam^a"), "nam^a");
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let format = LineFormat {
            tag_start: 5,
            ..LineFormat::alephseq()
        };
        assert!(matches!(format.validate(), Err(MarcError::ConfigError(_))));

        let format = LineFormat {
            subfield_delimiter: String::new(),
            ..LineFormat::alephseq()
        };
        assert!(format.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let json = br#"{"subfield_delimiter": "|", "blank_fill": null}"#;
        let format = LineFormat::from_json_reader(&json[..]).unwrap();
        assert_eq!(format.subfield_delimiter, "|");
        assert_eq!(format.blank_fill, None);
        assert_eq!(format.id_width, 9);
    }
}
