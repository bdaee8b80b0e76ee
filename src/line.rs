//! Classification of raw input lines into fragments.
//!
//! [`LineFormat::classify`] turns one line into a [`RawFragment`] or rejects
//! it with [`MarcError::InvalidLineFormat`]. A fragment is one field
//! occurrence (or the leader) of one record. Rejection is never fatal: the
//! reader logs the line and moves on.

use crate::error::{MarcError, Result};
use crate::format::{is_numeric_tag, LineFormat};
use crate::record::Subfield;
use memchr::memmem;
use smallvec::SmallVec;

/// What a classified line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// The leader pseudo-field
    Leader,
    /// A control field (no indicators or subfields)
    Control,
    /// A data field with indicators and subfields
    Data,
    /// A line with a non-bibliographic tag (e.g. Aleph `FMT`, `CAT`)
    Local,
}

/// One classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    /// Record identifier at the start of the line
    pub record_id: String,
    /// Three-character tag
    pub tag: String,
    /// What the line carries
    pub kind: FragmentKind,
    /// Indicators (two for data fields, none otherwise)
    pub indicators: SmallVec<[char; 2]>,
    /// Content after the fixed columns, as written
    pub content: String,
    /// Parsed subfields (data fields only)
    pub subfields: SmallVec<[Subfield; 4]>,
    /// 1-based line number in the source
    pub line_number: usize,
}

impl RawFragment {
    /// Whether the tag denotes record content: the leader or a numeric tag.
    #[must_use]
    pub fn has_valid_tag(&self) -> bool {
        self.kind != FragmentKind::Local
    }
}

impl LineFormat {
    /// Classify one line (without its line terminator).
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidLineFormat`] if the line is too short, has
    /// an empty record identifier, a malformed tag, or a data field whose
    /// content does not start with the subfield delimiter.
    ///
    /// # Examples
    ///
    /// ```
    /// use marcseq::line::FragmentKind;
    /// use marcseq::LineFormat;
    ///
    /// let format = LineFormat::alephseq();
    /// let fragment = format.classify("000000001 24510 L $$aTitle$$bsub", 1)?;
    /// assert_eq!(fragment.kind, FragmentKind::Data);
    /// assert_eq!(fragment.indicators.as_slice(), &['1', '0']);
    /// assert_eq!(fragment.subfields.len(), 2);
    ///
    /// assert!(format.classify("garbage", 2).is_err());
    /// # Ok::<(), marcseq::MarcError>(())
    /// ```
    pub fn classify(&self, line: &str, line_number: usize) -> Result<RawFragment> {
        let reject = || MarcError::InvalidLineFormat {
            line_number,
            line: line.to_string(),
        };

        let record_id = line.get(..self.id_width).ok_or_else(reject)?.trim();
        if record_id.is_empty() {
            return Err(reject());
        }
        let tag = line
            .get(self.tag_start..self.tag_start + 3)
            .ok_or_else(reject)?;
        if !tag.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(reject());
        }

        let kind = if tag == self.leader_tag {
            FragmentKind::Leader
        } else if self.is_control_tag(tag) {
            FragmentKind::Control
        } else if is_numeric_tag(tag) {
            FragmentKind::Data
        } else {
            FragmentKind::Local
        };

        // Short lines carry empty content; data fields need their columns.
        let content = match line.get(self.content_start..) {
            Some(content) => content,
            None if kind != FragmentKind::Data && line.len() <= self.content_start => "",
            None => return Err(reject()),
        };

        let mut fragment = RawFragment {
            record_id: record_id.to_string(),
            tag: tag.to_string(),
            kind,
            indicators: SmallVec::new(),
            content: content.to_string(),
            subfields: SmallVec::new(),
            line_number,
        };

        match kind {
            FragmentKind::Leader | FragmentKind::Control => {
                fragment.content = self.unfill(content);
            },
            FragmentKind::Data => {
                let indicators = line
                    .get(self.indicator_start..self.indicator_start + 2)
                    .ok_or_else(reject)?;
                fragment.indicators = indicators
                    .chars()
                    .map(|c| if Some(c) == self.blank_fill { ' ' } else { c })
                    .collect();
                if !content.starts_with(self.subfield_delimiter.as_str()) {
                    return Err(reject());
                }
                fragment.subfields = self.split_subfields(content);
            },
            FragmentKind::Local => {},
        }

        Ok(fragment)
    }

    /// Split delimited content into subfields. The first character after each
    /// delimiter is the code; empty segments are skipped. Leftovers of an
    /// overlong delimiter run (`$$$a`) are dropped before the code.
    fn split_subfields(&self, content: &str) -> SmallVec<[Subfield; 4]> {
        let delimiter = self.subfield_delimiter.as_bytes();
        let lead = self.subfield_delimiter.chars().next();
        let starts: Vec<usize> = memmem::find_iter(content.as_bytes(), delimiter)
            .map(|pos| pos + delimiter.len())
            .collect();

        let mut subfields = SmallVec::new();
        for (i, &start) in starts.iter().enumerate() {
            let end = starts
                .get(i + 1)
                .map_or(content.len(), |next| next - delimiter.len());
            // Overlapping matches (e.g. "$$$") leave no segment.
            let Some(segment) = content.get(start..end.max(start)) else {
                continue;
            };
            let segment = match lead {
                Some(lead) => segment.trim_start_matches(lead),
                None => segment,
            };
            let mut chars = segment.chars();
            if let Some(code) = chars.next() {
                subfields.push(Subfield::new(code, chars.as_str()));
            }
        }
        subfields
    }
}
