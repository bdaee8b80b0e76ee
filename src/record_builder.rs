//! Construction of a [`MarcRecord`] from a closed group of fragments.
//!
//! The reader hands over every valid fragment that shared one record
//! identifier. Each leader fragment sets the leader, each control fragment
//! becomes a [`ControlField`](crate::record::ControlField), and each data
//! fragment becomes its own [`DataField`] occurrence: repeated tags are never
//! merged. Tags missing from the registry are kept under the synthetic
//! unknown-field definition.

use crate::line::{FragmentKind, RawFragment};
use crate::record::{DataField, MarcRecord};
use crate::schema::SchemaRegistry;
use crate::validation::{ValidationError, ValidationErrorType};

/// Build a record from fragments sharing `record_id`.
///
/// A record without a leader is still built; it carries a
/// [`ValidationErrorType::MissingLeader`] diagnostic.
#[must_use]
pub fn build_record(
    record_id: &str,
    fragments: Vec<RawFragment>,
    registry: &SchemaRegistry,
) -> MarcRecord {
    let mut record = MarcRecord::new(record_id);

    for fragment in fragments {
        match fragment.kind {
            FragmentKind::Leader => {
                if record.leader().is_some() {
                    tracing::debug!(
                        record_id,
                        line = fragment.line_number,
                        "ignoring repeated leader"
                    );
                } else {
                    record.set_leader(fragment.content);
                }
            },
            FragmentKind::Control => {
                let definition = registry.resolve(&fragment.tag, true);
                record.add_control_field(definition, fragment.content);
            },
            FragmentKind::Data => {
                let definition = registry.resolve(&fragment.tag, false);
                let indicator1 = fragment.indicators.first().copied().unwrap_or(' ');
                let indicator2 = fragment.indicators.get(1).copied().unwrap_or(' ');
                let mut field = DataField::new(definition, indicator1, indicator2);
                field.subfields = fragment.subfields;
                record.add_data_field(field);
            },
            FragmentKind::Local => {},
        }
    }

    if record.leader().is_none() {
        tracing::warn!(record_id, "record does not have a leader");
        record.add_diagnostic(ValidationError::new(
            record_id,
            "LDR",
            ValidationErrorType::MissingLeader,
            "record does not have a leader",
        ));
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::LineFormat;
    use crate::record::Field;

    fn fragments(lines: &[&str]) -> Vec<RawFragment> {
        let format = LineFormat::alephseq();
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| format.classify(line, i + 1).unwrap())
            .collect()
    }

    #[test]
    fn test_build_separates_shapes() {
        let registry = SchemaRegistry::marc21();
        let record = build_record(
            "000000001",
            fragments(&[
                "000000001 LDR   L -----nam^a22-----^a^4500",
                "000000001 001   L 000000001",
                "000000001 24510 L $$aTitle$$cAuthor",
            ]),
            &registry,
        );
        assert_eq!(record.leader(), Some("-----nam a22----- a 4500"));
        assert_eq!(record.control_fields().count(), 1);
        assert_eq!(record.data_fields().count(), 1);
        assert!(record.diagnostics().is_empty());

        let title = record.data_fields().next().unwrap();
        assert_eq!(title.indicator1, '1');
        assert_eq!(title.indicator2, '0');
        assert_eq!(title.definition().label, "Title Statement");
    }

    #[test]
    fn test_repeated_tags_are_separate_occurrences() {
        let registry = SchemaRegistry::marc21();
        let record = build_record(
            "1",
            fragments(&[
                "000000001 650 0 L $$aHistory",
                "000000001 650 0 L $$aPhilosophy$$xEarly works",
            ]),
            &registry,
        );
        let occurrences: Vec<_> = record.data_fields_by_tag("650").collect();
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].subfields.len(), 1);
        assert_eq!(occurrences[1].subfields.len(), 2);
    }

    #[test]
    fn test_unknown_tags_retained() {
        let registry = SchemaRegistry::marc21();
        let record = build_record(
            "1",
            fragments(&[
                "000000001 LDR   L 00000nam",
                "000000001 009   L local control",
                "000000001 59900 L $$aLocal note",
            ]),
            &registry,
        );
        assert_eq!(record.fields().len(), 2);
        assert!(record.fields().iter().all(|f| f.definition().is_unknown()));
        match &record.fields()[1] {
            Field::Data(field) => assert_eq!(field.get_subfield('a'), Some("Local note")),
            Field::Control(_) => panic!("599 should be a data field"),
        }
    }

    #[test]
    fn test_missing_leader_diagnostic() {
        let registry = SchemaRegistry::marc21();
        let record = build_record("7", fragments(&["000000007 001   L 7"]), &registry);
        assert_eq!(record.leader(), None);
        assert_eq!(record.diagnostics().len(), 1);
        assert_eq!(
            record.diagnostics()[0].kind,
            ValidationErrorType::MissingLeader
        );
    }
}
