//! Property tests for record assembly and extraction

mod common;

use common::{line, reader};
use marcseq::{extract, KeyPolicy};
use proptest::prelude::*;

/// Maximal runs of equal consecutive identifiers.
fn runs(ids: &[u8]) -> Vec<(u8, usize)> {
    let mut runs: Vec<(u8, usize)> = Vec::new();
    for &id in ids {
        match runs.last_mut() {
            Some((last, n)) if *last == id => *n += 1,
            _ => runs.push((id, 1)),
        }
    }
    runs
}

fn value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 .,:]{1,16}"
}

proptest! {
    #[test]
    fn prop_one_record_per_identifier_run(
        lines in prop::collection::vec((1u8..4, prop::collection::vec(value(), 1..4)), 0..40)
    ) {
        let data: String = lines
            .iter()
            .map(|(id, values)| {
                let content: String = values.iter().map(|v| format!("$$a{v}")).collect();
                line(&id.to_string(), "500", "  ", &content)
            })
            .collect();
        let records = reader(&data).read_all().unwrap();

        let ids: Vec<u8> = lines.iter().map(|(id, _)| *id).collect();
        let expected = runs(&ids);
        prop_assert_eq!(records.len(), expected.len());
        for (record, (id, len)) in records.iter().zip(&expected) {
            prop_assert_eq!(record.record_id(), format!("{id:09}"));
            prop_assert_eq!(record.fields().len(), *len);
        }

        // No subfield is lost, reordered or merged.
        let read: Vec<&str> = records.iter().flat_map(|r| r.subfield_values("500", 'a')).collect();
        let written: Vec<&str> = lines.iter().flat_map(|(_, v)| v.iter().map(String::as_str)).collect();
        prop_assert_eq!(read, written);
    }

    #[test]
    fn prop_rejected_lines_do_not_move_boundaries(
        lines in prop::collection::vec((1u8..4, value(), any::<bool>()), 1..30)
    ) {
        let mut clean = String::new();
        let mut noisy = String::new();
        for (id, v, junk) in &lines {
            let l = line(&id.to_string(), "245", "00", &format!("$$a{v}"));
            clean.push_str(&l);
            noisy.push_str(&l);
            if *junk {
                noisy.push_str("garbage line\n");
            }
        }

        let mut noisy_reader = reader(&noisy);
        let from_noisy = noisy_reader.read_all().unwrap();
        let from_clean = reader(&clean).read_all().unwrap();
        prop_assert_eq!(from_noisy.len(), from_clean.len());
        for (a, b) in from_noisy.iter().zip(&from_clean) {
            prop_assert_eq!(a.record_id(), b.record_id());
            prop_assert_eq!(a.fields(), b.fields());
        }
        let junk = lines.iter().filter(|(_, _, junk)| *junk).count();
        prop_assert_eq!(noisy_reader.lines_rejected(), junk);
    }

    #[test]
    fn prop_extraction_keeps_every_value(
        values in prop::collection::vec(value(), 1..20)
    ) {
        let data: String = values
            .iter()
            .map(|v| line("7", "650", " 0", &format!("$$a{v}$$xsub")))
            .collect();
        let record = reader(&data).read_record().unwrap().unwrap();

        for policy in [KeyPolicy::Raw, KeyPolicy::Human, KeyPolicy::Mixed] {
            let map = extract(&record, policy);
            let total: usize = map.values().map(Vec::len).sum();
            // Per occurrence: two indicators and two subfields.
            prop_assert_eq!(total, values.len() * 4);
            prop_assert_eq!(&map, &extract(&record, policy));
        }
    }
}
