//! Built-in MARC 21 definitions.
//!
//! A representative subset of the MARC 21 bibliographic format: the common
//! control fields, identifiers, main entry, title, edition, imprint,
//! description, notes, subjects, added entries, links and foreign MARC
//! information. Full coverage is expected to come from a JSON registry loaded
//! with [`SchemaRegistry::from_json_reader`].
//!
//! Version marks use `1.0` for the base format. Field 370 is introduced in
//! `1.1`; obsolete subfields carry `retired: 1.0`.

use crate::schema::{
    Cardinality::{NonRepeatable as NR, Repeatable as R},
    CodeList, ContentParser, FieldDefinition, IndicatorDefinition, SchemaRegistry,
    SchemaVersion, SubfieldDefinition, VersionRange,
};
use std::sync::Arc;

const BASE: SchemaVersion = SchemaVersion::new(1, 0);

fn since(version: SchemaVersion) -> VersionRange {
    VersionRange {
        introduced: Some(version),
        retired: None,
    }
}

fn obsolete() -> VersionRange {
    VersionRange {
        introduced: None,
        retired: Some(BASE),
    }
}

fn linkage() -> SubfieldDefinition {
    SubfieldDefinition::new('6', "Linkage", "linkage", NR).content_parser(ContentParser::Linkage)
}

fn field_link() -> SubfieldDefinition {
    SubfieldDefinition::new('8', "Field link and sequence number", "fieldLink", R)
}

fn subject_sources() -> Arc<CodeList> {
    Arc::new(CodeList::new(
        "Subject Heading and Term Source Codes",
        &[
            ("aat", "Art & architecture thesaurus"),
            ("fast", "Faceted application of subject terminology"),
            ("gnd", "Gemeinsame Normdatei"),
            ("lcsh", "Library of Congress subject headings"),
            ("mesh", "Medical subject headings"),
            ("nal", "National Agricultural Library subject authority file"),
            ("rvm", "Répertoire de vedettes-matière"),
            ("tgn", "Getty thesaurus of geographic names"),
        ],
    ))
}

fn format_sources() -> Arc<CodeList> {
    Arc::new(CodeList::new(
        "Format Source Codes",
        &[
            ("blmarc", "British Library MARC"),
            ("cmarc", "Chinese MARC"),
            ("danmarc2", "danMARC2"),
            ("ibermarc", "IBERMARC"),
            ("intermrc", "INTERMARC"),
            ("normarc", "NORMARC"),
            ("pica", "Pica"),
            ("ukmarc", "UK MARC"),
            ("unimarc", "UNIMARC"),
        ],
    ))
}

fn musical_composition_sources() -> Arc<CodeList> {
    Arc::new(CodeList::new(
        "Musical Composition Source Codes",
        &[
            ("iamlmf", "International Association of Music Libraries Musical forms codes"),
            ("marcmuscomp", "MARC Form of Musical Composition Code List"),
        ],
    ))
}

fn name_forename_surname() -> IndicatorDefinition {
    IndicatorDefinition::new("Type of personal name entry element", "type").codes(&[
        ("0", "Forename"),
        ("1", "Surname"),
        ("3", "Family name"),
    ])
}

fn thesaurus() -> IndicatorDefinition {
    IndicatorDefinition::new("Thesaurus", "thesaurus").codes(&[
        ("0", "Library of Congress Subject Headings"),
        ("1", "LC subject headings for children's literature"),
        ("2", "Medical Subject Headings"),
        ("3", "National Agricultural Library subject authority file"),
        ("4", "Source not specified"),
        ("5", "Canadian Subject Headings"),
        ("6", "Répertoire de vedettes-matière"),
        ("7", "Source specified in subfield $2"),
    ])
}

fn nonfiling() -> IndicatorDefinition {
    IndicatorDefinition::new("Nonfiling characters", "nonfilingCharacters").codes(&[
        ("0", "No nonfiling characters"),
        ("1", "Number of nonfiling characters"),
        ("2", "Number of nonfiling characters"),
        ("3", "Number of nonfiling characters"),
        ("4", "Number of nonfiling characters"),
        ("5", "Number of nonfiling characters"),
        ("6", "Number of nonfiling characters"),
        ("7", "Number of nonfiling characters"),
        ("8", "Number of nonfiling characters"),
        ("9", "Number of nonfiling characters"),
    ])
}

#[allow(clippy::too_many_lines)]
fn definitions() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::control("001", "Control Number", "ControlNumber", NR),
        FieldDefinition::control(
            "003",
            "Control Number Identifier",
            "ControlNumberIdentifier",
            NR,
        ),
        FieldDefinition::control(
            "005",
            "Date and Time of Latest Transaction",
            "LatestTransactionTime",
            NR,
        ),
        FieldDefinition::control("006", "Additional Material Characteristics", "AdditionalMaterial", R),
        FieldDefinition::control("007", "Physical Description Fixed Field", "PhysicalDescription", R),
        FieldDefinition::control("008", "General Information", "GeneralInformation", NR),
        FieldDefinition::data("020", "International Standard Book Number", "ISBN", R)
            .subfield(SubfieldDefinition::new('a', "International Standard Book Number", "isbn", NR))
            .subfield(SubfieldDefinition::new('c', "Terms of availability", "termsOfAvailability", NR))
            .subfield(SubfieldDefinition::new('q', "Qualifying information", "qualifyingInformation", R))
            .subfield(SubfieldDefinition::new('z', "Canceled/invalid ISBN", "invalid", R))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("041", "Language Code", "Language", R)
            .indicator1(IndicatorDefinition::new("Translation indication", "translationIndication").codes(&[
                ("#", "No information provided"),
                ("0", "Item not a translation/does not include a translation"),
                ("1", "Item is or includes a translation"),
            ]))
            .indicator2(IndicatorDefinition::new("Source of code", "sourceOfCode").codes(&[
                ("#", "MARC language code"),
                ("7", "Source specified in subfield $2"),
            ]))
            .subfield(SubfieldDefinition::new('a', "Language code of text/sound track or separate title", "languageOfText", R))
            .subfield(SubfieldDefinition::new('h', "Language code of original", "languageOfOriginal", R))
            .subfield(SubfieldDefinition::new('2', "Source of code", "source", NR))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("047", "Form of Musical Composition Code", "FormOfMusicalComposition", R)
            .indicator2(IndicatorDefinition::new("Source of code", "sourceOfCode").codes(&[
                ("#", "MARC musical composition code"),
                ("7", "Source specified in subfield $2"),
            ]))
            .subfield(SubfieldDefinition::new('a', "Form of musical composition code", "code", R))
            .subfield(
                SubfieldDefinition::new('2', "Source of code", "source", NR)
                    .code_list(musical_composition_sources()),
            )
            .subfield(field_link()),
        FieldDefinition::data("100", "Main Entry - Personal Name", "MainPersonalName", NR)
            .indicator1(name_forename_surname())
            .subfield(SubfieldDefinition::new('a', "Personal name", "personalName", NR))
            .subfield(SubfieldDefinition::new('b', "Numeration", "numeration", NR))
            .subfield(SubfieldDefinition::new('c', "Titles and words associated with a name", "titlesAndWords", R))
            .subfield(SubfieldDefinition::new('d', "Dates associated with a name", "dates", NR))
            .subfield(SubfieldDefinition::new('e', "Relator term", "relatorTerm", R))
            .subfield(SubfieldDefinition::new('0', "Authority record control number", "authorityRecordControlNumber", R))
            .subfield(SubfieldDefinition::new('4', "Relationship", "relationship", R))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("245", "Title Statement", "Title", NR)
            .indicator1(IndicatorDefinition::new("Title added entry", "titleAddedEntry").codes(&[
                ("0", "No added entry"),
                ("1", "Added entry"),
            ]))
            .indicator2(nonfiling())
            .subfield(SubfieldDefinition::new('a', "Title", "mainTitle", NR))
            .subfield(SubfieldDefinition::new('b', "Remainder of title", "subtitle", NR))
            .subfield(SubfieldDefinition::new('c', "Statement of responsibility", "responsibilityStatement", NR))
            .subfield(SubfieldDefinition::new('f', "Inclusive dates", "inclusiveDates", NR))
            .subfield(SubfieldDefinition::new('g', "Bulk dates", "bulkDates", NR))
            .subfield(SubfieldDefinition::new('h', "Medium", "medium", NR))
            .subfield(SubfieldDefinition::new('k', "Form", "form", R))
            .subfield(SubfieldDefinition::new('n', "Number of part/section of a work", "partNumber", R))
            .subfield(SubfieldDefinition::new('p', "Name of part/section of a work", "partName", R))
            .subfield(SubfieldDefinition::new('s', "Version", "version", NR))
            .subfield(SubfieldDefinition::new('d', "Designation of section/part/series", "designation", NR).versions(obsolete()))
            .subfield(SubfieldDefinition::new('e', "Name of part/section/series", "partSeries", NR).versions(obsolete()))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("250", "Edition Statement", "Edition", R)
            .subfield(SubfieldDefinition::new('a', "Edition statement", "editionStatement", NR))
            .subfield(SubfieldDefinition::new('b', "Remainder of edition statement", "remainder", NR))
            .subfield(SubfieldDefinition::new('3', "Materials specified", "materialsSpecified", NR))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("260", "Publication, Distribution, etc. (Imprint)", "Publication", R)
            .indicator1(IndicatorDefinition::new("Sequence of publishing statements", "sequenceOfStatements").codes(&[
                ("#", "Not applicable/No information provided/Earliest available publisher"),
                ("2", "Intervening publisher"),
                ("3", "Current/latest publisher"),
            ]))
            .subfield(SubfieldDefinition::new('a', "Place of publication, distribution, etc.", "place", R))
            .subfield(SubfieldDefinition::new('b', "Name of publisher, distributor, etc.", "agent", R))
            .subfield(SubfieldDefinition::new('c', "Date of publication, distribution, etc.", "date", R))
            .subfield(SubfieldDefinition::new('3', "Materials specified", "materialsSpecified", NR))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("300", "Physical Description", "PhysicalDescription", R)
            .subfield(SubfieldDefinition::new('a', "Extent", "extent", R))
            .subfield(SubfieldDefinition::new('b', "Other physical details", "otherPhysicalDetails", NR))
            .subfield(SubfieldDefinition::new('c', "Dimensions", "dimensions", R))
            .subfield(SubfieldDefinition::new('e', "Accompanying material", "accompanyingMaterial", NR))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("370", "Associated Place", "AssociatedPlace", R)
            .versions(since(SchemaVersion::new(1, 1)))
            .subfield(SubfieldDefinition::new('c', "Associated country", "country", R))
            .subfield(SubfieldDefinition::new('f', "Other associated place", "otherPlace", R))
            .subfield(SubfieldDefinition::new('g', "Place of origin of work or expression", "placeOfOrigin", R))
            .subfield(SubfieldDefinition::new('s', "Start period", "startPeriod", NR))
            .subfield(SubfieldDefinition::new('t', "End period", "endPeriod", NR))
            .subfield(SubfieldDefinition::new('u', "Uniform Resource Identifier", "uri", R))
            .subfield(SubfieldDefinition::new('0', "Authority record control number or standard number", "authorityRecordControlNumber", R))
            .subfield(SubfieldDefinition::new('2', "Source of term", "source", NR).code_list(subject_sources()))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("500", "General Note", "GeneralNote", R)
            .subfield(SubfieldDefinition::new('a', "General note", "value", NR))
            .subfield(SubfieldDefinition::new('3', "Materials specified", "materialsSpecified", NR))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("502", "Dissertation Note", "DissertationNote", R)
            .subfield(SubfieldDefinition::new('a', "Dissertation note", "rdf:value", NR))
            .subfield(SubfieldDefinition::new('b', "Degree type", "degree", NR))
            .subfield(SubfieldDefinition::new('c', "Name of granting institution", "grantingInstitution", NR))
            .subfield(SubfieldDefinition::new('d', "Year degree granted", "date", NR))
            .subfield(SubfieldDefinition::new('g', "Miscellaneous information", "note", R))
            .subfield(SubfieldDefinition::new('o', "Dissertation identifier", "identifiedBy", R))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("504", "Bibliography, Etc. Note", "Bibliography", R)
            .subfield(SubfieldDefinition::new('a', "Bibliography, etc. note", "rdf:value", NR))
            .subfield(SubfieldDefinition::new('b', "Number of references", "numberOfReferences", NR))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("650", "Subject Added Entry - Topical Term", "Topic", R)
            .indicator1(IndicatorDefinition::new("Level of subject", "level").codes(&[
                ("#", "No information provided"),
                ("0", "No level specified"),
                ("1", "Primary"),
                ("2", "Secondary"),
            ]))
            .indicator2(thesaurus())
            .subfield(SubfieldDefinition::new('a', "Topical term or geographic name entry element", "topicalTerm", NR))
            .subfield(SubfieldDefinition::new('v', "Form subdivision", "formSubdivision", R))
            .subfield(SubfieldDefinition::new('x', "General subdivision", "generalSubdivision", R))
            .subfield(SubfieldDefinition::new('y', "Chronological subdivision", "chronologicalSubdivision", R))
            .subfield(SubfieldDefinition::new('z', "Geographic subdivision", "geographicSubdivision", R))
            .subfield(SubfieldDefinition::new('0', "Authority record control number", "authorityRecordControlNumber", R))
            .subfield(SubfieldDefinition::new('2', "Source of heading or term", "source", NR).code_list(subject_sources()))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("700", "Added Entry - Personal Name", "AddedPersonalName", R)
            .indicator1(name_forename_surname())
            .indicator2(IndicatorDefinition::new("Type of added entry", "type").codes(&[
                ("#", "No information provided"),
                ("2", "Analytical entry"),
            ]))
            .subfield(SubfieldDefinition::new('a', "Personal name", "personalName", NR))
            .subfield(SubfieldDefinition::new('d', "Dates associated with a name", "dates", NR))
            .subfield(SubfieldDefinition::new('e', "Relator term", "relatorTerm", R))
            .subfield(SubfieldDefinition::new('t', "Title of a work", "titleOfAWork", NR))
            .subfield(SubfieldDefinition::new('0', "Authority record control number", "authorityRecordControlNumber", R))
            .subfield(SubfieldDefinition::new('4', "Relationship", "relationship", R))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("856", "Electronic Location and Access", "ElectronicLocationAndAccess", R)
            .indicator1(IndicatorDefinition::new("Access method", "accessMethod").codes(&[
                ("#", "No information provided"),
                ("0", "Email"),
                ("1", "FTP"),
                ("2", "Remote login (Telnet)"),
                ("3", "Dial-up"),
                ("4", "HTTP"),
                ("7", "Method specified in subfield $2"),
            ]))
            .indicator2(IndicatorDefinition::new("Relationship", "relationship").codes(&[
                ("#", "No information provided"),
                ("0", "Resource"),
                ("1", "Version of resource"),
                ("2", "Related resource"),
                ("8", "No display constant generated"),
            ]))
            .subfield(SubfieldDefinition::new('u', "Uniform Resource Identifier", "uri", R))
            .subfield(SubfieldDefinition::new('y', "Link text", "linkText", R))
            .subfield(SubfieldDefinition::new('z', "Public note", "publicNote", R))
            .subfield(SubfieldDefinition::new('3', "Materials specified", "materialsSpecified", NR))
            .subfield(linkage())
            .subfield(field_link()),
        FieldDefinition::data("880", "Alternate Graphic Representation", "AlternateGraphicRepresentation", R)
            .indicator1(IndicatorDefinition::new("Same as associated field", "same").codes(&[
                ("#", "Same as associated field"),
                ("0", "Same as associated field"),
                ("1", "Same as associated field"),
                ("2", "Same as associated field"),
                ("3", "Same as associated field"),
            ]))
            .indicator2(IndicatorDefinition::new("Same as associated field", "same").codes(&[
                ("#", "Same as associated field"),
                ("0", "Same as associated field"),
                ("1", "Same as associated field"),
                ("2", "Same as associated field"),
                ("7", "Same as associated field"),
            ]))
            .subfield(linkage())
            .subfield(SubfieldDefinition::new('a', "Same as associated field", "a", R))
            .subfield(SubfieldDefinition::new('b', "Same as associated field", "b", R))
            .subfield(SubfieldDefinition::new('c', "Same as associated field", "c", R)),
        foreign_marc_information(),
    ]
}

fn foreign_marc_information() -> FieldDefinition {
    let mut definition = FieldDefinition::data("886", "Foreign MARC Information Field", "ForeignMARCInformationField", R)
        .indicator1(IndicatorDefinition::new("Type of field", "typeOfField").codes(&[
            ("0", "Leader"),
            ("1", "Variable control fields (002-009)"),
            ("2", "Variable data fields (010-999)"),
        ]))
        .subfield(SubfieldDefinition::new('a', "Tag of the foreign MARC field", "tag", NR))
        .subfield(SubfieldDefinition::new('b', "Content of the foreign MARC field", "content", NR))
        .subfield(SubfieldDefinition::new('2', "Source of data", "source", NR).code_list(format_sources()))
        .subfield(SubfieldDefinition::new('c', "Content of the foreign MARC control fields 002-009", "controlContent", NR).versions(obsolete()))
        .subfield(SubfieldDefinition::new('d', "Content designators and data elements of the foreign MARC variable fields", "variableContent", NR).versions(obsolete()));

    // Foreign subfields a-z and 0-9 not already defined above.
    for code in ('a'..='z').chain('0'..='9') {
        if definition.get_subfield(code).is_none() {
            definition = definition.subfield(SubfieldDefinition::new(code, "Foreign MARC subfield", "foreignSubfield", R));
        }
    }
    definition
}

impl SchemaRegistry {
    /// Registry with the built-in MARC 21 subset.
    ///
    /// # Panics
    ///
    /// Never in practice: the built-in definitions are checked by this
    /// module's tests.
    #[must_use]
    pub fn marc21() -> Self {
        SchemaRegistry::from_definitions(definitions())
            .unwrap_or_else(|e| panic!("built-in MARC 21 definitions are invalid: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Cardinality;

    #[test]
    fn test_builtin_definitions_register() {
        let registry = SchemaRegistry::from_definitions(definitions()).unwrap();
        assert_eq!(registry.len(), definitions().len());
    }

    #[test]
    fn test_control_fields_are_marked() {
        let registry = SchemaRegistry::marc21();
        for tag in ["001", "003", "005", "006", "007", "008"] {
            assert!(registry.lookup(tag).unwrap().is_control_field, "{tag}");
        }
        assert!(!registry.lookup("245").unwrap().is_control_field);
    }

    #[test]
    fn test_title_definition() {
        let registry = SchemaRegistry::marc21();
        let title = registry.lookup("245").unwrap();
        assert_eq!(title.mq_label, "Title");
        assert_eq!(title.cardinality, Cardinality::NonRepeatable);
        assert_eq!(title.get_subfield('a').unwrap().mq_label, "mainTitle");
        assert!(!title.get_subfield('d').unwrap().versions.contains(BASE));
    }

    #[test]
    fn test_foreign_subfields_fill_gaps() {
        let registry = SchemaRegistry::marc21();
        let def = registry.lookup("886").unwrap();
        assert_eq!(def.get_subfield('a').unwrap().label, "Tag of the foreign MARC field");
        assert_eq!(def.get_subfield('k').unwrap().label, "Foreign MARC subfield");
        assert_eq!(def.get_subfield('7').unwrap().cardinality, Cardinality::Repeatable);
        assert!(def.get_subfield('2').unwrap().code_list.is_some());
    }
}
