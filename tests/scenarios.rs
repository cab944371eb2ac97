//
// Copyright 2024 bej-codec Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Round-trips the worked scenarios from the property-graph specification:
//! booleans, negative integers, strings, enumerants, arrays, and the
//! annotation dictionary's separate namespace.

mod common;

use bej_codec::{decode, encode, DictionaryView};
use common::{build_dictionary, offset_of, EntrySpec, ARRAY, BOOLEAN, ENUM, INTEGER, NULL, SET, STRING};
use serde_json::json;

/// S1: a single top-level boolean property round-trips.
#[test]
fn scenario_boolean_property() {
    let bytes = build_dictionary(&[
        EntrySpec { format: SET, flags: 0, sequence: 0, child_pointer: offset_of(1), child_count: 1, name: None },
        EntrySpec { format: BOOLEAN, flags: 0, sequence: 0, child_pointer: 0, child_count: 0, name: Some("Ok") },
    ]);
    let schema = DictionaryView::open(&bytes).unwrap();

    let value = json!({ "Ok": true });
    let wire = encode(&value, &schema, None).unwrap();
    let decoded = decode(&wire, &schema, None).unwrap();
    assert_eq!(decoded, value);

    let value = json!({ "Ok": false });
    let wire = encode(&value, &schema, None).unwrap();
    let decoded = decode(&wire, &schema, None).unwrap();
    assert_eq!(decoded, value);
}

/// S2: a negative integer property round-trips through minimal two's
/// complement encoding.
#[test]
fn scenario_negative_integer_property() {
    let bytes = build_dictionary(&[
        EntrySpec { format: SET, flags: 0, sequence: 0, child_pointer: offset_of(1), child_count: 1, name: None },
        EntrySpec { format: INTEGER, flags: 0, sequence: 0, child_pointer: 0, child_count: 0, name: Some("N") },
    ]);
    let schema = DictionaryView::open(&bytes).unwrap();

    let value = json!({ "N": -1 });
    let wire = encode(&value, &schema, None).unwrap();
    let decoded = decode(&wire, &schema, None).unwrap();
    assert_eq!(decoded, value);
}

/// S3: a string property round-trips, including the exact wire shape of its
/// `nnint(len + 1) ++ bytes ++ 0x00` payload.
#[test]
fn scenario_string_property() {
    let bytes = build_dictionary(&[
        EntrySpec { format: SET, flags: 0, sequence: 0, child_pointer: offset_of(1), child_count: 1, name: None },
        EntrySpec { format: STRING, flags: 0, sequence: 0, child_pointer: 0, child_count: 0, name: Some("S") },
    ]);
    let schema = DictionaryView::open(&bytes).unwrap();

    let value = json!({ "S": "hi" });
    let wire = encode(&value, &schema, None).unwrap();
    // The string payload (`nnint(3) ++ "hi" ++ 0x00`) is the last 4 bytes of the stream.
    assert_eq!(&wire[wire.len() - 4..], &[0x03, b'h', b'i', 0x00]);

    let decoded = decode(&wire, &schema, None).unwrap();
    assert_eq!(decoded, value);
}

/// S4: an enum property resolves its name through the enumerant's own
/// sequence number, nested two levels under the enum entry's children.
#[test]
fn scenario_enum_property() {
    let bytes = build_dictionary(&[
        EntrySpec { format: SET, flags: 0, sequence: 0, child_pointer: offset_of(1), child_count: 1, name: None },
        EntrySpec { format: ENUM, flags: 0, sequence: 0, child_pointer: offset_of(2), child_count: 2, name: Some("State") },
        EntrySpec { format: NULL, flags: 0, sequence: 0, child_pointer: 0, child_count: 0, name: Some("Enabled") },
        EntrySpec { format: NULL, flags: 0, sequence: 1, child_pointer: 0, child_count: 0, name: Some("Disabled") },
    ]);
    let schema = DictionaryView::open(&bytes).unwrap();

    let value = json!({ "State": "Disabled" });
    let wire = encode(&value, &schema, None).unwrap();
    let decoded = decode(&wire, &schema, None).unwrap();
    assert_eq!(decoded, value);
}

/// S4 (unknown enumerant): encoding an enumerant the dictionary doesn't know
/// about fails rather than silently coercing to a neighboring sequence.
#[test]
fn scenario_enum_unknown_value_rejected() {
    let bytes = build_dictionary(&[
        EntrySpec { format: SET, flags: 0, sequence: 0, child_pointer: offset_of(1), child_count: 1, name: None },
        EntrySpec { format: ENUM, flags: 0, sequence: 0, child_pointer: offset_of(2), child_count: 1, name: Some("State") },
        EntrySpec { format: NULL, flags: 0, sequence: 0, child_pointer: 0, child_count: 0, name: Some("Enabled") },
    ]);
    let schema = DictionaryView::open(&bytes).unwrap();

    let value = json!({ "State": "Absent" });
    assert!(encode(&value, &schema, None).is_err());
}

/// S5: an array of integers round-trips through its single element template.
#[test]
fn scenario_array_property() {
    let bytes = build_dictionary(&[
        EntrySpec { format: SET, flags: 0, sequence: 0, child_pointer: offset_of(1), child_count: 1, name: None },
        EntrySpec { format: ARRAY, flags: 0, sequence: 0, child_pointer: offset_of(2), child_count: 1, name: Some("Xs") },
        EntrySpec { format: INTEGER, flags: 0, sequence: 0, child_pointer: 0, child_count: 0, name: None },
    ]);
    let schema = DictionaryView::open(&bytes).unwrap();

    let value = json!({ "Xs": [1, 2, 3] });
    let wire = encode(&value, &schema, None).unwrap();
    let decoded = decode(&wire, &schema, None).unwrap();
    assert_eq!(decoded, value);
}

/// S5 (empty array): an empty array still carries its `nnint(0)` count and
/// decodes back to an empty array even without an element template.
#[test]
fn scenario_empty_array_round_trips() {
    let bytes = build_dictionary(&[
        EntrySpec { format: SET, flags: 0, sequence: 0, child_pointer: offset_of(1), child_count: 1, name: None },
        EntrySpec { format: ARRAY, flags: 0, sequence: 0, child_pointer: offset_of(2), child_count: 1, name: Some("Xs") },
        EntrySpec { format: INTEGER, flags: 0, sequence: 0, child_pointer: 0, child_count: 0, name: None },
    ]);
    let schema = DictionaryView::open(&bytes).unwrap();

    let value = json!({ "Xs": [] });
    let wire = encode(&value, &schema, None).unwrap();
    let decoded = decode(&wire, &schema, None).unwrap();
    assert_eq!(decoded, value);
}

/// S6: an `@`-prefixed annotation property is resolved from the annotation
/// dictionary's own root entry set, never the schema dictionary's subset the
/// enclosing SET would otherwise use.
#[test]
fn scenario_annotation_property() {
    let schema_bytes = build_dictionary(&[EntrySpec {
        format: SET,
        flags: 0,
        sequence: 0,
        child_pointer: 0,
        child_count: 0,
        name: None,
    }]);
    let schema = DictionaryView::open(&schema_bytes).unwrap();

    let annot_bytes = build_dictionary(&[EntrySpec {
        format: STRING,
        flags: 0,
        sequence: 7,
        child_pointer: 0,
        child_count: 0,
        name: Some("@odata.type"),
    }]);
    let annot = DictionaryView::open(&annot_bytes).unwrap();

    let value = json!({ "@odata.type": "#Thing.v1.Thing" });
    let wire = encode(&value, &schema, Some(&annot)).unwrap();
    let decoded = decode(&wire, &schema, Some(&annot)).unwrap();
    assert_eq!(decoded, value);
}

/// A nested annotation SET whose own children are not `@`-prefixed still
/// resolves them from the annotation dictionary, because `child_pointer` on
/// the SET entry is an offset into the blob it was read from (the annotation
/// dictionary), not the schema dictionary.
#[test]
fn scenario_nested_annotation_set_with_plain_child_names() {
    let schema_bytes = build_dictionary(&[EntrySpec {
        format: SET,
        flags: 0,
        sequence: 0,
        child_pointer: 0,
        child_count: 0,
        name: None,
    }]);
    let schema = DictionaryView::open(&schema_bytes).unwrap();

    let annot_bytes = build_dictionary(&[
        EntrySpec {
            format: SET,
            flags: 0,
            sequence: 3,
            child_pointer: offset_of(1),
            child_count: 1,
            name: Some("@Redfish.Settings"),
        },
        EntrySpec {
            format: STRING,
            flags: 0,
            sequence: 0,
            child_pointer: 0,
            child_count: 0,
            name: Some("SettingsObject"),
        },
    ]);
    let annot = DictionaryView::open(&annot_bytes).unwrap();

    let value = json!({ "@Redfish.Settings": { "SettingsObject": "foo" } });
    let wire = encode(&value, &schema, Some(&annot)).unwrap();
    let decoded = decode(&wire, &schema, Some(&annot)).unwrap();
    assert_eq!(decoded, value);
}

/// S6 (missing annotation dictionary): an `@`-prefixed key with no annotation
/// dictionary supplied is an unresolved property, not a silent pass-through.
#[test]
fn scenario_annotation_property_without_annotation_dict_is_unresolved() {
    let schema_bytes = build_dictionary(&[EntrySpec {
        format: SET,
        flags: 0,
        sequence: 0,
        child_pointer: 0,
        child_count: 0,
        name: None,
    }]);
    let schema = DictionaryView::open(&schema_bytes).unwrap();

    let value = json!({ "@odata.type": "#Thing.v1.Thing" });
    assert!(encode(&value, &schema, None).is_err());
}

/// A nested SET property round-trips, exercising recursive descent through
/// `encode_properties`/`decode_set` rather than a single flat level.
#[test]
fn scenario_nested_set_property() {
    let bytes = build_dictionary(&[
        EntrySpec { format: SET, flags: 0, sequence: 0, child_pointer: offset_of(1), child_count: 1, name: None },
        EntrySpec { format: SET, flags: 0, sequence: 0, child_pointer: offset_of(2), child_count: 1, name: Some("Inner") },
        EntrySpec { format: BOOLEAN, flags: 0, sequence: 0, child_pointer: 0, child_count: 0, name: Some("Flag") },
    ]);
    let schema = DictionaryView::open(&bytes).unwrap();

    let value = json!({ "Inner": { "Flag": true } });
    let wire = encode(&value, &schema, None).unwrap();
    let decoded = decode(&wire, &schema, None).unwrap();
    assert_eq!(decoded, value);
}

/// An empty top-level object produces the minimal two-byte `nnint(0)`
/// property-count payload and round-trips to an empty object.
#[test]
fn empty_object_round_trips_to_minimal_payload() {
    let bytes = build_dictionary(&[EntrySpec {
        format: SET,
        flags: 0,
        sequence: 0,
        child_pointer: 0,
        child_count: 0,
        name: None,
    }]);
    let schema = DictionaryView::open(&bytes).unwrap();

    let value = json!({});
    let wire = encode(&value, &schema, None).unwrap();
    assert_eq!(&wire[wire.len() - 2..], &[0x01, 0x00]);

    let decoded = decode(&wire, &schema, None).unwrap();
    assert_eq!(decoded, value);
}

/// Integers spanning the minimal-length boundaries (a value needing the full
/// 8 bytes, and one sitting right at a sign-padding edge) round-trip exactly.
#[test]
fn integer_boundaries_round_trip() {
    let bytes = build_dictionary(&[
        EntrySpec { format: SET, flags: 0, sequence: 0, child_pointer: offset_of(1), child_count: 1, name: None },
        EntrySpec { format: INTEGER, flags: 0, sequence: 0, child_pointer: 0, child_count: 0, name: Some("N") },
    ]);
    let schema = DictionaryView::open(&bytes).unwrap();

    for n in [0i64, -1, 127, -128, 255, i32::MAX as i64, i32::MIN as i64] {
        let value = json!({ "N": n });
        let wire = encode(&value, &schema, None).unwrap();
        let decoded = decode(&wire, &schema, None).unwrap();
        assert_eq!(decoded, value, "round-trip failed for {}", n);
    }
}

/// Lenient mode drops an unresolved property and excludes it from the
/// emitted property count, while strict mode (the default) rejects the
/// same document outright.
#[test]
fn lenient_mode_drops_unresolved_property_end_to_end() {
    let bytes = build_dictionary(&[
        EntrySpec { format: SET, flags: 0, sequence: 0, child_pointer: offset_of(1), child_count: 1, name: None },
        EntrySpec { format: BOOLEAN, flags: 0, sequence: 0, child_pointer: 0, child_count: 0, name: Some("Ok") },
    ]);
    let schema = DictionaryView::open(&bytes).unwrap();

    let value = json!({ "Ok": true, "Extra": 1 });
    assert!(encode(&value, &schema, None).is_err());

    let options = bej_codec::EncodeOptions { strict: false };
    let wire = bej_codec::encode_with_options(&value, &schema, None, &options).unwrap();
    let decoded = decode(&wire, &schema, None).unwrap();
    assert_eq!(decoded, json!({ "Ok": true }));
}
