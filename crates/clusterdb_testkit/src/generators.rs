//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use clusterdb_core::Record;
use proptest::prelude::*;
use serde_json::{Number, Value};

/// Strategy for generating valid database and cluster names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_-]{0,31}").expect("Invalid regex")
}

/// Strategy for generating field names.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex")
}

/// Strategy for generating scalar JSON values.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        // Quarter steps survive a text round trip exactly
        (-4000i32..4000).prop_map(|n| {
            Number::from_f64(f64::from(n) / 4.0).map_or(Value::Null, Value::Number)
        }),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
    ]
}

/// Strategy for generating JSON values nested up to two levels deep.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec((key_strategy(), inner), 0..4)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

/// Strategy for generating records with up to `max_fields` fields.
pub fn record_strategy(max_fields: usize) -> impl Strategy<Value = Record> {
    prop::collection::vec((key_strategy(), value_strategy()), 0..=max_fields)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Strategy for generating lists of pairwise distinct records.
pub fn distinct_records_strategy(max_records: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(record_strategy(4), 0..=max_records).prop_map(|records| {
        let mut distinct: Vec<Record> = Vec::with_capacity(records.len());
        for record in records {
            if !distinct.contains(&record) {
                distinct.push(record);
            }
        }
        distinct
    })
}
