//! Records, patches, and predicates.
//!
//! A record is a JSON object. Records have no identity of their own: two
//! records are the same record when their parsed values are structurally
//! equal, regardless of key order. Numbers compare by value, so `21` and
//! `21.0` are the same number.

use crate::error::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// A single entry in a cluster: a JSON object.
///
/// Key order is preserved as read from the cluster file.
pub type Record = Map<String, Value>;

/// Fields to merge into matching records by [`crate::Store::update`].
pub type Patch = Map<String, Value>;

/// Selects records for query, update, and delete.
///
/// Any `Fn(&Record) -> bool` is a predicate:
///
/// ```rust
/// use clusterdb_core::{Predicate, Record};
///
/// let adults = |r: &Record| r.get("age").and_then(|v| v.as_u64()).is_some_and(|a| a >= 18);
/// assert!(!adults.matches(&Record::new()));
/// ```
pub trait Predicate {
    /// Returns true if `record` is selected.
    fn matches(&self, record: &Record) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&Record) -> bool,
{
    fn matches(&self, record: &Record) -> bool {
        self(record)
    }
}

/// A predicate selecting every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct All;

impl Predicate for All {
    fn matches(&self, _record: &Record) -> bool {
        true
    }
}

/// Shallow-merges `patch` into `record`.
///
/// Each patch key overwrites the field of the same name or is appended when
/// absent. Fields not named by the patch are left untouched, as are nested
/// values: a patched object replaces the old one wholesale.
pub fn apply_patch(record: &mut Record, patch: &Patch) {
    for (key, value) in patch {
        record.insert(key.clone(), value.clone());
    }
}

/// Returns true if any top-level string or number field of `record`
/// contains `needle`.
///
/// Numbers are compared through their shortest rendering (`21`, `2.5`); an
/// integral float such as `2.0` renders as `2`. Booleans, nulls, and nested
/// objects or arrays never match.
pub fn contains_text(record: &Record, needle: &str) -> bool {
    record.values().any(|value| match value {
        Value::String(s) => s.contains(needle),
        Value::Number(n) => number_text(n).contains(needle),
        _ => false,
    })
}

/// Returns true if `a` and `b` hold the same fields with the same values.
///
/// Key order is ignored at every depth, and numbers compare by their
/// normalized rendering (see [`contains_text`]).
#[must_use]
pub fn same_record(a: &Record, b: &Record) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| same_value(value, other)))
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => number_text(x) == number_text(y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(x), Value::Object(y)) => same_record(x, y),
        _ => a == b,
    }
}

/// Largest integer every f64 below it represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Renders `n` with integral floats in the safe range written as integers.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            // Exact: f is integral and well within i64 range
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Converts a serializable value into a record.
///
/// # Errors
///
/// Returns `InvalidRecord` if `value` does not serialize to a JSON object,
/// or `Codec` if serialization fails.
pub fn to_record<T: Serialize + ?Sized>(value: &T) -> CoreResult<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::InvalidRecord {
            found: json_type(&other),
        }),
    }
}

/// Converts a record into a typed value.
///
/// # Errors
///
/// Returns `Codec` if the record does not match `T`.
pub fn from_record<T: DeserializeOwned>(record: Record) -> CoreResult<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn patch_overwrites_and_adds() {
        let mut r = record(json!({"name": "shashank", "age": 21, "city": "A"}));
        let patch = record(json!({"city": "X", "phone": 9876543299u64}));

        apply_patch(&mut r, &patch);

        assert_eq!(
            r,
            record(json!({"name": "shashank", "age": 21, "city": "X", "phone": 9876543299u64}))
        );
        // Existing keys keep their position, new keys are appended
        let keys: Vec<&str> = r.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "age", "city", "phone"]);
    }

    #[test]
    fn patch_is_shallow() {
        let mut r = record(json!({"address": {"city": "A", "zip": "1"}}));
        apply_patch(&mut r, &record(json!({"address": {"city": "B"}})));

        assert_eq!(r, record(json!({"address": {"city": "B"}})));
    }

    #[test]
    fn empty_patch_is_noop() {
        let mut r = record(json!({"a": 1}));
        apply_patch(&mut r, &Patch::new());
        assert_eq!(r, record(json!({"a": 1})));
    }

    #[test]
    fn search_matches_strings_and_numbers() {
        let r = record(json!({"name": "shashank", "age": 21}));

        assert!(contains_text(&r, "has"));
        assert!(contains_text(&r, "21"));
        assert!(contains_text(&r, "2"));
        assert!(!contains_text(&r, "rahul"));
    }

    #[test]
    fn search_ignores_other_types_and_nesting() {
        let r = record(json!({
            "active": true,
            "nothing": null,
            "tags": ["shashank"],
            "profile": {"name": "shashank"}
        }));

        assert!(!contains_text(&r, "true"));
        assert!(!contains_text(&r, "null"));
        assert!(!contains_text(&r, "shashank"));
    }

    #[test]
    fn integral_floats_search_as_integers() {
        let r: Record = serde_json::from_str(r#"{"price":2.0}"#).unwrap();
        assert!(contains_text(&r, "2"));
        assert!(!contains_text(&r, "0"));
        assert!(!contains_text(&r, "."));

        let r: Record = serde_json::from_str(r#"{"price":2.5,"big":1e300}"#).unwrap();
        assert!(contains_text(&r, "2.5"));
        assert!(contains_text(&r, "e"));
    }

    #[test]
    fn structural_equality_ignores_key_order() {
        let a: Record = serde_json::from_str(r#"{"name":"a","age":1}"#).unwrap();
        let b: Record = serde_json::from_str(r#"{"age":1,"name":"a"}"#).unwrap();
        assert_eq!(a, b);
        assert!(same_record(&a, &b));
    }

    #[test]
    fn same_record_normalizes_numbers() {
        let int: Record = serde_json::from_str(r#"{"age":21,"tags":[1],"at":{"x":-0}}"#).unwrap();
        let float: Record =
            serde_json::from_str(r#"{"tags":[1.0],"at":{"x":-0.0},"age":21.0}"#).unwrap();
        assert!(same_record(&int, &float));

        let other: Record =
            serde_json::from_str(r#"{"age":21.5,"tags":[1],"at":{"x":0}}"#).unwrap();
        assert!(!same_record(&int, &other));

        let extra: Record = serde_json::from_str(r#"{"age":21}"#).unwrap();
        assert!(!same_record(&int, &extra));
        assert!(!same_record(&extra, &int));
    }

    #[test]
    fn same_record_keeps_types_apart() {
        let number = record(json!({"v": 1}));
        let text = record(json!({"v": "1"}));
        let flag = record(json!({"v": true}));
        assert!(!same_record(&number, &text));
        assert!(!same_record(&number, &flag));
        assert!(same_record(&text, &text.clone()));
    }

    #[test]
    fn closures_and_all_are_predicates() {
        let r = record(json!({"age": 21}));
        let is_21 = |r: &Record| r.get("age") == Some(&json!(21));

        assert!(is_21.matches(&r));
        assert!(All.matches(&r));
        assert!(!(|_: &Record| false).matches(&r));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        age: u32,
    }

    #[test]
    fn typed_conversion() {
        let user = User {
            name: "rahul".into(),
            age: 21,
        };
        let r = to_record(&user).unwrap();
        assert_eq!(r, record(json!({"name": "rahul", "age": 21})));

        let back: User = from_record(r).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn non_object_is_invalid_record() {
        let result = to_record(&vec![1, 2, 3]);
        assert!(matches!(
            result,
            Err(CoreError::InvalidRecord { found: "array" })
        ));

        let result: CoreResult<User> = from_record(record(json!({"name": "x"})));
        assert!(matches!(result, Err(CoreError::Codec(_))));
    }

    proptest! {
        #[test]
        fn search_finds_any_substring(
            prefix in "[a-z]{0,8}",
            needle in "[a-z]{1,8}",
            suffix in "[a-z]{0,8}",
        ) {
            let r = record(json!({"field": format!("{prefix}{needle}{suffix}")}));
            prop_assert!(contains_text(&r, &needle));
        }

        #[test]
        fn patch_fields_win_and_others_survive(
            base in prop::collection::btree_map("[a-e]", any::<i64>(), 0..5),
            patch in prop::collection::btree_map("[c-h]", any::<i64>(), 0..5),
        ) {
            let mut r: Record = base.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
            let p: Patch = patch.iter().map(|(k, v)| (k.clone(), json!(v))).collect();

            apply_patch(&mut r, &p);

            for (k, v) in &patch {
                prop_assert_eq!(r.get(k), Some(&json!(v)));
            }
            for (k, v) in &base {
                if !patch.contains_key(k) {
                    prop_assert_eq!(r.get(k), Some(&json!(v)));
                }
            }
        }
    }
}
