//! Integration tests for Value

use pegmatite_foundation::Value;

#[test]
fn conversions() {
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(3_i64), Value::Int(3));
    assert_eq!(Value::from("a"), Value::from(String::from("a")));
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some(2_i64)), Value::Int(2));
    assert_eq!(Value::from(vec!["a", "b"]), Value::array(["a", "b"]));
}

#[test]
fn default_is_null() {
    assert_eq!(Value::default(), Value::Null);
}

#[test]
fn truthiness() {
    for falsy in [Value::Null, Value::from(false), Value::from(0_i64), Value::from("")] {
        assert!(!falsy.is_truthy(), "{falsy} should be falsy");
    }
    for truthy in [Value::from(1_i64), Value::from("x"), Value::empty_array()] {
        assert!(truthy.is_truthy(), "{truthy} should be truthy");
    }
}

#[test]
fn accessors() {
    assert_eq!(Value::from(2_i64).as_number(), Some(2.0));
    assert_eq!(Value::from("ab").as_str(), Some("ab"));
    assert_eq!(Value::Null.as_str(), None);
}

#[test]
fn flatten_text_walks_nested_arrays() {
    let value = Value::array([
        Value::from("a"),
        Value::array([Value::from("b"), Value::Null]),
        Value::from("c"),
    ]);
    assert_eq!(value.flatten_text(), "abc");
}

#[test]
fn display_is_json_like() {
    let value = Value::object([("k", Value::array([Value::from(1_i64), Value::Null]))]);
    assert_eq!(value.to_string(), "{\"k\": [1, null]}");
}

#[test]
fn clones_share_structure() {
    let big = Value::array((0..1000_i64).map(Value::from));
    let copy = big.clone();
    assert_eq!(big, copy);
}
