//! Comparisons used by the strategies and the expected-result rules.
//!
//! Schema values are arbitrary JSON, so numbers may arrive as integers or
//! floats. Booleans never compare equal to numbers.

use serde_json::Value;

/// True when `value` is a JSON number equal to `expected`.
pub fn is_numeric(value: &Value, expected: u64) -> bool {
    let Value::Number(number) = value else {
        return false;
    };
    if let Some(int) = number.as_u64() {
        return int == expected;
    }
    number
        .as_f64()
        .is_some_and(|float| float == expected as f64)
}

/// True when `value` is the JSON literal `true`.
pub fn is_true(value: &Value) -> bool {
    matches!(value, Value::Bool(true))
}

/// True when `value` is a JSON string equal to `expected`.
pub fn is_str(value: &Value, expected: &str) -> bool {
    value.as_str() == Some(expected)
}
