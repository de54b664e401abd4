//! Attribute normalization and falsy-equivalent comparison.
//!
//! Raw CSV cells become [`ScalarValue`]s:
//!
//! | CSV input                        | Result            |
//! |----------------------------------|-------------------|
//! | column missing from the file     | `Absent`          |
//! | empty cell                       | `Empty`           |
//! | date field with leading integer  | `Integer(n)`      |
//! | date field without one           | `Empty`           |
//! | any other text                   | `Text(s)`         |
//!
//! `Absent` is never written. `Empty` is never written either: create
//! payloads omit it and update payloads delete the key.

use serde_json::Value;

use crate::types::{LoadedWorkerRecord, OwnedField};

/// A normalized owned-field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    Absent,
    Empty,
    Integer(i64),
    Text(String),
}

impl ScalarValue {
    /// JSON form of the value. `Empty` maps to `""` so the merge step can
    /// strip it; `Absent` has no JSON form.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            ScalarValue::Absent => None,
            ScalarValue::Empty => Some(Value::String(String::new())),
            ScalarValue::Integer(n) => Some(Value::from(*n)),
            ScalarValue::Text(s) => Some(Value::String(s.clone())),
        }
    }
}

/// Normalize the raw CSV value of one owned field.
pub fn normalize_field(field: OwnedField, raw: Option<&str>) -> ScalarValue {
    let Some(raw) = raw else {
        return ScalarValue::Absent;
    };
    if field.is_date() {
        return leading_integer(raw).map_or(ScalarValue::Empty, ScalarValue::Integer);
    }
    if raw.is_empty() {
        ScalarValue::Empty
    } else {
        ScalarValue::Text(raw.to_owned())
    }
}

/// Normalize every owned field of a record, in [`OwnedField::ALL`] order.
pub fn normalize_record(record: &LoadedWorkerRecord) -> Vec<(OwnedField, ScalarValue)> {
    OwnedField::ALL
        .into_iter()
        .map(|field| (field, normalize_field(field, record.owned(field))))
        .collect()
}

/// Parse the integer prefix of `raw`: optional leading whitespace, optional
/// sign, then at least one ASCII digit. Trailing text is ignored, so
/// `"2024-01-01"` yields `2024`.
pub fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// `null`, `false`, `""`, `0` and a missing value are falsy.
pub fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f == 0.0 || f.is_nan()),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

/// Equal-for-diffing: two falsy values are always equal; otherwise the
/// values must be strictly equal (same JSON type and value, numbers compared
/// numerically).
pub fn falsy_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    if is_falsy(a) && is_falsy(b) {
        return true;
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_f64() == y.as_f64(),
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_column_is_absent() {
        assert_eq!(normalize_field(OwnedField::Email, None), ScalarValue::Absent);
        assert_eq!(normalize_field(OwnedField::DateLeft, None), ScalarValue::Absent);
    }

    #[test]
    fn empty_cell_is_empty() {
        assert_eq!(normalize_field(OwnedField::Email, Some("")), ScalarValue::Empty);
        assert_eq!(normalize_field(OwnedField::DateLeft, Some("")), ScalarValue::Empty);
    }

    #[test]
    fn non_date_fields_keep_text() {
        assert_eq!(
            normalize_field(OwnedField::TeamId, Some("5")),
            ScalarValue::Text("5".to_string())
        );
    }

    #[test]
    fn date_fields_take_leading_integer() {
        assert_eq!(
            normalize_field(OwnedField::DateJoined, Some("20240101")),
            ScalarValue::Integer(20240101)
        );
        assert_eq!(
            normalize_field(OwnedField::DateLeft, Some("2024-01-01")),
            ScalarValue::Integer(2024)
        );
        assert_eq!(
            normalize_field(OwnedField::DateLeft, Some("n/a")),
            ScalarValue::Empty
        );
    }

    #[test]
    fn leading_integer_edge_cases() {
        assert_eq!(leading_integer("  42abc"), Some(42));
        assert_eq!(leading_integer("-7"), Some(-7));
        assert_eq!(leading_integer("+3"), Some(3));
        assert_eq!(leading_integer("-"), None);
        assert_eq!(leading_integer(""), None);
        assert_eq!(leading_integer("1.9"), Some(1));
        assert_eq!(leading_integer("99999999999999999999"), None);
    }

    #[test]
    fn falsy_values_are_interchangeable() {
        let falsy = [None, Some(json!(null)), Some(json!("")), Some(json!(0))];
        for a in &falsy {
            for b in &falsy {
                assert!(falsy_equal(a.as_ref(), b.as_ref()), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn truthy_values_compare_strictly() {
        assert!(!falsy_equal(Some(&json!(1)), Some(&json!("1"))));
        assert!(falsy_equal(Some(&json!("5")), Some(&json!("5"))));
        assert!(falsy_equal(Some(&json!(5)), Some(&json!(5.0))));
        assert!(!falsy_equal(Some(&json!("a")), None));
        assert!(!falsy_equal(None, Some(&json!(2024))));
    }
}
