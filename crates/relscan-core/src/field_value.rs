//! Normalisation of polymorphic custom field payloads.
//!
//! Tracker custom fields arrive in whatever shape the field type dictates:
//! a bare string or number, a select option `{"value": ..}`, a reference
//! entity `{"name": ..}`, or a list of either. [`RawFieldValue`] classifies a
//! JSON value into one of four variants and [`normalize`] flattens each
//! variant into a single display string.

use serde_json::{Map, Number, Value};

/// Borrowed, classified view of one raw field payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawFieldValue<'a> {
    Null,
    Scalar(Scalar<'a>),
    Object(&'a Map<String, Value>),
    Sequence(&'a [Value]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Text(&'a str),
    Number(&'a Number),
    Bool(bool),
}

impl<'a> RawFieldValue<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(s) => Self::Scalar(Scalar::Text(s)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(*b)),
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::Sequence(items),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl<'a> From<&'a Value> for RawFieldValue<'a> {
    fn from(value: &'a Value) -> Self {
        Self::classify(value)
    }
}

impl Scalar<'_> {
    fn render(&self) -> String {
        match self {
            Scalar::Text(s) => (*s).to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Flatten a raw field payload into a display string.
///
/// - `Null` → `""`
/// - scalar → its text, unmodified
/// - object → non-null `value`, else non-null `name`, else compact JSON
/// - sequence → each element normalised, joined with `", "`
///
/// Never fails; nested sequences are flattened recursively.
pub fn normalize(raw: &RawFieldValue<'_>) -> String {
    match raw {
        RawFieldValue::Null => String::new(),
        RawFieldValue::Scalar(scalar) => scalar.render(),
        RawFieldValue::Object(map) => normalize_object(map),
        RawFieldValue::Sequence(items) => items
            .iter()
            .map(normalize_json)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Classify and normalise a JSON value in one step.
pub fn normalize_json(value: &Value) -> String {
    normalize(&RawFieldValue::classify(value))
}

fn normalize_object(map: &Map<String, Value>) -> String {
    for key in ["value", "name"] {
        if let Some(inner) = map.get(key)
            && !inner.is_null()
        {
            return normalize_json(inner);
        }
    }
    // serde_json's map serialisation cannot fail.
    serde_json::to_string(map).unwrap_or_default()
}

/// Look up a key on an object payload, treating JSON null as absent.
pub fn non_null<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_is_empty() {
        assert_eq!(normalize_json(&Value::Null), "");
    }

    #[test]
    fn scalars_render_unmodified() {
        assert_eq!(normalize_json(&json!("  padded text  ")), "  padded text  ");
        assert_eq!(normalize_json(&json!(5)), "5");
        assert_eq!(normalize_json(&json!(3.5)), "3.5");
        assert_eq!(normalize_json(&json!(true)), "true");
    }

    #[test]
    fn long_scalar_not_truncated() {
        let long = "x".repeat(10_000);
        assert_eq!(normalize_json(&json!(long)).len(), 10_000);
    }

    #[test]
    fn value_takes_precedence_over_name() {
        assert_eq!(normalize_json(&json!({"value": "A", "name": "B"})), "A");
    }

    #[test]
    fn name_used_when_value_missing_or_null() {
        assert_eq!(normalize_json(&json!({"name": "B", "id": "1"})), "B");
        assert_eq!(normalize_json(&json!({"value": null, "name": "B"})), "B");
    }

    #[test]
    fn unknown_object_falls_back_to_json_text() {
        let out = normalize_json(&json!({"id": 7, "self": "http://x"}));
        assert!(out.contains("\"id\":7"), "got {out}");
        assert!(out.contains("\"self\":\"http://x\""), "got {out}");
    }

    #[test]
    fn list_of_objects_joined() {
        assert_eq!(
            normalize_json(&json!([{"name": "X"}, {"name": "Y"}])),
            "X, Y"
        );
    }

    #[test]
    fn mixed_list_joined() {
        assert_eq!(
            normalize_json(&json!(["a", 2, {"value": "c"}])),
            "a, 2, c"
        );
    }

    #[test]
    fn empty_list_is_empty() {
        assert_eq!(normalize_json(&json!([])), "");
    }

    #[test]
    fn nested_sequences_terminate() {
        let mut v = json!(["leaf"]);
        for _ in 0..64 {
            v = json!([v]);
        }
        assert_eq!(normalize_json(&v), "leaf");
        assert_eq!(normalize_json(&json!([[], [[]]])), ", ");
    }

    #[test]
    fn classify_variants() {
        assert!(RawFieldValue::classify(&Value::Null).is_null());
        assert!(matches!(
            RawFieldValue::classify(&json!("s")),
            RawFieldValue::Scalar(Scalar::Text("s"))
        ));
        assert!(matches!(
            RawFieldValue::classify(&json!({})),
            RawFieldValue::Object(_)
        ));
        assert!(matches!(
            RawFieldValue::classify(&json!([1])),
            RawFieldValue::Sequence(items) if items.len() == 1
        ));
    }

    #[test]
    fn non_null_skips_null_entries() {
        let fields = json!({"a": null, "b": 1});
        let map = fields.as_object().unwrap();
        assert!(non_null(map, "a").is_none());
        assert!(non_null(map, "b").is_some());
        assert!(non_null(map, "c").is_none());
    }
}
