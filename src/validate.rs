//! Input validation and normalization for entity payloads.
//!
//! `validate` is total over any JSON shape: it either yields the trimmed and
//! coerced subset of fields that should be written, or a tagged failure.

use serde_json::{Number, Value as JsonValue};

use crate::error::ValidationFailure;
use crate::schema::{EntitySchema, Field, FieldKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// Validated fields in schema order, ready to be written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedFields(Vec<(&'static str, JsonValue)>);

impl NormalizedFields {
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &JsonValue)> {
        self.0.iter().map(|(n, v)| (*n, v))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|(n, _)| *n).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

enum Coerced {
    Absent,
    Value(JsonValue),
    Invalid,
}

pub fn validate(
    schema: &EntitySchema,
    raw: &JsonValue,
    mode: Mode,
) -> Result<NormalizedFields, ValidationFailure> {
    let input = raw.as_object();
    let mut fields = Vec::new();
    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    for field in schema.fields {
        let value = input.and_then(|m| m.get(field.name));
        match coerce(field, value) {
            Coerced::Value(v) => fields.push((field.name, v)),
            Coerced::Invalid => invalid.push(field.name),
            Coerced::Absent => {
                if mode == Mode::Create && field.required {
                    missing.push(field.name);
                }
            }
        }
    }

    if !invalid.is_empty() {
        return Err(ValidationFailure::TypeCoercionFailed(invalid));
    }
    if !missing.is_empty() {
        return Err(ValidationFailure::MissingFields(missing));
    }
    if mode == Mode::Update && fields.is_empty() {
        return Err(ValidationFailure::AllFieldsEmpty(schema.field_names()));
    }

    Ok(NormalizedFields(fields))
}

fn coerce(field: &Field, value: Option<&JsonValue>) -> Coerced {
    let value = match value {
        None | Some(JsonValue::Null) => return Coerced::Absent,
        Some(v) => v,
    };

    match field.kind {
        FieldKind::Text => match value {
            JsonValue::String(s) => non_empty(s).map_or(Coerced::Absent, |s| {
                Coerced::Value(JsonValue::String(s.to_string()))
            }),
            JsonValue::Number(n) => Coerced::Value(JsonValue::String(n.to_string())),
            JsonValue::Bool(b) => Coerced::Value(JsonValue::String(b.to_string())),
            _ => Coerced::Invalid,
        },
        FieldKind::Bool => match value {
            JsonValue::Bool(b) => Coerced::Value(JsonValue::Bool(*b)),
            JsonValue::Number(n) => match n.as_i64() {
                Some(0) => Coerced::Value(JsonValue::Bool(false)),
                Some(1) => Coerced::Value(JsonValue::Bool(true)),
                _ => Coerced::Invalid,
            },
            JsonValue::String(s) => match non_empty(s) {
                None => Coerced::Absent,
                Some(s) if s.eq_ignore_ascii_case("true") => Coerced::Value(JsonValue::Bool(true)),
                Some(s) if s.eq_ignore_ascii_case("false") => Coerced::Value(JsonValue::Bool(false)),
                Some(_) => Coerced::Invalid,
            },
            _ => Coerced::Invalid,
        },
        FieldKind::Int => match value {
            JsonValue::Number(n) => n
                .as_i64()
                .map_or(Coerced::Invalid, |i| Coerced::Value(JsonValue::Number(i.into()))),
            JsonValue::String(s) => match non_empty(s) {
                None => Coerced::Absent,
                Some(s) => s.parse::<i64>().map_or(Coerced::Invalid, |i| {
                    Coerced::Value(JsonValue::Number(Number::from(i)))
                }),
            },
            _ => Coerced::Invalid,
        },
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FORM, MECH, NOTE, TODO};
    use serde_json::json;

    #[test]
    fn test_create_trims_text() {
        let fields = validate(&NOTE, &json!({ "content": " Buy milk " }), Mode::Create).unwrap();
        assert_eq!(fields.get("content"), Some(&json!("Buy milk")));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_create_reports_blank_required_fields() {
        let err = validate(
            &MECH,
            &json!({ "name": "Atlas", "variant": "", "description": "Heavy" }),
            Mode::Create,
        )
        .unwrap_err();
        assert_eq!(err, ValidationFailure::MissingFields(vec!["variant"]));

        let err = validate(&MECH, &json!({ "name": "   " }), Mode::Create).unwrap_err();
        assert_eq!(
            err,
            ValidationFailure::MissingFields(vec!["name", "variant", "description"])
        );
    }

    #[test]
    fn test_create_leaves_optional_defaults_to_store() {
        let fields = validate(&TODO, &json!({ "task": "X" }), Mode::Create).unwrap();
        assert_eq!(fields.names(), vec!["task"]);
    }

    #[test]
    fn test_phone_is_coerced_to_integer() {
        let base = json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "message": "hi",
        });

        let mut with_phone = base.clone();
        with_phone["phone"] = json!(" 5551234 ");
        let fields = validate(&FORM, &with_phone, Mode::Create).unwrap();
        assert_eq!(fields.get("phone"), Some(&json!(5551234)));

        let mut blank_phone = base.clone();
        blank_phone["phone"] = json!("  ");
        let fields = validate(&FORM, &blank_phone, Mode::Create).unwrap();
        assert_eq!(fields.get("phone"), None);

        let mut bad_phone = base;
        bad_phone["phone"] = json!("call me");
        let err = validate(&FORM, &bad_phone, Mode::Create).unwrap_err();
        assert_eq!(err, ValidationFailure::TypeCoercionFailed(vec!["phone"]));
    }

    #[test]
    fn test_scalars_are_stringified_for_text_fields() {
        let fields = validate(&NOTE, &json!({ "content": 42 }), Mode::Create).unwrap();
        assert_eq!(fields.get("content"), Some(&json!("42")));

        let err = validate(&NOTE, &json!({ "content": ["a"] }), Mode::Create).unwrap_err();
        assert_eq!(err, ValidationFailure::TypeCoercionFailed(vec!["content"]));
    }

    #[test]
    fn test_non_object_input_is_treated_as_empty() {
        let err = validate(&NOTE, &json!("hello"), Mode::Create).unwrap_err();
        assert_eq!(err, ValidationFailure::MissingFields(vec!["content"]));

        let err = validate(&NOTE, &JsonValue::Null, Mode::Update).unwrap_err();
        assert_eq!(err, ValidationFailure::AllFieldsEmpty(vec!["content"]));
    }

    #[test]
    fn test_update_keeps_only_supplied_fields() {
        let fields = validate(
            &MECH,
            &json!({ "name": "  ", "description": " Light ", "unknown": "x" }),
            Mode::Update,
        )
        .unwrap();
        assert_eq!(fields.names(), vec!["description"]);
        assert_eq!(fields.get("description"), Some(&json!("Light")));
    }

    #[test]
    fn test_update_with_nothing_to_write() {
        let err = validate(&TODO, &json!({ "task": " " }), Mode::Update).unwrap_err();
        assert_eq!(
            err,
            ValidationFailure::AllFieldsEmpty(vec!["task", "is_complete"])
        );
    }

    #[test]
    fn test_bool_coercion() {
        let fields = validate(&TODO, &json!({ "is_complete": true }), Mode::Update).unwrap();
        assert_eq!(fields.get("is_complete"), Some(&json!(true)));

        let fields = validate(&TODO, &json!({ "is_complete": "FALSE" }), Mode::Update).unwrap();
        assert_eq!(fields.get("is_complete"), Some(&json!(false)));

        let fields = validate(&TODO, &json!({ "is_complete": 1 }), Mode::Update).unwrap();
        assert_eq!(fields.get("is_complete"), Some(&json!(true)));

        let err = validate(&TODO, &json!({ "is_complete": "maybe" }), Mode::Update).unwrap_err();
        assert_eq!(err, ValidationFailure::TypeCoercionFailed(vec!["is_complete"]));
    }
}
