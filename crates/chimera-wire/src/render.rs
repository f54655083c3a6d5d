//! ---
//! chimera_section: "01-wire-codec"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Record codec, field tables and sample streams."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
//! Human-facing renderings of a [`FieldSet`]: text, JSON and CSV cells.

use std::fmt::Write as _;

use serde_json::{Map, Number, Value as JsonValue};

use crate::error::{FieldError, RenderError};
use crate::field::{FieldSet, ScalarValue, Schema};

/// One `name: value` line per present field, ascending by tag.
pub fn to_text(fields: &FieldSet) -> String {
    let mut out = String::new();
    for (field, value) in fields.present() {
        let _ = writeln!(out, "{}: {}", field.name, value);
    }
    out
}

/// Object holding every field under its JSON name, defaults included.
///
/// Non-finite values have no JSON number form and render as `null`.
pub fn to_json(fields: &FieldSet) -> JsonValue {
    let mut object = Map::new();
    for (field, slot) in fields.iter() {
        let value = slot.unwrap_or(field.default);
        object.insert(field.json_name.to_owned(), json_number(value));
    }
    JsonValue::Object(object)
}

/// Build a field set from an object keyed by field or JSON names.
///
/// Every key present in the object marks its field present, so
/// `{"torque": 0}` differs from `{}`. Numbers beyond the range of a
/// `float` field are rejected rather than stored as infinity.
pub fn from_json(schema: &'static Schema, value: &JsonValue) -> Result<FieldSet, RenderError> {
    let object = value.as_object().ok_or(RenderError::NotAnObject)?;
    let mut fields = FieldSet::new(schema);
    for (key, raw) in object {
        let field = schema
            .field_by_name(key)
            .ok_or_else(|| FieldError::UnknownName {
                record: schema.name,
                name: key.clone(),
            })?;
        let number = raw.as_f64().ok_or_else(|| RenderError::NotANumber {
            field: field.name,
            found: raw.to_string(),
        })?;
        let scalar = ScalarValue::from_f64(field.ty, number);
        if number.is_finite() && !scalar.as_f64().is_finite() {
            return Err(RenderError::OutOfRange {
                field: field.name,
                ty: field.ty,
                value: number,
            });
        }
        fields.set(field.tag, scalar)?;
    }
    Ok(fields)
}

/// Column names for CSV output.
pub fn csv_header(schema: &Schema) -> Vec<&'static str> {
    schema.fields.iter().map(|field| field.name).collect()
}

/// One CSV cell per field; absent fields render as empty cells.
pub fn csv_row(fields: &FieldSet) -> Vec<String> {
    fields
        .iter()
        .map(|(_, slot)| slot.map(|value| value.to_string()).unwrap_or_default())
        .collect()
}

fn json_number(value: ScalarValue) -> JsonValue {
    // Going through the shortest display form keeps 0.1f32 as 0.1 rather
    // than its widened f64 expansion.
    let widened = match value {
        ScalarValue::Float(v) => v.to_string().parse::<f64>().unwrap_or(f64::from(v)),
        ScalarValue::Double(v) => v,
    };
    Number::from_f64(widened)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldDescriptor, ScalarType};
    use serde_json::json;

    const METER_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new(1, "timestamp", "timestamp", ScalarType::Float),
        FieldDescriptor::new(3, "motor_temp", "motorTemp", ScalarType::Float),
    ];

    static METER: Schema = Schema::new("test.Meter", METER_FIELDS);

    #[test]
    fn text_lists_only_present_fields() {
        let mut fields = FieldSet::new(&METER);
        assert_eq!(to_text(&fields), "");
        fields.put(3, 61.5f32);
        assert_eq!(to_text(&fields), "motor_temp: 61.5\n");
    }

    #[test]
    fn json_includes_defaults_under_json_names() {
        let mut fields = FieldSet::new(&METER);
        fields.put(3, 0.1f32);
        assert_eq!(to_json(&fields), json!({"timestamp": 0.0, "motorTemp": 0.1}));
    }

    #[test]
    fn json_input_accepts_both_name_styles() {
        let fields = from_json(&METER, &json!({"motorTemp": 40, "timestamp": 0})).unwrap();
        assert_eq!(fields.get::<f32>(3), 40.0);
        assert!(fields.has(1));

        let fields = from_json(&METER, &json!({"motor_temp": 12.5})).unwrap();
        assert_eq!(fields.get::<f32>(3), 12.5);
        assert!(!fields.has(1));
    }

    #[test]
    fn json_input_rejects_unknown_and_non_numeric() {
        assert_eq!(
            from_json(&METER, &json!([1, 2])).unwrap_err(),
            RenderError::NotAnObject
        );
        assert!(matches!(
            from_json(&METER, &json!({"rpm": 1})),
            Err(RenderError::Field(FieldError::UnknownName { .. }))
        ));
        assert!(matches!(
            from_json(&METER, &json!({"timestamp": "soon"})),
            Err(RenderError::NotANumber { field: "timestamp", .. })
        ));
    }

    #[test]
    fn json_input_rejects_values_beyond_float_range() {
        assert_eq!(
            from_json(&METER, &json!({"timestamp": 1e39})).unwrap_err(),
            RenderError::OutOfRange {
                field: "timestamp",
                ty: ScalarType::Float,
                value: 1e39,
            }
        );
        assert!(matches!(
            from_json(&METER, &json!({"motorTemp": -1e39})),
            Err(RenderError::OutOfRange { field: "motor_temp", .. })
        ));

        let fields = from_json(&METER, &json!({"timestamp": 3.4e38})).unwrap();
        assert!(fields.get::<f32>(1).is_finite());
    }

    #[test]
    fn csv_cells_leave_absent_fields_empty() {
        let mut fields = FieldSet::new(&METER);
        fields.put(1, 2.0f32);
        assert_eq!(csv_header(&METER), vec!["timestamp", "motor_temp"]);
        assert_eq!(csv_row(&fields), vec!["2".to_owned(), String::new()]);
    }
}
