//! TOML helpers shared by the scene loaders (handle integer/float coercion)

use ember_core::{Color, EmberError, Result, Vec2};

pub(crate) fn toml_number(v: &toml::Value) -> Option<f32> {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
}

pub(crate) fn toml_f32(v: &toml::Value, default: f32) -> f32 {
    toml_number(v).unwrap_or(default)
}

/// `[x, y]`, exactly two numbers
pub(crate) fn toml_vec2(v: &toml::Value) -> Option<Vec2> {
    match v.as_array().map(Vec::as_slice) {
        Some([x, y]) => Some(Vec2::new(toml_number(x)?, toml_number(y)?)),
        _ => None,
    }
}

pub(crate) fn toml_vec2_or(v: &toml::Value, default: Vec2) -> Vec2 {
    toml_vec2(v).unwrap_or(default)
}

/// `[r, g, b]` or `[r, g, b, a]`
pub(crate) fn toml_color(v: &toml::Value, default: Color) -> Color {
    let channels: Option<Vec<f32>> = v
        .as_array()
        .and_then(|arr| arr.iter().map(toml_number).collect());
    match channels.as_deref() {
        Some([r, g, b]) => Color::new(*r, *g, *b, 1.0),
        Some([r, g, b, a]) => Color::new(*r, *g, *b, *a),
        _ => default,
    }
}

pub(crate) fn toml_int(field: &str, v: &toml::Value) -> Result<i32> {
    v.as_integer()
        .and_then(|i| i32::try_from(i).ok())
        .ok_or_else(|| EmberError::InvalidFieldType {
            field: field.to_string(),
            expected: "integer".to_string(),
        })
}

pub(crate) fn toml_str<'v>(field: &str, v: &'v toml::Value) -> Result<&'v str> {
    v.as_str().ok_or_else(|| EmberError::InvalidFieldType {
        field: field.to_string(),
        expected: "string".to_string(),
    })
}

pub(crate) fn toml_table<'v>(field: &str, v: &'v toml::Value) -> Result<&'v toml::value::Table> {
    v.as_table().ok_or_else(|| EmberError::InvalidFieldType {
        field: field.to_string(),
        expected: "table".to_string(),
    })
}

/// Entries of an array-of-tables such as `[[emitter]]`; absent means none
pub(crate) fn sub_tables<'t>(
    table: &'t toml::value::Table,
    key: &str,
) -> Result<Vec<&'t toml::value::Table>> {
    let Some(value) = table.get(key) else {
        return Ok(Vec::new());
    };
    let invalid = || EmberError::InvalidFieldType {
        field: key.to_string(),
        expected: "array of tables".to_string(),
    };
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_table().ok_or_else(invalid))
        .collect()
}

/// Finite and `>= 0`
pub(crate) fn non_negative(field: &str, value: f32) -> Result<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EmberError::ValueOutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: f64::INFINITY,
            value: value as f64,
        })
    }
}
