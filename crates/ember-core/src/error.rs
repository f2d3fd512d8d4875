//! Error types for Ember

use thiserror::Error;

/// The main error type for Ember operations
#[derive(Debug, Error)]
pub enum EmberError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Invalid field type for {field}: expected {expected}")]
    InvalidFieldType { field: String, expected: String },

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Invalid enum value for {field}: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Duplicate emitter name: {0}")]
    DuplicateEmitterName(String),
}

/// Result type alias for Ember operations
pub type Result<T> = std::result::Result<T, EmberError>;

impl From<toml::de::Error> for EmberError {
    fn from(err: toml::de::Error) -> Self {
        EmberError::TomlParseError(err.to_string())
    }
}

impl EmberError {
    /// Build an `InvalidEnumValue` from a list of accepted names
    pub fn invalid_enum(field: &str, value: &str, allowed: &[&str]) -> Self {
        EmberError::InvalidEnumValue {
            field: field.to_string(),
            value: value.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_enum_lists_allowed_values() {
        let err = EmberError::invalid_enum("shape", "hexagon", &["point", "line"]);
        let msg = err.to_string();
        assert!(msg.contains("hexagon"));
        assert!(msg.contains("point"));
        assert!(msg.contains("shape"));
    }

    #[test]
    fn toml_errors_convert() {
        let err: EmberError = toml::from_str::<toml::Value>("a = [")
            .unwrap_err()
            .into();
        assert!(matches!(err, EmberError::TomlParseError(_)));
    }

    #[test]
    fn out_of_range_message() {
        let err = EmberError::ValueOutOfRange {
            field: "number".into(),
            min: 0.0,
            max: f64::INFINITY,
            value: -2.0,
        };
        assert_eq!(
            err.to_string(),
            "Value out of range: number must be between 0 and inf, got -2"
        );
    }
}
