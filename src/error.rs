use thiserror::Error;

/// Structural failures. Bad sports data never ends up here; it is skipped or
/// defaulted where it is read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StandingsError {
    #[error("invalid input: `{field}` must be an array, found {found}")]
    InvalidInput { field: &'static str, found: &'static str },

    #[error("invalid {what} json: {message}")]
    Json { what: &'static str, message: String },
}

impl StandingsError {
    pub(crate) fn not_an_array(field: &'static str, value: &serde_json::Value) -> Self {
        StandingsError::InvalidInput {
            field,
            found: json_kind(value),
        }
    }
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
