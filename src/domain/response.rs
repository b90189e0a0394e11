use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A stored answer to one field of one request.
///
/// The value is kept exactly as stored: a JSON-encoded scalar or array.
/// Numbers, booleans and dates are JSON-stringified before storage, so they
/// must be parsed on read. Legacy rows may hold bare text, which is read as a
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Response identifier.
    pub id: Uuid,
    /// The field this answers.
    pub field_id: Uuid,
    /// The request this belongs to.
    pub request_id: Uuid,
    /// JSON-encoded value.
    pub value: String,
    /// Correlation key shared by every response of one duplicated section
    /// instance. `None` for the single instance of a section.
    #[serde(default)]
    pub duplicatable_section_id: Option<Uuid>,
}

impl Response {
    /// Creates a response, JSON-encoding the value.
    #[must_use]
    pub fn new(field_id: Uuid, request_id: Uuid, value: &Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            field_id,
            request_id,
            value: value.to_string(),
            duplicatable_section_id: None,
        }
    }

    /// Tags the response as belonging to a duplicated section instance.
    #[must_use]
    pub fn in_duplicate(mut self, duplicatable_section_id: Uuid) -> Self {
        self.duplicatable_section_id = Some(duplicatable_section_id);
        self
    }

    /// The decoded value.
    ///
    /// Values that are not valid JSON are returned as a JSON string holding
    /// the raw text.
    #[must_use]
    pub fn value(&self) -> Value {
        serde_json::from_str(&self.value).unwrap_or_else(|_| Value::String(self.value.clone()))
    }

    /// The value rendered as display text.
    ///
    /// Arrays are joined with `", "`; `null` renders as an empty string.
    #[must_use]
    pub fn as_text(&self) -> String {
        display(&self.value())
    }

    /// The value as a decimal number.
    ///
    /// Accepts JSON numbers and numeric strings (thousands separators are
    /// ignored). Anything else yields `None`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self.value() {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => parse_decimal(&text),
            _ => None,
        }
    }

    /// The value as a boolean, for switch and boolean fields.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.value() {
            Value::Bool(flag) => Some(flag),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Parses a decimal number, ignoring surrounding whitespace and commas.
pub(crate) fn parse_decimal(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok().filter(|n: &f64| n.is_finite())
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(display).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}
