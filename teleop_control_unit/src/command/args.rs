//! Argument coercion for request `args` objects.
//!
//! Numbers may arrive as JSON numbers or numeric strings.

use serde_json::{Map, Value};

use super::CommandError;

fn as_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Optional numeric argument; missing or `null` is `None`.
pub fn optional_number(
    args: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<f64>, CommandError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_number(value)
            .map(Some)
            .ok_or_else(|| CommandError::InvalidArgument {
                name,
                reason: format!("expected a finite number, got {value}"),
            }),
    }
}

/// Numeric argument with a default for missing or `null`.
pub fn number(
    args: &Map<String, Value>,
    name: &'static str,
    default: f64,
) -> Result<f64, CommandError> {
    Ok(optional_number(args, name)?.unwrap_or(default))
}

/// Numeric argument that never fails: anything unusable is 0.0.
pub fn lenient_number(args: &Map<String, Value>, name: &str) -> f64 {
    args.get(name).and_then(as_number).unwrap_or(0.0)
}

/// Truthiness of a flag argument.
///
/// Booleans as-is, non-zero numbers, and the strings `true`, `on`, `yes`
/// and `1` (any case) are true; everything else, including absence, is false.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "on" | "yes" | "1"
        ),
        _ => false,
    }
}

/// Text argument; scalars are rendered, anything else is empty.
pub fn text(args: &Map<String, Value>, name: &str) -> String {
    match args.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => String::new(),
    }
}
