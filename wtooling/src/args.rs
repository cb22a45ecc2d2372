//! JSON argument extraction with one-time coercion at the intent boundary.
//!
//! The model's argument bags are loose: numbers arrive as numbers or as
//! numeric strings, optional fields may be null or absent. Coercion happens
//! here, once, so intent payloads downstream are fully typed.
//!
//! ```rust
//! use serde_json::json;
//! use wtooling::args::{parse_object, required_number, required_string};
//!
//! let args = json!({"orderName": "كنبة", "amount": "500"});
//! let object = parse_object(&args).expect("object should parse");
//! assert_eq!(required_string(object, "orderName").expect("name"), "كنبة");
//! assert_eq!(required_number(object, "amount").expect("amount"), 500.0);
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

pub fn parse_object(args: &Value) -> Result<&Map<String, Value>, ToolError> {
    args.as_object()
        .ok_or_else(|| ToolError::invalid_arguments("expected a JSON object argument bag"))
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string '{key}'")))
}

/// Accepts JSON numbers and numeric strings; everything else is a contract
/// violation.
pub fn required_number(args: &Map<String, Value>, key: &str) -> Result<f64, ToolError> {
    coerce_number(args.get(key))
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required number '{key}'")))
}

/// Absent, null, zero, and non-numeric values all collapse to `None`.
pub fn optional_amount(args: &Map<String, Value>, key: &str) -> Option<f64> {
    coerce_number(args.get(key)).filter(|value| *value != 0.0)
}

pub fn number_or_zero(value: &Value) -> f64 {
    coerce_number(Some(value)).unwrap_or(0.0)
}

fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ToolErrorKind;

    #[test]
    fn non_object_argument_bags_are_rejected() {
        let error = parse_object(&json!("just text")).expect_err("string should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
    }

    #[test]
    fn numeric_strings_coerce_once_at_the_boundary() {
        let args = json!({"amount": " 250.5 ", "count": 3});
        let object = parse_object(&args).expect("object should parse");

        assert_eq!(required_number(object, "amount").expect("amount"), 250.5);
        assert_eq!(required_number(object, "count").expect("count"), 3.0);
        assert!(required_number(object, "missing").is_err());
        assert!(required_number(&parse_object(&json!({"amount": true})).expect("object"), "amount").is_err());
    }

    #[test]
    fn optional_amounts_treat_zero_as_absent() {
        let args = json!({"laborCost": 0, "paidAmount": "120"});
        let object = parse_object(&args).expect("object should parse");

        assert_eq!(optional_amount(object, "laborCost"), None);
        assert_eq!(optional_amount(object, "paidAmount"), Some(120.0));
        assert_eq!(optional_amount(object, "absent"), None);
    }

    #[test]
    fn blank_strings_do_not_satisfy_required_fields() {
        let args = json!({"orderName": "   "});
        let object = parse_object(&args).expect("object should parse");
        assert!(required_string(object, "orderName").is_err());
    }
}
