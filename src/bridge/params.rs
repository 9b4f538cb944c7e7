//! Parameter extraction for bridge calls
//!
//! Bridge calls carry a loosely-typed JSON object. These helpers pull typed
//! values out of it and produce the caller-facing validation messages.

use serde_json::{Map, Value};

use crate::rect::Rect;

use super::error::BridgeError;

pub type Params = Map<String, Value>;

const RECT_REQUIRED: &str = "x, y, width, and height are required";
const RECT_NEGATIVE: &str = "x, y, width, and height must not be negative";
const RECT_RANGE: &str = "x, y, width, and height are out of range";

/// A string parameter that must be present. Empty strings are accepted.
pub fn required_str<'a>(params: &'a Params, name: &str) -> Result<&'a str, BridgeError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| BridgeError::Validation(format!("{name} is required")))
}

/// A string parameter that must be present and non-empty
pub fn required_id<'a>(params: &'a Params, name: &str) -> Result<&'a str, BridgeError> {
    match required_str(params, name)? {
        "" => Err(BridgeError::Validation(format!("{name} is required"))),
        id => Ok(id),
    }
}

pub fn optional_bool(params: &Params, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

pub fn required_object<'a>(params: &'a Params, name: &str) -> Result<&'a Map<String, Value>, BridgeError> {
    params
        .get(name)
        .and_then(Value::as_object)
        .ok_or_else(|| BridgeError::Validation(format!("{name} is required and must be an object")))
}

/// `x`, `y`, `width`, `height` as a [`Rect`].
///
/// All four must be JSON numbers. Fractional values are truncated toward
/// zero; negative values are rejected.
pub fn required_rect(params: &Params) -> Result<Rect, BridgeError> {
    let x = coordinate(params, "x")?;
    let y = coordinate(params, "y")?;
    let width = coordinate(params, "width")?;
    let height = coordinate(params, "height")?;

    let x = i32::try_from(x).map_err(|_| BridgeError::Validation(RECT_RANGE.to_string()))?;
    let y = i32::try_from(y).map_err(|_| BridgeError::Validation(RECT_RANGE.to_string()))?;
    let width = u32::try_from(width).map_err(|_| BridgeError::Validation(RECT_RANGE.to_string()))?;
    let height = u32::try_from(height).map_err(|_| BridgeError::Validation(RECT_RANGE.to_string()))?;

    Ok(Rect::new(x, y, width, height))
}

fn coordinate(params: &Params, name: &str) -> Result<i64, BridgeError> {
    let value = params
        .get(name)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .ok_or_else(|| BridgeError::Validation(RECT_REQUIRED.to_string()))?;

    let truncated = value.trunc();
    if truncated < 0.0 {
        return Err(BridgeError::Validation(RECT_NEGATIVE.to_string()));
    }
    if truncated > i64::MAX as f64 {
        return Err(BridgeError::Validation(RECT_RANGE.to_string()));
    }
    Ok(truncated as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn message(err: BridgeError) -> String {
        err.to_string()
    }

    #[test]
    fn rect_from_integers() {
        let p = params(json!({"x": 10, "y": 20, "width": 100, "height": 50}));
        assert_eq!(required_rect(&p).unwrap(), Rect::new(10, 20, 100, 50));
    }

    #[test]
    fn rect_truncates_fractions() {
        let p = params(json!({"x": 10.9, "y": 0.2, "width": 99.99, "height": 50.5}));
        assert_eq!(required_rect(&p).unwrap(), Rect::new(10, 0, 99, 50));
    }

    #[test]
    fn rect_missing_field() {
        let p = params(json!({"x": 10, "y": 20, "width": 100}));
        assert_eq!(message(required_rect(&p).unwrap_err()), RECT_REQUIRED);
    }

    #[test]
    fn rect_non_numeric_field() {
        let p = params(json!({"x": "10", "y": 20, "width": 100, "height": 50}));
        assert_eq!(message(required_rect(&p).unwrap_err()), RECT_REQUIRED);

        let p = params(json!({"x": null, "y": 20, "width": 100, "height": 50}));
        assert_eq!(message(required_rect(&p).unwrap_err()), RECT_REQUIRED);
    }

    #[test]
    fn rect_negative_rejected() {
        let p = params(json!({"x": -1, "y": 20, "width": 100, "height": 50}));
        assert_eq!(message(required_rect(&p).unwrap_err()), RECT_NEGATIVE);

        // Truncates to zero, so it is accepted
        let p = params(json!({"x": -0.5, "y": 0, "width": 0, "height": 0}));
        assert_eq!(required_rect(&p).unwrap(), Rect::new(0, 0, 0, 0));
    }

    #[test]
    fn rect_out_of_range() {
        let p = params(json!({"x": 1e12, "y": 0, "width": 1, "height": 1}));
        assert_eq!(message(required_rect(&p).unwrap_err()), RECT_RANGE);
    }

    #[test]
    fn ids_must_be_non_empty_strings() {
        let p = params(json!({"placeholderId": "", "targetId": 7}));
        assert_eq!(
            message(required_id(&p, "placeholderId").unwrap_err()),
            "placeholderId is required"
        );
        assert_eq!(
            message(required_id(&p, "targetId").unwrap_err()),
            "targetId is required"
        );
        assert_eq!(
            message(required_id(&p, "missing").unwrap_err()),
            "missing is required"
        );
        assert_eq!(required_str(&p, "placeholderId").unwrap(), "");
    }

    #[test]
    fn optional_bool_defaults() {
        let p = params(json!({"sandbox": true, "other": "yes"}));
        assert!(optional_bool(&p, "sandbox", false));
        assert!(!optional_bool(&p, "other", false));
        assert!(!optional_bool(&p, "absent", false));
    }
}
