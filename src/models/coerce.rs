//! Lenient numeric fields: accept JSON numbers or numeric strings.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::ApiError;

pub fn to_f64(value: &Value) -> Result<f64, String> {
    let number = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| "number out of range".to_string())?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("expected a number, got {:?}", s))?,
        other => return Err(format!("expected a number, got {}", other)),
    };
    if !number.is_finite() {
        return Err("number must be finite".to_string());
    }
    Ok(number)
}

// Fractional input truncates toward zero ("3.7" -> 3)
pub fn to_i64(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
        }
        Value::String(s) => {
            if let Ok(i) = s.trim().parse::<i64>() {
                return Ok(i);
            }
        }
        _ => {}
    }
    let number = to_f64(value)?.trunc();
    if number < i64::MIN as f64 || number > i64::MAX as f64 {
        return Err("integer out of range".to_string());
    }
    Ok(number as i64)
}

/// Per-field problems gathered while checking a request body
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    /// Keep the converted value, or remember why `field` was rejected
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(problem) => {
                self.0.insert(field.to_string(), problem);
                None
            }
        }
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid field value", Some(self.0)))
        }
    }
}
