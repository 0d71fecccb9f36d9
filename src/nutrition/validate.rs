use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use super::types::{Macronutrients, NutritionEstimate};

pub const REQUIRED_FIELDS: [&str; 4] = ["foodName", "calories", "macronutrients", "healthinessRating"];
pub const UNKNOWN_FOOD: &str = "Unknown Food";
pub const DEFAULT_RATING: u8 = 5;

/// Structural failure: the model did not answer the question that was asked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("invalid response: expected a JSON object, received {received}")]
    NotAnObject { received: &'static str },
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionReason {
    Blank,
    NotANumber,
    Negative,
    OutOfRange,
    NotAnObject,
}

/// A value that was replaced by a safe default instead of being rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correction {
    pub field: &'static str,
    pub reason: CorrectionReason,
    pub received: Value,
}

/// Successful validation: the canonical estimate and what had to be fixed to get it.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub estimate: NutritionEstimate,
    pub corrections: Vec<Correction>,
}

impl Validated {
    pub fn is_clean(&self) -> bool {
        self.corrections.is_empty()
    }
}

pub fn validate(parsed: &Value) -> Result<Validated, SchemaError> {
    let obj = parsed.as_object().ok_or(SchemaError::NotAnObject {
        received: json_type(parsed),
    })?;
    for field in REQUIRED_FIELDS {
        if !obj.contains_key(field) {
            return Err(SchemaError::MissingField { field });
        }
    }

    let mut fixes = Corrections::default();
    let food_name = sanitize_food_name(&obj["foodName"], &mut fixes);
    let calories = non_negative("calories", &obj["calories"], &mut fixes);
    let macronutrients = sanitize_macros(&obj["macronutrients"], &mut fixes);
    let healthiness_rating = sanitize_rating(&obj["healthinessRating"], &mut fixes);
    let healthier_alternative = obj.get("healthierAlternative").and_then(optional_text);

    for c in &fixes.0 {
        warn!(
            food_name = %food_name,
            field = c.field,
            reason = ?c.reason,
            received = %c.received,
            "corrected model estimate value"
        );
    }

    Ok(Validated {
        estimate: NutritionEstimate {
            food_name,
            calories,
            macronutrients,
            healthiness_rating,
            healthier_alternative,
        },
        corrections: fixes.0,
    })
}

#[derive(Debug, Default)]
pub(crate) struct Corrections(pub(crate) Vec<Correction>);

impl Corrections {
    fn push(&mut self, field: &'static str, reason: CorrectionReason, received: &Value) {
        self.0.push(Correction {
            field,
            reason,
            received: received.clone(),
        });
    }
}

pub(crate) fn sanitize_food_name(value: &Value, fixes: &mut Corrections) -> String {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    };
    if text.is_empty() {
        fixes.push("foodName", CorrectionReason::Blank, value);
        return UNKNOWN_FOOD.to_string();
    }
    text
}

/// Float coercion with NaN and negatives clamped to 0.
pub(crate) fn non_negative(field: &'static str, value: &Value, fixes: &mut Corrections) -> f64 {
    match coerce_f64(value) {
        Some(v) if v < 0.0 => {
            fixes.push(field, CorrectionReason::Negative, value);
            0.0
        }
        Some(v) => v,
        None => {
            fixes.push(field, CorrectionReason::NotANumber, value);
            0.0
        }
    }
}

pub(crate) fn sanitize_macros(value: &Value, fixes: &mut Corrections) -> Macronutrients {
    let Some(obj) = value.as_object() else {
        fixes.push("macronutrients", CorrectionReason::NotAnObject, value);
        return Macronutrients::default();
    };
    Macronutrients {
        protein: non_negative("macronutrients.protein", field_or_null(obj, "protein"), fixes),
        carbs: non_negative("macronutrients.carbs", field_or_null(obj, "carbs"), fixes),
        fats: non_negative("macronutrients.fats", field_or_null(obj, "fats"), fixes),
    }
}

pub(crate) fn sanitize_rating(value: &Value, fixes: &mut Corrections) -> u8 {
    match coerce_i64(value) {
        Some(r @ 1..=10) => r as u8,
        Some(_) => {
            fixes.push("healthinessRating", CorrectionReason::OutOfRange, value);
            DEFAULT_RATING
        }
        None => {
            fixes.push("healthinessRating", CorrectionReason::NotANumber, value);
            DEFAULT_RATING
        }
    }
}

pub(crate) fn optional_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

static NULL: Value = Value::Null;

fn field_or_null<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a Value {
    obj.get(key).unwrap_or(&NULL)
}

/// Numbers pass through; strings parse their leading numeric prefix ("95 kcal",
/// "1.5e2g").
/// Anything else, or a non-finite result, is not a number.
fn coerce_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => numeric_prefix(s.trim_start(), true)?.parse().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => numeric_prefix(s.trim_start(), false)?.parse().ok(),
        _ => None,
    }
}

fn numeric_prefix(s: &str, allow_fraction: bool) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;
    if allow_fraction && end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        }
    }
    if allow_fraction && has_digits && matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    has_digits.then(|| &s[..end])
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
