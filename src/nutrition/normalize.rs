use serde_json::{Deserializer, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::repair::repair;
use super::validate::{validate, SchemaError, Validated};

/// Model output that could not be turned into an estimate.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid JSON format from model: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid JSON format from model: no JSON value found")]
    Empty,
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// repair → parse → validate.
///
/// Concatenated objects (`{..},{..}` after repair) resolve to the first one.
pub fn normalize_estimate(raw: &str) -> Result<Validated, NormalizeError> {
    let value = parse_repaired(raw)?;
    let validated = validate(&value)?;
    debug!(
        food_name = %validated.estimate.food_name,
        corrections = validated.corrections.len(),
        "model estimate normalized"
    );
    Ok(validated)
}

pub fn parse_repaired(raw: &str) -> Result<Value, NormalizeError> {
    let cleaned = repair(raw);
    let mut values = Deserializer::from_str(&cleaned).into_iter::<Value>();
    match values.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => {
            warn!(error = %e, raw = %raw, "model output is not valid JSON after repair");
            Err(NormalizeError::Parse(e))
        }
        None => {
            warn!(raw = %raw, "model output is empty after repair");
            Err(NormalizeError::Empty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_sloppy_output_normalizes() {
        let raw = "```json\n{foodName: \"Banana\", calories: 105, macronutrients: {protein: 1.3, carbs: 27, fats: 0.4,}, healthinessRating: 8, healthierAlternative: \"\",}\n```";
        let v = normalize_estimate(raw).unwrap();
        assert!(v.is_clean());
        assert_eq!(v.estimate.food_name, "Banana");
        assert_eq!(v.estimate.calories, 105.0);
        assert_eq!(v.estimate.healthier_alternative, None);
    }

    #[test]
    fn concatenated_objects_use_the_first() {
        let raw = r#"{"foodName":"Egg","calories":78,"macronutrients":{"protein":6,"carbs":0.6,"fats":5},"healthinessRating":7}{"foodName":"Toast","calories":80,"macronutrients":{},"healthinessRating":4}"#;
        let v = normalize_estimate(raw).unwrap();
        assert_eq!(v.estimate.food_name, "Egg");
        assert_eq!(v.estimate.healthiness_rating, 7);
    }

    #[test]
    fn array_wrapped_estimate_normalizes() {
        let raw = r#"[{"foodName":"Apple","calories":95,"macronutrients":{"protein":0.3,"carbs":25.2,"fats":0.2},"healthinessRating":8}]"#;
        let v = normalize_estimate(raw).unwrap();
        assert!(v.is_clean());
        assert_eq!(v.estimate.food_name, "Apple");
        assert_eq!(v.estimate.healthiness_rating, 8);
    }

    #[test]
    fn prose_without_json_is_a_parse_error() {
        let err = normalize_estimate("Sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, NormalizeError::Empty));
        assert!(err.to_string().starts_with("invalid JSON format from model"));
    }

    #[test]
    fn missing_key_is_a_schema_error() {
        let err = normalize_estimate("{\"foodName\": \"Apple\"}").unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::Schema(SchemaError::MissingField { field: "calories" })
        ));
    }

    #[test]
    fn unbalanced_object_is_a_parse_error() {
        let err = normalize_estimate("{\"foodName\": \"Apple\", ").unwrap_err();
        assert!(matches!(err, NormalizeError::Parse(_)));
    }
}
