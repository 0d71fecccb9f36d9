use serde::Serialize;
use serde_json::Value;

/// Diet analysis as returned to the client. Every field is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub summary: String,
    pub nutritional_balance: String,
    pub healthiness_trend: String,
    pub recommendations: Vec<String>,
}

impl InsightReport {
    /// Shown when the user has not logged anything in the analysis period.
    pub fn empty_history() -> Self {
        Self {
            summary: "No meals logged in the last 30 days.".into(),
            nutritional_balance: "N/A".into(),
            healthiness_trend: "N/A".into(),
            recommendations: vec!["Start logging meals to receive personalized insights.".into()],
        }
    }

    /// Keeps what the model answered and fills every missing or malformed field
    /// with a neutral default. Non-object values become the all-default report.
    pub fn sanitize(value: &Value) -> Self {
        let text = |key: &str, fallback: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        let recommendations: Vec<String> = value
            .get("recommendations")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            summary: text("summary", "No summary provided."),
            nutritional_balance: text("nutritionalBalance", "No nutritional balance data provided."),
            healthiness_trend: text("healthinessTrend", "No healthiness trend data provided."),
            recommendations: if recommendations.is_empty() {
                vec!["No specific recommendations available.".into()]
            } else {
                recommendations
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_complete_answers() {
        let r = InsightReport::sanitize(&json!({
            "summary": "Balanced.",
            "nutritionalBalance": "Carb heavy.",
            "healthinessTrend": "Improving.",
            "recommendations": ["Eat more fish.", "Walk daily."]
        }));
        assert_eq!(r.summary, "Balanced.");
        assert_eq!(r.recommendations, vec!["Eat more fish.", "Walk daily."]);
    }

    #[test]
    fn fills_missing_and_malformed_fields() {
        let r = InsightReport::sanitize(&json!({
            "summary": "  ",
            "healthinessTrend": 7,
            "recommendations": "eat better"
        }));
        assert_eq!(r.summary, "No summary provided.");
        assert_eq!(r.nutritional_balance, "No nutritional balance data provided.");
        assert_eq!(r.healthiness_trend, "No healthiness trend data provided.");
        assert_eq!(r.recommendations, vec!["No specific recommendations available."]);
    }

    #[test]
    fn non_object_gets_all_defaults() {
        let r = InsightReport::sanitize(&json!([1, 2]));
        assert_eq!(r.summary, "No summary provided.");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(InsightReport::empty_history()).unwrap();
        assert_eq!(json["nutritionalBalance"], "N/A");
        assert_eq!(json["recommendations"].as_array().unwrap().len(), 1);
    }
}
