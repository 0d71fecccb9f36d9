//! Prompt text sent to the model.

use crate::dashboard::aggregate::HistoryStats;

const ESTIMATE_INSTRUCTIONS: &str = r#"If an image is provided, use it to refine the analysis.
Provide a structured JSON response with:
- foodName: string
- calories: number (kcal)
- macronutrients: { protein: number, carbs: number, fats: number } (in grams)
- healthinessRating: number (1-10)
- healthierAlternative: string (optional, suggest if applicable)

Rules:
1. Use the provided food name and weight as the primary inputs.
2. If the image is provided, use it to verify or refine the food identification.
3. Estimate calories and macronutrients based on standard nutritional data for the food, scaled by weight.
4. Assign a healthiness rating (1-10) based on nutritional value (e.g., vegetables: 8-10, junk food: 1-3).
5. Suggest a healthier alternative if the food is less healthy (e.g., replace fried chicken with grilled chicken).
6. All numeric values must be JSON numbers (e.g., 95, not "95").
7. Macronutrients must be non-negative and proportional to the weight.
8. If data is uncertain, use reasonable defaults (e.g., healthinessRating: 5).

Example:
For "Apple", 150 grams:
{
  "foodName": "Apple",
  "calories": 95,
  "macronutrients": { "protein": 0.3, "carbs": 25.2, "fats": 0.2 },
  "healthinessRating": 8,
  "healthierAlternative": null
}"#;

const ANALYSIS_INSTRUCTIONS: &str = r#"Provide a structured JSON response with:
- summary: string (brief overview of the user's diet)
- nutritionalBalance: string (assessment of macronutrient distribution)
- healthinessTrend: string (analysis of healthiness ratings)
- recommendations: array of strings (specific suggestions for improvement)

Example:
{
  "summary": "Your diet consists of balanced meals with moderate calorie intake.",
  "nutritionalBalance": "Macronutrients are well-distributed, with a slight emphasis on carbs.",
  "healthinessTrend": "Your meals have an average healthiness rating of 7, indicating mostly healthy choices.",
  "recommendations": ["Increase protein intake with lean meats.", "Reduce processed carbs."]
}"#;

pub fn estimate_prompt(food_name: &str, weight: Option<f64>) -> String {
    let portion = match weight {
        Some(grams) => format!("with a weight of {grams} grams"),
        None => "with an unspecified weight (assume one typical serving)".to_string(),
    };
    format!("Analyze the food item {food_name:?} {portion}.\n{ESTIMATE_INSTRUCTIONS}\n")
}

pub fn analysis_prompt(stats: &HistoryStats) -> String {
    let m = &stats.macro_totals;
    format!(
        "Analyze the following meal history for a user over the last 30 days:\n\
         - Total meals: {}\n\
         - Average calories per meal: {:.2} kcal\n\
         - Total macronutrients: Protein: {:.2}g, Carbs: {:.2}g, Fats: {:.2}g\n\
         - Average healthiness rating: {:.2} (scale 1-10)\n\n\
         {ANALYSIS_INSTRUCTIONS}\n",
        stats.meal_count,
        stats.average_calories,
        m.protein,
        m.carbs,
        m.fats,
        stats.average_healthiness,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::Macronutrients;

    #[test]
    fn estimate_prompt_embeds_name_and_weight() {
        let p = estimate_prompt("Fried \"Chicken\"", Some(150.0));
        assert!(p.starts_with(r#"Analyze the food item "Fried \"Chicken\"" with a weight of 150 grams."#));
        assert!(p.contains("healthinessRating"));
    }

    #[test]
    fn estimate_prompt_without_weight() {
        let p = estimate_prompt("Rice", None);
        assert!(p.contains("unspecified weight"));
    }

    #[test]
    fn analysis_prompt_rounds_to_two_places() {
        let stats = HistoryStats {
            meal_count: 3,
            total_calories: 1000.0,
            average_calories: 1000.0 / 3.0,
            macro_totals: Macronutrients {
                protein: 40.0,
                carbs: 120.5,
                fats: 33.333,
            },
            average_healthiness: 6.5,
        };
        let p = analysis_prompt(&stats);
        assert!(p.contains("- Total meals: 3\n"));
        assert!(p.contains("333.33 kcal"));
        assert!(p.contains("Protein: 40.00g, Carbs: 120.50g, Fats: 33.33g"));
        assert!(p.contains("6.50 (scale 1-10)"));
        assert!(p.contains("\"recommendations\""));
    }
}
