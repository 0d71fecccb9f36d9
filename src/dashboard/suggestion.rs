use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealSuggestion {
    pub name: String,
    pub calories: f64,
}

impl MealSuggestion {
    pub fn new(name: impl Into<String>, calories: f64) -> Self {
        Self {
            name: name.into(),
            calories,
        }
    }
}

/// Ordered, never-empty list of suggestions. The first entry doubles as the
/// fallback when nothing fits the budget.
#[derive(Debug, Clone)]
pub struct CandidateTable {
    candidates: Vec<MealSuggestion>,
}

impl CandidateTable {
    pub fn new(candidates: Vec<MealSuggestion>) -> Option<Self> {
        (!candidates.is_empty()).then_some(Self { candidates })
    }

    /// First candidate that fits in `remaining_calories`, else the first candidate.
    /// A negative budget always falls back.
    pub fn select(&self, remaining_calories: f64) -> &MealSuggestion {
        self.candidates
            .iter()
            .find(|c| c.calories <= remaining_calories)
            .unwrap_or(&self.candidates[0])
    }
}

impl Default for CandidateTable {
    fn default() -> Self {
        Self {
            candidates: vec![
                MealSuggestion::new("Grilled Chicken Salad", 300.0),
                MealSuggestion::new("Lentil Soup", 230.0),
                MealSuggestion::new("Greek Yogurt with Berries", 150.0),
                MealSuggestion::new("Apple with Almond Butter", 120.0),
                MealSuggestion::new("Cucumber and Hummus", 80.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CandidateTable {
        CandidateTable::new(vec![
            MealSuggestion::new("A", 300.0),
            MealSuggestion::new("B", 250.0),
        ])
        .unwrap()
    }

    #[test]
    fn falls_back_to_first_when_nothing_fits() {
        assert_eq!(table().select(100.0), &MealSuggestion::new("A", 300.0));
    }

    #[test]
    fn negative_budget_falls_back() {
        assert_eq!(table().select(-450.0).name, "A");
    }

    #[test]
    fn picks_first_fit_in_table_order() {
        assert_eq!(table().select(260.0).name, "B");
        assert_eq!(table().select(300.0).name, "A");
        assert_eq!(table().select(5000.0).name, "A");
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(CandidateTable::new(Vec::new()).is_none());
    }

    #[test]
    fn default_table_walks_down_with_the_budget() {
        let t = CandidateTable::default();
        assert_eq!(t.select(2000.0).name, "Grilled Chicken Salad");
        assert_eq!(t.select(200.0).name, "Greek Yogurt with Berries");
        assert_eq!(t.select(50.0).name, "Grilled Chicken Salad");
    }
}
