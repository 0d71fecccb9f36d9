//! Pure roll-ups over an already-fetched set of meal records.
//!
//! Unconsumed records never count. Missing macronutrients count as 0.

use serde::Serialize;

use super::calendar::{DayWindow, WeekWindow, SLOT_LABELS};
use crate::nutrition::{Macronutrients, NutritionRecord};

const SLOTS: usize = SLOT_LABELS.len();

/// Rating assumed for history records that were logged without one.
const UNRATED_HEALTHINESS: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailySummary {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// One value per Sat..Fri slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeeklySeries(pub [f64; SLOTS]);

/// Totals and averages over a meal history, used for the diet analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub meal_count: usize,
    pub total_calories: f64,
    pub average_calories: f64,
    pub macro_totals: Macronutrients,
    pub average_healthiness: f64,
}

fn consumed(records: &[NutritionRecord]) -> impl Iterator<Item = &NutritionRecord> {
    records.iter().filter(|r| r.consumed)
}

pub fn daily_summary(records: &[NutritionRecord], today: &DayWindow) -> DailySummary {
    consumed(records)
        .filter(|r| today.contains(r.created_at))
        .fold(DailySummary::default(), |mut acc, r| {
            let m = r.macronutrients.or_zero();
            acc.calories += r.calories;
            acc.protein += m.protein;
            acc.carbs += m.carbs;
            acc.fats += m.fats;
            acc
        })
}

/// Consumed records inside the window, paired with their slot.
fn in_week<'a>(
    records: &'a [NutritionRecord],
    window: &'a WeekWindow,
) -> impl Iterator<Item = (usize, &'a NutritionRecord)> + 'a {
    consumed(records)
        .filter(move |r| window.contains(r.created_at))
        .filter_map(move |r| window.slot_index(r.created_at).map(|slot| (slot, r)))
}

pub fn weekly_calorie_trend(records: &[NutritionRecord], window: &WeekWindow) -> WeeklySeries {
    let mut totals = [0.0; SLOTS];
    for (slot, r) in in_week(records, window) {
        totals[slot] += r.calories;
    }
    WeeklySeries(totals)
}

/// Per-slot average rating; slots without rated records stay 0.
pub fn weekly_healthiness_trend(records: &[NutritionRecord], window: &WeekWindow) -> WeeklySeries {
    let mut sums = [0.0; SLOTS];
    let mut counts = [0u32; SLOTS];
    for (slot, r) in in_week(records, window) {
        if let Some(rating) = r.healthiness_rating {
            sums[slot] += f64::from(rating);
            counts[slot] += 1;
        }
    }
    let mut averages = [0.0; SLOTS];
    for slot in 0..SLOTS {
        if counts[slot] > 0 {
            averages[slot] = sums[slot] / f64::from(counts[slot]);
        }
    }
    WeeklySeries(averages)
}

pub fn macro_totals(records: &[NutritionRecord]) -> Macronutrients {
    consumed(records).fold(Macronutrients::default(), |mut acc, r| {
        let m = r.macronutrients.or_zero();
        acc.protein += m.protein;
        acc.carbs += m.carbs;
        acc.fats += m.fats;
        acc
    })
}

pub fn history_stats(records: &[NutritionRecord]) -> HistoryStats {
    let mut stats = HistoryStats {
        macro_totals: macro_totals(records),
        ..HistoryStats::default()
    };
    let mut rating_sum = 0.0;
    for r in consumed(records) {
        stats.meal_count += 1;
        stats.total_calories += r.calories;
        rating_sum += r
            .healthiness_rating
            .map_or(UNRATED_HEALTHINESS, f64::from);
    }
    if stats.meal_count > 0 {
        let n = stats.meal_count as f64;
        stats.average_calories = stats.total_calories / n;
        stats.average_healthiness = rating_sum / n;
    }
    stats
}
