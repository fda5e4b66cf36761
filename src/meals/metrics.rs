//! Diet adherence metrics over one user's meal history.

use serde::Serialize;

use super::repo_types::Meal;

/// Aggregate computed fresh for every request; never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealMetrics {
    pub total_meals: usize,
    pub total_meals_on_diet: usize,
    pub total_meals_off_diet: usize,
    pub best_on_diet_sequence: usize,
}

/// Computes counts and the longest run of consecutive in-diet meals.
///
/// Input order does not matter. The run is measured in chronological order:
/// `meal_datetime` ascending, then `created_at`, then `id`, so meals sharing a
/// timestamp are ordered by insertion.
pub fn compute(meals: &[Meal]) -> MealMetrics {
    let mut timeline: Vec<&Meal> = meals.iter().collect();
    timeline.sort_by(|a, b| {
        a.meal_datetime
            .cmp(&b.meal_datetime)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut on_diet = 0;
    let mut current = 0;
    let mut best = 0;
    for meal in timeline {
        if meal.in_diet {
            on_diet += 1;
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }

    MealMetrics {
        total_meals: meals.len(),
        total_meals_on_diet: on_diet,
        total_meals_off_diet: meals.len() - on_diet,
        best_on_diet_sequence: best,
    }
}
