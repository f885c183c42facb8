//! Daily targets and progress against them

use serde::Serialize;

use crate::models::UserProfile;
use super::aggregator::DietTotals;

/// Daily targets derived from body weight and per-kg goals
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroTargets {
    pub protein_g: f64,
    pub carbohydrate_g: f64,
    pub fat_g: f64,
    pub water_ml: f64,
    /// Energy of the three macro targets at 4/4/9 kcal per gram
    pub kcal_from_macros: f64,
}

impl MacroTargets {
    /// `None` when the profile has no weight
    pub fn from_profile(profile: &UserProfile) -> Option<Self> {
        let weight = profile.weight?;
        let protein_g = profile.protein_goal_per_kg * weight;
        let carbohydrate_g = profile.carbs_goal_per_kg * weight;
        let fat_g = profile.fat_goal_per_kg * weight;

        Some(Self {
            protein_g,
            carbohydrate_g,
            fat_g,
            water_ml: profile.water_goal_ml_per_kg * weight,
            kcal_from_macros: 4.0 * protein_g + 4.0 * carbohydrate_g + 9.0 * fat_g,
        })
    }
}

/// Consumed energy against a calorie goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub consumed_kcal: f64,
    pub goal_kcal: Option<f64>,
    /// Negative when over the goal
    pub remaining_kcal: Option<f64>,
    pub percent: Option<f64>,
}

impl GoalProgress {
    pub fn new(totals: &DietTotals, calorie_goal: Option<f64>) -> Self {
        let goal = calorie_goal.filter(|g| *g > 0.0);
        Self {
            consumed_kcal: totals.kcal,
            goal_kcal: goal,
            remaining_kcal: goal.map(|g| g - totals.kcal),
            percent: goal.map(|g| 100.0 * totals.kcal / g),
        }
    }
}

/// Share of each macro in the total macro grams, in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroSplit {
    pub protein_pct: f64,
    pub carbohydrate_pct: f64,
    pub fat_pct: f64,
}

impl MacroSplit {
    /// All zero when there are no macro grams
    pub fn from_totals(totals: &DietTotals) -> Self {
        let total = totals.protein + totals.carbohydrate + totals.fat;
        if total <= 0.0 {
            return Self::default();
        }
        Self {
            protein_pct: 100.0 * totals.protein / total,
            carbohydrate_pct: 100.0 * totals.carbohydrate / total,
            fat_pct: 100.0 * totals.fat / total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_from_profile() {
        let profile = UserProfile {
            weight: Some(70.0),
            ..Default::default()
        };
        let t = MacroTargets::from_profile(&profile).unwrap();
        assert_eq!(t.protein_g, 140.0);
        assert_eq!(t.carbohydrate_g, 140.0);
        assert_eq!(t.fat_g, 56.0);
        assert_eq!(t.water_ml, 2800.0);
        assert_eq!(t.kcal_from_macros, 560.0 + 560.0 + 504.0);

        assert!(MacroTargets::from_profile(&UserProfile::default()).is_none());
    }

    #[test]
    fn test_goal_progress() {
        let totals = DietTotals { kcal: 1500.0, ..Default::default() };
        let p = GoalProgress::new(&totals, Some(2000.0));
        assert_eq!(p.remaining_kcal, Some(500.0));
        assert_eq!(p.percent, Some(75.0));

        let none = GoalProgress::new(&totals, None);
        assert_eq!(none.remaining_kcal, None);
        assert_eq!(none.consumed_kcal, 1500.0);
    }

    #[test]
    fn test_macro_split() {
        let totals = DietTotals { kcal: 0.0, protein: 25.0, carbohydrate: 50.0, fat: 25.0 };
        let split = MacroSplit::from_totals(&totals);
        assert_eq!(split.protein_pct, 25.0);
        assert_eq!(split.carbohydrate_pct, 50.0);
        assert_eq!(split.fat_pct, 25.0);

        assert_eq!(MacroSplit::from_totals(&DietTotals::zero()), MacroSplit::default());
    }
}
