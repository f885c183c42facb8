//! Nutrition calculation module
//!
//! Portion scaling, diet aggregation, energy expenditure estimates and
//! goal tracking. Everything here is pure; storage lives in `models`.

pub mod aggregator;
pub mod goals;
pub mod metabolism;
pub mod scaler;
pub mod units;

use thiserror::Error;

pub use aggregator::{aggregate, DietSummary, DietTotals, MealGroup, PortionLine, UNCATEGORIZED};
pub use goals::{GoalProgress, MacroSplit, MacroTargets};
pub use metabolism::{
    basal_metabolic_rate, is_male, total_daily_expenditure, ActivityLevel, EnergyEstimate,
};
pub use scaler::{scale_portion, scale_portion_with, ScaledNutrients};
pub use units::{breakdown, NutrientField, NutrientGroup, NutrientUnit, NutrientValue, NUTRIENT_FIELDS};

/// Nutrition calculation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    #[error("portion must be a non-negative number of grams, got {grams}")]
    InvalidPortion { grams: f64 },

    #[error("{field} must be a non-negative number, got {value}")]
    NegativeNutrient { field: &'static str, value: f64 },
}
