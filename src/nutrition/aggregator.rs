//! Diet aggregation
//!
//! Folds diet items into per-meal groups and running macro totals.

use std::ops::Add;

use serde::Serialize;

use crate::models::{normalize_meal_tag, DietItemWithFood, Nutrients};
use super::scaler::scale_portion;
use super::NutritionError;

/// Group name for items without a meal tag
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Energy and macro totals. Absent values count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DietTotals {
    pub kcal: f64,
    pub protein: f64,      // grams
    pub carbohydrate: f64, // grams
    pub fat: f64,          // grams
}

impl DietTotals {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Totals contributed by an already scaled composition
    pub fn from_nutrients(n: &Nutrients) -> Self {
        Self {
            kcal: n.energy_kcal.unwrap_or(0.0),
            protein: n.protein.unwrap_or(0.0),
            carbohydrate: n.carbohydrate.unwrap_or(0.0),
            fat: n.fat().unwrap_or(0.0),
        }
    }
}

impl Add for DietTotals {
    type Output = DietTotals;

    fn add(self, other: DietTotals) -> DietTotals {
        DietTotals {
            kcal: self.kcal + other.kcal,
            protein: self.protein + other.protein,
            carbohydrate: self.carbohydrate + other.carbohydrate,
            fat: self.fat + other.fat,
        }
    }
}

impl std::iter::Sum for DietTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(DietTotals::zero(), |acc, t| acc + t)
    }
}

/// One diet item after scaling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortionLine {
    pub item_id: i64,
    pub food_id: i64,
    pub name: String,
    pub grams: f64,
    pub totals: DietTotals,
}

/// Items sharing a meal tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealGroup {
    pub meal: String,
    pub items: Vec<PortionLine>,
    pub totals: DietTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DietSummary {
    /// In order of first appearance
    pub groups: Vec<MealGroup>,
    pub totals: DietTotals,
}

impl DietSummary {
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    pub fn group(&self, meal: &str) -> Option<&MealGroup> {
        self.groups.iter().find(|g| g.meal == meal)
    }
}

/// Group `items` by meal and total them.
///
/// Groups appear in first-seen order and keep input order inside.
pub fn aggregate(items: &[DietItemWithFood]) -> Result<DietSummary, NutritionError> {
    let mut groups: Vec<MealGroup> = Vec::new();

    for item in items {
        let scaled = scale_portion(&item.food, item.quantity_grams)?;
        let line = PortionLine {
            item_id: item.id,
            food_id: item.food.id,
            name: scaled.name,
            grams: scaled.grams,
            totals: DietTotals::from_nutrients(&scaled.nutrients),
        };

        let meal = normalize_meal_tag(item.meal_tag.as_deref())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());

        match groups.iter_mut().find(|g| g.meal == meal) {
            Some(group) => {
                group.totals = group.totals + line.totals;
                group.items.push(line);
            }
            None => groups.push(MealGroup {
                meal,
                totals: line.totals,
                items: vec![line],
            }),
        }
    }

    let totals = groups.iter().map(|g| g.totals).sum();
    Ok(DietSummary { groups, totals })
}
