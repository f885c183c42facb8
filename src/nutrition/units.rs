//! Nutrient units and display catalog
//!
//! Each column of the composition table has a label, a unit and a group,
//! used to render per-portion breakdowns.

use serde::Serialize;

use crate::models::{Nutrients, NUTRIENT_COLUMNS, NUTRIENT_COLUMN_COUNT};

/// Unit a nutrient value is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientUnit {
    Kcal,
    Kj,
    Grams,
    Milligrams,
    Micrograms,
    Percent,
}

impl NutrientUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            NutrientUnit::Kcal => "kcal",
            NutrientUnit::Kj => "kJ",
            NutrientUnit::Grams => "g",
            NutrientUnit::Milligrams => "mg",
            NutrientUnit::Micrograms => "µg",
            NutrientUnit::Percent => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientGroup {
    Energy,
    Macronutrients,
    Minerals,
    Vitamins,
    Lipids,
    AminoAcids,
}

/// One column of the composition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NutrientField {
    pub column: &'static str,
    pub label: &'static str,
    pub unit: NutrientUnit,
    pub group: NutrientGroup,
}

const fn field(
    column: &'static str,
    label: &'static str,
    unit: NutrientUnit,
    group: NutrientGroup,
) -> NutrientField {
    NutrientField { column, label, unit, group }
}

use NutrientGroup as G;
use NutrientUnit as U;

/// Catalog in column order (see [`NUTRIENT_COLUMNS`])
pub const NUTRIENT_FIELDS: [NutrientField; NUTRIENT_COLUMN_COUNT] = [
    field("energy_kcal", "Energy", U::Kcal, G::Energy),
    field("energy_kj", "Energy", U::Kj, G::Energy),
    field("protein", "Protein", U::Grams, G::Macronutrients),
    field("carbohydrate", "Carbohydrate", U::Grams, G::Macronutrients),
    field("dietary_fiber", "Dietary fiber", U::Grams, G::Macronutrients),
    field("ash", "Ash", U::Grams, G::Macronutrients),
    field("cholesterol", "Cholesterol", U::Milligrams, G::Macronutrients),
    field("moisture", "Moisture", U::Percent, G::Macronutrients),
    field("calcium", "Calcium", U::Milligrams, G::Minerals),
    field("magnesium", "Magnesium", U::Milligrams, G::Minerals),
    field("manganese", "Manganese", U::Milligrams, G::Minerals),
    field("phosphorus", "Phosphorus", U::Milligrams, G::Minerals),
    field("iron", "Iron", U::Milligrams, G::Minerals),
    field("sodium", "Sodium", U::Milligrams, G::Minerals),
    field("potassium", "Potassium", U::Milligrams, G::Minerals),
    field("copper", "Copper", U::Milligrams, G::Minerals),
    field("zinc", "Zinc", U::Milligrams, G::Minerals),
    field("retinol", "Retinol", U::Micrograms, G::Vitamins),
    field("re", "Vitamin A (RE)", U::Micrograms, G::Vitamins),
    field("rae", "Vitamin A (RAE)", U::Micrograms, G::Vitamins),
    field("thiamine", "Thiamine", U::Milligrams, G::Vitamins),
    field("riboflavin", "Riboflavin", U::Milligrams, G::Vitamins),
    field("pyridoxine", "Pyridoxine", U::Milligrams, G::Vitamins),
    field("niacin", "Niacin", U::Milligrams, G::Vitamins),
    field("vitamin_c", "Vitamin C", U::Milligrams, G::Vitamins),
    field("lipids_total", "Total fat", U::Grams, G::Lipids),
    field("lipids_saturated", "Saturated fat", U::Grams, G::Lipids),
    field("lipids_monounsaturated", "Monounsaturated fat", U::Grams, G::Lipids),
    field("lipids_polyunsaturated", "Polyunsaturated fat", U::Grams, G::Lipids),
    field("amino_tryptophan", "Tryptophan", U::Grams, G::AminoAcids),
    field("amino_threonine", "Threonine", U::Grams, G::AminoAcids),
    field("amino_isoleucine", "Isoleucine", U::Grams, G::AminoAcids),
    field("amino_leucine", "Leucine", U::Grams, G::AminoAcids),
    field("amino_lysine", "Lysine", U::Grams, G::AminoAcids),
    field("amino_methionine", "Methionine", U::Grams, G::AminoAcids),
    field("amino_cystine", "Cystine", U::Grams, G::AminoAcids),
    field("amino_phenylalanine", "Phenylalanine", U::Grams, G::AminoAcids),
    field("amino_tyrosine", "Tyrosine", U::Grams, G::AminoAcids),
    field("amino_valine", "Valine", U::Grams, G::AminoAcids),
    field("amino_arginine", "Arginine", U::Grams, G::AminoAcids),
    field("amino_histidine", "Histidine", U::Grams, G::AminoAcids),
    field("amino_alanine", "Alanine", U::Grams, G::AminoAcids),
    field("amino_aspartic_acid", "Aspartic acid", U::Grams, G::AminoAcids),
    field("amino_glutamic_acid", "Glutamic acid", U::Grams, G::AminoAcids),
    field("amino_glycine", "Glycine", U::Grams, G::AminoAcids),
    field("amino_proline", "Proline", U::Grams, G::AminoAcids),
    field("amino_serine", "Serine", U::Grams, G::AminoAcids),
];

/// A present value with its catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientValue {
    pub column: &'static str,
    pub label: &'static str,
    pub group: NutrientGroup,
    pub value: f64,
    pub unit: &'static str,
}

impl NutrientField {
    pub fn lookup(column: &str) -> Option<&'static NutrientField> {
        NUTRIENT_FIELDS.iter().find(|f| f.column == column)
    }

    pub fn value_of(&self, nutrients: &Nutrients) -> Option<f64> {
        nutrients.get(self.column)
    }
}

/// Present values in catalog order; absent values are skipped
pub fn breakdown(nutrients: &Nutrients) -> Vec<NutrientValue> {
    NUTRIENT_FIELDS
        .iter()
        .zip(nutrients.to_columns())
        .filter_map(|(f, value)| {
            value.map(|value| NutrientValue {
                column: f.column,
                label: f.label,
                group: f.group,
                value,
                unit: f.unit.symbol(),
            })
        })
        .collect()
}
