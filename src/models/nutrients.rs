//! Nutrient composition value object
//!
//! Shared by food records (per 100 g) and scaled portions. Every value is
//! optional: `None` means "not measured", which is different from zero.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::nutrition::NutritionError;

/// Lipid profile, grams
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lipids {
    pub total: Option<f64>,
    pub saturated: Option<f64>,
    pub monounsaturated: Option<f64>,
    pub polyunsaturated: Option<f64>,
}

/// Amino-acid profile, grams
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AminoAcids {
    pub tryptophan: Option<f64>,
    pub threonine: Option<f64>,
    pub isoleucine: Option<f64>,
    pub leucine: Option<f64>,
    pub lysine: Option<f64>,
    pub methionine: Option<f64>,
    pub cystine: Option<f64>,
    pub phenylalanine: Option<f64>,
    pub tyrosine: Option<f64>,
    pub valine: Option<f64>,
    pub arginine: Option<f64>,
    pub histidine: Option<f64>,
    pub alanine: Option<f64>,
    pub aspartic_acid: Option<f64>,
    pub glutamic_acid: Option<f64>,
    pub glycine: Option<f64>,
    pub proline: Option<f64>,
    pub serine: Option<f64>,
}

/// How the moisture percentage behaves when a portion is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoisturePolicy {
    /// Moisture is a percentage of the food and stays as-is
    #[default]
    Intensive,
    /// Moisture is scaled like every other field
    Proportional,
}

/// Full nutrient composition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrients {
    pub energy_kcal: Option<f64>,
    pub energy_kj: Option<f64>,
    pub protein: Option<f64>,        // g
    pub carbohydrate: Option<f64>,   // g
    pub dietary_fiber: Option<f64>,  // g
    pub ash: Option<f64>,            // g
    pub cholesterol: Option<f64>,    // mg
    pub moisture: Option<f64>,       // %

    pub calcium: Option<f64>,        // mg
    pub magnesium: Option<f64>,      // mg
    pub manganese: Option<f64>,      // mg
    pub phosphorus: Option<f64>,     // mg
    pub iron: Option<f64>,           // mg
    pub sodium: Option<f64>,         // mg
    pub potassium: Option<f64>,      // mg
    pub copper: Option<f64>,         // mg
    pub zinc: Option<f64>,           // mg

    pub retinol: Option<f64>,        // µg
    pub re: Option<f64>,             // µg
    pub rae: Option<f64>,            // µg
    pub thiamine: Option<f64>,       // mg
    pub riboflavin: Option<f64>,     // mg
    pub pyridoxine: Option<f64>,     // mg
    pub niacin: Option<f64>,         // mg
    pub vitamin_c: Option<f64>,      // mg

    pub lipids: Option<Lipids>,
    pub amino_acids: Option<AminoAcids>,
}

pub const NUTRIENT_COLUMN_COUNT: usize = 47;

/// Column names in the `foods` table, in the order used by
/// [`Nutrients::to_columns`] and [`Nutrients::from_columns`]
pub const NUTRIENT_COLUMNS: [&str; NUTRIENT_COLUMN_COUNT] = [
    "energy_kcal",
    "energy_kj",
    "protein",
    "carbohydrate",
    "dietary_fiber",
    "ash",
    "cholesterol",
    "moisture",
    "calcium",
    "magnesium",
    "manganese",
    "phosphorus",
    "iron",
    "sodium",
    "potassium",
    "copper",
    "zinc",
    "retinol",
    "re",
    "rae",
    "thiamine",
    "riboflavin",
    "pyridoxine",
    "niacin",
    "vitamin_c",
    "lipids_total",
    "lipids_saturated",
    "lipids_monounsaturated",
    "lipids_polyunsaturated",
    "amino_tryptophan",
    "amino_threonine",
    "amino_isoleucine",
    "amino_leucine",
    "amino_lysine",
    "amino_methionine",
    "amino_cystine",
    "amino_phenylalanine",
    "amino_tyrosine",
    "amino_valine",
    "amino_arginine",
    "amino_histidine",
    "amino_alanine",
    "amino_aspartic_acid",
    "amino_glutamic_acid",
    "amino_glycine",
    "amino_proline",
    "amino_serine",
];

const LIPIDS_START: usize = 25;
const AMINO_START: usize = 29;

fn scaled(value: Option<f64>, factor: f64) -> Option<f64> {
    value.map(|v| v * factor)
}

impl Lipids {
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            total: scaled(self.total, factor),
            saturated: scaled(self.saturated, factor),
            monounsaturated: scaled(self.monounsaturated, factor),
            polyunsaturated: scaled(self.polyunsaturated, factor),
        }
    }

    fn is_empty(&self) -> bool {
        self.total.is_none()
            && self.saturated.is_none()
            && self.monounsaturated.is_none()
            && self.polyunsaturated.is_none()
    }
}

impl AminoAcids {
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            tryptophan: scaled(self.tryptophan, factor),
            threonine: scaled(self.threonine, factor),
            isoleucine: scaled(self.isoleucine, factor),
            leucine: scaled(self.leucine, factor),
            lysine: scaled(self.lysine, factor),
            methionine: scaled(self.methionine, factor),
            cystine: scaled(self.cystine, factor),
            phenylalanine: scaled(self.phenylalanine, factor),
            tyrosine: scaled(self.tyrosine, factor),
            valine: scaled(self.valine, factor),
            arginine: scaled(self.arginine, factor),
            histidine: scaled(self.histidine, factor),
            alanine: scaled(self.alanine, factor),
            aspartic_acid: scaled(self.aspartic_acid, factor),
            glutamic_acid: scaled(self.glutamic_acid, factor),
            glycine: scaled(self.glycine, factor),
            proline: scaled(self.proline, factor),
            serine: scaled(self.serine, factor),
        }
    }

    fn to_array(&self) -> [Option<f64>; 18] {
        [
            self.tryptophan,
            self.threonine,
            self.isoleucine,
            self.leucine,
            self.lysine,
            self.methionine,
            self.cystine,
            self.phenylalanine,
            self.tyrosine,
            self.valine,
            self.arginine,
            self.histidine,
            self.alanine,
            self.aspartic_acid,
            self.glutamic_acid,
            self.glycine,
            self.proline,
            self.serine,
        ]
    }

    fn from_slice(v: &[Option<f64>]) -> Self {
        Self {
            tryptophan: v[0],
            threonine: v[1],
            isoleucine: v[2],
            leucine: v[3],
            lysine: v[4],
            methionine: v[5],
            cystine: v[6],
            phenylalanine: v[7],
            tyrosine: v[8],
            valine: v[9],
            arginine: v[10],
            histidine: v[11],
            alanine: v[12],
            aspartic_acid: v[13],
            glutamic_acid: v[14],
            glycine: v[15],
            proline: v[16],
            serine: v[17],
        }
    }

    fn is_empty(&self) -> bool {
        self.to_array().iter().all(Option::is_none)
    }
}

impl Nutrients {
    /// Multiply every present value by `factor`.
    ///
    /// Absent values and absent sub-records stay absent.
    pub fn scale(&self, factor: f64, moisture: MoisturePolicy) -> Self {
        Self {
            energy_kcal: scaled(self.energy_kcal, factor),
            energy_kj: scaled(self.energy_kj, factor),
            protein: scaled(self.protein, factor),
            carbohydrate: scaled(self.carbohydrate, factor),
            dietary_fiber: scaled(self.dietary_fiber, factor),
            ash: scaled(self.ash, factor),
            cholesterol: scaled(self.cholesterol, factor),
            moisture: match moisture {
                MoisturePolicy::Intensive => self.moisture,
                MoisturePolicy::Proportional => scaled(self.moisture, factor),
            },
            calcium: scaled(self.calcium, factor),
            magnesium: scaled(self.magnesium, factor),
            manganese: scaled(self.manganese, factor),
            phosphorus: scaled(self.phosphorus, factor),
            iron: scaled(self.iron, factor),
            sodium: scaled(self.sodium, factor),
            potassium: scaled(self.potassium, factor),
            copper: scaled(self.copper, factor),
            zinc: scaled(self.zinc, factor),
            retinol: scaled(self.retinol, factor),
            re: scaled(self.re, factor),
            rae: scaled(self.rae, factor),
            thiamine: scaled(self.thiamine, factor),
            riboflavin: scaled(self.riboflavin, factor),
            pyridoxine: scaled(self.pyridoxine, factor),
            niacin: scaled(self.niacin, factor),
            vitamin_c: scaled(self.vitamin_c, factor),
            lipids: self.lipids.as_ref().map(|l| l.scale(factor)),
            amino_acids: self.amino_acids.as_ref().map(|a| a.scale(factor)),
        }
    }

    /// Total fat, from the lipid profile
    pub fn fat(&self) -> Option<f64> {
        self.lipids.as_ref().and_then(|l| l.total)
    }

    /// Flatten into column order (see [`NUTRIENT_COLUMNS`])
    pub fn to_columns(&self) -> [Option<f64>; NUTRIENT_COLUMN_COUNT] {
        let mut out = [None; NUTRIENT_COLUMN_COUNT];
        let head = [
            self.energy_kcal,
            self.energy_kj,
            self.protein,
            self.carbohydrate,
            self.dietary_fiber,
            self.ash,
            self.cholesterol,
            self.moisture,
            self.calcium,
            self.magnesium,
            self.manganese,
            self.phosphorus,
            self.iron,
            self.sodium,
            self.potassium,
            self.copper,
            self.zinc,
            self.retinol,
            self.re,
            self.rae,
            self.thiamine,
            self.riboflavin,
            self.pyridoxine,
            self.niacin,
            self.vitamin_c,
        ];
        out[..LIPIDS_START].copy_from_slice(&head);

        if let Some(l) = &self.lipids {
            out[LIPIDS_START..AMINO_START]
                .copy_from_slice(&[l.total, l.saturated, l.monounsaturated, l.polyunsaturated]);
        }
        if let Some(a) = &self.amino_acids {
            out[AMINO_START..].copy_from_slice(&a.to_array());
        }
        out
    }

    /// Rebuild from column order. A sub-record whose columns are all
    /// absent becomes `None`.
    pub fn from_columns(v: &[Option<f64>; NUTRIENT_COLUMN_COUNT]) -> Self {
        let lipids = Lipids {
            total: v[25],
            saturated: v[26],
            monounsaturated: v[27],
            polyunsaturated: v[28],
        };
        let amino_acids = AminoAcids::from_slice(&v[AMINO_START..]);

        Self {
            energy_kcal: v[0],
            energy_kj: v[1],
            protein: v[2],
            carbohydrate: v[3],
            dietary_fiber: v[4],
            ash: v[5],
            cholesterol: v[6],
            moisture: v[7],
            calcium: v[8],
            magnesium: v[9],
            manganese: v[10],
            phosphorus: v[11],
            iron: v[12],
            sodium: v[13],
            potassium: v[14],
            copper: v[15],
            zinc: v[16],
            retinol: v[17],
            re: v[18],
            rae: v[19],
            thiamine: v[20],
            riboflavin: v[21],
            pyridoxine: v[22],
            niacin: v[23],
            vitamin_c: v[24],
            lipids: (!lipids.is_empty()).then_some(lipids),
            amino_acids: (!amino_acids.is_empty()).then_some(amino_acids),
        }
    }

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let mut values = [None; NUTRIENT_COLUMN_COUNT];
        for (slot, column) in values.iter_mut().zip(NUTRIENT_COLUMNS) {
            *slot = row.get(column)?;
        }
        Ok(Self::from_columns(&values))
    }

    /// Value of a single column by name, `None` for unknown names
    pub fn get(&self, column: &str) -> Option<f64> {
        let index = NUTRIENT_COLUMNS.iter().position(|c| *c == column)?;
        self.to_columns()[index]
    }

    /// First present value that is negative or not finite, as `(column, value)`
    pub fn first_invalid(&self) -> Option<(&'static str, f64)> {
        NUTRIENT_COLUMNS
            .iter()
            .zip(self.to_columns())
            .find_map(|(column, value)| match value {
                Some(v) if !v.is_finite() || v < 0.0 => Some((*column, v)),
                _ => None,
            })
    }

    pub fn validate(&self) -> Result<(), NutritionError> {
        match self.first_invalid() {
            Some((field, value)) => Err(NutritionError::NegativeNutrient { field, value }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Nutrients {
        Nutrients {
            energy_kcal: Some(124.0),
            protein: Some(2.6),
            moisture: Some(70.1),
            vitamin_c: None,
            lipids: Some(Lipids {
                total: Some(1.0),
                saturated: Some(0.3),
                monounsaturated: None,
                polyunsaturated: Some(0.3),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_columns_roundtrip_preserves_absence() {
        let n = sample();
        assert_eq!(Nutrients::from_columns(&n.to_columns()), n);
    }

    #[test]
    fn test_all_null_sub_records_collapse() {
        let n = Nutrients::from_columns(&[None; NUTRIENT_COLUMN_COUNT]);
        assert!(n.lipids.is_none());
        assert!(n.amino_acids.is_none());
    }

    #[test]
    fn test_get_by_column() {
        let n = sample();
        assert_eq!(n.get("protein"), Some(2.6));
        assert_eq!(n.get("lipids_saturated"), Some(0.3));
        assert_eq!(n.get("vitamin_c"), None);
        assert_eq!(n.get("no_such_column"), None);
    }

    #[test]
    fn test_moisture_policy() {
        let n = sample();
        let intensive = n.scale(2.0, MoisturePolicy::Intensive);
        let proportional = n.scale(2.0, MoisturePolicy::Proportional);
        assert_eq!(intensive.moisture, Some(70.1));
        assert_eq!(proportional.moisture, Some(140.2));
        assert_eq!(intensive.energy_kcal, Some(248.0));
    }

    #[test]
    fn test_first_invalid() {
        let mut n = sample();
        assert_eq!(n.first_invalid(), None);
        n.amino_acids = Some(AminoAcids {
            lysine: Some(-0.1),
            ..Default::default()
        });
        assert_eq!(n.first_invalid(), Some(("amino_lysine", -0.1)));
        n.iron = Some(f64::NAN);
        assert_eq!(n.first_invalid().map(|(c, _)| c), Some("iron"));
        assert!(matches!(
            n.validate(),
            Err(NutritionError::NegativeNutrient { field: "iron", .. })
        ));
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_fat_reads_lipid_total() {
        assert_eq!(sample().fat(), Some(1.0));
        assert_eq!(Nutrients::default().fat(), None);
    }
}
