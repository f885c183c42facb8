//! Portion scaling
//!
//! Food composition is tabulated per 100 g; a portion of `grams` scales
//! every present value by `grams / 100`.

use serde::Serialize;

use crate::models::{MoisturePolicy, NutrientRecord, Nutrients};
use super::NutritionError;

/// Grams the reference values are expressed for
pub const REFERENCE_GRAMS: f64 = 100.0;

/// A food's composition for a specific portion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledNutrients {
    pub food_id: i64,
    pub name: String,
    pub grams: f64,
    pub nutrients: Nutrients,
}

/// Scale `record` to `grams` with the default moisture policy
pub fn scale_portion(record: &NutrientRecord, grams: f64) -> Result<ScaledNutrients, NutritionError> {
    scale_portion_with(record, grams, MoisturePolicy::default())
}

pub fn scale_portion_with(
    record: &NutrientRecord,
    grams: f64,
    moisture: MoisturePolicy,
) -> Result<ScaledNutrients, NutritionError> {
    if !grams.is_finite() || grams < 0.0 {
        return Err(NutritionError::InvalidPortion { grams });
    }

    Ok(ScaledNutrients {
        food_id: record.id,
        name: record.name.clone(),
        grams,
        nutrients: record.nutrients.scale(grams / REFERENCE_GRAMS, moisture),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{AminoAcids, Lipids};

    pub(crate) fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    pub(crate) fn record(id: i64, name: &str, nutrients: Nutrients) -> NutrientRecord {
        NutrientRecord {
            id,
            code: id.to_string(),
            name: name.to_string(),
            category: "Teste".to_string(),
            nutrients,
        }
    }

    /// Cooked rice, the common reference food
    pub(crate) fn rice() -> NutrientRecord {
        record(1, "Arroz, tipo 1, cozido", Nutrients {
            energy_kcal: Some(124.0),
            protein: Some(2.6),
            carbohydrate: Some(25.8),
            moisture: Some(70.1),
            iron: Some(0.1),
            lipids: Some(Lipids {
                total: Some(1.0),
                saturated: Some(0.3),
                ..Default::default()
            }),
            amino_acids: Some(AminoAcids {
                lysine: Some(0.09),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    pub(crate) fn apple() -> NutrientRecord {
        record(2, "Maçã, Fuji, com casca, crua", Nutrients {
            energy_kcal: Some(56.0),
            protein: Some(0.3),
            carbohydrate: Some(15.2),
            moisture: Some(84.3),
            ..Default::default()
        })
    }

    #[test]
    fn test_identity_at_reference_portion() {
        let r = rice();
        let scaled = scale_portion(&r, 100.0).unwrap();
        assert_eq!(scaled.nutrients, r.nutrients);
        assert_eq!(scaled.grams, 100.0);
        assert_eq!(scaled.name, r.name);
    }

    #[test]
    fn test_scales_nested_fields() {
        let scaled = scale_portion(&rice(), 150.0).unwrap().nutrients;

        assert!(approx(scaled.energy_kcal.unwrap(), 186.0));
        assert!(approx(scaled.protein.unwrap(), 3.9));
        assert!(approx(scaled.fat().unwrap(), 1.5));
        let lipids = scaled.lipids.unwrap();
        assert!(approx(lipids.saturated.unwrap(), 0.45));
        assert_eq!(lipids.monounsaturated, None);
        assert!(approx(scaled.amino_acids.unwrap().lysine.unwrap(), 0.135));
    }

    #[test]
    fn test_absent_stays_absent() {
        let scaled = scale_portion(&apple(), 250.0).unwrap().nutrients;
        assert_eq!(scaled.sodium, None);
        assert_eq!(scaled.lipids, None);
        assert_eq!(scaled.amino_acids, None);
        assert_eq!(scaled.fat(), None);
    }

    #[test]
    fn test_round_trip_law() {
        let r = rice();
        for grams in [1.0, 37.5, 150.0, 1000.0] {
            let scaled = scale_portion(&r, grams).unwrap().nutrients;
            let back = scaled.scale(100.0 / grams, MoisturePolicy::Intensive);
            let original = r.nutrients.to_columns();
            for (a, b) in back.to_columns().iter().zip(original.iter()) {
                match (a, b) {
                    (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9 * b.abs().max(1.0)),
                    (None, None) => {}
                    _ => panic!("presence changed at {} g", grams),
                }
            }
        }
    }

    #[test]
    fn test_moisture_policies() {
        let r = rice();
        let intensive = scale_portion(&r, 200.0).unwrap();
        assert_eq!(intensive.nutrients.moisture, Some(70.1));

        let proportional = scale_portion_with(&r, 200.0, MoisturePolicy::Proportional).unwrap();
        assert!(approx(proportional.nutrients.moisture.unwrap(), 140.2));
    }

    #[test]
    fn test_zero_grams_zeroes_present_values() {
        let scaled = scale_portion(&apple(), 0.0).unwrap().nutrients;
        assert_eq!(scaled.energy_kcal, Some(0.0));
        assert_eq!(scaled.sodium, None);
    }

    #[test]
    fn test_invalid_portions() {
        let r = rice();
        assert_eq!(
            scale_portion(&r, -5.0),
            Err(NutritionError::InvalidPortion { grams: -5.0 })
        );
        assert!(scale_portion(&r, f64::INFINITY).is_err());
        assert!(scale_portion(&r, f64::NAN).is_err());
    }
}
