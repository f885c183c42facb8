//! Energy expenditure estimates
//!
//! Basal metabolic rate by the Mifflin-St Jeor equation, and total daily
//! expenditure through a discrete activity multiplier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::UserProfile;

/// Activity level and its expenditure multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Levels from least to most active
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary (little or no exercise)",
            ActivityLevel::Light => "Light (exercise 1-3 days/week)",
            ActivityLevel::Moderate => "Moderate (exercise 3-5 days/week)",
            ActivityLevel::Active => "Active (exercise 6-7 days/week)",
            ActivityLevel::VeryActive => "Very active (hard exercise or physical job)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    /// Accepts the snake_case name, spaced or hyphenated variants, and the
    /// Portuguese names used by the dataset's app
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect();

        match key.as_str() {
            "sedentary" | "sedentario" | "sedentário" => Ok(ActivityLevel::Sedentary),
            "light" | "lightlyactive" | "leve" => Ok(ActivityLevel::Light),
            "moderate" | "moderatelyactive" | "moderado" => Ok(ActivityLevel::Moderate),
            "active" | "ativo" => Ok(ActivityLevel::Active),
            "veryactive" | "muitoativo" => Ok(ActivityLevel::VeryActive),
            _ => Err(format!(
                "Unknown activity level '{}'. Use one of: sedentary, light, moderate, active, very_active",
                s
            )),
        }
    }
}

/// Whether `sex` denotes male; anything else uses the female constant
pub fn is_male(sex: &str) -> bool {
    let sex = sex.trim();
    sex.eq_ignore_ascii_case("male") || sex.eq_ignore_ascii_case("masculino")
}

/// Mifflin-St Jeor basal metabolic rate in kcal/day.
///
/// Returns `0.0` when weight, height, age or sex is missing.
pub fn basal_metabolic_rate(profile: &UserProfile) -> f64 {
    mifflin_st_jeor(profile).unwrap_or(0.0)
}

fn mifflin_st_jeor(profile: &UserProfile) -> Option<f64> {
    let (Some(weight), Some(height), Some(age), Some(sex)) =
        (profile.weight, profile.height, profile.age, profile.sex.as_deref())
    else {
        return None;
    };

    let base = 10.0 * weight + 6.25 * height - 5.0 * f64::from(age);
    Some(if is_male(sex) { base + 5.0 } else { base - 161.0 })
}

/// Basal rate times the activity multiplier; `0.0` when the basal rate is
pub fn total_daily_expenditure(profile: &UserProfile, level: ActivityLevel) -> f64 {
    basal_metabolic_rate(profile) * level.multiplier()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyEstimate {
    pub activity_level: ActivityLevel,
    pub multiplier: f64,
    pub bmr: f64,
    pub tdee: f64,
    /// False when weight, height, age or sex was missing
    pub estimated: bool,
}

impl EnergyEstimate {
    pub fn for_profile(profile: &UserProfile, level: ActivityLevel) -> Self {
        let bmr = mifflin_st_jeor(profile);
        let value = bmr.unwrap_or(0.0);
        Self {
            activity_level: level,
            multiplier: level.multiplier(),
            bmr: value,
            tdee: value * level.multiplier(),
            estimated: bmr.is_some(),
        }
    }

    pub fn has_estimate(&self) -> bool {
        self.estimated
    }
}
