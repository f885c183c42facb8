//! User profile model
//!
//! Body measurements and per-kilogram macro goals, persisted as key-value
//! pairs in the `preferences` table.

use std::collections::HashMap;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

const WEIGHT: &str = "weight";
const HEIGHT: &str = "height";
const AGE: &str = "age";
const SEX: &str = "sex";
const PROTEIN_GOAL: &str = "protein_goal";
const CARBS_GOAL: &str = "carbs_goal";
const FAT_GOAL: &str = "fat_goal";
const WATER_GOAL: &str = "water_goal";
const CALORIE_GOAL: &str = "calorie_goal";

pub const DEFAULT_PROTEIN_GOAL_PER_KG: f64 = 2.0;
pub const DEFAULT_CARBS_GOAL_PER_KG: f64 = 2.0;
pub const DEFAULT_FAT_GOAL_PER_KG: f64 = 0.8;
pub const DEFAULT_WATER_GOAL_ML_PER_KG: f64 = 40.0;

/// The user's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// kg
    pub weight: Option<f64>,
    /// cm
    pub height: Option<f64>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub protein_goal_per_kg: f64,
    pub carbs_goal_per_kg: f64,
    pub fat_goal_per_kg: f64,
    pub water_goal_ml_per_kg: f64,
    /// kcal per day
    pub calorie_goal: Option<f64>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            weight: None,
            height: None,
            age: None,
            sex: None,
            protein_goal_per_kg: DEFAULT_PROTEIN_GOAL_PER_KG,
            carbs_goal_per_kg: DEFAULT_CARBS_GOAL_PER_KG,
            fat_goal_per_kg: DEFAULT_FAT_GOAL_PER_KG,
            water_goal_ml_per_kg: DEFAULT_WATER_GOAL_ML_PER_KG,
            calorie_goal: None,
        }
    }
}

/// Partial profile change; only provided fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub protein_goal_per_kg: Option<f64>,
    pub carbs_goal_per_kg: Option<f64>,
    pub fat_goal_per_kg: Option<f64>,
    pub water_goal_ml_per_kg: Option<f64>,
    pub calorie_goal: Option<f64>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.weight.is_none()
            && self.height.is_none()
            && self.age.is_none()
            && self.sex.is_none()
            && self.protein_goal_per_kg.is_none()
            && self.carbs_goal_per_kg.is_none()
            && self.fat_goal_per_kg.is_none()
            && self.water_goal_ml_per_kg.is_none()
            && self.calorie_goal.is_none()
    }
}

fn positive(name: &str, value: f64) -> DbResult<String> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DbError::Validation(format!("{} must be greater than zero, got {}", name, value)));
    }
    Ok(value.to_string())
}

fn non_negative(name: &str, value: f64) -> DbResult<String> {
    if !value.is_finite() || value < 0.0 {
        return Err(DbError::Validation(format!("{} cannot be negative, got {}", name, value)));
    }
    Ok(value.to_string())
}

fn sex_value(sex: &str) -> DbResult<String> {
    let sex = sex.trim();
    if sex.is_empty() {
        return Err(DbError::Validation("sex cannot be empty".to_string()));
    }
    Ok(sex.to_string())
}

fn parse_value<T: std::str::FromStr>(values: &HashMap<String, String>, key: &str) -> Option<T> {
    let raw = values.get(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable profile value");
            None
        }
    }
}

fn put(conn: &Connection, key: &str, value: &str) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO preferences (key, value)
        VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = datetime('now')
        "#,
        params![key, value],
    )?;
    Ok(())
}

fn remove(conn: &Connection, key: &str) -> DbResult<()> {
    conn.execute("DELETE FROM preferences WHERE key = ?1", [key])?;
    Ok(())
}

/// Validated key-value pairs for every field present in `update`
fn pending_writes(update: &ProfileUpdate) -> DbResult<Vec<(&'static str, String)>> {
    let mut writes = Vec::new();

    if let Some(w) = update.weight {
        writes.push((WEIGHT, positive(WEIGHT, w)?));
    }
    if let Some(h) = update.height {
        writes.push((HEIGHT, positive(HEIGHT, h)?));
    }
    if let Some(a) = update.age {
        writes.push((AGE, a.to_string()));
    }
    if let Some(ref s) = update.sex {
        writes.push((SEX, sex_value(s)?));
    }
    if let Some(g) = update.protein_goal_per_kg {
        writes.push((PROTEIN_GOAL, non_negative(PROTEIN_GOAL, g)?));
    }
    if let Some(g) = update.carbs_goal_per_kg {
        writes.push((CARBS_GOAL, non_negative(CARBS_GOAL, g)?));
    }
    if let Some(g) = update.fat_goal_per_kg {
        writes.push((FAT_GOAL, non_negative(FAT_GOAL, g)?));
    }
    if let Some(g) = update.water_goal_ml_per_kg {
        writes.push((WATER_GOAL, non_negative(WATER_GOAL, g)?));
    }
    if let Some(g) = update.calorie_goal {
        writes.push((CALORIE_GOAL, positive(CALORIE_GOAL, g)?));
    }

    Ok(writes)
}

/// Profile persistence over the `preferences` table
pub struct ProfileStore;

impl ProfileStore {
    /// Read the profile; absent keys fall back to the defaults
    pub fn load(conn: &Connection) -> DbResult<UserProfile> {
        let mut stmt = conn.prepare("SELECT key, value FROM preferences")?;
        let values = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;

        let defaults = UserProfile::default();
        Ok(UserProfile {
            weight: parse_value(&values, WEIGHT),
            height: parse_value(&values, HEIGHT),
            age: parse_value(&values, AGE),
            sex: values.get(SEX).cloned(),
            protein_goal_per_kg: parse_value(&values, PROTEIN_GOAL).unwrap_or(defaults.protein_goal_per_kg),
            carbs_goal_per_kg: parse_value(&values, CARBS_GOAL).unwrap_or(defaults.carbs_goal_per_kg),
            fat_goal_per_kg: parse_value(&values, FAT_GOAL).unwrap_or(defaults.fat_goal_per_kg),
            water_goal_ml_per_kg: parse_value(&values, WATER_GOAL).unwrap_or(defaults.water_goal_ml_per_kg),
            calorie_goal: parse_value(&values, CALORIE_GOAL),
        })
    }

    /// Replace the stored profile.
    ///
    /// Absent optional fields are removed; goal multipliers are always written.
    pub fn save(conn: &mut Connection, profile: &UserProfile) -> DbResult<UserProfile> {
        let update = ProfileUpdate {
            weight: profile.weight,
            height: profile.height,
            age: profile.age,
            sex: profile.sex.clone(),
            protein_goal_per_kg: Some(profile.protein_goal_per_kg),
            carbs_goal_per_kg: Some(profile.carbs_goal_per_kg),
            fat_goal_per_kg: Some(profile.fat_goal_per_kg),
            water_goal_ml_per_kg: Some(profile.water_goal_ml_per_kg),
            calorie_goal: profile.calorie_goal,
        };
        let writes = pending_writes(&update)?;

        let tx = conn.transaction()?;
        for key in [WEIGHT, HEIGHT, AGE, SEX, CALORIE_GOAL] {
            if !writes.iter().any(|(k, _)| *k == key) {
                remove(&tx, key)?;
            }
        }
        for (key, value) in &writes {
            put(&tx, key, value)?;
        }
        tx.commit()?;

        tracing::debug!("saved user profile");
        Self::load(conn)
    }

    /// Write only the fields present in `update`
    pub fn update(conn: &mut Connection, update: &ProfileUpdate) -> DbResult<UserProfile> {
        let writes = pending_writes(update)?;

        let tx = conn.transaction()?;
        for (key, value) in &writes {
            put(&tx, key, value)?;
        }
        tx.commit()?;

        tracing::debug!(fields = writes.len(), "updated user profile");
        Self::load(conn)
    }

    pub fn save_weight(conn: &Connection, weight: f64) -> DbResult<()> {
        put(conn, WEIGHT, &positive(WEIGHT, weight)?)
    }
}
