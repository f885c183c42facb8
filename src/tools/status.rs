//! TACO Status Tool
//!
//! Provides runtime status information about the TACO service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::Database;
use crate::models::{Diet, NutrientRecord};

/// Diet planning instructions for AI assistants
pub const DIET_INSTRUCTIONS: &str = r#"
# TACO Diet Planning Instructions

The TACO table (Tabela Brasileira de Composição de Alimentos) lists the
composition of ~600 Brazilian foods. Every value is per 100 g of edible
portion. A missing value means "not measured", not zero.

## Finding foods

1. `search_foods` with at least 2 characters. Matching is a
   case-insensitive prefix of the food name, e.g. "arroz" or "feij".
2. `list_categories` / `list_foods_by_category` to browse.
3. `get_food` with `portion_grams` to see the breakdown for a portion.

## Building a diet

1. `create_diet` with a name, an optional daily `calorie_goal` and an
   optional list of items.
2. `add_diet_item` (or `add_diet_items_batch`) with `food_id`,
   `quantity_grams` (> 0) and an optional `meal` tag.
3. Suggested meal tags: Café da Manhã, Lanche da Manhã, Almoço,
   Lanche da Tarde, Jantar, Ceia. Any text is accepted; items without a
   tag are listed under "Uncategorized".
4. `get_diet` returns items grouped by meal with kcal, protein,
   carbohydrate and fat totals, plus progress against the calorie goal
   (the diet's own goal, or the profile goal when the diet has none).

## Profile

`update_profile` stores weight (kg), height (cm), age, sex and per-kg
macro goals. `get_profile` returns the basal metabolic rate
(Mifflin-St Jeor) and the total daily expenditure for an activity level:
sedentary, light, moderate, active or very_active. The estimate is 0
until weight, height, age and sex are all set.

## Rules

- Fat totals come from the lipid profile's total fat.
- Moisture is a percentage and is not scaled with the portion.
- Deleting a diet deletes its items.
"#;

/// Runtime status of the TACO service
#[derive(Debug, Clone, Serialize)]
pub struct TacoStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub food_count: Option<i64>,
    pub diet_count: Option<i64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> TacoStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let food_count = db.with_conn(NutrientRecord::count).ok();
        let diet_count = db.with_conn(Diet::count).ok();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        TacoStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            food_count,
            diet_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_status_reports_counts() {
        let db = Database::in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();

        let tracker = StatusTracker::new(PathBuf::from(":memory:"));
        let status = tracker.get_status(&db);

        assert_eq!(status.food_count, Some(0));
        assert_eq!(status.diet_count, Some(0));
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.process_id, std::process::id());
    }
}
