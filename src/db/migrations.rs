//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- FOODS
        -- TACO reference table, values per 100 g.
        -- Every nutrient is nullable: NULL means "not measured".
        -- Present values are never negative.
        -- ============================================
        CREATE TABLE foods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL,                  -- stable external code from the dataset
            name TEXT NOT NULL,
            category TEXT NOT NULL,

            energy_kcal REAL CHECK(energy_kcal IS NULL OR energy_kcal >= 0),
            energy_kj REAL CHECK(energy_kj IS NULL OR energy_kj >= 0),
            protein REAL CHECK(protein IS NULL OR protein >= 0),      -- g
            carbohydrate REAL CHECK(carbohydrate IS NULL OR carbohydrate >= 0), -- g
            dietary_fiber REAL CHECK(dietary_fiber IS NULL OR dietary_fiber >= 0), -- g
            ash REAL CHECK(ash IS NULL OR ash >= 0),                  -- g
            cholesterol REAL CHECK(cholesterol IS NULL OR cholesterol >= 0), -- mg
            moisture REAL CHECK(moisture IS NULL OR moisture >= 0),   -- %

            calcium REAL CHECK(calcium IS NULL OR calcium >= 0),      -- mg
            magnesium REAL CHECK(magnesium IS NULL OR magnesium >= 0), -- mg
            manganese REAL CHECK(manganese IS NULL OR manganese >= 0), -- mg
            phosphorus REAL CHECK(phosphorus IS NULL OR phosphorus >= 0), -- mg
            iron REAL CHECK(iron IS NULL OR iron >= 0),               -- mg
            sodium REAL CHECK(sodium IS NULL OR sodium >= 0),         -- mg
            potassium REAL CHECK(potassium IS NULL OR potassium >= 0), -- mg
            copper REAL CHECK(copper IS NULL OR copper >= 0),         -- mg
            zinc REAL CHECK(zinc IS NULL OR zinc >= 0),               -- mg

            retinol REAL CHECK(retinol IS NULL OR retinol >= 0),      -- µg
            re REAL CHECK(re IS NULL OR re >= 0),                     -- µg
            rae REAL CHECK(rae IS NULL OR rae >= 0),                  -- µg
            thiamine REAL CHECK(thiamine IS NULL OR thiamine >= 0),   -- mg
            riboflavin REAL CHECK(riboflavin IS NULL OR riboflavin >= 0), -- mg
            pyridoxine REAL CHECK(pyridoxine IS NULL OR pyridoxine >= 0), -- mg
            niacin REAL CHECK(niacin IS NULL OR niacin >= 0),         -- mg
            vitamin_c REAL CHECK(vitamin_c IS NULL OR vitamin_c >= 0), -- mg

            lipids_total REAL CHECK(lipids_total IS NULL OR lipids_total >= 0), -- g
            lipids_saturated REAL CHECK(lipids_saturated IS NULL OR lipids_saturated >= 0),
            lipids_monounsaturated REAL CHECK(lipids_monounsaturated IS NULL OR lipids_monounsaturated >= 0),
            lipids_polyunsaturated REAL CHECK(lipids_polyunsaturated IS NULL OR lipids_polyunsaturated >= 0),

            amino_tryptophan REAL CHECK(amino_tryptophan IS NULL OR amino_tryptophan >= 0), -- g
            amino_threonine REAL CHECK(amino_threonine IS NULL OR amino_threonine >= 0),
            amino_isoleucine REAL CHECK(amino_isoleucine IS NULL OR amino_isoleucine >= 0),
            amino_leucine REAL CHECK(amino_leucine IS NULL OR amino_leucine >= 0),
            amino_lysine REAL CHECK(amino_lysine IS NULL OR amino_lysine >= 0),
            amino_methionine REAL CHECK(amino_methionine IS NULL OR amino_methionine >= 0),
            amino_cystine REAL CHECK(amino_cystine IS NULL OR amino_cystine >= 0),
            amino_phenylalanine REAL CHECK(amino_phenylalanine IS NULL OR amino_phenylalanine >= 0),
            amino_tyrosine REAL CHECK(amino_tyrosine IS NULL OR amino_tyrosine >= 0),
            amino_valine REAL CHECK(amino_valine IS NULL OR amino_valine >= 0),
            amino_arginine REAL CHECK(amino_arginine IS NULL OR amino_arginine >= 0),
            amino_histidine REAL CHECK(amino_histidine IS NULL OR amino_histidine >= 0),
            amino_alanine REAL CHECK(amino_alanine IS NULL OR amino_alanine >= 0),
            amino_aspartic_acid REAL CHECK(amino_aspartic_acid IS NULL OR amino_aspartic_acid >= 0),
            amino_glutamic_acid REAL CHECK(amino_glutamic_acid IS NULL OR amino_glutamic_acid >= 0),
            amino_glycine REAL CHECK(amino_glycine IS NULL OR amino_glycine >= 0),
            amino_proline REAL CHECK(amino_proline IS NULL OR amino_proline >= 0),
            amino_serine REAL CHECK(amino_serine IS NULL OR amino_serine >= 0)
        );

        CREATE UNIQUE INDEX idx_foods_code ON foods(code);
        CREATE INDEX idx_foods_name ON foods(name);
        CREATE INDEX idx_foods_category ON foods(category);

        -- ============================================
        -- DIETS
        -- User-created named collections of foods
        -- ============================================
        CREATE TABLE diets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL,         -- unix milliseconds
            calorie_goal REAL                    -- optional kcal target
        );

        CREATE INDEX idx_diets_created ON diets(created_at);

        -- ============================================
        -- DIET ITEMS
        -- One food in one diet, with a portion and a meal tag
        -- ============================================
        CREATE TABLE diet_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            diet_id INTEGER NOT NULL REFERENCES diets(id) ON DELETE CASCADE,
            food_id INTEGER NOT NULL REFERENCES foods(id) ON DELETE CASCADE,
            quantity_grams REAL NOT NULL CHECK(quantity_grams > 0),
            meal_tag TEXT                        -- free text, e.g. "Breakfast"
        );

        CREATE INDEX idx_diet_items_diet ON diet_items(diet_id);
        CREATE INDEX idx_diet_items_food ON diet_items(food_id);

        -- ============================================
        -- PREFERENCES
        -- Key-value store backing the user profile
        -- ============================================
        CREATE TABLE preferences (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
        [],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Ok(true);
    }
    Ok(get_schema_version(conn)? < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_needs_migration() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_migration(&conn).unwrap());
        run_migrations(&conn).unwrap();
        assert!(!needs_migration(&conn).unwrap());
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(applied, 1);
    }
}
