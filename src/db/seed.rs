//! Reference dataset bootstrap
//!
//! The TACO table ships as a flat file of `INSERT` statements. It is loaded
//! once, inside a single transaction, when the `foods` table is empty.

use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;

use super::connection::DbResult;

/// Outcome of a preload run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub executed: usize,
    pub failed: usize,
}

/// Split a SQL script into statements.
///
/// Blank lines and `--` comment lines are dropped, continuation lines are
/// joined with a single space and a statement ends at a line whose last
/// character is `;`. A trailing statement without `;` is kept.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }

        current.push_str(trimmed);
        if trimmed.ends_with(';') {
            statements.push(std::mem::take(&mut current));
        } else {
            current.push(' ');
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        statements.push(rest.to_string());
    }

    statements
}

/// Execute every statement of `sql` in one transaction.
///
/// A statement that fails is logged and skipped; the rest of the script
/// still commits.
pub fn import_preload_sql(conn: &mut Connection, sql: &str) -> DbResult<ImportReport> {
    let statements = split_statements(sql);
    let tx = conn.transaction()?;
    let mut report = ImportReport::default();

    for statement in &statements {
        match tx.execute_batch(statement) {
            Ok(()) => report.executed += 1,
            Err(e) => {
                report.failed += 1;
                tracing::warn!(error = %e, statement = %statement, "skipping preload statement");
            }
        }
    }

    tx.commit()?;
    tracing::info!(
        executed = report.executed,
        failed = report.failed,
        "preload script applied"
    );
    Ok(report)
}

pub fn import_preload_file<P: AsRef<Path>>(conn: &mut Connection, path: P) -> DbResult<ImportReport> {
    let sql = std::fs::read_to_string(path.as_ref())?;
    tracing::info!(path = %path.as_ref().display(), "importing preload file");
    import_preload_sql(conn, &sql)
}

/// Import `path` only when no food has been loaded yet.
///
/// Returns `None` when the table already had rows.
pub fn seed_if_empty<P: AsRef<Path>>(conn: &mut Connection, path: P) -> DbResult<Option<ImportReport>> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM foods", [], |row| row.get(0))?;
    if count > 0 {
        tracing::debug!(count, "foods already loaded, skipping preload");
        return Ok(None);
    }
    import_preload_file(conn, path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_conn;

    #[test]
    fn test_split_statements_joins_lines_and_drops_comments() {
        let sql = "-- header\n\nINSERT INTO foods (code, name, category)\n  VALUES ('1', 'Arroz', 'Cereais');\n-- next\nINSERT INTO foods (code, name, category) VALUES ('2', 'Feijao', 'Leguminosas');\n";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0],
            "INSERT INTO foods (code, name, category) VALUES ('1', 'Arroz', 'Cereais');"
        );
    }

    #[test]
    fn test_split_statements_keeps_unterminated_tail() {
        let statements = split_statements("SELECT 1;\nSELECT 2");
        assert_eq!(statements, vec!["SELECT 1;".to_string(), "SELECT 2".to_string()]);
    }

    #[test]
    fn test_import_skips_bad_statements() {
        let mut conn = memory_conn();
        let sql = "INSERT INTO foods (code, name, category, energy_kcal) VALUES ('1', 'Maca', 'Frutas', 56);\n\
                   INSERT INTO nowhere VALUES (1);\n\
                   INSERT INTO foods (code, name, category) VALUES ('2', 'Arroz', 'Cereais');";

        let report = import_preload_sql(&mut conn, sql).unwrap();
        assert_eq!(report, ImportReport { executed: 2, failed: 1 });

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM foods", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_import_rejects_negative_nutrients() {
        let mut conn = memory_conn();
        let sql = "INSERT INTO foods (code, name, category, protein, energy_kcal) VALUES ('1', 'Bad', 'X', -5.0, -100);\n\
                   INSERT INTO foods (code, name, category, protein) VALUES ('2', 'Arroz', 'Cereais', 2.5);";

        let report = import_preload_sql(&mut conn, sql).unwrap();
        assert_eq!(report, ImportReport { executed: 1, failed: 1 });

        let codes: Vec<String> = conn
            .prepare("SELECT code FROM foods")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(codes, vec!["2".to_string()]);
    }

    #[test]
    fn test_seed_if_empty_runs_once() {
        let mut conn = memory_conn();
        let path = std::env::temp_dir().join(format!("taco_seed_{}.sql", std::process::id()));
        std::fs::write(
            &path,
            "INSERT INTO foods (code, name, category) VALUES ('1', 'Maca', 'Frutas');\n",
        )
        .unwrap();

        let first = seed_if_empty(&mut conn, &path).unwrap();
        assert_eq!(first, Some(ImportReport { executed: 1, failed: 0 }));
        let second = seed_if_empty(&mut conn, &path).unwrap();
        assert_eq!(second, None);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut conn = memory_conn();
        let result = import_preload_file(&mut conn, "/definitely/not/here.sql");
        assert!(matches!(result, Err(crate::db::DbError::Io(_))));
    }

    #[test]
    fn test_reimport_keeps_foods_and_diet_items() {
        use crate::models::{Diet, DietCreate, DietItem, DietItemCreate, NutrientRecord};

        let mut conn = memory_conn();
        import_preload_sql(
            &mut conn,
            "INSERT INTO foods (code, name, category, energy_kcal) VALUES ('1', 'Maca', 'Frutas', 56);",
        )
        .unwrap();
        let apple = NutrientRecord::get_by_code(&conn, "1").unwrap().unwrap();

        let diet = Diet::create(
            &conn,
            &DietCreate { name: "Semana".to_string(), calorie_goal: None },
        )
        .unwrap();
        DietItem::create(
            &conn,
            &DietItemCreate {
                diet_id: diet.id,
                food_id: apple.id,
                quantity_grams: 150.0,
                meal_tag: None,
            },
        )
        .unwrap();

        let report = import_preload_sql(
            &mut conn,
            "INSERT INTO foods (code, name, category, energy_kcal) VALUES ('1', 'Maca', 'Frutas', 56);\n\
             INSERT INTO foods (code, name, category) VALUES ('2', 'Arroz', 'Cereais');",
        )
        .unwrap();
        assert_eq!(report, ImportReport { executed: 1, failed: 1 });

        assert!(import_preload_file(&mut conn, "/definitely/not/here.sql").is_err());

        let kept = NutrientRecord::get_by_code(&conn, "1").unwrap().unwrap();
        assert_eq!(kept.id, apple.id);
        assert_eq!(NutrientRecord::count(&conn).unwrap(), 2);
        assert_eq!(DietItem::list_for_diet(&conn, diet.id).unwrap().len(), 1);
    }
}
