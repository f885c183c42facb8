//! Nutrient record model
//!
//! One food of the TACO reference table with its composition per 100 g.

use rusqlite::{params_from_iter, Connection, Row, ToSql};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::nutrients::{Nutrients, NUTRIENT_COLUMNS};

/// A food of the reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientRecord {
    pub id: i64,
    /// Stable code from the dataset
    pub code: String,
    pub name: String,
    pub category: String,
    /// Values per 100 g
    pub nutrients: Nutrients,
}

/// Data for inserting a food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutrientRecordCreate {
    pub code: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub nutrients: Nutrients,
}

/// Data for updating a food; `nutrients` replaces the whole composition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NutrientRecordUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub nutrients: Option<Nutrients>,
}

impl NutrientRecordCreate {
    fn validate(&self) -> DbResult<()> {
        if self.code.trim().is_empty() {
            return Err(DbError::Validation("food code cannot be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(DbError::Validation("food name cannot be empty".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(DbError::Validation("food category cannot be empty".to_string()));
        }
        check_nutrients(&self.nutrients)
    }
}

fn check_nutrients(nutrients: &Nutrients) -> DbResult<()> {
    nutrients
        .validate()
        .map_err(|e| DbError::Validation(e.to_string()))
}

fn insert_sql() -> String {
    let columns = NUTRIENT_COLUMNS.join(", ");
    let placeholders = (4..4 + NUTRIENT_COLUMNS.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");

    // Same code replaces the previous row (reloading the dataset)
    format!(
        "INSERT INTO foods (code, name, category, {columns}) VALUES (?1, ?2, ?3, {placeholders})
         ON CONFLICT(code) DO UPDATE SET name = excluded.name, category = excluded.category, {updates}",
        columns = columns,
        placeholders = placeholders,
        updates = NUTRIENT_COLUMNS
            .iter()
            .map(|c| format!("{c} = excluded.{c}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn insert_one(conn: &Connection, sql: &str, data: &NutrientRecordCreate) -> DbResult<()> {
    data.validate()?;

    let values = data.nutrients.to_columns();
    let mut params: Vec<&dyn ToSql> = vec![&data.code, &data.name, &data.category];
    params.extend(values.iter().map(|v| v as &dyn ToSql));

    conn.execute(sql, params_from_iter(params))?;
    Ok(())
}

impl NutrientRecord {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            code: row.get("code")?,
            name: row.get("name")?,
            category: row.get("category")?,
            nutrients: Nutrients::from_row(row)?,
        })
    }

    fn query_list(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(sql)?;
        let items = stmt
            .query_map(params, Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn query_one(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(sql)?;
        match stmt.query_row(params, Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a food, replacing any food with the same code
    pub fn insert(conn: &Connection, data: &NutrientRecordCreate) -> DbResult<Self> {
        insert_one(conn, &insert_sql(), data)?;
        Self::get_by_code(conn, &data.code)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Insert many foods in one transaction; nothing is written if any fails
    pub fn insert_many(conn: &mut Connection, items: &[NutrientRecordCreate]) -> DbResult<usize> {
        let sql = insert_sql();
        let tx = conn.transaction()?;
        for item in items {
            insert_one(&tx, &sql, item)?;
        }
        tx.commit()?;
        tracing::debug!(count = items.len(), "inserted foods");
        Ok(items.len())
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        Self::query_one(conn, "SELECT * FROM foods WHERE id = ?1", &[&id])
    }

    pub fn get_by_code(conn: &Connection, code: &str) -> DbResult<Option<Self>> {
        Self::query_one(conn, "SELECT * FROM foods WHERE code = ?1", &[&code])
    }

    /// All foods, by name
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        Self::query_list(conn, "SELECT * FROM foods ORDER BY name ASC", &[])
    }

    /// Foods whose name starts with `term`, ignoring case
    pub fn search_by_name(conn: &Connection, term: &str, limit: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("{}%", escape_like(term.trim()));
        Self::query_list(
            conn,
            "SELECT * FROM foods WHERE LOWER(name) LIKE LOWER(?1) ESCAPE '\\'
             ORDER BY name ASC LIMIT ?2",
            &[&pattern, &limit],
        )
    }

    pub fn list_by_category(conn: &Connection, category: &str) -> DbResult<Vec<Self>> {
        Self::query_list(
            conn,
            "SELECT * FROM foods WHERE category = ?1 ORDER BY name ASC",
            &[&category],
        )
    }

    /// Distinct categories, sorted
    pub fn list_categories(conn: &Connection) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare("SELECT DISTINCT category FROM foods ORDER BY category ASC")?;
        let categories = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(categories)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM foods", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn update(conn: &Connection, id: i64, data: &NutrientRecordUpdate) -> DbResult<Option<Self>> {
        let Some(current) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        let name = data.name.as_deref().unwrap_or(&current.name).trim().to_string();
        let category = data
            .category
            .as_deref()
            .unwrap_or(&current.category)
            .trim()
            .to_string();
        if name.is_empty() || category.is_empty() {
            return Err(DbError::Validation("food name and category cannot be empty".to_string()));
        }

        let nutrients = data.nutrients.as_ref().unwrap_or(&current.nutrients);
        check_nutrients(nutrients)?;

        let assignments = NUTRIENT_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ?{}", c, i + 3))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE foods SET name = ?1, category = ?2, {} WHERE id = ?{}",
            assignments,
            NUTRIENT_COLUMNS.len() + 3
        );

        let values = nutrients.to_columns();
        let mut params: Vec<&dyn ToSql> = vec![&name, &category];
        params.extend(values.iter().map(|v| v as &dyn ToSql));
        params.push(&id);
        conn.execute(&sql, params_from_iter(params))?;

        Self::get_by_id(conn, id)
    }

    /// Delete a food. Diet items referencing it are removed by cascade.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM foods WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn delete_all(conn: &Connection) -> DbResult<usize> {
        let rows = conn.execute("DELETE FROM foods", [])?;
        Ok(rows)
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
