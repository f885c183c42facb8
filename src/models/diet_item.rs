//! Diet item model
//!
//! One food in one diet, with a portion in grams and an optional meal tag.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::NutrientRecord;

/// Meal tag suggestions, in the order a day is usually eaten
pub const KNOWN_MEALS: [&str; 6] = [
    "Café da Manhã",
    "Lanche da Manhã",
    "Almoço",
    "Lanche da Tarde",
    "Jantar",
    "Ceia",
];

/// Trim a meal tag; blank becomes `None`
pub fn normalize_meal_tag(tag: Option<&str>) -> Option<String> {
    tag.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// An item of a diet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietItem {
    pub id: i64,
    pub diet_id: i64,
    pub food_id: i64,
    pub quantity_grams: f64,
    pub meal_tag: Option<String>,
}

/// Data for creating a diet item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietItemCreate {
    pub diet_id: i64,
    pub food_id: i64,
    pub quantity_grams: f64,
    pub meal_tag: Option<String>,
}

/// Data for updating a diet item.
///
/// `meal_tag: Some(None)` clears the tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DietItemUpdate {
    pub quantity_grams: Option<f64>,
    pub meal_tag: Option<Option<String>>,
}

/// A diet item joined with its food
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DietItemWithFood {
    pub id: i64,
    pub diet_id: i64,
    pub quantity_grams: f64,
    pub meal_tag: Option<String>,
    pub food: NutrientRecord,
}

fn check_quantity(grams: f64) -> DbResult<f64> {
    if !grams.is_finite() || grams <= 0.0 {
        return Err(DbError::Validation(format!(
            "quantity must be greater than zero, got {}",
            grams
        )));
    }
    Ok(grams)
}

impl DietItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            diet_id: row.get("diet_id")?,
            food_id: row.get("food_id")?,
            quantity_grams: row.get("quantity_grams")?,
            meal_tag: row.get("meal_tag")?,
        })
    }

    fn insert(conn: &Connection, data: &DietItemCreate) -> DbResult<i64> {
        let grams = check_quantity(data.quantity_grams)?;
        let tag = normalize_meal_tag(data.meal_tag.as_deref());

        conn.execute(
            "INSERT INTO diet_items (diet_id, food_id, quantity_grams, meal_tag) VALUES (?1, ?2, ?3, ?4)",
            params![data.diet_id, data.food_id, grams, tag],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn create(conn: &Connection, data: &DietItemCreate) -> DbResult<Self> {
        let id = Self::insert(conn, data)?;
        tracing::debug!(id, diet_id = data.diet_id, food_id = data.food_id, "added diet item");
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "diet item", id })
    }

    /// Insert items on a connection that is already inside a transaction
    pub(crate) fn insert_all(conn: &Connection, items: &[DietItemCreate]) -> DbResult<usize> {
        for item in items {
            Self::insert(conn, item)?;
        }
        Ok(items.len())
    }

    /// Insert many items in one transaction; nothing is written if any fails
    pub fn insert_many(conn: &mut Connection, items: &[DietItemCreate]) -> DbResult<usize> {
        let tx = conn.transaction()?;
        let count = Self::insert_all(&tx, items)?;
        tx.commit()?;
        tracing::debug!(count, "inserted diet items");
        Ok(count)
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM diet_items WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Items of a diet, by meal tag then insertion order
    pub fn list_for_diet(conn: &Connection, diet_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM diet_items WHERE diet_id = ?1 ORDER BY meal_tag ASC, id ASC",
        )?;
        let items = stmt
            .query_map([diet_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Items of a diet joined with their foods, in insertion order
    pub fn list_with_food_for_diet(conn: &Connection, diet_id: i64) -> DbResult<Vec<DietItemWithFood>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT di.id AS item_id, di.diet_id AS diet_id, di.quantity_grams AS quantity_grams,
                   di.meal_tag AS meal_tag, f.*
            FROM diet_items di
            JOIN foods f ON f.id = di.food_id
            WHERE di.diet_id = ?1
            ORDER BY di.id ASC
            "#,
        )?;

        let items = stmt
            .query_map([diet_id], |row| {
                Ok(DietItemWithFood {
                    id: row.get("item_id")?,
                    diet_id: row.get("diet_id")?,
                    quantity_grams: row.get("quantity_grams")?,
                    meal_tag: row.get("meal_tag")?,
                    food: NutrientRecord::from_row(row)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    pub fn update(conn: &Connection, id: i64, data: &DietItemUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(grams) = data.quantity_grams {
            params_vec.push(Box::new(check_quantity(grams)?));
            updates.push(format!("quantity_grams = ?{}", params_vec.len()));
        }
        if let Some(ref tag) = data.meal_tag {
            params_vec.push(Box::new(normalize_meal_tag(tag.as_deref())));
            updates.push(format!("meal_tag = ?{}", params_vec.len()));
        }

        if !updates.is_empty() {
            params_vec.push(Box::new(id));
            let sql = format!(
                "UPDATE diet_items SET {} WHERE id = ?{}",
                updates.join(", "),
                params_vec.len()
            );
            let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, params_refs.as_slice())?;
        }

        Self::get_by_id(conn, id)
    }

    /// Change only the portion; returns false if the item does not exist
    pub fn update_quantity(conn: &Connection, id: i64, grams: f64) -> DbResult<bool> {
        let grams = check_quantity(grams)?;
        let rows = conn.execute(
            "UPDATE diet_items SET quantity_grams = ?1 WHERE id = ?2",
            params![grams, id],
        )?;
        Ok(rows > 0)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM diet_items WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn delete_all_for_diet(conn: &Connection, diet_id: i64) -> DbResult<usize> {
        let rows = conn.execute("DELETE FROM diet_items WHERE diet_id = ?1", [diet_id])?;
        Ok(rows)
    }
}
