//! Diet model
//!
//! A named, user-created collection of diet items with an optional
//! daily calorie goal.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::diet_item::{DietItemCreate, DietItemWithFood};

/// A diet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diet {
    pub id: i64,
    pub name: String,
    /// Unix milliseconds
    pub created_at: i64,
    pub calorie_goal: Option<f64>,
}

/// Data for creating a diet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietCreate {
    pub name: String,
    pub calorie_goal: Option<f64>,
}

/// Data for updating a diet.
///
/// `calorie_goal: Some(None)` clears the goal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DietUpdate {
    pub name: Option<String>,
    pub calorie_goal: Option<Option<f64>>,
}

/// A diet with its items and their foods
#[derive(Debug, Clone, Serialize)]
pub struct DietWithItems {
    pub diet: Diet,
    pub items: Vec<DietItemWithFood>,
}

fn validate_name(name: &str) -> DbResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DbError::Validation("diet name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

fn validate_goal(goal: Option<f64>) -> DbResult<Option<f64>> {
    match goal {
        Some(g) if !g.is_finite() || g <= 0.0 => Err(DbError::Validation(format!(
            "calorie goal must be a positive number, got {}",
            g
        ))),
        other => Ok(other),
    }
}

impl Diet {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
            calorie_goal: row.get("calorie_goal")?,
        })
    }

    /// Create a diet stamped with the current time
    pub fn create(conn: &Connection, data: &DietCreate) -> DbResult<Self> {
        let name = validate_name(&data.name)?;
        let goal = validate_goal(data.calorie_goal)?;
        let created_at = chrono::Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO diets (name, created_at, calorie_goal) VALUES (?1, ?2, ?3)",
            params![name, created_at, goal],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!(id, name = %name, "created diet");
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "diet", id })
    }

    /// Create a diet and its items in one transaction
    pub fn create_with_items(
        conn: &mut Connection,
        data: &DietCreate,
        items: &[DietItemCreate],
    ) -> DbResult<Self> {
        let tx = conn.transaction()?;
        let diet = Self::create(&tx, data)?;
        let items: Vec<DietItemCreate> = items
            .iter()
            .cloned()
            .map(|item| DietItemCreate { diet_id: diet.id, ..item })
            .collect();
        super::DietItem::insert_all(&tx, &items)?;
        tx.commit()?;
        Ok(diet)
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM diets WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(diet) => Ok(Some(diet)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All diets, newest first
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM diets ORDER BY created_at DESC, id DESC")?;
        let diets = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(diets)
    }

    /// Diets whose name contains `term`, ignoring case, by name
    pub fn search_by_name(conn: &Connection, term: &str) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", term.trim());
        let mut stmt = conn.prepare(
            "SELECT * FROM diets WHERE LOWER(name) LIKE LOWER(?1)
             ORDER BY name ASC, id ASC",
        )?;
        let diets = stmt
            .query_map([pattern], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(diets)
    }

    /// Most recently created diet with its items
    pub fn latest(conn: &Connection) -> DbResult<Option<DietWithItems>> {
        let mut stmt = conn.prepare("SELECT * FROM diets ORDER BY created_at DESC, id DESC LIMIT 1")?;
        let diet = match stmt.query_row([], Self::from_row) {
            Ok(diet) => diet,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let items = super::DietItem::list_with_food_for_diet(conn, diet.id)?;
        Ok(Some(DietWithItems { diet, items }))
    }

    pub fn get_with_items(conn: &Connection, id: i64) -> DbResult<Option<DietWithItems>> {
        let Some(diet) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };
        let items = super::DietItem::list_with_food_for_diet(conn, id)?;
        Ok(Some(DietWithItems { diet, items }))
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM diets", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn update(conn: &Connection, id: i64, data: &DietUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            params_vec.push(Box::new(validate_name(name)?));
            updates.push(format!("name = ?{}", params_vec.len()));
        }
        if let Some(goal) = data.calorie_goal {
            params_vec.push(Box::new(validate_goal(goal)?));
            updates.push(format!("calorie_goal = ?{}", params_vec.len()));
        }

        if !updates.is_empty() {
            params_vec.push(Box::new(id));
            let sql = format!(
                "UPDATE diets SET {} WHERE id = ?{}",
                updates.join(", "),
                params_vec.len()
            );
            let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, params_refs.as_slice())?;
        }

        Self::get_by_id(conn, id)
    }

    /// Delete a diet and, by cascade, its items
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM diets WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn delete_all(conn: &Connection) -> DbResult<usize> {
        let rows = conn.execute("DELETE FROM diets", [])?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_conn;
    use crate::models::nutrient_record::tests::{apple, rice};
    use crate::models::{DietItem, NutrientRecord};

    fn diet(name: &str) -> DietCreate {
        DietCreate {
            name: name.to_string(),
            calorie_goal: None,
        }
    }

    #[test]
    fn test_create_and_get() {
        let conn = memory_conn();
        let created = Diet::create(&conn, &DietCreate {
            name: "  Cutting  ".to_string(),
            calorie_goal: Some(2000.0),
        })
        .unwrap();

        assert_eq!(created.name, "Cutting");
        assert_eq!(created.calorie_goal, Some(2000.0));
        assert!(created.created_at > 0);
        assert_eq!(Diet::get_by_id(&conn, created.id).unwrap(), Some(created));
    }

    #[test]
    fn test_rejects_blank_name_and_bad_goal() {
        let conn = memory_conn();
        assert!(matches!(Diet::create(&conn, &diet("   ")), Err(DbError::Validation(_))));
        let bad_goal = DietCreate {
            name: "x".to_string(),
            calorie_goal: Some(-5.0),
        };
        assert!(matches!(Diet::create(&conn, &bad_goal), Err(DbError::Validation(_))));
    }

    #[test]
    fn test_list_newest_first_and_search() {
        let conn = memory_conn();
        let a = Diet::create(&conn, &diet("Bulking")).unwrap();
        let b = Diet::create(&conn, &diet("Cutting leve")).unwrap();

        let ids: Vec<i64> = Diet::list(&conn).unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);

        let hits = Diet::search_by_name(&conn, "LEVE").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, b.id);
    }

    #[test]
    fn test_update_sets_and_clears_goal() {
        let conn = memory_conn();
        let d = Diet::create(&conn, &diet("Plano")).unwrap();

        let set = DietUpdate {
            calorie_goal: Some(Some(1800.0)),
            ..Default::default()
        };
        assert_eq!(Diet::update(&conn, d.id, &set).unwrap().unwrap().calorie_goal, Some(1800.0));

        let clear = DietUpdate {
            name: Some("Plano B".to_string()),
            calorie_goal: Some(None),
        };
        let updated = Diet::update(&conn, d.id, &clear).unwrap().unwrap();
        assert_eq!(updated.name, "Plano B");
        assert_eq!(updated.calorie_goal, None);

        assert!(Diet::update(&conn, 999, &clear).unwrap().is_none());
    }

    #[test]
    fn test_create_with_items_and_latest() {
        let mut conn = memory_conn();
        let r = NutrientRecord::insert(&conn, &rice()).unwrap();
        let a = NutrientRecord::insert(&conn, &apple()).unwrap();

        assert!(Diet::latest(&conn).unwrap().is_none());

        let items = vec![
            DietItemCreate {
                diet_id: 0,
                food_id: r.id,
                quantity_grams: 150.0,
                meal_tag: Some("Almoço".to_string()),
            },
            DietItemCreate {
                diet_id: 0,
                food_id: a.id,
                quantity_grams: 130.0,
                meal_tag: None,
            },
        ];
        let created = Diet::create_with_items(&mut conn, &diet("Dia 1"), &items).unwrap();

        let latest = Diet::latest(&conn).unwrap().unwrap();
        assert_eq!(latest.diet.id, created.id);
        assert_eq!(latest.items.len(), 2);
        assert_eq!(latest.items[0].food.id, r.id);
    }

    #[test]
    fn test_create_with_items_rolls_back_on_bad_item() {
        let mut conn = memory_conn();
        let items = vec![DietItemCreate {
            diet_id: 0,
            food_id: 12345,
            quantity_grams: 100.0,
            meal_tag: None,
        }];

        assert!(Diet::create_with_items(&mut conn, &diet("Falha"), &items).is_err());
        assert_eq!(Diet::count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_delete_cascades_items() {
        let conn = memory_conn();
        let food = NutrientRecord::insert(&conn, &rice()).unwrap();
        let d = Diet::create(&conn, &diet("Temp")).unwrap();
        DietItem::create(&conn, &DietItemCreate {
            diet_id: d.id,
            food_id: food.id,
            quantity_grams: 100.0,
            meal_tag: None,
        })
        .unwrap();

        assert!(Diet::delete(&conn, d.id).unwrap());
        assert!(DietItem::list_for_diet(&conn, d.id).unwrap().is_empty());
        assert!(!Diet::delete(&conn, d.id).unwrap());
        assert_eq!(Diet::delete_all(&conn).unwrap(), 0);
    }
}
