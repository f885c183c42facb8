//! Diet MCP Tools
//!
//! Tools for building diets out of TACO foods and reading their totals.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{DataChange, Database};
use crate::models::{
    Diet, DietCreate, DietItem, DietItemCreate, DietItemUpdate, DietUpdate, DietWithItems,
    NutrientRecord, ProfileStore,
};
use crate::nutrition::{aggregate, DietSummary, GoalProgress, MacroSplit};

/// An item to add to a diet
#[derive(Debug, Clone, Deserialize)]
pub struct DietItemInput {
    pub food_id: i64,
    pub quantity_grams: f64,
    pub meal: Option<String>,
}

/// Response for create_diet
#[derive(Debug, Serialize)]
pub struct CreateDietResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub items_added: usize,
}

/// Summary of a diet for list results
#[derive(Debug, Serialize)]
pub struct DietListEntry {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub calorie_goal: Option<f64>,
}

impl From<&Diet> for DietListEntry {
    fn from(diet: &Diet) -> Self {
        Self {
            id: diet.id,
            name: diet.name.clone(),
            created_at: format_millis(diet.created_at),
            calorie_goal: diet.calorie_goal,
        }
    }
}

/// Response for list_diets
#[derive(Debug, Serialize)]
pub struct ListDietsResponse {
    pub diets: Vec<DietListEntry>,
    pub total: usize,
}

/// Where the calorie goal used for progress came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalSource {
    Diet,
    Profile,
    None,
}

/// Full diet view: items grouped by meal with totals
#[derive(Debug, Serialize)]
pub struct DietDetail {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub calorie_goal: Option<f64>,
    pub summary: DietSummary,
    pub macro_split: MacroSplit,
    pub progress: GoalProgress,
    pub goal_source: GoalSource,
}

/// Response for add_diet_item / update_diet_item
#[derive(Debug, Serialize)]
pub struct DietItemResponse {
    pub id: i64,
    pub diet_id: i64,
    pub food_id: i64,
    pub food_name: String,
    pub quantity_grams: f64,
    pub meal: Option<String>,
}

/// Response for batch inserts
#[derive(Debug, Serialize)]
pub struct BatchAddResponse {
    pub diet_id: i64,
    pub items_added: usize,
}

/// Response for deletions
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn format_millis(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}

fn to_create(diet_id: i64, input: &DietItemInput) -> DietItemCreate {
    DietItemCreate {
        diet_id,
        food_id: input.food_id,
        quantity_grams: input.quantity_grams,
        meal_tag: input.meal.clone(),
    }
}

/// Check that every referenced food exists before writing
fn check_foods(conn: &Connection, items: &[DietItemInput]) -> Result<(), String> {
    for item in items {
        let exists = NutrientRecord::get_by_id(conn, item.food_id)
            .map_err(|e| format!("Database error checking food: {}", e))?
            .is_some();
        if !exists {
            return Err(format!("Food not found with id: {}", item.food_id));
        }
    }
    Ok(())
}

fn require_diet(conn: &Connection, diet_id: i64) -> Result<Diet, String> {
    Diet::get_by_id(conn, diet_id)
        .map_err(|e| format!("Failed to get diet: {}", e))?
        .ok_or_else(|| format!("Diet not found with id: {}", diet_id))
}

fn item_response(conn: &Connection, item: DietItem) -> Result<DietItemResponse, String> {
    let food_name = NutrientRecord::get_by_id(conn, item.food_id)
        .map_err(|e| format!("Failed to get food: {}", e))?
        .map(|f| f.name)
        .unwrap_or_default();

    Ok(DietItemResponse {
        id: item.id,
        diet_id: item.diet_id,
        food_id: item.food_id,
        food_name,
        quantity_grams: item.quantity_grams,
        meal: item.meal_tag,
    })
}

fn build_detail(conn: &Connection, loaded: DietWithItems) -> Result<DietDetail, String> {
    let summary = aggregate(&loaded.items).map_err(|e| format!("Failed to total diet: {}", e))?;

    let (goal, goal_source) = match loaded.diet.calorie_goal {
        Some(goal) => (Some(goal), GoalSource::Diet),
        None => {
            let profile = ProfileStore::load(conn).map_err(|e| format!("Failed to load profile: {}", e))?;
            match profile.calorie_goal {
                Some(goal) => (Some(goal), GoalSource::Profile),
                None => (None, GoalSource::None),
            }
        }
    };

    Ok(DietDetail {
        id: loaded.diet.id,
        name: loaded.diet.name,
        created_at: format_millis(loaded.diet.created_at),
        calorie_goal: loaded.diet.calorie_goal,
        macro_split: MacroSplit::from_totals(&summary.totals),
        progress: GoalProgress::new(&summary.totals, goal),
        goal_source,
        summary,
    })
}

/// Create a diet, optionally with its first items
pub fn create_diet(
    db: &Database,
    name: &str,
    calorie_goal: Option<f64>,
    items: Vec<DietItemInput>,
) -> Result<CreateDietResponse, String> {
    if name.trim().is_empty() {
        return Err("Diet name cannot be empty".to_string());
    }

    let data = DietCreate {
        name: name.to_string(),
        calorie_goal,
    };
    let creates: Vec<DietItemCreate> = items.iter().map(|i| to_create(0, i)).collect();

    db.with_conn(|conn| Ok(check_foods(conn, &items)))
        .map_err(|e| format!("Database error: {}", e))??;

    let diet = db
        .write(DataChange::Diets, |conn| Diet::create_with_items(conn, &data, &creates))
        .map_err(|e| format!("Failed to create diet: {}", e))?;

    tracing::info!(id = diet.id, items = creates.len(), "diet created");

    Ok(CreateDietResponse {
        id: diet.id,
        name: diet.name,
        created_at: format_millis(diet.created_at),
        items_added: creates.len(),
    })
}

/// List diets, newest first, optionally filtered by a name substring
pub fn list_diets(db: &Database, search: Option<&str>) -> Result<ListDietsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let diets = match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => Diet::search_by_name(&conn, term),
        None => Diet::list(&conn),
    }
    .map_err(|e| format!("Failed to list diets: {}", e))?;

    let entries: Vec<DietListEntry> = diets.iter().map(DietListEntry::from).collect();
    let total = entries.len();

    Ok(ListDietsResponse { diets: entries, total })
}

/// Get a diet with its grouped items and totals
pub fn get_diet(db: &Database, id: i64) -> Result<Option<DietDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let loaded = Diet::get_with_items(&conn, id)
        .map_err(|e| format!("Failed to get diet: {}", e))?;

    match loaded {
        Some(loaded) => build_detail(&conn, loaded).map(Some),
        None => Ok(None),
    }
}

/// The most recently created diet
pub fn get_latest_diet(db: &Database) -> Result<Option<DietDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let loaded = Diet::latest(&conn).map_err(|e| format!("Failed to get latest diet: {}", e))?;

    match loaded {
        Some(loaded) => build_detail(&conn, loaded).map(Some),
        None => Ok(None),
    }
}

/// Add one item to a diet
pub fn add_diet_item(db: &Database, diet_id: i64, item: DietItemInput) -> Result<DietItemResponse, String> {
    if !(item.quantity_grams > 0.0) {
        return Err("quantity_grams must be greater than 0".to_string());
    }

    db.with_conn(|conn| {
        Ok(require_diet(conn, diet_id).and_then(|_| check_foods(conn, std::slice::from_ref(&item))))
    })
    .map_err(|e| format!("Database error: {}", e))??;

    let created = db
        .write(DataChange::DietItems { diet_id }, |conn| DietItem::create(conn, &to_create(diet_id, &item)))
        .map_err(|e| format!("Failed to add diet item: {}", e))?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    item_response(&conn, created)
}

/// Add many items to a diet in one transaction
pub fn add_diet_items_batch(
    db: &Database,
    diet_id: i64,
    items: Vec<DietItemInput>,
) -> Result<BatchAddResponse, String> {
    if items.is_empty() {
        return Err("No items provided".to_string());
    }
    if let Some(bad) = items.iter().find(|i| !(i.quantity_grams > 0.0)) {
        return Err(format!(
            "quantity_grams must be greater than 0 (food {}: {})",
            bad.food_id, bad.quantity_grams
        ));
    }

    db.with_conn(|conn| Ok(require_diet(conn, diet_id).and_then(|_| check_foods(conn, &items))))
        .map_err(|e| format!("Database error: {}", e))??;

    let creates: Vec<DietItemCreate> = items.iter().map(|i| to_create(diet_id, i)).collect();
    let items_added = db
        .write(DataChange::DietItems { diet_id }, |conn| DietItem::insert_many(conn, &creates))
        .map_err(|e| format!("Failed to add diet items: {}", e))?;

    Ok(BatchAddResponse { diet_id, items_added })
}

/// Change an item's portion and/or meal. An empty `meal` clears the tag.
pub fn update_diet_item(
    db: &Database,
    item_id: i64,
    quantity_grams: Option<f64>,
    meal: Option<String>,
) -> Result<Option<DietItemResponse>, String> {
    if let Some(q) = quantity_grams {
        if !(q > 0.0) {
            return Err("quantity_grams must be greater than 0".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let Some(existing) = DietItem::get_by_id(&conn, item_id)
        .map_err(|e| format!("Failed to get diet item: {}", e))?
    else {
        return Ok(None);
    };
    drop(conn);

    let data = DietItemUpdate {
        quantity_grams,
        meal_tag: meal.map(Some),
    };
    let updated = db
        .write(DataChange::DietItems { diet_id: existing.diet_id }, |conn| {
            DietItem::update(conn, item_id, &data)
        })
        .map_err(|e| format!("Failed to update diet item: {}", e))?;

    match updated {
        Some(item) => {
            let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
            item_response(&conn, item).map(Some)
        }
        None => Ok(None),
    }
}

/// Remove an item from its diet
pub fn remove_diet_item(db: &Database, item_id: i64) -> Result<Option<DeleteResponse>, String> {
    let existing = db
        .with_conn(|conn| DietItem::get_by_id(conn, item_id))
        .map_err(|e| format!("Failed to get diet item: {}", e))?;

    let Some(existing) = existing else {
        return Ok(None);
    };

    db.write(DataChange::DietItems { diet_id: existing.diet_id }, |conn| DietItem::delete(conn, item_id))
        .map_err(|e| format!("Failed to remove diet item: {}", e))?;

    Ok(Some(DeleteResponse {
        success: true,
        deleted_id: item_id,
    }))
}

/// Rename a diet and/or set or clear its calorie goal
pub fn update_diet(
    db: &Database,
    id: i64,
    name: Option<String>,
    calorie_goal: Option<f64>,
    clear_calorie_goal: bool,
) -> Result<Option<DietListEntry>, String> {
    let data = DietUpdate {
        name,
        calorie_goal: if clear_calorie_goal { Some(None) } else { calorie_goal.map(Some) },
    };

    let updated = db
        .with_conn(|conn| Diet::update(conn, id, &data))
        .map_err(|e| format!("Failed to update diet: {}", e))?;
    if updated.is_some() {
        db.notify(DataChange::Diets);
    }

    Ok(updated.as_ref().map(DietListEntry::from))
}

/// Delete a diet and all of its items
pub fn delete_diet(db: &Database, id: i64) -> Result<Option<DeleteResponse>, String> {
    let deleted = db
        .with_conn(|conn| Diet::delete(conn, id))
        .map_err(|e| format!("Failed to delete diet: {}", e))?;

    if !deleted {
        return Ok(None);
    }
    db.notify(DataChange::Diets);
    tracing::info!(id, "diet deleted");

    Ok(Some(DeleteResponse {
        success: true,
        deleted_id: id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileUpdate;
    use crate::nutrition::UNCATEGORIZED;
    use crate::tools::foods::tests::seeded_db;

    fn input(food_id: i64, grams: f64, meal: Option<&str>) -> DietItemInput {
        DietItemInput {
            food_id,
            quantity_grams: grams,
            meal: meal.map(str::to_string),
        }
    }

    #[test]
    fn test_create_and_get_diet_totals() {
        let (db, apple, rice) = seeded_db();
        let created = create_diet(
            &db,
            "Dia leve",
            Some(2000.0),
            vec![input(apple, 150.0, Some("Lanche")), input(rice, 200.0, Some("Almoço"))],
        )
        .unwrap();
        assert_eq!(created.items_added, 2);

        let detail = get_diet(&db, created.id).unwrap().unwrap();
        assert!((detail.summary.totals.kcal - 332.0).abs() < 1e-9);
        assert!((detail.summary.totals.protein - 5.65).abs() < 1e-9);
        assert_eq!(detail.goal_source, GoalSource::Diet);
        assert!((detail.progress.remaining_kcal.unwrap() - 1668.0).abs() < 1e-9);

        let meals: Vec<&str> = detail.summary.groups.iter().map(|g| g.meal.as_str()).collect();
        assert_eq!(meals, vec!["Lanche", "Almoço"]);
    }

    #[test]
    fn test_create_diet_with_unknown_food_fails() {
        let (db, _, _) = seeded_db();
        let err = create_diet(&db, "X", None, vec![input(424242, 100.0, None)]).unwrap_err();
        assert!(err.contains("424242"));
        assert!(list_diets(&db, None).unwrap().diets.is_empty());
    }

    #[test]
    fn test_profile_goal_used_when_diet_has_none() {
        let (db, apple, _) = seeded_db();
        db.with_conn_mut(|conn| {
            ProfileStore::update(conn, &ProfileUpdate {
                calorie_goal: Some(1800.0),
                ..Default::default()
            })
        })
        .unwrap();

        let created = create_diet(&db, "Sem meta", None, vec![input(apple, 100.0, None)]).unwrap();
        let detail = get_diet(&db, created.id).unwrap().unwrap();

        assert_eq!(detail.goal_source, GoalSource::Profile);
        assert_eq!(detail.progress.goal_kcal, Some(1800.0));
        assert_eq!(detail.summary.groups[0].meal, UNCATEGORIZED);
    }

    #[test]
    fn test_item_lifecycle_publishes_changes() {
        let (db, apple, rice) = seeded_db();
        let diet = create_diet(&db, "Plano", None, vec![]).unwrap();
        let mut rx = db.subscribe();

        let item = add_diet_item(&db, diet.id, input(rice, 120.0, Some(" Jantar "))).unwrap();
        assert_eq!(item.meal.as_deref(), Some("Jantar"));
        assert_eq!(rx.try_recv().unwrap(), DataChange::DietItems { diet_id: diet.id });

        let batch = add_diet_items_batch(&db, diet.id, vec![input(apple, 80.0, None), input(rice, 50.0, None)]).unwrap();
        assert_eq!(batch.items_added, 2);

        let updated = update_diet_item(&db, item.id, Some(90.0), Some(String::new())).unwrap().unwrap();
        assert_eq!(updated.quantity_grams, 90.0);
        assert_eq!(updated.meal, None);

        assert!(remove_diet_item(&db, item.id).unwrap().is_some());
        assert!(remove_diet_item(&db, item.id).unwrap().is_none());

        let detail = get_diet(&db, diet.id).unwrap().unwrap();
        assert_eq!(detail.summary.item_count(), 2);
    }

    #[test]
    fn test_add_item_validation() {
        let (db, apple, _) = seeded_db();
        let diet = create_diet(&db, "Plano", None, vec![]).unwrap();

        assert!(add_diet_item(&db, diet.id, input(apple, 0.0, None)).is_err());
        assert!(add_diet_item(&db, 777, input(apple, 10.0, None)).is_err());
        assert!(add_diet_items_batch(&db, diet.id, vec![]).is_err());
        assert!(update_diet_item(&db, 555, Some(10.0), None).unwrap().is_none());
    }

    #[test]
    fn test_update_list_and_delete_diet() {
        let (db, apple, _) = seeded_db();
        let first = create_diet(&db, "Bulking", Some(3000.0), vec![]).unwrap();
        let second = create_diet(&db, "Cutting", None, vec![input(apple, 100.0, None)]).unwrap();

        let renamed = update_diet(&db, first.id, Some("Bulking limpo".to_string()), None, true)
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Bulking limpo");
        assert_eq!(renamed.calorie_goal, None);

        let found = list_diets(&db, Some("limpo")).unwrap();
        assert_eq!(found.total, 1);

        let latest = get_latest_diet(&db).unwrap().unwrap();
        assert_eq!(latest.id, second.id);

        assert!(delete_diet(&db, second.id).unwrap().is_some());
        assert!(delete_diet(&db, second.id).unwrap().is_none());
        assert_eq!(list_diets(&db, None).unwrap().total, 1);
    }

    #[test]
    fn test_missing_diet_changes_nothing() {
        let (db, _, _) = seeded_db();
        let diet = create_diet(&db, "Plano", Some(2000.0), vec![]).unwrap();
        let mut rx = db.subscribe();

        assert!(update_diet(&db, 9999, Some("Outro".to_string()), None, false).unwrap().is_none());
        assert!(delete_diet(&db, 9999).unwrap().is_none());
        assert!(rx.try_recv().is_err());

        assert!(update_diet(&db, diet.id, None, Some(1800.0), false).unwrap().is_some());
        assert_eq!(rx.try_recv().unwrap(), DataChange::Diets);
    }
}
