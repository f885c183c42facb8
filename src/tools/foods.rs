//! Food MCP Tools
//!
//! Lookup tools over the TACO reference table.

use serde::Serialize;

use crate::db::Database;
use crate::models::{NutrientRecord, Nutrients};
use crate::nutrition::{breakdown, scale_portion, MacroSplit, DietTotals, NutrientValue};

/// Shortest query accepted by `search_foods`
pub const MIN_QUERY_LEN: usize = 2;

/// Summary of a food for list/search results (values per 100 g)
#[derive(Debug, Serialize)]
pub struct FoodSummary {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub category: String,
    pub energy_kcal: Option<f64>,
    pub protein: Option<f64>,
    pub carbohydrate: Option<f64>,
    pub fat: Option<f64>,
}

impl From<&NutrientRecord> for FoodSummary {
    fn from(food: &NutrientRecord) -> Self {
        Self {
            id: food.id,
            code: food.code.clone(),
            name: food.name.clone(),
            category: food.category.clone(),
            energy_kcal: food.nutrients.energy_kcal,
            protein: food.nutrients.protein,
            carbohydrate: food.nutrients.carbohydrate,
            fat: food.nutrients.fat(),
        }
    }
}

/// Response for search_foods
#[derive(Debug, Serialize)]
pub struct SearchFoodsResponse {
    pub items: Vec<FoodSummary>,
    pub total: usize,
}

/// Food detail for a portion
#[derive(Debug, Serialize)]
pub struct FoodDetail {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub category: String,
    pub portion_grams: f64,
    /// Scaled composition, absent values omitted
    pub nutrients: Vec<NutrientValue>,
    pub macro_split: MacroSplit,
    /// Scaled composition in structured form
    pub raw: Nutrients,
}

/// Response for list_categories
#[derive(Debug, Serialize)]
pub struct ListCategoriesResponse {
    pub categories: Vec<String>,
    pub count: usize,
}

/// Response for list_foods_by_category
#[derive(Debug, Serialize)]
pub struct ListFoodsByCategoryResponse {
    pub category: String,
    pub items: Vec<FoodSummary>,
    pub total: usize,
}

/// Search foods by name prefix
pub fn search_foods(db: &Database, query: &str, limit: i64) -> Result<SearchFoodsResponse, String> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Err(format!("Search query must have at least {} characters", MIN_QUERY_LEN));
    }
    let limit = limit.clamp(1, 100);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = NutrientRecord::search_by_name(&conn, query, limit)
        .map_err(|e| format!("Search failed: {}", e))?;
    tracing::debug!(query, hits = items.len(), "food search");

    let summaries: Vec<FoodSummary> = items.iter().map(FoodSummary::from).collect();
    let total = summaries.len();

    Ok(SearchFoodsResponse {
        items: summaries,
        total,
    })
}

/// Get a food scaled to `portion_grams` (100 g when not given)
pub fn get_food(db: &Database, id: i64, portion_grams: Option<f64>) -> Result<Option<FoodDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let food = NutrientRecord::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get food: {}", e))?;

    let Some(food) = food else {
        return Ok(None);
    };

    let grams = portion_grams.unwrap_or(100.0);
    let scaled = scale_portion(&food, grams).map_err(|e| e.to_string())?;

    Ok(Some(FoodDetail {
        id: food.id,
        code: food.code,
        name: food.name,
        category: food.category,
        portion_grams: grams,
        nutrients: breakdown(&scaled.nutrients),
        macro_split: MacroSplit::from_totals(&DietTotals::from_nutrients(&scaled.nutrients)),
        raw: scaled.nutrients,
    }))
}

/// List the distinct food categories
pub fn list_categories(db: &Database) -> Result<ListCategoriesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let categories = NutrientRecord::list_categories(&conn)
        .map_err(|e| format!("Failed to list categories: {}", e))?;
    let count = categories.len();

    Ok(ListCategoriesResponse { categories, count })
}

/// List the foods of one category
pub fn list_foods_by_category(db: &Database, category: &str) -> Result<ListFoodsByCategoryResponse, String> {
    let category = category.trim();
    if category.is_empty() {
        return Err("Category cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = NutrientRecord::list_by_category(&conn, category)
        .map_err(|e| format!("Failed to list foods: {}", e))?;

    let summaries: Vec<FoodSummary> = items.iter().map(FoodSummary::from).collect();
    let total = summaries.len();

    Ok(ListFoodsByCategoryResponse {
        category: category.to_string(),
        items: summaries,
        total,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{Lipids, NutrientRecordCreate};

    /// In-memory database holding apple and rice
    pub(crate) fn seeded_db() -> (Database, i64, i64) {
        let db = Database::in_memory().unwrap();
        let (apple, rice) = db
            .with_conn(|conn| {
                run_migrations(conn)?;
                let apple = NutrientRecord::insert(conn, &NutrientRecordCreate {
                    code: "182".to_string(),
                    name: "Maçã, Fuji, com casca, crua".to_string(),
                    category: "Frutas e derivados".to_string(),
                    nutrients: Nutrients {
                        energy_kcal: Some(56.0),
                        protein: Some(0.3),
                        carbohydrate: Some(15.2),
                        moisture: Some(84.3),
                        ..Default::default()
                    },
                })?;
                let rice = NutrientRecord::insert(conn, &NutrientRecordCreate {
                    code: "3".to_string(),
                    name: "Arroz, tipo 1, cozido".to_string(),
                    category: "Cereais e derivados".to_string(),
                    nutrients: Nutrients {
                        energy_kcal: Some(124.0),
                        protein: Some(2.6),
                        carbohydrate: Some(25.8),
                        moisture: Some(70.1),
                        lipids: Some(Lipids {
                            total: Some(1.0),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                })?;
                Ok((apple.id, rice.id))
            })
            .unwrap();
        (db, apple, rice)
    }

    #[test]
    fn test_search_requires_two_characters() {
        let (db, _, _) = seeded_db();
        assert!(search_foods(&db, "a", 20).is_err());
        assert!(search_foods(&db, "  m ", 20).is_err());

        let result = search_foods(&db, "MA", 20).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].code, "182");
    }

    #[test]
    fn test_get_food_scales_portion() {
        let (db, _, rice) = seeded_db();
        let detail = get_food(&db, rice, Some(200.0)).unwrap().unwrap();

        assert_eq!(detail.portion_grams, 200.0);
        assert_eq!(detail.raw.energy_kcal, Some(248.0));
        assert_eq!(detail.raw.moisture, Some(70.1));
        let kcal = detail.nutrients.iter().find(|v| v.column == "energy_kcal").unwrap();
        assert_eq!(kcal.value, 248.0);
        assert!(detail.macro_split.carbohydrate_pct > 80.0);
    }

    #[test]
    fn test_get_food_defaults_and_errors() {
        let (db, apple, _) = seeded_db();
        let detail = get_food(&db, apple, None).unwrap().unwrap();
        assert_eq!(detail.portion_grams, 100.0);
        assert!(detail.nutrients.iter().all(|v| v.column != "sodium"));

        assert!(get_food(&db, 9999, None).unwrap().is_none());
        assert!(get_food(&db, apple, Some(-1.0)).is_err());
    }

    #[test]
    fn test_categories() {
        let (db, _, _) = seeded_db();
        let categories = list_categories(&db).unwrap();
        assert_eq!(categories.count, 2);

        let fruits = list_foods_by_category(&db, "Frutas e derivados").unwrap();
        assert_eq!(fruits.total, 1);
        assert!(list_foods_by_category(&db, " ").is_err());
    }
}
