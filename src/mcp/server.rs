//! TACO MCP Server Implementation
//!
//! Implements the MCP server with all TACO tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{ProfileUpdate, KNOWN_MEALS};
use crate::nutrition::{ActivityLevel, UNCATEGORIZED};
use crate::tools::diets::{self, DietItemInput};
use crate::tools::foods;
use crate::tools::profile;
use crate::tools::status::StatusTracker;

/// TACO MCP Service
#[derive(Clone)]
pub struct TacoService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<TacoService>,
}

impl TacoService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(entity: &str, id: i64) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(format!(
        r#"{{"error": "{} not found", "id": {}}}"#,
        entity, id
    ))]))
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodsParams {
    /// At least 2 characters; matches the start of the food name
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetFoodParams {
    pub id: i64,
    /// Portion in grams (default 100)
    pub portion_grams: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListFoodsByCategoryParams {
    pub category: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DietItemParams {
    pub food_id: i64,
    pub quantity_grams: f64,
    /// Meal tag, e.g. "Almoço"; omit for Uncategorized
    pub meal: Option<String>,
}

impl From<DietItemParams> for DietItemInput {
    fn from(p: DietItemParams) -> Self {
        Self {
            food_id: p.food_id,
            quantity_grams: p.quantity_grams,
            meal: p.meal,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateDietParams {
    pub name: String,
    /// Daily kcal goal
    pub calorie_goal: Option<f64>,
    #[serde(default)]
    pub items: Vec<DietItemParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDietsParams {
    /// Name substring filter
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDietParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddDietItemParams {
    pub diet_id: i64,
    pub food_id: i64,
    pub quantity_grams: f64,
    pub meal: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddDietItemsBatchParams {
    pub diet_id: i64,
    pub items: Vec<DietItemParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateDietItemParams {
    pub id: i64,
    pub quantity_grams: Option<f64>,
    /// New meal tag; empty string clears it
    pub meal: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveDietItemParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateDietParams {
    pub id: i64,
    pub name: Option<String>,
    pub calorie_goal: Option<f64>,
    #[serde(default)]
    pub clear_calorie_goal: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteDietParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetProfileParams {
    /// sedentary, light, moderate, active or very_active (default sedentary)
    pub activity_level: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    /// kg
    pub weight: Option<f64>,
    /// cm
    pub height: Option<f64>,
    pub age: Option<u32>,
    /// "male"/"masculino" or anything else for the female equation
    pub sex: Option<String>,
    pub protein_goal_per_kg: Option<f64>,
    pub carbs_goal_per_kg: Option<f64>,
    pub fat_goal_per_kg: Option<f64>,
    pub water_goal_ml_per_kg: Option<f64>,
    pub calorie_goal: Option<f64>,
    pub activity_level: Option<String>,
}

#[derive(Debug, Serialize)]
struct ActivityLevelEntry {
    name: &'static str,
    label: &'static str,
    multiplier: f64,
}

#[derive(Debug, Serialize)]
struct MealSuggestions {
    meals: Vec<&'static str>,
    uncategorized: &'static str,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl TacoService {
    // --- Status ---

    #[tool(description = "Get the current status of the TACO service including build info, database status, and process information")]
    async fn taco_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get instructions for finding foods and building diets. Call this when starting a diet planning session.")]
    fn diet_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::DIET_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(DIET_INSTRUCTIONS)]))
    }

    // --- Foods ---

    #[tool(description = "Search TACO foods by name prefix (case-insensitive, at least 2 characters). Values are per 100 g.")]
    fn search_foods(&self, Parameters(p): Parameters<SearchFoodsParams>) -> Result<CallToolResult, McpError> {
        let result = foods::search_foods(&self.database, &p.query, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get the full nutrient breakdown of a food for a portion in grams (default 100 g)")]
    fn get_food(&self, Parameters(p): Parameters<GetFoodParams>) -> Result<CallToolResult, McpError> {
        let result = foods::get_food(&self.database, p.id, p.portion_grams).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(food) => to_json(&food),
            None => not_found("Food", p.id),
        }
    }

    #[tool(description = "List the food categories of the TACO table")]
    fn list_categories(&self) -> Result<CallToolResult, McpError> {
        let result = foods::list_categories(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List all foods in a category")]
    fn list_foods_by_category(&self, Parameters(p): Parameters<ListFoodsByCategoryParams>) -> Result<CallToolResult, McpError> {
        let result = foods::list_foods_by_category(&self.database, &p.category).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Diets ---

    #[tool(description = "Create a diet with an optional daily calorie goal and optional initial items")]
    fn create_diet(&self, Parameters(p): Parameters<CreateDietParams>) -> Result<CallToolResult, McpError> {
        let items = p.items.into_iter().map(DietItemInput::from).collect();
        let result = diets::create_diet(&self.database, &p.name, p.calorie_goal, items)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List diets, newest first, optionally filtered by name")]
    fn list_diets(&self, Parameters(p): Parameters<ListDietsParams>) -> Result<CallToolResult, McpError> {
        let result = diets::list_diets(&self.database, p.search.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a diet with items grouped by meal, kcal/protein/carbohydrate/fat totals and calorie goal progress")]
    fn get_diet(&self, Parameters(p): Parameters<GetDietParams>) -> Result<CallToolResult, McpError> {
        let result = diets::get_diet(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(diet) => to_json(&diet),
            None => not_found("Diet", p.id),
        }
    }

    #[tool(description = "Get the most recently created diet with its totals")]
    fn get_latest_diet(&self) -> Result<CallToolResult, McpError> {
        let result = diets::get_latest_diet(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(diet) => to_json(&diet),
            None => Ok(CallToolResult::success(vec![Content::text(r#"{"error": "No diets yet"}"#)])),
        }
    }

    #[tool(description = "Add a food to a diet with a portion in grams and an optional meal tag")]
    fn add_diet_item(&self, Parameters(p): Parameters<AddDietItemParams>) -> Result<CallToolResult, McpError> {
        let item = DietItemInput {
            food_id: p.food_id,
            quantity_grams: p.quantity_grams,
            meal: p.meal,
        };
        let result = diets::add_diet_item(&self.database, p.diet_id, item).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add multiple foods to a diet in one call. PREFERRED over add_diet_item when adding several foods.")]
    fn add_diet_items_batch(&self, Parameters(p): Parameters<AddDietItemsBatchParams>) -> Result<CallToolResult, McpError> {
        let items = p.items.into_iter().map(DietItemInput::from).collect();
        let result = diets::add_diet_items_batch(&self.database, p.diet_id, items)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Change a diet item's portion or meal tag")]
    fn update_diet_item(&self, Parameters(p): Parameters<UpdateDietItemParams>) -> Result<CallToolResult, McpError> {
        let result = diets::update_diet_item(&self.database, p.id, p.quantity_grams, p.meal)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(item) => to_json(&item),
            None => not_found("Diet item", p.id),
        }
    }

    #[tool(description = "Remove an item from its diet")]
    fn remove_diet_item(&self, Parameters(p): Parameters<RemoveDietItemParams>) -> Result<CallToolResult, McpError> {
        let result = diets::remove_diet_item(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(r) => to_json(&r),
            None => not_found("Diet item", p.id),
        }
    }

    #[tool(description = "Rename a diet or set/clear its calorie goal")]
    fn update_diet(&self, Parameters(p): Parameters<UpdateDietParams>) -> Result<CallToolResult, McpError> {
        let result = diets::update_diet(&self.database, p.id, p.name, p.calorie_goal, p.clear_calorie_goal)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(diet) => to_json(&diet),
            None => not_found("Diet", p.id),
        }
    }

    #[tool(description = "Delete a diet and all of its items")]
    fn delete_diet(&self, Parameters(p): Parameters<DeleteDietParams>) -> Result<CallToolResult, McpError> {
        let result = diets::delete_diet(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(r) => to_json(&r),
            None => not_found("Diet", p.id),
        }
    }

    #[tool(description = "List suggested meal tags")]
    fn list_meal_suggestions(&self) -> Result<CallToolResult, McpError> {
        to_json(&MealSuggestions {
            meals: KNOWN_MEALS.to_vec(),
            uncategorized: UNCATEGORIZED,
        })
    }

    // --- Profile ---

    #[tool(description = "Get the user profile with basal metabolic rate, total daily expenditure for an activity level, and macro targets")]
    fn get_profile(&self, Parameters(p): Parameters<GetProfileParams>) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database, p.activity_level.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update profile fields (weight kg, height cm, age, sex, per-kg macro goals, water goal, calorie goal). Only provided fields change.")]
    fn update_profile(&self, Parameters(p): Parameters<UpdateProfileParams>) -> Result<CallToolResult, McpError> {
        let update = ProfileUpdate {
            weight: p.weight,
            height: p.height,
            age: p.age,
            sex: p.sex,
            protein_goal_per_kg: p.protein_goal_per_kg,
            carbs_goal_per_kg: p.carbs_goal_per_kg,
            fat_goal_per_kg: p.fat_goal_per_kg,
            water_goal_ml_per_kg: p.water_goal_ml_per_kg,
            calorie_goal: p.calorie_goal,
        };
        let result = profile::update_profile(&self.database, update, p.activity_level.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List activity levels and their expenditure multipliers")]
    fn list_activity_levels(&self) -> Result<CallToolResult, McpError> {
        let levels: Vec<ActivityLevelEntry> = ActivityLevel::ALL
            .iter()
            .map(|l| ActivityLevelEntry {
                name: l.as_str(),
                label: l.label(),
                multiplier: l.multiplier(),
            })
            .collect();
        to_json(&levels)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for TacoService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "taco".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("TACO Diet Tracker".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "TACO Diet Tracker - Brazilian food composition table and diet planning. \
                 IMPORTANT: Call diet_instructions before building diets. \
                 Foods (values per 100 g): search_foods, get_food (with portion_grams), list_categories, list_foods_by_category. \
                 Diets: create/list/get/update/delete_diet, get_latest_diet, \
                 add_diet_item, add_diet_items_batch, update_diet_item, remove_diet_item, list_meal_suggestions. \
                 Profile: get_profile (BMR/TDEE/macro targets), update_profile, list_activity_levels. \
                 Status: taco_status."
                    .into(),
            ),
        }
    }
}
