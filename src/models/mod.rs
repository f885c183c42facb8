//! Data models
//!
//! Rust structs representing database entities.

mod diet;
mod diet_item;
mod nutrient_record;
mod nutrients;
mod user_profile;

pub use diet::{Diet, DietCreate, DietUpdate, DietWithItems};
pub use diet_item::{
    normalize_meal_tag, DietItem, DietItemCreate, DietItemUpdate, DietItemWithFood, KNOWN_MEALS,
};
pub use nutrient_record::{NutrientRecord, NutrientRecordCreate, NutrientRecordUpdate};
pub use nutrients::{
    AminoAcids, Lipids, MoisturePolicy, Nutrients, NUTRIENT_COLUMNS, NUTRIENT_COLUMN_COUNT,
};
pub use user_profile::{
    ProfileStore, ProfileUpdate, UserProfile, DEFAULT_CARBS_GOAL_PER_KG, DEFAULT_FAT_GOAL_PER_KG,
    DEFAULT_PROTEIN_GOAL_PER_KG, DEFAULT_WATER_GOAL_ML_PER_KG,
};
