//! TACO Tools module
//!
//! MCP tool implementations for the TACO diet tracker.

pub mod diets;
pub mod foods;
pub mod profile;
pub mod status;
