//! TACO Diet Tracker Library
//!
//! Food composition lookup, portion scaling, diet aggregation and energy
//! expenditure estimates over the TACO reference table.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
