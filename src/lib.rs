//! Household Meal Planner Library
//!
//! Ingredients, recipes, a two-person meal plan and the shopping list built
//! from it, served over MCP.

pub mod build_info;
pub mod cache;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
