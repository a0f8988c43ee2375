//! Database module
//!
//! Handles SQLite connection, migrations, and the read repository.

pub mod connection;
pub mod migrations;
pub mod repository;

pub use connection::{Database, DbError, DbResult};
pub use repository::PlanRepository;
