//! Household Meal Planner
//!
//! An MCP server for planning meals and shopping for a two-person household.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mealplan::build_info;
use mealplan::config::Config;
use mealplan::db::{migrations, Database};
use mealplan::mcp::MealPlanService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mealplan=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    build_info::print_startup_banner(&config);
    eprintln!("Starting MCP server on stdio...");

    // Ensure data directory exists
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Initializing database...");
    let database = Database::new(&config.database_path, config.pool_size)?;

    database.with_conn(|conn| {
        migrations::run_migrations(conn)?;
        let version = migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let service = MealPlanService::new(config.database_path, database);

    let server = service.serve((stdin(), stdout())).await?;
    info!("MCP server ready: {}", build_info::BuildInfo::current().label());

    server.waiting().await?;

    Ok(())
}
