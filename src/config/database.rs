//! Database configuration module for `Pullsheet`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{Backstock, Flavor, OrderHeader, Protein, Report};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/pullsheet.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
/// This function handles connection errors and provides a clean interface for database access
/// throughout the application.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct definitions.
/// It creates tables for proteins, flavors, order headers, backstock, and reports.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Create tables using SeaORM's schema generation
    let protein_table = schema.create_table_from_entity(Protein);
    let flavor_table = schema.create_table_from_entity(Flavor);
    let order_header_table = schema.create_table_from_entity(OrderHeader);
    let backstock_table = schema.create_table_from_entity(Backstock);
    let report_table = schema.create_table_from_entity(Report);

    db.execute(builder.build(&protein_table)).await?;
    db.execute(builder.build(&flavor_table)).await?;
    db.execute(builder.build(&order_header_table)).await?;
    db.execute(builder.build(&backstock_table)).await?;
    db.execute(builder.build(&report_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        backstock::Model as BackstockModel, flavor::Model as FlavorModel,
        order_header::Model as OrderHeaderModel, protein::Model as ProteinModel,
        report::Model as ReportModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ProteinModel> = Protein::find().limit(1).all(&db).await?;
        let _: Vec<FlavorModel> = Flavor::find().limit(1).all(&db).await?;
        let _: Vec<OrderHeaderModel> = OrderHeader::find().limit(1).all(&db).await?;
        let _: Vec<BackstockModel> = Backstock::find().limit(1).all(&db).await?;
        let _: Vec<ReportModel> = Report::find().limit(1).all(&db).await?;

        Ok(())
    }
}
