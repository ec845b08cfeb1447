//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{
    Employee, Expense, ExpenseTransaction, FoodItem, Session, Tag, expense_transaction,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use std::path::Path;
use tracing::debug;

/// Creates the directory holding a file-backed `SQLite` database, if any.
///
/// In-memory URLs and non-`SQLite` URLs are left alone.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_sqlite_parent(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or_default();
    if file.is_empty() || file.contains(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(file).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Establishes a connection to the database at `database_url`.
///
/// # Errors
/// Returns an error if the database directory cannot be created or the connection fails.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    ensure_sqlite_parent(database_url)?;
    debug!(url = database_url, "Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables (if they don't exist yet) from the entity definitions.
///
/// Expenses are created before the tables that reference them, and a unique index
/// backs the one-transaction-per-employee-per-expense rule.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Employee).await?;
    create_table(db, &schema, Expense).await?;
    create_table(db, &schema, ExpenseTransaction).await?;
    create_table(db, &schema, FoodItem).await?;
    create_table(db, &schema, Session).await?;
    create_table(db, &schema, Tag).await?;

    let pair_index = Index::create()
        .if_not_exists()
        .name("idx_expense_transactions_expense_employee")
        .table(ExpenseTransaction)
        .col(expense_transaction::Column::ExpenseId)
        .col(expense_transaction::Column::EmployeeId)
        .unique()
        .to_owned();
    db.execute(builder.build(&pair_index)).await?;

    Ok(())
}
