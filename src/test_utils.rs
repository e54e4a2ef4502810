//! Shared test utilities for the ERP data layer.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{department, product, sales, staff, store, supplier},
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes `tracing` output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates a test department.
///
/// # Defaults
/// * `budget`: 10 000
pub async fn create_test_department(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::department::Model> {
    department::create_department(db, name, 10_000).await
}

/// Creates a test staff member.
///
/// # Defaults
/// * `role`: "Clerk"
/// * `salary`: 1 000
/// * `department_id`: None
pub async fn create_test_staff(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::staff::Model> {
    staff::create_staff(db, name, "Clerk", 1_000, None).await
}

/// Creates a staff member with a custom salary and department.
pub async fn create_custom_staff(
    db: &DatabaseConnection,
    name: &str,
    salary: i64,
    department_id: Option<i64>,
) -> Result<entities::staff::Model> {
    staff::create_staff(db, name, "Clerk", salary, department_id).await
}

/// Creates a test store.
///
/// # Defaults
/// * `location`: "{name} Road"
/// * `contact_number`: "01130000000"
/// * `operating_hours`: 10
pub async fn create_test_store(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::store::Model> {
    store::create_store(
        db,
        store::NewStore {
            name: name.to_string(),
            location: format!("{name} Road"),
            contact_number: "01130000000".to_string(),
            manager_id: None,
            operating_hours: 10,
        },
    )
    .await
}

/// Creates a test product without a supplier.
///
/// # Defaults
/// * `category`: "General"
/// * `price`: 10.0
/// * `reorder_quantity`: 0
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        product::NewProduct {
            name: name.to_string(),
            category: "General".to_string(),
            price: 10.0,
            stock_level: 0,
            reorder_quantity: 0,
            supplier_id: None,
        },
    )
    .await
}

/// Creates a test supplier.
pub async fn create_test_supplier(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::supplier::Model> {
    supplier::create_supplier(
        db,
        supplier::NewSupplier {
            name: name.to_string(),
            contact_details: "orders@example.com".to_string(),
            location: "Leeds".to_string(),
            contract_terms: "Net 30".to_string(),
        },
    )
    .await
}

/// Creates a product linked to a supplier, with custom price and reorder quantity.
pub async fn create_supplied_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    reorder_quantity: i64,
    supplier_id: i64,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        product::NewProduct {
            name: name.to_string(),
            category: "General".to_string(),
            price,
            stock_level: 0,
            reorder_quantity,
            supplier_id: Some(supplier_id),
        },
    )
    .await
}

/// Records a card sale on the given date.
pub async fn create_test_sale(
    db: &DatabaseConnection,
    store_id: i64,
    product_id: Option<i64>,
    employee_id: Option<i64>,
    amount: f64,
    sale_date: NaiveDate,
) -> Result<entities::sale::Model> {
    sales::record_sale(
        db,
        sales::NewSale {
            payment_method: "card".to_string(),
            total_amount: amount,
            store_id,
            product_id,
            employee_id,
            sale_date: Some(sale_date),
        },
    )
    .await
}
