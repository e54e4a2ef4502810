//! Catalog seeding from the `[seed]` section of config.toml.
//!
//! Suppliers, stores and products are inserted through the regular domain
//! operations, so seed data goes through the same validation as any caller.

use crate::core::{product, stock, store, supplier};
use crate::entities::Product;
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, TransactionTrait};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, instrument};

/// Initial catalog to load into an empty database
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedCatalog {
    /// Suppliers to create
    #[serde(default)]
    pub suppliers: Vec<SeedSupplier>,
    /// Stores to create
    #[serde(default)]
    pub stores: Vec<SeedStore>,
    /// Products to create, with their initial stock per store
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// Supplier entry in the seed catalog
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedSupplier {
    /// Supplier name, referenced by products
    pub name: String,
    /// Contact details
    pub contact_details: String,
    /// Location
    pub location: String,
    /// Contract terms
    #[serde(default)]
    pub contract_terms: String,
}

/// Store entry in the seed catalog
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedStore {
    /// Store name, referenced by product stock tables
    pub name: String,
    /// Location
    pub location: String,
    /// Contact number
    pub contact_number: String,
    /// Opening hours per day
    pub operating_hours: i32,
}

/// Product entry in the seed catalog
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedProduct {
    /// Product name
    pub name: String,
    /// Category
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Reorder threshold
    #[serde(default)]
    pub reorder_quantity: i64,
    /// Name of a supplier from the same catalog
    #[serde(default)]
    pub supplier: Option<String>,
    /// Initial quantity per store name
    #[serde(default)]
    pub stock: BTreeMap<String, i64>,
}

/// Seeds `catalog` when the products table is empty.
///
/// Returns `true` when the catalog was inserted, `false` when existing data was found.
/// The catalog is inserted in one transaction: on error nothing is kept, so the next
/// start retries the seed.
///
/// # Errors
/// Returns an error if a product references a supplier or store missing from the
/// catalog, if an entry fails validation, or if the database rejects an insert.
#[instrument(skip(db, catalog))]
pub async fn seed_catalog(db: &DatabaseConnection, catalog: &SeedCatalog) -> Result<bool> {
    if Product::find().count(db).await? > 0 {
        info!("Products already present, skipping catalog seed");
        return Ok(false);
    }

    let txn = db.begin().await?;

    let mut supplier_ids = HashMap::new();
    for entry in &catalog.suppliers {
        let created = supplier::create_supplier(
            &txn,
            supplier::NewSupplier {
                name: entry.name.clone(),
                contact_details: entry.contact_details.clone(),
                location: entry.location.clone(),
                contract_terms: entry.contract_terms.clone(),
            },
        )
        .await?;
        supplier_ids.insert(entry.name.as_str(), created.id);
    }

    let mut store_ids = HashMap::new();
    for entry in &catalog.stores {
        let created = store::create_store(
            &txn,
            store::NewStore {
                name: entry.name.clone(),
                location: entry.location.clone(),
                contact_number: entry.contact_number.clone(),
                manager_id: None,
                operating_hours: entry.operating_hours,
            },
        )
        .await?;
        store_ids.insert(entry.name.as_str(), created.id);
    }

    for entry in &catalog.products {
        let supplier_id = match entry.supplier.as_deref() {
            Some(name) => Some(*supplier_ids.get(name).ok_or_else(|| Error::Config {
                message: format!("Product '{}' references unknown supplier '{name}'", entry.name),
            })?),
            None => None,
        };

        let created = product::create_product(
            &txn,
            product::NewProduct {
                name: entry.name.clone(),
                category: entry.category.clone(),
                price: entry.price,
                stock_level: entry.stock.values().sum(),
                reorder_quantity: entry.reorder_quantity,
                supplier_id,
            },
        )
        .await?;

        for (store_name, quantity) in &entry.stock {
            let store_id = *store_ids.get(store_name.as_str()).ok_or_else(|| Error::Config {
                message: format!(
                    "Product '{}' references unknown store '{store_name}'",
                    entry.name
                ),
            })?;
            stock::stock_product(&txn, created.id, store_id, *quantity).await?;
        }
    }

    txn.commit().await?;
    info!(
        "Seeded {} suppliers, {} stores and {} products",
        catalog.suppliers.len(),
        catalog.stores.len(),
        catalog.products.len()
    );
    Ok(true)
}
