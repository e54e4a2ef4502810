//! Product business logic - Catalog records, stock totals and inter-store transfers.
//!
//! Stock is held per store in `product_locations`. Transfers move units between two
//! of those rows inside one database transaction.

use crate::{
    core::{required_text, stock, store::require_store, validate_amount},
    entities::{Product, ProductLocation, Supplier, product, product_location, store},
    errors::{Error, Result},
};
use sea_orm::{
    FromQueryResult, JoinType, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Input for [`create_product`]
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Product name
    pub name: String,
    /// Category
    pub category: String,
    /// Unit price, finite and non-negative
    pub price: f64,
    /// Catalog stock level, non-negative
    pub stock_level: i64,
    /// Reorder threshold, non-negative
    pub reorder_quantity: i64,
    /// Supplier, if known
    pub supplier_id: Option<i64>,
}

/// Quantity of a product held at one store.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct ProductStock {
    /// Store identifier
    pub store_id: i64,
    /// Store name
    pub store_name: String,
    /// Store location
    pub location: String,
    /// Units on hand
    pub quantity: i64,
}

/// Both sides of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockTransfer {
    /// Source location after the transfer
    pub from: product_location::Model,
    /// Destination location after the transfer
    pub to: product_location::Model,
}

/// Retrieves a product by ID.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

pub(crate) async fn require_product<C>(db: &C, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))
}

/// Lists every product in ID order.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

fn validate_reorder_level(level: i64) -> Result<()> {
    if level < 0 {
        return Err(Error::validation(format!(
            "Reorder level must be a non-negative integer, got {level}"
        )));
    }
    Ok(())
}

/// Creates a product.
///
/// # Errors
/// Returns an error if:
/// - The name or category is empty
/// - The price is negative or not finite
/// - The stock level or reorder quantity is negative
/// - The supplier does not exist
/// - The database insert fails
#[instrument(skip(db))]
pub async fn create_product<C>(db: &C, new: NewProduct) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let name = required_text("Product name", &new.name)?;
    let category = required_text("Category", &new.category)?;
    validate_amount("Price", new.price)?;
    if new.stock_level < 0 {
        return Err(Error::validation("Stock level cannot be negative"));
    }
    validate_reorder_level(new.reorder_quantity)?;

    if let Some(supplier_id) = new.supplier_id {
        Supplier::find_by_id(supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("Supplier", supplier_id))?;
    }

    let created = product::ActiveModel {
        name: Set(name),
        category: Set(category),
        price: Set(new.price),
        stock_level: Set(new.stock_level),
        reorder_quantity: Set(new.reorder_quantity),
        last_purchase_date: Set(None),
        supplier_id: Set(new.supplier_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created product {} (ID: {})", created.name, created.id);
    Ok(created)
}

/// Deletes a product together with its stock locations and purchase orders.
/// Sales keep their history with the product reference cleared.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let result = Product::delete_by_id(product_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Product", product_id));
    }
    info!("Deleted product {}", product_id);
    Ok(())
}

/// Sum of the product's quantity across all stores, 0 when it is stocked nowhere.
pub async fn total_stock<C>(db: &C, product_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let total = ProductLocation::find()
        .select_only()
        .column_as(product_location::Column::Quantity.sum(), "total_stock")
        .filter(product_location::Column::ProductId.eq(product_id))
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?
        .flatten();
    Ok(total.unwrap_or(0))
}

/// Moves `quantity` units of a product from one store to another.
///
/// The source decrement only applies while the source still holds enough stock, and
/// both writes share one transaction: on any error neither location changes. The
/// destination row is created when the product was not stocked there yet.
///
/// # Errors
/// - `Validation` if `quantity` is not positive or both stores are the same
/// - `NotFound` if the product or destination store does not exist
/// - `InsufficientStock` if the source holds fewer than `quantity` units
#[instrument(skip(db))]
pub async fn transfer_stock(
    db: &DatabaseConnection,
    product_id: i64,
    from_store_id: i64,
    to_store_id: i64,
    quantity: i64,
) -> Result<StockTransfer> {
    if quantity <= 0 {
        return Err(Error::validation("Quantity must be greater than zero"));
    }
    if from_store_id == to_store_id {
        return Err(Error::validation(
            "Source and destination store must differ",
        ));
    }

    let txn = db.begin().await?;

    require_product(&txn, product_id).await?;
    require_store(&txn, to_store_id).await?;

    let Some(source) = stock::find_location(&txn, product_id, from_store_id).await? else {
        warn!(
            "Transfer of product {} rejected: not stocked at store {}",
            product_id, from_store_id
        );
        return Err(Error::InsufficientStock {
            available: 0,
            requested: quantity,
        });
    };
    if source.quantity < quantity {
        return Err(Error::InsufficientStock {
            available: source.quantity,
            requested: quantity,
        });
    }

    let decremented = ProductLocation::update_many()
        .col_expr(
            product_location::Column::Quantity,
            Expr::col(product_location::Column::Quantity).sub(quantity),
        )
        .col_expr(
            product_location::Column::RecordedAt,
            Expr::value(chrono::Utc::now()),
        )
        .filter(product_location::Column::Id.eq(source.id))
        .filter(product_location::Column::Quantity.gte(quantity))
        .exec(&txn)
        .await?;
    if decremented.rows_affected == 0 {
        return Err(Error::InsufficientStock {
            available: source.quantity,
            requested: quantity,
        });
    }

    let to = stock::increment_location(&txn, product_id, to_store_id, quantity).await?;
    let from = stock::find_location(&txn, product_id, from_store_id)
        .await?
        .ok_or_else(|| Error::not_found("ProductLocation", source.id))?;

    txn.commit().await?;

    info!(
        "Transferred {} units of product {} from store {} to store {}",
        quantity, product_id, from_store_id, to_store_id
    );
    Ok(StockTransfer { from, to })
}

/// Sets the reorder threshold.
#[instrument(skip(db))]
pub async fn set_reorder_level(
    db: &DatabaseConnection,
    product_id: i64,
    level: i64,
) -> Result<product::Model> {
    validate_reorder_level(level)?;

    let mut active: product::ActiveModel = require_product(db, product_id).await?.into();
    active.reorder_quantity = Set(level);
    let updated = active.update(db).await?;
    info!("Product {} reorder level set to {}", product_id, level);
    Ok(updated)
}

/// Lists the stores holding the product, ordered by store name.
pub async fn product_stores(db: &DatabaseConnection, product_id: i64) -> Result<Vec<ProductStock>> {
    ProductLocation::find()
        .select_only()
        .column(product_location::Column::StoreId)
        .column_as(store::Column::Name, "store_name")
        .column(store::Column::Location)
        .column(product_location::Column::Quantity)
        .join(JoinType::InnerJoin, product_location::Relation::Store.def())
        .filter(product_location::Column::ProductId.eq(product_id))
        .order_by_asc(store::Column::Name)
        .into_model::<ProductStock>()
        .all(db)
        .await
        .map_err(Into::into)
}
