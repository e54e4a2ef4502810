//! Stock location business logic - Per-store product quantities.
//!
//! Quantity changes are applied as conditional `UPDATE ... SET quantity = quantity + n`
//! statements so concurrent callers cannot push a row below zero.

use crate::{
    core::{product::require_product, store::require_store},
    entities::{ProductLocation, product_location},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument};

/// Finds the stock row for a (product, store) pair.
pub async fn find_location<C>(
    db: &C,
    product_id: i64,
    store_id: i64,
) -> Result<Option<product_location::Model>>
where
    C: ConnectionTrait,
{
    ProductLocation::find()
        .filter(product_location::Column::ProductId.eq(product_id))
        .filter(product_location::Column::StoreId.eq(store_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a stock row by ID.
pub async fn get_location(
    db: &DatabaseConnection,
    location_id: i64,
) -> Result<Option<product_location::Model>> {
    ProductLocation::find_by_id(location_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Adds `quantity` to the (product, store) row, creating it when missing.
pub(crate) async fn increment_location<C>(
    db: &C,
    product_id: i64,
    store_id: i64,
    quantity: i64,
) -> Result<product_location::Model>
where
    C: ConnectionTrait,
{
    let Some(existing) = find_location(db, product_id, store_id).await? else {
        return product_location::ActiveModel {
            product_id: Set(product_id),
            store_id: Set(store_id),
            quantity: Set(quantity),
            recorded_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(Into::into);
    };

    ProductLocation::update_many()
        .col_expr(
            product_location::Column::Quantity,
            Expr::col(product_location::Column::Quantity).add(quantity),
        )
        .col_expr(product_location::Column::RecordedAt, Expr::value(Utc::now()))
        .filter(product_location::Column::Id.eq(existing.id))
        .exec(db)
        .await?;

    ProductLocation::find_by_id(existing.id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("ProductLocation", existing.id))
}

/// Puts `quantity` units of a product on hand at a store.
///
/// Increments the existing row for the pair or creates one, so each product has at most
/// one stock row per store.
///
/// # Errors
/// Returns `Validation` for a negative quantity and `NotFound` when the product or
/// store does not exist.
#[instrument(skip(db))]
pub async fn stock_product<C>(
    db: &C,
    product_id: i64,
    store_id: i64,
    quantity: i64,
) -> Result<product_location::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    if quantity < 0 {
        return Err(Error::validation("Stock quantity cannot be negative"));
    }

    let txn = db.begin().await?;
    require_product(&txn, product_id).await?;
    require_store(&txn, store_id).await?;
    let location = increment_location(&txn, product_id, store_id, quantity).await?;
    txn.commit().await?;

    info!(
        "Stocked {} units of product {} at store {} (now {})",
        quantity, product_id, store_id, location.quantity
    );
    Ok(location)
}

/// Applies `delta` to a stock row.
///
/// # Errors
/// Returns `InsufficientStock` when the result would be negative, leaving the quantity
/// unchanged, and `NotFound` for an unknown location.
#[instrument(skip(db))]
pub async fn adjust_stock(
    db: &DatabaseConnection,
    location_id: i64,
    delta: i64,
) -> Result<product_location::Model> {
    let txn = db.begin().await?;

    let location = ProductLocation::find_by_id(location_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("ProductLocation", location_id))?;

    let insufficient = Error::InsufficientStock {
        available: location.quantity,
        requested: delta.saturating_neg(),
    };
    let Some(new_quantity) = location.quantity.checked_add(delta) else {
        return Err(Error::validation(format!(
            "Adjustment of {delta} overflows the stored quantity"
        )));
    };
    if new_quantity < 0 {
        return Err(insufficient);
    }

    let result = ProductLocation::update_many()
        .col_expr(
            product_location::Column::Quantity,
            Expr::col(product_location::Column::Quantity).add(delta),
        )
        .col_expr(product_location::Column::RecordedAt, Expr::value(Utc::now()))
        .filter(product_location::Column::Id.eq(location_id))
        .filter(product_location::Column::Quantity.gte(delta.saturating_neg()))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(insufficient);
    }

    let updated = ProductLocation::find_by_id(location_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("ProductLocation", location_id))?;
    txn.commit().await?;

    info!(
        "Adjusted stock location {} by {} (now {})",
        location_id, delta, updated.quantity
    );
    Ok(updated)
}
