//! Purchase order business logic - Order creation and status updates.

use crate::{
    core::{product::require_product, validate_amount},
    entities::{OrderStatus, PurchaseOrder, purchase_order},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Fields a caller may change on a purchase order. Unset fields are left alone.
///
/// Deserializing rejects any key other than `total_amount`, `delivery_date` and `status`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PurchaseOrderChanges {
    /// New order value
    pub total_amount: Option<f64>,
    /// New delivery date; use [`set_delivery_date`] to clear it
    pub delivery_date: Option<NaiveDate>,
    /// New status
    pub status: Option<OrderStatus>,
}

impl PurchaseOrderChanges {
    const fn is_empty(&self) -> bool {
        self.total_amount.is_none() && self.delivery_date.is_none() && self.status.is_none()
    }
}

/// Creates a purchase order for a product, dated today.
///
/// `status` defaults to [`OrderStatus::Pending`].
///
/// # Errors
/// Returns `Validation` for a negative quantity or an invalid amount and `NotFound`
/// when the product does not exist.
#[instrument(skip(db))]
pub async fn create_purchase_order<C>(
    db: &C,
    product_id: i64,
    quantity: i64,
    total_amount: f64,
    delivery_date: Option<NaiveDate>,
    status: Option<OrderStatus>,
) -> Result<purchase_order::Model>
where
    C: ConnectionTrait,
{
    if quantity < 0 {
        return Err(Error::validation("Order quantity cannot be negative"));
    }
    validate_amount("Total amount", total_amount)?;
    require_product(db, product_id).await?;

    let created = purchase_order::ActiveModel {
        product_id: Set(product_id),
        quantity: Set(quantity),
        total_amount: Set(total_amount),
        order_date: Set(Utc::now().date_naive()),
        delivery_date: Set(delivery_date),
        status: Set(status.unwrap_or_default()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(
        "Created purchase order {} for product {} ({} units, {:.2})",
        created.id, product_id, quantity, total_amount
    );
    Ok(created)
}

/// Retrieves a purchase order by ID.
pub async fn get_purchase_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<purchase_order::Model>> {
    PurchaseOrder::find_by_id(order_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_purchase_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<purchase_order::Model> {
    get_purchase_order_by_id(db, order_id)
        .await?
        .ok_or_else(|| Error::not_found("PurchaseOrder", order_id))
}

/// Returns the current status of an order.
pub async fn purchase_order_status(db: &DatabaseConnection, order_id: i64) -> Result<OrderStatus> {
    Ok(require_purchase_order(db, order_id).await?.status)
}

/// Lists the orders raised for a product, newest first.
pub async fn purchase_orders_for_product(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Vec<purchase_order::Model>> {
    PurchaseOrder::find()
        .filter(purchase_order::Column::ProductId.eq(product_id))
        .order_by_desc(purchase_order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies `changes` to an order.
///
/// # Errors
/// Returns `Validation` when no field is set or the amount is invalid, and `NotFound`
/// for an unknown order.
#[instrument(skip(db))]
pub async fn set_purchase_order(
    db: &DatabaseConnection,
    order_id: i64,
    changes: PurchaseOrderChanges,
) -> Result<purchase_order::Model> {
    if changes.is_empty() {
        return Err(Error::validation("No valid fields provided for update"));
    }
    if let Some(total_amount) = changes.total_amount {
        validate_amount("Total amount", total_amount)?;
    }

    let mut active: purchase_order::ActiveModel =
        require_purchase_order(db, order_id).await?.into();
    if let Some(total_amount) = changes.total_amount {
        active.total_amount = Set(total_amount);
    }
    if let Some(delivery_date) = changes.delivery_date {
        active.delivery_date = Set(Some(delivery_date));
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }

    let updated = active.update(db).await?;
    info!("Updated purchase order {} (status {})", order_id, updated.status);
    Ok(updated)
}

/// Sets or clears the delivery date of an order.
#[instrument(skip(db))]
pub async fn set_delivery_date(
    db: &DatabaseConnection,
    order_id: i64,
    delivery_date: Option<NaiveDate>,
) -> Result<purchase_order::Model> {
    let mut active: purchase_order::ActiveModel =
        require_purchase_order(db, order_id).await?.into();
    active.delivery_date = Set(delivery_date);
    let updated = active.update(db).await?;
    info!(
        "Purchase order {} delivery date set to {:?}",
        order_id, delivery_date
    );
    Ok(updated)
}
