//! Supplier business logic - Supplier records, their products and delivery performance.

use crate::{
    core::{DEFAULT_PERFORMANCE_WINDOW_DAYS, required_text, window_start},
    entities::{OrderStatus, Product, PurchaseOrder, Supplier, product, purchase_order, supplier},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{JoinType, QueryOrder, QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Input for [`create_supplier`]
#[derive(Debug, Clone)]
pub struct NewSupplier {
    /// Supplier name
    pub name: String,
    /// Contact details
    pub contact_details: String,
    /// Location
    pub location: String,
    /// Contract terms, may be empty
    pub contract_terms: String,
}

/// Fields a caller may change on a supplier. Unset fields are left alone.
///
/// Deserializing rejects any key outside this list.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupplierChanges {
    /// New name
    pub name: Option<String>,
    /// New contact details
    pub contact_details: Option<String>,
    /// New location
    pub location: Option<String>,
    /// New contract terms
    pub contract_terms: Option<String>,
}

impl SupplierChanges {
    const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.contact_details.is_none()
            && self.location.is_none()
            && self.contract_terms.is_none()
    }
}

/// Delivered purchase orders for one supplier over a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierPerformance {
    /// Window length in days
    pub window_days: u32,
    /// Number of delivered orders
    pub delivered_orders: i64,
    /// Total value of delivered orders
    pub delivered_amount: f64,
    /// Mean order value, 0 when nothing was delivered
    pub average_order_value: f64,
}

/// Retrieves a supplier by ID.
pub async fn get_supplier_by_id<C>(db: &C, supplier_id: i64) -> Result<Option<supplier::Model>>
where
    C: ConnectionTrait,
{
    Supplier::find_by_id(supplier_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all suppliers ordered by name.
pub async fn list_suppliers(db: &DatabaseConnection) -> Result<Vec<supplier::Model>> {
    Supplier::find()
        .order_by_asc(supplier::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn require_supplier(db: &DatabaseConnection, supplier_id: i64) -> Result<supplier::Model> {
    get_supplier_by_id(db, supplier_id)
        .await?
        .ok_or_else(|| Error::not_found("Supplier", supplier_id))
}

/// Creates a supplier.
#[instrument(skip(db))]
pub async fn create_supplier<C>(db: &C, new: NewSupplier) -> Result<supplier::Model>
where
    C: ConnectionTrait,
{
    let name = required_text("Supplier name", &new.name)?;

    let created = supplier::ActiveModel {
        name: Set(name),
        contact_details: Set(new.contact_details.trim().to_string()),
        location: Set(new.location.trim().to_string()),
        contract_terms: Set(new.contract_terms.trim().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created supplier {} (ID: {})", created.name, created.id);
    Ok(created)
}

/// Lists the products referencing this supplier, ordered by name.
pub async fn supplier_products(
    db: &DatabaseConnection,
    supplier_id: i64,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::SupplierId.eq(supplier_id))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies `changes` to a supplier.
///
/// # Errors
/// Returns `Validation` when no field is set or the new name is empty, and `NotFound`
/// for an unknown supplier.
#[instrument(skip(db))]
pub async fn set_supplier_data(
    db: &DatabaseConnection,
    supplier_id: i64,
    changes: SupplierChanges,
) -> Result<supplier::Model> {
    if changes.is_empty() {
        return Err(Error::validation("No valid fields provided for update"));
    }
    let name = changes
        .name
        .as_deref()
        .map(|n| required_text("Supplier name", n))
        .transpose()?;

    let mut active: supplier::ActiveModel = require_supplier(db, supplier_id).await?.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(contact_details) = changes.contact_details {
        active.contact_details = Set(contact_details);
    }
    if let Some(location) = changes.location {
        active.location = Set(location);
    }
    if let Some(contract_terms) = changes.contract_terms {
        active.contract_terms = Set(contract_terms);
    }

    let updated = active.update(db).await?;
    info!("Updated supplier {}", supplier_id);
    Ok(updated)
}

/// Delivered-order metrics for the trailing `window_days` ending today.
pub async fn supplier_performance(
    db: &DatabaseConnection,
    supplier_id: i64,
    window_days: u32,
) -> Result<SupplierPerformance> {
    supplier_performance_as_of(db, supplier_id, window_days, Utc::now().date_naive()).await
}

/// Delivered-order metrics for the `window_days` ending on `today`, both ends inclusive.
///
/// Only orders with status `Delivered` whose delivery date falls inside the window and
/// whose product references this supplier are counted.
///
/// # Errors
/// Returns `Validation` for a zero-day window, `NotFound` for an unknown supplier and
/// `Aggregation` if the order query fails.
pub async fn supplier_performance_as_of(
    db: &DatabaseConnection,
    supplier_id: i64,
    window_days: u32,
    today: NaiveDate,
) -> Result<SupplierPerformance> {
    let start = window_start(today, window_days)?;
    require_supplier(db, supplier_id).await?;

    let (amount, orders) = PurchaseOrder::find()
        .select_only()
        .column_as(purchase_order::Column::TotalAmount.sum(), "delivered_amount")
        .column_as(purchase_order::Column::Id.count(), "delivered_orders")
        .join(JoinType::InnerJoin, purchase_order::Relation::Product.def())
        .filter(product::Column::SupplierId.eq(supplier_id))
        .filter(purchase_order::Column::Status.eq(OrderStatus::Delivered))
        .filter(purchase_order::Column::DeliveryDate.between(start, today))
        .into_tuple::<(Option<f64>, i64)>()
        .one(db)
        .await
        .map_err(|e| Error::aggregation("supplier performance", e))?
        .unwrap_or((None, 0));

    let delivered_amount = amount.unwrap_or(0.0);
    #[allow(clippy::cast_precision_loss)]
    let average_order_value = if orders > 0 {
        delivered_amount / orders as f64
    } else {
        0.0
    };
    debug!(
        "Supplier {} delivered {} orders worth {}",
        supplier_id, orders, delivered_amount
    );

    Ok(SupplierPerformance {
        window_days,
        delivered_orders: orders,
        delivered_amount,
        average_order_value,
    })
}

/// Same as [`supplier_performance`] with [`DEFAULT_PERFORMANCE_WINDOW_DAYS`].
pub async fn supplier_performance_default(
    db: &DatabaseConnection,
    supplier_id: i64,
) -> Result<SupplierPerformance> {
    supplier_performance(db, supplier_id, DEFAULT_PERFORMANCE_WINDOW_DAYS).await
}
