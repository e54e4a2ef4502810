//! Sales business logic - Recording sales and date-ranged revenue aggregation.
//!
//! Every query here accepts an optional inclusive `[start, end]` date range; a missing
//! bound leaves that side open. Empty ranges produce zero totals and empty lists.

use crate::{
    core::{required_text, store::require_store, validate_amount},
    entities::{Product, Sale, Staff, Store, product, sale, store},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{FromQueryResult, JoinType, QueryOrder, QuerySelect, Select, Set, prelude::*};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, instrument};

/// Input for [`record_sale`]
#[derive(Debug, Clone)]
pub struct NewSale {
    /// Payment method
    pub payment_method: String,
    /// Sale value, finite and non-negative
    pub total_amount: f64,
    /// Store where the sale happened
    pub store_id: i64,
    /// Product sold, if tracked
    pub product_id: Option<i64>,
    /// Staff member who made the sale, if tracked
    pub employee_id: Option<i64>,
    /// Sale date, today when `None`
    pub sale_date: Option<NaiveDate>,
}

/// Sale joined with its store and staff names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleDetails {
    /// Sale identifier
    pub sale_id: i64,
    /// Payment method
    pub payment_method: String,
    /// Sale value
    pub total_amount: f64,
    /// Store name
    pub store: String,
    /// Staff name, if the sale still references a staff member
    pub staff: Option<String>,
    /// Sale date
    pub sale_date: NaiveDate,
}

impl fmt::Display for SaleDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Id: {} - Total: {:.2} - Store: {}",
            self.sale_id, self.total_amount, self.store
        )
    }
}

/// Revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct DailySalesTotal {
    /// Day
    pub sale_date: NaiveDate,
    /// Sum of sales on that day
    pub total_sales: f64,
}

/// Revenue for one store.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct StoreSalesTotal {
    /// Store identifier
    pub store_id: i64,
    /// Store name
    pub store_name: String,
    /// Sum of sales at the store
    pub total_sales: f64,
}

/// Revenue for one product at one store.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct ProductSalesTotal {
    /// Store identifier
    pub store_id: i64,
    /// Store name
    pub store_name: String,
    /// Product identifier; `None` groups sales whose product was deleted or never tracked
    pub product_id: Option<i64>,
    /// Product name
    pub product_name: Option<String>,
    /// Sum of sales of the product at the store
    pub total_sales: f64,
}

/// Records a sale.
///
/// # Errors
/// Returns `Validation` for an empty payment method or an invalid amount, and
/// `NotFound` if the store, product or staff member does not exist.
#[instrument(skip(db))]
pub async fn record_sale(db: &DatabaseConnection, new: NewSale) -> Result<sale::Model> {
    let payment_method = required_text("Payment method", &new.payment_method)?;
    validate_amount("Sale amount", new.total_amount)?;

    require_store(db, new.store_id).await?;
    if let Some(product_id) = new.product_id {
        Product::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("Product", product_id))?;
    }
    if let Some(employee_id) = new.employee_id {
        Staff::find_by_id(employee_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("Staff", employee_id))?;
    }

    let created = sale::ActiveModel {
        payment_method: Set(payment_method),
        total_amount: Set(new.total_amount),
        store_id: Set(new.store_id),
        product_id: Set(new.product_id),
        employee_id: Set(new.employee_id),
        sale_date: Set(new.sale_date.unwrap_or_else(|| Utc::now().date_naive())),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(
        "Recorded sale {} of {:.2} at store {}",
        created.id, created.total_amount, created.store_id
    );
    Ok(created)
}

/// Returns a sale with its store and staff names resolved.
pub async fn sale_details(db: &DatabaseConnection, sale_id: i64) -> Result<SaleDetails> {
    let (sale, store) = Sale::find_by_id(sale_id)
        .find_also_related(Store)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Sale", sale_id))?;
    let store = store.ok_or_else(|| Error::not_found("Store", sale.store_id))?;

    let staff = match sale.employee_id {
        Some(employee_id) => Staff::find_by_id(employee_id)
            .one(db)
            .await?
            .map(|s| s.name),
        None => None,
    };

    Ok(SaleDetails {
        sale_id: sale.id,
        payment_method: sale.payment_method,
        total_amount: sale.total_amount,
        store: store.name,
        staff,
        sale_date: sale.sale_date,
    })
}

/// Sales whose date lies inside the optional inclusive range.
pub(crate) fn sales_in_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Select<Sale> {
    let mut query = Sale::find();
    if let Some(start) = start {
        query = query.filter(sale::Column::SaleDate.gte(start));
    }
    if let Some(end) = end {
        query = query.filter(sale::Column::SaleDate.lte(end));
    }
    query
}

/// Revenue per day, in ascending date order.
pub async fn sales_summary<C>(
    db: &C,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<DailySalesTotal>>
where
    C: ConnectionTrait,
{
    let summary = sales_in_range(start, end)
        .select_only()
        .column(sale::Column::SaleDate)
        .column_as(sale::Column::TotalAmount.sum(), "total_sales")
        .group_by(sale::Column::SaleDate)
        .order_by_asc(sale::Column::SaleDate)
        .into_model::<DailySalesTotal>()
        .all(db)
        .await?;
    debug!("Sales summary covers {} days", summary.len());
    Ok(summary)
}

/// Total revenue in the range, 0 when no sale matches.
pub async fn total_sales<C>(db: &C, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<f64>
where
    C: ConnectionTrait,
{
    let total = sales_in_range(start, end)
        .select_only()
        .column_as(sale::Column::TotalAmount.sum(), "total_sales")
        .into_tuple::<Option<f64>>()
        .one(db)
        .await?
        .flatten();
    Ok(total.unwrap_or(0.0))
}

/// Revenue per store, ordered by store name.
pub async fn sales_by_store<C>(
    db: &C,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<StoreSalesTotal>>
where
    C: ConnectionTrait,
{
    sales_in_range(start, end)
        .select_only()
        .column(sale::Column::StoreId)
        .column_as(store::Column::Name, "store_name")
        .column_as(sale::Column::TotalAmount.sum(), "total_sales")
        .join(JoinType::InnerJoin, sale::Relation::Store.def())
        .group_by(sale::Column::StoreId)
        .group_by(store::Column::Name)
        .order_by_asc(store::Column::Name)
        .into_model::<StoreSalesTotal>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Revenue per (store, product), ordered by product name then store name.
pub async fn sales_by_store_and_product<C>(
    db: &C,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<ProductSalesTotal>>
where
    C: ConnectionTrait,
{
    sales_in_range(start, end)
        .select_only()
        .column(sale::Column::StoreId)
        .column_as(store::Column::Name, "store_name")
        .column(sale::Column::ProductId)
        .column_as(product::Column::Name, "product_name")
        .column_as(sale::Column::TotalAmount.sum(), "total_sales")
        .join(JoinType::InnerJoin, sale::Relation::Store.def())
        .join(JoinType::LeftJoin, sale::Relation::Product.def())
        .group_by(sale::Column::StoreId)
        .group_by(store::Column::Name)
        .group_by(sale::Column::ProductId)
        .group_by(product::Column::Name)
        .order_by_asc(product::Column::Name)
        .order_by_asc(store::Column::Name)
        .into_model::<ProductSalesTotal>()
        .all(db)
        .await
        .map_err(Into::into)
}
