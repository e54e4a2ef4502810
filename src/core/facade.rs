//! Facade - Cross-entity workflows over a single connection handle.
//!
//! The reorder trigger never fails outward: every outcome, including storage errors,
//! is reported as a human-readable message.

use crate::{
    core::{
        product::{get_product_by_id, list_products, total_stock},
        purchase_order::create_purchase_order,
        sales::{ProductSalesTotal, StoreSalesTotal, sales_by_store, sales_by_store_and_product},
        supplier::get_supplier_by_id,
    },
    entities::{OrderStatus, product},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Revenue grouped by store and by store/product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPerformanceReport {
    /// Per store, ordered by store name
    pub store_sales: Vec<StoreSalesTotal>,
    /// Per store and product, ordered by product name then store name
    pub product_sales: Vec<ProductSalesTotal>,
}

/// Entry point for operations that span several entities.
#[derive(Debug)]
pub struct Facade {
    db: DatabaseConnection,
}

/// Outcome of a reorder check, rendered by [`Facade::trigger_purchase_order_if_low`].
enum ReorderOutcome {
    MissingProduct,
    MissingSupplier,
    Ordered { order_id: i64, quantity: i64 },
    Sufficient { stock: i64 },
}

impl Facade {
    /// Wraps an open connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connection the facade operates on.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Revenue for the optional inclusive date range.
    ///
    /// # Errors
    /// Storage failures are returned as `Aggregation`.
    pub async fn sales_performance_report(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<SalesPerformanceReport> {
        let store_sales = sales_by_store(&self.db, start, end)
            .await
            .map_err(|e| wrap_aggregation("sales by store", e))?;
        let product_sales = sales_by_store_and_product(&self.db, start, end)
            .await
            .map_err(|e| wrap_aggregation("sales by product", e))?;

        debug!(
            "Sales report: {} stores, {} store/product rows",
            store_sales.len(),
            product_sales.len()
        );
        Ok(SalesPerformanceReport {
            store_sales,
            product_sales,
        })
    }

    /// Creates a pending purchase order when the product's total stock is below its
    /// reorder quantity, and reports what happened.
    #[instrument(skip(self))]
    pub async fn trigger_purchase_order_if_low(&self, product_id: i64) -> String {
        match self.reorder(product_id).await {
            Ok(ReorderOutcome::MissingProduct) => {
                format!("Product ID {product_id} does not exist.")
            }
            Ok(ReorderOutcome::MissingSupplier) => {
                warn!("Product {} is low but has no supplier", product_id);
                format!("No supplier found for product ID {product_id}.")
            }
            Ok(ReorderOutcome::Ordered { order_id, quantity }) => format!(
                "Purchase order {order_id} created for product ID {product_id} with quantity {quantity}."
            ),
            Ok(ReorderOutcome::Sufficient { stock }) => format!(
                "Stock level ({stock}) for product ID {product_id} is sufficient. No purchase order needed."
            ),
            Err(e) => {
                warn!("Reorder check for product {} failed: {}", product_id, e);
                format!("Error triggering purchase order: {e}")
            }
        }
    }

    /// Runs the reorder check over every product, in id order.
    pub async fn reorder_sweep(&self) -> Result<Vec<String>> {
        let products = list_products(&self.db).await?;
        let mut messages = Vec::with_capacity(products.len());
        for product in products {
            messages.push(self.trigger_purchase_order_if_low(product.id).await);
        }
        Ok(messages)
    }

    async fn reorder(&self, product_id: i64) -> Result<ReorderOutcome> {
        let Some(product) = get_product_by_id(&self.db, product_id).await? else {
            return Ok(ReorderOutcome::MissingProduct);
        };

        let stock = total_stock(&self.db, product_id).await?;
        if stock >= product.reorder_quantity {
            debug!(
                "Product {} holds {} units, reorder at {}",
                product_id, stock, product.reorder_quantity
            );
            return Ok(ReorderOutcome::Sufficient { stock });
        }

        let Some(supplier_id) = product.supplier_id else {
            return Ok(ReorderOutcome::MissingSupplier);
        };
        if get_supplier_by_id(&self.db, supplier_id).await?.is_none() {
            return Ok(ReorderOutcome::MissingSupplier);
        }

        let shortfall = product.reorder_quantity - stock;
        #[allow(clippy::cast_precision_loss)]
        let amount = shortfall as f64 * product.price;

        let txn = self.db.begin().await?;
        let order = create_purchase_order(
            &txn,
            product_id,
            shortfall,
            amount,
            None,
            Some(OrderStatus::Pending),
        )
        .await?;
        let mut active: product::ActiveModel = product.into();
        active.last_purchase_date = Set(Some(Utc::now().date_naive()));
        active.update(&txn).await?;
        txn.commit().await?;

        info!(
            "Reordered {} units of product {} (order {}, {:.2})",
            shortfall, product_id, order.id, amount
        );
        Ok(ReorderOutcome::Ordered {
            order_id: order.id,
            quantity: shortfall,
        })
    }
}

fn wrap_aggregation(metric: &'static str, error: Error) -> Error {
    match error {
        Error::Database(source) => Error::aggregation(metric, source),
        other => other,
    }
}
