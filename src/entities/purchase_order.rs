//! Purchase order entity - Replenishment orders raised against a product.
//!
//! The supplier is reached through the product's `supplier_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a purchase order, stored as text
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum OrderStatus {
    /// Created, not yet sent to the supplier
    #[default]
    #[sea_orm(string_value = "Pending")]
    Pending,
    /// Sent to the supplier
    #[sea_orm(string_value = "Ordered")]
    Ordered,
    /// Goods received
    #[sea_orm(string_value = "Delivered")]
    Delivered,
    /// Withdrawn
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Ordered => "Ordered",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// Purchase order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product being ordered
    pub product_id: i64,
    /// Units ordered
    pub quantity: i64,
    /// Total order value
    pub total_amount: f64,
    /// Date the order was created
    pub order_date: Date,
    /// Expected or actual delivery date
    pub delivery_date: Option<Date>,
    /// Current status
    pub status: OrderStatus,
}

/// Defines relationships between `PurchaseOrder` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one product and is deleted with it
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Id:{} - Product:#{} - Amount:{:.2} - Status:{}",
            self.id, self.product_id, self.total_amount, self.status
        )
    }
}
