//! Product entity - Catalog items with pricing and reorder thresholds.
//!
//! Physical stock lives in `product_locations`; `stock_level` is the level
//! recorded in the catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product name
    pub name: String,
    /// Catalog category
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Stock level recorded in the catalog
    pub stock_level: i64,
    /// Reorder threshold: a purchase order is due when stock falls below it
    pub reorder_quantity: i64,
    /// Date of the most recent purchase order
    pub last_purchase_date: Option<Date>,
    /// Supplier of this product, if known
    pub supplier_id: Option<i64>,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product optionally belongs to one supplier
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id",
        on_delete = "SetNull"
    )]
    Supplier,
    /// Per-store stock records
    #[sea_orm(has_many = "super::product_location::Entity")]
    Locations,
    /// Purchase orders raised for this product
    #[sea_orm(has_many = "super::purchase_order::Entity")]
    PurchaseOrders,
    /// Sales of this product
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::product_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
    }
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrders.def()
    }
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Level:{} Order at:{}",
            self.name, self.stock_level, self.reorder_quantity
        )
    }
}
