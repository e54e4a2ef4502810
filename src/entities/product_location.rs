//! Product location entity - Quantity of one product held at one store.
//!
//! Rows are removed together with their product or store.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product location database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_locations")]
pub struct Model {
    /// Unique identifier for the stock record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product being stocked
    pub product_id: i64,
    /// Store holding the stock
    pub store_id: i64,
    /// Units on hand, never negative
    pub quantity: i64,
    /// When the quantity last changed
    pub recorded_at: DateTimeUtc,
}

/// Defines relationships between `ProductLocation` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each stock record belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    /// Each stock record belongs to one store
    #[sea_orm(
        belongs_to = "super::store::Entity",
        from = "Column::StoreId",
        to = "super::store::Column::Id",
        on_delete = "Cascade"
    )]
    Store,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
