//! Sale entity - A completed sale at a store.
//!
//! Sales are deleted with their store; product and employee references are
//! nulled when those rows go away so the revenue history survives.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sale database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Payment method (e.g., "card", "cash")
    pub payment_method: String,
    /// Sale value
    pub total_amount: f64,
    /// Store where the sale happened
    pub store_id: i64,
    /// Product sold, if still on record
    pub product_id: Option<i64>,
    /// Staff member who processed the sale, if still on record
    pub employee_id: Option<i64>,
    /// Date of the sale
    pub sale_date: Date,
}

/// Defines relationships between Sale and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale belongs to one store
    #[sea_orm(
        belongs_to = "super::store::Entity",
        from = "Column::StoreId",
        to = "super::store::Column::Id",
        on_delete = "Cascade"
    )]
    Store,
    /// Product sold
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "SetNull"
    )]
    Product,
    /// Staff member who made the sale
    #[sea_orm(
        belongs_to = "super::staff::Entity",
        from = "Column::EmployeeId",
        to = "super::staff::Column::Id",
        on_delete = "SetNull"
    )]
    Employee,
}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Id: {} - Total: {:.2} - Store: #{}",
            self.id, self.total_amount, self.store_id
        )
    }
}
