//! Store entity - Retail locations holding stock and recording sales.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stores")]
pub struct Model {
    /// Unique identifier for the store
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Store name
    pub name: String,
    /// Street address or area
    pub location: String,
    /// Phone number: digits with an optional leading `+`
    pub contact_number: String,
    /// Staff member managing the store; a staff member manages at most one
    #[sea_orm(unique)]
    pub manager_id: Option<i64>,
    /// Opening hours per day, 1 to 24
    pub operating_hours: i32,
}

/// Defines relationships between Store and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Optional manager; cleared when the staff row is deleted
    #[sea_orm(
        belongs_to = "super::staff::Entity",
        from = "Column::ManagerId",
        to = "super::staff::Column::Id",
        on_delete = "SetNull"
    )]
    Manager,
    /// Per-product stock records
    #[sea_orm(has_many = "super::product_location::Entity")]
    Locations,
    /// Sales recorded at this store
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
}

impl Related<super::product_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
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
        write!(f, "{} - {}", self.name, self.location)
    }
}
