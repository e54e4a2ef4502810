//! Department entity - Organisational unit with a budget and an optional manager.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Department database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    /// Unique identifier for the department
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Department name (e.g., "Finance", "Logistics")
    pub name: String,
    /// Staff member managing this department; a staff member manages at most one
    #[sea_orm(unique)]
    pub manager_id: Option<i64>,
    /// Budget allocation in whole currency units, never negative
    pub budget: i64,
}

/// Defines relationships between Department and other entities
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
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.manager_id {
            Some(manager_id) => write!(f, "{} - Manager: #{manager_id}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
