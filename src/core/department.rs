//! Department business logic - budgets, managers and membership.

use crate::{
    core::required_text,
    entities::{Department, Staff, department, staff},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Retrieves a department by its unique ID.
pub async fn get_department_by_id(
    db: &DatabaseConnection,
    department_id: i64,
) -> Result<Option<department::Model>> {
    Department::find_by_id(department_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_department(
    db: &DatabaseConnection,
    department_id: i64,
) -> Result<department::Model> {
    get_department_by_id(db, department_id)
        .await?
        .ok_or_else(|| Error::not_found("Department", department_id))
}

fn validate_budget(budget: i64) -> Result<()> {
    if budget < 0 {
        return Err(Error::validation(format!(
            "Budget must be a non-negative integer, got {budget}"
        )));
    }
    Ok(())
}

/// Creates a department with no manager.
///
/// # Errors
/// Returns an error if the name is empty, the budget is negative, or the insert fails.
#[instrument(skip(db))]
pub async fn create_department(
    db: &DatabaseConnection,
    name: &str,
    budget: i64,
) -> Result<department::Model> {
    let name = required_text("Department name", name)?;
    validate_budget(budget)?;

    let created = department::ActiveModel {
        name: Set(name),
        manager_id: Set(None),
        budget: Set(budget),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created department {} (ID: {})", created.name, created.id);
    Ok(created)
}

/// Sets the department budget.
///
/// A negative amount is rejected before anything is written.
#[instrument(skip(db))]
pub async fn set_budget(
    db: &DatabaseConnection,
    department_id: i64,
    amount: i64,
) -> Result<department::Model> {
    validate_budget(amount)?;

    let mut active: department::ActiveModel = require_department(db, department_id).await?.into();
    active.budget = Set(amount);
    let updated = active.update(db).await?;
    info!("Department {} budget set to {}", department_id, amount);
    Ok(updated)
}

/// Returns the department budget.
pub async fn get_budget(db: &DatabaseConnection, department_id: i64) -> Result<i64> {
    Ok(require_department(db, department_id).await?.budget)
}

/// Lists the staff members assigned to a department, ordered by name.
pub async fn employees(db: &DatabaseConnection, department_id: i64) -> Result<Vec<staff::Model>> {
    Staff::find()
        .filter(staff::Column::DepartmentId.eq(department_id))
        .order_by_asc(staff::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets or clears the department manager.
///
/// # Errors
/// Returns `NotFound` if the department or the staff member does not exist, and
/// `Validation` if the staff member already manages another department.
#[instrument(skip(db))]
pub async fn set_manager(
    db: &DatabaseConnection,
    department_id: i64,
    staff_id: Option<i64>,
) -> Result<department::Model> {
    let department = require_department(db, department_id).await?;
    if let Some(staff_id) = staff_id {
        Staff::find_by_id(staff_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("Staff", staff_id))?;

        let managed = Department::find()
            .filter(department::Column::ManagerId.eq(staff_id))
            .filter(department::Column::Id.ne(department_id))
            .one(db)
            .await?;
        if let Some(other) = managed {
            return Err(Error::validation(format!(
                "Staff {staff_id} already manages department {}",
                other.name
            )));
        }
    }

    let mut active: department::ActiveModel = department.into();
    active.manager_id = Set(staff_id);
    let updated = active.update(db).await?;
    info!("Department {} manager set to {:?}", department_id, staff_id);
    Ok(updated)
}

/// Deletes a department. Staff assigned to it keep their records with no department.
#[instrument(skip(db))]
pub async fn delete_department(db: &DatabaseConnection, department_id: i64) -> Result<()> {
    let result = Department::delete_by_id(department_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Department", department_id));
    }
    info!("Deleted department {}", department_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_department_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_department(&db, "Finance", -1).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_department(&db, "  ", 100).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_budget_rejects_negative_without_writing() -> Result<()> {
        let db = setup_test_db().await?;
        let department = create_test_department(&db, "Finance").await?;

        let result = set_budget(&db, department.id, -500).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        assert_eq!(get_budget(&db, department.id).await?, department.budget);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_budget_accepts_zero_and_positive() -> Result<()> {
        let db = setup_test_db().await?;
        let department = create_test_department(&db, "Finance").await?;

        assert_eq!(set_budget(&db, department.id, 0).await?.budget, 0);
        assert_eq!(set_budget(&db, department.id, 25_000).await?.budget, 25_000);
        assert_eq!(get_budget(&db, department.id).await?, 25_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_budget_missing_department() -> Result<()> {
        let db = setup_test_db().await?;
        let result = set_budget(&db, 42, 10).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "Department",
                id: 42
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_employees_lists_assigned_staff() -> Result<()> {
        let db = setup_test_db().await?;
        let finance = create_test_department(&db, "Finance").await?;
        let logistics = create_test_department(&db, "Logistics").await?;

        create_custom_staff(&db, "Zoe", 1_000, Some(finance.id)).await?;
        create_custom_staff(&db, "Adam", 1_000, Some(finance.id)).await?;
        create_custom_staff(&db, "Lin", 1_000, Some(logistics.id)).await?;
        create_custom_staff(&db, "Sam", 1_000, None).await?;

        let names: Vec<String> = employees(&db, finance.id)
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Adam", "Zoe"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_manager_and_display() -> Result<()> {
        let db = setup_test_db().await?;
        let department = create_test_department(&db, "Finance").await?;
        let manager = create_test_staff(&db, "Grace").await?;

        let updated = set_manager(&db, department.id, Some(manager.id)).await?;
        assert_eq!(updated.manager_id, Some(manager.id));
        assert_eq!(updated.to_string(), format!("Finance - Manager: #{}", manager.id));

        let result = set_manager(&db, department.id, Some(999)).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        let cleared = set_manager(&db, department.id, None).await?;
        assert_eq!(cleared.to_string(), "Finance");

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_department_keeps_staff() -> Result<()> {
        let db = setup_test_db().await?;
        let department = create_test_department(&db, "Finance").await?;
        let member = create_custom_staff(&db, "Ada", 1_000, Some(department.id)).await?;

        delete_department(&db, department.id).await?;

        let member = Staff::find_by_id(member.id).one(&db).await?.unwrap();
        assert_eq!(member.department_id, None);
        assert!(matches!(
            delete_department(&db, department.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_manager_rejects_manager_of_other_department() -> Result<()> {
        let db = setup_test_db().await?;
        let finance = create_test_department(&db, "Finance").await?;
        let logistics = create_test_department(&db, "Logistics").await?;
        let manager = create_test_staff(&db, "Grace").await?;

        set_manager(&db, finance.id, Some(manager.id)).await?;
        set_manager(&db, finance.id, Some(manager.id)).await?;

        let result = set_manager(&db, logistics.id, Some(manager.id)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        assert_eq!(
            get_department_by_id(&db, logistics.id)
                .await?
                .unwrap()
                .manager_id,
            None
        );

        Ok(())
    }
}
