//! Staff business logic - Employee records, department assignment and performance metrics.

use crate::{
    core::{DEFAULT_PERFORMANCE_WINDOW_DAYS, required_text, window_start},
    entities::{Department, Sale, Staff, sale, staff},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument};

/// Fields a caller may change on a staff record. Unset fields are left alone.
///
/// Deserializing rejects any key other than `name`, `role` and `salary`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaffChanges {
    /// New full name
    pub name: Option<String>,
    /// New job title
    pub role: Option<String>,
    /// New salary, must be non-negative
    pub salary: Option<i64>,
}

impl StaffChanges {
    const fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.salary.is_none()
    }
}

/// Staff record joined with its department name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffProfile {
    /// Employee identifier
    pub employee_id: i64,
    /// Full name
    pub name: String,
    /// Job title
    pub role: String,
    /// Salary
    pub salary: i64,
    /// Department name, if assigned
    pub department: Option<String>,
    /// Start date
    pub start_date: NaiveDate,
}

impl fmt::Display for StaffProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.department {
            Some(department) => write!(f, "{} - Role: {} - In: {department}", self.name, self.role),
            None => write!(f, "{} - Role: {}", self.name, self.role),
        }
    }
}

/// Sales metrics for one employee over a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffPerformance {
    /// Employee name
    pub employee_name: String,
    /// Window length in days
    pub window_days: u32,
    /// Sum of sale amounts in the window
    pub period_total_sales: f64,
    /// Mean sale amount, 0 when there were no sales
    pub average_sale: f64,
    /// Number of sales in the window
    pub transaction_count: i64,
    /// `period_total_sales / window_days`
    pub sales_per_day: f64,
    /// `period_total_sales / salary`, with a zero salary treated as 1
    pub performance_index: f64,
}

/// Retrieves a staff member by ID.
pub async fn get_staff_by_id(db: &DatabaseConnection, staff_id: i64) -> Result<Option<staff::Model>> {
    Staff::find_by_id(staff_id).one(db).await.map_err(Into::into)
}

async fn require_staff(db: &DatabaseConnection, staff_id: i64) -> Result<staff::Model> {
    get_staff_by_id(db, staff_id)
        .await?
        .ok_or_else(|| Error::not_found("Staff", staff_id))
}

fn validate_salary(salary: i64) -> Result<()> {
    if salary < 0 {
        return Err(Error::validation(format!(
            "Salary must be a non-negative integer, got {salary}"
        )));
    }
    Ok(())
}

/// Creates a staff record starting today.
///
/// # Errors
/// Returns an error if the name or role is empty, the salary is negative, the
/// department does not exist, or the insert fails.
#[instrument(skip(db))]
pub async fn create_staff(
    db: &DatabaseConnection,
    name: &str,
    role: &str,
    salary: i64,
    department_id: Option<i64>,
) -> Result<staff::Model> {
    let name = required_text("Staff name", name)?;
    let role = required_text("Role", role)?;
    validate_salary(salary)?;

    if let Some(department_id) = department_id {
        Department::find_by_id(department_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("Department", department_id))?;
    }

    let created = staff::ActiveModel {
        name: Set(name),
        role: Set(role),
        salary: Set(salary),
        department_id: Set(department_id),
        start_date: Set(Utc::now().date_naive()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created staff {} (ID: {})", created.name, created.id);
    Ok(created)
}

/// Applies `changes` to a staff record.
///
/// # Errors
/// Returns `Validation` when no field is set, a text field is empty or the salary is
/// negative; nothing is written in that case. Returns `NotFound` for an unknown ID.
#[instrument(skip(db))]
pub async fn edit_staff(
    db: &DatabaseConnection,
    staff_id: i64,
    changes: StaffChanges,
) -> Result<staff::Model> {
    if changes.is_empty() {
        return Err(Error::validation("No valid fields provided for update"));
    }
    if let Some(salary) = changes.salary {
        validate_salary(salary)?;
    }
    let name = changes
        .name
        .as_deref()
        .map(|n| required_text("Staff name", n))
        .transpose()?;
    let role = changes
        .role
        .as_deref()
        .map(|r| required_text("Role", r))
        .transpose()?;

    let mut active: staff::ActiveModel = require_staff(db, staff_id).await?.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(role) = role {
        active.role = Set(role);
    }
    if let Some(salary) = changes.salary {
        active.salary = Set(salary);
    }

    let updated = active.update(db).await?;
    info!("Updated staff {}", staff_id);
    Ok(updated)
}

/// Moves a staff member into a department.
///
/// # Errors
/// Returns `NotFound` if either the staff member or the department does not exist.
#[instrument(skip(db))]
pub async fn assign_department(
    db: &DatabaseConnection,
    staff_id: i64,
    department_id: i64,
) -> Result<staff::Model> {
    Department::find_by_id(department_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Department", department_id))?;

    let mut active: staff::ActiveModel = require_staff(db, staff_id).await?.into();
    active.department_id = Set(Some(department_id));
    let updated = active.update(db).await?;
    info!("Assigned staff {} to department {}", staff_id, department_id);
    Ok(updated)
}

/// Returns the staff record together with its department name.
pub async fn staff_profile(db: &DatabaseConnection, staff_id: i64) -> Result<StaffProfile> {
    let (member, department) = Staff::find_by_id(staff_id)
        .find_also_related(Department)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Staff", staff_id))?;

    Ok(StaffProfile {
        employee_id: member.id,
        name: member.name,
        role: member.role,
        salary: member.salary,
        department: department.map(|d| d.name),
        start_date: member.start_date,
    })
}

/// Computes sales metrics for the trailing `window_days` ending today.
///
/// Pass [`DEFAULT_PERFORMANCE_WINDOW_DAYS`] for the usual 30-day view.
pub async fn staff_performance(
    db: &DatabaseConnection,
    staff_id: i64,
    window_days: u32,
) -> Result<StaffPerformance> {
    staff_performance_as_of(db, staff_id, window_days, Utc::now().date_naive()).await
}

/// Computes sales metrics for the `window_days` ending on `today`, both ends inclusive.
///
/// # Errors
/// Returns `Validation` for a zero-day window, `NotFound` for an unknown staff member and
/// `Aggregation` if the sales query fails.
pub async fn staff_performance_as_of(
    db: &DatabaseConnection,
    staff_id: i64,
    window_days: u32,
    today: NaiveDate,
) -> Result<StaffPerformance> {
    let start = window_start(today, window_days)?;
    let member = require_staff(db, staff_id).await?;

    let (total, count) = Sale::find()
        .select_only()
        .column_as(sale::Column::TotalAmount.sum(), "total_sales")
        .column_as(sale::Column::Id.count(), "transaction_count")
        .filter(sale::Column::EmployeeId.eq(staff_id))
        .filter(sale::Column::SaleDate.between(start, today))
        .into_tuple::<(Option<f64>, i64)>()
        .one(db)
        .await
        .map_err(|e| Error::aggregation("staff performance", e))?
        .unwrap_or((None, 0));

    let total = total.unwrap_or(0.0);
    #[allow(clippy::cast_precision_loss)]
    let average_sale = if count > 0 { total / count as f64 } else { 0.0 };
    #[allow(clippy::cast_precision_loss)]
    let salary = if member.salary == 0 {
        1.0
    } else {
        member.salary as f64
    };

    debug!(
        "Staff {} sold {} over {} sales in the last {} days",
        staff_id, total, count, window_days
    );

    Ok(StaffPerformance {
        employee_name: member.name,
        window_days,
        period_total_sales: total,
        average_sale,
        transaction_count: count,
        sales_per_day: total / f64::from(window_days),
        performance_index: total / salary,
    })
}

/// Same as [`staff_performance`] with [`DEFAULT_PERFORMANCE_WINDOW_DAYS`].
pub async fn staff_performance_default(
    db: &DatabaseConnection,
    staff_id: i64,
) -> Result<StaffPerformance> {
    staff_performance(db, staff_id, DEFAULT_PERFORMANCE_WINDOW_DAYS).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Days;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_edit_staff_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = edit_staff(&db, 1, StaffChanges::default()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let changes = StaffChanges {
            salary: Some(-1),
            ..StaffChanges::default()
        };
        let result = edit_staff(&db, 1, changes).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[test]
    fn test_staff_changes_reject_unknown_fields() {
        let parsed: std::result::Result<StaffChanges, _> =
            toml::from_str("name = \"Ada\"\nStartDate = \"2020-01-01\"");
        assert!(parsed.is_err());

        let parsed: StaffChanges = toml::from_str("salary = 1200").unwrap();
        assert_eq!(parsed.salary, Some(1200));
        assert!(parsed.name.is_none());
    }

    #[tokio::test]
    async fn test_edit_staff_salary_boundaries() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_staff(&db, "Ada").await?;

        let zero = StaffChanges {
            salary: Some(0),
            ..StaffChanges::default()
        };
        assert_eq!(edit_staff(&db, member.id, zero).await?.salary, 0);

        let negative = StaffChanges {
            salary: Some(-10),
            ..StaffChanges::default()
        };
        assert!(edit_staff(&db, member.id, negative).await.is_err());
        assert_eq!(get_staff_by_id(&db, member.id).await?.unwrap().salary, 0);

        let rename = StaffChanges {
            name: Some("Ada Lovelace".to_string()),
            role: Some("Analyst".to_string()),
            salary: None,
        };
        let updated = edit_staff(&db, member.id, rename).await?;
        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.role, "Analyst");

        Ok(())
    }

    #[tokio::test]
    async fn test_assign_department_and_profile() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_staff(&db, "Ada").await?;
        let department = create_test_department(&db, "Finance").await?;

        let profile = staff_profile(&db, member.id).await?;
        assert_eq!(profile.department, None);
        assert_eq!(profile.to_string(), "Ada - Role: Clerk");

        assign_department(&db, member.id, department.id).await?;
        let profile = staff_profile(&db, member.id).await?;
        assert_eq!(profile.department.as_deref(), Some("Finance"));
        assert_eq!(profile.to_string(), "Ada - Role: Clerk - In: Finance");

        let result = assign_department(&db, member.id, 999).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "Department",
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_staff_performance_metrics() -> Result<()> {
        let db = setup_test_db().await?;
        let store = create_test_store(&db, "High Street").await?;
        let member = create_custom_staff(&db, "Ada", 100, None).await?;
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        create_test_sale(&db, store.id, None, Some(member.id), 100.0, today).await?;
        create_test_sale(
            &db,
            store.id,
            None,
            Some(member.id),
            200.0,
            today.checked_sub_days(Days::new(30)).unwrap(),
        )
        .await?;
        // Outside the window
        create_test_sale(
            &db,
            store.id,
            None,
            Some(member.id),
            999.0,
            today.checked_sub_days(Days::new(31)).unwrap(),
        )
        .await?;

        let metrics = staff_performance_as_of(&db, member.id, 30, today).await?;
        assert_eq!(metrics.employee_name, "Ada");
        assert_eq!(metrics.period_total_sales, 300.0);
        assert_eq!(metrics.transaction_count, 2);
        assert_eq!(metrics.average_sale, 150.0);
        assert_eq!(metrics.sales_per_day, 10.0);
        assert_eq!(metrics.performance_index, 3.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_staff_performance_zero_salary_and_no_sales() -> Result<()> {
        let db = setup_test_db().await?;
        let store = create_test_store(&db, "High Street").await?;
        let volunteer = create_custom_staff(&db, "Sam", 0, None).await?;
        let idle = create_custom_staff(&db, "Lin", 500, None).await?;
        let today = Utc::now().date_naive();

        create_test_sale(&db, store.id, None, Some(volunteer.id), 45.0, today).await?;

        let metrics = staff_performance(&db, volunteer.id, 30).await?;
        assert_eq!(metrics.performance_index, 45.0);

        let metrics = staff_performance_default(&db, idle.id).await?;
        assert_eq!(metrics.period_total_sales, 0.0);
        assert_eq!(metrics.average_sale, 0.0);
        assert_eq!(metrics.transaction_count, 0);
        assert_eq!(metrics.performance_index, 0.0);

        let result = staff_performance(&db, idle.id, 0).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }
}
