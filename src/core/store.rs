//! Store business logic - Store records, contact validation and sales performance.

use crate::{
    core::required_text,
    entities::{ProductLocation, Sale, Staff, Store, product, product_location, sale, store},
    errors::{Error, Result},
};
use sea_orm::{FromQueryResult, JoinType, QueryOrder, QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

const MAX_CONTACT_NUMBER_LEN: usize = 15;

/// Input for [`create_store`]
#[derive(Debug, Clone)]
pub struct NewStore {
    /// Store name
    pub name: String,
    /// Location
    pub location: String,
    /// Contact number, digits with an optional leading `+`
    pub contact_number: String,
    /// Manager, if any
    pub manager_id: Option<i64>,
    /// Opening hours per day, 1 to 24
    pub operating_hours: i32,
}

/// Fields a caller may change on a store. Unset fields are left alone.
///
/// Deserializing rejects any key outside this list.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreChanges {
    /// New store name
    pub name: Option<String>,
    /// New location
    pub location: Option<String>,
    /// New contact number
    pub contact_number: Option<String>,
    /// New manager; use [`set_store_manager`] to clear it
    pub manager_id: Option<i64>,
    /// New opening hours, 1 to 24
    pub operating_hours: Option<i32>,
}

impl StoreChanges {
    const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.contact_number.is_none()
            && self.manager_id.is_none()
            && self.operating_hours.is_none()
    }
}

/// Sales totals for one store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorePerformance {
    /// Sum of all sales recorded at the store
    pub total_sales: f64,
    /// `total_sales / operating_hours`, 0 when the store has no opening hours
    pub sales_per_hour: f64,
}

/// Quantity of one product held at the store.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct StoreStock {
    /// Product identifier
    pub product_id: i64,
    /// Product name
    pub product_name: String,
    /// Units on hand
    pub quantity: i64,
}

/// Checks a phone number: an optional leading `+` followed by digits only.
pub fn validate_contact_number(contact_number: &str) -> Result<()> {
    let digits = contact_number.strip_prefix('+').unwrap_or(contact_number);
    if digits.is_empty()
        || !digits.chars().all(|c| c.is_ascii_digit())
        || contact_number.len() > MAX_CONTACT_NUMBER_LEN
    {
        return Err(Error::validation(format!(
            "Invalid contact number format: {contact_number:?}"
        )));
    }
    Ok(())
}

/// Checks that opening hours lie in 1..=24.
pub fn validate_operating_hours(hours: i32) -> Result<()> {
    if !(1..=24).contains(&hours) {
        return Err(Error::validation(format!(
            "Operating hours must be between 1 and 24, got {hours}"
        )));
    }
    Ok(())
}

/// Retrieves a store by ID.
pub async fn get_store_by_id(db: &DatabaseConnection, store_id: i64) -> Result<Option<store::Model>> {
    Store::find_by_id(store_id).one(db).await.map_err(Into::into)
}

pub(crate) async fn require_store<C>(db: &C, store_id: i64) -> Result<store::Model>
where
    C: ConnectionTrait,
{
    Store::find_by_id(store_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Store", store_id))
}

async fn require_manager<C>(db: &C, staff_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    Staff::find_by_id(staff_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Staff", staff_id))?;
    Ok(())
}

/// Checks that `staff_id` exists and manages no store other than `store_id`.
async fn ensure_manager_available<C>(db: &C, staff_id: i64, store_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    require_manager(db, staff_id).await?;

    let mut query = Store::find().filter(store::Column::ManagerId.eq(staff_id));
    if let Some(store_id) = store_id {
        query = query.filter(store::Column::Id.ne(store_id));
    }
    if let Some(other) = query.one(db).await? {
        return Err(Error::validation(format!(
            "Staff {staff_id} already manages store {}",
            other.name
        )));
    }
    Ok(())
}

/// Creates a store.
///
/// # Errors
/// Returns `Validation` for an empty name or location, a malformed contact number or
/// opening hours outside 1..=24, and `NotFound` for an unknown manager.
#[instrument(skip(db))]
pub async fn create_store<C>(db: &C, new: NewStore) -> Result<store::Model>
where
    C: ConnectionTrait,
{
    let name = required_text("Store name", &new.name)?;
    let location = required_text("Location", &new.location)?;
    validate_contact_number(&new.contact_number)?;
    validate_operating_hours(new.operating_hours)?;
    if let Some(manager_id) = new.manager_id {
        ensure_manager_available(db, manager_id, None).await?;
    }

    let created = store::ActiveModel {
        name: Set(name),
        location: Set(location),
        contact_number: Set(new.contact_number),
        manager_id: Set(new.manager_id),
        operating_hours: Set(new.operating_hours),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created store {} (ID: {})", created.name, created.id);
    Ok(created)
}

/// Applies `changes` to a store after validating every field that is set.
///
/// # Errors
/// Returns `Validation` when no field is set, any set field is invalid or the new manager
/// already manages another store; nothing is written in that case. Returns `NotFound`
/// for an unknown store or manager.
#[instrument(skip(db))]
pub async fn edit_store(
    db: &DatabaseConnection,
    store_id: i64,
    changes: StoreChanges,
) -> Result<store::Model> {
    if changes.is_empty() {
        return Err(Error::validation("No valid fields provided for update"));
    }
    let name = changes
        .name
        .as_deref()
        .map(|n| required_text("Store name", n))
        .transpose()?;
    let location = changes
        .location
        .as_deref()
        .map(|l| required_text("Location", l))
        .transpose()?;
    if let Some(contact_number) = &changes.contact_number {
        validate_contact_number(contact_number)?;
    }
    if let Some(hours) = changes.operating_hours {
        validate_operating_hours(hours)?;
    }

    let existing = require_store(db, store_id).await?;
    if let Some(manager_id) = changes.manager_id {
        ensure_manager_available(db, manager_id, Some(store_id)).await?;
    }

    let mut active: store::ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(location) = location {
        active.location = Set(location);
    }
    if let Some(contact_number) = changes.contact_number {
        active.contact_number = Set(contact_number);
    }
    if let Some(manager_id) = changes.manager_id {
        active.manager_id = Set(Some(manager_id));
    }
    if let Some(hours) = changes.operating_hours {
        active.operating_hours = Set(hours);
    }

    let updated = active.update(db).await?;
    info!("Updated store {}", store_id);
    Ok(updated)
}

/// Sets or clears the store manager.
///
/// # Errors
/// Returns `NotFound` for an unknown store or staff member and `Validation` when the
/// staff member already manages another store.
#[instrument(skip(db))]
pub async fn set_store_manager(
    db: &DatabaseConnection,
    store_id: i64,
    staff_id: Option<i64>,
) -> Result<store::Model> {
    let existing = require_store(db, store_id).await?;
    if let Some(staff_id) = staff_id {
        ensure_manager_available(db, staff_id, Some(store_id)).await?;
    }

    let mut active: store::ActiveModel = existing.into();
    active.manager_id = Set(staff_id);
    let updated = active.update(db).await?;
    info!("Store {} manager set to {:?}", store_id, staff_id);
    Ok(updated)
}

/// Total sales recorded at the store and the hourly rate over its opening hours.
pub async fn store_performance(db: &DatabaseConnection, store_id: i64) -> Result<StorePerformance> {
    let store = require_store(db, store_id).await?;

    let total_sales = Sale::find()
        .select_only()
        .column_as(sale::Column::TotalAmount.sum(), "total_sales")
        .filter(sale::Column::StoreId.eq(store_id))
        .into_tuple::<Option<f64>>()
        .one(db)
        .await
        .map_err(|e| Error::aggregation("store performance", e))?
        .flatten()
        .unwrap_or(0.0);

    let sales_per_hour = if store.operating_hours > 0 {
        total_sales / f64::from(store.operating_hours)
    } else {
        0.0
    };

    Ok(StorePerformance {
        total_sales,
        sales_per_hour,
    })
}

/// Lists the products stocked at the store, ordered by product name.
pub async fn store_products(db: &DatabaseConnection, store_id: i64) -> Result<Vec<StoreStock>> {
    ProductLocation::find()
        .select_only()
        .column(product_location::Column::ProductId)
        .column_as(product::Column::Name, "product_name")
        .column(product_location::Column::Quantity)
        .join(JoinType::InnerJoin, product_location::Relation::Product.def())
        .filter(product_location::Column::StoreId.eq(store_id))
        .order_by_asc(product::Column::Name)
        .into_model::<StoreStock>()
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::stock;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_validate_contact_number() {
        assert!(validate_contact_number("01131234567").is_ok());
        assert!(validate_contact_number("+441131234567").is_ok());
        assert!(validate_contact_number("").is_err());
        assert!(validate_contact_number("+").is_err());
        assert!(validate_contact_number("0113-123").is_err());
        assert!(validate_contact_number("12+34").is_err());
        assert!(validate_contact_number("+1234567890123456").is_err());
    }

    #[test]
    fn test_validate_operating_hours() {
        assert!(validate_operating_hours(1).is_ok());
        assert!(validate_operating_hours(24).is_ok());
        assert!(validate_operating_hours(0).is_err());
        assert!(validate_operating_hours(25).is_err());
        assert!(validate_operating_hours(-3).is_err());
    }

    #[test]
    fn test_store_changes_reject_unknown_fields() {
        let parsed: std::result::Result<StoreChanges, _> = toml::from_str("total_sales = 10");
        assert!(parsed.is_err());

        let parsed: StoreChanges = toml::from_str("operating_hours = 8").unwrap();
        assert_eq!(parsed.operating_hours, Some(8));
    }

    #[tokio::test]
    async fn test_edit_store_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = edit_store(&db, 1, StoreChanges::default()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let changes = StoreChanges {
            contact_number: Some("call me".to_string()),
            ..StoreChanges::default()
        };
        assert!(matches!(
            edit_store(&db, 1, changes).await.unwrap_err(),
            Error::Validation { .. }
        ));

        let changes = StoreChanges {
            operating_hours: Some(0),
            ..StoreChanges::default()
        };
        assert!(matches!(
            edit_store(&db, 1, changes).await.unwrap_err(),
            Error::Validation { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_store_applies_changes() -> Result<()> {
        let db = setup_test_db().await?;
        let store = create_test_store(&db, "High Street").await?;
        let manager = create_test_staff(&db, "Grace").await?;

        let updated = edit_store(
            &db,
            store.id,
            StoreChanges {
                contact_number: Some("+4411300000".to_string()),
                manager_id: Some(manager.id),
                operating_hours: Some(24),
                ..StoreChanges::default()
            },
        )
        .await?;
        assert_eq!(updated.contact_number, "+4411300000");
        assert_eq!(updated.manager_id, Some(manager.id));
        assert_eq!(updated.operating_hours, 24);
        assert_eq!(updated.name, "High Street");

        let result = edit_store(
            &db,
            store.id,
            StoreChanges {
                manager_id: Some(999),
                ..StoreChanges::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_store_performance() -> Result<()> {
        let db = setup_test_db().await?;
        let store = create_test_store(&db, "High Street").await?;
        let other = create_test_store(&db, "Retail Park").await?;
        let today = chrono::Utc::now().date_naive();

        let empty = store_performance(&db, store.id).await?;
        assert_eq!(empty.total_sales, 0.0);
        assert_eq!(empty.sales_per_hour, 0.0);

        create_test_sale(&db, store.id, None, None, 60.0, today).await?;
        create_test_sale(&db, store.id, None, None, 40.0, today).await?;
        create_test_sale(&db, other.id, None, None, 500.0, today).await?;

        let performance = store_performance(&db, store.id).await?;
        assert_eq!(performance.total_sales, 100.0);
        assert_eq!(performance.sales_per_hour, 10.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_store_products() -> Result<()> {
        let db = setup_test_db().await?;
        let store = create_test_store(&db, "High Street").await?;
        let toaster = create_test_product(&db, "Toaster").await?;
        let kettle = create_test_product(&db, "Kettle").await?;
        stock::stock_product(&db, toaster.id, store.id, 2).await?;
        stock::stock_product(&db, kettle.id, store.id, 9).await?;

        let products = store_products(&db, store.id).await?;
        assert_eq!(
            products,
            vec![
                StoreStock {
                    product_id: kettle.id,
                    product_name: "Kettle".to_string(),
                    quantity: 9,
                },
                StoreStock {
                    product_id: toaster.id,
                    product_name: "Toaster".to_string(),
                    quantity: 2,
                },
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_manager_of_another_store_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_store(&db, "High Street").await?;
        let second = create_test_store(&db, "Retail Park").await?;
        let manager = create_test_staff(&db, "Grace").await?;

        let changes = StoreChanges {
            manager_id: Some(manager.id),
            ..StoreChanges::default()
        };
        edit_store(&db, first.id, changes.clone()).await?;

        // Reassigning to the store already managed is fine
        assert_eq!(
            edit_store(&db, first.id, changes.clone()).await?.manager_id,
            Some(manager.id)
        );

        let result = edit_store(&db, second.id, changes).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        let result = set_store_manager(&db, second.id, Some(manager.id)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        let result = create_store(
            &db,
            NewStore {
                name: "Outlet".to_string(),
                location: "York".to_string(),
                contact_number: "01904000000".to_string(),
                manager_id: Some(manager.id),
                operating_hours: 8,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        assert_eq!(get_store_by_id(&db, second.id).await?.unwrap().manager_id, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_store_manager_clears_and_moves() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_store(&db, "High Street").await?;
        let second = create_test_store(&db, "Retail Park").await?;
        let manager = create_test_staff(&db, "Grace").await?;

        set_store_manager(&db, first.id, Some(manager.id)).await?;
        assert_eq!(set_store_manager(&db, first.id, None).await?.manager_id, None);
        assert_eq!(
            set_store_manager(&db, second.id, Some(manager.id))
                .await?
                .manager_id,
            Some(manager.id)
        );

        let result = set_store_manager(&db, 999, None).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }
}
