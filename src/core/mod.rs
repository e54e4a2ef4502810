//! Core business logic - framework-agnostic ERP operations.
//!
//! Every operation takes the database connection as its first argument, so callers
//! decide the lifecycle of the store and tests can hand in an in-memory database.

pub mod department;
pub mod facade;
pub mod product;
pub mod purchase_order;
pub mod sales;
pub mod staff;
pub mod stock;
pub mod store;
pub mod supplier;

use crate::errors::{Error, Result};
use chrono::{Days, NaiveDate};

/// Window used by staff and supplier performance metrics when the caller has no preference.
pub const DEFAULT_PERFORMANCE_WINDOW_DAYS: u32 = 30;

/// First day of a `window_days` window ending on `today` (inclusive).
pub(crate) fn window_start(today: NaiveDate, window_days: u32) -> Result<NaiveDate> {
    if window_days == 0 {
        return Err(Error::validation(
            "Performance window must be at least one day",
        ));
    }
    today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .ok_or_else(|| Error::validation(format!("Window of {window_days} days is out of range")))
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Rejects negative, NaN and infinite monetary amounts.
pub(crate) fn validate_amount(field: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::validation(format!(
            "{field} must be a non-negative number, got {amount}"
        )));
    }
    Ok(())
}
