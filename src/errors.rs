//! Unified error type for the ERP data layer.

use sea_orm::DbErr;
use thiserror::Error;

/// Every failure a domain operation can surface to its caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected by a validation rule (negative budget, bad contact number, ...)
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"Product"`
        entity: &'static str,
        /// Identifier that failed to resolve
        id: i64,
    },

    /// A stock movement would drive a location below zero
    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock {
        /// Quantity currently held
        available: i64,
        /// Quantity the operation tried to remove
        requested: i64,
    },

    /// A metric could not be computed
    #[error("Error calculating {metric}: {source}")]
    Aggregation {
        /// Metric being computed, e.g. `"staff performance"`
        metric: &'static str,
        /// Underlying storage failure
        #[source]
        source: DbErr,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Storage layer failure
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Wraps a storage error raised while computing `metric`.
    #[must_use]
    pub const fn aggregation(metric: &'static str, source: DbErr) -> Self {
        Self::Aggregation { metric, source }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
