//! SQLite implementations of the core repository traits

mod token_repository_impl;
mod user_repository_impl;

pub use token_repository_impl::SqliteTokenRepository;
pub use user_repository_impl::SqliteUserRepository;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use pb_core::errors::DomainError;
use pb_shared::utils::timestamp::parse_db_timestamp;

/// Wrap a query failure, keeping the operation in the message
pub(crate) fn query_error(operation: &str, error: sqlx::Error) -> DomainError {
    tracing::error!("Failed to {}: {}", operation, error);
    DomainError::internal(format!("Failed to {}: {}", operation, error))
}

pub(crate) fn get_column<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| DomainError::internal(format!("Failed to get {}: {}", column, e)))
}

pub(crate) fn get_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, DomainError> {
    let text: String = get_column(row, column)?;
    parse_db_timestamp(&text)
        .map_err(|e| DomainError::internal(format!("Invalid {} '{}': {}", column, text, e)))
}

pub(crate) fn get_optional_timestamp(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, DomainError> {
    let text: Option<String> = get_column(row, column)?;
    text.map(|text| {
        parse_db_timestamp(&text)
            .map_err(|e| DomainError::internal(format!("Invalid {} '{}': {}", column, text, e)))
    })
    .transpose()
}
