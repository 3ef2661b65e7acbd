//! Error types for the football store

use football_entities::MapperError;
use thiserror::Error;

/// Result type alias for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Errors raised by a record store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unique constraint violated on table {table}")]
    UniqueViolation { table: String },

    #[error("Table {table} has no column '{column}'")]
    UnknownColumn { table: &'static str, column: String },

    #[error("Column {table}.{column} cannot be null")]
    NullValue { table: &'static str, column: &'static str },

    #[error("Column {table}.{column} cannot store {value}")]
    InvalidColumnValue { table: &'static str, column: &'static str, value: String },
}

/// Errors raised by the football repository
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Competition not found, name: {name}")]
    CompetitionNotFound { name: String },

    #[error("{type_name} has no field '{field}' to match on")]
    UnknownField { type_name: &'static str, field: String },

    #[error("{type_name}: relation '{field}' must be persisted before its owner")]
    UnresolvedRelation { type_name: &'static str, field: &'static str },

    #[error("Mapper error: {0}")]
    Mapper(#[from] MapperError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RepositoryError {
    /// Whether this is a lookup miss the caller may recover from
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::CompetitionNotFound { .. })
    }
}
