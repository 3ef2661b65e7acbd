//! # Football Store
//!
//! Persistence for the football statistics ingester: one record type per
//! table, a pluggable record store, and a repository that maps entities to
//! records on the way in and back on the way out.
//!
//! ## Architecture
//!
//! - **Schema**: static table declarations shared by every backend
//! - **Records**: storage-shaped `DictMapped` types with `Related` foreign keys
//! - **RecordStore**: backend trait with PostgreSQL and in-memory implementations
//! - **FootballRepository**: add / get-or-create / lookup operations
//!
//! ## Usage
//!
//! ```rust
//! use football_entities::Season;
//! use football_store::{FootballRepository, InMemoryRecordStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repository = FootballRepository::new(InMemoryRecordStore::new());
//!     let season = Season::new(2023, 2024)?;
//!
//!     let first = repository.get_or_create_season(&season).await?;
//!     let second = repository.get_or_create_season(&season).await?;
//!     assert_eq!(first.id(), second.id());
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod postgres;
pub mod records;
pub mod repository;
pub mod schema;

pub use backend::{InMemoryRecordStore, RecordStore};
pub use config::DatabaseConfig;
pub use error::{RepositoryError, Result, StoreError};
pub use postgres::PgRecordStore;
pub use records::{
    Address, CompetitionRecord, EntityRecord, FixtureRecord, PlayerInstanceRecord, PlayerRecord,
    Record, SeasonRecord, TeamInstanceRecord, TeamRecord, VenueRecord,
};
pub use repository::FootballRepository;
pub use schema::{Column, SqlType, TableSchema};
