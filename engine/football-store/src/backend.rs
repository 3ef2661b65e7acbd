//! Record store trait and the in-memory implementation

use crate::error::StoreError;
use crate::schema::{TableSchema, ID_COLUMN};
use football_entities::Values;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Abstract trait for record storage backends
///
/// Rows are generic mappings keyed by column name. Rows handed back by
/// `find_one` / `find_all` always carry the `id` column.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one row and return its assigned id
    async fn insert(&self, table: &'static TableSchema, row: Values) -> Result<i64, StoreError>;

    /// First row whose columns equal every entry of `criteria`
    async fn find_one(
        &self,
        table: &'static TableSchema,
        criteria: &Values,
    ) -> Result<Option<Values>, StoreError>;

    /// Every row of the table, in id order
    async fn find_all(&self, table: &'static TableSchema) -> Result<Vec<Values>, StoreError>;
}

#[async_trait::async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    async fn insert(&self, table: &'static TableSchema, row: Values) -> Result<i64, StoreError> {
        (**self).insert(table, row).await
    }

    async fn find_one(
        &self,
        table: &'static TableSchema,
        criteria: &Values,
    ) -> Result<Option<Values>, StoreError> {
        (**self).find_one(table, criteria).await
    }

    async fn find_all(&self, table: &'static TableSchema) -> Result<Vec<Values>, StoreError> {
        (**self).find_all(table).await
    }
}

/// Reject keys the table does not declare
pub(crate) fn check_columns<'a>(
    table: &'static TableSchema,
    keys: impl IntoIterator<Item = &'a String>,
) -> Result<(), StoreError> {
    for key in keys {
        if table.column(key).is_none() {
            return Err(StoreError::UnknownColumn { table: table.name, column: key.clone() });
        }
    }
    Ok(())
}

/// Reject rows leaving a non-nullable column null or absent
pub(crate) fn check_not_null(table: &'static TableSchema, row: &Values) -> Result<(), StoreError> {
    match table.insert_columns().find(|column| !column.nullable && column_value(row, column.name).is_null()) {
        Some(column) => Err(StoreError::NullValue { table: table.name, column: column.name }),
        None => Ok(()),
    }
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Values>,
    next_id: i64,
}

fn column_value<'a>(row: &'a Values, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

fn row_matches(row: &Values, criteria: &Values) -> bool {
    criteria.iter().all(|(column, expected)| column_value(row, column) == expected)
}

/// In-memory record store (for testing)
///
/// Ids start at 1 per table. Each table's declared unique key is enforced.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<Mutex<HashMap<&'static str, Table>>>,
}

impl InMemoryRecordStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows stored in `table`
    pub async fn row_count(&self, table: &'static TableSchema) -> usize {
        self.tables.lock().await.get(table.name).map_or(0, |t| t.rows.len())
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, table: &'static TableSchema, row: Values) -> Result<i64, StoreError> {
        check_columns(table, row.keys())?;
        check_not_null(table, &row)?;

        let mut tables = self.tables.lock().await;
        let stored = tables.entry(table.name).or_default();

        if !table.unique_key.is_empty() {
            let duplicate = stored.rows.iter().any(|existing| {
                table
                    .unique_key
                    .iter()
                    .all(|column| column_value(existing, column) == column_value(&row, column))
            });
            if duplicate {
                return Err(StoreError::UniqueViolation { table: table.name.to_string() });
            }
        }

        stored.next_id += 1;
        let id = stored.next_id;

        let mut row = row;
        row.insert(ID_COLUMN.to_string(), Value::from(id));
        stored.rows.push(row);

        tracing::debug!("Inserted row {} into in-memory table {}", id, table.name);
        Ok(id)
    }

    async fn find_one(
        &self,
        table: &'static TableSchema,
        criteria: &Values,
    ) -> Result<Option<Values>, StoreError> {
        check_columns(table, criteria.keys())?;

        let tables = self.tables.lock().await;
        Ok(tables
            .get(table.name)
            .and_then(|stored| stored.rows.iter().find(|row| row_matches(row, criteria)))
            .cloned())
    }

    async fn find_all(&self, table: &'static TableSchema) -> Result<Vec<Values>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.get(table.name).map(|stored| stored.rows.clone()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{COMPETITION_TABLE, SEASON_TABLE, TEAM_INSTANCE_TABLE, TEAM_TABLE};
    use serde_json::json;

    fn row(value: Value) -> Values {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryRecordStore::new();
        let first = store.insert(&SEASON_TABLE, row(json!({"from_year": 2020, "to_year": 2021}))).await.unwrap();
        let second = store.insert(&SEASON_TABLE, row(json!({"from_year": 2021, "to_year": 2022}))).await.unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(store.row_count(&SEASON_TABLE).await, 2);
    }

    #[tokio::test]
    async fn test_unique_key_enforced() {
        let store = InMemoryRecordStore::new();
        store.insert(&SEASON_TABLE, row(json!({"from_year": 2020, "to_year": 2021}))).await.unwrap();

        let error = store
            .insert(&SEASON_TABLE, row(json!({"from_year": 2020, "to_year": 2021})))
            .await
            .unwrap_err();
        assert!(matches!(error, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_composite_unique_key_allows_partial_overlap() {
        let store = InMemoryRecordStore::new();
        let team = |country: &str| {
            row(json!({
                "name": "rangers",
                "gender": "male",
                "country": country,
                "team_type": "club",
                "year_founded": 1872,
            }))
        };

        store.insert(&TEAM_TABLE, team("scotland")).await.unwrap();
        store.insert(&TEAM_TABLE, team("england")).await.unwrap();
        tokio_test::assert_err!(store.insert(&TEAM_TABLE, team("scotland")).await);
    }

    #[tokio::test]
    async fn test_find_one_and_find_all() {
        let store = InMemoryRecordStore::new();
        store.insert(&SEASON_TABLE, row(json!({"from_year": 2020, "to_year": 2021}))).await.unwrap();
        store.insert(&SEASON_TABLE, row(json!({"from_year": 2021, "to_year": 2022}))).await.unwrap();

        let found = store.find_one(&SEASON_TABLE, &row(json!({"from_year": 2021}))).await.unwrap().unwrap();
        assert_eq!(found.get("id"), Some(&json!(2)));

        let missing = store.find_one(&SEASON_TABLE, &row(json!({"from_year": 2030}))).await.unwrap();
        assert!(missing.is_none());

        let all = store.find_all(&SEASON_TABLE).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].get("from_year"), Some(&json!(2020)));
    }

    #[tokio::test]
    async fn test_null_in_required_column_rejected() {
        let store = InMemoryRecordStore::new();

        let error = store
            .insert(&COMPETITION_TABLE, row(json!({"name": null, "alt_name": null, "gender": null})))
            .await
            .unwrap_err();
        assert!(matches!(error, StoreError::NullValue { table: "competition", column: "name" }));

        let error = store.insert(&SEASON_TABLE, row(json!({"from_year": 2020}))).await.unwrap_err();
        assert!(matches!(error, StoreError::NullValue { table: "season", column: "to_year" }));
        assert_eq!(store.row_count(&SEASON_TABLE).await, 0);
    }

    #[tokio::test]
    async fn test_null_in_nullable_column_accepted() {
        let store = InMemoryRecordStore::new();
        let id = store.insert(&TEAM_INSTANCE_TABLE, row(json!({"team_id": 1, "fixture_id": null}))).await.unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn test_unknown_column_rejected() {
        let store = InMemoryRecordStore::new();
        let error = store.find_one(&SEASON_TABLE, &row(json!({"label": "2020-2021"}))).await.unwrap_err();
        assert!(matches!(error, StoreError::UnknownColumn { table: "season", .. }));
    }
}
