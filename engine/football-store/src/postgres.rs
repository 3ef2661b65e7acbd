//! PostgreSQL record store backed by sqlx

use crate::backend::{check_columns, check_not_null, RecordStore};
use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::schema::{Column, SqlType, TableSchema, ID_COLUMN};
use chrono::NaiveDate;
use football_entities::Values;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::QueryScalar;
use sqlx::{PgPool, Postgres};
use tracing::{debug, error, info};

/// Record store writing to PostgreSQL
///
/// Every operation runs in its own transaction. Dropping an uncommitted
/// transaction rolls it back.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Open a connection pool, applying migrations when configured
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;
        info!("Connected to database");

        let store = Self { pool };
        if config.run_migrations {
            store.migrate().await?;
        }
        Ok(store)
    }

    /// Apply the embedded migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Database pool closed");
    }
}

fn invalid(table: &'static TableSchema, column: &Column, value: &Value) -> StoreError {
    StoreError::InvalidColumnValue { table: table.name, column: column.name, value: value.to_string() }
}

fn map_error(table: &'static TableSchema, e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::UniqueViolation { table: table.name.to_string() }
        }
        _ => StoreError::Database(e),
    }
}

/// Error of an aborted operation; a failed rollback is logged, never returned
fn aborted(
    table: &'static TableSchema,
    original: StoreError,
    rollback: Result<(), sqlx::Error>,
) -> StoreError {
    if let Err(e) = rollback {
        error!("Rollback on {} failed: {}", table.name, e);
    }
    original
}

/// A value converted to the Rust type matching its column
#[derive(Debug)]
enum Bound {
    Integer(Option<i64>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
}

impl Bound {
    fn new(table: &'static TableSchema, column: &Column, value: &Value) -> Result<Self, StoreError> {
        if value.is_null() {
            return Ok(match column.sql_type {
                SqlType::Integer => Bound::Integer(None),
                SqlType::Text => Bound::Text(None),
                SqlType::Date => Bound::Date(None),
            });
        }

        match column.sql_type {
            SqlType::Integer => value
                .as_i64()
                .map(|v| Bound::Integer(Some(v)))
                .ok_or_else(|| invalid(table, column, value)),
            SqlType::Text => value
                .as_str()
                .map(|v| Bound::Text(Some(v.to_string())))
                .ok_or_else(|| invalid(table, column, value)),
            SqlType::Date => value
                .as_str()
                .and_then(|v| v.parse::<NaiveDate>().ok())
                .map(|v| Bound::Date(Some(v)))
                .ok_or_else(|| invalid(table, column, value)),
        }
    }

    fn bind<'q, O>(
        self,
        query: QueryScalar<'q, Postgres, O, PgArguments>,
    ) -> QueryScalar<'q, Postgres, O, PgArguments> {
        match self {
            Bound::Integer(v) => query.bind(v),
            Bound::Text(v) => query.bind(v),
            Bound::Date(v) => query.bind(v),
        }
    }
}

/// `WHERE` clause and the values to bind for `criteria`
///
/// Null criteria compare with `IS NULL`; other values become placeholders.
fn where_clause(
    table: &'static TableSchema,
    criteria: &Values,
) -> Result<(String, Vec<Bound>), StoreError> {
    let mut conditions = Vec::with_capacity(criteria.len());
    let mut bound = Vec::with_capacity(criteria.len());

    for (key, value) in criteria {
        let column = table
            .column(key)
            .ok_or_else(|| StoreError::UnknownColumn { table: table.name, column: key.clone() })?;
        if value.is_null() {
            conditions.push(format!("t.{} IS NULL", column.name));
        } else {
            bound.push(Bound::new(table, column, value)?);
            conditions.push(format!("t.{} = ${}", column.name, bound.len()));
        }
    }

    if conditions.is_empty() {
        Ok((String::new(), bound))
    } else {
        Ok((format!(" WHERE {}", conditions.join(" AND ")), bound))
    }
}

#[async_trait::async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, table: &'static TableSchema, row: Values) -> Result<i64, StoreError> {
        check_columns(table, row.keys())?;
        check_not_null(table, &row)?;

        let mut names = Vec::new();
        let mut bound = Vec::new();
        for column in table.insert_columns() {
            let value = row.get(column.name).unwrap_or(&Value::Null);
            bound.push(Bound::new(table, column, value)?);
            names.push(column.name);
        }

        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("${i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table.name,
            names.join(", "),
            placeholders.join(", "),
            ID_COLUMN
        );

        let mut query: QueryScalar<'_, Postgres, i64, PgArguments> = sqlx::query_scalar(&sql);
        for value in bound {
            query = value.bind(query);
        }

        let mut tx = self.pool.begin().await?;
        let id = match query.fetch_one(&mut *tx).await {
            Ok(id) => id,
            Err(e) => {
                let e = map_error(table, e);
                error!("Insert into {} failed, rolling back: {}", table.name, e);
                return Err(aborted(table, e, tx.rollback().await));
            }
        };
        tx.commit().await?;

        debug!("Inserted row {} into {}", id, table.name);
        Ok(id)
    }

    async fn find_one(
        &self,
        table: &'static TableSchema,
        criteria: &Values,
    ) -> Result<Option<Values>, StoreError> {
        let (clause, bound) = where_clause(table, criteria)?;
        let sql = format!("SELECT to_jsonb(t) FROM {} t{} ORDER BY t.{} LIMIT 1", table.name, clause, ID_COLUMN);

        let mut query: QueryScalar<'_, Postgres, Value, PgArguments> = sqlx::query_scalar(&sql);
        for value in bound {
            query = value.bind(query);
        }

        let mut tx = self.pool.begin().await?;
        let row = match query.fetch_optional(&mut *tx).await {
            Ok(row) => row,
            Err(e) => {
                error!("Lookup in {} failed, rolling back: {}", table.name, e);
                return Err(aborted(table, map_error(table, e), tx.rollback().await));
            }
        };
        tx.commit().await?;

        Ok(row.and_then(into_values))
    }

    async fn find_all(&self, table: &'static TableSchema) -> Result<Vec<Values>, StoreError> {
        let sql = format!("SELECT to_jsonb(t) FROM {} t ORDER BY t.{}", table.name, ID_COLUMN);
        let rows: Vec<Value> = sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_error(table, e))?;
        Ok(rows.into_iter().filter_map(into_values).collect())
    }
}

fn into_values(value: Value) -> Option<Values> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{COMPETITION_TABLE, FIXTURE_TABLE, SEASON_TABLE};
    use serde_json::json;

    fn criteria(value: Value) -> Values {
        into_values(value).unwrap()
    }

    #[test]
    fn test_where_clause_binds_values_and_null_checks() {
        let (clause, bound) =
            where_clause(&COMPETITION_TABLE, &criteria(json!({"country": null, "name": "la_liga"}))).unwrap();
        assert_eq!(clause, " WHERE t.country IS NULL AND t.name = $1");
        assert_eq!(bound.len(), 1);
    }

    #[test]
    fn test_failed_rollback_keeps_original_error() {
        let original = StoreError::UniqueViolation { table: "season".to_string() };
        let error = aborted(&SEASON_TABLE, original, Err(sqlx::Error::PoolClosed));
        assert!(matches!(error, StoreError::UniqueViolation { ref table } if table == "season"));

        let error = aborted(&SEASON_TABLE, StoreError::NullValue { table: "season", column: "to_year" }, Ok(()));
        assert!(matches!(error, StoreError::NullValue { column: "to_year", .. }));
    }

    #[test]
    fn test_where_clause_empty_criteria() {
        let (clause, bound) = where_clause(&SEASON_TABLE, &Values::new()).unwrap();
        assert!(clause.is_empty());
        assert!(bound.is_empty());
    }

    #[test]
    fn test_where_clause_rejects_unknown_column() {
        let error = where_clause(&SEASON_TABLE, &criteria(json!({"label": "x"}))).unwrap_err();
        assert!(matches!(error, StoreError::UnknownColumn { .. }));
    }

    #[test]
    fn test_bound_values_follow_column_types() {
        let date = FIXTURE_TABLE.column("date").unwrap();
        assert!(matches!(Bound::new(&FIXTURE_TABLE, date, &json!("2023-08-12")), Ok(Bound::Date(Some(_)))));
        assert!(Bound::new(&FIXTURE_TABLE, date, &json!("12/08/2023")).is_err());

        let week = FIXTURE_TABLE.column("game_week").unwrap();
        assert!(matches!(Bound::new(&FIXTURE_TABLE, week, &json!(3)), Ok(Bound::Integer(Some(3)))));
        assert!(Bound::new(&FIXTURE_TABLE, week, &json!("three")).is_err());
        assert!(matches!(Bound::new(&FIXTURE_TABLE, week, &Value::Null), Ok(Bound::Integer(None))));
    }
}
