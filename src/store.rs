//! SQLite-backed record store for canonical phone numbers.
//!
//! Owns all SQL. The schema is ensured on connect so a freshly provisioned
//! database works without a separate migration step. Conflict policy:
//! id-keyed upsert with a global `UNIQUE` constraint on `phone_number`;
//! a canonical number already held by another row is rejected, never merged.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate phone number: {0}")]
    DuplicateNumber(String),
    #[error("row carries an unrepresentable timestamp: {0}")]
    InvalidTimestamp(i64),
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneRecord {
    pub id: i64,
    pub phone_number: String,
    pub country_info: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CountryCount {
    pub country_info: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhoneStats {
    pub total: i64,
    pub countries: Vec<CountryCount>,
}

/// Timestamps are stored as integer microseconds since the Unix epoch so
/// `ORDER BY updated_at` is exact; the API layer serializes them as RFC 3339.
#[derive(Debug, FromRow)]
struct RawPhoneRow {
    id: i64,
    phone_number: String,
    country_info: String,
    created_at: i64,
    updated_at: i64,
}

impl RawPhoneRow {
    fn into_record(self) -> Result<PhoneRecord> {
        Ok(PhoneRecord {
            id: self.id,
            phone_number: self.phone_number,
            country_info: self.country_info,
            created_at: from_micros(self.created_at)?,
            updated_at: from_micros(self.updated_at)?,
        })
    }
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros).ok_or(StoreError::InvalidTimestamp(micros))
}

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS phones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phone_number TEXT NOT NULL UNIQUE,
    country_info TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)";

#[derive(Clone)]
pub struct PhoneStore {
    pool: SqlitePool,
}

impl PhoneStore {
    /// Opens (creating if missing) the database at `url` and ensures the
    /// schema exists before first use.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Private in-memory database; a single pooled connection keeps it alive.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert-or-update. With an explicit id, a conflict on that id updates
    /// the row in place (refreshing `updated_at`, keeping `created_at`);
    /// without one the row id is auto-generated. A `phone_number` collision
    /// with a different row surfaces as [`StoreError::DuplicateNumber`].
    pub async fn upsert(
        &self,
        id: Option<i64>,
        phone_number: &str,
        country_info: &str,
        now: DateTime<Utc>,
    ) -> Result<PhoneRecord> {
        let micros = now.timestamp_micros();
        let query = match id {
            Some(id) => sqlx::query_as::<_, RawPhoneRow>(
                "INSERT INTO phones (id, phone_number, country_info, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?) \
                 ON CONFLICT(id) DO UPDATE SET \
                     phone_number = excluded.phone_number, \
                     country_info = excluded.country_info, \
                     updated_at = excluded.updated_at \
                 RETURNING id, phone_number, country_info, created_at, updated_at",
            )
            .bind(id)
            .bind(phone_number)
            .bind(country_info)
            .bind(micros)
            .bind(micros),
            None => sqlx::query_as::<_, RawPhoneRow>(
                "INSERT INTO phones (phone_number, country_info, created_at, updated_at) \
                 VALUES (?, ?, ?, ?) \
                 RETURNING id, phone_number, country_info, created_at, updated_at",
            )
            .bind(phone_number)
            .bind(country_info)
            .bind(micros)
            .bind(micros),
        };

        let row = query
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_unique(err, phone_number))?;
        row.into_record()
    }

    pub async fn get(&self, id: i64) -> Result<Option<PhoneRecord>> {
        let row = sqlx::query_as::<_, RawPhoneRow>(
            "SELECT id, phone_number, country_info, created_at, updated_at \
             FROM phones WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(RawPhoneRow::into_record).transpose()
    }

    /// Page of records, newest write first. `search` matches a substring of
    /// either the number or the country code; absent `limit` means all rows
    /// (SQLite treats a negative limit as unbounded).
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<PhoneRecord>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, phone_number, country_info, created_at, updated_at FROM phones",
        );
        push_search(&mut builder, search);
        builder.push(" ORDER BY updated_at DESC LIMIT ");
        builder.push_bind(limit.filter(|l| *l >= 0).unwrap_or(-1));
        builder.push(" OFFSET ");
        builder.push_bind(offset.filter(|o| *o >= 0).unwrap_or(0));

        let rows = builder
            .build_query_as::<RawPhoneRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(RawPhoneRow::into_record).collect()
    }

    /// Total matching `search`, independent of any page bounds.
    pub async fn count(&self, search: Option<&str>) -> Result<i64> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM phones");
        push_search(&mut builder, search);
        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn update(
        &self,
        id: i64,
        phone_number: &str,
        country_info: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PhoneRecord>> {
        let row = sqlx::query_as::<_, RawPhoneRow>(
            "UPDATE phones SET phone_number = ?, country_info = ?, updated_at = ? \
             WHERE id = ? \
             RETURNING id, phone_number, country_info, created_at, updated_at",
        )
        .bind(phone_number)
        .bind(country_info)
        .bind(now.timestamp_micros())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| map_unique(err, phone_number))?;
        row.map(RawPhoneRow::into_record).transpose()
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM phones WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM phones").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Total record count plus per-country counts, largest group first.
    pub async fn stats(&self) -> Result<PhoneStats> {
        let total = self.count(None).await?;
        let countries = sqlx::query_as::<_, CountryCount>(
            "SELECT country_info, COUNT(*) AS count FROM phones \
             GROUP BY country_info \
             ORDER BY count DESC, country_info ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(PhoneStats { total, countries })
    }
}

fn push_search(builder: &mut QueryBuilder<'_, Sqlite>, search: Option<&str>) {
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        let like = format!("%{term}%");
        builder.push(" WHERE (phone_number LIKE ");
        builder.push_bind(like.clone());
        builder.push(" OR country_info LIKE ");
        builder.push_bind(like);
        builder.push(")");
    }
}

fn map_unique(err: sqlx::Error, phone_number: &str) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return StoreError::DuplicateNumber(phone_number.to_string());
        }
    }
    StoreError::Sql(err)
}
