//! SQLite implementation of the greeter `PrimaryStore`.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{now_datetime, CacheEntity, Greeter};
use crate::domain::ports::PrimaryStore;

#[derive(Clone)]
pub struct SqliteGreeterStore {
    pool: SqlitePool,
}

impl SqliteGreeterStore {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn affected(rows: u64, operation: &'static str, id: i32) -> DomainResult<u64> {
    if rows == 0 {
        return Err(DomainError::ZeroAffectedRows {
            operation,
            id: id.to_string(),
        });
    }
    Ok(rows)
}

#[async_trait]
impl PrimaryStore<Greeter> for SqliteGreeterStore {
    async fn create(&self, greeter: &Greeter) -> DomainResult<Greeter> {
        let now = now_datetime();
        let result = sqlx::query(
            r#"INSERT INTO tbl_greeter (name, view_num, status, create_time, create_datetime, update_datetime)
               VALUES (?, ?, ?, ?, ?, ?)"#
        )
        .bind(&greeter.name)
        .bind(greeter.view_num)
        .bind(greeter.status)
        .bind(greeter.create_time)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id = i32::try_from(result.last_insert_rowid())
            .map_err(|e| DomainError::DatabaseError(format!("Assigned id out of range: {e}")))?;

        Ok(Greeter {
            id,
            create_datetime: now.clone(),
            update_datetime: now,
            ..greeter.clone()
        })
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Greeter> {
        let row: Option<GreeterRow> = sqlx::query_as(
            "SELECT id, name, view_num, status, create_time, create_datetime, update_datetime
             FROM tbl_greeter WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Greeter::from).unwrap_or_default())
    }

    async fn find_ids_by_status(&self, status: i32) -> DomainResult<Vec<i32>> {
        let rows: Vec<(i32,)> = sqlx::query_as(
            "SELECT id FROM tbl_greeter WHERE status = ? ORDER BY id DESC"
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn count_by_status(&self, status: i32) -> DomainResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(id) FROM tbl_greeter WHERE status = ?")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update_status(&self, id: i32, status: i32) -> DomainResult<u64> {
        let result = sqlx::query("UPDATE tbl_greeter SET status = ?, update_datetime = ? WHERE id = ?")
            .bind(status)
            .bind(now_datetime())
            .bind(id)
            .execute(&self.pool)
            .await?;

        affected(result.rows_affected(), "greeter.update_status", id)
    }

    async fn update_counter(&self, id: i32, column: &str, delta: i32) -> DomainResult<u64> {
        // Column names cannot be bound, so only whitelisted names reach the query text.
        let Some(column) = Greeter::COUNTER_COLUMNS.iter().find(|c| **c == column) else {
            return Err(DomainError::ValidationFailed(format!("Unknown counter column: {column}")));
        };

        let sql = format!(
            "UPDATE tbl_greeter SET {column} = {column} + ?, update_datetime = ? WHERE id = ?"
        );
        let result = sqlx::query(&sql)
            .bind(delta)
            .bind(now_datetime())
            .bind(id)
            .execute(&self.pool)
            .await?;

        affected(result.rows_affected(), "greeter.update_counter", id)
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<u64> {
        let result = sqlx::query("DELETE FROM tbl_greeter WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        affected(result.rows_affected(), "greeter.delete_by_id", id)
    }
}

#[derive(sqlx::FromRow)]
struct GreeterRow {
    id: i32,
    name: String,
    view_num: i32,
    status: i32,
    create_time: i64,
    create_datetime: String,
    update_datetime: String,
}

impl From<GreeterRow> for Greeter {
    fn from(row: GreeterRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            view_num: row.view_num,
            status: row.status,
            create_time: row.create_time,
            create_datetime: row.create_datetime,
            update_datetime: row.update_datetime,
        }
    }
}
