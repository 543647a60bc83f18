//! Borrow ledger repository.
//!
//! The ledger is append-only: records are created by borrow and closed by
//! return, never deleted. Mutating methods take an explicit connection so the
//! lending engine can run them in the same transaction as the inventory
//! adjustment; history reads go straight to the pool and take no locks.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{map_insert_err, AppError, AppResult},
    models::borrow::BorrowRecord,
};

const SELECT_COLUMNS: &str = "id, user_id, book_id, borrowed_at, returned_at";

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // LEDGER (inside the lending engine's atomic scope)
    // =========================================================================

    /// Find the open record for a (user, book) pair, if any
    pub async fn find_open(
        &self,
        conn: &mut PgConnection,
        user_id: i32,
        book_id: i32,
    ) -> AppResult<Option<BorrowRecord>> {
        let record = sqlx::query_as::<_, BorrowRecord>(&format!(
            "SELECT {} FROM borrow_records WHERE user_id = $1 AND book_id = $2 AND returned_at IS NULL",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(record)
    }

    /// Append a new open record. The partial unique index on open records
    /// backs up the engine's existence check.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        user_id: i32,
        book_id: i32,
    ) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>(&format!(
            "INSERT INTO borrow_records (user_id, book_id, borrowed_at) VALUES ($1, $2, NOW()) RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(map_insert_err)
    }

    /// Close a record by stamping returned_at. Fails if the record does not
    /// exist or is already closed.
    pub async fn close(&self, conn: &mut PgConnection, record_id: i32) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>(&format!(
            "UPDATE borrow_records SET returned_at = NOW() WHERE id = $1 AND returned_at IS NULL RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(record_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Borrow record {} not found or already returned",
                record_id
            ))
        })
    }

    /// Count open records for a book (catalog copy-count changes)
    pub async fn count_open_for_book(
        &self,
        conn: &mut PgConnection,
        book_id: i32,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_records WHERE book_id = $1 AND returned_at IS NULL",
        )
        .bind(book_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(count)
    }

    // =========================================================================
    // HISTORY (lock-free reads)
    // =========================================================================

    /// Borrow history for a user, newest first
    pub async fn history_for_user(
        &self,
        user_id: i32,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(&format!(
            "SELECT {} FROM borrow_records WHERE user_id = $1 ORDER BY borrowed_at DESC LIMIT $2 OFFSET $3",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn count_for_user(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrow_records WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Borrow history for a book, newest first
    pub async fn history_for_book(
        &self,
        book_id: i32,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(&format!(
            "SELECT {} FROM borrow_records WHERE book_id = $1 ORDER BY borrowed_at DESC LIMIT $2 OFFSET $3",
            SELECT_COLUMNS
        ))
        .bind(book_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn count_for_book(&self, book_id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrow_records WHERE book_id = $1")
                .bind(book_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
