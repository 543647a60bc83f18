//! Repository layer for database operations

pub mod books;
pub mod borrows;
pub mod users;

use sqlx::{PgConnection, Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub borrows: borrows::BorrowsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Bound the wait for row locks taken later in the transaction. Applies to
/// the current transaction only (SET LOCAL); expiry surfaces as SQLSTATE
/// 55P03, which the lending paths map to a retryable Busy error.
pub async fn set_lock_timeout(conn: &mut PgConnection, timeout_ms: u32) -> AppResult<()> {
    sqlx::query(&format!("SET LOCAL lock_timeout = '{}ms'", timeout_ms))
        .execute(&mut *conn)
        .await?;
    Ok(())
}
