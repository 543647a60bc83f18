//! Books repository: catalog CRUD/search plus the inventory store.
//!
//! The inventory methods take an explicit connection so they compose inside
//! the lending engine's transaction; available_copies is never written
//! outside such a scope.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{map_adjust_err, map_lock_err, AppError, AppResult},
    models::book::{Book, BookInventory, BookQuery, CreateBook, UpdateBook},
};

const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // CATALOG
    // =========================================================================

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check whether a (title, author) pair already exists, case-insensitively
    pub async fn title_author_exists(
        &self,
        title: &str,
        author: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM books WHERE LOWER(title) = LOWER($1) AND LOWER(author) = LOWER($2) AND id != $3)",
            )
            .bind(title)
            .bind(author)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM books WHERE LOWER(title) = LOWER($1) AND LOWER(author) = LOWER($2))",
            )
            .bind(title)
            .bind(author)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// Create a new book; the initial copy count seeds both totals
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, genre, description, published_date, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre)
        .bind(&book.description)
        .bind(book.published_date)
        .bind(book.copies)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Apply a partial update inside the caller's transaction. available_copies
    /// is only touched when the caller recomputed it against the open-record
    /// count under the book row lock.
    pub async fn apply_update(
        &self,
        conn: &mut PgConnection,
        id: i32,
        update: &UpdateBook,
        new_available: Option<i32>,
    ) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                genre = COALESCE($4, genre),
                description = COALESCE($5, description),
                published_date = COALESCE($6, published_date),
                total_copies = COALESCE($7, total_copies),
                available_copies = COALESCE($8, available_copies),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.author)
        .bind(update.genre)
        .bind(&update.description)
        .bind(update.published_date)
        .bind(update.total_copies)
        .bind(new_available)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_adjust_err)?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book. Refused while borrow records reference it, since the
    /// ledger is append-only.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db) = e {
                    if db.code().as_deref() == Some(PG_FOREIGN_KEY_VIOLATION) {
                        return AppError::Conflict(
                            "Book has borrow history and cannot be deleted".to_string(),
                        );
                    }
                }
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Search books with pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(20);
        if page < 1 || per_page < 1 {
            return Err(AppError::InvalidArgument(
                "page and per_page must be positive integers".to_string(),
            ));
        }
        let offset = (page - 1) * per_page;

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref title) = query.title {
            params.push(format!("%{}%", title.to_lowercase()));
            conditions.push(format!("LOWER(title) LIKE ${}", params.len()));
        }
        if let Some(ref author) = query.author {
            params.push(format!("%{}%", author.to_lowercase()));
            conditions.push(format!("LOWER(author) LIKE ${}", params.len()));
        }
        if let Some(genre) = query.genre {
            params.push(genre.as_str().to_string());
            conditions.push(format!("genre = ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };

        let count_sql = format!("SELECT COUNT(*) FROM books WHERE {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for p in &params {
            count_query = count_query.bind(p);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let rows_sql = format!(
            "SELECT * FROM books WHERE {} ORDER BY LOWER(title), LOWER(author) LIMIT ${} OFFSET ${}",
            where_clause,
            params.len() + 1,
            params.len() + 2,
        );
        let mut rows_query = sqlx::query_as::<_, Book>(&rows_sql);
        for p in &params {
            rows_query = rows_query.bind(p);
        }
        let books = rows_query
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    // =========================================================================
    // INVENTORY STORE
    // =========================================================================

    /// Read the inventory counts without locking (reporting and tests)
    pub async fn get_inventory(&self, book_id: i32) -> AppResult<BookInventory> {
        sqlx::query_as::<_, BookInventory>(
            "SELECT id, total_copies, available_copies FROM books WHERE id = $1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
    }

    /// Acquire the book row lock and read the inventory counts. Serializes
    /// all lending operations on this book; the caller's lock_timeout bounds
    /// the wait and expiry maps to Busy.
    pub async fn lock_inventory(
        &self,
        conn: &mut PgConnection,
        book_id: i32,
    ) -> AppResult<Option<BookInventory>> {
        sqlx::query_as::<_, BookInventory>(
            "SELECT id, total_copies, available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_lock_err)
    }

    /// Adjust available_copies by delta under the caller's lock. The result
    /// must stay within [0, total_copies]; anything else is a data-integrity
    /// failure that aborts the transaction.
    pub async fn adjust_available(
        &self,
        conn: &mut PgConnection,
        book_id: i32,
        delta: i32,
    ) -> AppResult<BookInventory> {
        let inventory = sqlx::query_as::<_, BookInventory>(
            r#"
            UPDATE books
            SET available_copies = available_copies + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, total_copies, available_copies
            "#,
        )
        .bind(book_id)
        .bind(delta)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_adjust_err)?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if inventory.available_copies < 0 || inventory.available_copies > inventory.total_copies {
            tracing::error!(
                book_id,
                available = inventory.available_copies,
                total = inventory.total_copies,
                "inventory adjustment left counts out of bounds"
            );
            return Err(AppError::InvalidState(format!(
                "available_copies {} outside [0, {}] for book {}",
                inventory.available_copies, inventory.total_copies, book_id
            )));
        }

        Ok(inventory)
    }
}
