//! Catalog management service

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::{self, Repository},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    lending_config: LendingConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, lending_config: LendingConfig) -> Self {
        Self {
            repository,
            lending_config,
        }
    }

    /// Add a book to the catalog. Duplicate (title, author) pairs are
    /// rejected, compared case-insensitively.
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        if self
            .repository
            .books
            .title_author_exists(&book.title, &book.author, None)
            .await?
        {
            return Err(AppError::Conflict(
                "A book with the same title and author already exists".to_string(),
            ));
        }

        let created = self.repository.books.create(&book).await?;
        tracing::info!(book_id = created.id, title = %created.title, "book added to catalog");
        Ok(created)
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    /// Update book metadata and optionally the copy count.
    ///
    /// A total_copies change runs under the book row lock so the recomputed
    /// available_copies (new total minus open borrows) cannot race the
    /// lending engine. Shrinking below the open-borrow count is refused.
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        let current = self.repository.books.get_by_id(id).await?;

        let title = update.title.as_deref().unwrap_or(&current.title);
        let author = update.author.as_deref().unwrap_or(&current.author);
        if self
            .repository
            .books
            .title_author_exists(title, author, Some(id))
            .await?
        {
            return Err(AppError::Conflict(
                "A book with the same title and author already exists".to_string(),
            ));
        }

        let mut tx = self.repository.pool.begin().await?;
        repository::set_lock_timeout(&mut tx, self.lending_config.lock_timeout_ms).await?;

        self.repository
            .books
            .lock_inventory(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let new_available = match update.total_copies {
            Some(new_total) => {
                let open = self
                    .repository
                    .borrows
                    .count_open_for_book(&mut tx, id)
                    .await?;
                if i64::from(new_total) < open {
                    return Err(AppError::Conflict(format!(
                        "Cannot reduce copies below the {} currently borrowed",
                        open
                    )));
                }
                Some(new_total - open as i32)
            }
            None => None,
        };

        let updated = self
            .repository
            .books
            .apply_update(&mut tx, id, &update, new_available)
            .await?;

        tx.commit().await?;

        tracing::info!(book_id = id, "book updated");
        Ok(updated)
    }

    /// Remove a book. Refused while any borrow record references it.
    pub async fn delete_book(&self, id: i32) -> AppResult<Book> {
        let book = self.repository.books.get_by_id(id).await?;
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, title = %book.title, "book deleted from catalog");
        Ok(book)
    }
}
