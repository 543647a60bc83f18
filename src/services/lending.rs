//! Lending engine: the borrow/return state machine.
//!
//! Per (user, book) pair the lifecycle is Available -> Borrowed -> Available.
//! Every transition runs in one transaction that first takes the book row
//! lock, so the open-record check, the stock check, the ledger write and the
//! inventory adjustment are a single serialized unit. Concurrent operations
//! on the same book queue on the lock; operations on different books never
//! contend. available_copies therefore always equals total_copies minus the
//! open-record count for the book.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{book::BookInventory, borrow::BorrowRecord},
    repository::{self, Repository},
};

/// Result of a successful borrow or return
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LendingOutcome {
    pub record: BorrowRecord,
    pub inventory: BookInventory,
}

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    config: LendingConfig,
}

impl LendingService {
    pub fn new(repository: Repository, config: LendingConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow a book for a user.
    ///
    /// Fails with AlreadyBorrowed if the user holds an open record for the
    /// book, NotFound if the book is absent, OutOfStock when no copies are
    /// on the shelf, and Busy if the book row lock cannot be taken within the
    /// configured timeout. Any failure rolls the transaction back; no partial
    /// ledger or inventory effect ever survives.
    pub async fn borrow(&self, user_id: i32, book_id: i32) -> AppResult<LendingOutcome> {
        let mut tx = self.repository.pool.begin().await?;
        repository::set_lock_timeout(&mut tx, self.config.lock_timeout_ms).await?;

        let inventory = self
            .repository
            .books
            .lock_inventory(&mut tx, book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if self
            .repository
            .borrows
            .find_open(&mut tx, user_id, book_id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyBorrowed(
                "You have already borrowed this book and not returned it yet".to_string(),
            ));
        }

        if inventory.available_copies == 0 {
            return Err(AppError::OutOfStock(
                "No copies of this book are currently available".to_string(),
            ));
        }

        let record = self
            .repository
            .borrows
            .insert(&mut tx, user_id, book_id)
            .await?;
        let inventory = self
            .repository
            .books
            .adjust_available(&mut tx, book_id, -1)
            .await?;

        tx.commit().await?;

        tracing::info!(
            user_id,
            book_id,
            record_id = record.id,
            available = inventory.available_copies,
            "book borrowed"
        );

        Ok(LendingOutcome { record, inventory })
    }

    /// Return a borrowed book.
    ///
    /// Fails with NotFound if the book is absent, NoActiveBorrow if the user
    /// has no open record for it, and Busy on lock contention. A post-update
    /// count above total_copies is InvalidState: the transaction aborts
    /// rather than clamping, since it means the ledger and the counts already
    /// disagree.
    pub async fn return_book(&self, user_id: i32, book_id: i32) -> AppResult<LendingOutcome> {
        let mut tx = self.repository.pool.begin().await?;
        repository::set_lock_timeout(&mut tx, self.config.lock_timeout_ms).await?;

        self.repository
            .books
            .lock_inventory(&mut tx, book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let open = self
            .repository
            .borrows
            .find_open(&mut tx, user_id, book_id)
            .await?
            .ok_or_else(|| {
                AppError::NoActiveBorrow(
                    "Borrowed book record not found or already returned".to_string(),
                )
            })?;

        let record = self.repository.borrows.close(&mut tx, open.id).await?;
        let inventory = self
            .repository
            .books
            .adjust_available(&mut tx, book_id, 1)
            .await?;

        tx.commit().await?;

        tracing::info!(
            user_id,
            book_id,
            record_id = record.id,
            available = inventory.available_copies,
            "book returned"
        );

        Ok(LendingOutcome { record, inventory })
    }
}
