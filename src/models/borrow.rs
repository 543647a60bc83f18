//! Borrow record model and history types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// One entry in the append-only borrow ledger. A record with no
/// returned_at is an open borrow; at most one open record exists per
/// (user_id, book_id) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// Pagination input for history queries
#[derive(Debug, Clone, Copy, Deserialize, IntoParams, ToSchema)]
pub struct PageRequest {
    /// 1-based page number
    pub page: Option<i64>,
    /// Records per page
    pub page_size: Option<i64>,
}

impl PageRequest {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_PAGE_SIZE: i64 = 5;

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(Self::DEFAULT_PAGE)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.page_size()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: None,
            page_size: None,
        }
    }
}

/// One page of borrow history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowHistoryPage {
    pub records: Vec<BorrowRecord>,
    pub total_count: i64,
    pub total_pages: i64,
    pub page: i64,
}
