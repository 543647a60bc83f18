//! History query service: a paginated read-model over the borrow ledger.
//!
//! Pure reads at default isolation, no locks, never mutates. Pagination is a
//! stateless function of (filter, page, page_size).

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowHistoryPage, PageRequest},
    repository::Repository,
};

#[derive(Clone)]
pub struct HistoryService {
    repository: Repository,
}

impl HistoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow history for a user, newest first. Empty history is an empty
    /// page, not an error.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        page: PageRequest,
    ) -> AppResult<BorrowHistoryPage> {
        validate(&page)?;

        let total_count = self.repository.borrows.count_for_user(user_id).await?;
        let records = self
            .repository
            .borrows
            .history_for_user(user_id, page.page_size(), page.offset())
            .await?;

        Ok(BorrowHistoryPage {
            records,
            total_count,
            total_pages: total_pages(total_count, page.page_size()),
            page: page.page(),
        })
    }

    /// Borrow history for a book, newest first
    pub async fn list_for_book(
        &self,
        book_id: i32,
        page: PageRequest,
    ) -> AppResult<BorrowHistoryPage> {
        validate(&page)?;

        let total_count = self.repository.borrows.count_for_book(book_id).await?;
        let records = self
            .repository
            .borrows
            .history_for_book(book_id, page.page_size(), page.offset())
            .await?;

        Ok(BorrowHistoryPage {
            records,
            total_count,
            total_pages: total_pages(total_count, page.page_size()),
            page: page.page(),
        })
    }
}

fn validate(page: &PageRequest) -> AppResult<()> {
    if page.page() < 1 || page.page_size() < 1 {
        return Err(AppError::InvalidArgument(
            "page and page_size must be positive integers".to_string(),
        ));
    }
    Ok(())
}

/// Ceiling division; zero records means zero pages
fn total_pages(total_count: i64, page_size: i64) -> i64 {
    (total_count + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(7, 5), 2);
        assert_eq!(total_pages(10, 5), 2);
        assert_eq!(total_pages(11, 5), 3);
    }

    #[test]
    fn defaults_are_first_page_of_five() {
        let page = PageRequest::default();
        assert_eq!(page.page(), 1);
        assert_eq!(page.page_size(), 5);
        assert_eq!(page.offset(), 0);
        assert!(validate(&page).is_ok());
    }

    #[test]
    fn rejects_non_positive_pagination() {
        let page = PageRequest {
            page: Some(0),
            page_size: Some(5),
        };
        assert!(matches!(
            validate(&page),
            Err(AppError::InvalidArgument(_))
        ));

        let size = PageRequest {
            page: Some(1),
            page_size: Some(-3),
        };
        assert!(matches!(
            validate(&size),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn offset_follows_page_number() {
        let page = PageRequest {
            page: Some(3),
            page_size: Some(5),
        };
        assert_eq!(page.offset(), 10);
    }
}
