//! Borrow and return endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowHistoryPage, PageRequest},
    services::lending::LendingOutcome,
};

use super::AuthenticatedUser;

/// Borrow/return response
#[derive(Serialize, ToSchema)]
pub struct LendingResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: LendingOutcome,
}

/// Borrow a book as the authenticated user
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book borrowed", body = LendingResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Already borrowed or out of stock"),
        (status = 503, description = "Contention on the book, retry")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<(StatusCode, Json<LendingResponse>)> {
    let outcome = state
        .services
        .lending
        .borrow(claims.user_id, book_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LendingResponse {
            message: "Book borrowed successfully".to_string(),
            outcome,
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = LendingResponse),
        (status = 404, description = "Book or active borrow not found"),
        (status = 503, description = "Contention on the book, retry")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<LendingResponse>> {
    let outcome = state
        .services
        .lending
        .return_book(claims.user_id, book_id)
        .await?;

    Ok(Json(LendingResponse {
        message: "Book returned successfully".to_string(),
        outcome,
    }))
}

/// Get the authenticated user's borrow history
#[utoipa::path(
    get,
    path = "/borrows/history",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(PageRequest),
    responses(
        (status = 200, description = "Borrow history page", body = BorrowHistoryPage),
        (status = 400, description = "Invalid pagination"),
        (status = 404, description = "No borrow history")
    )
)]
pub async fn my_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(page): Query<PageRequest>,
) -> AppResult<Json<BorrowHistoryPage>> {
    let history = state
        .services
        .history
        .list_for_user(claims.user_id, page)
        .await?;

    // Presenting an empty history as 404 follows the original behaviour;
    // the query itself treats it as an empty page.
    if history.total_count == 0 {
        return Err(AppError::NotFound(
            "No borrowed book history found".to_string(),
        ));
    }

    Ok(Json(history))
}

/// Get borrow history for any user (admin)
#[utoipa::path(
    get,
    path = "/users/{id}/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        PageRequest
    ),
    responses(
        (status = 200, description = "Borrow history page", body = BorrowHistoryPage),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "User not found or no history")
    )
)]
pub async fn user_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
    Query(page): Query<PageRequest>,
) -> AppResult<Json<BorrowHistoryPage>> {
    claims.require_admin()?;

    // Surface a missing user as 404 before an empty page would
    state.services.auth.get_user(user_id).await?;

    let history = state.services.history.list_for_user(user_id, page).await?;

    if history.total_count == 0 {
        return Err(AppError::NotFound(
            "No borrowed book history found for this user".to_string(),
        ));
    }

    Ok(Json(history))
}

/// Get borrow history for a book (admin)
#[utoipa::path(
    get,
    path = "/books/{id}/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID"),
        PageRequest
    ),
    responses(
        (status = 200, description = "Borrow history page", body = BorrowHistoryPage),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Query(page): Query<PageRequest>,
) -> AppResult<Json<BorrowHistoryPage>> {
    claims.require_admin()?;

    state.services.catalog.get_book(book_id).await?;

    let history = state.services.history.list_for_book(book_id, page).await?;
    Ok(Json(history))
}
