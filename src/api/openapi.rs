//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lendery API",
        version = "1.0.0",
        description = "Library Lending System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Lendery Team", email = "contact@lendery.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        auth::forgot_password,
        auth::reset_password,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrows
        borrows::borrow_book,
        borrows::return_book,
        borrows::my_history,
        borrows::user_history,
        borrows::book_history,
        // Users
        users::list_users,
        users::get_user,
    ),
    components(
        schemas(
            // Auth
            auth::TokenResponse,
            auth::StatusResponse,
            crate::models::user::User,
            crate::models::user::UserQuery,
            crate::models::user::RegisterUser,
            crate::models::user::LoginUser,
            crate::models::user::ForgotPassword,
            crate::models::user::ResetPassword,
            // Books
            books::BookListResponse,
            books::DeleteBookResponse,
            crate::models::book::Book,
            crate::models::book::BookInventory,
            crate::models::book::BookQuery,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::Genre,
            // Borrows
            borrows::LendingResponse,
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::PageRequest,
            crate::models::borrow::BorrowHistoryPage,
            crate::services::lending::LendingOutcome,
            // Users
            users::UserListResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "borrows", description = "Borrowing and history"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
