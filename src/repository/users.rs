//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{User, UserQuery},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (primary authentication method)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a new account with an already-hashed password
    pub async fn create(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, email, password, is_admin)
            VALUES ($1, $2, LOWER($3), $4, FALSE)
            RETURNING *
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Replace a user's password hash
    pub async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    /// Search users with pagination (admin listing)
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(20);
        if page < 1 || per_page < 1 {
            return Err(AppError::InvalidArgument(
                "page and per_page must be positive integers".to_string(),
            ));
        }
        let offset = (page - 1) * per_page;

        let (where_clause, pattern) = match query.name {
            Some(ref name) => (
                "LOWER(first_name) LIKE $1 OR LOWER(last_name) LIKE $1",
                Some(format!("%{}%", name.to_lowercase())),
            ),
            None => ("1=1", None),
        };

        let count_sql = format!("SELECT COUNT(*) FROM users WHERE {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref p) = pattern {
            count_query = count_query.bind(p);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let rows_sql = format!(
            "SELECT * FROM users WHERE {} ORDER BY last_name, first_name LIMIT ${} OFFSET ${}",
            where_clause,
            if pattern.is_some() { 2 } else { 1 },
            if pattern.is_some() { 3 } else { 2 },
        );
        let mut rows_query = sqlx::query_as::<_, User>(&rows_sql);
        if let Some(ref p) = pattern {
            rows_query = rows_query.bind(p);
        }
        let users = rows_query
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((users, total))
    }
}
