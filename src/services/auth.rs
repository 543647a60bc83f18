//! Authentication and account service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginUser, RegisterUser, User, UserClaims, UserQuery},
    repository::Repository,
    services::{email::EmailService, redis::RedisService},
};

/// Reset tokens live for 15 minutes
const RESET_TOKEN_TTL_SECONDS: u64 = 15 * 60;
const RESET_TOKEN_LENGTH: usize = 32;

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    redis: RedisService,
    email: EmailService,
}

impl AuthService {
    pub fn new(
        repository: Repository,
        config: AuthConfig,
        redis: RedisService,
        email: EmailService,
    ) -> Self {
        Self {
            repository,
            config,
            redis,
            email,
        }
    }

    /// Create an account and log the new user in immediately
    pub async fn register(&self, request: RegisterUser) -> AppResult<(String, User)> {
        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = self.hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(
                &request.first_name,
                &request.last_name,
                &request.email,
                &password_hash,
            )
            .await?;

        tracing::info!(user_id = user.id, "account registered");

        let token = self.issue_token(&user).await?;
        Ok((token, user))
    }

    /// Authenticate by email and password. Unknown email and wrong password
    /// are indistinguishable to the caller.
    pub async fn login(&self, request: LoginUser) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, &request.password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.issue_token(&user).await?;
        Ok((token, user))
    }

    /// Revoke the caller's server-side session entry
    pub async fn logout(&self, user_id: i32) -> AppResult<()> {
        self.redis.revoke_session(user_id).await?;
        tracing::info!(user_id, "session revoked");
        Ok(())
    }

    /// The authenticated account
    pub async fn me(&self, user_id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    // User lookups are part of the auth service; there is no separate users
    // service.

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list_users(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.search(query).await
    }

    /// Issue a single-use reset token and email it. Always succeeds from the
    /// caller's point of view so the endpoint does not reveal whether the
    /// email exists.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        let user = match self.repository.users.get_by_email(email).await? {
            Some(user) => user,
            None => {
                tracing::debug!("password reset requested for unknown email");
                return Ok(());
            }
        };

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RESET_TOKEN_LENGTH)
            .map(char::from)
            .collect();

        self.redis
            .store_reset_token(&token, user.id, RESET_TOKEN_TTL_SECONDS)
            .await?;
        self.email.send_password_reset(&user.email, &token).await?;

        tracing::info!(user_id = user.id, "password reset token issued");
        Ok(())
    }

    /// Consume a reset token, replace the password, and revoke any live session
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        let user_id = self
            .redis
            .consume_reset_token(token)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid or expired reset token".to_string())
            })?;

        let password_hash = self.hash_password(new_password)?;
        self.repository
            .users
            .update_password(user_id, &password_hash)
            .await?;
        self.redis.revoke_session(user_id).await?;

        tracing::info!(user_id, "password reset completed");
        Ok(())
    }

    /// Create the JWT and mirror it in Redis for revocation
    async fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let expiration_seconds = self.config.jwt_expiration_hours * 3600;
        let exp = now + expiration_seconds as i64;

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            is_admin: user.is_admin,
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        self.redis
            .store_session(user.id, &token, expiration_seconds)
            .await?;

        Ok(token)
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
            .to_string())
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&user.password)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
