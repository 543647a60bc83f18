//! Redis service for sessions and password reset tokens

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    /// Mirror an issued JWT so logout and password reset can revoke it
    pub async fn store_session(
        &self,
        user_id: i32,
        token: &str,
        expiration_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection().await?;

        let key = format!("session:{}", user_id);
        conn.set_ex::<_, _, ()>(&key, token, expiration_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store session in Redis: {}", e)))?;

        Ok(())
    }

    /// Drop the stored session for a user
    pub async fn revoke_session(&self, user_id: i32) -> AppResult<()> {
        let mut conn = self.connection().await?;

        let key = format!("session:{}", user_id);
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to revoke session in Redis: {}", e)))?;

        Ok(())
    }

    /// Store a single-use password reset token with expiration (in seconds)
    pub async fn store_reset_token(
        &self,
        token: &str,
        user_id: i32,
        expiration_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection().await?;

        let key = format!("pwreset:{}", token);
        conn.set_ex::<_, _, ()>(&key, user_id, expiration_seconds)
            .await
            .map_err(|e| {
                AppError::Internal(format!("Failed to store reset token in Redis: {}", e))
            })?;

        Ok(())
    }

    /// Consume a password reset token, returning the user it was issued for.
    /// The token is deleted on first use.
    pub async fn consume_reset_token(&self, token: &str) -> AppResult<Option<i32>> {
        let mut conn = self.connection().await?;

        let key = format!("pwreset:{}", token);
        let user_id: Option<i32> = conn
            .get(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get reset token from Redis: {}", e)))?;

        if user_id.is_some() {
            let _: () = conn.del(&key).await.map_err(|e| {
                AppError::Internal(format!("Failed to delete reset token from Redis: {}", e))
            })?;
        }

        Ok(user_id)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}
