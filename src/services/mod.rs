//! Business logic services

pub mod auth;
pub mod catalog;
pub mod email;
pub mod history;
pub mod lending;
pub mod redis;

use crate::{
    config::{AuthConfig, EmailConfig, LendingConfig},
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
    pub history: history::HistoryService,
    pub email: email::EmailService,
    pub redis: redis::RedisService,
}

impl Services {
    /// Create all services with the given repository
    pub async fn new(
        repository: Repository,
        auth_config: AuthConfig,
        email_config: EmailConfig,
        lending_config: LendingConfig,
        redis_service: redis::RedisService,
    ) -> AppResult<Self> {
        let email_service = email::EmailService::new(email_config);
        Ok(Self {
            auth: auth::AuthService::new(
                repository.clone(),
                auth_config,
                redis_service.clone(),
                email_service.clone(),
            ),
            catalog: catalog::CatalogService::new(repository.clone(), lending_config.clone()),
            lending: lending::LendingService::new(repository.clone(), lending_config),
            history: history::HistoryService::new(repository),
            email: email_service,
            redis: redis_service,
        })
    }
}
