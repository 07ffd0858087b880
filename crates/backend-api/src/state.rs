use sqlx::SqlitePool;
use swibi_auth::{AuthSession, Authenticator, User};
use swibi_config::FeedConfig;

use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    authenticator: Authenticator,
    feed: FeedConfig,
}

impl AppState {
    pub fn new(pool: SqlitePool, authenticator: Authenticator, feed: FeedConfig) -> Self {
        Self {
            pool,
            authenticator,
            feed,
        }
    }

    pub fn db_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn feed(&self) -> &FeedConfig {
        &self.feed
    }

    pub async fn authenticate(&self, token: &str) -> Result<(User, AuthSession), ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }
}
