//! Storage trait definitions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::RefreshTokenRecord;

/// Errors reported by a refresh token store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("refresh token not found")]
    NotFound,

    #[error("refresh token already exists")]
    AlreadyExists,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for refresh tokens.
///
/// Implementations must make `insert_refresh_token` an atomic
/// insert-if-absent and `revoke_refresh_token` atomic per token value.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Look up a token, including revoked and expired ones
    async fn get_refresh_token(&self, token: &str) -> StorageResult<Option<RefreshTokenRecord>>;

    /// Insert a new token. Fails with `AlreadyExists` on a duplicate value.
    async fn insert_refresh_token(&self, record: RefreshTokenRecord) -> StorageResult<()>;

    /// Soft-revoke a token and return the updated record
    async fn revoke_refresh_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
    ) -> StorageResult<RefreshTokenRecord>;
}
