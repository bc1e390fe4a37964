//! In-memory refresh token store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::{RefreshTokenStore, StorageError, StorageResult};
use crate::auth::RefreshTokenRecord;

/// In-memory storage for development and testing
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: DashMap<String, RefreshTokenRecord>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// All tokens ever issued to an account, revoked ones included
    pub fn tokens_for_account(&self, account_id: Uuid) -> Vec<RefreshTokenRecord> {
        self.tokens
            .iter()
            .filter(|e| e.value().account_id == account_id)
            .map(|e| e.value().clone())
            .collect()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn get_refresh_token(&self, token: &str) -> StorageResult<Option<RefreshTokenRecord>> {
        Ok(self.tokens.get(token).map(|r| r.clone()))
    }

    async fn insert_refresh_token(&self, record: RefreshTokenRecord) -> StorageResult<()> {
        match self.tokens.entry(record.token.clone()) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn revoke_refresh_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
    ) -> StorageResult<RefreshTokenRecord> {
        let mut record = self.tokens.get_mut(token).ok_or(StorageError::NotFound)?;
        record.revoke(revoked_at);
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::auth::{generate_refresh_token, RefreshTokenState};

    fn record(now: DateTime<Utc>) -> RefreshTokenRecord {
        RefreshTokenRecord::new(generate_refresh_token(), Uuid::new_v4(), now, Duration::days(60))
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryRefreshTokenStore::new();
        let now = Utc::now();
        let rec = record(now);

        store.insert_refresh_token(rec.clone()).await.unwrap();

        let found = store.get_refresh_token(&rec.token).await.unwrap();
        assert_eq!(found, Some(rec.clone()));
        assert_eq!(store.tokens_for_account(rec.account_id).len(), 1);
        assert!(store.get_refresh_token("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_rejected() {
        let store = InMemoryRefreshTokenStore::new();
        let rec = record(Utc::now());

        store.insert_refresh_token(rec.clone()).await.unwrap();
        let err = store.insert_refresh_token(rec).await.unwrap_err();

        assert_eq!(err, StorageError::AlreadyExists);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_revoke_is_soft() {
        let store = InMemoryRefreshTokenStore::new();
        let now = Utc::now();
        let rec = record(now);
        store.insert_refresh_token(rec.clone()).await.unwrap();

        let revoked = store
            .revoke_refresh_token(&rec.token, now + Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(revoked.state(now), RefreshTokenState::Revoked);

        // Row is still there for the audit trail
        let stored = store.get_refresh_token(&rec.token).await.unwrap().unwrap();
        assert_eq!(stored.revoked_at, Some(now + Duration::minutes(1)));
    }

    #[tokio::test]
    async fn test_revoke_unknown_token() {
        let store = InMemoryRefreshTokenStore::new();
        let err = store
            .revoke_refresh_token("nope", Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::NotFound);
    }
}
