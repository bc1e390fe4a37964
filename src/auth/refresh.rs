//! Opaque refresh tokens
//!
//! A refresh token is 32 random bytes, hex encoded. The value itself carries
//! no claims; the account and expiry live in the [`RefreshTokenRecord`]
//! kept by a [`RefreshTokenStore`](crate::storage::RefreshTokenStore).
//!
//! Tokens are multi-use until they expire or are revoked. They are not
//! rotated when used.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuthError, AuthResult};

/// Entropy of a refresh token in bytes
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Default refresh token lifetime in days
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// Generate a new refresh token.
///
/// No uniqueness check is made here; the store rejects duplicates.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Lifecycle state of a refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTokenState {
    Active,
    Revoked,
    /// Derived from `expires_at` at lookup time, never stored
    Expired,
}

impl RefreshTokenState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
        }
    }
}

/// Stored refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub account_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Set on logout; the row is kept for auditing
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Create a record for `token` issued at `now`
    pub fn new(
        token: String,
        account_id: Uuid,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> AuthResult<Self> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::TtlOutOfRange(format!("{}d", ttl.num_days())))?;

        Ok(Self {
            token,
            account_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        })
    }

    /// State at `now`. Revocation wins over expiry.
    pub fn state(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if now >= self.expires_at {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == RefreshTokenState::Active
    }

    /// Mark the token revoked. Revoking twice keeps the first timestamp.
    pub fn revoke(&mut self, now: DateTime<Utc>) {
        if self.revoked_at.is_none() {
            self.revoked_at = Some(now);
            self.updated_at = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_refresh_token_format() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), REFRESH_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generate_refresh_token_distinct() {
        let tokens: HashSet<String> = (0..10_000).map(|_| generate_refresh_token()).collect();
        assert_eq!(tokens.len(), 10_000);
    }

    #[test]
    fn test_refresh_token_validity() {
        let now = Utc::now();
        let mut record = RefreshTokenRecord::new(
            generate_refresh_token(),
            Uuid::new_v4(),
            now,
            Duration::days(DEFAULT_REFRESH_TOKEN_TTL_DAYS),
        )
        .unwrap();

        assert_eq!(record.state(now), RefreshTokenState::Active);
        assert!(record.is_active(now + Duration::days(59)));
        assert_eq!(
            record.state(now + Duration::days(60)),
            RefreshTokenState::Expired
        );

        record.revoke(now + Duration::hours(1));
        assert_eq!(record.state(now), RefreshTokenState::Revoked);
        assert_eq!(
            record.state(now + Duration::days(90)),
            RefreshTokenState::Revoked
        );
    }

    #[test]
    fn test_revoke_keeps_first_timestamp() {
        let now = Utc::now();
        let mut record =
            RefreshTokenRecord::new("abc".into(), Uuid::new_v4(), now, Duration::days(1)).unwrap();

        record.revoke(now + Duration::minutes(5));
        record.revoke(now + Duration::minutes(10));

        assert_eq!(record.revoked_at, Some(now + Duration::minutes(5)));
        assert_eq!(record.updated_at, now + Duration::minutes(5));
        assert_eq!(record.created_at, now);
    }

    #[test]
    fn test_ttl_past_end_of_time_is_an_error() {
        let err = RefreshTokenRecord::new("abc".into(), Uuid::new_v4(), Utc::now(), Duration::MAX)
            .unwrap_err();
        assert!(matches!(err, AuthError::TtlOutOfRange(_)));
    }
}
