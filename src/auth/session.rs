//! Session service: login, refresh, revoke and request authentication
//!
//! HTTP handlers stay thin: they pass the raw `Authorization` header and
//! the stored credential in, and map the returned [`AuthError`] to a
//! response with [`AuthError::status_code`] / [`AuthError::public_message`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::credentials::{extract_api_key, extract_bearer, verify_api_key};
use super::error::{AuthError, AuthResult};
use super::jwt::{mint_access_token_at, verify_access_token_at};
use super::password::verify_password;
use super::refresh::{generate_refresh_token, RefreshTokenRecord, RefreshTokenState};
use crate::config::AuthSettings;
use crate::storage::RefreshTokenStore;

/// Tokens handed out after a successful login
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Access token returned by a refresh
#[derive(Debug, Clone, Serialize)]
pub struct AccessGrant {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Session service. Orchestrates the credential and token use-cases.
///
/// Generic over `S: RefreshTokenStore` so it stays decoupled from
/// the concrete persistence layer.
pub struct SessionService<S: RefreshTokenStore, C: Clock = SystemClock> {
    store: Arc<S>,
    settings: AuthSettings,
    clock: C,
}

impl<S: RefreshTokenStore> SessionService<S> {
    pub fn new(store: Arc<S>, settings: AuthSettings) -> Self {
        Self::with_clock(store, settings, SystemClock)
    }
}

impl<S: RefreshTokenStore, C: Clock> SessionService<S, C> {
    pub fn with_clock(store: Arc<S>, settings: AuthSettings, clock: C) -> Self {
        Self {
            store,
            settings,
            clock,
        }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    // ── Login ───────────────────────────────────────────────────

    /// Check a password against the account's stored credential and open a session.
    pub async fn login(
        &self,
        account_id: Uuid,
        password: &str,
        credential: &str,
    ) -> AuthResult<SessionTokens> {
        let matched = verify_password(password, credential).map_err(|e| {
            warn!(%account_id, kind = e.kind(), "stored credential unusable");
            e
        })?;

        if !matched {
            metrics::counter!("auth_logins_total", "outcome" => "rejected").increment(1);
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let access_token = mint_access_token_at(
            account_id,
            &self.settings.secret,
            self.settings.access_token_ttl,
            now,
        )?;

        let record = RefreshTokenRecord::new(
            generate_refresh_token(),
            account_id,
            now,
            self.settings.refresh_token_ttl,
        )?;
        let refresh_token = record.token.clone();
        let refresh_expires_at = record.expires_at;
        self.store.insert_refresh_token(record).await?;

        metrics::counter!("auth_logins_total", "outcome" => "success").increment(1);
        info!(%account_id, "session opened");

        Ok(SessionTokens {
            access_token,
            token_type: "Bearer".into(),
            expires_in: self.settings.access_token_ttl.num_seconds(),
            refresh_token,
            refresh_expires_at,
        })
    }

    // ── Refresh / revoke ────────────────────────────────────────

    /// Exchange the refresh token in a `Bearer` header for a new access token.
    ///
    /// The refresh token itself stays valid.
    pub async fn refresh(&self, authorization: Option<&str>) -> AuthResult<AccessGrant> {
        let token = extract_bearer(authorization.unwrap_or_default())?;
        let now = self.clock.now();

        let record = self
            .store
            .get_refresh_token(&token)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)
            .map_err(|e| self.rejected(e))?;

        match record.state(now) {
            RefreshTokenState::Active => {}
            RefreshTokenState::Revoked => return Err(self.rejected(AuthError::RefreshTokenRevoked)),
            RefreshTokenState::Expired => return Err(self.rejected(AuthError::RefreshTokenExpired)),
        }

        let access_token = mint_access_token_at(
            record.account_id,
            &self.settings.secret,
            self.settings.access_token_ttl,
            now,
        )?;

        info!(account_id = %record.account_id, "access token refreshed");
        Ok(AccessGrant {
            access_token,
            token_type: "Bearer".into(),
            expires_in: self.settings.access_token_ttl.num_seconds(),
        })
    }

    /// Revoke the refresh token in a `Bearer` header.
    pub async fn revoke(&self, authorization: Option<&str>) -> AuthResult<()> {
        let token = extract_bearer(authorization.unwrap_or_default())?;
        let record = self
            .store
            .revoke_refresh_token(&token, self.clock.now())
            .await
            .map_err(|e| self.rejected(e.into()))?;

        info!(account_id = %record.account_id, "session revoked");
        Ok(())
    }

    // ── Request authentication ──────────────────────────────────

    /// Resolve the account behind a `Bearer` access token.
    pub fn authenticate(&self, authorization: Option<&str>) -> AuthResult<Uuid> {
        let token = extract_bearer(authorization.unwrap_or_default())?;
        verify_access_token_at(&token, &self.settings.secret, self.clock.now())
            .map_err(|e| self.rejected(e))
    }

    /// Check an `ApiKey` header against the configured webhook key.
    pub fn authorize_api_key(&self, authorization: Option<&str>) -> AuthResult<()> {
        let key = extract_api_key(authorization.unwrap_or_default())?;
        if verify_api_key(&key, &self.settings.api_key) {
            Ok(())
        } else {
            Err(self.rejected(AuthError::InvalidApiKey))
        }
    }

    fn rejected(&self, err: AuthError) -> AuthError {
        metrics::counter!("auth_token_rejections_total", "kind" => err.kind()).increment(1);
        warn!(kind = err.kind(), "credential rejected: {}", err);
        err
    }
}
