//! JWT access token handling
//!
//! Access tokens are HS256-signed JWTs carrying `{iss, sub, iat, exp}`.
//! They are stateless: nothing is stored server-side and a token stays
//! valid until it expires. There is no revocation for access tokens.
//!
//! Expiry is checked with zero leeway. Clock skew between the minting and
//! the verifying host is not compensated.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuthError, AuthResult};

/// Issuer claim stamped on every access token this service mints
pub const ACCESS_TOKEN_ISSUER: &str = "chirpy-access";

/// Default access token lifetime in seconds
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Shared HMAC secret used to both sign and verify access tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(Vec<u8>);

impl TokenSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for TokenSecret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for TokenSecret {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSecret(<redacted {} bytes>)", self.0.len())
    }
}

/// JWT claims of an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    /// Issuer
    pub iss: String,
    /// Subject (account ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Create claims for an account, issued at `now` and living for `ttl`.
    ///
    /// Fails when `now + ttl` falls outside the representable time range.
    pub fn new(account_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> AuthResult<Self> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::TtlOutOfRange(format!("{}s", ttl.num_seconds())))?;

        Ok(Self {
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Expired unless `exp` is strictly after `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Mint an access token for an account using the system clock
pub fn mint_access_token(
    account_id: Uuid,
    secret: &TokenSecret,
    ttl: Duration,
) -> AuthResult<String> {
    mint_access_token_at(account_id, secret, ttl, Utc::now())
}

/// Mint an access token as if the current time were `now`
pub fn mint_access_token_at(
    account_id: Uuid,
    secret: &TokenSecret,
    ttl: Duration,
    now: DateTime<Utc>,
) -> AuthResult<String> {
    sign_claims(&AccessClaims::new(account_id, now, ttl)?, secret)
}

pub(crate) fn sign_claims(claims: &AccessClaims, secret: &TokenSecret) -> AuthResult<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Verify an access token using the system clock and return its account ID
pub fn verify_access_token(token: &str, secret: &TokenSecret) -> AuthResult<Uuid> {
    verify_access_token_at(token, secret, Utc::now())
}

/// Verify an access token as if the current time were `now`.
///
/// Checks run in a fixed order: structure, signature, issuer, expiry,
/// subject. No claim is looked at before the signature has been verified.
pub fn verify_access_token_at(
    token: &str,
    secret: &TokenSecret,
    now: DateTime<Utc>,
) -> AuthResult<Uuid> {
    let claims = decode_verified_claims(token, secret)?;

    if claims.iss != ACCESS_TOKEN_ISSUER {
        return Err(AuthError::WrongIssuer {
            expected: ACCESS_TOKEN_ISSUER.to_string(),
            found: claims.iss,
        });
    }

    if claims.is_expired_at(now) {
        return Err(AuthError::Expired);
    }

    Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSubject(claims.sub))
}

/// Decode the claims after the signature has been checked.
///
/// Issuer and expiry are left to the caller so each failure keeps its own kind.
fn decode_verified_claims(token: &str, secret: &TokenSecret) -> AuthResult<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims = ["exp", "iss", "sub"]
        .into_iter()
        .map(String::from)
        .collect::<HashSet<_>>();

    decode::<AccessClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::BadSignature,
            _ => AuthError::MalformedToken(e.to_string()),
        })
}
