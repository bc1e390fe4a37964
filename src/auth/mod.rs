//! Authentication module
//!
//! Credential and session-token handling:
//!
//! - **password**: Argon2id hashing and verification of user passwords
//! - **jwt**: signed, short-lived access tokens
//! - **refresh**: opaque, long-lived refresh tokens and their lifecycle
//! - **credentials**: `Authorization` header parsing (`Bearer` / `ApiKey`)
//! - **session**: login, refresh, revoke and request authentication

pub mod clock;
pub mod credentials;
pub mod error;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::{extract_api_key, extract_bearer, verify_api_key, AuthorizationCredential};
pub use error::{AuthError, AuthResult};
pub use jwt::{
    mint_access_token, mint_access_token_at, verify_access_token, verify_access_token_at,
    AccessClaims, TokenSecret, ACCESS_TOKEN_ISSUER,
};
pub use password::{hash_password, needs_rehash, verify_password};
pub use refresh::{generate_refresh_token, RefreshTokenRecord, RefreshTokenState};
pub use session::{AccessGrant, SessionService, SessionTokens};
