//! Authentication errors

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for credential and session operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors produced by the credential and session-token subsystem.
///
/// Every variant is a local, recoverable condition. The distinct kinds are
/// kept for logging and metrics; use [`AuthError::public_message`] when
/// rendering a response so token rejections are not told apart externally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ── Authorization header ────────────────────────────────────
    #[error("no authorization header in request")]
    MissingHeader,

    #[error("malformed authorization header")]
    MalformedHeader,

    // ── Access tokens ───────────────────────────────────────────
    #[error("malformed access token: {0}")]
    MalformedToken(String),

    #[error("access token signature does not match")]
    BadSignature,

    #[error("access token has expired")]
    Expired,

    #[error("access token issuer mismatch: expected {expected}, got {found}")]
    WrongIssuer { expected: String, found: String },

    #[error("access token subject is not a valid account id: {0}")]
    InvalidSubject(String),

    #[error("failed to sign access token: {0}")]
    Signing(String),

    #[error("token lifetime out of range: {0}")]
    TtlOutOfRange(String),

    // ── Passwords ───────────────────────────────────────────────
    #[error("malformed password hash: {0}")]
    MalformedCredential(String),

    #[error("password hashing failed: {0}")]
    HashingFailure(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    // ── API keys ────────────────────────────────────────────────
    #[error("invalid API key")]
    InvalidApiKey,

    // ── Refresh tokens ──────────────────────────────────────────
    #[error("refresh token not found")]
    RefreshTokenNotFound,

    #[error("refresh token has been revoked")]
    RefreshTokenRevoked,

    #[error("refresh token has expired")]
    RefreshTokenExpired,

    #[error("refresh token already exists")]
    DuplicateRefreshToken,

    #[error("storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Stable error code for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingHeader => "MISSING_CREDENTIAL",
            Self::MalformedHeader => "MALFORMED_HEADER",
            Self::MalformedToken(_) => "MALFORMED_TOKEN",
            Self::BadSignature => "BAD_SIGNATURE",
            Self::Expired => "EXPIRED",
            Self::WrongIssuer { .. } => "WRONG_ISSUER",
            Self::InvalidSubject(_) => "INVALID_SUBJECT",
            Self::Signing(_) => "SIGNING_FAILURE",
            Self::TtlOutOfRange(_) => "TTL_OUT_OF_RANGE",
            Self::MalformedCredential(_) => "MALFORMED_CREDENTIAL",
            Self::HashingFailure(_) => "HASHING_FAILURE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidApiKey => "INVALID_API_KEY",
            Self::RefreshTokenNotFound => "REFRESH_TOKEN_NOT_FOUND",
            Self::RefreshTokenRevoked => "REFRESH_TOKEN_REVOKED",
            Self::RefreshTokenExpired => "REFRESH_TOKEN_EXPIRED",
            Self::DuplicateRefreshToken => "DUPLICATE_REFRESH_TOKEN",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// HTTP status code a handler should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            // 500 Internal Server Error
            Self::Signing(_)
            | Self::TtlOutOfRange(_)
            | Self::HashingFailure(_)
            | Self::DuplicateRefreshToken
            | Self::Storage(_) => 500,

            // 401 Unauthorized
            _ => 401,
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> &'static str {
        if self.status_code() == 500 {
            "Internal server error"
        } else {
            "Unauthorized"
        }
    }

    /// True for every way an access token can fail verification.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken(_)
                | Self::BadSignature
                | Self::Expired
                | Self::WrongIssuer { .. }
                | Self::InvalidSubject(_)
        )
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::RefreshTokenNotFound,
            StorageError::AlreadyExists => Self::DuplicateRefreshToken,
            StorageError::Backend(msg) => Self::Storage(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_rejections_collapse_publicly() {
        let rejections = [
            AuthError::MalformedToken("bad".into()),
            AuthError::BadSignature,
            AuthError::Expired,
            AuthError::WrongIssuer {
                expected: "a".into(),
                found: "b".into(),
            },
            AuthError::InvalidSubject("x".into()),
        ];

        for err in &rejections {
            assert!(err.is_token_rejection());
            assert_eq!(err.status_code(), 401);
            assert_eq!(err.public_message(), "Unauthorized");
        }

        let kinds: std::collections::HashSet<_> = rejections.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), rejections.len());
    }

    #[test]
    fn test_internal_failures_are_server_errors() {
        assert_eq!(AuthError::HashingFailure("oom".into()).status_code(), 500);
        assert_eq!(AuthError::TtlOutOfRange("huge".into()).status_code(), 500);
        assert_eq!(AuthError::Storage("down".into()).public_message(), "Internal server error");
        assert!(!AuthError::InvalidCredentials.is_token_rejection());
    }

    #[test]
    fn test_storage_error_conversion() {
        assert_eq!(AuthError::from(StorageError::NotFound), AuthError::RefreshTokenNotFound);
        assert_eq!(
            AuthError::from(StorageError::AlreadyExists),
            AuthError::DuplicateRefreshToken
        );
        assert_eq!(
            AuthError::from(StorageError::Backend("io".into())),
            AuthError::Storage("io".into())
        );
    }
}
