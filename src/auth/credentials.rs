//! Authorization header parsing
//!
//! Two schemes share the `Authorization` header:
//!
//! - `Bearer <token>` for access and refresh tokens
//! - `ApiKey <key>` for the static webhook key
//!
//! The header is split on runs of whitespace and must yield exactly two
//! fields. A credential split over more fields is rejected, not truncated.

use sha2::{Digest, Sha256};

use super::error::{AuthError, AuthResult};

pub const BEARER_SCHEME: &str = "Bearer";
pub const API_KEY_SCHEME: &str = "ApiKey";

/// Credential carried by an `Authorization` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationCredential {
    Bearer(String),
    ApiKey(String),
    Absent,
}

impl AuthorizationCredential {
    /// Parse a header value, `None` meaning the header was not sent
    pub fn parse(header: Option<&str>) -> AuthResult<Self> {
        let header = match header {
            None | Some("") => return Ok(Self::Absent),
            Some(value) => value,
        };

        match header.split_whitespace().next() {
            Some(BEARER_SCHEME) => extract_bearer(header).map(Self::Bearer),
            Some(API_KEY_SCHEME) => extract_api_key(header).map(Self::ApiKey),
            _ => Err(AuthError::MalformedHeader),
        }
    }
}

/// Extract the token from a `Bearer <token>` header value
pub fn extract_bearer(header: &str) -> AuthResult<String> {
    extract_scheme(header, BEARER_SCHEME)
}

/// Extract the key from an `ApiKey <key>` header value
pub fn extract_api_key(header: &str) -> AuthResult<String> {
    extract_scheme(header, API_KEY_SCHEME)
}

fn extract_scheme(header: &str, scheme: &str) -> AuthResult<String> {
    if header.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let mut fields = header.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(keyword), Some(value), None) if keyword == scheme => Ok(value.to_string()),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Compare a presented API key with the configured one.
///
/// Both sides are reduced to SHA-256 digests first so the comparison
/// runs over fixed-length input, then compared without early exit.
pub fn verify_api_key(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    presented
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc123"), Ok("abc123".to_string()));
        assert_eq!(extract_bearer("Bearer \t  abc123  "), Ok("abc123".to_string()));
        assert_eq!(extract_bearer("  Bearer abc123"), Ok("abc123".to_string()));
    }

    #[test]
    fn test_extract_bearer_errors() {
        assert_eq!(extract_bearer(""), Err(AuthError::MissingHeader));
        assert_eq!(extract_bearer("Bearer"), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer("Bearer "), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer("   "), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer("Bearer a b"), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer("bearer abc123"), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer("ApiKey abc123"), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer("Bearerabc123"), Err(AuthError::MalformedHeader));
    }

    #[test]
    fn test_extract_api_key() {
        assert_eq!(extract_api_key("ApiKey secret-xyz"), Ok("secret-xyz".to_string()));
        assert_eq!(extract_api_key(""), Err(AuthError::MissingHeader));
        assert_eq!(extract_api_key("ApiKey"), Err(AuthError::MalformedHeader));
        assert_eq!(extract_api_key("Bearer secret-xyz"), Err(AuthError::MalformedHeader));
        assert_eq!(extract_api_key("ApiKey secret xyz"), Err(AuthError::MalformedHeader));
    }

    #[test]
    fn test_parse_credential() {
        assert_eq!(
            AuthorizationCredential::parse(Some("Bearer tok")),
            Ok(AuthorizationCredential::Bearer("tok".into()))
        );
        assert_eq!(
            AuthorizationCredential::parse(Some("ApiKey key")),
            Ok(AuthorizationCredential::ApiKey("key".into()))
        );
        assert_eq!(AuthorizationCredential::parse(None), Ok(AuthorizationCredential::Absent));
        assert_eq!(AuthorizationCredential::parse(Some("")), Ok(AuthorizationCredential::Absent));
        assert_eq!(
            AuthorizationCredential::parse(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::MalformedHeader)
        );
        assert_eq!(
            AuthorizationCredential::parse(Some("Bearer a b")),
            Err(AuthError::MalformedHeader)
        );
    }

    #[test]
    fn test_verify_api_key() {
        assert!(verify_api_key("polka-key", "polka-key"));
        assert!(!verify_api_key("polka-kez", "polka-key"));
        assert!(!verify_api_key("polka", "polka-key"));
        assert!(!verify_api_key("", "polka-key"));
    }
}
