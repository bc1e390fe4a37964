//! Password hashing utilities
//!
//! Argon2id with fixed cost parameters. Callers never choose parameters,
//! so a stored credential cannot be downgraded through this API.

use std::time::Instant;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::debug;

use super::error::{AuthError, AuthResult};

/// Memory cost in KiB (64 MiB)
pub const MEMORY_COST_KIB: u32 = 64 * 1024;
/// Number of passes
pub const TIME_COST: u32 = 1;
/// Degree of parallelism
pub const PARALLELISM: u32 = 2;
/// Digest length in bytes
pub const OUTPUT_LEN: usize = 32;

/// Largest memory cost accepted from a stored credential (256 MiB)
pub const MAX_MEMORY_COST_KIB: u32 = 4 * MEMORY_COST_KIB;
/// Largest pass count accepted from a stored credential
pub const MAX_TIME_COST: u32 = 16;
/// Largest lane count accepted from a stored credential
pub const MAX_PARALLELISM: u32 = 16;

fn hasher() -> AuthResult<Argon2<'static>> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| AuthError::HashingFailure(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password using Argon2id with a fresh random salt
pub fn hash_password(password: &str) -> AuthResult<String> {
    let started = Instant::now();
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashingFailure(e.to_string()))?
        .to_string();

    let elapsed = started.elapsed().as_secs_f64();
    metrics::histogram!("auth_password_hash_seconds").record(elapsed);
    debug!(elapsed_ms = elapsed * 1000.0, "password hashed");

    Ok(hash)
}

/// Verify a password against a stored credential.
///
/// A wrong password is `Ok(false)`. An error means the stored credential
/// itself could not be used, including one whose cost parameters exceed
/// [`MAX_MEMORY_COST_KIB`], [`MAX_TIME_COST`] or [`MAX_PARALLELISM`].
pub fn verify_password(password: &str, credential: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(credential)
        .map_err(|e| AuthError::MalformedCredential(e.to_string()))?;
    check_cost_limits(&parsed)?;

    // Parameters are taken from the credential, not from `hasher()`.
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::MalformedCredential(e.to_string())),
    }
}

fn check_cost_limits(parsed: &PasswordHash<'_>) -> AuthResult<()> {
    let params =
        Params::try_from(parsed).map_err(|e| AuthError::MalformedCredential(e.to_string()))?;

    if params.m_cost() > MAX_MEMORY_COST_KIB
        || params.t_cost() > MAX_TIME_COST
        || params.p_cost() > MAX_PARALLELISM
    {
        return Err(AuthError::MalformedCredential(format!(
            "cost parameters m={},t={},p={} exceed limits",
            params.m_cost(),
            params.t_cost(),
            params.p_cost()
        )));
    }
    Ok(())
}

/// Whether a stored credential was produced with other than the current parameters.
pub fn needs_rehash(credential: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(credential)
        .map_err(|e| AuthError::MalformedCredential(e.to_string()))?;
    let params =
        Params::try_from(&parsed).map_err(|e| AuthError::MalformedCredential(e.to_string()))?;

    let current = parsed.algorithm == Algorithm::Argon2id.ident()
        && parsed.version == Some(Version::V0x13.into())
        && params.m_cost() == MEMORY_COST_KIB
        && params.t_cost() == TIME_COST
        && params.p_cost() == PARALLELISM
        && parsed.hash.map(|h| h.len()) == Some(OUTPUT_LEN);

    Ok(!current)
}
