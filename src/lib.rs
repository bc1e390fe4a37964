//! # Chirpy credential and session-token subsystem
//!
//! Password hashing, signed access tokens, opaque refresh tokens and
//! `Authorization` header parsing for the Chirpy backend.
//!
//! ## Layout
//!
//! - **auth**: hashing, token codecs, header parsing and the session service
//! - **storage**: refresh token persistence trait and in-memory store
//! - **config**: TOML/env configuration and runtime auth settings
//! - **telemetry**: tracing subscriber setup

pub mod auth;
pub mod config;
pub mod storage;
pub mod telemetry;

pub use auth::{AuthError, AuthResult, SessionService};
pub use config::{default_config_path, AppConfig, AuthSettings, ConfigError};
pub use storage::{InMemoryRefreshTokenStore, RefreshTokenStore};
