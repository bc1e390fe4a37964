//! Refresh token storage traits and implementations

mod memory;
mod traits;

pub use memory::InMemoryRefreshTokenStore;
pub use traits::{RefreshTokenStore, StorageError, StorageResult};
