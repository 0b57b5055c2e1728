//! Storage contracts and the built-in in-memory refresh token store.
//!
//! The store remembers the most recent refresh token per connection. It is written after
//! every exchange whose response carries `refresh_token` and read at the start of every
//! negotiation; it is independent of the bearer token cache.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::RefreshToken, connection::ConnectionContext};

/// Boxed future returned by [`RefreshStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for refresh tokens keyed by connection.
pub trait RefreshStore<K>
where
	Self: Send + Sync,
	K: ConnectionContext,
{
	/// Fetches the refresh token stored for `key`, if any.
	fn fetch<'a>(&'a self, key: &'a K) -> StoreFuture<'a, Option<RefreshToken>>;

	/// Stores `token` for `key`, overwriting any previous value.
	fn save<'a>(&'a self, key: &'a K, token: RefreshToken) -> StoreFuture<'a, ()>;

	/// Removes and returns the token stored for `key`.
	fn remove<'a>(&'a self, key: &'a K) -> StoreFuture<'a, Option<RefreshToken>>;
}

/// Error type produced by [`RefreshStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
