//! Thread-safe in-memory [`RefreshStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::RefreshToken,
	connection::ConnectionContext,
	store::{RefreshStore, StoreError, StoreFuture},
};

type StoreMap<K> = Arc<RwLock<HashMap<K, RefreshToken>>>;

/// Process-local refresh token store; contents do not survive a restart.
#[derive(Debug)]
pub struct MemoryStore<K>(StoreMap<K>);
impl<K> MemoryStore<K>
where
	K: ConnectionContext,
{
	/// Returns the token stored for `key` without going through the async contract.
	pub fn get(&self, key: &K) -> Option<RefreshToken> {
		self.0.read().get(key).cloned()
	}

	/// Number of connections with a stored refresh token.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no refresh token is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn save_now(map: &StoreMap<K>, key: &K, token: RefreshToken) -> Result<(), StoreError> {
		map.write().insert(key.clone(), token);

		Ok(())
	}
}
impl<K> Clone for MemoryStore<K> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}
impl<K> Default for MemoryStore<K> {
	fn default() -> Self {
		Self(Default::default())
	}
}
impl<K> RefreshStore<K> for MemoryStore<K>
where
	K: ConnectionContext,
{
	fn fetch<'a>(&'a self, key: &'a K) -> StoreFuture<'a, Option<RefreshToken>> {
		Box::pin(async move { Ok(self.get(key)) })
	}

	fn save<'a>(&'a self, key: &'a K, token: RefreshToken) -> StoreFuture<'a, ()> {
		Box::pin(async move { Self::save_now(&self.0, key, token) })
	}

	fn remove<'a>(&'a self, key: &'a K) -> StoreFuture<'a, Option<RefreshToken>> {
		Box::pin(async move { Ok(self.0.write().remove(key)) })
	}
}
