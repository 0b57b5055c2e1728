//! Per-connection memo of in-flight and completed negotiations.
//!
//! The map lock is only taken to insert or replace an entry and is never held across an
//! `.await`; waiting happens on the [`CachedToken`] itself.

pub mod cached;

pub use cached::*;

// self
use crate::_prelude::*;

/// Concurrent map from connection identity to its shared token computation.
#[derive(Debug)]
pub struct TokenCache<K>(Mutex<HashMap<K, CachedToken>>);
impl<K> TokenCache<K>
where
	K: Clone + Eq + Hash,
{
	/// Returns the entry for `key`, inserting the one built by `create` when absent.
	///
	/// `create` runs under the map lock, so it must only wrap a negotiation, not start it.
	pub fn get_or_insert_with<F>(&self, key: &K, create: F) -> CachedToken
	where
		F: FnOnce() -> CachedToken,
	{
		let mut entries = self.0.lock();

		if let Some(existing) = entries.get(key) {
			return existing.clone();
		}

		let token = create();

		entries.insert(key.clone(), token.clone());

		token
	}

	/// Unconditionally installs `token` for `key`, returning the entry it displaced.
	pub fn replace(&self, key: K, token: CachedToken) -> Option<CachedToken> {
		self.0.lock().insert(key, token)
	}

	/// Returns the current entry for `key` without creating one.
	pub fn get(&self, key: &K) -> Option<CachedToken> {
		self.0.lock().get(key).cloned()
	}

	/// Number of connections with an entry.
	pub fn len(&self) -> usize {
		self.0.lock().len()
	}

	/// Returns `true` when no connection has an entry.
	pub fn is_empty(&self) -> bool {
		self.0.lock().is_empty()
	}
}
impl<K> Default for TokenCache<K> {
	fn default() -> Self {
		Self(Mutex::new(HashMap::new()))
	}
}
