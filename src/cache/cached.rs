//! Shared, memoized negotiation result.

// crates.io
use futures::{
	FutureExt,
	future::{BoxFuture, Shared},
};
// self
use crate::{_prelude::*, auth::BearerToken};

/// Boxed negotiation future shared by every observer of a [`CachedToken`].
pub type NegotiationFuture = BoxFuture<'static, Result<BearerToken>>;

/// Observable state of a [`CachedToken`].
#[derive(Clone, Debug)]
pub enum TokenState {
	/// No result yet; either nobody awaited the token or the negotiation is in flight.
	Pending,
	/// Negotiation produced a bearer token.
	Resolved(BearerToken),
	/// Negotiation failed; the failure is replayed to every observer until invalidated.
	Failed(Error),
}
impl TokenState {
	/// Returns `true` while no result is available.
	pub fn is_pending(&self) -> bool {
		matches!(self, Self::Pending)
	}
}

/// Single-producer, multi-consumer token computation stored in the cache.
///
/// The negotiation starts when the first caller awaits [`CachedToken::resolve`]. Every
/// caller polls the same shared future, so dropping one of them (a timeout, say) leaves
/// the exchange running for the rest, and a later caller picks it up where it stopped.
#[derive(Clone)]
pub struct CachedToken(Shared<NegotiationFuture>);
impl CachedToken {
	/// Wraps a negotiation without starting it.
	pub fn new<F>(negotiation: F) -> Self
	where
		F: 'static + Future<Output = Result<BearerToken>> + Send,
	{
		Self(negotiation.boxed().shared())
	}

	/// Creates an already-resolved token; useful for seeding and tests.
	pub fn resolved(token: BearerToken) -> Self {
		let shared = futures::future::ready(Ok(token)).boxed().shared();

		// A ready future completes on its first poll, which stores the output.
		let _ = shared.clone().now_or_never();

		Self(shared)
	}

	/// Awaits the shared result, driving the negotiation alongside any other waiter.
	pub async fn resolve(&self) -> Result<BearerToken> {
		self.0.clone().await
	}

	/// Snapshot of the current state without waiting.
	pub fn state(&self) -> TokenState {
		match self.0.peek() {
			None => TokenState::Pending,
			Some(Ok(token)) => TokenState::Resolved(token.clone()),
			Some(Err(e)) => TokenState::Failed(e.clone()),
		}
	}

	/// Returns `true` if both handles share the same computation.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		self.0.ptr_eq(&other.0)
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CachedToken").field(&self.state()).finish()
	}
}
