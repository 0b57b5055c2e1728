//! Public façade handing out cached bearer tokens per connection.
//!
//! [`TokenProvider::get_token`] performs an atomic insert-if-absent into the
//! [`TokenCache`] and awaits the shared [`CachedToken`], so concurrent callers for one
//! connection trigger a single negotiation. [`TokenProvider::invalidate`] swaps in a fresh
//! computation whatever the current entry holds; it never cancels a negotiation that is
//! already running for earlier callers. With a [`Spawner`] configured the replacement starts
//! negotiating right away; otherwise it starts on the first await.

mod metrics;
mod negotiate;

pub use metrics::NegotiationMetrics;

// crates.io
use futures::future::BoxFuture;
// self
use crate::{
	_prelude::*,
	auth::{BearerToken, RefreshToken, TokenSecret},
	cache::{CachedToken, TokenCache, TokenState},
	connection::ConnectionContext,
	grant::{ClientConfig, GrantStrategy},
	http::TokenHttpClient,
	oauth::{TokenEndpoint, TransportErrorMapper},
	store::RefreshStore,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};
use negotiate::Negotiator;

#[cfg(feature = "reqwest")]
/// Provider specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenProvider<K> = TokenProvider<K, ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Runs a detached future to completion.
///
/// A tokio-backed spawner: `Arc::new(|fut: BoxFuture<'static, ()>| drop(tokio::spawn(fut)))`.
pub type Spawner = Arc<dyn Fn(BoxFuture<'static, ()>) + Send + Sync>;

/// Issues, caches, and refreshes bearer tokens for any number of connections.
///
/// Cloning is cheap; clones share the cache, the refresh store, and the transport.
pub struct TokenProvider<K, C, M>
where
	K: ConnectionContext,
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	negotiator: Arc<Negotiator<K, C, M>>,
	cache: Arc<TokenCache<K>>,
	spawner: Option<Spawner>,
}
impl<K, C, M> TokenProvider<K, C, M>
where
	K: ConnectionContext,
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a provider that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		client: ClientConfig,
		strategy: Arc<dyn GrantStrategy>,
		store: Arc<dyn RefreshStore<K>>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let negotiator = Negotiator {
			client,
			strategy,
			store,
			endpoint: TokenEndpoint::new(http_client.into(), mapper.into()),
			metrics: NegotiationMetrics::default(),
		};

		Self { negotiator: Arc::new(negotiator), cache: Default::default(), spawner: None }
	}

	/// Makes [`Self::invalidate`] start the replacement negotiation immediately through
	/// `spawner` instead of waiting for the first await.
	pub fn with_spawner(mut self, spawner: Spawner) -> Self {
		self.spawner = Some(spawner);

		self
	}

	/// Returns the bearer token for `key`, negotiating one if nobody has yet.
	///
	/// A failed negotiation is cached like a successful one: every later call returns the
	/// same error until [`Self::invalidate`] is called for `key`.
	pub async fn get_token(&self, key: &K) -> Result<BearerToken> {
		self.cache.get_or_insert_with(key, || self.fresh_computation(key)).resolve().await
	}

	/// Replaces the cached computation for `key` with a new one and returns it.
	///
	/// With a spawner the replacement starts negotiating at once. Without one it starts
	/// when first awaited, either through the returned handle or through
	/// [`Self::get_token`]. A negotiation already in flight for `key` keeps running and
	/// still resolves for the callers awaiting it.
	pub fn invalidate(&self, key: &K) -> CachedToken {
		let fresh = self.fresh_computation(key);

		self.cache.replace(key.clone(), fresh.clone());

		if let Some(spawn) = &self.spawner {
			let driver = fresh.clone();

			spawn(Box::pin(async move {
				let _ = driver.resolve().await;
			}));
		}

		fresh
	}

	/// Current state of the cached computation for `key`, if there is one.
	pub fn state(&self, key: &K) -> Option<TokenState> {
		self.cache.get(key).map(|token| token.state())
	}

	/// Refresh token the next negotiation for `key` will try first.
	pub async fn refresh_token(&self, key: &K) -> Result<Option<RefreshToken>> {
		Ok(self.negotiator.store.fetch(key).await?)
	}

	/// Stores a refresh token obtained elsewhere so the next negotiation for `key` uses it.
	///
	/// The cached bearer token is left alone; call [`Self::invalidate`] to negotiate with
	/// the seeded token right away.
	pub async fn seed_refresh_token(&self, key: &K, token: impl Into<TokenSecret>) -> Result<()> {
		Ok(self.negotiator.store.save(key, RefreshToken::new(token)).await?)
	}

	/// Client settings used for every exchange.
	pub fn client(&self) -> &ClientConfig {
		&self.negotiator.client
	}

	/// In-process negotiation counters.
	pub fn metrics(&self) -> &NegotiationMetrics {
		&self.negotiator.metrics
	}

	fn fresh_computation(&self, key: &K) -> CachedToken {
		let negotiator = self.negotiator.clone();
		let key = key.clone();

		CachedToken::new(async move { negotiator.negotiate(&key).await })
	}
}
#[cfg(feature = "reqwest")]
impl<K> TokenProvider<K, ReqwestHttpClient, ReqwestTransportErrorMapper>
where
	K: ConnectionContext,
{
	/// Creates a provider backed by a fresh reqwest transport that never follows redirects.
	pub fn new(
		client: ClientConfig,
		strategy: Arc<dyn GrantStrategy>,
		store: Arc<dyn RefreshStore<K>>,
	) -> Result<Self> {
		Ok(Self::with_http_client(
			client,
			strategy,
			store,
			ReqwestHttpClient::try_new()?,
			ReqwestTransportErrorMapper,
		))
	}
}
impl<K, C, M> Clone for TokenProvider<K, C, M>
where
	K: ConnectionContext,
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			negotiator: self.negotiator.clone(),
			cache: self.cache.clone(),
			spawner: self.spawner.clone(),
		}
	}
}
impl<K, C, M> Debug for TokenProvider<K, C, M>
where
	K: ConnectionContext,
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenProvider")
			.field("client", &self.negotiator.client)
			.field("grant", &self.negotiator.strategy.grant_type())
			.field("cached_connections", &self.cache.len())
			.field("eager_invalidation", &self.spawner.is_some())
			.finish()
	}
}
