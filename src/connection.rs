//! Connection identities that key the token cache and resolve the token endpoint.
//!
//! A [`ConnectionContext`] is owned by the caller. The provider only hashes it, compares
//! it, and asks it for the `token_endpoint` root; it never mutates it.

// self
use crate::{
	_prelude::*,
	auth::{ConnectionId, IdentifierError},
	error::ConfigError,
};

/// Well-known root key naming the authorization server's base URL.
pub const TOKEN_ENDPOINT: &str = "token_endpoint";

/// Boxed future returned by [`ConnectionContext::root`].
pub type RootFuture<'a> = Pin<Box<dyn Future<Output = Result<Url>> + 'a + Send>>;

/// Identity of a target API plus the means to locate its authorization server.
///
/// Equality and hashing must be stable for the lifetime of the process: two contexts that
/// compare equal share one cached token and one stored refresh token.
pub trait ConnectionContext
where
	Self: 'static + Clone + Debug + Eq + Hash + Send + Sync,
{
	/// Resolves a well-known root URL such as [`TOKEN_ENDPOINT`].
	fn root<'a>(&'a self, key: &'a str) -> RootFuture<'a>;
}

/// Connection context with a fixed table of roots.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaticConnectionContext {
	/// Connection name.
	pub id: ConnectionId,
	/// Root URLs keyed by well-known name.
	pub roots: BTreeMap<String, Url>,
}
impl StaticConnectionContext {
	/// Creates a context with no roots registered.
	pub fn new(id: impl AsRef<str>) -> Result<Self, IdentifierError> {
		Ok(Self { id: ConnectionId::new(id)?, roots: BTreeMap::new() })
	}

	/// Registers or replaces a root URL.
	pub fn with_root(mut self, key: impl Into<String>, url: Url) -> Self {
		self.roots.insert(key.into(), url);

		self
	}

	/// Registers a root from its string form, validating it.
	pub fn try_with_root(self, key: impl Into<String>, url: &str) -> Result<Self> {
		let key = key.into();
		let parsed =
			Url::parse(url).map_err(|source| ConfigError::InvalidRoot { key: key.clone(), source })?;

		Ok(self.with_root(key, parsed))
	}
}
impl ConnectionContext for StaticConnectionContext {
	fn root<'a>(&'a self, key: &'a str) -> RootFuture<'a> {
		Box::pin(async move {
			self.roots
				.get(key)
				.cloned()
				.ok_or_else(|| ConfigError::UnknownRoot { key: key.to_owned() }.into())
		})
	}
}

/// Appends the `oauth/token` path segments to an authorization server root.
///
/// Segments are percent-encoded by [`Url`]; a trailing slash on the root is tolerated.
pub fn token_uri(root: &Url) -> Result<Url> {
	let mut uri = root.clone();

	uri.path_segments_mut()
		.map_err(|_| ConfigError::CannotBeABase { url: root.to_string() })?
		.pop_if_empty()
		.extend(["oauth", "token"]);

	Ok(uri)
}
