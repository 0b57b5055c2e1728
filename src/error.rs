//! Provider-level error types shared across negotiation, transport, and stores.
//!
//! Every error is `Clone` because a failed negotiation is cached and handed to each
//! caller observing the same [`CachedToken`](crate::cache::CachedToken). Foreign sources
//! that are not `Clone` themselves are kept behind an [`Arc`].

// self
use crate::_prelude::*;

/// Provider-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Refresh store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint answered with a non-success status.
	#[error(transparent)]
	TokenEndpoint(#[from] TokenEndpointError),
	/// Token endpoint answered successfully but the payload is unusable.
	#[error(transparent)]
	MalformedPayload(#[from] PayloadError),
}
impl Error {
	/// HTTP status reported by the token endpoint, when the failure carries one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::TokenEndpoint(e) => Some(e.status),
			Self::MalformedPayload(PayloadError::Json { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when the token endpoint rejected the request with HTTP 401.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::TokenEndpoint(e) if e.is_unauthorized())
	}
}

/// Configuration and validation failures.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// HTTP request construction failed.
	#[error("Token request could not be constructed.")]
	HttpRequest {
		/// Underlying `http` builder failure.
		#[source]
		source: Arc<oauth2::http::Error>,
	},
	/// Connection context has no root registered under the requested key.
	#[error("Connection context does not define the `{key}` root.")]
	UnknownRoot {
		/// Well-known root key, e.g. `token_endpoint`.
		key: String,
	},
	/// A root URL cannot be parsed.
	#[error("Root `{key}` is not a valid URL.")]
	InvalidRoot {
		/// Well-known root key.
		key: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A root URL cannot carry path segments (e.g. `mailto:`).
	#[error("Root `{url}` cannot be extended with the token path.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
impl From<oauth2::http::Error> for ConfigError {
	fn from(e: oauth2::http::Error) -> Self {
		Self::HttpRequest { source: Arc::new(e) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io {
		/// IO failure.
		#[source]
		source: Arc<std::io::Error>,
	},
	/// Transport failed without a structured error.
	#[error("HTTP client error occurred while calling the token endpoint: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Arc::new(src) }
	}
}
impl From<std::io::Error> for TransportError {
	fn from(e: std::io::Error) -> Self {
		Self::Io { source: Arc::new(e) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Structured error returned by the token endpoint for a non-2xx response.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Token endpoint responded with HTTP {status}: {}.", self.summary())]
pub struct TokenEndpointError {
	/// HTTP status code.
	pub status: u16,
	/// OAuth `error` code, when the body carried one.
	pub error: Option<String>,
	/// OAuth `error_description`, when the body carried one.
	pub description: Option<String>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl TokenEndpointError {
	/// Creates an error for the given status without payload details.
	pub fn new(status: u16) -> Self {
		Self { status, error: None, description: None, retry_after: None }
	}

	/// Returns `true` for HTTP 401, the only status that triggers refresh fallback.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	fn summary(&self) -> &str {
		self.description.as_deref().or(self.error.as_deref()).unwrap_or("no error details")
	}
}

/// Successful token endpoint response that cannot be turned into a bearer token.
#[derive(Clone, Debug, ThisError)]
pub enum PayloadError {
	/// Body is not a JSON object.
	#[error("Token endpoint returned malformed JSON.")]
	Json {
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// A required field is absent or not a string.
	#[error("Token endpoint response is missing the `{field}` field.")]
	MissingField {
		/// Field name.
		field: &'static str,
	},
}
