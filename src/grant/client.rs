//! Validated OAuth client settings and their builder.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use oauth2::http::HeaderValue;
// self
use crate::{
	_prelude::*,
	auth::{ClientId, IdentifierError, TokenSecret},
};

/// Client identifier used when none is configured.
pub const DEFAULT_CLIENT_ID: &str = "cf";
/// Identification header sent with every token request unless overridden.
pub const DEFAULT_USER_AGENT: &str =
	concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// What to do with a stored refresh token after the token endpoint rejects it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshRejectionPolicy {
	/// Keep the token; the next negotiation tries it again before falling back.
	#[default]
	Retain,
	/// Drop the token so later negotiations go straight to the primary grant.
	Discard,
}

/// Errors raised while constructing a [`ClientConfig`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ClientConfigError {
	/// Client identifier failed validation.
	#[error("Client identifier is invalid.")]
	InvalidClientId(#[from] IdentifierError),
	/// User agent cannot be sent as an HTTP header value.
	#[error("User agent `{value}` is not a valid header value.")]
	InvalidUserAgent {
		/// Rejected user agent.
		value: String,
	},
}

/// OAuth client settings shared by every exchange a provider performs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Client identifier.
	pub client_id: ClientId,
	/// Client secret; empty for public clients.
	pub client_secret: TokenSecret,
	/// Value of the `User-Agent` header.
	pub user_agent: String,
	/// Handling of rejected refresh tokens.
	pub refresh_rejection: RefreshRejectionPolicy,
}
impl ClientConfig {
	/// Creates a new builder seeded with the defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// `Authorization` header value carrying HTTP Basic client credentials.
	pub fn basic_authorization(&self) -> String {
		let credentials = format!("{}:{}", self.client_id, self.client_secret.expose());

		format!("Basic {}", STANDARD.encode(credentials))
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			client_id: ClientId::from_static(DEFAULT_CLIENT_ID),
			client_secret: TokenSecret::default(),
			user_agent: DEFAULT_USER_AGENT.into(),
			refresh_rejection: RefreshRejectionPolicy::default(),
		}
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Client identifier, validated on build.
	pub client_id: String,
	/// Client secret.
	pub client_secret: TokenSecret,
	/// User agent, validated on build.
	pub user_agent: String,
	/// Handling of rejected refresh tokens.
	pub refresh_rejection: RefreshRejectionPolicy,
}
impl ClientConfigBuilder {
	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = client_id.into();

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<TokenSecret>) -> Self {
		self.client_secret = secret.into();

		self
	}

	/// Overrides the `User-Agent` header.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Overrides the refresh rejection policy.
	pub fn refresh_rejection(mut self, policy: RefreshRejectionPolicy) -> Self {
		self.refresh_rejection = policy;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let client_id = ClientId::new(&self.client_id)?;

		if self.user_agent.is_empty() || HeaderValue::from_str(&self.user_agent).is_err() {
			return Err(ClientConfigError::InvalidUserAgent { value: self.user_agent });
		}

		Ok(ClientConfig {
			client_id,
			client_secret: self.client_secret,
			user_agent: self.user_agent,
			refresh_rejection: self.refresh_rejection,
		})
	}
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		Self {
			client_id: DEFAULT_CLIENT_ID.into(),
			client_secret: TokenSecret::default(),
			user_agent: DEFAULT_USER_AGENT.into(),
			refresh_rejection: RefreshRejectionPolicy::default(),
		}
	}
}
