//! Grant strategy hooks that turn a seeded request into a concrete primary grant.
//!
//! The negotiator seeds every [`GrantRequest`] with the client credentials and the
//! strategy's [`GrantType`]; a strategy only appends the grant-specific fields. Built-in
//! strategies cover the grants UAA-style servers accept from command-line and service
//! clients.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	grant::{GrantRequest, GrantType},
};

/// Capability supplying the primary (non-refresh) grant of a provider.
///
/// Implementors are required to be `Send + Sync` and work on crate-owned data only, so
/// strategies never depend on an HTTP client.
pub trait GrantStrategy: Send + Sync {
	/// Grant type written into `grant_type` before [`Self::build_primary_grant`] runs.
	fn grant_type(&self) -> GrantType;

	/// Appends the grant-specific form fields.
	fn build_primary_grant(&self, request: &mut GrantRequest);
}

/// `grant_type=password` with a username and password.
#[derive(Clone, Debug)]
pub struct PasswordGrant {
	/// Resource owner username.
	pub username: String,
	/// Resource owner password.
	pub password: TokenSecret,
	/// Optional identity-provider hint (`login_hint`), e.g. `{"origin":"ldap"}`.
	pub login_hint: Option<String>,
}
impl PasswordGrant {
	/// Creates a password grant without a login hint.
	pub fn new(username: impl Into<String>, password: impl Into<TokenSecret>) -> Self {
		Self { username: username.into(), password: password.into(), login_hint: None }
	}

	/// Routes the login to a specific identity provider origin.
	pub fn with_origin(mut self, origin: &str) -> Self {
		self.login_hint = Some(serde_json::json!({ "origin": origin }).to_string());

		self
	}
}
impl GrantStrategy for PasswordGrant {
	fn grant_type(&self) -> GrantType {
		GrantType::Password
	}

	fn build_primary_grant(&self, request: &mut GrantRequest) {
		request
			.insert("username", self.username.as_str())
			.insert("password", self.password.expose());

		if let Some(hint) = &self.login_hint {
			request.insert("login_hint", hint.as_str());
		}
	}
}

/// `grant_type=client_credentials`; the client credentials already seeded are sufficient.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientCredentialsGrant;
impl GrantStrategy for ClientCredentialsGrant {
	fn grant_type(&self) -> GrantType {
		GrantType::ClientCredentials
	}

	fn build_primary_grant(&self, _request: &mut GrantRequest) {}
}

/// Single sign-on through a one-time passcode obtained from the login server.
#[derive(Clone, Debug)]
pub struct OneTimePasscodeGrant {
	/// Passcode shown by the login server's `/passcode` page.
	pub passcode: TokenSecret,
}
impl OneTimePasscodeGrant {
	/// Creates a passcode grant.
	pub fn new(passcode: impl Into<TokenSecret>) -> Self {
		Self { passcode: passcode.into() }
	}
}
impl GrantStrategy for OneTimePasscodeGrant {
	fn grant_type(&self) -> GrantType {
		GrantType::Password
	}

	fn build_primary_grant(&self, request: &mut GrantRequest) {
		request.insert("passcode", self.passcode.expose());
	}
}

/// JWT bearer assertion grant (RFC 7523).
#[derive(Clone, Debug)]
pub struct AssertionGrant {
	/// Signed assertion presented to the token endpoint.
	pub assertion: TokenSecret,
}
impl AssertionGrant {
	/// Creates an assertion grant.
	pub fn new(assertion: impl Into<TokenSecret>) -> Self {
		Self { assertion: assertion.into() }
	}
}
impl GrantStrategy for AssertionGrant {
	fn grant_type(&self) -> GrantType {
		GrantType::JwtBearer
	}

	fn build_primary_grant(&self, request: &mut GrantRequest) {
		request.insert("assertion", self.assertion.expose());
	}
}

/// Uses a refresh token obtained out of band (e.g. from a CLI config file) as the primary
/// grant. Once the server issues a newer refresh token the stored one takes precedence.
#[derive(Clone, Debug)]
pub struct RefreshTokenGrant {
	/// Caller-supplied refresh token.
	pub refresh_token: TokenSecret,
}
impl RefreshTokenGrant {
	/// Creates a refresh-token primary grant.
	pub fn new(refresh_token: impl Into<TokenSecret>) -> Self {
		Self { refresh_token: refresh_token.into() }
	}
}
impl GrantStrategy for RefreshTokenGrant {
	fn grant_type(&self) -> GrantType {
		GrantType::RefreshToken
	}

	fn build_primary_grant(&self, request: &mut GrantRequest) {
		request.insert("refresh_token", self.refresh_token.expose());
	}
}
