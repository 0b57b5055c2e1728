//! Refresh tokens remembered between negotiations.

// self
use crate::{
	_prelude::*,
	auth::token::{claims::TokenClaims, secret::TokenSecret},
};

/// Most recent refresh token issued for a connection.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken {
	/// Opaque refresh secret.
	pub secret: TokenSecret,
	/// Diagnostic claims, when the token happens to be a decodable JWT.
	pub claims: Option<TokenClaims>,
}
impl RefreshToken {
	/// Wraps a refresh secret, decoding its claims on a best-effort basis.
	pub fn new(secret: impl Into<TokenSecret>) -> Self {
		let secret = secret.into();
		let claims = TokenClaims::parse(secret.expose());

		Self { secret, claims }
	}

	/// Returns the refresh secret. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		self.secret.expose()
	}
}
impl Debug for RefreshToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshToken")
			.field("secret", &self.secret)
			.field("claims", &self.claims)
			.finish()
	}
}
