//! Authorization header values produced by negotiations.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// `"<token_type> <access_token>"`, ready for an `Authorization` header.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BearerToken {
	value: TokenSecret,
	type_len: usize,
}
impl BearerToken {
	/// Composes the header value from the response's `token_type` and `access_token`.
	pub fn new(token_type: &str, access_token: &str) -> Self {
		Self {
			value: TokenSecret::new(format!("{token_type} {access_token}")),
			type_len: token_type.len(),
		}
	}

	/// Returns the full header value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		self.value.expose()
	}

	/// Token type as reported by the token endpoint (usually `bearer`).
	pub fn token_type(&self) -> &str {
		&self.value.expose()[..self.type_len]
	}

	/// Access token without the type prefix.
	pub fn access_token(&self) -> &str {
		&self.value.expose()[self.type_len + 1..]
	}
}
impl Debug for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BearerToken")
			.field("token_type", &self.token_type())
			.field("access_token", &"<redacted>")
			.finish()
	}
}
impl Display for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} <redacted>", self.token_type())
	}
}
