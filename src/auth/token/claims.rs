//! Best-effort JWT claim decoding used purely for diagnostics.
//!
//! Signatures are never verified and nothing here feeds back into negotiation; a token
//! that does not look like a JWT simply yields `None`.

// crates.io
use jsonwebtoken::dangerous::insecure_decode;
// self
use crate::_prelude::*;

/// Issued-at and expiry instants read from a token's claims segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenClaims {
	/// `iat` claim.
	pub issued_at: Option<OffsetDateTime>,
	/// `exp` claim.
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenClaims {
	/// Decodes the claims of a compact JWS without verifying it.
	///
	/// Returns `None` for anything that is not a well-formed JWT with a JSON object
	/// payload, or whose payload carries neither `iat` nor `exp`.
	pub fn parse(token: &str) -> Option<Self> {
		#[derive(Deserialize)]
		struct RawClaims {
			iat: Option<i64>,
			exp: Option<i64>,
		}

		let raw = insecure_decode::<RawClaims>(token).ok()?.claims;
		let claims = Self {
			issued_at: raw.iat.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok()),
			expires_at: raw.exp.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok()),
		};

		if claims.issued_at.is_none() && claims.expires_at.is_none() { None } else { Some(claims) }
	}
}

#[cfg(test)]
pub(crate) fn encode_test_jwt(claims: &str) -> String {
	use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

	format!(
		"{}.{}.signature",
		URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
		URL_SAFE_NO_PAD.encode(claims)
	)
}
