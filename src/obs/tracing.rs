// self
use crate::{_prelude::*, auth::TokenClaims, grant::GrantType};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span wrapping one negotiation.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the primary grant and stage.
	pub fn new(grant: GrantType, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("uaa_token_provider.negotiation", grant = grant.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (grant, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Announces which credential a negotiation is about to use.
pub(crate) fn debug_negotiation_path(grant: GrantType) {
	#[cfg(feature = "tracing")]
	{
		if grant == GrantType::RefreshToken {
			tracing::debug!("negotiating using refresh token");
		} else {
			tracing::debug!(grant = grant.as_str(), "negotiating using grant strategy");
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = grant;
	}
}

pub(crate) fn debug_request(grant: GrantType, uri: &Url) {
	#[cfg(feature = "tracing")]
	tracing::debug!(grant = grant.as_str(), %uri, "POST");
	#[cfg(not(feature = "tracing"))]
	let _ = (grant, uri);
}

pub(crate) fn debug_response(grant: GrantType, uri: &Url, status: u16) {
	#[cfg(feature = "tracing")]
	tracing::debug!(grant = grant.as_str(), %uri, status, "token endpoint responded");
	#[cfg(not(feature = "tracing"))]
	let _ = (grant, uri, status);
}

pub(crate) fn debug_transport_failure(grant: GrantType, error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::debug!(grant = grant.as_str(), %error, "token request did not reach the endpoint");
	#[cfg(not(feature = "tracing"))]
	let _ = (grant, error);
}

/// Logs the unverified lifetime of an issued token; `kind` names the token.
pub(crate) fn debug_claims(kind: &'static str, claims: Option<&TokenClaims>) {
	#[cfg(feature = "tracing")]
	{
		if let Some(claims) = claims {
			tracing::debug!(
				token = kind,
				issued_at = ?claims.issued_at,
				expires_at = ?claims.expires_at,
				"decoded token claims (UTC)"
			);
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, claims);
	}
}
