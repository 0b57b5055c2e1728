//! Refresh-then-primary negotiation for one connection.
//!
//! A negotiation first tries the refresh token remembered for the connection. Only an
//! HTTP 401 from that exchange hands over to the configured grant strategy; every other
//! refresh failure is the negotiation's failure. Whichever exchange succeeds, a
//! `refresh_token` in its response replaces the stored one.

// self
use crate::{
	_prelude::*,
	auth::{BearerToken, RefreshToken, TokenClaims},
	connection::{self, ConnectionContext, TOKEN_ENDPOINT},
	grant::{ClientConfig, GrantRequest, GrantStrategy, GrantType, RefreshRejectionPolicy},
	http::TokenHttpClient,
	oauth::{TokenEndpoint, TokenGrant, TransportErrorMapper},
	obs::{self, FlowOutcome, FlowSpan},
	provider::NegotiationMetrics,
	store::RefreshStore,
};

/// What a failed refresh exchange means for the rest of the negotiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RefreshDisposition {
	/// The refresh token was rejected; use the primary grant instead.
	FallBack,
	/// Surface the failure unchanged.
	Propagate,
}
impl RefreshDisposition {
	pub(crate) fn classify(error: &Error) -> Self {
		if error.is_unauthorized() { Self::FallBack } else { Self::Propagate }
	}
}

pub(crate) struct Negotiator<K, C, M>
where
	K: ConnectionContext,
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) client: ClientConfig,
	pub(crate) strategy: Arc<dyn GrantStrategy>,
	pub(crate) store: Arc<dyn RefreshStore<K>>,
	pub(crate) endpoint: TokenEndpoint<C, M>,
	pub(crate) metrics: NegotiationMetrics,
}
impl<K, C, M> Negotiator<K, C, M>
where
	K: ConnectionContext,
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Runs one full negotiation for `key`.
	///
	/// The outcome is labeled with the grant of the last exchange attempted, so a token
	/// obtained through the stored refresh token counts against `refresh_token`.
	pub(crate) async fn negotiate(&self, key: &K) -> Result<BearerToken> {
		let span = FlowSpan::new(self.strategy.grant_type(), "negotiate");
		let mut last_grant = self.strategy.grant_type();

		self.metrics.record_attempt();

		let result = span.instrument(self.run(key, &mut last_grant)).await;

		match &result {
			Ok(_) => {
				self.metrics.record_success();

				if last_grant == GrantType::RefreshToken {
					self.metrics.record_refresh_success();
				}

				obs::record_flow_outcome(last_grant, FlowOutcome::Success);
			},
			Err(_) => {
				self.metrics.record_failure();
				obs::record_flow_outcome(last_grant, FlowOutcome::Failure);
			},
		}

		result
	}

	async fn run(&self, key: &K, last_grant: &mut GrantType) -> Result<BearerToken> {
		let token_uri = connection::token_uri(&key.root(TOKEN_ENDPOINT).await?)?;
		let refreshed = match self.store.fetch(key).await? {
			Some(refresh_token) => {
				*last_grant = GrantType::RefreshToken;

				self.refresh(key, &token_uri, &refresh_token).await?
			},
			None => None,
		};
		let grant = match refreshed {
			Some(grant) => grant,
			None => {
				*last_grant = self.strategy.grant_type();

				self.primary(&token_uri).await?
			},
		};

		self.accept(key, grant).await
	}

	/// Returns `Ok(None)` when the refresh token was rejected and the primary grant must run.
	async fn refresh(
		&self,
		key: &K,
		token_uri: &Url,
		refresh_token: &RefreshToken,
	) -> Result<Option<TokenGrant>> {
		obs::debug_negotiation_path(GrantType::RefreshToken);
		obs::record_flow_outcome(GrantType::RefreshToken, FlowOutcome::Attempt);
		self.metrics.record_refresh_attempt();

		let request = GrantRequest::refresh(&self.client, refresh_token);
		let error = match self.endpoint.exchange(&self.client, token_uri, &request).await {
			Ok(grant) => return Ok(Some(grant)),
			Err(e) => e,
		};

		match RefreshDisposition::classify(&error) {
			RefreshDisposition::FallBack => {
				obs::record_flow_outcome(GrantType::RefreshToken, FlowOutcome::Fallback);
				self.metrics.record_refresh_rejection();

				if self.client.refresh_rejection == RefreshRejectionPolicy::Discard {
					self.store.remove(key).await?;
				}

				Ok(None)
			},
			RefreshDisposition::Propagate => Err(error),
		}
	}

	async fn primary(&self, token_uri: &Url) -> Result<TokenGrant> {
		let grant_type = self.strategy.grant_type();

		obs::debug_negotiation_path(grant_type);
		obs::record_flow_outcome(grant_type, FlowOutcome::Attempt);
		self.metrics.record_primary_exchange();

		let mut request = GrantRequest::new(&self.client, grant_type);

		self.strategy.build_primary_grant(&mut request);

		self.endpoint.exchange(&self.client, token_uri, &request).await
	}

	async fn accept(&self, key: &K, grant: TokenGrant) -> Result<BearerToken> {
		let TokenGrant { bearer, refresh_token } = grant;

		obs::debug_claims("access", TokenClaims::parse(bearer.access_token()).as_ref());

		if let Some(refresh_token) = refresh_token {
			obs::debug_claims("refresh", refresh_token.claims.as_ref());

			self.store.save(key, refresh_token).await?;
		}

		Ok(bearer)
	}
}
