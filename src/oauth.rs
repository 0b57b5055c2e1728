//! Token endpoint exchanges: request decoration, dispatch, and response decoding.

pub use oauth2;

// crates.io
use oauth2::{
	HttpClientError, HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
	},
};
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{BearerToken, RefreshToken},
	error::{ConfigError, PayloadError, TokenEndpointError, TransportError},
	grant::{ClientConfig, GrantRequest, GrantType},
	http::{ResponseMetadata, TokenHttpClient},
	obs,
};

const APPLICATION_JSON: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Maps HTTP transport failures into provider [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a provider error.
	fn map_transport_error(&self, grant: GrantType, error: HttpClientError<E>) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, grant: GrantType, err: HttpClientError<ReqwestError>) -> Error {
		let error = match err {
			HttpClientError::Reqwest(inner) if inner.is_builder() =>
				ConfigError::from(*inner).into(),
			HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::from(inner).into(),
			HttpClientError::Other(message) => TransportError::Other { message }.into(),
			_ => TransportError::Other { message: "unrecognized transport failure".into() }.into(),
		};

		obs::debug_transport_failure(grant, &error);

		error
	}
}

/// Tokens extracted from one successful exchange.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Header value composed from `token_type` and `access_token`.
	pub bearer: BearerToken,
	/// Refresh token issued alongside the access token, if any.
	pub refresh_token: Option<RefreshToken>,
}

/// Sends grant requests to a token endpoint over a caller-supplied transport.
pub(crate) struct TokenEndpoint<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> TokenEndpoint<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(http_client: Arc<C>, error_mapper: Arc<M>) -> Self {
		Self { http_client, error_mapper }
	}

	/// Performs one exchange; non-2xx answers surface as [`TokenEndpointError`].
	pub(crate) async fn exchange(
		&self,
		client: &ClientConfig,
		token_uri: &Url,
		grant: &GrantRequest,
	) -> Result<TokenGrant> {
		let request = build_token_request(client, token_uri, grant)?;

		obs::debug_request(grant.grant_type(), token_uri);

		let response = self
			.http_client
			.execute(request)
			.await
			.map_err(|e| self.error_mapper.map_transport_error(grant.grant_type(), e))?;

		obs::debug_response(grant.grant_type(), token_uri, response.status().as_u16());

		parse_token_response(&response)
	}
}

/// Builds the `POST` for `grant` with the fixed header set and a form body.
pub(crate) fn build_token_request(
	client: &ClientConfig,
	token_uri: &Url,
	grant: &GrantRequest,
) -> Result<HttpRequest> {
	let request = Request::builder()
		.method(Method::POST)
		.uri(token_uri.as_str())
		.header(ACCEPT, APPLICATION_JSON)
		.header(CONTENT_TYPE, FORM_URLENCODED)
		.header(AUTHORIZATION, client.basic_authorization())
		.header(USER_AGENT, client.user_agent.as_str())
		.body(grant.encode().into_bytes())
		.map_err(ConfigError::from)?;

	Ok(request)
}

/// Decodes a token endpoint response into bearer and refresh tokens.
///
/// The body is read as a JSON object whatever the status. Error statuses keep whatever
/// `error` and `error_description` the body carries; a non-JSON error body still yields
/// the status.
pub(crate) fn parse_token_response(response: &HttpResponse) -> Result<TokenGrant> {
	let meta = ResponseMetadata::from_response(response);
	let status = response.status().as_u16();
	let payload = decode_payload(response.body(), status);

	if !response.status().is_success() {
		let payload = payload.unwrap_or_default();

		return Err(TokenEndpointError {
			status,
			error: string_field(&payload, "error").map(ToOwned::to_owned),
			description: string_field(&payload, "error_description").map(ToOwned::to_owned),
			retry_after: meta.retry_after,
		}
		.into());
	}

	let payload = payload?;
	let access_token = required_field(&payload, "access_token")?;
	let token_type = required_field(&payload, "token_type")?;
	let refresh_token = string_field(&payload, "refresh_token").map(RefreshToken::new);

	Ok(TokenGrant { bearer: BearerToken::new(token_type, access_token), refresh_token })
}

fn decode_payload(body: &[u8], status: u16) -> Result<Map<String, Value>, PayloadError> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|e| PayloadError::Json { source: Arc::new(e), status })
}

fn string_field<'a>(payload: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
	payload.get(field).and_then(Value::as_str)
}

fn required_field<'a>(
	payload: &'a Map<String, Value>,
	field: &'static str,
) -> Result<&'a str, PayloadError> {
	string_field(payload, field).ok_or(PayloadError::MissingField { field })
}
