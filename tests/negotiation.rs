// std
use std::{
	collections::{BTreeMap, VecDeque},
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{Arc, Mutex},
	time::Duration,
};
// crates.io
use futures::future::BoxFuture;
// self
use uaa_token_provider::{
	cache::TokenState,
	connection::{StaticConnectionContext, TOKEN_ENDPOINT},
	error::{ConfigError, Error, PayloadError, TransportError},
	grant::{
		ClientConfig, GrantStrategy, GrantType, PasswordGrant, RefreshRejectionPolicy,
		RefreshTokenGrant,
	},
	http::{HttpFuture, TokenHttpClient},
	oauth::{
		TransportErrorMapper,
		oauth2::{HttpClientError, HttpRequest, HttpResponse, http::StatusCode},
	},
	provider::{Spawner, TokenProvider},
	store::{MemoryStore, RefreshStore},
	url::form_urlencoded,
};

type TestProvider = TokenProvider<StaticConnectionContext, ScriptedHttpClient, FakeMapper>;

#[derive(Debug)]
struct FakeTransportError(&'static str);
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Fake transport failed: {}.", self.0)
	}
}
impl StdError for FakeTransportError {}

struct FakeMapper;
impl TransportErrorMapper<FakeTransportError> for FakeMapper {
	fn map_transport_error(
		&self,
		_grant: GrantType,
		error: HttpClientError<FakeTransportError>,
	) -> Error {
		match error {
			HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
			other => TransportError::Other { message: other.to_string() }.into(),
		}
	}
}

enum Reply {
	Json(u16, &'static str),
	Fail(&'static str),
}

#[derive(Clone, Debug)]
struct RecordedRequest {
	uri: String,
	authorization: Option<String>,
	form: BTreeMap<String, String>,
}
impl RecordedRequest {
	fn grant_type(&self) -> &str {
		self.form.get("grant_type").map(String::as_str).unwrap_or_default()
	}
}

/// Transport answering requests from a script, in order, and recording what it was sent.
#[derive(Default)]
struct ScriptedHttpClient {
	replies: Mutex<VecDeque<Reply>>,
	requests: Mutex<Vec<RecordedRequest>>,
	latency: Option<Duration>,
}
impl ScriptedHttpClient {
	fn with_latency(latency: Duration) -> Self {
		Self { latency: Some(latency), ..Default::default() }
	}

	fn reply(&self, status: u16, body: &'static str) -> &Self {
		self.replies
			.lock()
			.expect("Reply script lock poisoned.")
			.push_back(Reply::Json(status, body));

		self
	}

	fn fail(&self, reason: &'static str) -> &Self {
		self.replies.lock().expect("Reply script lock poisoned.").push_back(Reply::Fail(reason));

		self
	}

	fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().expect("Request log lock poisoned.").clone()
	}

	fn grant_types(&self) -> Vec<String> {
		self.requests().iter().map(|request| request.grant_type().to_owned()).collect()
	}
}
impl TokenHttpClient for ScriptedHttpClient {
	type TransportError = FakeTransportError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let recorded = RecordedRequest {
				uri: request.uri().to_string(),
				authorization: request
					.headers()
					.get("authorization")
					.and_then(|value| value.to_str().ok())
					.map(ToOwned::to_owned),
				form: form_urlencoded::parse(request.body()).into_owned().collect(),
			};

			self.requests.lock().expect("Request log lock poisoned.").push(recorded);

			let reply = self
				.replies
				.lock()
				.expect("Reply script lock poisoned.")
				.pop_front()
				.expect("Every request should have a scripted reply.");

			if let Some(latency) = self.latency {
				tokio::time::sleep(latency).await;
			}

			match reply {
				Reply::Json(status, body) => {
					let mut response = HttpResponse::new(body.as_bytes().to_vec());

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Scripted status should be valid.");

					Ok(response)
				},
				Reply::Fail(reason) =>
					Err(HttpClientError::Reqwest(Box::new(FakeTransportError(reason)))),
			}
		})
	}
}

fn connection(id: &str) -> StaticConnectionContext {
	StaticConnectionContext::new(id)
		.expect("Connection identifier fixture should be valid.")
		.try_with_root(TOKEN_ENDPOINT, "https://uaa.example.com")
		.expect("Token endpoint root fixture should parse.")
}

fn build(
	client: ClientConfig,
	strategy: impl GrantStrategy + 'static,
	http: ScriptedHttpClient,
) -> (TestProvider, Arc<MemoryStore<StaticConnectionContext>>, Arc<ScriptedHttpClient>) {
	let store = Arc::new(MemoryStore::default());
	let store_handle: Arc<dyn RefreshStore<StaticConnectionContext>> = store.clone();
	let http = Arc::new(http);
	let provider = TokenProvider::with_http_client(
		client,
		Arc::new(strategy),
		store_handle,
		http.clone(),
		FakeMapper,
	);

	(provider, store, http)
}

fn password_provider(
	http: ScriptedHttpClient,
) -> (TestProvider, Arc<MemoryStore<StaticConnectionContext>>, Arc<ScriptedHttpClient>) {
	build(ClientConfig::default(), PasswordGrant::new("admin", "admin-password"), http)
}

fn stored(
	store: &MemoryStore<StaticConnectionContext>,
	key: &StaticConnectionContext,
) -> Option<String> {
	store.get(key).map(|token| token.expose().to_owned())
}

#[tokio::test]
async fn primary_grant_issues_token_and_remembers_refresh_token() {
	let (provider, store, http) = password_provider(ScriptedHttpClient::default());
	let x = connection("x");

	http.reply(200, r#"{"access_token":"A1","token_type":"bearer","refresh_token":"R1"}"#);

	let token = provider.get_token(&x).await.expect("Primary grant should succeed.");

	assert_eq!(token.expose(), "bearer A1");
	assert_eq!(stored(&store, &x).as_deref(), Some("R1"));

	let requests = http.requests();

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].uri, "https://uaa.example.com/oauth/token");
	assert_eq!(requests[0].authorization.as_deref(), Some("Basic Y2Y6"));
	assert_eq!(requests[0].grant_type(), "password");
	assert_eq!(requests[0].form.get("username").map(String::as_str), Some("admin"));
	assert_eq!(requests[0].form.get("password").map(String::as_str), Some("admin-password"));
	assert_eq!(requests[0].form.get("client_id").map(String::as_str), Some("cf"));
	assert_eq!(requests[0].form.get("client_secret").map(String::as_str), Some(""));
}

#[tokio::test]
async fn rejected_refresh_falls_back_to_primary_and_keeps_refresh_token() {
	let (provider, store, http) = password_provider(ScriptedHttpClient::default());
	let x = connection("x");

	http.reply(200, r#"{"access_token":"A1","token_type":"bearer","refresh_token":"R1"}"#)
		.reply(401, r#"{"error":"invalid_token","error_description":"Refresh token expired"}"#)
		.reply(200, r#"{"access_token":"A2","token_type":"bearer"}"#);

	let first = provider.get_token(&x).await.expect("First negotiation should succeed.");

	assert_eq!(first.expose(), "bearer A1");

	provider.invalidate(&x);

	let token = provider.get_token(&x).await.expect("Fallback negotiation should succeed.");

	assert_eq!(token.expose(), "bearer A2");
	assert_eq!(stored(&store, &x).as_deref(), Some("R1"));
	assert_eq!(http.grant_types(), ["password", "refresh_token", "password"]);
	assert_eq!(http.requests()[1].form.get("refresh_token").map(String::as_str), Some("R1"));
	assert_eq!(provider.metrics().refresh_rejections(), 1);
	assert_eq!(provider.metrics().primary_exchanges(), 2);
	assert_eq!(provider.metrics().successes(), 2);
	assert_eq!(provider.metrics().refresh_successes(), 0);
}

#[tokio::test]
async fn stored_refresh_token_is_preferred_over_primary_grant() {
	let (provider, store, http) = password_provider(ScriptedHttpClient::default());
	let x = connection("x");

	provider.seed_refresh_token(&x, "R1").await.expect("Seeding the store should succeed.");
	http.reply(200, r#"{"access_token":"A3","token_type":"bearer","refresh_token":"R2"}"#);

	let token = provider.get_token(&x).await.expect("Refresh negotiation should succeed.");

	assert_eq!(token.expose(), "bearer A3");
	assert_eq!(http.grant_types(), ["refresh_token"]);
	assert_eq!(stored(&store, &x).as_deref(), Some("R2"));
	assert_eq!(
		provider
			.refresh_token(&x)
			.await
			.expect("Store lookup should succeed.")
			.map(|token| token.expose().to_owned())
			.as_deref(),
		Some("R2")
	);
	assert_eq!(provider.metrics().primary_exchanges(), 0);
	assert_eq!(provider.metrics().refresh_successes(), 1);
}

#[tokio::test]
async fn non_unauthorized_refresh_failure_propagates_and_stays_cached() {
	let (provider, store, http) = password_provider(ScriptedHttpClient::default());
	let x = connection("x");

	provider.seed_refresh_token(&x, "R1").await.expect("Seeding the store should succeed.");
	http.reply(500, r#"{"error":"server_error"}"#)
		.reply(200, r#"{"access_token":"A4","token_type":"bearer"}"#);

	let first = provider.get_token(&x).await.expect_err("A 500 on refresh should propagate.");
	let second = provider.get_token(&x).await.expect_err("The failure should stay cached.");

	assert_eq!(first.status(), Some(500));
	assert_eq!(second.status(), Some(500));
	assert_eq!(http.grant_types(), ["refresh_token"]);
	assert!(matches!(provider.state(&x), Some(TokenState::Failed(_))));
	assert_eq!(stored(&store, &x).as_deref(), Some("R1"));

	provider.invalidate(&x);

	let recovered = provider.get_token(&x).await.expect("Re-negotiation should succeed.");

	assert_eq!(recovered.expose(), "bearer A4");
	assert_eq!(http.grant_types(), ["refresh_token", "refresh_token"]);
	assert_eq!(provider.metrics().failures(), 1);
	assert_eq!(provider.metrics().successes(), 1);
}

#[tokio::test]
async fn discard_policy_forgets_rejected_refresh_token() {
	let client = ClientConfig::builder()
		.refresh_rejection(RefreshRejectionPolicy::Discard)
		.build()
		.expect("Client fixture should be valid.");
	let (provider, store, http) =
		build(client, PasswordGrant::new("admin", "admin-password"), ScriptedHttpClient::default());
	let x = connection("x");

	provider.seed_refresh_token(&x, "R1").await.expect("Seeding the store should succeed.");
	http.reply(401, r#"{"error":"invalid_token"}"#)
		.reply(200, r#"{"access_token":"A5","token_type":"bearer"}"#);

	let token = provider.get_token(&x).await.expect("Fallback should succeed.");

	assert_eq!(token.expose(), "bearer A5");
	assert_eq!(stored(&store, &x), None);
	assert_eq!(http.grant_types(), ["refresh_token", "password"]);
}

#[tokio::test]
async fn concurrent_callers_share_one_negotiation() {
	let (provider, _store, http) =
		password_provider(ScriptedHttpClient::with_latency(Duration::from_millis(20)));
	let x = connection("x");
	let y = connection("y");

	http.reply(200, r#"{"access_token":"A1","token_type":"bearer"}"#)
		.reply(200, r#"{"access_token":"B1","token_type":"bearer"}"#);

	let (first, second, third, other) = tokio::join!(
		provider.get_token(&x),
		provider.get_token(&x),
		provider.get_token(&x),
		provider.get_token(&y),
	);

	for result in [first, second, third] {
		assert_eq!(result.expect("Shared negotiation should succeed.").expose(), "bearer A1");
	}

	assert_eq!(other.expect("Independent negotiation should succeed.").expose(), "bearer B1");
	assert_eq!(http.requests().len(), 2);
	assert_eq!(provider.metrics().attempts(), 2);
}

#[tokio::test]
async fn timed_out_caller_does_not_trigger_a_second_exchange() {
	let (provider, _store, http) =
		password_provider(ScriptedHttpClient::with_latency(Duration::from_millis(30)));
	let x = connection("x");

	http.reply(200, r#"{"access_token":"A1","token_type":"bearer"}"#)
		.reply(200, r#"{"access_token":"A2","token_type":"bearer"}"#);

	let (abandoned, second, third) = tokio::join!(
		tokio::time::timeout(Duration::from_millis(5), provider.get_token(&x)),
		provider.get_token(&x),
		provider.get_token(&x),
	);

	assert!(abandoned.is_err());

	for result in [second, third] {
		assert_eq!(result.expect("Remaining callers should succeed.").expose(), "bearer A1");
	}

	assert_eq!(http.requests().len(), 1);
	assert_eq!(provider.metrics().attempts(), 1);
}

#[tokio::test]
async fn concurrent_callers_share_one_failure() {
	let (provider, _store, http) =
		password_provider(ScriptedHttpClient::with_latency(Duration::from_millis(20)));
	let x = connection("x");

	http.reply(503, r#"{"error":"temporarily_unavailable"}"#);

	let (first, second, third) =
		tokio::join!(provider.get_token(&x), provider.get_token(&x), provider.get_token(&x));

	for result in [first, second, third] {
		assert_eq!(result.expect_err("Shared failure should surface.").status(), Some(503));
	}

	assert_eq!(http.requests().len(), 1);
	assert_eq!(provider.metrics().failures(), 1);
}

#[tokio::test]
async fn invalidation_starts_a_new_negotiation_without_cancelling_the_old_one() {
	let (provider, _store, http) =
		password_provider(ScriptedHttpClient::with_latency(Duration::from_millis(20)));
	let x = connection("x");

	http.reply(200, r#"{"access_token":"A1","token_type":"bearer"}"#)
		.reply(200, r#"{"access_token":"A2","token_type":"bearer"}"#);

	let (in_flight, after_invalidation) = tokio::join!(provider.get_token(&x), async {
		tokio::time::sleep(Duration::from_millis(5)).await;

		let fresh = provider.invalidate(&x);

		assert!(fresh.state().is_pending());

		provider.get_token(&x).await
	});

	assert_eq!(in_flight.expect("In-flight negotiation should finish.").expose(), "bearer A1");
	assert_eq!(
		after_invalidation.expect("New negotiation should succeed.").expose(),
		"bearer A2"
	);
	assert!(matches!(
		provider.state(&x),
		Some(TokenState::Resolved(token)) if token.access_token() == "A2"
	));
}

#[tokio::test]
async fn invalidate_is_lazy_until_awaited() {
	let (provider, _store, http) = password_provider(ScriptedHttpClient::default());
	let x = connection("x");

	http.reply(200, r#"{"access_token":"A1","token_type":"bearer"}"#);

	let pending = provider.invalidate(&x);

	assert!(http.requests().is_empty());
	assert!(provider.state(&x).is_some_and(|state| state.is_pending()));
	let driven = pending.resolve().await.expect("Handle should drive negotiation.");
	let cached = provider.get_token(&x).await.expect("Cached token should resolve.");

	assert_eq!(driven.expose(), "bearer A1");
	assert_eq!(cached, driven);
	assert_eq!(http.requests().len(), 1);
}

#[tokio::test]
async fn malformed_payloads_and_transport_failures_surface_unchanged() {
	let (provider, _store, http) = password_provider(ScriptedHttpClient::default());
	let x = connection("x");
	let y = connection("y");

	http.reply(200, r#"{"access_token":"A1"}"#).fail("connection reset");

	let malformed = provider.get_token(&x).await.expect_err("Missing token_type should fail.");
	let transport = provider.get_token(&y).await.expect_err("Transport failure should surface.");

	assert!(matches!(
		malformed,
		Error::MalformedPayload(PayloadError::MissingField { field: "token_type" })
	));
	assert!(matches!(transport, Error::Transport(TransportError::Network { .. })));
}

#[tokio::test]
async fn missing_token_endpoint_root_fails_without_requests() {
	let (provider, _store, http) = password_provider(ScriptedHttpClient::default());
	let bare = StaticConnectionContext::new("bare").expect("Connection fixture should be valid.");
	let err = provider.get_token(&bare).await.expect_err("Missing root should fail.");

	assert!(matches!(err, Error::Config(ConfigError::UnknownRoot { .. })));
	assert!(http.requests().is_empty());
}

#[tokio::test]
async fn refresh_token_grant_uses_supplied_token_until_a_newer_one_is_stored() {
	let (provider, store, http) =
		build(ClientConfig::default(), RefreshTokenGrant::new("R0"), ScriptedHttpClient::default());
	let x = connection("x");

	http.reply(200, r#"{"access_token":"A1","token_type":"bearer","refresh_token":"R1"}"#)
		.reply(200, r#"{"access_token":"A2","token_type":"bearer"}"#);

	provider.get_token(&x).await.expect("Primary refresh grant should succeed.");
	provider.invalidate(&x);
	provider.get_token(&x).await.expect("Stored refresh token should be used.");

	let requests = http.requests();

	assert_eq!(requests[0].form.get("refresh_token").map(String::as_str), Some("R0"));
	assert_eq!(requests[1].form.get("refresh_token").map(String::as_str), Some("R1"));
	assert_eq!(stored(&store, &x).as_deref(), Some("R1"));
}

#[tokio::test]
async fn spawner_starts_invalidated_negotiation_without_an_await() {
	let (provider, _store, http) = password_provider(ScriptedHttpClient::default());
	let spawner: Spawner = Arc::new(|driver: BoxFuture<'static, ()>| {
		tokio::spawn(driver);
	});
	let provider = provider.with_spawner(spawner);
	let x = connection("x");

	http.reply(200, r#"{"access_token":"A1","token_type":"bearer"}"#);

	let _handle = provider.invalidate(&x);

	tokio::time::sleep(Duration::from_millis(20)).await;

	assert_eq!(http.requests().len(), 1);
	assert!(matches!(
		provider.state(&x),
		Some(TokenState::Resolved(token)) if token.access_token() == "A1"
	));
}
