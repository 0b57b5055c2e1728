//! Single-flight OAuth 2.0 bearer token negotiation for UAA-style authorization servers.
//!
//! A [`TokenProvider`](provider::TokenProvider) hands out `"<token_type> <access_token>"`
//! values per connection, negotiating at most once per connection at a time, preferring a
//! stored refresh token over the configured grant, and re-negotiating on demand after a
//! caller observes an expired or revoked token.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod connection;
pub mod error;
pub mod grant;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		connection::StaticConnectionContext,
		grant::{ClientConfig, GrantStrategy},
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{ReqwestTokenProvider, TokenProvider},
		store::{MemoryStore, RefreshStore},
	};

	/// Provider type alias used by reqwest-backed integration tests.
	pub type ReqwestTestProvider = ReqwestTokenProvider<StaticConnectionContext>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`TokenProvider`] backed by an in-memory refresh store and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_provider(
		client: ClientConfig,
		strategy: impl GrantStrategy + 'static,
	) -> (ReqwestTestProvider, Arc<MemoryStore<StaticConnectionContext>>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn RefreshStore<StaticConnectionContext>> = store_backend.clone();
		let strategy: Arc<dyn GrantStrategy> = Arc::new(strategy);
		let provider = TokenProvider::with_http_client(
			client,
			strategy,
			store,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		);

		(provider, store_backend)
	}

	/// Builds a connection context whose token endpoint root points at `root`.
	pub fn test_connection(id: &str, root: &str) -> StaticConnectionContext {
		StaticConnectionContext::new(id)
			.expect("Connection identifier fixture should be valid.")
			.with_root(
				crate::connection::TOKEN_ENDPOINT,
				Url::parse(root).expect("Token endpoint root fixture should parse."),
			)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
