//! Form bodies for individual token exchanges.

// crates.io
use url::form_urlencoded::Serializer;
// self
use crate::{_prelude::*, auth::RefreshToken, grant::ClientConfig};

/// Form fields that are never printed by [`GrantRequest`]'s `Debug` implementation.
const SENSITIVE_FIELDS: [&str; 5] =
	["client_secret", "password", "passcode", "refresh_token", "assertion"];

/// OAuth 2.0 grant types understood by the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Resource Owner Password Credentials grant (also used for one-time passcodes).
	Password,
	/// Client Credentials grant for app-only tokens.
	ClientCredentials,
	/// Refresh Token grant.
	RefreshToken,
	/// JWT bearer assertion grant (RFC 7523).
	JwtBearer,
}
impl GrantType {
	/// Returns the wire identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::Password => "password",
			GrantType::ClientCredentials => "client_credentials",
			GrantType::RefreshToken => "refresh_token",
			GrantType::JwtBearer => "urn:ietf:params:oauth:grant-type:jwt-bearer",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Form parameters for one exchange; constructed fresh every time and never cached.
#[derive(Clone, PartialEq, Eq)]
pub struct GrantRequest {
	grant_type: GrantType,
	form: BTreeMap<String, String>,
}
impl GrantRequest {
	/// Seeds a request with the client credentials and `grant_type`.
	pub fn new(client: &ClientConfig, grant_type: GrantType) -> Self {
		let mut form = BTreeMap::new();

		form.insert("client_id".into(), client.client_id.to_string());
		form.insert("client_secret".into(), client.client_secret.expose().to_owned());
		form.insert("grant_type".into(), grant_type.as_str().into());

		Self { grant_type, form }
	}

	/// Builds the fixed-shape refresh exchange used regardless of the primary grant.
	pub fn refresh(client: &ClientConfig, refresh_token: &RefreshToken) -> Self {
		let mut request = Self::new(client, GrantType::RefreshToken);

		request.insert("refresh_token", refresh_token.expose());

		request
	}

	/// Grant type this request performs.
	pub fn grant_type(&self) -> GrantType {
		self.grant_type
	}

	/// Adds or replaces a form field.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
		self.form.insert(key.into(), value.into());

		self
	}

	/// Returns a form field's value.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.form.get(key).map(String::as_str)
	}

	/// Encodes the fields as an `application/x-www-form-urlencoded` body.
	pub fn encode(&self) -> String {
		let mut serializer = Serializer::new(String::new());

		serializer.extend_pairs(self.form.iter());

		serializer.finish()
	}
}
impl Debug for GrantRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut map = f.debug_map();

		for (key, value) in &self.form {
			if SENSITIVE_FIELDS.contains(&key.as_str()) {
				map.entry(key, &"<redacted>");
			} else {
				map.entry(key, value);
			}
		}

		map.finish()
	}
}
