//! Root client coordinating credentials, transport, and the rate-limit gate.
//!
//! [`Discogs`] owns the pieces every resource handle shares: the HTTP transport, the
//! gate consulted before each outbound call, the base URL, and the mandatory user
//! agent. Handles returned by the accessor methods ([`Discogs::artists`] and friends)
//! borrow nothing; the client is cheap to clone and every clone shares the same gate.

// std
use std::path::PathBuf;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	error::{ConfigError, FetchError},
	gate::{FileQuotaStore, GateConfig, RateGate, ip::HttpIpLookup},
	http::{self, FetchRequest, FetchResponse, HttpTransport},
	obs::{self, RequestOutcome, RequestSpan},
	page::RawPage,
	resource::{Artists, Category, Images, Labels, Marketplace, Masters, Releases, Search, Users},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpTransport;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.discogs.com/";

/// Discogs API client.
///
/// The API silently blocks clients with obscure user agents, so construction demands an
/// identifying string up front, preferably one following RFC 1945, e.g.
/// `AwesomeDiscogsBrowser/0.1 +http://adb.example.com`.
#[derive(Clone)]
pub struct Discogs {
	/// Transport used for every outbound request, the address lookup included.
	pub transport: Arc<dyn HttpTransport>,
	/// Gate consulted before every outbound API call.
	pub gate: Arc<RateGate>,
	/// API root all resource paths are joined onto.
	pub base_url: Url,
	/// Identifying user agent attached to every request.
	pub user_agent: String,
	/// Credentials attached to every request.
	pub credentials: Credentials,
}
impl Discogs {
	/// Starts a builder seeded with the mandatory user agent.
	pub fn builder(user_agent: impl Into<String>) -> DiscogsBuilder {
		DiscogsBuilder {
			user_agent: user_agent.into(),
			base_url: None,
			credentials: Credentials::default(),
			transport: None,
			gate: None,
			gate_config: GateConfig::default(),
			quota_path: None,
		}
	}

	/// Builds a client with the default transport, gate, and production API root.
	#[cfg(feature = "reqwest")]
	pub fn new(user_agent: impl Into<String>) -> Result<Self> {
		Self::builder(user_agent).build()
	}

	/// Artists resource.
	pub fn artists(&self) -> Artists {
		Artists::new(self.clone())
	}

	/// Releases resource.
	pub fn releases(&self) -> Releases {
		Releases::new(self.clone())
	}

	/// Masters resource.
	pub fn masters(&self) -> Masters {
		Masters::new(self.clone())
	}

	/// Labels resource.
	pub fn labels(&self) -> Labels {
		Labels::new(self.clone())
	}

	/// Users resource.
	pub fn users(&self) -> Users {
		Users::new(self.clone())
	}

	/// Marketplace resource.
	pub fn marketplace(&self) -> Marketplace {
		Marketplace::new(self.clone())
	}

	/// Search resource.
	pub fn search(&self) -> Search {
		Search::new(self.clone())
	}

	/// Images resource.
	pub fn images(&self) -> Images {
		Images::new(self.clone())
	}

	/// Joins a resource path onto the base URL and appends query parameters.
	pub(crate) fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
		let mut url = self
			.base_url
			.join(path)
			.map_err(|e| ConfigError::InvalidBaseUrl { source: e })?;

		if !params.is_empty() {
			let mut pairs = url.query_pairs_mut();

			for (name, value) in params {
				pairs.append_pair(name, value);
			}
		}

		Ok(url)
	}

	/// Runs one gated fetch: gate check, transport round trip, status classification.
	pub(crate) async fn fetch_checked(
		&self,
		category: Category,
		url: Url,
	) -> Result<FetchResponse> {
		let span = RequestSpan::new(category, url.path());

		obs::record_request_outcome(category, RequestOutcome::Attempt);

		let result = span
			.instrument(async {
				self.gate.check_and_increment().await?;

				let response = self.transport.fetch(self.request(url.clone())).await?;

				if !response.is_success() {
					return Err(FetchError::Status { status: response.status, url }.into());
				}

				Ok(response)
			})
			.await;

		match &result {
			Ok(_) => obs::record_request_outcome(category, RequestOutcome::Success),
			Err(_) => obs::record_request_outcome(category, RequestOutcome::Failure),
		}

		result
	}

	/// Fetches a resource path and decodes the JSON body.
	pub(crate) async fn get_json<T>(
		&self,
		category: Category,
		path: &str,
		params: &[(&str, String)],
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let url = self.endpoint(path, params)?;
		let response = self.fetch_checked(category, url).await?;

		Ok(http::decode_json(&response.body)?)
	}

	/// Fetches a resource path and returns the raw body bytes.
	pub(crate) async fn get_bytes(&self, category: Category, path: &str) -> Result<Vec<u8>> {
		let url = self.endpoint(path, &[])?;

		Ok(self.fetch_checked(category, url).await?.body)
	}

	/// Fetches an absolute page locator and splits out its item collection.
	pub(crate) async fn fetch_page(
		&self,
		category: Category,
		url: Url,
		key: &str,
	) -> Result<RawPage> {
		let response = self.fetch_checked(category, url).await?;

		Ok(RawPage::parse(&response.body, key)?)
	}

	fn request(&self, url: Url) -> FetchRequest {
		let mut request =
			FetchRequest::new(url).with_header("user-agent", self.user_agent.clone());

		if let Some(authorization) = self.credentials.authorization() {
			request = request.with_header("authorization", authorization);
		}

		request
	}
}
impl Debug for Discogs {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Discogs")
			.field("base_url", &self.base_url.as_str())
			.field("user_agent", &self.user_agent)
			.field("credentials", &self.credentials)
			.finish()
	}
}

/// Builder for [`Discogs`] clients.
pub struct DiscogsBuilder {
	user_agent: String,
	base_url: Option<String>,
	credentials: Credentials,
	transport: Option<Arc<dyn HttpTransport>>,
	gate: Option<Arc<RateGate>>,
	gate_config: GateConfig,
	quota_path: Option<PathBuf>,
}
impl DiscogsBuilder {
	/// Overrides the API root. A trailing slash matters when the root carries a path.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Attaches credentials to every request.
	pub fn credentials(mut self, credentials: Credentials) -> Self {
		self.credentials = credentials;

		self
	}

	/// Supplies a custom transport instead of the default reqwest-backed one.
	pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
		self.transport = Some(transport);

		self
	}

	/// Supplies a fully built gate, ignoring `gate_config` and `quota_path`.
	pub fn gate(mut self, gate: Arc<RateGate>) -> Self {
		self.gate = Some(gate);

		self
	}

	/// Overrides the configuration of the default file-backed gate.
	pub fn gate_config(mut self, config: GateConfig) -> Self {
		self.gate_config = config;

		self
	}

	/// Overrides where the default gate persists its quota record.
	pub fn quota_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.quota_path = Some(path.into());

		self
	}

	/// Validates the configuration and builds the client.
	pub fn build(self) -> Result<Discogs> {
		let user_agent = self.user_agent.trim().to_owned();

		if user_agent.is_empty() {
			return Err(ConfigError::MissingUserAgent.into());
		}

		let base_url = Url::parse(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
			.map_err(|e| ConfigError::InvalidBaseUrl { source: e })?;
		let transport = match self.transport {
			Some(transport) => transport,
			None => Self::default_transport()?,
		};
		let gate = match self.gate {
			Some(gate) => gate,
			None => {
				let path = self.quota_path.unwrap_or_else(FileQuotaStore::default_path);
				let store = FileQuotaStore::open(path)?;
				let lookup = HttpIpLookup::new(transport.clone(), user_agent.clone());

				Arc::new(RateGate::new(self.gate_config, Arc::new(store), Arc::new(lookup)))
			},
		};

		Ok(Discogs { transport, gate, base_url, user_agent, credentials: self.credentials })
	}

	#[cfg(feature = "reqwest")]
	fn default_transport() -> Result<Arc<dyn HttpTransport>> {
		Ok(Arc::new(ReqwestHttpTransport::default()))
	}

	#[cfg(not(feature = "reqwest"))]
	fn default_transport() -> Result<Arc<dyn HttpTransport>> {
		Err(ConfigError::MissingTransport.into())
	}
}
impl Debug for DiscogsBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DiscogsBuilder")
			.field("user_agent", &self.user_agent)
			.field("base_url", &self.base_url)
			.field("credentials", &self.credentials)
			.field("gate_config", &self.gate_config)
			.finish()
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	fn client() -> Discogs {
		Discogs::builder("discogs-client-tests/0.1 +https://example.com")
			.base_url("https://api.example.com")
			.credentials(Credentials::Token("tok".into()))
			.build()
			.expect("Client fixture should build.")
	}

	#[test]
	fn builder_rejects_a_blank_user_agent() {
		let err = Discogs::builder("   ")
			.build()
			.expect_err("A blank user agent should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::MissingUserAgent)));
	}

	#[test]
	fn endpoint_joins_paths_and_appends_parameters() {
		let client = client();
		let plain = client.endpoint("artists/45", &[]).expect("Plain path should join.");

		assert_eq!(plain.as_str(), "https://api.example.com/artists/45");

		let with_params = client
			.endpoint("search", &[("q", "The Beatles".into()), ("type", "artist".into())])
			.expect("Search path should join.");

		assert_eq!(
			with_params.as_str(),
			"https://api.example.com/search?q=The+Beatles&type=artist",
		);
	}

	#[test]
	fn requests_carry_user_agent_and_authorization() {
		let client = client();
		let url = client.endpoint("artists/45", &[]).expect("Path should join.");
		let request = client.request(url);

		assert!(request
			.headers
			.contains(&("user-agent", "discogs-client-tests/0.1 +https://example.com".into())));
		assert!(request.headers.contains(&("authorization", "Discogs token=tok".into())));
	}
}
