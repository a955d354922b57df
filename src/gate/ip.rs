//! External-address discovery used when the gate opens a new window.
//!
//! The quota is accounted per externally observed address, which only an outside
//! service can report. Lookup failures are fatal for the call that triggered them; the
//! gate caches a successful answer for its lifetime.

// std
use std::net::Ipv4Addr;
// self
use crate::{
	_prelude::*,
	error::FetchError,
	http::{FetchRequest, HttpTransport},
};

/// Boxed future returned by [`IpLookup::lookup`].
pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = Result<Ipv4Addr>> + 'a + Send>>;

/// Resolves the caller's externally observed IPv4 address.
pub trait IpLookup
where
	Self: Send + Sync,
{
	/// Performs one lookup; expected to block briefly and fail loudly when unreachable.
	fn lookup(&self) -> LookupFuture<'_>;
}

/// Fixed-address lookup for tests and for deployments behind a known egress address.
#[derive(Clone, Copy, Debug)]
pub struct StaticIpLookup(Ipv4Addr);
impl StaticIpLookup {
	/// Creates a lookup that always reports the provided address.
	pub fn new(ip: Ipv4Addr) -> Self {
		Self(ip)
	}
}
impl IpLookup for StaticIpLookup {
	fn lookup(&self) -> LookupFuture<'_> {
		let ip = self.0;

		Box::pin(async move { Ok(ip) })
	}
}

/// Asks a plain-text echo service for the caller's address over the crate's transport.
pub struct HttpIpLookup {
	transport: Arc<dyn HttpTransport>,
	endpoint: Option<Url>,
	user_agent: String,
}
impl HttpIpLookup {
	/// Default echo endpoint; answers with the caller's address as a bare string.
	pub const DEFAULT_ENDPOINT: &'static str = "https://api.ipify.org";

	/// Creates a lookup against [`Self::DEFAULT_ENDPOINT`].
	pub fn new(transport: Arc<dyn HttpTransport>, user_agent: impl Into<String>) -> Self {
		Self { transport, endpoint: None, user_agent: user_agent.into() }
	}

	/// Overrides the echo endpoint.
	pub fn with_endpoint(mut self, endpoint: Url) -> Self {
		self.endpoint = Some(endpoint);

		self
	}

	fn endpoint(&self) -> Result<Url> {
		match &self.endpoint {
			Some(url) => Ok(url.clone()),
			None => Url::parse(Self::DEFAULT_ENDPOINT)
				.map_err(|e| crate::error::ConfigError::InvalidBaseUrl { source: e }.into()),
		}
	}
}
impl IpLookup for HttpIpLookup {
	fn lookup(&self) -> LookupFuture<'_> {
		Box::pin(async move {
			let url = self.endpoint()?;
			let request =
				FetchRequest::new(url.clone()).with_header("user-agent", self.user_agent.clone());
			let response = self.transport.fetch(request).await?;

			if !response.is_success() {
				return Err(FetchError::Status { status: response.status, url }.into());
			}

			let payload = String::from_utf8_lossy(&response.body).trim().to_owned();

			payload
				.parse()
				.map_err(|_| FetchError::AddressLookup { payload }.into())
		})
	}
}
impl Debug for HttpIpLookup {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpIpLookup").field("endpoint", &self.endpoint).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::{FetchFuture, FetchResponse};

	struct EchoTransport {
		status: u16,
		body: &'static str,
	}
	impl HttpTransport for EchoTransport {
		fn fetch(&self, _: FetchRequest) -> FetchFuture<'_> {
			let response =
				FetchResponse { status: self.status, body: self.body.as_bytes().to_vec() };

			Box::pin(async move { Ok(response) })
		}
	}

	fn lookup(status: u16, body: &'static str) -> HttpIpLookup {
		HttpIpLookup::new(Arc::new(EchoTransport { status, body }), "test-agent/1.0")
	}

	#[tokio::test]
	async fn static_lookup_reports_its_address() {
		let ip = StaticIpLookup::new(Ipv4Addr::new(192, 0, 2, 1))
			.lookup()
			.await
			.expect("Static lookup should never fail.");

		assert_eq!(ip, Ipv4Addr::new(192, 0, 2, 1));
	}

	#[tokio::test]
	async fn http_lookup_parses_a_trimmed_body() {
		let ip = lookup(200, "203.0.113.7\n")
			.lookup()
			.await
			.expect("A dotted-IPv4 body should parse.");

		assert_eq!(ip, Ipv4Addr::new(203, 0, 113, 7));
	}

	#[tokio::test]
	async fn http_lookup_rejects_unusable_payloads() {
		let err = lookup(200, "<html>nope</html>")
			.lookup()
			.await
			.expect_err("An HTML body should be rejected.");

		assert!(matches!(err, Error::Fetch(FetchError::AddressLookup { .. })));
	}

	#[tokio::test]
	async fn http_lookup_propagates_error_statuses() {
		let err = lookup(503, "")
			.lookup()
			.await
			.expect_err("A 503 response should be rejected.");

		assert!(matches!(err, Error::Fetch(FetchError::Status { status: 503, .. })));
	}
}
