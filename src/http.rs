//! Transport primitives for Discogs API fetches.
//!
//! The module exposes [`HttpTransport`], the crate's only dependency on an HTTP stack.
//! A transport receives a fully built [`FetchRequest`] and resolves to a
//! [`FetchResponse`] carrying the raw status and body bytes; status interpretation and
//! JSON decoding happen in the client layer so custom transports stay trivial to write.

// std
use std::ops::Deref;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::FetchError};

/// Boxed future resolved by [`HttpTransport::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<FetchResponse, FetchError>> + 'a + Send>>;

/// One outbound GET request, fully assembled by the client layer.
#[derive(Clone, Debug)]
pub struct FetchRequest {
	/// Absolute URL to fetch, query string included.
	pub url: Url,
	/// Header name/value pairs to attach verbatim.
	pub headers: Vec<(&'static str, String)>,
}
impl FetchRequest {
	/// Creates a request for the provided URL with no headers.
	pub fn new(url: Url) -> Self {
		Self { url, headers: Vec::new() }
	}

	/// Appends a header pair.
	pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}
}

/// Raw response produced by a transport: status code plus undecoded body bytes.
#[derive(Clone, Debug)]
pub struct FetchResponse {
	/// HTTP status code of the response.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl FetchResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Abstraction over HTTP transports capable of executing Discogs API fetches.
///
/// Implementations must be `Send + Sync` so one transport can be shared by the client,
/// every listing spawned from it, and the gate's address lookup without extra wrappers.
/// A transport only reports genuine network failures as errors; responses with
/// non-success statuses are returned as-is and classified by the caller.
pub trait HttpTransport
where
	Self: Send + Sync,
{
	/// Executes a single GET request and resolves to the raw response.
	fn fetch(&self, request: FetchRequest) -> FetchFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The wrapped client is passed into every resource fetch, page fetch, and the gate's
/// external-address lookup; configure timeouts on the [`ReqwestClient`] itself since the
/// crate deliberately models no cancellation of its own.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpTransport {
	fn fetch(&self, request: FetchRequest) -> FetchFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.get(request.url);

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}

			let response = builder.send().await.map_err(FetchError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(FetchError::from)?.to_vec();

			Ok(FetchResponse { status, body })
		})
	}
}

/// Decodes a response body, wrapping failures with the JSON path that produced them.
pub(crate) fn decode_json<T>(body: &[u8]) -> Result<T, FetchError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|e| FetchError::Decode { source: e })
}

/// Decodes an already-parsed JSON value into a typed item.
pub(crate) fn decode_json_value<T>(value: JsonValue) -> Result<T, FetchError>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(value).map_err(|e| FetchError::Decode { source: e })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Probe {
		id: u64,
	}

	#[test]
	fn decode_json_reports_the_failing_path() {
		let err = decode_json::<Probe>(br#"{"id": "not-a-number"}"#)
			.expect_err("Decoding a string into a u64 field should fail.");
		let FetchError::Decode { source } = err else {
			panic!("Expected a decode failure, got {err:?}.");
		};

		assert_eq!(source.path().to_string(), "id");
	}

	#[test]
	fn decode_json_value_round_trips() {
		let probe: Probe = decode_json_value(serde_json::json!({"id": 7}))
			.expect("Decoding a matching value should succeed.");

		assert_eq!(probe.id, 7);
	}

	#[test]
	fn success_statuses_cover_the_2xx_range() {
		assert!(FetchResponse { status: 200, body: Vec::new() }.is_success());
		assert!(FetchResponse { status: 204, body: Vec::new() }.is_success());
		assert!(!FetchResponse { status: 304, body: Vec::new() }.is_success());
		assert!(!FetchResponse { status: 404, body: Vec::new() }.is_success());
	}
}
