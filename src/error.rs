//! Client-level error types shared across the gate, listings, and resources.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Quota-store backend failure (I/O, lock acquisition).
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::gate::StoreError,
	),
	/// The persisted quota record could not be parsed; manual intervention required.
	#[error(transparent)]
	QuotaRecord(#[from] crate::gate::QuotaRecordError),
	/// Fetch failure raised by the transport or while decoding a response.
	#[error(transparent)]
	Fetch(#[from] FetchError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The call budget for the current window is spent; recoverable by waiting.
	#[error(
		"Rate limit of {limit} calls exceeded after {elapsed_hours:.1} hours; \
		 {remaining_hours:.1} hours remain until the window resets."
	)]
	RateLimitExceeded {
		/// Maximum number of calls permitted per window.
		limit: u64,
		/// Hours elapsed since the current window started.
		elapsed_hours: f64,
		/// Hours remaining until the window resets.
		remaining_hours: f64,
	},
}

/// Failures raised while fetching or decoding an API response.
#[derive(Debug, ThisError)]
pub enum FetchError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the Discogs API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The API answered with a non-success status code.
	#[error("Discogs API returned HTTP {status} for {url}.")]
	Status {
		/// HTTP status code of the response.
		status: u16,
		/// URL the request was issued against.
		url: Url,
	},
	/// The response body could not be decoded as the expected JSON shape.
	#[error("Discogs API returned malformed JSON.")]
	Decode {
		/// Structured parsing failure carrying the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},

	/// A listing response lacks the item collection the listing was opened for.
	#[error("Listing response is missing the `{key}` collection.")]
	MissingCollection {
		/// JSON field the item array was expected under.
		key: String,
	},
	/// The server-supplied `next` locator returned a page that does not advance.
	#[error("Pagination did not advance: server returned page {fetched} after page {current}.")]
	NonAdvancingPage {
		/// Page number of the buffered page.
		current: u64,
		/// Page number the `next` locator resolved to.
		fetched: u64,
	},
	/// The external-address endpoint answered with something other than an IPv4 address.
	#[error("External address lookup returned an unusable payload: {payload:?}.")]
	AddressLookup {
		/// Trimmed response body that failed to parse.
		payload: String,
	},
}
impl FetchError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for FetchError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Configuration and validation failures raised at construction time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No transport was supplied and no default transport feature is enabled.
	#[error("No HTTP transport was configured for the client.")]
	MissingTransport,
	/// The Discogs API silently blocks clients without an identifying user agent.
	#[error("User agent must be a non-empty identifying string.")]
	MissingUserAgent,
	/// Base URL (or a path joined onto it) cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A listing was requested without naming the collection its items live under.
	#[error("Listing request is missing an item collection key.")]
	MissingCollectionKey,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
