//! Typed Discogs REST API client: lazy paginated listings, schema-mapped resources, and a
//! cross-process rate-limit gate in one crate built for well-behaved integrations.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod gate;
pub mod http;
pub mod listing;
pub mod obs;
pub mod page;
pub mod resource;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::net::Ipv4Addr;
	// self
	use crate::{
		client::Discogs,
		gate::{GateConfig, MemoryQuotaStore, RateGate, ip::StaticIpLookup},
		http::ReqwestHttpTransport,
	};

	/// Loopback address used whenever a test gate needs a fixed external address.
	pub const TEST_IP: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 1);

	/// Builds a gate backed by the provided in-memory store and a static address lookup.
	pub fn test_gate(config: GateConfig, store: Arc<MemoryQuotaStore>) -> RateGate {
		RateGate::new(config, store, Arc::new(StaticIpLookup::new(TEST_IP)))
	}

	/// Constructs a [`Discogs`] client pointed at a mock server, with an in-memory quota
	/// store generous enough to never trip during a test run.
	pub fn test_discogs(base_url: &str) -> Discogs {
		let store = Arc::new(MemoryQuotaStore::default());
		let gate = test_gate(GateConfig::default().with_limit(u64::MAX), store);

		Discogs::builder("discogs-client-tests/0.1 +https://github.com/hack-ink/discogs-client")
			.base_url(base_url)
			.transport(Arc::new(ReqwestHttpTransport::default()))
			.gate(Arc::new(gate))
			.build()
			.expect("Failed to build Discogs client fixture.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
