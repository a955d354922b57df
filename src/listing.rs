//! Lazy traversal of paginated collections.
//!
//! A [`Listing`] presents a multi-page server collection as one forward-only sequence.
//! Page 1 is fetched when the listing is opened; later pages are fetched exactly when
//! the buffered page runs out and the server advertised a `next` locator. Items come
//! back in server order, page 1 through the last page, with nothing reordered,
//! deduplicated, or skipped. A listing cannot be rewound; open a fresh one to
//! traverse again.

// std
use std::collections::VecDeque;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	client::Discogs,
	error::{ConfigError, FetchError},
	http,
	page::{Pagination, RawPage},
	resource::Category,
};

/// Describes the collection a [`Listing`] traverses: which resource, which entity, and
/// which relation under it.
#[derive(Clone, Debug)]
pub struct ListingRequest {
	category: Category,
	resource: String,
	id: String,
	relation: String,
	collection_key: Option<String>,
	per_page: Option<u64>,
}
impl ListingRequest {
	/// Creates a request for an entity under a resource, e.g. `artists` / `45`.
	pub fn new(
		category: Category,
		resource: impl Into<String>,
		id: impl Into<String>,
	) -> Self {
		Self {
			category,
			resource: resource.into(),
			id: id.into(),
			relation: String::new(),
			collection_key: None,
			per_page: None,
		}
	}

	/// Names the relation to traverse, e.g. `releases`. Doubles as the collection key
	/// unless [`Self::collection_key`] overrides it.
	pub fn relation(mut self, relation: impl Into<String>) -> Self {
		self.relation = relation.into();

		self
	}

	/// Overrides the JSON field the item array lives under, for the handful of
	/// endpoints whose path segment and collection key differ (e.g. `inventory` pages
	/// listing their items under `listings`).
	pub fn collection_key(mut self, key: impl Into<String>) -> Self {
		self.collection_key = Some(key.into());

		self
	}

	/// Requests a specific page size instead of the server default.
	pub fn per_page(mut self, per_page: u64) -> Self {
		self.per_page = Some(per_page);

		self
	}

	fn path(&self) -> String {
		format!("{}/{}/{}", self.resource, self.id, self.relation)
	}

	fn params(&self) -> Vec<(&'static str, String)> {
		self.per_page.map(|n| ("per_page", n.to_string())).into_iter().collect()
	}

	fn key(&self) -> Result<String> {
		let key = self.collection_key.clone().unwrap_or_else(|| self.relation.clone());

		if key.is_empty() {
			return Err(ConfigError::MissingCollectionKey.into());
		}

		Ok(key)
	}
}

/// Lazy, finite, non-restartable sequence over a paginated collection.
///
/// Not safe for concurrent use: [`Listing::try_next`] takes `&mut self` because the
/// buffer, cursor, and pagination move together across the page boundary.
pub struct Listing<T> {
	client: Discogs,
	category: Category,
	collection_key: String,
	buffer: VecDeque<T>,
	pagination: Pagination,
	meta: BTreeMap<String, JsonValue>,
}
impl<T> Listing<T>
where
	T: DeserializeOwned,
{
	/// Opens a listing, eagerly fetching page 1.
	///
	/// Resource handles call this for the collections they know about; it is public so
	/// callers can traverse endpoints the handles do not cover yet. Fails fast with
	/// [`ConfigError::MissingCollectionKey`] when the request never named the collection
	/// its items live under.
	pub async fn open(client: Discogs, request: ListingRequest) -> Result<Self> {
		let collection_key = request.key()?;
		let url = client.endpoint(&request.path(), &request.params())?;
		let page = client.fetch_page(request.category, url, &collection_key).await?;
		let buffer = Self::decode_entries(page.entries)?;

		Ok(Self {
			client,
			category: request.category,
			collection_key,
			buffer,
			pagination: page.pagination,
			meta: page.meta,
		})
	}

	/// Produces the next item, crossing page boundaries as needed.
	///
	/// Returns `Ok(None)` once the collection is exhausted, and keeps returning it
	/// without further fetches. A failed page fetch leaves the listing exactly where it
	/// was, so calling again retries the same boundary, with nothing duplicated or
	/// skipped around a transient failure.
	pub async fn try_next(&mut self) -> Result<Option<T>> {
		loop {
			if let Some(item) = self.buffer.pop_front() {
				return Ok(Some(item));
			}

			// The API never serves an empty mid-collection page, but a defensive reader
			// keeps following `next` until items appear or the chain ends.
			let Some(next) = self.pagination.urls.next.clone() else {
				return Ok(None);
			};
			let page = self.client.fetch_page(self.category, next, &self.collection_key).await?;

			if page.pagination.page <= self.pagination.page {
				return Err(FetchError::NonAdvancingPage {
					current: self.pagination.page,
					fetched: page.pagination.page,
				}
				.into());
			}

			self.install(page)?;
		}
	}

	/// Pagination block of the most recently fetched page.
	pub fn pagination(&self) -> &Pagination {
		&self.pagination
	}

	/// Top-level response fields of the most recently fetched page, pagination and item
	/// collection excluded.
	pub fn meta(&self) -> &BTreeMap<String, JsonValue> {
		&self.meta
	}

	/// Decodes a fetched page and replaces the buffered state with it. All items are
	/// decoded before any state changes, so a failure leaves the listing untouched.
	fn install(&mut self, page: RawPage) -> Result<()> {
		let buffer = Self::decode_entries(page.entries)?;

		self.buffer = buffer;
		self.pagination = page.pagination;
		self.meta = page.meta;

		Ok(())
	}

	fn decode_entries(entries: Vec<JsonValue>) -> Result<VecDeque<T>> {
		Ok(entries
			.into_iter()
			.map(http::decode_json_value)
			.collect::<Result<VecDeque<T>, _>>()?)
	}
}
impl<T> Debug for Listing<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Listing")
			.field("collection_key", &self.collection_key)
			.field("buffered", &self.buffer.len())
			.field("pagination", &self.pagination)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		io,
		net::Ipv4Addr,
		sync::atomic::{AtomicUsize, Ordering},
	};
	// self
	use super::*;
	use crate::{
		error::FetchError,
		gate::{GateConfig, MemoryQuotaStore, RateGate, ip::StaticIpLookup},
		http::{FetchFuture, FetchRequest, FetchResponse, HttpTransport},
	};

	#[derive(Debug, Deserialize, PartialEq, Eq)]
	struct Row {
		id: u64,
	}

	enum Reply {
		Json(&'static str),
		Network,
	}

	/// Serves a fixed sequence of responses, counting every fetch.
	struct ScriptedTransport {
		replies: Mutex<std::collections::VecDeque<Reply>>,
		calls: AtomicUsize,
	}
	impl ScriptedTransport {
		fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
			Arc::new(Self {
				replies: Mutex::new(replies.into_iter().collect()),
				calls: AtomicUsize::new(0),
			})
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}
	impl HttpTransport for ScriptedTransport {
		fn fetch(&self, _: FetchRequest) -> FetchFuture<'_> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let reply = self.replies.lock().pop_front().expect("Script ran out of replies.");

			Box::pin(async move {
				match reply {
					Reply::Json(body) =>
						Ok(FetchResponse { status: 200, body: body.as_bytes().to_vec() }),
					Reply::Network => Err(FetchError::network(io::Error::new(
						io::ErrorKind::ConnectionReset,
						"connection reset",
					))),
				}
			})
		}
	}

	fn client(transport: Arc<ScriptedTransport>, store: Arc<MemoryQuotaStore>) -> Discogs {
		let gate = RateGate::new(
			GateConfig::default(),
			store,
			Arc::new(StaticIpLookup::new(Ipv4Addr::LOCALHOST)),
		);

		Discogs::builder("listing-tests/1.0 +https://example.com")
			.base_url("https://api.example.com")
			.transport(transport)
			.gate(Arc::new(gate))
			.build()
			.expect("Client fixture should build.")
	}

	fn releases_request() -> ListingRequest {
		ListingRequest::new(Category::Database, "artists", "45").relation("releases")
	}

	async fn open_listing(
		transport: &Arc<ScriptedTransport>,
		store: &Arc<MemoryQuotaStore>,
	) -> Listing<Row> {
		Listing::open(client(transport.clone(), store.clone()), releases_request())
			.await
			.expect("Opening the listing should fetch page 1.")
	}

	const PAGE_1: &str = r#"{
		"pagination": {"page": 1, "pages": 3, "items": 5, "per_page": 2, "urls": {
			"next": "https://api.example.com/artists/45/releases?page=2&per_page=2",
			"last": "https://api.example.com/artists/45/releases?page=3&per_page=2"
		}},
		"releases": [{"id": 1}, {"id": 2}]
	}"#;
	const PAGE_2: &str = r#"{
		"pagination": {"page": 2, "pages": 3, "items": 5, "per_page": 2, "urls": {
			"prev": "https://api.example.com/artists/45/releases?page=1&per_page=2",
			"next": "https://api.example.com/artists/45/releases?page=3&per_page=2"
		}},
		"releases": [{"id": 3}, {"id": 4}]
	}"#;
	const PAGE_3: &str = r#"{
		"pagination": {"page": 3, "pages": 3, "items": 5, "per_page": 2, "urls": {
			"prev": "https://api.example.com/artists/45/releases?page=2&per_page=2"
		}},
		"releases": [{"id": 5}]
	}"#;

	#[tokio::test]
	async fn traverses_three_pages_in_order_with_one_fetch_each() {
		let transport =
			ScriptedTransport::new([Reply::Json(PAGE_1), Reply::Json(PAGE_2), Reply::Json(PAGE_3)]);
		let store = Arc::new(MemoryQuotaStore::default());
		let mut listing = open_listing(&transport, &store).await;

		assert_eq!(transport.calls(), 1, "page 1 is fetched eagerly");

		for expected in 1..=5 {
			let row = listing
				.try_next()
				.await
				.expect("Traversal should not fail.")
				.expect("Five items should be produced.");

			assert_eq!(row, Row { id: expected });
		}

		assert_eq!(listing.try_next().await.expect("Exhaustion is not an error."), None);
		assert_eq!(transport.calls(), 3, "one eager and two lazy fetches");
	}

	#[tokio::test]
	async fn every_fetch_passes_the_gate_first() {
		let transport =
			ScriptedTransport::new([Reply::Json(PAGE_1), Reply::Json(PAGE_2), Reply::Json(PAGE_3)]);
		let store = Arc::new(MemoryQuotaStore::default());
		let mut listing = open_listing(&transport, &store).await;

		while listing.try_next().await.expect("Traversal should not fail.").is_some() {}

		let line = store.line().expect("The gate should have recorded its calls.");

		assert!(line.ends_with("_3"), "three fetches should leave a count of 3, got {line:?}");
	}

	#[tokio::test]
	async fn an_empty_single_page_collection_is_exhausted_immediately() {
		let transport = ScriptedTransport::new([Reply::Json(
			r#"{"pagination": {"page": 1, "pages": 1, "items": 0, "per_page": 50}, "releases": []}"#,
		)]);
		let store = Arc::new(MemoryQuotaStore::default());
		let mut listing = open_listing(&transport, &store).await;

		for _ in 0..3 {
			assert_eq!(listing.try_next().await.expect("Exhaustion is not an error."), None);
		}

		assert_eq!(transport.calls(), 1, "exhaustion must not trigger further fetches");
	}

	#[tokio::test]
	async fn a_boundary_failure_is_retried_without_skips_or_duplicates() {
		let transport = ScriptedTransport::new([
			Reply::Json(PAGE_1),
			Reply::Network,
			Reply::Json(PAGE_2),
			Reply::Json(PAGE_3),
		]);
		let store = Arc::new(MemoryQuotaStore::default());
		let mut listing = open_listing(&transport, &store).await;

		assert_eq!(listing.try_next().await.expect("Item 1 should arrive."), Some(Row { id: 1 }));
		assert_eq!(listing.try_next().await.expect("Item 2 should arrive."), Some(Row { id: 2 }));

		let err = listing
			.try_next()
			.await
			.expect_err("The page-2 fetch should fail on the first attempt.");

		assert!(matches!(err, Error::Fetch(FetchError::Network { .. })));

		let mut resumed = Vec::new();

		while let Some(row) = listing.try_next().await.expect("The retry should succeed.") {
			resumed.push(row.id);
		}

		assert_eq!(resumed, [3, 4, 5]);
	}

	#[tokio::test]
	async fn an_empty_mid_collection_page_is_skipped_defensively() {
		let transport = ScriptedTransport::new([
			Reply::Json(PAGE_1),
			Reply::Json(
				r#"{
					"pagination": {"page": 2, "pages": 3, "items": 5, "per_page": 2, "urls": {
						"next": "https://api.example.com/artists/45/releases?page=3&per_page=2"
					}},
					"releases": []
				}"#,
			),
			Reply::Json(PAGE_3),
		]);
		let store = Arc::new(MemoryQuotaStore::default());
		let mut listing = open_listing(&transport, &store).await;

		listing.try_next().await.expect("Item 1 should arrive.");
		listing.try_next().await.expect("Item 2 should arrive.");

		assert_eq!(
			listing.try_next().await.expect("The empty page should be crossed."),
			Some(Row { id: 5 }),
		);
		assert_eq!(transport.calls(), 3);
	}

	#[tokio::test]
	async fn a_non_advancing_next_locator_fails_instead_of_looping() {
		let transport = ScriptedTransport::new([Reply::Json(PAGE_1), Reply::Json(PAGE_1)]);
		let store = Arc::new(MemoryQuotaStore::default());
		let mut listing = open_listing(&transport, &store).await;

		listing.try_next().await.expect("Item 1 should arrive.");
		listing.try_next().await.expect("Item 2 should arrive.");

		let err = listing
			.try_next()
			.await
			.expect_err("A next locator that re-serves page 1 must fail.");

		assert!(matches!(
			err,
			Error::Fetch(FetchError::NonAdvancingPage { current: 1, fetched: 1 }),
		));
	}

	#[tokio::test]
	async fn a_request_without_a_collection_key_fails_before_fetching() {
		let transport = ScriptedTransport::new([]);
		let store = Arc::new(MemoryQuotaStore::default());
		let request = ListingRequest::new(Category::Database, "artists", "45");
		let err = Listing::<Row>::open(client(transport.clone(), store), request)
			.await
			.expect_err("A keyless request must fail fast.");

		assert!(matches!(err, Error::Config(ConfigError::MissingCollectionKey)));
		assert_eq!(transport.calls(), 0);
	}
}
