//! Page model for paginated Discogs collections.
//!
//! Every listing response carries a `pagination` block next to the item collection.
//! [`RawPage::parse`] splits the two apart and keeps whatever other top-level fields the
//! server included as page metadata, mirroring the wire layout documented for the API.

// self
use crate::{_prelude::*, error::FetchError, http};

/// Absolute page locators supplied by the server inside the pagination block.
///
/// `next` is present exactly when `page < pages` and `prev` exactly when `page > 1`;
/// the client trusts the server on this and never synthesizes locators of its own.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PageUrls {
	/// Locator for the first page.
	#[serde(default)]
	pub first: Option<Url>,
	/// Locator for the previous page.
	#[serde(default)]
	pub prev: Option<Url>,
	/// Locator for the next page.
	#[serde(default)]
	pub next: Option<Url>,
	/// Locator for the last page.
	#[serde(default)]
	pub last: Option<Url>,
}

/// Pagination metadata for one page of a listing.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Pagination {
	/// Current page number, starting at 1.
	pub page: u64,
	/// Total page count.
	pub pages: u64,
	/// Total item count across all pages.
	#[serde(default)]
	pub items: u64,
	/// Items per page, fixed for the lifetime of a listing.
	#[serde(default)]
	pub per_page: u64,
	/// Absolute locators for sibling pages.
	#[serde(default)]
	pub urls: PageUrls,
}
impl Pagination {
	/// Returns `true` while the server advertises a further page.
	pub fn has_next(&self) -> bool {
		self.urls.next.is_some()
	}
}
impl Display for Pagination {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(
			f,
			"page {} of {} with {} items per page ({} total)",
			self.page, self.pages, self.per_page, self.items,
		)
	}
}

#[derive(Debug, Deserialize)]
struct WirePage {
	pagination: Pagination,
	#[serde(flatten)]
	rest: BTreeMap<String, JsonValue>,
}

/// One decoded page: pagination, the undecoded item records, and residual metadata.
#[derive(Debug)]
pub struct RawPage {
	/// Pagination block of this page.
	pub pagination: Pagination,
	/// Raw item records found under the collection key, in server order.
	pub entries: Vec<JsonValue>,
	/// Top-level fields other than the pagination block and the item collection.
	pub meta: BTreeMap<String, JsonValue>,
}
impl RawPage {
	/// Parses a listing response body, pulling the item array out from under `key`.
	pub fn parse(body: &[u8], key: &str) -> Result<Self, FetchError> {
		let WirePage { pagination, mut rest } = http::decode_json(body)?;
		let entries = match rest.remove(key) {
			Some(JsonValue::Array(entries)) => entries,
			_ => return Err(FetchError::MissingCollection { key: key.to_owned() }),
		};

		Ok(Self { pagination, entries, meta: rest })
	}
}
