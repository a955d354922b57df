//! Search resource.

// self
use crate::{_prelude::*, client::Discogs, resource::Category};

/// Query parameters for a database search.
///
/// The endpoint accepts many more filters than the named helpers below;
/// [`SearchQuery::param`] passes any of them through untouched.
#[derive(Clone, Debug, Default)]
pub struct SearchQuery {
	params: Vec<(&'static str, String)>,
}
impl SearchQuery {
	/// Creates an empty query.
	pub fn new() -> Self {
		Self::default()
	}

	/// Free-text search string.
	pub fn query(self, value: impl Into<String>) -> Self {
		self.param("q", value)
	}

	/// Restricts results to one entity kind: `artist`, `release`, `master`, or `label`.
	pub fn kind(self, value: impl Into<String>) -> Self {
		self.param("type", value)
	}

	/// Filters on release or master title.
	pub fn title(self, value: impl Into<String>) -> Self {
		self.param("title", value)
	}

	/// Requests a specific result page.
	pub fn page(self, value: u64) -> Self {
		self.param("page", value.to_string())
	}

	/// Requests a specific page size.
	pub fn per_page(self, value: u64) -> Self {
		self.param("per_page", value.to_string())
	}

	/// Appends an arbitrary filter parameter.
	pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.params.push((name, value.into()));

		self
	}

	pub(crate) fn params(&self) -> &[(&'static str, String)] {
		&self.params
	}
}

/// Search response, kept as the raw field map the server returned.
///
/// The result shape varies with the `type` filter, so the crate does not force a
/// schema onto it; callers pick out the sections they asked for.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchResults {
	/// Raw response fields.
	#[serde(flatten)]
	pub raw: BTreeMap<String, JsonValue>,
}

/// Handle for the search resource.
#[derive(Clone, Debug)]
pub struct Search {
	client: Discogs,
}
impl Search {
	pub(crate) fn new(client: Discogs) -> Self {
		Self { client }
	}

	/// Runs a search query.
	pub async fn query(&self, query: SearchQuery) -> Result<SearchResults> {
		self.client.get_json(Category::Database, "search", query.params()).await
	}
}
