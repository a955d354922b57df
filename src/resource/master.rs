//! Masters resource.

// self
use crate::{
	_prelude::*,
	client::Discogs,
	listing::{Listing, ListingRequest},
	resource::{Category, ImageRef},
};

/// Master release details.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Master {
	/// Master identifier.
	pub id: u64,
	/// Master title.
	#[serde(default)]
	pub title: Option<String>,
	/// Identifier of the key release this master groups.
	#[serde(default)]
	pub main_release: Option<u64>,
	/// Year of the earliest release under this master.
	#[serde(default)]
	pub year: Option<i64>,
	/// Genres assigned in the database.
	#[serde(default)]
	pub genres: Vec<String>,
	/// Styles assigned in the database.
	#[serde(default)]
	pub styles: Vec<String>,
	/// Artwork attached to the master page.
	#[serde(default)]
	pub images: Vec<ImageRef>,
	/// Canonical API locator for this master.
	#[serde(default)]
	pub resource_url: Option<Url>,
	/// API locator for the master's versions listing.
	#[serde(default)]
	pub versions_url: Option<Url>,
	/// Fields this crate does not model explicitly.
	#[serde(flatten)]
	pub extra: BTreeMap<String, JsonValue>,
}
impl Display for Master {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Master: {}", self.title.as_deref().unwrap_or("?"))
	}
}

/// One release version grouped under a master.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MasterVersion {
	/// Release identifier of this version.
	pub id: u64,
	/// Version title.
	#[serde(default)]
	pub title: Option<String>,
	/// Media description.
	#[serde(default)]
	pub format: Option<String>,
	/// Issuing label name.
	#[serde(default)]
	pub label: Option<String>,
	/// Release country.
	#[serde(default)]
	pub country: Option<String>,
	/// Release date as served, usually a year.
	#[serde(default)]
	pub released: Option<String>,
	/// Thumbnail locator.
	#[serde(default)]
	pub thumb: Option<String>,
	/// Canonical API locator for this version.
	#[serde(default)]
	pub resource_url: Option<Url>,
	/// Fields this crate does not model explicitly.
	#[serde(flatten)]
	pub extra: BTreeMap<String, JsonValue>,
}

/// Handle for the masters resource.
#[derive(Clone, Debug)]
pub struct Masters {
	client: Discogs,
}
impl Masters {
	pub(crate) fn new(client: Discogs) -> Self {
		Self { client }
	}

	/// Fetches a master release's details.
	pub async fn get(&self, id: u64) -> Result<Master> {
		self.client.get_json(Category::Database, &format!("masters/{id}"), &[]).await
	}

	/// Opens the master's versions listing, page 1 fetched eagerly.
	pub async fn versions(&self, id: u64) -> Result<Listing<MasterVersion>> {
		Listing::open(
			self.client.clone(),
			ListingRequest::new(Category::Database, "masters", id.to_string())
				.relation("versions"),
		)
		.await
	}
}
