//! Labels resource.

// self
use crate::{
	_prelude::*,
	client::Discogs,
	listing::{Listing, ListingRequest},
	resource::{Category, ImageRef, Release},
};

/// Label details.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Label {
	/// Label identifier.
	pub id: u64,
	/// Label name.
	#[serde(default)]
	pub name: Option<String>,
	/// Free-form label history.
	#[serde(default)]
	pub profile: Option<String>,
	/// Postal address and contact details as one text block.
	#[serde(default)]
	pub contact_info: Option<String>,
	/// External sites associated with the label.
	#[serde(default)]
	pub urls: Vec<String>,
	/// Artwork attached to the label page.
	#[serde(default)]
	pub images: Vec<ImageRef>,
	/// Curation grade assigned by the database.
	#[serde(default)]
	pub data_quality: Option<String>,
	/// Canonical API locator for this label.
	#[serde(default)]
	pub resource_url: Option<Url>,
	/// API locator for the label's releases listing.
	#[serde(default)]
	pub releases_url: Option<Url>,
	/// Fields this crate does not model explicitly.
	#[serde(flatten)]
	pub extra: BTreeMap<String, JsonValue>,
}
impl Display for Label {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Label: {}", self.name.as_deref().unwrap_or("?"))
	}
}

/// Handle for the labels resource.
#[derive(Clone, Debug)]
pub struct Labels {
	client: Discogs,
}
impl Labels {
	pub(crate) fn new(client: Discogs) -> Self {
		Self { client }
	}

	/// Fetches a label's details.
	pub async fn get(&self, id: u64) -> Result<Label> {
		self.client.get_json(Category::Database, &format!("labels/{id}"), &[]).await
	}

	/// Opens the label's releases listing, page 1 fetched eagerly.
	pub async fn releases(&self, id: u64) -> Result<Listing<Release>> {
		Listing::open(
			self.client.clone(),
			ListingRequest::new(Category::Database, "labels", id.to_string())
				.relation("releases"),
		)
		.await
	}
}
