//! Artists resource.

// self
use crate::{
	_prelude::*,
	client::Discogs,
	listing::{Listing, ListingRequest},
	resource::{Category, ImageRef, Release},
};

/// Artist details.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Artist {
	/// Artist identifier.
	pub id: u64,
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Legal or full name.
	#[serde(default, rename = "realname")]
	pub real_name: Option<String>,
	/// Free-form biography.
	#[serde(default)]
	pub profile: Option<String>,
	/// Alternative spellings of the name.
	#[serde(default)]
	pub namevariations: Vec<String>,
	/// External sites associated with the artist.
	#[serde(default)]
	pub urls: Vec<String>,
	/// Artwork attached to the artist page.
	#[serde(default)]
	pub images: Vec<ImageRef>,
	/// Curation grade assigned by the database.
	#[serde(default)]
	pub data_quality: Option<String>,
	/// Canonical API locator for this artist.
	#[serde(default)]
	pub resource_url: Option<Url>,
	/// API locator for the artist's releases listing.
	#[serde(default)]
	pub releases_url: Option<Url>,
	/// Fields this crate does not model explicitly.
	#[serde(flatten)]
	pub extra: BTreeMap<String, JsonValue>,
}
impl Display for Artist {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Artist: {}", self.name.as_deref().unwrap_or("?"))
	}
}

/// Handle for the artists resource.
#[derive(Clone, Debug)]
pub struct Artists {
	client: Discogs,
}
impl Artists {
	pub(crate) fn new(client: Discogs) -> Self {
		Self { client }
	}

	/// Fetches an artist's details.
	pub async fn get(&self, id: u64) -> Result<Artist> {
		self.client.get_json(Category::Database, &format!("artists/{id}"), &[]).await
	}

	/// Opens the artist's releases listing, page 1 fetched eagerly.
	pub async fn releases(&self, id: u64) -> Result<Listing<Release>> {
		Listing::open(
			self.client.clone(),
			ListingRequest::new(Category::Database, "artists", id.to_string())
				.relation("releases"),
		)
		.await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn decode_keeps_unknown_fields_in_the_extra_bag() {
		let artist: Artist = serde_json::from_str(
			r#"{
				"id": 45,
				"name": "Aphex Twin",
				"realname": "Richard David James",
				"namevariations": ["AFX", "Apex Twin"],
				"members": [{"id": 1, "name": "Richard David James"}]
			}"#,
		)
		.expect("Artist sample should decode.");

		assert_eq!(artist.id, 45);
		assert_eq!(artist.name.as_deref(), Some("Aphex Twin"));
		assert_eq!(artist.real_name.as_deref(), Some("Richard David James"));
		assert_eq!(artist.namevariations, ["AFX", "Apex Twin"]);
		assert!(artist.extra.contains_key("members"));
		assert_eq!(artist.to_string(), "Artist: Aphex Twin");
	}
}
