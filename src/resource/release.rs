//! Releases resource.

// self
use crate::{_prelude::*, client::Discogs, resource::Category};

/// Release details, as served both by the release endpoint and inside release rows of
/// artist and label listings (which carry a sparser field set).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Release {
	/// Release identifier.
	pub id: u64,
	/// Release title.
	#[serde(default)]
	pub title: Option<String>,
	/// Row kind inside listings, e.g. `release` or `master`.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	/// Release year.
	#[serde(default)]
	pub year: Option<i64>,
	/// Database status, e.g. `Accepted`.
	#[serde(default)]
	pub status: Option<String>,
	/// Media description, e.g. `12"`.
	#[serde(default)]
	pub format: Option<String>,
	/// Issuing label name.
	#[serde(default)]
	pub label: Option<String>,
	/// Credited artist name.
	#[serde(default)]
	pub artist: Option<String>,
	/// Role of the artist the listing was opened under, e.g. `Main` or `Remix`.
	#[serde(default)]
	pub role: Option<String>,
	/// Release country.
	#[serde(default)]
	pub country: Option<String>,
	/// Genres assigned in the database.
	#[serde(default)]
	pub genres: Vec<String>,
	/// Styles assigned in the database.
	#[serde(default)]
	pub styles: Vec<String>,
	/// Thumbnail locator.
	#[serde(default)]
	pub thumb: Option<String>,
	/// Canonical API locator for this release.
	#[serde(default)]
	pub resource_url: Option<Url>,
	/// Fields this crate does not model explicitly.
	#[serde(flatten)]
	pub extra: BTreeMap<String, JsonValue>,
}
impl Display for Release {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Release: {}", self.title.as_deref().unwrap_or("?"))
	}
}

/// Handle for the releases resource.
#[derive(Clone, Debug)]
pub struct Releases {
	client: Discogs,
}
impl Releases {
	pub(crate) fn new(client: Discogs) -> Self {
		Self { client }
	}

	/// Fetches a release's details.
	pub async fn get(&self, id: u64) -> Result<Release> {
		self.client.get_json(Category::Database, &format!("releases/{id}"), &[]).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn decode_tolerates_sparse_listing_rows() {
		let release: Release = serde_json::from_str(
			r#"{"id": 45, "title": "Push Along EP", "year": 1997, "label": "Groovin'"}"#,
		)
		.expect("Sparse release row should decode.");

		assert_eq!(release.id, 45);
		assert_eq!(release.title.as_deref(), Some("Push Along EP"));
		assert_eq!(release.year, Some(1997));
		assert!(release.genres.is_empty());
		assert!(release.extra.is_empty());
	}
}
