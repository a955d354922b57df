//! Marketplace resource.

// self
use crate::{_prelude::*, client::Discogs, resource::Category};

/// Asking price on a marketplace listing.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListingPrice {
	/// Numeric amount.
	#[serde(default)]
	pub value: Option<f64>,
	/// ISO currency code.
	#[serde(default)]
	pub currency: Option<String>,
}

/// Reference to the release a listing offers.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListingRelease {
	/// Release identifier.
	pub id: u64,
	/// Seller-facing description of the release.
	#[serde(default)]
	pub description: Option<String>,
	/// Canonical API locator for the release.
	#[serde(default)]
	pub resource_url: Option<Url>,
}

/// One marketplace listing.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MarketplaceListing {
	/// Listing identifier.
	pub id: u64,
	/// Listing status, e.g. `For Sale`.
	#[serde(default)]
	pub status: Option<String>,
	/// Media condition grade.
	#[serde(default)]
	pub condition: Option<String>,
	/// Sleeve condition grade.
	#[serde(default)]
	pub sleeve_condition: Option<String>,
	/// Asking price.
	#[serde(default)]
	pub price: Option<ListingPrice>,
	/// Seller comments.
	#[serde(default)]
	pub comments: Option<String>,
	/// Whether the seller accepts offers.
	#[serde(default)]
	pub allow_offers: Option<bool>,
	/// Date the listing was posted, as served.
	#[serde(default)]
	pub posted: Option<String>,
	/// Release the listing offers.
	#[serde(default)]
	pub release: Option<ListingRelease>,
	/// Canonical API locator for this listing.
	#[serde(default)]
	pub resource_url: Option<Url>,
	/// Fields this crate does not model explicitly.
	#[serde(flatten)]
	pub extra: BTreeMap<String, JsonValue>,
}
impl Display for MarketplaceListing {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Listing: {}", self.status.as_deref().unwrap_or("?"))
	}
}

/// Handle for the marketplace resource.
#[derive(Clone, Debug)]
pub struct Marketplace {
	client: Discogs,
}
impl Marketplace {
	pub(crate) fn new(client: Discogs) -> Self {
		Self { client }
	}

	/// Fetches a marketplace listing's details.
	pub async fn listing(&self, id: u64) -> Result<MarketplaceListing> {
		self.client
			.get_json(Category::Marketplace, &format!("marketplace/listings/{id}"), &[])
			.await
	}
}
