//! Users resource.

// self
use crate::{
	_prelude::*,
	client::Discogs,
	listing::{Listing, ListingRequest},
	resource::{Category, MarketplaceListing},
};

/// User account details.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct User {
	/// Account identifier.
	#[serde(default)]
	pub id: Option<u64>,
	/// Account name.
	#[serde(default)]
	pub username: Option<String>,
	/// Free-form profile text.
	#[serde(default)]
	pub profile: Option<String>,
	/// Self-reported location.
	#[serde(default)]
	pub location: Option<String>,
	/// Self-reported home page.
	#[serde(default)]
	pub home_page: Option<String>,
	/// Number of releases in the user's collection.
	#[serde(default)]
	pub num_collection: Option<u64>,
	/// Number of releases in the user's wantlist.
	#[serde(default)]
	pub num_wantlist: Option<u64>,
	/// Number of listings in the user's inventory.
	#[serde(default)]
	pub num_for_sale: Option<u64>,
	/// Canonical API locator for this user.
	#[serde(default)]
	pub resource_url: Option<Url>,
	/// Fields this crate does not model explicitly.
	#[serde(flatten)]
	pub extra: BTreeMap<String, JsonValue>,
}
impl Display for User {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "User: {}", self.username.as_deref().unwrap_or("?"))
	}
}

/// Handle for the users resource.
#[derive(Clone, Debug)]
pub struct Users {
	client: Discogs,
}
impl Users {
	pub(crate) fn new(client: Discogs) -> Self {
		Self { client }
	}

	/// Fetches a user's details.
	pub async fn get(&self, username: &str) -> Result<User> {
		self.client.get_json(Category::User, &format!("users/{username}"), &[]).await
	}

	/// Opens the user's marketplace inventory listing, page 1 fetched eagerly.
	///
	/// Inventory pages keep their items under `listings` even though the path segment
	/// is `inventory`.
	pub async fn inventory(&self, username: &str) -> Result<Listing<MarketplaceListing>> {
		Listing::open(
			self.client.clone(),
			ListingRequest::new(Category::User, "users", username)
				.relation("inventory")
				.collection_key("listings"),
		)
		.await
	}
}
