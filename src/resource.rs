//! Typed resources exposed by the client.
//!
//! Each submodule pairs an entity type with its resource handle. Entities are decoded
//! defensively: fields the crate knows about are typed and optional, and anything else
//! the server sends lands in the entity's `extra` bag instead of failing the decode.

pub mod artist;
pub mod image;
pub mod label;
pub mod marketplace;
pub mod master;
pub mod release;
pub mod search;
pub mod user;

pub use artist::{Artist, Artists};
pub use image::{ImageBytes, Images};
pub use label::{Label, Labels};
pub use marketplace::{ListingPrice, ListingRelease, Marketplace, MarketplaceListing};
pub use master::{Master, MasterVersion, Masters};
pub use release::{Release, Releases};
pub use search::{Search, SearchQuery, SearchResults};
pub use user::{User, Users};

// self
use crate::_prelude::*;

/// API sections a resource can belong to.
///
/// The set is closed and checked by the compiler; requests carry their category so
/// spans and metrics can be partitioned by API section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
	/// Public database: artists, releases, masters, labels, images, search.
	Database,
	/// Marketplace listings and inventories.
	Marketplace,
	/// User accounts.
	User,
}
impl Category {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Category::Database => "database",
			Category::Marketplace => "marketplace",
			Category::User => "user",
		}
	}
}
impl Display for Category {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Artwork reference embedded in entity payloads.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ImageRef {
	/// Image role, e.g. `primary` or `secondary`.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	/// Full-size image locator.
	#[serde(default)]
	pub uri: Option<Url>,
	/// 150px thumbnail locator.
	#[serde(default)]
	pub uri150: Option<Url>,
	/// Image width in pixels.
	#[serde(default)]
	pub width: Option<u64>,
	/// Image height in pixels.
	#[serde(default)]
	pub height: Option<u64>,
}
