//! Images resource.

// self
use crate::{_prelude::*, client::Discogs, resource::Category};

/// Raw image bytes fetched from the database image endpoint.
#[derive(Clone)]
pub struct ImageBytes {
	/// Image file name, as requested.
	pub filename: String,
	/// Undecoded image payload.
	pub bytes: Vec<u8>,
}
impl Debug for ImageBytes {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ImageBytes")
			.field("filename", &self.filename)
			.field("len", &self.bytes.len())
			.finish()
	}
}
impl Display for ImageBytes {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Image: {}", self.filename)
	}
}

/// Handle for the images resource.
#[derive(Clone, Debug)]
pub struct Images {
	client: Discogs,
}
impl Images {
	pub(crate) fn new(client: Discogs) -> Self {
		Self { client }
	}

	/// Fetches an image by file name. Counts against the quota like any other call.
	pub async fn get(&self, filename: &str) -> Result<ImageBytes> {
		let bytes =
			self.client.get_bytes(Category::Database, &format!("image/{filename}")).await?;

		Ok(ImageBytes { filename: filename.to_owned(), bytes })
	}
}
