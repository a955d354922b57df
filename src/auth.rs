//! Credential material attached to outbound Discogs requests.
//!
//! The OAuth 1.0a handshake itself is out of scope for this crate; callers that need it
//! complete the dance elsewhere and hand the resulting secrets over as [`Credentials`].
//! Anonymous access works for the public database endpoints, subject to the stricter
//! unauthenticated quota.

// self
use crate::_prelude::*;

/// Credentials applied to every request issued by a client.
#[derive(Clone, Default)]
pub enum Credentials {
	/// No credentials; public endpoints only.
	#[default]
	Anonymous,
	/// Personal access token issued from the user's developer settings.
	Token(String),
	/// Consumer key/secret pair registered for an application.
	KeySecret {
		/// Consumer key.
		key: String,
		/// Consumer secret.
		secret: String,
	},
}
impl Credentials {
	/// Renders the `Authorization` header value, if any credentials are present.
	pub(crate) fn authorization(&self) -> Option<String> {
		match self {
			Self::Anonymous => None,
			Self::Token(token) => Some(format!("Discogs token={token}")),
			Self::KeySecret { key, secret } => {
				Some(format!("Discogs key={key}, secret={secret}"))
			},
		}
	}
}
// Secrets never appear in logs or debug output.
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Anonymous => f.write_str("Credentials::Anonymous"),
			Self::Token(_) => f.write_str("Credentials::Token(..)"),
			Self::KeySecret { .. } => f.write_str("Credentials::KeySecret(..)"),
		}
	}
}
