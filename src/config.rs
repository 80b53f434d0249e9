//! Host-supplied policy applied when validating silent requests.
//!
//! The set of reserved authorize-URL parameter names belongs to whoever owns the protocol
//! surface (the client SDK on one side, the broker on the other), so it is injected here
//! instead of being hard-coded. Both sides may load it from their own configuration.

// self
use crate::{_prelude::*, error::ConfigError, request::BASE_REQUEST_KEYS};

/// Validation policy for [`SilentTokenRequest`](crate::request::SilentTokenRequest).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestPolicy {
	/// Query parameter names that extra authorize-URL parameters must not override.
	///
	/// Matching is exact and case-sensitive, as OAuth parameter names are.
	pub reserved_query_parameters: BTreeSet<String>,
}
impl RequestPolicy {
	/// Creates a policy reserving the provided parameter names.
	pub fn new<I, S>(reserved: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { reserved_query_parameters: reserved.into_iter().map(Into::into).collect() }
	}

	/// Reserves one more parameter name.
	pub fn reserve(mut self, name: impl Into<String>) -> Self {
		self.reserved_query_parameters.insert(name.into());

		self
	}

	/// Reserves the keys the base broker request already emits on the wire.
	pub fn with_base_request_keys(mut self) -> Self {
		self.reserved_query_parameters
			.extend(BASE_REQUEST_KEYS.iter().map(|key| (*key).to_owned()));

		self
	}

	/// Returns true if the name is reserved.
	pub fn is_reserved(&self, name: &str) -> bool {
		self.reserved_query_parameters.contains(name)
	}

	/// Parses a policy from JSON configuration text.
	pub fn from_json_str(text: &str) -> Result<Self> {
		let de = &mut serde_json::Deserializer::from_str(text);

		serde_path_to_error::deserialize(de)
			.map_err(|source| ConfigError::InvalidPolicy { source }.into())
	}
}
