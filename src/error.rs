//! Crate-level error types shared by request construction, validation, and the wire codec.

// self
use crate::_prelude::*;

pub use crate::request::{BaseRequestError, DecodeError, ValidationError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller-fixable problem with the silent request fields.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Wire payload could not be turned back into a request.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Base request fields are missing or invalid.
	#[error(transparent)]
	BaseRequest(#[from] BaseRequestError),
	/// Host configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Request could not be rendered as JSON.
	#[error("Request could not be encoded.")]
	Encode {
		/// Underlying serializer failure.
		#[source]
		source: serde_json::Error,
	},
}
impl Error {
	/// Stable label suitable for broker error responses and metric fields.
	pub fn code(&self) -> &'static str {
		match self {
			Error::Validation(e) => e.code(),
			Error::Decode(e) => e.code(),
			Error::BaseRequest(_) => "invalid_base_request",
			Error::Config(_) => "invalid_config",
			Error::Encode { .. } => "encode_failed",
		}
	}
}

/// Configuration failures raised while loading host policy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Request policy JSON does not match the expected shape.
	#[error("Request policy is invalid at `{}`.", .source.path())]
	InvalidPolicy {
		/// Structured parsing failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
