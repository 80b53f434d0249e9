//! Raw claims requests passed through to token acquisition.

// self
use crate::_prelude::*;

/// Raised when a claims value is not a JSON object.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ClaimsError {
	/// The JSON value parsed, but it is not an object.
	#[error("Claims must be a JSON object, found {found}.")]
	NotAnObject {
		/// JSON type that was supplied instead.
		found: &'static str,
	},
	/// The text could not be parsed as JSON.
	#[error("Claims are not valid JSON: {reason}.")]
	Unparsable {
		/// Parser diagnostic.
		reason: String,
	},
}

/// Claims request as a JSON object, carried verbatim.
///
/// The content is opaque to this crate; only its shape (object vs anything else) is
/// checked. Key order is preserved exactly as supplied.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Claims(JsonMap<String, JsonValue>);
impl Claims {
	/// Accepts any JSON value, rejecting everything that is not an object.
	pub fn from_value(value: JsonValue) -> Result<Self, ClaimsError> {
		match value {
			JsonValue::Object(map) => Ok(Self(map)),
			other => Err(ClaimsError::NotAnObject { found: json_type(&other) }),
		}
	}

	/// Parses raw JSON text (not URL-encoded).
	pub fn parse(text: &str) -> Result<Self, ClaimsError> {
		let value = serde_json::from_str::<JsonValue>(text)
			.map_err(|e| ClaimsError::Unparsable { reason: e.to_string() })?;

		Self::from_value(value)
	}

	/// Returns true if the object holds no members.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Borrowed view of the underlying object.
	pub fn as_map(&self) -> &JsonMap<String, JsonValue> {
		&self.0
	}

	/// Compact JSON rendering, suitable for a downstream `claims` request parameter.
	pub fn to_json_string(&self) -> String {
		JsonValue::Object(self.0.clone()).to_string()
	}
}
impl From<Claims> for JsonValue {
	fn from(value: Claims) -> Self {
		JsonValue::Object(value.0)
	}
}
impl Debug for Claims {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Claims").field(&format_args!("<{} members>", self.0.len())).finish()
	}
}

pub(crate) fn json_type(value: &JsonValue) -> &'static str {
	match value {
		JsonValue::Null => "null",
		JsonValue::Bool(_) => "boolean",
		JsonValue::Number(_) => "number",
		JsonValue::String(_) => "string",
		JsonValue::Array(_) => "array",
		JsonValue::Object(_) => "object",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn arrays_and_scalars_are_rejected() {
		assert_eq!(
			Claims::parse("[1,2]").expect_err("Arrays must be rejected."),
			ClaimsError::NotAnObject { found: "array" }
		);
		assert_eq!(
			Claims::from_value(JsonValue::String("{}".into()))
				.expect_err("Stringified objects must be rejected."),
			ClaimsError::NotAnObject { found: "string" }
		);
		assert!(matches!(Claims::parse("{"), Err(ClaimsError::Unparsable { .. })));
	}

	#[test]
	fn nested_structure_renders_unchanged() {
		let raw = r#"{"access_token":{"xms_cc":{"values":["cp1"]}},"id_token":{"auth_time":{"essential":true}}}"#;
		let claims = Claims::parse(raw).expect("Object claims should parse.");

		assert_eq!(claims.to_json_string(), raw);
		assert_eq!(
			serde_json::to_string(&claims).expect("Claims should serialize."),
			raw,
			"Serialization must embed the object, not a string."
		);
	}
}
