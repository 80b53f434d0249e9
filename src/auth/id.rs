//! Strongly typed identifiers carried by broker requests.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 256;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (client, home account, local account).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (client, home account, local account).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (client, home account, local account).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { ClientId, "Application (client) identifier registered with the identity provider.", "Client" }
def_id! { HomeAccountId, "Home account identifier in `<object id>.<tenant id>` form.", "HomeAccount" }
def_id! { LocalAccountId, "Account identifier local to the tenant that issued the token.", "LocalAccount" }

impl HomeAccountId {
	/// Object identifier portion (before the first `.`), when the value is compound.
	pub fn object_id(&self) -> Option<&str> {
		self.0.split_once('.').map(|(uid, _)| uid).filter(|uid| !uid.is_empty())
	}

	/// Home tenant identifier portion (after the first `.`), when the value is compound.
	pub fn tenant_id(&self) -> Option<&str> {
		self.0.split_once('.').map(|(_, utid)| utid).filter(|utid| !utid.is_empty())
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.chars().count() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_padding_and_empties() {
		assert!(ClientId::new(" client").is_err(), "Leading whitespace must be rejected.");
		assert!(ClientId::new("client ").is_err(), "Trailing whitespace must be rejected.");
		assert!(LocalAccountId::new("").is_err());

		let client = ClientId::new("b6c69a37").expect("Client fixture should be considered valid.");

		assert_eq!(client.as_ref(), "b6c69a37");
		assert_eq!(format!("{client:?}"), "Client(b6c69a37)");
	}

	#[test]
	fn serde_enforces_validation() {
		let id: HomeAccountId = serde_json::from_str("\"uid.utid\"")
			.expect("Home account id should deserialize successfully.");

		assert_eq!(id.as_ref(), "uid.utid");
		assert!(serde_json::from_str::<HomeAccountId>("\"with space\"").is_err());
		assert!(serde_json::from_str::<HomeAccountId>("\"\"").is_err());
	}

	#[test]
	fn length_limit_is_inclusive() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		ClientId::new(&exact).expect("Exact length should succeed.");

		let err = ClientId::new("a".repeat(IDENTIFIER_MAX_LEN + 1))
			.expect_err("Overlong identifiers must be rejected.");

		assert_eq!(err, IdentifierError::TooLong { kind: "Client", max: IDENTIFIER_MAX_LEN });
	}

	#[test]
	fn length_limit_counts_characters() {
		let wide = "é".repeat(IDENTIFIER_MAX_LEN);

		assert!(wide.len() > IDENTIFIER_MAX_LEN);

		LocalAccountId::new(&wide).expect("Multi-byte characters count once each.");

		let err = LocalAccountId::new(format!("{wide}é"))
			.expect_err("One character over the limit must be rejected.");

		assert_eq!(err.to_string(), "LocalAccount identifier exceeds 256 characters.");
	}

	#[test]
	fn home_account_id_splits_components() {
		let compound =
			HomeAccountId::new("0f1e2d.72f988bf").expect("Compound home account id should parse.");

		assert_eq!(compound.object_id(), Some("0f1e2d"));
		assert_eq!(compound.tenant_id(), Some("72f988bf"));

		let opaque = HomeAccountId::new("opaque").expect("Opaque home account id should parse.");

		assert_eq!(opaque.object_id(), None);
		assert_eq!(opaque.tenant_id(), None);
	}
}
