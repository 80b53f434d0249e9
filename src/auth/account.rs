//! Account identity forwarded to the broker for silent flows.

// self
use crate::{
	_prelude::*,
	auth::{HomeAccountId, LocalAccountId},
};

/// Reference to a signed-in account already known to the broker.
///
/// The broker resolves the account through the home account identifier; the local account
/// identifier and username are hints that help it disambiguate cached accounts.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccountIdentifier {
	home_account_id: HomeAccountId,
	local_account_id: Option<LocalAccountId>,
	username: Option<String>,
}
impl AccountIdentifier {
	/// Creates an identifier for the provided home account.
	pub fn new(home_account_id: HomeAccountId) -> Self {
		Self { home_account_id, local_account_id: None, username: None }
	}

	/// Attaches the tenant-local account identifier.
	pub fn with_local_account_id(mut self, local_account_id: LocalAccountId) -> Self {
		self.local_account_id = Some(local_account_id);

		self
	}

	/// Attaches the displayable username (UPN or email); blank values are ignored.
	pub fn with_username(mut self, username: impl Into<String>) -> Self {
		let username = username.into();

		self.username = if username.trim().is_empty() { None } else { Some(username) };

		self
	}

	/// Home account identifier.
	pub fn home_account_id(&self) -> &HomeAccountId {
		&self.home_account_id
	}

	/// Tenant-local account identifier, if known.
	pub fn local_account_id(&self) -> Option<&LocalAccountId> {
		self.local_account_id.as_ref()
	}

	/// Displayable username, if known.
	pub fn username(&self) -> Option<&str> {
		self.username.as_deref()
	}
}
impl Debug for AccountIdentifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccountIdentifier")
			.field("home_account_id", &self.home_account_id)
			.field("local_account_id", &self.local_account_id)
			.field("username", &self.username.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}
