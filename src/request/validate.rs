//! Ordered validation rules for silent token requests.
//!
//! Checks always run in the same order (account, scope entries, scope duplicates,
//! query-parameter keys, reserved names, claims) so a request with several problems
//! reports the same one on the client and on the broker.

// std
use std::collections::HashSet;
// self
use crate::{
	_prelude::*,
	auth::{AccountIdentifier, ClaimsError, ScopeError, scope},
	config::RequestPolicy,
};

/// Which scope collection an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeField {
	/// Scopes the user should consent to in addition to the primary ones.
	ExtraScopesToConsent,
	/// OIDC-reserved scopes requested in addition to the defaults.
	ExtraOidcScopes,
}
impl ScopeField {
	/// Wire key of the field.
	pub const fn as_str(self) -> &'static str {
		match self {
			ScopeField::ExtraScopesToConsent => "extra_consent_scopes",
			ScopeField::ExtraOidcScopes => "extra_oidc_scopes",
		}
	}
}
impl Display for ScopeField {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Caller-fixable problems with a silent request.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Silent flows cannot establish identity, so an account is mandatory.
	#[error("Silent requests require an account identifier.")]
	MissingAccount,
	/// A scope entry is empty or contains whitespace.
	#[error("Field `{field}` holds an invalid scope.")]
	InvalidScope {
		/// Offending field.
		field: ScopeField,
		/// Entry-level failure.
		#[source]
		source: ScopeError,
	},
	/// A scope appears twice in the same field.
	#[error("Field `{field}` repeats scope `{scope}`.")]
	DuplicateScope {
		/// Offending field.
		field: ScopeField,
		/// Repeated scope.
		scope: String,
	},
	/// An extra authorize-URL parameter was supplied twice.
	#[error("Field `extra_query_parameters` repeats key `{key}`.")]
	DuplicateQueryParameter {
		/// Repeated key.
		key: String,
	},
	/// An extra authorize-URL parameter would override a reserved protocol parameter.
	#[error("Field `extra_query_parameters` uses reserved key `{key}`.")]
	ReservedQueryParameter {
		/// Reserved key.
		key: String,
	},
	/// Claims are not a JSON object.
	#[error("Field `claims` is malformed.")]
	MalformedClaims {
		/// Shape or parse failure.
		#[source]
		source: ClaimsError,
	},
}
impl ValidationError {
	/// Wire key of the offending field.
	pub fn field(&self) -> &'static str {
		match self {
			ValidationError::MissingAccount => "home_account_id",
			ValidationError::InvalidScope { field, .. }
			| ValidationError::DuplicateScope { field, .. } => field.as_str(),
			ValidationError::DuplicateQueryParameter { .. }
			| ValidationError::ReservedQueryParameter { .. } => "extra_query_parameters",
			ValidationError::MalformedClaims { .. } => "claims",
		}
	}

	/// Stable label suitable for broker error responses and metric fields.
	pub fn code(&self) -> &'static str {
		match self {
			ValidationError::MissingAccount => "missing_account",
			ValidationError::InvalidScope { .. } => "invalid_scope",
			ValidationError::DuplicateScope { .. } => "duplicate_scope",
			ValidationError::DuplicateQueryParameter { .. } => "duplicate_query_parameter",
			ValidationError::ReservedQueryParameter { .. } => "reserved_query_parameter",
			ValidationError::MalformedClaims { .. } => "malformed_claims",
		}
	}
}

/// Borrowed view over request fields, shared by builders and constructed requests.
pub(crate) struct FieldsView<'a> {
	pub(crate) account: Option<&'a AccountIdentifier>,
	pub(crate) extra_scopes_to_consent: &'a [String],
	pub(crate) extra_oidc_scopes: &'a [String],
	pub(crate) query_keys: Vec<&'a str>,
	pub(crate) claims_error: Option<&'a ClaimsError>,
}
impl FieldsView<'_> {
	/// Runs every check in order; reserved names are only checked when a policy is given.
	pub(crate) fn check(&self, policy: Option<&RequestPolicy>) -> Result<(), ValidationError> {
		if self.account.is_none() {
			return Err(ValidationError::MissingAccount);
		}

		let scope_fields = [
			(ScopeField::ExtraScopesToConsent, self.extra_scopes_to_consent),
			(ScopeField::ExtraOidcScopes, self.extra_oidc_scopes),
		];

		for (field, scopes) in scope_fields {
			scope::check_entries(scopes)
				.map_err(|source| ValidationError::InvalidScope { field, source })?;
		}
		for (field, scopes) in scope_fields {
			if let Some(scope) = scope::first_duplicate(scopes) {
				return Err(ValidationError::DuplicateScope { field, scope: scope.to_owned() });
			}
		}

		let mut seen = HashSet::with_capacity(self.query_keys.len());

		for key in &self.query_keys {
			if !seen.insert(*key) {
				return Err(ValidationError::DuplicateQueryParameter { key: (*key).to_owned() });
			}
		}

		if let Some(policy) = policy
			&& let Some(key) = self.query_keys.iter().find(|key| policy.is_reserved(key))
		{
			return Err(ValidationError::ReservedQueryParameter { key: (*key).to_owned() });
		}
		if let Some(source) = self.claims_error {
			return Err(ValidationError::MalformedClaims { source: source.clone() });
		}

		Ok(())
	}
}
