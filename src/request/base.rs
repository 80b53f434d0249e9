//! Base broker token request shared by every broker operation.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, OrderedScopeSet, ScopeError},
};

/// Errors raised while constructing a [`BrokerTokenRequest`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum BaseRequestError {
	/// Client identifier is mandatory.
	#[error("Missing client identifier.")]
	MissingClientId,
	/// Redirect URI is mandatory.
	#[error("Missing redirect URI.")]
	MissingRedirectUri,
	/// Authority is mandatory.
	#[error("Missing authority.")]
	MissingAuthority,
	/// Authorities must use HTTPS.
	#[error("The authority must use HTTPS: {url}.")]
	InsecureAuthority {
		/// Authority URL that failed validation.
		url: String,
	},
	/// At least one primary scope must be requested.
	#[error("At least one scope must be requested.")]
	MissingScopes,
	/// Primary scopes failed validation.
	#[error("Requested scopes are invalid.")]
	InvalidScopes(#[from] ScopeError),
}

/// Immutable base request: who is asking, where the answer goes, and for what.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerTokenRequest {
	client_id: ClientId,
	redirect_uri: Url,
	authority: Url,
	correlation_id: Uuid,
	scopes: OrderedScopeSet,
}
impl BrokerTokenRequest {
	/// Creates a new builder.
	pub fn builder() -> BrokerTokenRequestBuilder {
		BrokerTokenRequestBuilder::default()
	}

	/// Application (client) identifier.
	pub fn client_id(&self) -> &ClientId {
		&self.client_id
	}

	/// Redirect URI registered for the client; custom schemes are allowed.
	pub fn redirect_uri(&self) -> &Url {
		&self.redirect_uri
	}

	/// HTTPS authority the token should be issued by.
	pub fn authority(&self) -> &Url {
		&self.authority
	}

	/// Correlation identifier.
	pub fn correlation_id(&self) -> Uuid {
		self.correlation_id
	}

	/// Primary requested scopes, in caller order.
	pub fn scopes(&self) -> &OrderedScopeSet {
		&self.scopes
	}
}

/// Builder for [`BrokerTokenRequest`] values.
#[derive(Debug, Default)]
pub struct BrokerTokenRequestBuilder {
	/// Application (client) identifier.
	pub client_id: Option<ClientId>,
	/// Redirect URI registered for the client.
	pub redirect_uri: Option<Url>,
	/// Authority supplied by the configuration provider.
	pub authority: Option<Url>,
	/// Correlation identifier; a random v4 UUID is generated when left unset.
	pub correlation_id: Option<Uuid>,
	/// Primary requested scopes, in caller order.
	pub scopes: Vec<String>,
}
impl BrokerTokenRequestBuilder {
	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: ClientId) -> Self {
		self.client_id = Some(client_id);

		self
	}

	/// Sets the redirect URI.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Sets the authority.
	pub fn authority(mut self, url: Url) -> Self {
		self.authority = Some(url);

		self
	}

	/// Pins the correlation identifier.
	pub fn correlation_id(mut self, id: Uuid) -> Self {
		self.correlation_id = Some(id);

		self
	}

	/// Replaces the primary scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Consumes the builder and validates the resulting request.
	pub fn build(self) -> Result<BrokerTokenRequest, BaseRequestError> {
		let client_id = self.client_id.ok_or(BaseRequestError::MissingClientId)?;
		let redirect_uri = self.redirect_uri.ok_or(BaseRequestError::MissingRedirectUri)?;
		let authority = self.authority.ok_or(BaseRequestError::MissingAuthority)?;

		validate_authority(&authority)?;

		if self.scopes.is_empty() {
			return Err(BaseRequestError::MissingScopes);
		}

		let scopes = OrderedScopeSet::new(self.scopes)?;

		Ok(BrokerTokenRequest {
			client_id,
			redirect_uri,
			authority,
			correlation_id: self.correlation_id.unwrap_or_else(Uuid::new_v4),
			scopes,
		})
	}
}

fn validate_authority(url: &Url) -> Result<(), BaseRequestError> {
	if url.scheme() != "https" {
		Err(BaseRequestError::InsecureAuthority { url: url.to_string() })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn builder() -> BrokerTokenRequestBuilder {
		BrokerTokenRequest::builder()
			.client_id(ClientId::new("client-123").expect("Client fixture should be valid."))
			.redirect_uri(
				Url::parse("msauth.com.contoso.app://auth").expect("Redirect fixture should parse."),
			)
			.authority(
				Url::parse("https://login.example.com/common")
					.expect("Authority fixture should parse."),
			)
			.scopes(["user.read"])
	}

	#[test]
	fn build_generates_correlation_id_when_unset() {
		let lhs = builder().build().expect("Base request should build.");
		let rhs = builder().build().expect("Base request should build.");

		assert_ne!(lhs.correlation_id(), rhs.correlation_id());
		assert_eq!(lhs.redirect_uri().scheme(), "msauth.com.contoso.app");

		let pinned = Uuid::nil();
		let request = builder().correlation_id(pinned).build().expect("Base request should build.");

		assert_eq!(request.correlation_id(), pinned);
	}

	#[test]
	fn authority_must_be_https() {
		let err = builder()
			.authority(Url::parse("http://login.example.com/common").expect("URL should parse."))
			.build()
			.expect_err("Plain HTTP authorities must be rejected.");

		assert!(matches!(err, BaseRequestError::InsecureAuthority { .. }));
	}

	#[test]
	fn scopes_are_required_and_checked() {
		assert_eq!(
			builder().scopes(Vec::<String>::new()).build().expect_err("Scopes are required."),
			BaseRequestError::MissingScopes
		);
		assert_eq!(
			builder().scopes(["a", "a"]).build().expect_err("Duplicates must be rejected."),
			BaseRequestError::InvalidScopes(ScopeError::Duplicate { scope: "a".into() })
		);
	}

	#[test]
	fn missing_fields_are_reported_in_order() {
		assert_eq!(
			BrokerTokenRequest::builder().build().expect_err("Empty builder must fail."),
			BaseRequestError::MissingClientId
		);
	}
}
