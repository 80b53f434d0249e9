//! JSON wire codec for silent token requests.
//!
//! The payload is a single JSON object. Base request keys come first, then the account
//! keys, then the optional silent-flow keys. Optional keys are omitted rather than sent as
//! `null`, sequences keep caller order, and `claims` is a nested object (never a string).
//! Unknown top-level keys are ignored so older brokers accept newer clients.

// crates.io
use serde::{
	Deserializer, Serializer,
	de::{Error as DeError, MapAccess, Visitor},
	ser::SerializeMap,
};
// self
use crate::{
	_prelude::*,
	auth::{AccountIdentifier, ClientId, HomeAccountId, IdentifierError, LocalAccountId},
	request::{
		BaseRequestError, BrokerTokenRequest, SilentTokenRequest, SilentTokenRequestBuilder,
		TokenRequestExt, ValidationError,
	},
};

/// Operation name carried in the `operation` envelope key.
pub const SILENT_OPERATION: &str = "acquire_token_silent";

/// Wire-format corruption or a missing required field on the receiving side.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Payload is not JSON or a key holds the wrong JSON type.
	#[error("Payload is malformed at `{path}`.")]
	Malformed {
		/// JSON path of the failure (`.` for the document itself).
		path: String,
		/// Parser diagnostic.
		#[source]
		source: serde_json::Error,
	},
	/// A required key is absent.
	#[error("Payload is missing required field `{field}`.")]
	MissingField {
		/// Wire key that was expected.
		field: &'static str,
	},
	/// Payload targets a different broker operation.
	#[error("Payload targets operation `{found}`, expected `acquire_token_silent`.")]
	OperationMismatch {
		/// Operation named by the payload.
		found: String,
	},
	/// An identifier key failed validation.
	#[error("Field `{field}` holds an invalid identifier.")]
	InvalidIdentifier {
		/// Wire key of the identifier.
		field: &'static str,
		/// Identifier failure.
		#[source]
		source: IdentifierError,
	},
	/// A URL key could not be parsed.
	#[error("Field `{field}` holds an invalid URL.")]
	InvalidUrl {
		/// Wire key of the URL.
		field: &'static str,
		/// Parser failure.
		#[source]
		source: url::ParseError,
	},
	/// The correlation identifier is not a UUID.
	#[error("Field `correlation_id` is not a UUID.")]
	InvalidCorrelationId {
		/// Parser failure.
		#[source]
		source: uuid::Error,
	},
	/// Base request fields decoded but failed validation.
	#[error(transparent)]
	InvalidBaseRequest(#[from] BaseRequestError),
	/// Silent request fields decoded but failed validation.
	#[error(transparent)]
	InvalidRequest(#[from] ValidationError),
}
impl DecodeError {
	/// Stable label suitable for broker error responses and metric fields.
	pub fn code(&self) -> &'static str {
		match self {
			DecodeError::Malformed { .. } => "malformed_payload",
			DecodeError::MissingField { .. } => "missing_field",
			DecodeError::OperationMismatch { .. } => "operation_mismatch",
			DecodeError::InvalidIdentifier { .. } => "invalid_identifier",
			DecodeError::InvalidUrl { .. } => "invalid_url",
			DecodeError::InvalidCorrelationId { .. } => "invalid_correlation_id",
			DecodeError::InvalidBaseRequest(_) => "invalid_base_request",
			DecodeError::InvalidRequest(e) => e.code(),
		}
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for DecodeError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Malformed { path, source: e.into_inner() }
	}
}

/// Flat JSON shape of a silent request; field order is emission order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct WirePayload {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) operation: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) client_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) redirect_uri: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) authority: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) correlation_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) scope: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) home_account_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) local_account_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) username: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) extra_consent_scopes: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) extra_oidc_scopes: Option<Vec<String>>,
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		serialize_with = "serialize_pairs",
		deserialize_with = "deserialize_pairs"
	)]
	pub(crate) extra_query_parameters: Option<Vec<(String, String)>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) client_capabilities: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) claims: Option<JsonValue>,
}
impl WirePayload {
	/// Parses JSON text, reporting the failing path.
	pub(crate) fn from_slice(payload: &[u8]) -> Result<Self, DecodeError> {
		let mut de = serde_json::Deserializer::from_slice(payload);
		let wire = serde_path_to_error::deserialize(&mut de)?;

		de.end().map_err(|source| DecodeError::Malformed { path: ".".into(), source })?;

		Ok(wire)
	}

	/// Reads an already-parsed JSON document.
	pub(crate) fn from_value(payload: JsonValue) -> Result<Self, DecodeError> {
		Ok(serde_path_to_error::deserialize(payload)?)
	}

	/// Rebuilds and checks the request.
	pub(crate) fn into_request(self) -> Result<SilentTokenRequest, DecodeError> {
		if let Some(found) = self.operation
			&& found != SILENT_OPERATION
		{
			return Err(DecodeError::OperationMismatch { found });
		}

		let client_id = required("client_id", self.client_id)?;
		let client_id = ClientId::new(client_id)
			.map_err(|source| DecodeError::InvalidIdentifier { field: "client_id", source })?;
		let redirect_uri = parse_url("redirect_uri", required("redirect_uri", self.redirect_uri)?)?;
		let authority = parse_url("authority", required("authority", self.authority)?)?;
		let correlation_id = Uuid::parse_str(&required("correlation_id", self.correlation_id)?)
			.map_err(|source| DecodeError::InvalidCorrelationId { source })?;
		let base = BrokerTokenRequest::builder()
			.client_id(client_id)
			.redirect_uri(redirect_uri)
			.authority(authority)
			.correlation_id(correlation_id)
			.scopes(required("scope", self.scope)?)
			.build()?;
		let home_account_id = required("home_account_id", self.home_account_id)?;
		let home_account_id = HomeAccountId::new(home_account_id).map_err(|source| {
			DecodeError::InvalidIdentifier { field: "home_account_id", source }
		})?;
		let mut account = AccountIdentifier::new(home_account_id);

		if let Some(local) = self.local_account_id {
			let local = LocalAccountId::new(local).map_err(|source| {
				DecodeError::InvalidIdentifier { field: "local_account_id", source }
			})?;

			account = account.with_local_account_id(local);
		}
		if let Some(username) = self.username {
			account = account.with_username(username);
		}

		let mut builder = SilentTokenRequestBuilder::new(base)
			.account(account)
			.extra_scopes_to_consent(self.extra_consent_scopes.unwrap_or_default())
			.extra_oidc_scopes(self.extra_oidc_scopes.unwrap_or_default())
			.extra_query_parameters(self.extra_query_parameters.unwrap_or_default())
			.client_capabilities(self.client_capabilities.unwrap_or_default());

		if let Some(claims) = self.claims {
			builder = builder.claims_value(claims);
		}

		Ok(builder.assemble()?)
	}
}
impl From<&SilentTokenRequest> for WirePayload {
	fn from(request: &SilentTokenRequest) -> Self {
		let account = request.account();

		Self {
			operation: Some(SILENT_OPERATION.to_owned()),
			client_id: Some(request.client_id().to_string()),
			redirect_uri: Some(request.redirect_uri().to_string()),
			authority: Some(request.authority().to_string()),
			correlation_id: Some(request.correlation_id().to_string()),
			scope: Some(request.scopes().as_slice().to_vec()),
			home_account_id: Some(account.home_account_id().to_string()),
			local_account_id: account.local_account_id().map(ToString::to_string),
			username: account.username().map(ToOwned::to_owned),
			extra_consent_scopes: request
				.extra_scopes_to_consent()
				.map(|scopes| scopes.as_slice().to_vec()),
			extra_oidc_scopes: request.extra_oidc_scopes().map(|scopes| scopes.as_slice().to_vec()),
			extra_query_parameters: request.extra_authorize_query_parameters().map(|params| {
				params.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
			}),
			client_capabilities: request.client_capabilities().map(<[String]>::to_vec),
			claims: request.claims().cloned().map(JsonValue::from),
		}
	}
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, DecodeError> {
	value.ok_or(DecodeError::MissingField { field })
}

fn parse_url(field: &'static str, value: String) -> Result<Url, DecodeError> {
	Url::parse(&value).map_err(|source| DecodeError::InvalidUrl { field, source })
}

fn serialize_pairs<S>(
	pairs: &Option<Vec<(String, String)>>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let pairs = pairs.as_deref().unwrap_or_default();
	let mut map = serializer.serialize_map(Some(pairs.len()))?;

	for (key, value) in pairs {
		map.serialize_entry(key, value)?;
	}

	map.end()
}

// Keeps repeated keys so validation can reject them instead of silently keeping the last.
fn deserialize_pairs<'de, D>(deserializer: D) -> Result<Option<Vec<(String, String)>>, D::Error>
where
	D: Deserializer<'de>,
{
	struct PairsVisitor;
	impl<'de> Visitor<'de> for PairsVisitor {
		type Value = Option<Vec<(String, String)>>;

		fn expecting(&self, f: &mut Formatter) -> FmtResult {
			f.write_str("an object of string values")
		}

		fn visit_none<E>(self) -> Result<Self::Value, E>
		where
			E: DeError,
		{
			Ok(None)
		}

		fn visit_unit<E>(self) -> Result<Self::Value, E>
		where
			E: DeError,
		{
			Ok(None)
		}

		fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
		where
			D: Deserializer<'de>,
		{
			deserializer.deserialize_map(self)
		}

		fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
		where
			A: MapAccess<'de>,
		{
			let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));

			while let Some(pair) = access.next_entry::<String, String>()? {
				pairs.push(pair);
			}

			Ok(Some(pairs))
		}
	}

	deserializer.deserialize_option(PairsVisitor)
}
