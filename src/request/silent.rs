//! Silent (UI-less) token request sent from a client to a trusted broker.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{AccountIdentifier, Claims, ClaimsError, OrderedScopeSet},
	config::RequestPolicy,
	obs::{self, RequestStage},
	request::{BrokerTokenRequest, DecodeError, FieldsView, ValidationError, WirePayload},
};

/// Immutable silent token request.
///
/// Built through [`SilentTokenRequestBuilder`] or decoded from a broker payload. Every
/// optional collection is either absent or non-empty: supplying an empty collection is the
/// same as not supplying it. Fields are only reachable through read-only views, so a value
/// handed to a transport cannot change underneath it.
///
/// Policy-independent rules are enforced on construction; reserved query-parameter names
/// depend on who is asking and are checked by [`validate`](Self::validate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SilentTokenRequest {
	base: BrokerTokenRequest,
	account: AccountIdentifier,
	extra_scopes_to_consent: Option<OrderedScopeSet>,
	extra_oidc_scopes: Option<OrderedScopeSet>,
	extra_authorize_query_parameters: Option<BTreeMap<String, String>>,
	client_capabilities: Option<Arc<[String]>>,
	claims: Option<Claims>,
}
impl SilentTokenRequest {
	/// Starts a request on top of a validated base request.
	pub fn builder(base: BrokerTokenRequest) -> SilentTokenRequestBuilder {
		SilentTokenRequestBuilder::new(base)
	}

	/// Embedded base request.
	pub fn base(&self) -> &BrokerTokenRequest {
		&self.base
	}

	/// Account the token is requested for.
	pub fn account(&self) -> &AccountIdentifier {
		&self.account
	}

	/// Scopes to consent to beyond the primary ones, in caller order.
	pub fn extra_scopes_to_consent(&self) -> Option<&OrderedScopeSet> {
		self.extra_scopes_to_consent.as_ref()
	}

	/// Additional OIDC scopes, in caller order.
	pub fn extra_oidc_scopes(&self) -> Option<&OrderedScopeSet> {
		self.extra_oidc_scopes.as_ref()
	}

	/// Parameters appended to any authorization URL derived from this request.
	pub fn extra_authorize_query_parameters(&self) -> Option<&BTreeMap<String, String>> {
		self.extra_authorize_query_parameters.as_ref()
	}

	/// Capability tags advertised by the client, in caller order (duplicates kept).
	pub fn client_capabilities(&self) -> Option<&[String]> {
		self.client_capabilities.as_deref()
	}

	/// Raw claims request.
	pub fn claims(&self) -> Option<&Claims> {
		self.claims.as_ref()
	}

	/// Runs every check, including reserved query-parameter names from `policy`.
	///
	/// Side-effect free; the caller decides whether to abort or fix and rebuild.
	pub fn validate(&self, policy: &RequestPolicy) -> Result<(), ValidationError> {
		obs::observe(RequestStage::Validate, ValidationError::code, || {
			self.fields_view().check(Some(policy))
		})
	}

	/// Validates against `policy`, then renders the wire payload as a JSON value.
	pub fn to_json_value(&self, policy: &RequestPolicy) -> Result<JsonValue> {
		self.validate(policy)?;

		obs::observe(RequestStage::Encode, Error::code, || {
			serde_json::to_value(WirePayload::from(self))
				.map_err(|source| Error::Encode { source })
		})
	}

	/// Validates against `policy`, then renders the wire payload as compact JSON text.
	pub fn encode(&self, policy: &RequestPolicy) -> Result<String> {
		self.validate(policy)?;

		obs::observe(RequestStage::Encode, Error::code, || {
			serde_json::to_string(&WirePayload::from(self))
				.map_err(|source| Error::Encode { source })
		})
	}

	/// Decodes JSON text received from a client.
	///
	/// Unknown keys are ignored. The result satisfies every policy-independent rule; call
	/// [`validate`](Self::validate) with the broker's policy before acting on it.
	pub fn decode(payload: &str) -> Result<Self, DecodeError> {
		Self::decode_slice(payload.as_bytes())
	}

	/// Decodes raw JSON bytes received from a client.
	pub fn decode_slice(payload: &[u8]) -> Result<Self, DecodeError> {
		obs::observe(RequestStage::Decode, DecodeError::code, || {
			WirePayload::from_slice(payload)?.into_request()
		})
	}

	/// Decodes an already-parsed JSON document.
	pub fn from_json_value(payload: JsonValue) -> Result<Self, DecodeError> {
		obs::observe(RequestStage::Decode, DecodeError::code, || {
			WirePayload::from_value(payload)?.into_request()
		})
	}

	/// Broker-side entry point: decode, then validate against the broker's policy.
	pub fn decode_and_validate(payload: &[u8], policy: &RequestPolicy) -> Result<Self> {
		let request = Self::decode_slice(payload)?;

		request.validate(policy)?;

		Ok(request)
	}

	/// Validates against `policy`, then appends the extra query parameters to an
	/// authorization URL in key order.
	///
	/// The URL is left untouched when validation fails.
	pub fn apply_authorize_parameters(
		&self,
		url: &mut Url,
		policy: &RequestPolicy,
	) -> Result<(), ValidationError> {
		self.validate(policy)?;

		let Some(params) = self.extra_authorize_query_parameters.as_ref() else {
			return Ok(());
		};
		let mut pairs = url.query_pairs_mut();

		for (key, value) in params {
			pairs.append_pair(key, value);
		}

		Ok(())
	}

	/// Order-sensitive digest of the payload minus its correlation identifier.
	///
	/// Two requests asking for the same thing share a fingerprint, which lets logs and
	/// brokers correlate retries without recording claims or account data.
	pub fn fingerprint(&self) -> Result<String> {
		let mut wire = WirePayload::from(self);

		wire.correlation_id = None;

		let bytes = serde_json::to_vec(&wire).map_err(|source| Error::Encode { source })?;
		let mut hasher = Sha256::new();

		hasher.update(&bytes);

		Ok(STANDARD_NO_PAD.encode(hasher.finalize()))
	}

	fn fields_view(&self) -> FieldsView<'_> {
		FieldsView {
			account: Some(&self.account),
			extra_scopes_to_consent: self
				.extra_scopes_to_consent
				.as_ref()
				.map(OrderedScopeSet::as_slice)
				.unwrap_or_default(),
			extra_oidc_scopes: self
				.extra_oidc_scopes
				.as_ref()
				.map(OrderedScopeSet::as_slice)
				.unwrap_or_default(),
			query_keys: self
				.extra_authorize_query_parameters
				.iter()
				.flat_map(BTreeMap::keys)
				.map(String::as_str)
				.collect(),
			claims_error: None,
		}
	}
}

#[derive(Clone, Debug)]
enum ClaimsInput {
	Value(JsonValue),
	Text(String),
}

/// Builder for [`SilentTokenRequest`] values.
///
/// Setters never fail; [`build`](Self::build) reports the first problem in the same order
/// [`SilentTokenRequest::validate`] uses.
#[derive(Clone, Debug)]
pub struct SilentTokenRequestBuilder {
	base: BrokerTokenRequest,
	account: Option<AccountIdentifier>,
	extra_scopes_to_consent: Vec<String>,
	extra_oidc_scopes: Vec<String>,
	extra_query_parameters: Vec<(String, String)>,
	client_capabilities: Vec<String>,
	claims: Option<ClaimsInput>,
}
impl SilentTokenRequestBuilder {
	/// Creates a builder on top of a validated base request.
	pub fn new(base: BrokerTokenRequest) -> Self {
		Self {
			base,
			account: None,
			extra_scopes_to_consent: Vec::new(),
			extra_oidc_scopes: Vec::new(),
			extra_query_parameters: Vec::new(),
			client_capabilities: Vec::new(),
			claims: None,
		}
	}

	/// Sets the account the token is requested for.
	pub fn account(mut self, account: AccountIdentifier) -> Self {
		self.account = Some(account);

		self
	}

	/// Replaces the extra scopes to consent to.
	pub fn extra_scopes_to_consent<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.extra_scopes_to_consent = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Replaces the extra OIDC scopes.
	pub fn extra_oidc_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.extra_oidc_scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Appends one extra authorize-URL parameter.
	pub fn extra_query_parameter(
		mut self,
		key: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		self.extra_query_parameters.push((key.into(), value.into()));

		self
	}

	/// Appends several extra authorize-URL parameters.
	pub fn extra_query_parameters<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.extra_query_parameters
			.extend(params.into_iter().map(|(key, value)| (key.into(), value.into())));

		self
	}

	/// Replaces the client capability tags.
	pub fn client_capabilities<I, S>(mut self, capabilities: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.client_capabilities = capabilities.into_iter().map(Into::into).collect();

		self
	}

	/// Sets claims that are already known to be an object.
	pub fn claims(mut self, claims: Claims) -> Self {
		self.claims = Some(ClaimsInput::Value(claims.into()));

		self
	}

	/// Sets claims from an arbitrary JSON value; non-objects fail at build time.
	pub fn claims_value(mut self, claims: JsonValue) -> Self {
		self.claims = Some(ClaimsInput::Value(claims));

		self
	}

	/// Sets claims from raw (not URL-encoded) JSON text; blank text means no claims.
	pub fn claims_json(mut self, claims: impl Into<String>) -> Self {
		self.claims = Some(ClaimsInput::Text(claims.into()));

		self
	}

	/// Consumes the builder, enforcing every policy-independent rule.
	pub fn build(self) -> Result<SilentTokenRequest, ValidationError> {
		obs::observe(RequestStage::Build, ValidationError::code, || self.assemble())
	}

	/// Consumes the builder and validates the result against `policy` as well.
	pub fn build_with_policy(self, policy: &RequestPolicy) -> Result<SilentTokenRequest> {
		let request = self.build()?;

		request.validate(policy)?;

		Ok(request)
	}

	pub(crate) fn assemble(self) -> Result<SilentTokenRequest, ValidationError> {
		let claims = resolve_claims(self.claims);
		let view = FieldsView {
			account: self.account.as_ref(),
			extra_scopes_to_consent: &self.extra_scopes_to_consent,
			extra_oidc_scopes: &self.extra_oidc_scopes,
			query_keys: self.extra_query_parameters.iter().map(|(key, _)| key.as_str()).collect(),
			claims_error: claims.as_ref().err(),
		};

		view.check(None)?;

		let account = self.account.ok_or(ValidationError::MissingAccount)?;
		let claims = claims.map_err(|source| ValidationError::MalformedClaims { source })?;

		Ok(SilentTokenRequest {
			base: self.base,
			account,
			extra_scopes_to_consent: non_empty(self.extra_scopes_to_consent)
				.map(OrderedScopeSet::from_checked),
			extra_oidc_scopes: non_empty(self.extra_oidc_scopes).map(OrderedScopeSet::from_checked),
			extra_authorize_query_parameters: non_empty(self.extra_query_parameters)
				.map(BTreeMap::from_iter),
			client_capabilities: non_empty(self.client_capabilities).map(Arc::from),
			claims,
		})
	}
}

fn resolve_claims(input: Option<ClaimsInput>) -> Result<Option<Claims>, ClaimsError> {
	let claims = match input {
		None => return Ok(None),
		Some(ClaimsInput::Value(value)) => Claims::from_value(value)?,
		Some(ClaimsInput::Text(text)) if text.trim().is_empty() => return Ok(None),
		Some(ClaimsInput::Text(text)) => Claims::parse(&text)?,
	};

	Ok(if claims.is_empty() { None } else { Some(claims) })
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
	if values.is_empty() { None } else { Some(values) }
}
