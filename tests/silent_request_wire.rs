// crates.io
use serde_json::{Value, json};
// self
use broker_silent_request::{
	auth::{AccountIdentifier, ClientId, HomeAccountId, LocalAccountId},
	config::RequestPolicy,
	error::{DecodeError, Error},
	request::{BrokerTokenRequest, SilentTokenRequest, TokenRequestExt, ValidationError},
	url::Url,
	uuid::Uuid,
};

const CLAIMS: &str = r#"{"access_token":{"xms_cc":{"values":["cp1"]}}}"#;
const CLIENT_ID: &str = "4b0db8c2-9f26-4417-8bde-3f0e3656f8e0";
const HOME_ACCOUNT_ID: &str =
	"9f4880d8-80ba-4c40-97bc-f7a23c703084.f645ad92-e38d-4d1a-b510-d1b09a74a8ca";

fn base_request() -> BrokerTokenRequest {
	BrokerTokenRequest::builder()
		.client_id(ClientId::new(CLIENT_ID).expect("Client id is valid."))
		.redirect_uri(Url::parse("msauth.com.contoso.mail://auth").expect("Redirect URI parses."))
		.authority(
			Url::parse("https://login.microsoftonline.com/common").expect("Authority parses."),
		)
		.scopes(["user.read", "mail.read"])
		.build()
		.expect("Base request fixture should build.")
}

fn account() -> AccountIdentifier {
	AccountIdentifier::new(
		HomeAccountId::new(HOME_ACCOUNT_ID).expect("Home account id is valid."),
	)
	.with_local_account_id(
		LocalAccountId::new("9f4880d8-80ba-4c40-97bc-f7a23c703084").expect("Local id is valid."),
	)
	.with_username("user@contoso.com")
}

fn render(request: &SilentTokenRequest) -> Value {
	request.to_json_value(&RequestPolicy::default()).expect("Request should render as JSON.")
}

fn full_request() -> SilentTokenRequest {
	SilentTokenRequest::builder(base_request())
		.account(account())
		.extra_scopes_to_consent(["calendars.read", "mail.send"])
		.extra_oidc_scopes(["profile", "openid", "offline_access"])
		.extra_query_parameter("slice", "testslice")
		.extra_query_parameter("dc", "ESTS-PUB-WUS2")
		.client_capabilities(["llt", "cp1", "llt"])
		.claims_json(CLAIMS)
		.build()
		.expect("Full request fixture should build.")
}

#[test]
fn decode_inverts_serialize() {
	let request = full_request();
	let payload = request
		.encode(&RequestPolicy::default().with_base_request_keys())
		.expect("Full request should encode.");
	let decoded = SilentTokenRequest::decode(&payload).expect("Encoded payload should decode.");

	assert_eq!(decoded, request);
	assert_eq!(decoded.correlation_id(), request.correlation_id());
	assert_eq!(
		decoded
			.extra_oidc_scopes()
			.expect("OIDC scopes should survive the round trip.")
			.iter()
			.collect::<Vec<_>>(),
		vec!["profile", "openid", "offline_access"]
	);
	assert_eq!(
		decoded.client_capabilities(),
		Some(["llt".to_string(), "cp1".to_string(), "llt".to_string()].as_slice())
	);
	assert_eq!(decoded.account().username(), Some("user@contoso.com"));
}

#[test]
fn payload_keys_follow_a_stable_order() {
	let value = render(&full_request());
	let keys = value
		.as_object()
		.expect("Payload should be a JSON object.")
		.keys()
		.map(String::as_str)
		.collect::<Vec<_>>();

	assert_eq!(
		keys,
		vec![
			"operation",
			"client_id",
			"redirect_uri",
			"authority",
			"correlation_id",
			"scope",
			"home_account_id",
			"local_account_id",
			"username",
			"extra_consent_scopes",
			"extra_oidc_scopes",
			"extra_query_parameters",
			"client_capabilities",
			"claims",
		]
	);
	assert_eq!(value["operation"], "acquire_token_silent");
	assert_eq!(value["extra_consent_scopes"], json!(["calendars.read", "mail.send"]));
}

#[test]
fn claims_are_nested_and_unchanged() {
	let payload = full_request()
		.encode(&RequestPolicy::default())
		.expect("Full request should encode.");

	assert!(payload.contains(&format!("\"claims\":{CLAIMS}")), "Claims must be embedded verbatim.");

	let value: Value = serde_json::from_str(&payload).expect("Payload should be valid JSON.");

	assert!(value["claims"].is_object(), "Claims must not be double-encoded as a string.");
	assert_eq!(value["claims"].to_string(), CLAIMS);
}

#[test]
fn minimal_payload_has_only_base_and_account_keys() {
	let request = SilentTokenRequest::builder(base_request())
		.account(AccountIdentifier::new(HomeAccountId::new("uid.utid").expect("Id is valid.")))
		.extra_scopes_to_consent(Vec::<String>::new())
		.build()
		.expect("Minimal request should build.");
	let value = render(&request);
	let object = value.as_object().expect("Payload should be a JSON object.");

	assert_eq!(object.len(), 7);
	assert!(object.values().all(|value| !value.is_null()), "Absent fields must be omitted.");
	assert!(!object.contains_key("extra_consent_scopes"));
	assert!(!object.contains_key("claims"));
	assert_eq!(value["home_account_id"], "uid.utid");
	assert_eq!(value["scope"], json!(["user.read", "mail.read"]));
}

#[test]
fn unknown_keys_are_ignored() {
	let mut value = render(&full_request());

	value["broker_feature_from_the_future"] = json!({"enabled": true});
	value["msg_protocol_ver"] = json!(4);

	let decoded =
		SilentTokenRequest::from_json_value(value).expect("Unknown keys must not fail decoding.");

	assert_eq!(decoded, full_request_with_id(decoded.correlation_id()));
}

fn full_request_with_id(id: Uuid) -> SilentTokenRequest {
	let base = BrokerTokenRequest::builder()
		.client_id(ClientId::new(CLIENT_ID).expect("Client id is valid."))
		.redirect_uri(Url::parse("msauth.com.contoso.mail://auth").expect("Redirect URI parses."))
		.authority(
			Url::parse("https://login.microsoftonline.com/common").expect("Authority parses."),
		)
		.correlation_id(id)
		.scopes(["user.read", "mail.read"])
		.build()
		.expect("Base request fixture should build.");

	SilentTokenRequest::builder(base)
		.account(account())
		.extra_scopes_to_consent(["calendars.read", "mail.send"])
		.extra_oidc_scopes(["profile", "openid", "offline_access"])
		.extra_query_parameters([("dc", "ESTS-PUB-WUS2"), ("slice", "testslice")])
		.client_capabilities(["llt", "cp1", "llt"])
		.claims_json(CLAIMS)
		.build()
		.expect("Full request fixture should build.")
}

#[test]
fn missing_account_fails_decoding() {
	let mut value = render(&full_request());

	value.as_object_mut().expect("Payload should be a JSON object.").remove("home_account_id");

	let err = SilentTokenRequest::from_json_value(value).expect_err("Account is mandatory.");

	assert!(matches!(err, DecodeError::MissingField { field: "home_account_id" }));
}

#[test]
fn decoded_payloads_are_checked() {
	let mut value = render(&full_request());

	value["claims"] = json!([1, 2]);

	let err = SilentTokenRequest::from_json_value(value.clone())
		.expect_err("Array claims must be rejected on decode.");

	assert!(matches!(
		err,
		DecodeError::InvalidRequest(ValidationError::MalformedClaims { .. })
	));
	assert_eq!(err.code(), "malformed_claims");

	value["claims"] = json!(CLAIMS);

	assert!(
		SilentTokenRequest::from_json_value(value).is_err(),
		"Stringified claims are not an object."
	);
}

#[test]
fn broker_rejects_reserved_keys_after_decoding() {
	let policy = RequestPolicy::default().with_base_request_keys();
	let mut value = SilentTokenRequest::builder(base_request())
		.account(account())
		.build()
		.expect("Minimal request should build.")
		.to_json_value(&policy)
		.expect("Request should render as JSON.");

	value["extra_query_parameters"] = json!({"client_id": "spoofed"});

	let payload = value.to_string();

	assert!(
		SilentTokenRequest::decode(&payload).is_ok(),
		"Reserved names are policy-dependent and pass plain decoding."
	);

	let err = SilentTokenRequest::decode_and_validate(payload.as_bytes(), &policy)
		.expect_err("Broker policy must reject the reserved key.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::ReservedQueryParameter { ref key }) if key == "client_id"
	));
	assert_eq!(err.code(), "reserved_query_parameter");
}

#[test]
fn corrupted_payloads_fail_without_panicking() {
	for payload in ["", "null", "[]", "{", r#"{"scope":"user.read"}"#, "{\"client_id\":1}"] {
		assert!(
			SilentTokenRequest::decode(payload).is_err(),
			"Payload {payload:?} must be rejected."
		);
	}

	let err = SilentTokenRequest::decode(r#"{"client_id":"c","client_id":"d"}"#)
		.expect_err("Repeated top-level keys must be rejected.");

	assert_eq!(err.code(), "malformed_payload");
}
