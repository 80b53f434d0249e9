//! Broker token requests: the base request, the silent-flow request built on top of it, the
//! shared validation rules, and the JSON wire codec.
//!
//! `base` holds the fields every broker token request carries (client, redirect, authority,
//! correlation, primary scopes). `silent` embeds a base request and adds the account and
//! protocol-extension fields a UI-less flow needs. `validate` owns the ordered checks both
//! the builder and the broker run, and `wire` turns requests into payloads and back.

pub mod base;
pub mod silent;
pub mod validate;
pub mod wire;

pub use base::*;
pub use silent::*;
pub use validate::*;
pub use wire::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientId, OrderedScopeSet},
};

/// Wire keys owned by [`BrokerTokenRequest`], in emission order.
pub const BASE_REQUEST_KEYS: [&str; 5] =
	["client_id", "redirect_uri", "authority", "correlation_id", "scope"];

/// Shared read access to the base token-request fields.
///
/// Implemented by the base request itself and by every request type that embeds one, so
/// downstream code can accept "anything with base token-request fields".
pub trait TokenRequestExt {
	/// Embedded base request.
	fn base_request(&self) -> &BrokerTokenRequest;

	/// Application (client) identifier.
	fn client_id(&self) -> &ClientId {
		BrokerTokenRequest::client_id(self.base_request())
	}

	/// Redirect URI registered for the client.
	fn redirect_uri(&self) -> &Url {
		BrokerTokenRequest::redirect_uri(self.base_request())
	}

	/// Authority the token should be issued by.
	fn authority(&self) -> &Url {
		BrokerTokenRequest::authority(self.base_request())
	}

	/// Correlation identifier shared by client and broker logs.
	fn correlation_id(&self) -> Uuid {
		BrokerTokenRequest::correlation_id(self.base_request())
	}

	/// Primary requested scopes.
	fn scopes(&self) -> &OrderedScopeSet {
		BrokerTokenRequest::scopes(self.base_request())
	}
}
impl TokenRequestExt for BrokerTokenRequest {
	fn base_request(&self) -> &BrokerTokenRequest {
		self
	}
}
impl TokenRequestExt for SilentTokenRequest {
	fn base_request(&self) -> &BrokerTokenRequest {
		self.base()
	}
}
