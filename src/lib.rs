//! Typed silent token requests for OAuth 2.0 brokers. Construct, validate, and encode the
//! payload a client hands to a trusted broker process, then decode and re-check it on the
//! broker side.
//!
//! The central type is [`request::SilentTokenRequest`]. It embeds a
//! [`request::BrokerTokenRequest`] base and adds the account identity, extra scopes,
//! authorize-URL passthrough parameters, client capabilities, and raw claims that a silent
//! flow needs. Validation errors surface before anything crosses the process boundary; the
//! broker side decodes with [`request::SilentTokenRequest::decode`] and re-validates against
//! its own [`config::RequestPolicy`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod obs;
pub mod request;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use url::Url;
	pub use uuid::Uuid;

	pub use crate::error::{Error, Result};
}

pub use url;
pub use uuid;
#[cfg(test)] use color_eyre as _;
