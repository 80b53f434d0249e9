//! Optional observability hooks for silent request handling.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `broker_request.silent` with the `stage`
//!   field (`build`, `validate`, `encode`, `decode`).
//! - Enable `metrics` to increment the `broker_silent_request_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome` (+ `code` on failures).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Processing stages a silent request passes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestStage {
	/// Builder assembling a request on the client side.
	Build,
	/// Validation against a host policy.
	Validate,
	/// Rendering the wire payload.
	Encode,
	/// Parsing a wire payload on the broker side.
	Decode,
}
impl RequestStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestStage::Build => "build",
			RequestStage::Validate => "validate",
			RequestStage::Encode => "encode",
			RequestStage::Decode => "decode",
		}
	}
}
impl Display for RequestStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `f` inside a stage span, recording attempt and success/failure outcomes.
pub(crate) fn observe<T, E, C, F>(stage: RequestStage, code: C, f: F) -> Result<T, E>
where
	C: FnOnce(&E) -> &'static str,
	F: FnOnce() -> Result<T, E>,
{
	let _guard = RequestSpan::new(stage).entered();

	record_request_outcome(stage, RequestOutcome::Attempt);

	let result = f();

	match &result {
		Ok(_) => record_request_outcome(stage, RequestOutcome::Success),
		Err(e) => record_request_failure(stage, code(e)),
	}

	result
}
