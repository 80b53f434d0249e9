// self
use crate::{_prelude::*, obs::RequestStage};

/// A span builder used around request stages.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: RequestStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!("broker_request.silent", stage = stage.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Enters the span for the duration of the returned guard.
	pub fn entered(self) -> RequestSpanGuard {
		#[cfg(feature = "tracing")]
		{
			RequestSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			RequestSpanGuard {}
		}
	}
}

/// RAII guard returned by [`RequestSpan::entered`].
pub struct RequestSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for RequestSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RequestSpanGuard(..)")
	}
}

/// Emits a debug event naming the failure code; no-op without the `tracing` feature.
pub(crate) fn trace_failure(stage: RequestStage, code: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(stage = stage.as_str(), code, "silent request rejected");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, code);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_span_noop_without_tracing() {
		let _guard = RequestSpan::new(RequestStage::Decode).entered();
		// Compile-time smoke test ensures the guard exists even when tracing is disabled.
	}
}
