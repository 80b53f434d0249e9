// self
use crate::obs::{RequestOutcome, RequestStage, trace_failure};

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(stage: RequestStage, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"broker_silent_request_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}

/// Records a failed stage along with the error's stable code.
pub fn record_request_failure(stage: RequestStage, code: &'static str) {
	trace_failure(stage, code);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"broker_silent_request_total",
			"stage" => stage.as_str(),
			"outcome" => RequestOutcome::Failure.as_str(),
			"code" => code
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = code;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_outcomes_noop_without_metrics() {
		record_request_outcome(RequestStage::Encode, RequestOutcome::Attempt);
		record_request_failure(RequestStage::Validate, "reserved_query_parameter");
	}
}
