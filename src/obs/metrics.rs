// self
use crate::{grant::GrantType, obs::FlowOutcome};

/// Records a negotiation step via the global metrics recorder (when enabled).
pub fn record_flow_outcome(grant: GrantType, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"uaa_token_provider_negotiation_total",
			"grant" => grant.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (grant, outcome);
	}
}
