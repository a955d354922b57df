// self
use crate::{obs::RequestOutcome, resource::Category};

/// Records a request outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(category: Category, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"discogs_client_request_total",
			"resource" => category.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (category, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_request_outcome_noop_without_metrics() {
		record_request_outcome(Category::Database, RequestOutcome::Failure);
	}
}
