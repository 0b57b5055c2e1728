//! Optional observability helpers for token negotiations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `uaa_token_provider.negotiation` with
//!   the `grant` (configured primary grant) and `stage` (call site) fields, plus debug events
//!   for each exchange and for the diagnostic claims of issued tokens.
//! - Enable `metrics` to increment the `uaa_token_provider_negotiation_total` counter for
//!   every attempt/fallback/success/failure, labeled by `grant` + `outcome`.
//!
//! Installing a subscriber or recorder is left to the application.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each negotiation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// An exchange is about to be sent.
	Attempt,
	/// The token endpoint rejected a stored refresh token and the primary grant takes over.
	Fallback,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Fallback => "fallback",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
