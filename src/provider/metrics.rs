// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for negotiations run by one provider.
#[derive(Debug, Default)]
pub struct NegotiationMetrics {
	attempts: AtomicU64,
	refresh_attempts: AtomicU64,
	refresh_rejections: AtomicU64,
	primary_exchanges: AtomicU64,
	successes: AtomicU64,
	refresh_successes: AtomicU64,
	failures: AtomicU64,
}
impl NegotiationMetrics {
	/// Returns the number of negotiations started.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh exchanges sent.
	pub fn refresh_attempts(&self) -> u64 {
		self.refresh_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh exchanges rejected with HTTP 401.
	pub fn refresh_rejections(&self) -> u64 {
		self.refresh_rejections.load(Ordering::Relaxed)
	}

	/// Returns the number of primary grant exchanges sent.
	pub fn primary_exchanges(&self) -> u64 {
		self.primary_exchanges.load(Ordering::Relaxed)
	}

	/// Returns the number of negotiations that produced a bearer token.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Returns the number of negotiations completed by the stored refresh token alone.
	pub fn refresh_successes(&self) -> u64 {
		self.refresh_successes.load(Ordering::Relaxed)
	}

	/// Returns the number of negotiations that failed.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_attempt(&self) {
		self.refresh_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_rejection(&self) {
		self.refresh_rejections.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_success(&self) {
		self.refresh_successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_primary_exchange(&self) {
		self.primary_exchanges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
