//! In-process [`QuotaStore`] implementation for tests and single-process tools.

// self
use crate::{
	_prelude::*,
	gate::{GateFuture, QuotaStore, RecordApply},
};

/// Keeps the record line in process memory; the mutex spans each full cycle.
///
/// Useful for tests and for callers that accept per-process counting. Anything that
/// shares an address across processes should use
/// [`FileQuotaStore`](crate::gate::FileQuotaStore) instead.
#[derive(Clone, Debug, Default)]
pub struct MemoryQuotaStore(Arc<Mutex<Option<String>>>);
impl MemoryQuotaStore {
	/// Creates a store pre-seeded with the provided record line.
	pub fn with_line(line: impl Into<String>) -> Self {
		Self(Arc::new(Mutex::new(Some(line.into()))))
	}

	/// Returns a copy of the stored record line, if any.
	pub fn line(&self) -> Option<String> {
		self.0.lock().clone()
	}
}
impl QuotaStore for MemoryQuotaStore {
	fn read_modify_write<'a>(&'a self, apply: RecordApply<'a>) -> GateFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.0.lock();
			let next = apply(guard.as_deref())?;

			*guard = Some(next);

			Ok(())
		})
	}
}
