//! Cross-process rate-limit gate guarding every outbound API call.
//!
//! The Discogs quota is enforced per source address, so counting calls in process
//! memory under-counts as soon as a second process shares the address. The gate keeps
//! its state in a [`QuotaStore`] instead: one persisted record holding the caller's
//! external address, the start of the current window, and the calls spent in it. Each
//! gated call runs a single read-check-increment-write cycle under the store's
//! exclusive lock, and the persisted record stays the sole source of truth between
//! calls.
//!
//! The gate never sleeps and never retries. A spent budget surfaces as
//! [`Error::RateLimitExceeded`] for the caller to wait out; a corrupt record surfaces
//! as [`Error::QuotaRecord`] until someone repairs or removes the stored state.

pub mod file;
pub mod ip;
pub mod memory;

pub use file::FileQuotaStore;
pub use memory::MemoryQuotaStore;

// std
use std::net::Ipv4Addr;
// crates.io
use async_lock::OnceCell;
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::{_prelude::*, gate::ip::IpLookup};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]");

/// Boxed future returned by [`QuotaStore::read_modify_write`].
pub type GateFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;
/// One read-modify-write step: receives the persisted line (if any) and returns the
/// replacement line to persist, or an error that aborts the cycle with nothing written.
pub type RecordApply<'a> = Box<dyn FnOnce(Option<&str>) -> Result<String> + 'a + Send>;

/// Storage contract for the shared quota record.
///
/// Implementations must hold an exclusive lock for the whole cycle, from reading the
/// record through persisting its replacement, so two gates sharing the store can never
/// both observe a count below the limit and both increment past it.
pub trait QuotaStore
where
	Self: Send + Sync,
{
	/// Runs one locked read-modify-write cycle against the persisted record.
	fn read_modify_write<'a>(&'a self, apply: RecordApply<'a>) -> GateFuture<'a, ()>;
}

/// Error type produced by [`QuotaStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// The exclusive lock could not be acquired within the store's patience.
	#[error("Quota store lock at {path} is held by another process.")]
	LockBusy {
		/// Filesystem path of the contended lock.
		path: String,
	},
}

/// Parse failures for the persisted quota record. Always fatal; the gate never
/// substitutes a default for state it cannot read.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum QuotaRecordError {
	/// The line does not split into address, timestamp, and count.
	#[error("Quota record {line:?} does not match the `<ip>_<timestamp>_<count>` layout.")]
	Malformed {
		/// Offending record line.
		line: String,
	},
	/// The address component is not dotted IPv4.
	#[error("Quota record address {value:?} is not a dotted IPv4 address.")]
	Address {
		/// Offending address component.
		value: String,
	},
	/// The timestamp component is not minute-precision ISO-8601.
	#[error("Quota record timestamp {value:?} is not a minute-precision timestamp.")]
	Timestamp {
		/// Offending timestamp component.
		value: String,
	},
	/// The count component is not a decimal integer.
	#[error("Quota record count {value:?} is not a decimal count.")]
	Count {
		/// Offending count component.
		value: String,
	},
}

/// The persisted quota record: `"<ip>_<YYYY-MM-DDTHH:MM>_<count>"`.
///
/// The layout is byte-compatible with the lock file written by earlier tooling, so a
/// gate and its predecessors can share one record on the same machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotaRecord {
	/// Externally observed IPv4 address, captured when the window opened.
	pub ip: Ipv4Addr,
	/// Instant the current window started, truncated to the minute.
	pub window_started_at: OffsetDateTime,
	/// Calls recorded within the current window.
	pub count: u64,
}
impl QuotaRecord {
	/// Parses a persisted record line.
	pub fn parse(line: &str) -> Result<Self, QuotaRecordError> {
		let trimmed = line.trim();
		let malformed = || QuotaRecordError::Malformed { line: trimmed.to_owned() };
		let (ip_part, rest) = trimmed.split_once('_').ok_or_else(malformed)?;
		let (ts_part, count_part) = rest.rsplit_once('_').ok_or_else(malformed)?;
		let ip = Ipv4Addr::from_str(ip_part)
			.map_err(|_| QuotaRecordError::Address { value: ip_part.to_owned() })?;
		let window_started_at = PrimitiveDateTime::parse(ts_part, TIMESTAMP_FORMAT)
			.map_err(|_| QuotaRecordError::Timestamp { value: ts_part.to_owned() })?
			.assume_utc();

		if count_part.is_empty() || !count_part.bytes().all(|b| b.is_ascii_digit()) {
			return Err(QuotaRecordError::Count { value: count_part.to_owned() });
		}

		let count = count_part
			.parse()
			.map_err(|_| QuotaRecordError::Count { value: count_part.to_owned() })?;

		Ok(Self { ip, window_started_at, count })
	}

	/// Renders the record into its single-line persisted form.
	pub fn render(&self) -> String {
		let at = self.window_started_at;

		format!(
			"{}_{:04}-{:02}-{:02}T{:02}:{:02}_{}",
			self.ip,
			at.year(),
			u8::from(at.month()),
			at.day(),
			at.hour(),
			at.minute(),
			self.count,
		)
	}
}
impl Display for QuotaRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.render())
	}
}

/// Gate configuration, fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateConfig {
	/// Maximum calls permitted per window.
	pub limit: u64,
	/// Window length; the window resets entirely once it expires.
	pub period: Duration,
}
impl GateConfig {
	/// Default call budget per window, matching the documented API quota.
	pub const DEFAULT_LIMIT: u64 = 1_000;
	/// Default window length, matching the documented API quota.
	pub const DEFAULT_PERIOD: Duration = Duration::hours(24);

	/// Overrides the call budget.
	pub fn with_limit(mut self, limit: u64) -> Self {
		self.limit = limit;

		self
	}

	/// Overrides the window length.
	pub fn with_period(mut self, period: Duration) -> Self {
		self.period = period;

		self
	}
}
impl Default for GateConfig {
	fn default() -> Self {
		Self { limit: Self::DEFAULT_LIMIT, period: Self::DEFAULT_PERIOD }
	}
}

/// Rate-limit gate coordinating call budgets across independent processes.
///
/// Construction is cheap and performs no I/O; the external address is resolved once,
/// on the first call that needs it, and cached for the gate's lifetime.
pub struct RateGate {
	config: GateConfig,
	store: Arc<dyn QuotaStore>,
	lookup: Arc<dyn IpLookup>,
	serial: AsyncMutex<()>,
	ip: OnceCell<Ipv4Addr>,
}
impl RateGate {
	/// Creates a gate over the provided store and address lookup.
	pub fn new(config: GateConfig, store: Arc<dyn QuotaStore>, lookup: Arc<dyn IpLookup>) -> Self {
		Self { config, store, lookup, serial: AsyncMutex::new(()), ip: OnceCell::new() }
	}

	/// Returns the configuration the gate was built with.
	pub fn config(&self) -> GateConfig {
		self.config
	}

	/// Writes a fresh record with a zero count and a window starting now, replacing any
	/// existing record.
	pub async fn initialize(&self) -> Result<()> {
		let ip = self.external_ip().await?;
		let _serial = self.serial.lock().await;
		let record = QuotaRecord { ip, window_started_at: OffsetDateTime::now_utc(), count: 0 };

		self.store.read_modify_write(Box::new(move |_| Ok(record.render()))).await
	}

	/// Records one gated call against the current window, or refuses it.
	///
	/// On success the persisted count has been incremented (or the window reset and the
	/// call recorded as its first). On [`Error::RateLimitExceeded`] the record is
	/// untouched and the gated network call must not be made.
	pub async fn check_and_increment(&self) -> Result<()> {
		self.check_and_increment_at(OffsetDateTime::now_utc()).await
	}

	/// Evaluates the gate against the supplied instant instead of the current time.
	pub async fn check_and_increment_at(&self, now: OffsetDateTime) -> Result<()> {
		let ip = self.external_ip().await?;
		let _serial = self.serial.lock().await;
		let config = self.config;

		self.store
			.read_modify_write(Box::new(move |raw| {
				Ok(Self::next_record(&config, ip, now, raw)?.render())
			}))
			.await
	}

	/// Decides the record that one successful call leaves behind, or why the call is
	/// refused. Pure: all persistence happens in the enclosing store cycle.
	fn next_record(
		config: &GateConfig,
		ip: Ipv4Addr,
		now: OffsetDateTime,
		raw: Option<&str>,
	) -> Result<QuotaRecord> {
		let record = match raw {
			Some(raw) => QuotaRecord::parse(raw)?,
			// No record yet: behave as a freshly initialized window.
			None => QuotaRecord { ip, window_started_at: now, count: 0 },
		};
		let elapsed = now - record.window_started_at;

		if elapsed < config.period {
			if record.count >= config.limit {
				return Err(Error::RateLimitExceeded {
					limit: config.limit,
					elapsed_hours: elapsed.as_seconds_f64() / 3_600.,
					remaining_hours: (config.period - elapsed).as_seconds_f64() / 3_600.,
				});
			}

			Ok(QuotaRecord { count: record.count + 1, ..record })
		} else {
			Ok(QuotaRecord { ip, window_started_at: now, count: 1 })
		}
	}

	async fn external_ip(&self) -> Result<Ipv4Addr> {
		self.ip.get_or_try_init(|| self.lookup.lookup()).await.copied()
	}
}
impl Debug for RateGate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RateGate")
			.field("config", &self.config)
			.field("ip", &self.ip.get())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::gate::ip::StaticIpLookup;

	const IP: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 7);

	fn gate(limit: u64, store: Arc<MemoryQuotaStore>) -> RateGate {
		RateGate::new(
			GateConfig::default().with_limit(limit),
			store,
			Arc::new(StaticIpLookup::new(IP)),
		)
	}

	fn stored_count(store: &MemoryQuotaStore) -> u64 {
		QuotaRecord::parse(&store.line().expect("Store should hold a record."))
			.expect("Stored record should parse.")
			.count
	}

	#[test]
	fn record_render_and_parse_round_trip() {
		let record = QuotaRecord {
			ip: IP,
			window_started_at: datetime!(2026-08-06 09:05 UTC),
			count: 42,
		};
		let line = record.render();

		assert_eq!(line, "203.0.113.7_2026-08-06T09:05_42");
		assert_eq!(QuotaRecord::parse(&line).expect("Rendered record should parse."), record);
	}

	#[test]
	fn record_parse_rejects_each_malformed_component() {
		assert!(matches!(
			QuotaRecord::parse("garbage"),
			Err(QuotaRecordError::Malformed { .. }),
		));
		assert!(matches!(
			QuotaRecord::parse("203.0.113.7_2026-08-06T09:05"),
			Err(QuotaRecordError::Timestamp { .. }),
		));
		assert!(matches!(
			QuotaRecord::parse("example.com_2026-08-06T09:05_1"),
			Err(QuotaRecordError::Address { .. }),
		));
		assert!(matches!(
			QuotaRecord::parse("203.0.113.7_yesterday_1"),
			Err(QuotaRecordError::Timestamp { .. }),
		));
		assert!(matches!(
			QuotaRecord::parse("203.0.113.7_2026-08-06T09:05_+5"),
			Err(QuotaRecordError::Count { .. }),
		));
		assert!(matches!(
			QuotaRecord::parse("203.0.113.7_2026-08-06T09:05_"),
			Err(QuotaRecordError::Count { .. }),
		));
	}

	#[test]
	fn next_record_counts_within_a_window_and_resets_after_it() {
		let config = GateConfig::default().with_limit(2);
		let start = datetime!(2026-08-06 00:00 UTC);
		let first = RateGate::next_record(&config, IP, start, None)
			.expect("First call of a fresh gate should pass.");

		assert_eq!(first.count, 1);
		assert_eq!(first.window_started_at, start);

		let line = first.render();
		let second = RateGate::next_record(&config, IP, start + Duration::minutes(5), Some(&line))
			.expect("Second call within the budget should pass.");

		assert_eq!(second.count, 2);
		assert_eq!(second.window_started_at, start);

		let line = second.render();
		let refused = RateGate::next_record(&config, IP, start + Duration::hours(6), Some(&line))
			.expect_err("Third call should exceed a limit of 2.");
		let Error::RateLimitExceeded { limit, elapsed_hours, remaining_hours } = refused else {
			panic!("Expected RateLimitExceeded, got {refused:?}.");
		};

		assert_eq!(limit, 2);
		assert!((elapsed_hours - 6.).abs() < f64::EPSILON);
		assert!((remaining_hours - 18.).abs() < f64::EPSILON);

		let reset = RateGate::next_record(&config, IP, start + Duration::hours(24), Some(&line))
			.expect("A call after the window expired should pass.");

		assert_eq!(reset.count, 1);
		assert_eq!(reset.window_started_at, start + Duration::hours(24));
	}

	#[test]
	fn next_record_never_defaults_a_corrupt_record() {
		let err = RateGate::next_record(
			&GateConfig::default(),
			IP,
			datetime!(2026-08-06 00:00 UTC),
			Some("not a record"),
		)
		.expect_err("A corrupt record must refuse the call.");

		assert!(matches!(err, Error::QuotaRecord(_)));
	}

	#[tokio::test]
	async fn gate_counts_calls_and_refuses_the_excess() {
		let store = Arc::new(MemoryQuotaStore::default());
		let gate = gate(3, store.clone());
		let now = datetime!(2026-08-06 12:00 UTC);

		for expected in 1..=3 {
			gate.check_and_increment_at(now)
				.await
				.expect("Calls within the budget should pass.");

			assert_eq!(stored_count(&store), expected);
		}

		let refused = gate
			.check_and_increment_at(now + Duration::minutes(1))
			.await
			.expect_err("The fourth call should be refused.");

		assert!(matches!(refused, Error::RateLimitExceeded { limit: 3, .. }));
		assert_eq!(stored_count(&store), 3, "a refused call must leave the record unchanged");

		gate.check_and_increment_at(now + Duration::hours(25))
			.await
			.expect("A call after the window expired should pass.");

		assert_eq!(stored_count(&store), 1);
	}

	#[tokio::test]
	async fn initialize_overwrites_with_a_zero_count() {
		let store = Arc::new(MemoryQuotaStore::with_line("junk"));
		let gate = gate(10, store.clone());

		gate.initialize().await.expect("Initialization should overwrite junk state.");

		assert_eq!(stored_count(&store), 0);
	}
}
