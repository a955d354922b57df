//! File-backed [`QuotaStore`] shared by every process on the machine.

// std
use std::{
	env,
	fs::{self, File, OpenOptions},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
	process, thread,
	time::Duration as StdDuration,
};
// self
use crate::{
	_prelude::*,
	gate::{GateFuture, QuotaStore, RecordApply, StoreError},
};

/// Well-known record file name, shared with earlier tooling on the same machine.
const RECORD_FILE_NAME: &str = "discogs_rate_limit.lock";

/// Persists the quota record as a single line in a well-known file.
///
/// Cross-process exclusion uses a sidecar lock file created with `O_EXCL` and held for
/// the duration of one read-modify-write cycle. The sidecar is removed when the cycle
/// ends; a crashed holder leaves it behind for manual cleanup, and contended cycles
/// give up with [`StoreError::LockBusy`] after a short bounded wait.
#[derive(Clone, Debug)]
pub struct FileQuotaStore {
	path: PathBuf,
}
impl FileQuotaStore {
	/// Opens a store at the provided path, creating parent directories as needed.
	///
	/// The record file itself is not created until the first cycle persists a record.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		Ok(Self { path })
	}

	/// Returns the conventional record path in the system temp directory.
	pub fn default_path() -> PathBuf {
		env::temp_dir().join(RECORD_FILE_NAME)
	}

	/// Returns the record path this store was opened at.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn read_line(&self) -> Result<Option<String>, StoreError> {
		if !self.path.exists() {
			return Ok(None);
		}

		fs::read_to_string(&self.path).map(Some).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", self.path.display()),
		})
	}

	fn persist(&self, line: &str) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(line.as_bytes()).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn guard_path(&self) -> PathBuf {
		let mut path = self.path.clone().into_os_string();

		path.push(".guard");

		PathBuf::from(path)
	}
}
impl QuotaStore for FileQuotaStore {
	fn read_modify_write<'a>(&'a self, apply: RecordApply<'a>) -> GateFuture<'a, ()> {
		Box::pin(async move {
			let _guard = SidecarLock::acquire(self.guard_path())?;
			let current = self.read_line()?;
			let next = apply(current.as_deref())?;

			self.persist(&next)?;

			Ok(())
		})
	}
}

/// Exclusive sidecar lock; exists on disk exactly while one cycle is running.
struct SidecarLock {
	path: PathBuf,
}
impl SidecarLock {
	const ATTEMPTS: u32 = 50;
	const RETRY_DELAY: StdDuration = StdDuration::from_millis(10);

	fn acquire(path: PathBuf) -> Result<Self, StoreError> {
		for _ in 0..Self::ATTEMPTS {
			match OpenOptions::new().write(true).create_new(true).open(&path) {
				Ok(mut file) => {
					// Holder pid, for whoever has to clean up after a crash.
					let _ = write!(file, "{}", process::id());

					return Ok(Self { path });
				},
				Err(e) if e.kind() == ErrorKind::AlreadyExists =>
					thread::sleep(Self::RETRY_DELAY),
				Err(e) =>
					return Err(StoreError::Backend {
						message: format!("Failed to create lock {}: {e}", path.display()),
					}),
			}
		}

		Err(StoreError::LockBusy { path: path.display().to_string() })
	}
}
impl Drop for SidecarLock {
	fn drop(&mut self) {
		let _ = fs::remove_file(&self.path);
	}
}
