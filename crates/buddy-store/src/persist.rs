//! Full-replace writes with one recovery cycle.
//!
//! A write that hits the quota gets exactly one recovery attempt:
//!
//! 1. Hold the previously committed value in memory.
//! 2. Stage the new value under `<key>.staging` and verify the read-back.
//!    If the staging copy does not fit, continue without it.
//! 3. Remove the committed value and write the new one in its place.
//! 4. On success drop the staging copy. On failure put the previous value
//!    back (dropping the staging copy once that worked), then report
//!    [`StoreError::StorageExhausted`].
//!
//! Between steps 3 and 4 the new value lives only in the staging key;
//! [`read_raw`] falls back to it when the committed key is missing.
//!
//! With a fixed byte quota ([`MemorySubstrate`], [`FileSubstrate`]) a value
//! that did not fit in place cannot fit as a staged copy either, and the
//! rewrite in step 3 needs exactly the bytes the first attempt lacked. There
//! the cycle ends in step 4: the previous value is kept and the caller gets
//! `StorageExhausted`. Staging and the retry only pay off when the first
//! failure was transient, e.g. another handle released space in between.
//!
//! [`MemorySubstrate`]: crate::substrate::MemorySubstrate
//! [`FileSubstrate`]: crate::substrate::FileSubstrate

use tracing::{debug, error, info, warn};

use crate::error::{Result, StoreError, SubstrateError};
use crate::substrate::Substrate;

pub(crate) const STAGING_SUFFIX: &str = ".staging";

fn staging_key(key: &str) -> String {
    format!("{key}{STAGING_SUFFIX}")
}

/// Write `value` under `key`, recovering once from a quota failure.
pub(crate) fn write_with_recovery(sub: &mut dyn Substrate, key: &str, value: &str) -> Result<()> {
    match sub.set(key, value) {
        Ok(()) => {
            debug!(key, bytes = value.len(), "persisted");
            return Ok(());
        }
        Err(e) if e.is_quota() => {
            warn!(key, error = %e, "quota exceeded, attempting staged rewrite");
        }
        Err(e) => return Err(e.into()),
    }

    recover(sub, key, value)
}

fn recover(sub: &mut dyn Substrate, key: &str, value: &str) -> Result<()> {
    let staging = staging_key(key);
    let previous = sub.get(key)?;

    // A leftover from an interrupted recovery only wastes space here.
    sub.remove(&staging)?;
    let staged = match sub.set(&staging, value) {
        Ok(()) if sub.get(&staging)?.as_deref() == Some(value) => true,
        Ok(()) => {
            warn!(key, "staged copy failed verification, discarding it");
            sub.remove(&staging)?;
            false
        }
        Err(e) if e.is_quota() => {
            debug!(key, "no room for a staged copy, rewriting in place");
            false
        }
        Err(e) => return Err(e.into()),
    };

    sub.remove(key)?;
    match sub.set(key, value) {
        Ok(()) => {
            if staged {
                sub.remove(&staging)?;
            }
            info!(key, "recovery save successful");
            Ok(())
        }
        Err(e) => {
            let restored = restore(sub, key, previous.as_deref());
            if staged {
                if restored {
                    sub.remove(&staging)?;
                } else {
                    warn!(key, "keeping staged copy, committed value is gone");
                }
            }
            error!(key, error = %e, "unable to save even after recovery");
            match e {
                SubstrateError::QuotaExceeded { .. } => Err(StoreError::StorageExhausted {
                    key: key.to_string(),
                }),
                other => Err(other.into()),
            }
        }
    }
}

/// Put the previously committed value back. Returns false if it was lost.
fn restore(sub: &mut dyn Substrate, key: &str, previous: Option<&str>) -> bool {
    let Some(previous) = previous else { return true };
    match sub.set(key, previous) {
        Ok(()) => true,
        Err(e) => {
            error!(key, error = %e, "could not restore previous value");
            false
        }
    }
}

/// Read the committed value for `key`, or a staged copy left behind by an
/// interrupted recovery.
pub(crate) fn read_raw(sub: &dyn Substrate, key: &str) -> std::result::Result<Option<String>, SubstrateError> {
    if let Some(value) = sub.get(key)? {
        return Ok(Some(value));
    }
    let staged = sub.get(&staging_key(key))?;
    if staged.is_some() {
        warn!(key, "committed value missing, using staged copy");
    }
    Ok(staged)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::substrate::MemorySubstrate;

    /// Memory substrate that rejects chosen writes with a quota error.
    pub struct FlakySubstrate {
        pub inner: MemorySubstrate,
        /// Number of upcoming `set` calls to reject.
        pub fail_next_sets: usize,
        /// Reject every write to this key regardless of the counter.
        pub always_fail_key: Option<String>,
        pub sets: Vec<String>,
    }

    impl FlakySubstrate {
        pub fn new(inner: MemorySubstrate) -> Self {
            Self {
                inner,
                fail_next_sets: 0,
                always_fail_key: None,
                sets: Vec::new(),
            }
        }
    }

    impl Substrate for FlakySubstrate {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, SubstrateError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), SubstrateError> {
            self.sets.push(key.to_string());
            let forced = self.always_fail_key.as_deref() == Some(key);
            if forced || self.fail_next_sets > 0 {
                self.fail_next_sets = self.fail_next_sets.saturating_sub(1);
                return Err(SubstrateError::QuotaExceeded {
                    key: key.to_string(),
                    needed: value.len(),
                    quota: self.inner.quota(),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> std::result::Result<(), SubstrateError> {
            self.inner.remove(key)
        }

        fn usage(&self) -> usize {
            self.inner.usage()
        }

        fn quota(&self) -> usize {
            self.inner.quota()
        }
    }
}
