//! Persistent key-value substrate.
//!
//! The store never talks to a disk or a browser directly; it goes through the
//! [`Substrate`] trait, a synchronous string-keyed map with a byte quota.
//! Every write may fail with [`SubstrateError::QuotaExceeded`], and every
//! caller above this layer must handle that.
//!
//! Size accounting is the same for every implementation: an entry costs
//! `key.len() + value.len()` bytes, and replacing a value releases the old
//! entry's bytes before the new ones are charged.

mod file;
mod memory;

pub use file::FileSubstrate;
pub use memory::MemorySubstrate;

use crate::error::SubstrateError;

/// Synchronous, string-keyed, size-bounded storage medium.
pub trait Substrate: Send {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, SubstrateError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SubstrateError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), SubstrateError>;

    /// Bytes currently in use.
    fn usage(&self) -> usize;

    /// Capacity in bytes.
    fn quota(&self) -> usize;
}

pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Check a prospective write against the quota.
pub(crate) fn check_quota(
    key: &str,
    usage: usize,
    released: usize,
    value: &str,
    quota: usize,
) -> Result<(), SubstrateError> {
    let needed = usage.saturating_sub(released) + entry_size(key, value);
    if needed > quota {
        return Err(SubstrateError::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
        });
    }
    Ok(())
}
