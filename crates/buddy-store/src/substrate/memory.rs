use std::collections::BTreeMap;

use super::{check_quota, entry_size, Substrate};
use crate::error::SubstrateError;

/// In-process substrate. Contents vanish with the value.
#[derive(Debug, Clone)]
pub struct MemorySubstrate {
    entries: BTreeMap<String, String>,
    usage: usize,
    quota: usize,
}

impl MemorySubstrate {
    pub fn new(quota: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            usage: 0,
            quota,
        }
    }
}

impl Default for MemorySubstrate {
    fn default() -> Self {
        Self::new(buddy_shared::constants::DEFAULT_QUOTA_BYTES)
    }
}

impl Substrate for MemorySubstrate {
    fn get(&self, key: &str) -> Result<Option<String>, SubstrateError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SubstrateError> {
        let released = self
            .entries
            .get(key)
            .map(|old| entry_size(key, old))
            .unwrap_or(0);
        check_quota(key, self.usage, released, value, self.quota)?;

        self.usage = self.usage - released + entry_size(key, value);
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SubstrateError> {
        if let Some(old) = self.entries.remove(key) {
            self.usage -= entry_size(key, &old);
        }
        Ok(())
    }

    fn usage(&self) -> usize {
        self.usage
    }

    fn quota(&self) -> usize {
        self.quota
    }
}
