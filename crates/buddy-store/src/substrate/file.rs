use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{check_quota, entry_size, Substrate};
use crate::error::SubstrateError;

/// Directory-backed substrate: one file per key.
///
/// Writes go to a hidden temporary file that is renamed over the target, so a
/// crash mid-write leaves either the old value or the new one, never a torn
/// file.
///
/// Several handles may share one directory. Usage is re-read from disk before
/// every write, so a handle never charges against a stale count.
#[derive(Debug)]
pub struct FileSubstrate {
    dir: PathBuf,
    usage: usize,
    quota: usize,
}

impl FileSubstrate {
    /// Open (or create) a substrate rooted at `dir`.
    pub fn open(dir: &Path, quota: usize) -> Result<Self, SubstrateError> {
        fs::create_dir_all(dir)?;
        let usage = scan_usage(dir)?;

        tracing::info!(path = %dir.display(), usage, quota, "opened file substrate");

        Ok(Self {
            dir: dir.to_path_buf(),
            usage,
            quota,
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, SubstrateError> {
        if !is_valid_key(key) {
            return Err(SubstrateError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }

    fn stored_len(&self, path: &Path) -> Result<Option<usize>, SubstrateError> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(meta.len() as usize)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Substrate for FileSubstrate {
    fn get(&self, key: &str) -> Result<Option<String>, SubstrateError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SubstrateError> {
        let path = self.path_for(key)?;
        let released = self
            .stored_len(&path)?
            .map(|len| key.len() + len)
            .unwrap_or(0);
        self.usage = scan_usage(&self.dir)?;
        check_quota(key, self.usage, released, value, self.quota)?;

        let tmp = self.dir.join(format!(".{key}.tmp"));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;

        self.usage = self.usage.saturating_sub(released) + entry_size(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SubstrateError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.usage = scan_usage(&self.dir)?;
        Ok(())
    }

    fn usage(&self) -> usize {
        scan_usage(&self.dir).unwrap_or(self.usage)
    }

    fn quota(&self) -> usize {
        self.quota
    }
}

/// Bytes held by every valid key file in `dir`.
fn scan_usage(dir: &Path) -> Result<usize, SubstrateError> {
    let mut usage = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(key) = name.to_str() else { continue };
        if !is_valid_key(key) || !entry.file_type()?.is_file() {
            continue;
        }
        usage += key.len() + entry.metadata()?.len() as usize;
    }
    Ok(usage)
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
