//! In-process attribute store
//!
//! Keeps attributes in a map keyed by path and name and records every write.
//! Useful for exercising the command layer without a SmartFS mount.

use super::{AttributeStore, WriteOutcome, XattrError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// A recorded `set` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeWrite {
    pub path: PathBuf,
    pub name: String,
    pub value: Vec<u8>,
}

#[derive(Default)]
struct MemoryInner {
    values: HashMap<(PathBuf, String), Vec<u8>>,
    writes: Vec<AttributeWrite>,
    reject_with: Option<WriteOutcome>,
}

/// Attribute store backed by a `HashMap`
#[derive(Default)]
pub struct MemoryAttributes {
    inner: Mutex<MemoryInner>,
}

impl MemoryAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed an attribute value without recording a write
    pub fn insert(
        &self,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) {
        self.lock()
            .values
            .insert((path.into(), name.into()), value.into());
    }

    /// Make every subsequent `set` fail with `outcome`
    pub fn reject_writes(&self, outcome: WriteOutcome) {
        self.lock().reject_with = Some(outcome);
    }

    /// All `set` calls seen so far, including rejected ones
    pub fn writes(&self) -> Vec<AttributeWrite> {
        self.lock().writes.clone()
    }
}

impl AttributeStore for MemoryAttributes {
    fn get(&self, path: &Path, name: &str) -> Result<Option<Vec<u8>>, XattrError> {
        Ok(self
            .lock()
            .values
            .get(&(path.to_path_buf(), name.to_string()))
            .cloned())
    }

    fn set(&self, path: &Path, name: &str, value: &[u8]) -> WriteOutcome {
        let mut inner = self.lock();
        inner.writes.push(AttributeWrite {
            path: path.to_path_buf(),
            name: name.to_string(),
            value: value.to_vec(),
        });

        if let Some(outcome) = inner.reject_with.clone() {
            return outcome;
        }

        inner
            .values
            .insert((path.to_path_buf(), name.to_string()), value.to_vec());
        WriteOutcome::Success
    }
}
