//! Common test utilities for smartfs-lib
//!
//! `FakeSmartFs` plays the filesystem side of the attribute protocol on top
//! of a temp directory: snapshots copy the live file to `<file>@vN`, pins
//! toggle, and the `versions` attribute is rendered from its records.

#![allow(dead_code)]

use smartfs_lib::protocol::{encode_history, AttributeNames, VersionRecord};
use smartfs_lib::xattr::{AttributeStore, WriteOutcome, XattrError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// A request seen by the fake filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub name: String,
    pub value: String,
}

#[derive(Default)]
struct FileState {
    records: Vec<VersionRecord>,
    next_id: u64,
}

pub struct FakeSmartFs {
    names: AttributeNames,
    capacity: usize,
    files: Mutex<HashMap<PathBuf, FileState>>,
    requests: Mutex<Vec<Request>>,
}

impl FakeSmartFs {
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: AttributeNames::default(),
            capacity,
            files: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Put `path` under version management with no history yet
    pub fn manage(&self, path: &Path) {
        self.files
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_insert_with(|| FileState {
                records: Vec::new(),
                next_id: 1,
            });
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn records(&self, path: &Path) -> Vec<VersionRecord> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|state| state.records.clone())
            .unwrap_or_default()
    }

    fn take_snapshot(&self, path: &Path, message: &str) -> WriteOutcome {
        let mut files = self.files.lock().unwrap();
        let state = match files.get_mut(path) {
            Some(state) => state,
            None => return WriteOutcome::Unknown("not a SmartFS file".to_string()),
        };

        if state.records.len() >= self.capacity {
            match state.records.iter().position(|r| !r.pinned) {
                Some(oldest) => {
                    state.records.remove(oldest);
                }
                None => return WriteOutcome::QuotaExceeded,
            }
        }

        let content = match std::fs::read(path) {
            Ok(content) => content,
            Err(_) => return WriteOutcome::NotFound,
        };
        let id = format!("v{}", state.next_id);
        state.next_id += 1;

        let mut versioned = path.as_os_str().to_owned();
        versioned.push(format!("@{}", id));
        if std::fs::write(PathBuf::from(versioned), &content).is_err() {
            return WriteOutcome::Unknown("could not store version".to_string());
        }

        state.records.push(VersionRecord {
            id,
            pinned: false,
            timestamp: format!("2023-01-{:02} 12:00:00", state.next_id - 1),
            message: message.to_string(),
            size_display: format!("{} bytes", content.len()),
        });
        WriteOutcome::Success
    }

    fn toggle_pin(&self, path: &Path, version: &str) -> WriteOutcome {
        let mut files = self.files.lock().unwrap();
        let record = files
            .get_mut(path)
            .and_then(|state| state.records.iter_mut().find(|r| r.id == version));
        match record {
            Some(record) => {
                record.pinned = !record.pinned;
                WriteOutcome::Success
            }
            None => WriteOutcome::NotFound,
        }
    }
}

impl AttributeStore for FakeSmartFs {
    fn get(&self, path: &Path, name: &str) -> Result<Option<Vec<u8>>, XattrError> {
        if name != self.names.versions {
            return Ok(None);
        }
        let files = self.files.lock().unwrap();
        Ok(files
            .get(path)
            .map(|state| encode_history(&state.records).into_bytes()))
    }

    fn set(&self, path: &Path, name: &str, value: &[u8]) -> WriteOutcome {
        let value = String::from_utf8_lossy(value).to_string();
        self.requests.lock().unwrap().push(Request {
            name: name.to_string(),
            value: value.clone(),
        });

        if name == self.names.snapshot {
            self.take_snapshot(path, &value)
        } else if name == self.names.pin {
            self.toggle_pin(path, &value)
        } else {
            WriteOutcome::PermissionDenied
        }
    }
}

/// A temp directory holding one live file
pub struct Workspace {
    pub dir: TempDir,
    pub file: PathBuf,
}

impl Workspace {
    pub fn new(name: &str, content: &[u8]) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let file = dir.path().join(name);
        std::fs::write(&file, content).expect("failed to write live file");
        Self { dir, file }
    }

    pub fn write(&self, content: &[u8]) {
        std::fs::write(&self.file, content).expect("failed to write live file");
    }

    pub fn read(&self) -> Vec<u8> {
        std::fs::read(&self.file).expect("failed to read live file")
    }

    /// Store content as if the filesystem kept it as `version`
    pub fn add_version(&self, version: &str, content: &[u8]) {
        let mut path = self.file.as_os_str().to_owned();
        path.push(format!("@{}", version));
        std::fs::write(PathBuf::from(path), content).expect("failed to write version");
    }
}
