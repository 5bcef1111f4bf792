//! `path@version` addressing
//!
//! SmartFS serves the content of a past version when a file is opened under
//! its name with an `@<version>` suffix. The version token is resolved by the
//! filesystem (`v3`, `2h`, `yesterday`, ...); the client never validates it.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

const VERSION_SEPARATOR: char = '@';

/// A file path paired with a version token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedPath {
    file: PathBuf,
    version: String,
}

impl VersionedPath {
    pub fn new(file: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            version: version.into(),
        }
    }

    /// Split an already suffixed path such as `notes.txt@v3`.
    ///
    /// Only the last `@` counts, it may not start the file name, and it must
    /// be followed by `v` and digits. Anything else (`user@example.com`,
    /// `@v1`, `notes.txt@2h`) is not treated as a versioned path.
    pub fn parse(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let at = name.rfind(VERSION_SEPARATOR)?;
        if at == 0 {
            return None;
        }

        let version = &name[at + 1..];
        let digits = version.strip_prefix('v')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(Self {
            file: path.with_file_name(&name[..at]),
            version: version.to_string(),
        })
    }

    /// The live file this expression refers to
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The path handed to the filesystem for resolution
    pub fn to_path_buf(&self) -> PathBuf {
        let mut joined = OsString::from(self.file.as_os_str());
        joined.push("@");
        joined.push(&self.version);
        PathBuf::from(joined)
    }
}

impl fmt::Display for VersionedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.file.display(), self.version)
    }
}
