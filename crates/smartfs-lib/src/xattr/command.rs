//! Extended attributes through the `getfattr` / `setfattr` utilities
//!
//! Used where the native calls are not compiled in, or when configured
//! explicitly. Values are always written hex encoded so `setfattr` never
//! reinterprets a message that happens to start with `0x`, `0s` or a quote.

use super::{AttributeStore, WriteOutcome, XattrError};
use log::debug;
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{Command, Output};

const GETFATTR: &str = "getfattr";
const SETFATTR: &str = "setfattr";

/// External utility backend
#[derive(Debug, Clone)]
pub struct CommandAttributes {
    getfattr: String,
    setfattr: String,
}

impl CommandAttributes {
    pub fn new() -> Self {
        Self::with_utilities(GETFATTR, SETFATTR)
    }

    /// Use alternative executables (e.g. absolute paths)
    pub fn with_utilities(getfattr: impl Into<String>, setfattr: impl Into<String>) -> Self {
        Self {
            getfattr: getfattr.into(),
            setfattr: setfattr.into(),
        }
    }

    fn run(
        program: &str,
        utility: &'static str,
        args: &[&OsStr],
    ) -> Result<Output, XattrError> {
        debug!("Running {} {:?}", program, args);
        Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                XattrError::UtilityUnavailable(utility)
            } else {
                XattrError::Io(e)
            }
        })
    }
}

impl Default for CommandAttributes {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_value(value: &[u8]) -> String {
    format!("0x{}", hex::encode(value))
}

fn classify_stderr(stderr: &str) -> WriteOutcome {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("no space left") || lower.contains("quota exceeded") {
        WriteOutcome::QuotaExceeded
    } else if lower.contains("permission denied") || lower.contains("operation not permitted") {
        WriteOutcome::PermissionDenied
    } else if lower.contains("no such file") || lower.contains("no such attribute") {
        WriteOutcome::NotFound
    } else {
        WriteOutcome::Unknown(stderr.trim().to_string())
    }
}

impl AttributeStore for CommandAttributes {
    fn get(&self, path: &Path, name: &str) -> Result<Option<Vec<u8>>, XattrError> {
        let output = Self::run(
            &self.getfattr,
            GETFATTR,
            &[
                OsStr::new("-n"),
                OsStr::new(name),
                OsStr::new("--only-values"),
                path.as_os_str(),
            ],
        )?;

        if output.status.success() {
            return Ok(Some(output.stdout));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("No such attribute") {
            return Ok(None);
        }
        if stderr.contains("Operation not supported") {
            return Err(XattrError::Unsupported(path.display().to_string()));
        }

        Err(XattrError::Utility {
            utility: GETFATTR,
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        })
    }

    fn set(&self, path: &Path, name: &str, value: &[u8]) -> WriteOutcome {
        let encoded = hex_value(value);
        let output = match Self::run(
            &self.setfattr,
            SETFATTR,
            &[
                OsStr::new("-n"),
                OsStr::new(name),
                OsStr::new("-v"),
                OsStr::new(&encoded),
                path.as_os_str(),
            ],
        ) {
            Ok(output) => output,
            Err(e) => return WriteOutcome::Unknown(e.to_string()),
        };

        if output.status.success() {
            WriteOutcome::Success
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("setfattr {} on {:?} failed: {}", name, path, stderr.trim());
            classify_stderr(&stderr)
        }
    }
}
