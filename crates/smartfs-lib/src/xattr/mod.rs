//! Extended attribute access
//!
//! SmartFS is driven entirely through `get`/`set` of attributes on the
//! managed file. The [`AttributeStore`] trait captures that contract; the
//! backends differ only in how the calls reach the kernel.

mod command;
mod memory;
#[cfg(any(target_os = "linux", target_os = "android"))]
mod native;

pub use command::CommandAttributes;
pub use memory::{AttributeWrite, MemoryAttributes};
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use native::NativeAttributes;

use log::debug;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XattrError {
    #[error("extended attributes are not supported on {0}")]
    Unsupported(String),

    #[error("{0} is not installed")]
    UtilityUnavailable(&'static str),

    #[error("{utility} exited with {status}: {stderr}")]
    Utility {
        utility: &'static str,
        status: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of an attribute write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Success,
    QuotaExceeded,
    PermissionDenied,
    NotFound,
    /// The write failed for a reason the backend could not classify
    Unknown(String),
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WriteOutcome::Success)
    }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOutcome::Success => write!(f, "success"),
            WriteOutcome::QuotaExceeded => write!(f, "quota exceeded"),
            WriteOutcome::PermissionDenied => write!(f, "permission denied"),
            WriteOutcome::NotFound => write!(f, "not found"),
            WriteOutcome::Unknown(detail) if detail.is_empty() => write!(f, "unknown failure"),
            WriteOutcome::Unknown(detail) => write!(f, "{}", detail),
        }
    }
}

/// Attribute get/set against a file path
pub trait AttributeStore {
    /// Read an attribute. `Ok(None)` means the attribute does not exist.
    fn get(&self, path: &Path, name: &str) -> Result<Option<Vec<u8>>, XattrError>;

    /// Write an attribute
    fn set(&self, path: &Path, name: &str, value: &[u8]) -> WriteOutcome;
}

impl<T: AttributeStore + ?Sized> AttributeStore for &T {
    fn get(&self, path: &Path, name: &str) -> Result<Option<Vec<u8>>, XattrError> {
        (**self).get(path, name)
    }

    fn set(&self, path: &Path, name: &str, value: &[u8]) -> WriteOutcome {
        (**self).set(path, name, value)
    }
}

impl<T: AttributeStore + ?Sized> AttributeStore for Box<T> {
    fn get(&self, path: &Path, name: &str) -> Result<Option<Vec<u8>>, XattrError> {
        (**self).get(path, name)
    }

    fn set(&self, path: &Path, name: &str, value: &[u8]) -> WriteOutcome {
        (**self).set(path, name, value)
    }
}

/// Which attribute backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// System calls where compiled in, external utilities otherwise
    #[default]
    Auto,
    Native,
    Command,
}

impl Backend {
    /// Build the attribute store for this backend
    pub fn open(self) -> Result<Box<dyn AttributeStore>, XattrError> {
        match self {
            Backend::Auto => {
                #[cfg(any(target_os = "linux", target_os = "android"))]
                {
                    debug!("Using native extended attribute calls");
                    Ok(Box::new(NativeAttributes))
                }
                #[cfg(not(any(target_os = "linux", target_os = "android")))]
                {
                    debug!("Native extended attributes unavailable, using getfattr/setfattr");
                    Ok(Box::new(CommandAttributes::new()))
                }
            }
            Backend::Native => {
                #[cfg(any(target_os = "linux", target_os = "android"))]
                {
                    Ok(Box::new(NativeAttributes))
                }
                #[cfg(not(any(target_os = "linux", target_os = "android")))]
                {
                    Err(XattrError::Unsupported(std::env::consts::OS.to_string()))
                }
            }
            Backend::Command => Ok(Box::new(CommandAttributes::new())),
        }
    }
}
