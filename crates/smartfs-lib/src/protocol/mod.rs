//! SmartFS attribute protocol
//!
//! SmartFS publishes a file's version history through an extended attribute
//! and accepts commands through two more. This module owns the textual
//! encoding of those attributes and the `path@version` addressing scheme.
//! Nothing in here performs I/O.
//!
//! ## Modules
//!
//! - [`record`]: the `versions` attribute format
//! - [`versioned_path`]: `path@version` expressions

pub mod record;
pub mod versioned_path;

pub use record::{
    decode_history, encode_history, HistoryLookup, VersionHistory, VersionRecord, PIN_MARKER,
};
pub use versioned_path::VersionedPath;

/// Attribute namespace used by SmartFS unless configured otherwise
pub const DEFAULT_NAMESPACE: &str = "user.smartfs";

/// Longest commit message the filesystem stores without truncation
pub const MAX_MESSAGE_LEN: usize = 127;

/// Fully qualified attribute names for one namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNames {
    /// Read-only history attribute
    pub versions: String,
    /// Write-only snapshot trigger
    pub snapshot: String,
    /// Write-only pin toggle
    pub pin: String,
}

impl AttributeNames {
    pub fn new(namespace: &str) -> Self {
        let namespace = namespace.trim_end_matches('.');
        Self {
            versions: format!("{}.versions", namespace),
            snapshot: format!("{}.snapshot", namespace),
            pin: format!("{}.pin", namespace),
        }
    }
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

/// Payload for a snapshot request. The message is opaque and sent verbatim.
pub fn encode_snapshot_request(message: &str) -> Vec<u8> {
    message.as_bytes().to_vec()
}

/// Payload for a pin toggle request. The version token is sent verbatim.
pub fn encode_pin_request(version_id: &str) -> Vec<u8> {
    version_id.as_bytes().to_vec()
}
