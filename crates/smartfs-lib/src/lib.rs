pub mod cli;
pub mod commands;
pub mod config;
pub mod protocol;
pub mod xattr;

pub use commands::{CommandError, RecoverMode, VersionCommands};
pub use config::{Config, ConfigError};
pub use protocol::{HistoryLookup, VersionHistory, VersionRecord, VersionedPath};
pub use xattr::{AttributeStore, Backend, WriteOutcome, XattrError};
