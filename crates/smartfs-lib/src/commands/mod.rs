//! Version commands
//!
//! The five client operations (`list`, `snapshot`, `pin`, `cat`, `recover`).
//! Each call is single-shot: it re-reads whatever state it needs from the
//! filesystem, performs at most one request, and never retries.

mod recover;
mod render;

pub use recover::RecoverMode;
pub use render::{render_history, OutputFormat};

use crate::config::Config;
use crate::protocol::{
    encode_pin_request, encode_snapshot_request, AttributeNames, HistoryLookup, VersionHistory,
    VersionedPath, MAX_MESSAGE_LEN,
};
use crate::xattr::{AttributeStore, WriteOutcome, XattrError};
use log::{debug, info, warn};
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Exit status for failures that do not have a dedicated code
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_NOT_MANAGED: u8 = 3;
pub const EXIT_NOT_FOUND: u8 = 4;
pub const EXIT_WRITE_REJECTED: u8 = 5;
pub const EXIT_CANCELLED: u8 = 6;

/// An attribute write issued on behalf of the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteRequest {
    Snapshot { message: String },
    Pin { version: String },
}

impl fmt::Display for WriteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteRequest::Snapshot { .. } => write!(f, "snapshot"),
            WriteRequest::Pin { version } => write!(f, "pin toggle of {}", version),
        }
    }
}

fn rejection_hint(request: &WriteRequest, outcome: &WriteOutcome) -> String {
    match (request, outcome) {
        (WriteRequest::Snapshot { .. }, WriteOutcome::Unknown(_)) => {
            "file system full or all versions pinned?".to_string()
        }
        (WriteRequest::Snapshot { .. }, WriteOutcome::QuotaExceeded) => {
            "quota exceeded, unpin old versions to make room".to_string()
        }
        (WriteRequest::Pin { version }, WriteOutcome::Unknown(_))
        | (WriteRequest::Pin { version }, WriteOutcome::NotFound) => {
            format!("does version {} exist?", version)
        }
        (_, outcome) => outcome.to_string(),
    }
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("No version history found for '{}' (or not a SmartFS file).", .path.display())]
    NotManaged {
        path: PathBuf,
        /// The history attribute exists but is blank
        attribute_present: bool,
    },

    #[error("Error: File '{}' not found.", .0.display())]
    FileNotFound(PathBuf),

    #[error("Error: Version '{0}' not found.")]
    VersionNotFound(VersionedPath),

    #[error(
        "Failed: {request} of '{}' was rejected ({}).",
        .path.display(),
        rejection_hint(.request, .outcome)
    )]
    WriteRejected {
        path: PathBuf,
        request: WriteRequest,
        outcome: WriteOutcome,
    },

    #[error("Cancelled.")]
    Cancelled,

    #[error("Error: no version given for '{}' and it has no @v<N> suffix.", .0.display())]
    MissingVersion(PathBuf),

    #[error("Recovery failed: {source}")]
    Recover {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Attribute error: {0}")]
    Attribute(#[from] XattrError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    /// Process exit status for this failure class
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::NotManaged { .. } => EXIT_NOT_MANAGED,
            CommandError::FileNotFound(_) | CommandError::VersionNotFound(_) => EXIT_NOT_FOUND,
            CommandError::WriteRejected { .. } => EXIT_WRITE_REJECTED,
            CommandError::Cancelled => EXIT_CANCELLED,
            CommandError::MissingVersion(_) => EXIT_USAGE,
            CommandError::Recover { .. } | CommandError::Attribute(_) | CommandError::Io(_) => {
                EXIT_FAILURE
            }
        }
    }

    /// The reader of our output went away (e.g. `smartfs cat f v1 | head`)
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, CommandError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

/// Resolve the `cat`/`recover` target from a file and an optional version.
///
/// Without a version the file itself must carry an `@v<N>` suffix.
pub fn resolve_target(file: &Path, version: Option<&str>) -> Result<VersionedPath, CommandError> {
    match version {
        Some(version) => Ok(VersionedPath::new(file, version)),
        None => VersionedPath::parse(file)
            .ok_or_else(|| CommandError::MissingVersion(file.to_path_buf())),
    }
}

/// Runs version commands against one attribute store
pub struct VersionCommands<A> {
    attrs: A,
    names: AttributeNames,
    recover_mode: RecoverMode,
}

impl<A: AttributeStore> VersionCommands<A> {
    pub fn new(attrs: A) -> Self {
        Self {
            attrs,
            names: AttributeNames::default(),
            recover_mode: RecoverMode::default(),
        }
    }

    pub fn from_config(attrs: A, config: &Config) -> Self {
        Self::new(attrs)
            .with_names(config.attribute_names())
            .with_recover_mode(config.recover.mode)
    }

    pub fn with_names(mut self, names: AttributeNames) -> Self {
        self.names = names;
        self
    }

    pub fn with_recover_mode(mut self, mode: RecoverMode) -> Self {
        self.recover_mode = mode;
        self
    }

    pub fn attributes(&self) -> &A {
        &self.attrs
    }

    pub fn names(&self) -> &AttributeNames {
        &self.names
    }

    /// Read and classify the history attribute of `file`
    pub fn fetch_history(&self, file: &Path) -> Result<HistoryLookup, CommandError> {
        let raw = match self.attrs.get(file, &self.names.versions) {
            Ok(raw) => raw,
            Err(XattrError::Unsupported(target)) => {
                debug!("No extended attribute support on {}", target);
                None
            }
            Err(e) => return Err(e.into()),
        };
        Ok(HistoryLookup::from_raw(raw.as_deref()))
    }

    /// Print the version table of `file`
    pub fn list<W: Write>(
        &self,
        file: &Path,
        format: OutputFormat,
        out: &mut W,
    ) -> Result<VersionHistory, CommandError> {
        if let Err(e) = std::fs::metadata(file) {
            return Err(match e.kind() {
                io::ErrorKind::NotFound => CommandError::FileNotFound(file.to_path_buf()),
                _ => e.into(),
            });
        }

        let history = match self.fetch_history(file)? {
            HistoryLookup::Present(history) => history,
            lookup => {
                let attribute_present = lookup == HistoryLookup::Empty;
                debug!(
                    "History attribute {} on {:?} is {}",
                    self.names.versions,
                    file,
                    if attribute_present { "empty" } else { "absent" }
                );
                return Err(CommandError::NotManaged {
                    path: file.to_path_buf(),
                    attribute_present,
                });
            }
        };

        debug!("Decoded {} versions for {:?}", history.len(), file);
        render_history(file, &history, format, out)?;
        Ok(history)
    }

    /// Ask the filesystem to snapshot the current content of `file`
    pub fn snapshot<W: Write>(
        &self,
        file: &Path,
        message: &str,
        out: &mut W,
    ) -> Result<(), CommandError> {
        if message.len() > MAX_MESSAGE_LEN {
            warn!(
                "Snapshot message is {} bytes, SmartFS keeps at most {}",
                message.len(),
                MAX_MESSAGE_LEN
            );
        }

        writeln!(out, "Creating snapshot for '{}'...", file.display())?;
        self.write_request(
            file,
            &self.names.snapshot,
            &encode_snapshot_request(message),
            WriteRequest::Snapshot {
                message: message.to_string(),
            },
        )?;
        writeln!(out, "Success! Snapshot created.")?;
        Ok(())
    }

    /// Toggle the pin state of `version`
    pub fn pin<W: Write>(&self, file: &Path, version: &str, out: &mut W) -> Result<(), CommandError> {
        writeln!(
            out,
            "Toggling pin status for version '{}' of '{}'...",
            version,
            file.display()
        )?;
        self.write_request(
            file,
            &self.names.pin,
            &encode_pin_request(version),
            WriteRequest::Pin {
                version: version.to_string(),
            },
        )?;
        writeln!(out, "Success! Pin status toggled.")?;
        Ok(())
    }

    fn write_request(
        &self,
        file: &Path,
        name: &str,
        payload: &[u8],
        request: WriteRequest,
    ) -> Result<(), CommandError> {
        info!("Writing {} on {:?}", name, file);
        match self.attrs.set(file, name, payload) {
            WriteOutcome::Success => Ok(()),
            outcome => {
                warn!("{} on {:?} rejected: {}", request, file, outcome);
                Err(CommandError::WriteRejected {
                    path: file.to_path_buf(),
                    request,
                    outcome,
                })
            }
        }
    }

    /// Copy the content of a past version to `out`, byte for byte
    pub fn cat<W: Write>(&self, target: &VersionedPath, out: &mut W) -> Result<u64, CommandError> {
        let content = read_version(target)?;
        out.write_all(&content)?;
        out.flush()?;
        Ok(content.len() as u64)
    }

    /// Replace the live file with a past version after confirmation
    pub fn recover<R: BufRead, W: Write>(
        &self,
        target: &VersionedPath,
        input: &mut R,
        out: &mut W,
    ) -> Result<(), CommandError> {
        let dst = target.file();
        write!(
            out,
            "Are you sure you want to overwrite '{}' with content from '{}'? [y/N] ",
            dst.display(),
            target
        )?;
        out.flush()?;

        if !recover::confirm(input)? {
            info!("Recovery of {:?} cancelled", dst);
            return Err(CommandError::Cancelled);
        }

        let content = match read_version(target) {
            Ok(content) => content,
            Err(CommandError::Io(source)) => {
                return Err(CommandError::Recover {
                    path: dst.to_path_buf(),
                    source,
                })
            }
            Err(e) => return Err(e),
        };

        recover::replace_file(dst, &content, self.recover_mode).map_err(|source| {
            CommandError::Recover {
                path: dst.to_path_buf(),
                source,
            }
        })?;

        writeln!(
            out,
            "Recovered '{}' to version {}.",
            dst.display(),
            target.version()
        )?;
        Ok(())
    }
}

fn read_version(target: &VersionedPath) -> Result<Vec<u8>, CommandError> {
    let path = target.to_path_buf();
    debug!("Reading {:?}", path);
    std::fs::read(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CommandError::VersionNotFound(target.clone()),
        _ => CommandError::Io(e),
    })
}
