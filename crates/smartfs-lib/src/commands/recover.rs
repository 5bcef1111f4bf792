//! Confirmation and file replacement for `recover`

use log::debug;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::Path;
use uuid::Uuid;

/// How the live file is replaced with recovered content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoverMode {
    /// Write a sibling temp file and rename it over the target
    #[default]
    Atomic,
    /// Truncate and overwrite the target, keeping its inode
    InPlace,
}

/// Read one answer line. Only `y` or `Y` confirms; EOF does not.
pub(super) fn confirm<R: BufRead>(input: &mut R) -> io::Result<bool> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(false);
    }
    let answer = line.strip_suffix('\n').unwrap_or(&line);
    let answer = answer.strip_suffix('\r').unwrap_or(answer);
    Ok(answer.eq_ignore_ascii_case("y"))
}

pub(super) fn replace_file(dst: &Path, content: &[u8], mode: RecoverMode) -> io::Result<()> {
    match mode {
        RecoverMode::Atomic => replace_atomic(dst, content),
        RecoverMode::InPlace => {
            debug!("Overwriting {:?} in place", dst);
            fs::write(dst, content)
        }
    }
}

fn replace_atomic(dst: &Path, content: &[u8]) -> io::Result<()> {
    // Rename onto the link target, not over the link itself
    let resolved = match fs::canonicalize(dst) {
        Ok(path) => path,
        Err(e) if e.kind() == io::ErrorKind::NotFound => dst.to_path_buf(),
        Err(e) => return Err(e),
    };
    let dst = resolved.as_path();
    let name = dst.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a file path: {}", dst.display()),
        )
    })?;
    let tmp = dst.with_file_name(format!(
        ".{}.{}.smartfs-tmp",
        name.to_string_lossy(),
        Uuid::new_v4()
    ));

    debug!("Replacing {:?} through {:?}", dst, tmp);
    let result = write_and_rename(&tmp, dst, content);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_and_rename(tmp: &Path, dst: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(content)?;
    if let Ok(meta) = fs::metadata(dst) {
        fs::set_permissions(tmp, meta.permissions())?;
    }
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, dst)
}
