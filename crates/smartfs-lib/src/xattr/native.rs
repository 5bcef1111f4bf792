//! Extended attributes through `getxattr(2)` / `setxattr(2)`

use super::{AttributeStore, WriteOutcome, XattrError};
use log::debug;
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Direct system call backend
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeAttributes;

fn to_cstring(bytes: &[u8]) -> io::Result<CString> {
    CString::new(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

/// A zero-length buffer turns `getxattr` back into a size probe, so a
/// result larger than the buffer means the value grew and must be re-read.
fn value_grew(read: libc::ssize_t, capacity: usize) -> bool {
    read as usize > capacity
}

fn outcome_from_errno(err: &io::Error) -> WriteOutcome {
    match err.raw_os_error() {
        Some(libc::ENOSPC) | Some(libc::EDQUOT) => WriteOutcome::QuotaExceeded,
        Some(libc::EACCES) | Some(libc::EPERM) => WriteOutcome::PermissionDenied,
        Some(libc::ENOENT) | Some(libc::ENODATA) => WriteOutcome::NotFound,
        _ => WriteOutcome::Unknown(err.to_string()),
    }
}

impl AttributeStore for NativeAttributes {
    fn get(&self, path: &Path, name: &str) -> Result<Option<Vec<u8>>, XattrError> {
        let c_path = to_cstring(path.as_os_str().as_bytes())?;
        let c_name = to_cstring(name.as_bytes())?;

        // The value can grow between the size probe and the read
        loop {
            let size = unsafe {
                libc::getxattr(c_path.as_ptr(), c_name.as_ptr(), std::ptr::null_mut(), 0)
            };
            if size < 0 {
                let err = io::Error::last_os_error();
                return match err.raw_os_error() {
                    Some(libc::ENODATA) => Ok(None),
                    Some(libc::ENOTSUP) => Err(XattrError::Unsupported(path.display().to_string())),
                    _ => Err(err.into()),
                };
            }

            let mut buf = vec![0u8; size as usize];
            let read = unsafe {
                libc::getxattr(
                    c_path.as_ptr(),
                    c_name.as_ptr(),
                    buf.as_mut_ptr() as *mut libc::c_void,
                    buf.len(),
                )
            };
            if read < 0 {
                let err = io::Error::last_os_error();
                match err.raw_os_error() {
                    Some(libc::ERANGE) => {
                        debug!("Attribute {} on {:?} changed size, retrying", name, path);
                        continue;
                    }
                    Some(libc::ENODATA) => return Ok(None),
                    _ => return Err(err.into()),
                }
            }

            if value_grew(read, buf.len()) {
                debug!("Attribute {} on {:?} grew from empty, retrying", name, path);
                continue;
            }
            buf.truncate(read as usize);
            return Ok(Some(buf));
        }
    }

    fn set(&self, path: &Path, name: &str, value: &[u8]) -> WriteOutcome {
        let (c_path, c_name) = match (
            to_cstring(path.as_os_str().as_bytes()),
            to_cstring(name.as_bytes()),
        ) {
            (Ok(p), Ok(n)) => (p, n),
            (Err(e), _) | (_, Err(e)) => return WriteOutcome::Unknown(e.to_string()),
        };

        let rc = unsafe {
            libc::setxattr(
                c_path.as_ptr(),
                c_name.as_ptr(),
                value.as_ptr() as *const libc::c_void,
                value.len(),
                0,
            )
        };

        if rc == 0 {
            WriteOutcome::Success
        } else {
            let err = io::Error::last_os_error();
            debug!("setxattr {} on {:?} failed: {}", name, path, err);
            outcome_from_errno(&err)
        }
    }
}
