//! File sink: rotation-aware, append-only file output
//!
//! Path validation (`validate_path`) runs once at construction/config-time;
//! open-time symlink/hard-link rejection (`crate::rotation::open_guarded`)
//! runs every time the file is (re)opened, including after a rotation.

use super::Sink;
use crate::error::{LoglyError, Result};
use crate::rotation::{open_guarded, Rotator};
use parking_lot::{Mutex, RwLock};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_PATH_BYTES: usize = 4096;

const WINDOWS_RESERVED_STEMS: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Validates a configured file path against the constraints spelled out for
/// the file sink: non-empty, no embedded NUL, no overlong-UTF-8 byte
/// sequences, bounded length, no `..` traversal (including percent-decoded
/// forms), no Windows reserved device names, no NTFS alternate-data-stream
/// suffixes.
pub fn validate_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(LoglyError::PathRejected("path is empty".to_string()));
    }

    let display = path.to_string_lossy();
    if display.len() > MAX_PATH_BYTES {
        return Err(LoglyError::PathRejected(format!(
            "path exceeds {MAX_PATH_BYTES} bytes"
        )));
    }
    if display.contains('\0') {
        return Err(LoglyError::PathRejected("path contains NUL".to_string()));
    }

    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        if crate::redact::sanitize::has_overlong_utf8_sequence(path.as_os_str().as_bytes()) {
            return Err(LoglyError::PathRejected(
                "path contains an overlong UTF-8 sequence".to_string(),
            ));
        }
    }

    if contains_traversal(&display) {
        return Err(LoglyError::PathRejected(
            "path contains a `..` traversal segment".to_string(),
        ));
    }

    for component in path.components() {
        let std::path::Component::Normal(part) = component else {
            continue;
        };
        let part = part.to_string_lossy();
        let stem = part.split('.').next().unwrap_or(&part).to_ascii_uppercase();
        if WINDOWS_RESERVED_STEMS.contains(&stem.as_str()) {
            return Err(LoglyError::PathRejected(format!(
                "{part} is a reserved Windows device name"
            )));
        }
        if part.contains(':') {
            return Err(LoglyError::PathRejected(
                "path segment contains ':' (possible NTFS alternate data stream)".to_string(),
            ));
        }
    }

    Ok(())
}

/// Percent-decodes repeatedly and checks every decoding round for a literal
/// `..` segment, so a single- or double- (or deeper) percent-encoded
/// traversal attempt is still caught (e.g. `%252e%252e`, whose outer `%25`
/// must decode to `%` before the inner `2e` pair reveals a `.`).
fn contains_traversal(raw: &str) -> bool {
    let mut current = raw.to_string();
    for _ in 0..4 {
        if current.split(['/', '\\']).any(|seg| seg == "..") {
            return true;
        }
        let decoded = percent_decode(&current);
        if decoded == current {
            break;
        }
        current = decoded;
    }
    false
}

/// Decodes `%XX` hex escapes to their byte value, replacing only the
/// well-formed ones and leaving anything else (including a lone trailing
/// `%`) untouched. Invalid UTF-8 produced by decoding is replaced rather
/// than rejected, since this runs purely as a traversal-detection pass.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// An append-only file sink with size-triggered rotation, optional
/// compression, and retention pruning.
pub struct FileSink {
    path: PathBuf,
    handle: RwLock<Option<File>>,
    rotator: Mutex<Rotator>,
}

impl FileSink {
    pub fn new(
        path: PathBuf,
        max_size_mb: f64,
        max_backups: usize,
        max_age: Option<Duration>,
        compress: bool,
    ) -> Result<Self> {
        validate_path(&path)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = open_guarded(&path)?;
        let initial_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        let mut rotator = Rotator::new(path.clone(), max_size_mb, max_backups, max_age, compress);
        rotator.set_current_size(initial_size);

        Ok(Self {
            path,
            handle: RwLock::new(Some(file)),
            rotator: Mutex::new(rotator),
        })
    }

}

impl Sink for FileSink {
    fn write(&self, data: &[u8]) -> Result<()> {
        let pending = (data.len() + 1) as u64;

        // The handle write lock is held across rotate+reopen so a
        // concurrent writer can never observe the renamed-away file handle
        // (spec §4.5: "Rotating holds the sink's write lock for the
        // duration of rename + open").
        let mut handle = self.handle.write();
        let mut rotator = self.rotator.lock();
        if rotator.should_rotate(pending) {
            rotator.rotate()?;
            *handle = Some(open_guarded(&self.path)?);
        }

        let Some(file) = handle.as_mut() else {
            return Err(LoglyError::Rotation("file sink has no open handle".to_string()));
        };
        file.write_all(data)?;
        file.write_all(b"\n")?;
        rotator.record_write(pending);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(file) = self.handle.write().as_mut() {
            file.flush()?;
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.flush()?;
        *self.handle.write() = None;
        Ok(())
    }
}
