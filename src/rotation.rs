//! File rotation, compression, and retention
//!
//! Opens the active log file in a way that closes the classic TOCTOU gap
//! (check the path, then open a different file): the path is checked for a
//! symlink immediately before opening with `O_NOFOLLOW` on unix, and the
//! *open file handle* — not the path — is then stat'd to reject multi-
//! hard-link targets. Rotation renames the active file to an indexed
//! backup (`<stem>_<ext>_<N><ext>`), optionally gzips it, prunes backups
//! beyond `max_backups`, and runs an independent age-based cleanup pass.

use crate::error::{LoglyError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[cfg(unix)]
const O_NOFOLLOW: i32 = 0o400_000;

/// Opens `path` for append, creating it if absent, refusing to follow a
/// symlink and refusing a target with more than one hard link.
pub fn open_guarded(path: &Path) -> Result<File> {
    if let Ok(meta) = fs::symlink_metadata(path) {
        if meta.file_type().is_symlink() {
            return Err(LoglyError::PathRejected(format!(
                "{} is a symlink",
                path.display()
            )));
        }
    }

    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600).custom_flags(O_NOFOLLOW);
    }

    let file = opts.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let meta = file.metadata()?;
        if meta.nlink() > 1 {
            return Err(LoglyError::PathRejected(format!(
                "{} has more than one hard link",
                path.display()
            )));
        }
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        let meta = file.metadata()?;
        if meta.number_of_links().unwrap_or(1) > 1 {
            return Err(LoglyError::PathRejected(format!(
                "{} has more than one hard link",
                path.display()
            )));
        }
    }

    Ok(file)
}

/// Rotation/retention knobs plus the live file's current size.
pub struct Rotator {
    path: PathBuf,
    max_size_bytes: u64,
    max_backups: usize,
    max_age: Option<Duration>,
    compress: bool,
    current_size: u64,
}

impl Rotator {
    pub fn new(path: PathBuf, max_size_mb: f64, max_backups: usize, max_age: Option<Duration>, compress: bool) -> Self {
        Self {
            path,
            max_size_bytes: (max_size_mb * 1024.0 * 1024.0) as u64,
            max_backups,
            max_age,
            compress,
            current_size: 0,
        }
    }

    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    pub fn set_current_size(&mut self, size: u64) {
        self.current_size = size;
    }

    pub fn record_write(&mut self, bytes_written: u64) {
        self.current_size += bytes_written;
    }

    /// `true` when writing `additional` more bytes would put the file over
    /// its size cap.
    pub fn should_rotate(&self, additional: u64) -> bool {
        self.max_size_bytes > 0 && self.current_size + additional > self.max_size_bytes
    }

    /// Renames the active file to the next backup index, optionally
    /// compresses it, prunes old backups, and resets the size counter. The
    /// caller is responsible for reopening the active path afterward.
    pub fn rotate(&mut self) -> Result<PathBuf> {
        let (stem, ext) = stem_and_ext(&self.path);
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let next_index = next_backup_index(&parent, &stem, &ext)?;
        let backup_path = parent.join(backup_filename(&stem, &ext, next_index, false));

        if self.path.exists() {
            fs::rename(&self.path, &backup_path)?;
        }
        self.current_size = 0;

        let final_path = if self.compress {
            compress_and_replace(&backup_path)?
        } else {
            backup_path
        };

        self.prune_by_count(&parent, &stem, &ext)?;
        if let Some(max_age) = self.max_age {
            self.prune_by_age(&parent, &stem, &ext, max_age)?;
        }

        Ok(final_path)
    }

    fn prune_by_count(&self, dir: &Path, stem: &str, ext: &str) -> Result<()> {
        if self.max_backups == 0 {
            return Ok(());
        }
        let mut backups = list_backups(dir, stem, ext)?;
        backups.sort_by_key(|(index, _)| *index);
        if backups.len() > self.max_backups {
            for (_, path) in backups.iter().take(backups.len() - self.max_backups) {
                remove_with_retry(path)?;
            }
        }
        Ok(())
    }

    fn prune_by_age(&self, dir: &Path, stem: &str, ext: &str, max_age: Duration) -> Result<()> {
        let backups = list_backups(dir, stem, ext)?;
        let now = SystemTime::now();
        for (_, path) in backups {
            if let Ok(meta) = fs::metadata(&path) {
                if let Ok(modified) = meta.modified() {
                    if let Ok(age) = now.duration_since(modified) {
                        if age > max_age {
                            remove_with_retry(&path)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn stem_and_ext(path: &Path) -> (String, String) {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("log")
        .to_string();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("log")
        .to_string();
    (stem, ext)
}

fn backup_filename(stem: &str, ext: &str, index: u64, compressed: bool) -> String {
    if compressed {
        format!("{stem}_{ext}_{index}.{ext}.gz")
    } else {
        format!("{stem}_{ext}_{index}.{ext}")
    }
}

/// Scans `dir` for existing backups of this stem/ext, returning
/// `(index, path)` pairs. Both compressed and uncompressed backups match.
fn list_backups(dir: &Path, stem: &str, ext: &str) -> Result<Vec<(u64, PathBuf)>> {
    let prefix = format!("{stem}_{ext}_");
    let mut out = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e.into()),
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(&prefix) {
            continue;
        }
        let rest = &name[prefix.len()..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            continue;
        }
        if let Ok(index) = digits.parse::<u64>() {
            out.push((index, entry.path()));
        }
    }
    Ok(out)
}

fn next_backup_index(dir: &Path, stem: &str, ext: &str) -> Result<u64> {
    let backups = list_backups(dir, stem, ext)?;
    Ok(backups.iter().map(|(i, _)| *i).max().map(|m| m + 1).unwrap_or(1))
}

/// Gzips `path` to `<path>.gz.tmp`, verifies it decompresses back to the
/// original bytes, atomically renames to `<path>.gz`, then removes the
/// uncompressed source (retrying a few times, since on Windows an
/// antivirus/indexer can briefly hold the file open after rename).
fn compress_and_replace(path: &Path) -> Result<PathBuf> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    let tmp_path = PathBuf::from(format!("{}.gz.tmp", path.display()));

    let original = fs::read(path)?;
    {
        let tmp_file = File::create(&tmp_path)?;
        let mut encoder = flate2::write::GzEncoder::new(tmp_file, flate2::Compression::default());
        encoder.write_all(&original)?;
        encoder.finish()?;
    }

    {
        let tmp_file = File::open(&tmp_path)?;
        let mut decoder = flate2::bufread::MultiGzDecoder::new(BufReader::new(tmp_file));
        let mut verified = Vec::with_capacity(original.len());
        decoder.read_to_end(&mut verified)?;
        if verified != original {
            let _ = fs::remove_file(&tmp_path);
            return Err(LoglyError::Rotation(
                "gzip integrity check failed, keeping uncompressed backup".to_string(),
            ));
        }
    }

    fs::rename(&tmp_path, &gz_path)?;
    remove_with_retry(path)?;
    Ok(gz_path)
}

fn remove_with_retry(path: &Path) -> Result<()> {
    let mut last_err = None;
    for attempt in 0..3 {
        match fs::remove_file(path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                last_err = Some(e);
                if attempt < 2 {
                    std::thread::sleep(Duration::from_millis(10));
                }
            }
        }
    }
    Err(last_err.unwrap().into())
}
