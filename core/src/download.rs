//! Temporary files for binary responses.
//!
//! Each download lives in its own private directory under the system temp
//! dir, named `jellyfin-dl-*`. The directory is removed when the
//! `DownloadedFile` is dropped, so cleanup follows ownership instead of a
//! process-exit hook. `sweep_orphans` removes directories left behind by a
//! process that never got to drop its files.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

use regex::Regex;
use tempfile::TempDir;
use thiserror::Error;

use crate::http::{first_header, Headers};

/// Prefix of every per-download temp directory.
pub const DOWNLOAD_DIR_PREFIX: &str = "jellyfin-dl-";

/// Prefix of generated file names when the server supplies none.
pub const GENERATED_FILE_PREFIX: &str = "download-";

fn filename_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"filename=['"]?([^'"\s]+)['"]?"#).unwrap())
}

/// Extract the `filename=` attribute of a `Content-Disposition` value.
///
/// Only the final path component is kept; names that would escape the
/// download directory are rejected.
pub fn content_disposition_filename(value: &str) -> Option<String> {
    let raw = filename_pattern().captures(value)?.get(1)?.as_str();
    let name = Path::new(raw).file_name()?.to_str()?;
    if name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

/// A response body saved to a temporary file.
#[derive(Debug)]
pub struct DownloadedFile {
    path: PathBuf,
    dir: TempDir,
}

impl DownloadedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    pub fn open(&self) -> io::Result<File> {
        File::open(&self.path)
    }

    pub fn len(&self) -> io::Result<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Copy the file to `dest` and release the temporary copy.
    pub fn persist(self, dest: impl AsRef<Path>) -> io::Result<PathBuf> {
        let dest = dest.as_ref().to_path_buf();
        fs::copy(&self.path, &dest)?;
        self.dir.close()?;
        Ok(dest)
    }
}

/// Why a download could not be saved.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Reading the response body failed.
    #[error("failed to read response body: {0}")]
    Body(#[source] io::Error),

    /// Creating or writing the local file failed.
    #[error(transparent)]
    File(#[from] io::Error),
}

/// Stream `body` into a fresh temporary file.
///
/// The file is named from the `Content-Disposition` header when it carries a
/// usable filename, otherwise a `download-*` name is generated.
pub fn download_to_temp(
    headers: &Headers,
    body: &mut impl Read,
) -> Result<DownloadedFile, SaveError> {
    let dir = tempfile::Builder::new()
        .prefix(DOWNLOAD_DIR_PREFIX)
        .tempdir()?;

    let suggested = first_header(headers, "content-disposition")
        .filter(|value| !value.is_empty())
        .and_then(content_disposition_filename);

    let (mut file, path) = match suggested {
        Some(name) => {
            let path = dir.path().join(name);
            (File::create(&path)?, path)
        }
        None => tempfile::Builder::new()
            .prefix(GENERATED_FILE_PREFIX)
            .tempfile_in(dir.path())?
            .keep()
            .map_err(|err| err.error)?,
    };

    let written = copy_body(body, &mut file)?;
    file.sync_all()?;
    tracing::debug!(path = %path.display(), bytes = written, "response body saved");

    Ok(DownloadedFile { path, dir })
}

fn copy_body(body: &mut impl Read, file: &mut File) -> Result<u64, SaveError> {
    let mut buf = [0u8; 64 * 1024];
    let mut written = 0u64;
    loop {
        let n = match body.read(&mut buf) {
            Ok(0) => return Ok(written),
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(SaveError::Body(err)),
        };
        file.write_all(&buf[..n])?;
        written += n as u64;
    }
}

/// Remove `jellyfin-dl-*` directories in the system temp dir older than
/// `max_age`. Returns how many were removed.
pub fn sweep_orphans(max_age: Duration) -> io::Result<usize> {
    sweep_orphans_in(&std::env::temp_dir(), max_age)
}

pub(crate) fn sweep_orphans_in(root: &Path, max_age: Duration) -> io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let is_download_dir = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(DOWNLOAD_DIR_PREFIX));
        if !is_download_dir || !entry.file_type()?.is_dir() {
            continue;
        }
        let age = entry
            .metadata()?
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age < max_age {
            continue;
        }
        match fs::remove_dir_all(entry.path()) {
            Ok(()) => removed += 1,
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), error = %err, "orphan sweep failed")
            }
        }
    }
    if removed > 0 {
        tracing::info!(removed, "removed orphaned download directories");
    }
    Ok(removed)
}
