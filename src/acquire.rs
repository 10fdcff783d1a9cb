//! Archive acquisition: checksum verification, extraction and the per-container driver
//!
//! Acquiring a container downloads every one of its archives into
//! `{repository_dir}/{name}-{revision}/`, one subdirectory per archive.
//! Archives that were already extracted are skipped, so running the same
//! acquisition twice only touches the network the first time.
//!
//! # Examples
//!
//! ```no_run
//! use sdkpack::{acquire_container, Config, HttpClient, Manifest, Section};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let client = HttpClient::from_config(&config)?;
//! let manifest = Manifest::load(&client, &config.repository.url)?;
//!
//! for tool in manifest.containers(Section::PlatformTools) {
//!     let dir = acquire_container(&client, &tool, Path::new("out"), false, None)?;
//!     println!("{} -> {}", tool, dir.display());
//! }
//! # Ok(())
//! # }
//! ```

use crate::container::ArchiveContainer;
use crate::http::HttpClient;
use crate::{Error, Result};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use zip::ZipArchive;

/// Progress callback for download/extraction operations
///
/// Called with:
/// - `message`: Description of current operation (e.g., "Downloading")
/// - `current`: Current progress (bytes downloaded, or 0-100)
/// - `total`: Total work (total bytes, or 100)
pub type ProgressCallback = Arc<dyn Fn(&str, u64, u64) + Send + Sync>;

/// Checksum algorithms that downloads are verified with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Sha1,
    Sha256,
}

impl ChecksumAlgorithm {
    /// Recognise an algorithm name as written in a manifest (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Some(ChecksumAlgorithm::Sha1),
            "sha256" | "sha-256" => Some(ChecksumAlgorithm::Sha256),
            _ => None,
        }
    }

    /// Digest of a file's contents
    pub fn digest_file(self, path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path)?;
        match self {
            ChecksumAlgorithm::Sha1 => digest_reader::<Sha1, _>(file),
            ChecksumAlgorithm::Sha256 => digest_reader::<Sha256, _>(file),
        }
    }
}

fn digest_reader<D: Digest, R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buffer = vec![0; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_vec())
}

/// Verify a downloaded file against the checksum declared in the manifest
///
/// Returns `Ok(true)` when the digest matched and `Ok(false)` when the
/// algorithm is not recognised; such archives are accepted unchecked.
/// A mismatch, including a length mismatch or an expected value that is
/// not valid hex, is an [`Error::Integrity`].
pub fn verify_checksum(
    path: &Path,
    algorithm: Option<&str>,
    expected_hex: &str,
    url: &str,
) -> Result<bool> {
    let Some(algorithm) = algorithm.and_then(ChecksumAlgorithm::from_name) else {
        warn!(
            url,
            algorithm = algorithm.unwrap_or("<none>"),
            "checksum algorithm not recognised; archive accepted without verification"
        );
        return Ok(false);
    };

    let actual = algorithm.digest_file(path)?;
    let expected = hex::decode(expected_hex.trim()).unwrap_or_default();

    if actual != expected {
        return Err(Error::Integrity {
            url: url.to_string(),
            expected: expected_hex.to_string(),
            actual: hex::encode(&actual),
        });
    }

    Ok(true)
}

/// Extract a zip archive into `dest_dir`, returning the number of files written
///
/// Entries whose names would escape `dest_dir` are skipped. Unix permission
/// bits stored in the archive are restored.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<usize> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    fs::create_dir_all(dest_dir)?;
    let mut extracted = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative_path = match entry.enclosed_name() {
            Some(path) => path.to_owned(),
            None => {
                warn!(entry = entry.name(), "skipping zip entry outside the target directory");
                continue;
            }
        };

        let absolute_path = dest_dir.join(&relative_path);
        if entry.is_dir() {
            fs::create_dir_all(&absolute_path)?;
            continue;
        }

        if let Some(parent) = absolute_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut outfile = File::create(&absolute_path)?;
        io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&absolute_path, fs::Permissions::from_mode(mode))?;
        }

        extracted += 1;
    }

    Ok(extracted)
}

/// Make a manifest-provided name safe to use as a single directory name
pub(crate) fn sanitize_dir_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match cleaned.trim() {
        "" | "." | ".." => "_".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Make every archive of a container available below `repository_dir`
///
/// The container gets its own `{name}-{revision}` directory. With
/// `overwrite`, an existing directory is deleted first; otherwise archives
/// that are already extracted are left alone and not downloaded again.
///
/// Fails before downloading anything when two archives of the container
/// would extract into the same subdirectory.
pub fn acquire_container<C: ArchiveContainer + ?Sized>(
    client: &HttpClient,
    container: &C,
    repository_dir: &Path,
    overwrite: bool,
    progress: Option<&ProgressCallback>,
) -> Result<PathBuf> {
    let directory = repository_dir.join(container.directory_name());

    let mut seen = HashSet::new();
    for archive in container.archives() {
        let name = archive.target_dir_name();
        if !seen.insert(name.clone()) {
            return Err(Error::schema(format!(
                "{} has more than one archive extracting into '{}' ({})",
                container.name(),
                name,
                archive.url()
            )));
        }
    }

    if overwrite && directory.exists() {
        info!(dir = %directory.display(), "overwrite requested; removing existing directory");
        fs::remove_dir_all(&directory)?;
    }
    fs::create_dir_all(&directory)?;

    for archive in container.archives() {
        if let Some(cb) = progress {
            cb(
                &format!(
                    "{} ({})",
                    container.name(),
                    archive.host_os().unwrap_or("any")
                ),
                0,
                archive.size(),
            );
        }
        archive.acquire(client, &directory, false, progress)?;
    }

    Ok(directory)
}
