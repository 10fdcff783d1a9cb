//! Platform-specific SDK archives
//!
//! An archive is one downloadable zip for one host OS. Parsing resolves the
//! archive URL against the manifest URL, so every [`Archive`] holds an
//! absolute URL. [`Archive::acquire`] downloads, verifies and extracts it.

use crate::acquire::{extract_zip, sanitize_dir_name, verify_checksum, ProgressCallback};
use crate::http::HttpClient;
use crate::schema::SchemaVersion;
use crate::xml::Element;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// One downloadable, checksummed zip archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    size: u64,
    checksum_type: Option<String>,
    checksum: String,
    url: Url,
    host_os: Option<String>,
    host_arch: Option<String>,
    schema: SchemaVersion,
}

impl Archive {
    /// Load every archive from an `<archives>` element
    pub fn from_archives_element(
        element: &Element,
        base_url: &Url,
        schema: SchemaVersion,
    ) -> Result<Vec<Self>> {
        if element.name() != "archives" {
            return Err(Error::schema(format!(
                "expected <archives> element, found <{}>",
                element.name()
            )));
        }

        element
            .elements()
            .map(|child| Self::from_element(child, base_url, schema))
            .collect()
    }

    /// Load an archive from an `<archive>` element
    ///
    /// Second-generation manifests wrap size, checksum and URL in a
    /// `<complete>` element; both shapes are accepted.
    pub fn from_element(element: &Element, base_url: &Url, schema: SchemaVersion) -> Result<Self> {
        if element.name() != "archive" {
            return Err(Error::schema(format!(
                "expected <archive> element, found <{}>",
                element.name()
            )));
        }

        let details = element.own_child("complete").unwrap_or(element);
        let checksum = details.required_child("checksum")?;
        let url = details.required_child("url")?.text();

        if url.is_empty() {
            return Err(Error::schema("<archive> has an empty <url>"));
        }

        Ok(Self {
            size: details.parse_child("size")?,
            checksum_type: checksum.attribute("type").map(str::to_string),
            checksum: checksum.text().to_string(),
            url: base_url.join(url)?,
            host_os: element.child_text("host-os").map(str::to_string),
            host_arch: element.child_text("host-arch").map(str::to_string),
            schema,
        })
    }

    /// Declared size of the archive, in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Name of the checksum algorithm, normally `sha1`
    pub fn checksum_type(&self) -> Option<&str> {
        self.checksum_type.as_deref()
    }

    /// Expected checksum as a hex string
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Operating system the archive targets; absent for platform-neutral archives
    pub fn host_os(&self) -> Option<&str> {
        self.host_os.as_deref()
    }

    /// CPU architecture the archive targets, when the manifest declares one
    pub fn host_arch(&self) -> Option<&str> {
        self.host_arch.as_deref()
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// File name of the archive URL without its extension
    pub fn file_stem(&self) -> String {
        let file_name = self
            .url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();

        Path::new(file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Name of the subdirectory this archive is extracted into
    ///
    /// First-generation archives are named after the downloaded file,
    /// second-generation archives after their host OS, suffixed with the
    /// host architecture when one is declared (`linux-aarch64`).
    pub fn target_dir_name(&self) -> String {
        let name = match (self.schema, self.host_os.as_deref()) {
            (SchemaVersion::V2, Some(host_os)) if !host_os.is_empty() => {
                match self.host_arch.as_deref() {
                    Some(arch) if !arch.is_empty() => format!("{}-{}", host_os, arch),
                    _ => host_os.to_string(),
                }
            }
            _ => self.file_stem(),
        };

        if name.is_empty() {
            "archive".to_string()
        } else {
            sanitize_dir_name(&name)
        }
    }

    /// Download, verify and extract this archive below `target_dir`
    ///
    /// Returns the directory the archive was extracted into. When that
    /// directory already exists it is returned untouched unless `overwrite`
    /// is set, in which case it is deleted and the archive fetched again.
    /// The download is held in a temporary file that is removed on every
    /// exit path, and nothing is extracted unless the checksum matches.
    /// Extraction goes to a staging directory next to the destination which
    /// is renamed into place once complete, so an interrupted run never
    /// leaves a directory that looks finished.
    pub fn acquire(
        &self,
        client: &HttpClient,
        target_dir: &Path,
        overwrite: bool,
        progress: Option<&ProgressCallback>,
    ) -> Result<PathBuf> {
        let destination = target_dir.join(self.target_dir_name());

        if destination.exists() {
            if !overwrite {
                debug!(url = %self.url, dir = %destination.display(), "archive already extracted");
                return Ok(destination);
            }
            info!(dir = %destination.display(), "removing previous extraction");
            fs::remove_dir_all(&destination)?;
        }

        fs::create_dir_all(target_dir)?;

        let mut download = tempfile::Builder::new()
            .prefix(".sdkpack-")
            .suffix(".part")
            .tempfile_in(target_dir)?;

        info!(url = %self.url, host_os = ?self.host_os, "downloading archive");
        client.download(self.url.as_str(), download.as_file_mut(), self.size, progress)?;

        verify_checksum(
            download.path(),
            self.checksum_type.as_deref(),
            &self.checksum,
            self.url.as_str(),
        )?;

        if let Some(cb) = progress {
            cb("Extracting", 0, 100);
        }

        let staging = tempfile::Builder::new()
            .prefix(".sdkpack-")
            .suffix(".extract")
            .tempdir_in(target_dir)?;
        extract_zip(download.path(), staging.path())?;
        fs::rename(staging.path(), &destination)?;

        if let Some(cb) = progress {
            cb("Extracted", 100, 100);
        }

        info!(dir = %destination.display(), "archive extracted");
        Ok(destination)
    }
}

impl std::fmt::Display for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}
