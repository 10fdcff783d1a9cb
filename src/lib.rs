//! sdkpack - Android SDK components as NuGet packages
//!
//! sdkpack reads the XML repository manifests the Android SDK is published
//! with, selects build tools, platform tools or extras, downloads their
//! per-platform archives with checksum verification, and repackages them as
//! NuGet packages for downstream consumers.
//!
//! Both manifest generations are supported:
//!
//! - first-generation `repository/<N>` and `addon/<N>` manifests, with
//!   `build-tool`, `platform-tool` and `extra` entries
//! - second-generation `repo/repository2/<N>` manifests, with path-addressed
//!   `remotePackage` entries
//!
//! # Examples
//!
//! ```no_run
//! use sdkpack::{acquire_container, ArchiveContainer, Config, HttpClient, Manifest, PackageFilter, Section};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let client = HttpClient::from_config(&config)?;
//!
//! let manifest = Manifest::load(&client, &config.repository.url)?;
//! let filter = PackageFilter {
//!     min_version: Some(sdkpack::parse_version("30")?),
//!     ..Default::default()
//! };
//!
//! for tool in filter.select(manifest.containers(Section::BuildTools)) {
//!     let dir = acquire_container(&client, &tool, &config.cache_dir(), false, None)?;
//!     println!("{} {} -> {}", tool.name(), tool.display_revision(), dir.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`manifest`] - Detect the manifest generation and expose its sections
//! - [`repository`] / [`repository2`] - Per-generation manifest parsers
//! - [`container`] - The archive-container capability shared by all entries
//! - [`archive`] - Per-platform archives and their acquisition
//! - [`acquire`] - Checksum verification, zip extraction, container acquisition
//! - [`filter`] - Version, preview and obsolete selection
//! - [`packager`] - `.nuspec` rendering and `.nupkg` building
//! - [`config`] - User configuration management
//! - [`error`] - Error types and result handling

pub mod acquire;
pub mod archive;
pub mod component;
pub mod config;
pub mod container;
pub mod error;
pub mod filter;
pub mod http;
pub mod logging;
pub mod manifest;
pub mod packager;
pub mod remote_package;
pub mod repository;
pub mod repository2;
pub mod revision;
pub mod schema;
pub mod xml;

pub use acquire::{
    acquire_container, extract_zip, verify_checksum, ChecksumAlgorithm, ProgressCallback,
};
pub use archive::Archive;
pub use component::{Component, Extra, ExtraMetadata};
pub use config::Config;
pub use container::{ArchiveContainer, Container};
pub use error::{Error, Result};
pub use filter::{parse_version, PackageFilter};
pub use http::HttpClient;
pub use manifest::{Manifest, Section};
pub use packager::{
    build_package, generate_packages, render_nuspec, Nuspec, PackageOptions, Runtime, RUNTIMES,
};
pub use remote_package::RemotePackage;
pub use repository::Repository;
pub use repository2::Repository2;
pub use revision::Revision;
pub use schema::{ManifestKind, SchemaVersion};
