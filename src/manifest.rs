//! Schema-independent access to a loaded manifest
//!
//! [`Manifest`] looks at the root element's namespace and hands the document
//! to the matching parser. Callers then pick a [`Section`] and get back
//! [`Container`]s regardless of which generation the manifest was.
//!
//! # Examples
//!
//! ```no_run
//! use sdkpack::{ArchiveContainer, HttpClient, Manifest, Section};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(None, sdkpack::http::DEFAULT_USER_AGENT)?;
//! let manifest = Manifest::load(
//!     &client,
//!     "https://dl.google.com/android/repository/repository2-1.xml",
//! )?;
//!
//! for tool in manifest.containers(Section::BuildTools) {
//!     println!("{} {}", tool.name(), tool.display_revision());
//! }
//! # Ok(())
//! # }
//! ```

use crate::container::Container;
use crate::http::HttpClient;
use crate::repository::Repository;
use crate::repository2::Repository2;
use crate::schema::{ManifestKind, SchemaVersion};
use crate::xml::{parse_document, Element};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;
use url::Url;

/// A group of manifest entries that are packaged together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    BuildTools,
    PlatformTools,
    Extras,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::BuildTools, Section::PlatformTools, Section::Extras];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::BuildTools => "build-tools",
            Section::PlatformTools => "platform-tools",
            Section::Extras => "extras",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown section '{}' (expected build-tools, platform-tools or extras)",
                    s
                )
            })
    }
}

/// A manifest of either supported generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    V1(Repository),
    V2(Repository2),
}

impl Manifest {
    /// Fetch the manifest at `url` and parse it with the parser its root namespace selects
    pub fn load(client: &HttpClient, url: &str) -> Result<Self> {
        let base_url = Url::parse(url)?;
        info!(url, "loading manifest");
        let document = client.fetch_text(url)?;
        Self::parse(&parse_document(&document)?, &base_url)
    }

    /// Parse a manifest from its root element
    pub fn parse(root: &Element, base_url: &Url) -> Result<Self> {
        match ManifestKind::detect(root) {
            Some(ManifestKind::Repository2) => {
                Ok(Manifest::V2(Repository2::from_element(root, base_url)?))
            }
            Some(ManifestKind::Repository | ManifestKind::Addon) => {
                Ok(Manifest::V1(Repository::from_element(root, base_url)?))
            }
            None => Err(Error::schema(format!(
                "unsupported manifest root <{}> in namespace '{}'",
                root.name(),
                root.namespace().unwrap_or_default()
            ))),
        }
    }

    /// Load a first-generation repository and merge an addon manifest into it
    pub fn load_with_addon(client: &HttpClient, url: &str, addon_url: &str) -> Result<Self> {
        match Self::load(client, url)? {
            Manifest::V1(mut repository) => {
                info!(url = addon_url, "merging addon manifest");
                repository.merge(Repository::load(client, addon_url)?);
                Ok(Manifest::V1(repository))
            }
            Manifest::V2(_) => Err(Error::Other(format!(
                "{} is a repository2 manifest; addon manifests can only be merged into \
                 first-generation repositories",
                url
            ))),
        }
    }

    pub fn schema(&self) -> SchemaVersion {
        match self {
            Manifest::V1(_) => SchemaVersion::V1,
            Manifest::V2(_) => SchemaVersion::V2,
        }
    }

    /// Entries of one section, in manifest order
    ///
    /// Second-generation manifests have no extras section.
    pub fn containers(&self, section: Section) -> Vec<Container> {
        match (self, section) {
            (Manifest::V1(r), Section::BuildTools) => {
                r.build_tools().iter().cloned().map(Container::from).collect()
            }
            (Manifest::V1(r), Section::PlatformTools) => {
                r.platform_tools().iter().cloned().map(Container::from).collect()
            }
            (Manifest::V1(r), Section::Extras) => {
                r.extras().iter().cloned().map(Container::from).collect()
            }
            (Manifest::V2(r), Section::BuildTools) => {
                r.build_tools().iter().cloned().map(Container::from).collect()
            }
            (Manifest::V2(r), Section::PlatformTools) => {
                r.platform_tools().iter().cloned().map(Container::from).collect()
            }
            (Manifest::V2(_), Section::Extras) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ArchiveContainer;

    fn base() -> Url {
        Url::parse("https://dl.google.com/android/repository/manifest.xml").unwrap()
    }

    const V1: &str = r#"<sdk:sdk-repository xmlns:sdk="http://schemas.android.com/sdk/android/repository/11">
        <sdk:platform-tool>
            <sdk:revision><sdk:major>26</sdk:major></sdk:revision>
            <sdk:archives><sdk:archive><sdk:size>1</sdk:size><sdk:checksum type="sha1">ab</sdk:checksum><sdk:url>pt.zip</sdk:url><sdk:host-os>linux</sdk:host-os></sdk:archive></sdk:archives>
        </sdk:platform-tool>
    </sdk:sdk-repository>"#;

    const V2: &str = r#"<sdk:sdk-repository xmlns:sdk="http://schemas.android.com/sdk/android/repo/repository2/01">
        <remotePackage path="platform-tools">
            <revision><major>34</major><minor>0</minor><micro>5</micro></revision>
            <display-name>Android SDK Platform-Tools</display-name>
            <archives><archive><complete><size>1</size><checksum type="sha1">ab</checksum><url>pt.zip</url></complete><host-os>linux</host-os></archive></archives>
        </remotePackage>
    </sdk:sdk-repository>"#;

    const ADDON: &str = r#"<sdk:sdk-addon xmlns:sdk="http://schemas.android.com/sdk/android/addon/7">
        <sdk:extra>
            <sdk:revision><sdk:major>11</sdk:major></sdk:revision>
            <sdk:path>usb_driver</sdk:path>
            <sdk:archives><sdk:archive><sdk:size>1</sdk:size><sdk:checksum type="sha1">ab</sdk:checksum><sdk:url>usb.zip</sdk:url><sdk:host-os>windows</sdk:host-os></sdk:archive></sdk:archives>
        </sdk:extra>
    </sdk:sdk-addon>"#;

    #[test]
    fn test_dispatch_by_namespace() {
        let v1 = Manifest::parse(&parse_document(V1).unwrap(), &base()).unwrap();
        let v2 = Manifest::parse(&parse_document(V2).unwrap(), &base()).unwrap();

        assert_eq!(v1.schema(), SchemaVersion::V1);
        assert_eq!(v2.schema(), SchemaVersion::V2);

        let tools = v2.containers(Section::PlatformTools);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].kind(), "remote-package");
        assert_eq!(tools[0].display_revision(), "34.0.5");
        assert!(v2.containers(Section::Extras).is_empty());

        let tools = v1.containers(Section::PlatformTools);
        assert_eq!(tools[0].kind(), "component");
        assert_eq!(tools[0].display_revision(), "26");
    }

    #[test]
    fn test_unknown_root_rejected() {
        let root = parse_document(r#"<manifest xmlns="urn:other"/>"#).unwrap();
        assert!(matches!(
            Manifest::parse(&root, &base()),
            Err(Error::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_load_with_addon_merges_extras() {
        let mut server = mockito::Server::new();
        let _repo = server
            .mock("GET", "/repository-11.xml")
            .with_status(200)
            .with_body(V1)
            .create();
        let _addon = server
            .mock("GET", "/addon.xml")
            .with_status(200)
            .with_body(ADDON)
            .create();

        let client = HttpClient::new(None, crate::http::DEFAULT_USER_AGENT).unwrap();
        let manifest = Manifest::load_with_addon(
            &client,
            &format!("{}/repository-11.xml", server.url()),
            &format!("{}/addon.xml", server.url()),
        )
        .unwrap();

        assert_eq!(manifest.containers(Section::PlatformTools).len(), 1);
        let extras = manifest.containers(Section::Extras);
        assert_eq!(extras.len(), 1);
        assert_eq!(extras[0].name(), "usb_driver");
    }

    #[test]
    fn test_section_from_str() {
        assert_eq!("build-tools".parse::<Section>().unwrap(), Section::BuildTools);
        assert_eq!("extras".parse::<Section>().unwrap(), Section::Extras);
        assert!("tools".parse::<Section>().is_err());
    }
}
