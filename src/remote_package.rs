//! Second-generation manifest entries (`remotePackage`)

use crate::archive::Archive;
use crate::container::ArchiveContainer;
use crate::revision::Revision;
use crate::schema::SchemaVersion;
use crate::xml::Element;
use crate::{Error, Result};
use std::fmt;
use url::Url;

/// A `remotePackage` entry, addressed by a semicolon-separated install path
/// such as `build-tools;30.0.3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePackage {
    name: String,
    path: String,
    revision: Revision,
    obsolete: bool,
    archives: Vec<Archive>,
}

impl RemotePackage {
    /// Load a package from a `<remotePackage>` element
    ///
    /// The package's name is its `display-name`. A package is obsolete when
    /// it carries `obsolete="true"` or an `<obsolete>` child.
    pub fn from_element(element: &Element, base_url: &Url) -> Result<Self> {
        if element.name() != "remotePackage" {
            return Err(Error::schema(format!(
                "expected <remotePackage> element, found <{}>",
                element.name()
            )));
        }

        let path = element
            .attribute("path")
            .ok_or_else(|| Error::schema("<remotePackage> is missing its path attribute"))?;

        Ok(Self {
            name: element.required_child("display-name")?.text().to_string(),
            path: path.to_string(),
            revision: Revision::from_element(element.required_child("revision")?)?,
            obsolete: element.attribute("obsolete") == Some("true")
                || element.own_child("obsolete").is_some(),
            archives: Archive::from_archives_element(
                element.required_child("archives")?,
                base_url,
                SchemaVersion::V2,
            )?,
        })
    }

    /// The raw `path` attribute
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Non-empty segments of the `path` attribute
    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        split_path(&self.path)
    }

    /// Whether one of the path segments is exactly `segment`
    pub fn has_path_segment(&self, segment: &str) -> bool {
        self.path_segments().any(|s| s == segment)
    }
}

pub(crate) fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split(';').filter(|segment| !segment.is_empty())
}

impl ArchiveContainer for RemotePackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn revision(&self) -> &Revision {
        &self.revision
    }

    fn archives(&self) -> &[Archive] {
        &self.archives
    }

    fn schema(&self) -> SchemaVersion {
        SchemaVersion::V2
    }

    fn is_obsolete(&self) -> bool {
        self.obsolete
    }
}

impl fmt::Display for RemotePackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
