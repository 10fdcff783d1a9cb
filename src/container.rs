//! The archive-container capability shared by every manifest entry
//!
//! Build tools, platform tools and extras from first-generation manifests and
//! remote packages from second-generation manifests all boil down to a name,
//! a revision and a list of archives. Acquisition and packaging only see
//! that view, through [`ArchiveContainer`] or the closed [`Container`] enum.

use crate::acquire::sanitize_dir_name;
use crate::archive::Archive;
use crate::component::{Component, Extra};
use crate::remote_package::RemotePackage;
use crate::revision::Revision;
use crate::schema::SchemaVersion;
use std::fmt;

pub trait ArchiveContainer {
    /// Identity of the container (tag, extra path, or display name)
    fn name(&self) -> &str;

    fn revision(&self) -> &Revision;

    /// Archives in manifest order
    fn archives(&self) -> &[Archive];

    /// Schema generation the container was parsed from
    fn schema(&self) -> SchemaVersion;

    fn is_obsolete(&self) -> bool;

    /// Revision rendered the way this container's manifest generation renders it
    fn display_revision(&self) -> String {
        self.revision().render(self.schema())
    }

    /// `{name}-{revision}`, the directory the container is acquired into
    fn directory_name(&self) -> String {
        sanitize_dir_name(&format!("{}-{}", self.name(), self.display_revision()))
    }
}

/// Any entry of any supported manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Component(Component),
    Extra(Extra),
    RemotePackage(RemotePackage),
}

impl Container {
    /// Short label of the variant, for listings
    pub fn kind(&self) -> &'static str {
        match self {
            Container::Component(_) => "component",
            Container::Extra(_) => "extra",
            Container::RemotePackage(_) => "remote-package",
        }
    }

    fn inner(&self) -> &dyn ArchiveContainer {
        match self {
            Container::Component(c) => c,
            Container::Extra(e) => e,
            Container::RemotePackage(p) => p,
        }
    }
}

impl ArchiveContainer for Container {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn revision(&self) -> &Revision {
        self.inner().revision()
    }

    fn archives(&self) -> &[Archive] {
        self.inner().archives()
    }

    fn schema(&self) -> SchemaVersion {
        self.inner().schema()
    }

    fn is_obsolete(&self) -> bool {
        self.inner().is_obsolete()
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Component(c) => fmt::Display::fmt(c, f),
            Container::Extra(e) => fmt::Display::fmt(e, f),
            Container::RemotePackage(p) => fmt::Display::fmt(p, f),
        }
    }
}

impl From<Component> for Container {
    fn from(component: Component) -> Self {
        Container::Component(component)
    }
}

impl From<Extra> for Container {
    fn from(extra: Extra) -> Self {
        Container::Extra(extra)
    }
}

impl From<RemotePackage> for Container {
    fn from(package: RemotePackage) -> Self {
        Container::RemotePackage(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;
    use url::Url;

    const NS: &str = "http://schemas.android.com/sdk/android/repository/11";

    fn build_tool() -> Component {
        let xml = format!(
            r#"<sdk:build-tool xmlns:sdk="{NS}">
                <sdk:revision><sdk:major>25</sdk:major><sdk:minor>0</sdk:minor><sdk:micro>2</sdk:micro></sdk:revision>
                <sdk:archives>
                    <sdk:archive><sdk:size>1</sdk:size><sdk:checksum type="sha1">ab</sdk:checksum><sdk:url>build-tools_r25.0.2-linux.zip</sdk:url><sdk:host-os>linux</sdk:host-os></sdk:archive>
                </sdk:archives>
            </sdk:build-tool>"#
        );
        let base = Url::parse("https://dl.google.com/android/repository/repository-11.xml").unwrap();
        Component::from_element(&parse_document(&xml).unwrap(), "build-tool", &base).unwrap()
    }

    #[test]
    fn test_container_delegates_to_variant() {
        let container = Container::from(build_tool());

        assert_eq!(container.kind(), "component");
        assert_eq!(container.name(), "build-tool");
        assert_eq!(container.archives().len(), 1);
        assert_eq!(container.schema(), SchemaVersion::V1);
        assert!(!container.is_obsolete());
        assert_eq!(container.to_string(), "build-tool 25.0.2");
    }

    #[test]
    fn test_directory_name_uses_schema_rendering() {
        let container = Container::from(build_tool());
        assert_eq!(container.directory_name(), "build-tool-25.0.2");
    }
}
