//! First-generation manifest entries: `build-tool`, `platform-tool` and `extra`

use crate::archive::Archive;
use crate::container::ArchiveContainer;
use crate::revision::Revision;
use crate::schema::SchemaVersion;
use crate::xml::Element;
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use url::Url;

/// A `build-tool` or `platform-tool` entry
///
/// The component's name is the manifest tag it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    name: String,
    revision: Revision,
    obsolete: bool,
    archives: Vec<Archive>,
}

impl Component {
    /// Load a component from an element whose local name must be `name`
    pub fn from_element(element: &Element, name: &str, base_url: &Url) -> Result<Self> {
        if element.name() != name {
            return Err(Error::schema(format!(
                "expected <{}> element, found <{}>",
                name,
                element.name()
            )));
        }

        Ok(Self {
            name: name.to_string(),
            revision: Revision::from_element(element.required_child("revision")?)?,
            obsolete: element.own_child("obsolete").is_some(),
            archives: Archive::from_archives_element(
                element.required_child("archives")?,
                base_url,
                SchemaVersion::V1,
            )?,
        })
    }
}

impl ArchiveContainer for Component {
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
        SchemaVersion::V1
    }

    fn is_obsolete(&self) -> bool {
        self.obsolete
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.display_revision())
    }
}

/// Vendor-provided metadata of an extra, used for display only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtraMetadata {
    pub vendor_id: Option<String>,
    pub desc_url: Option<String>,
    pub description: Option<String>,
    pub display_name: Option<String>,
    pub display_vendor: Option<String>,
}

/// A third-party `extra` entry from an addon manifest
///
/// Extras are identified by their `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extra {
    path: String,
    metadata: ExtraMetadata,
    revision: Revision,
    obsolete: bool,
    archives: Vec<Archive>,
}

impl Extra {
    /// Load an extra from an `<extra>` element
    pub fn from_element(element: &Element, base_url: &Url) -> Result<Self> {
        if element.name() != "extra" {
            return Err(Error::schema(format!(
                "expected <extra> element, found <{}>",
                element.name()
            )));
        }

        let text = |name: &str| element.child_text(name).map(str::to_string);

        Ok(Self {
            path: element.required_child("path")?.text().to_string(),
            metadata: ExtraMetadata {
                vendor_id: text("vendor-id"),
                desc_url: text("desc-url"),
                description: text("description"),
                display_name: text("name-display"),
                display_vendor: text("vendor-display"),
            },
            revision: Revision::from_element(element.required_child("revision")?)?,
            obsolete: element.own_child("obsolete").is_some(),
            archives: Archive::from_archives_element(
                element.required_child("archives")?,
                base_url,
                SchemaVersion::V1,
            )?,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn metadata(&self) -> &ExtraMetadata {
        &self.metadata
    }
}

impl ArchiveContainer for Extra {
    fn name(&self) -> &str {
        &self.path
    }

    fn revision(&self) -> &Revision {
        &self.revision
    }

    fn archives(&self) -> &[Archive] {
        &self.archives
    }

    fn schema(&self) -> SchemaVersion {
        SchemaVersion::V1
    }

    fn is_obsolete(&self) -> bool {
        self.obsolete
    }
}

impl fmt::Display for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.display_revision())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    const ADDON_NS: &str = "http://schemas.android.com/sdk/android/addon/7";

    fn base() -> Url {
        Url::parse("https://dl.google.com/android/repository/addon.xml").unwrap()
    }

    #[test]
    fn test_component_from_element() {
        let xml = r#"<sdk:platform-tool xmlns:sdk="http://schemas.android.com/sdk/android/repository/11">
            <sdk:revision><sdk:major>26</sdk:major></sdk:revision>
            <sdk:archives>
                <sdk:archive><sdk:size>10</sdk:size><sdk:checksum type="sha1">ab</sdk:checksum><sdk:url>platform-tools_r26-windows.zip</sdk:url><sdk:host-os>windows</sdk:host-os></sdk:archive>
                <sdk:archive><sdk:size>11</sdk:size><sdk:checksum type="sha1">cd</sdk:checksum><sdk:url>platform-tools_r26-linux.zip</sdk:url><sdk:host-os>linux</sdk:host-os></sdk:archive>
            </sdk:archives>
            <sdk:obsolete/>
        </sdk:platform-tool>"#;

        let component =
            Component::from_element(&parse_document(xml).unwrap(), "platform-tool", &base()).unwrap();

        assert_eq!(component.name(), "platform-tool");
        assert_eq!(component.archives().len(), 2);
        assert!(component.is_obsolete());
        assert_eq!(component.to_string(), "platform-tool 26");
        assert_eq!(component.directory_name(), "platform-tool-26");
    }

    #[test]
    fn test_component_tag_mismatch() {
        let xml = r#"<sdk:platform-tool xmlns:sdk="urn:x"/>"#;
        let err = Component::from_element(&parse_document(xml).unwrap(), "build-tool", &base())
            .unwrap_err();
        assert!(matches!(err, Error::SchemaViolation(_)));
    }

    #[test]
    fn test_component_without_archives_is_rejected() {
        let xml = r#"<build-tool><revision><major>1</major></revision></build-tool>"#;
        let err = Component::from_element(&parse_document(xml).unwrap(), "build-tool", &base())
            .unwrap_err();
        assert!(matches!(err, Error::SchemaViolation(_)));
    }

    #[test]
    fn test_extra_from_element() {
        let xml = format!(
            r#"<sdk:extra xmlns:sdk="{ADDON_NS}">
                <sdk:revision><sdk:major>11</sdk:major><sdk:minor>0</sdk:minor><sdk:micro>0</sdk:micro></sdk:revision>
                <sdk:vendor-display>Google Inc.</sdk:vendor-display>
                <sdk:vendor-id>google</sdk:vendor-id>
                <sdk:name-display>Google USB Driver</sdk:name-display>
                <sdk:path>usb_driver</sdk:path>
                <sdk:desc-url>http://developer.android.com/</sdk:desc-url>
                <sdk:archives>
                    <sdk:archive><sdk:size>8682859</sdk:size><sdk:checksum type="sha1">ab</sdk:checksum><sdk:url>usb_driver_r11-windows.zip</sdk:url><sdk:host-os>windows</sdk:host-os></sdk:archive>
                </sdk:archives>
            </sdk:extra>"#
        );

        let extra = Extra::from_element(&parse_document(&xml).unwrap(), &base()).unwrap();

        assert_eq!(extra.name(), "usb_driver");
        assert_eq!(extra.path(), "usb_driver");
        assert_eq!(extra.metadata().vendor_id.as_deref(), Some("google"));
        assert_eq!(extra.metadata().display_name.as_deref(), Some("Google USB Driver"));
        assert_eq!(extra.metadata().display_vendor.as_deref(), Some("Google Inc."));
        assert_eq!(extra.metadata().description, None);
        assert!(!extra.is_obsolete());
        assert_eq!(extra.to_string(), "usb_driver 11.0.0");
        assert_eq!(
            extra.archives()[0].url().as_str(),
            "https://dl.google.com/android/repository/usb_driver_r11-windows.zip"
        );
    }

    #[test]
    fn test_extra_without_path_is_rejected() {
        let xml = r#"<extra><revision><major>1</major></revision><archives/></extra>"#;
        let err = Extra::from_element(&parse_document(xml).unwrap(), &base()).unwrap_err();
        assert!(matches!(err, Error::SchemaViolation(_)));
    }
}
