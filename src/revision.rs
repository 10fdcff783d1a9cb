//! Component revisions
//!
//! A revision is read from a `<revision>` element with a required `major`,
//! optional `minor`/`micro` and an optional `preview` marker. Missing fields
//! stay unset rather than defaulting to zero, so `25` and `25.0.0` render
//! differently in first-generation manifests.

use crate::schema::SchemaVersion;
use crate::xml::Element;
use crate::{Error, Result};
use serde::Serialize;
use std::cmp::Ordering;

/// A `major[.minor[.micro]]` version with a preview flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Revision {
    major: u64,
    minor: Option<u64>,
    micro: Option<u64>,
    preview: bool,
}

impl Revision {
    pub fn new(major: u64, minor: Option<u64>, micro: Option<u64>, preview: bool) -> Self {
        Self {
            major,
            minor,
            micro,
            preview,
        }
    }

    /// Load a revision from a `<revision>` element
    ///
    /// Child lookups use the element's own namespace.
    pub fn from_element(element: &Element) -> Result<Self> {
        if element.name() != "revision" {
            return Err(Error::schema(format!(
                "expected <revision> element, found <{}>",
                element.name()
            )));
        }

        Ok(Self {
            major: element.parse_child("major")?,
            minor: element.parse_optional_child("minor")?,
            micro: element.parse_optional_child("micro")?,
            preview: element.own_child("preview").is_some(),
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> Option<u64> {
        self.minor
    }

    pub fn micro(&self) -> Option<u64> {
        self.micro
    }

    /// Whether this is a preview (not publicly released) revision
    pub fn is_preview(&self) -> bool {
        self.preview
    }

    /// `(major, minor or 0, micro or 0)`, for ordering only
    pub fn comparable(&self) -> (u64, u64, u64) {
        (
            self.major,
            self.minor.unwrap_or(0),
            self.micro.unwrap_or(0),
        )
    }

    /// The comparable triple as a semantic version
    pub fn to_version(&self) -> semver::Version {
        let (major, minor, patch) = self.comparable();
        semver::Version::new(major, minor, patch)
    }

    /// Compare two revisions by their comparable triple; `preview` is ignored
    pub fn cmp_version(&self, other: &Revision) -> Ordering {
        self.comparable().cmp(&other.comparable())
    }

    /// Render the revision the way manifests of the given generation do
    ///
    /// First-generation manifests omit unset fields (`25`, `25.0`, `25.0.2`);
    /// second-generation manifests always render all three, with unset fields
    /// as zero.
    pub fn render(&self, schema: SchemaVersion) -> String {
        match schema {
            SchemaVersion::V1 => match (self.minor, self.micro) {
                (None, _) => format!("{}", self.major),
                (Some(minor), None) => format!("{}.{}", self.major, minor),
                (Some(minor), Some(micro)) => format!("{}.{}.{}", self.major, minor, micro),
            },
            SchemaVersion::V2 => {
                let (major, minor, micro) = self.comparable();
                format!("{}.{}.{}", major, minor, micro)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn parse(xml: &str) -> Result<Revision> {
        Revision::from_element(&parse_document(xml).unwrap())
    }

    #[test]
    fn test_major_only() {
        let revision = parse("<revision><major>26</major></revision>").unwrap();

        assert_eq!(revision.comparable(), (26, 0, 0));
        assert_eq!(revision.minor(), None);
        assert_eq!(revision.micro(), None);
        assert_eq!(revision.render(SchemaVersion::V1), "26");
        assert_eq!(revision.render(SchemaVersion::V2), "26.0.0");
    }

    #[test]
    fn test_all_fields() {
        let revision =
            parse("<revision><major>25</major><minor>0</minor><micro>2</micro></revision>").unwrap();

        assert_eq!(revision.render(SchemaVersion::V1), "25.0.2");
        assert_eq!(revision.render(SchemaVersion::V2), "25.0.2");
        assert_eq!(revision.to_version(), semver::Version::new(25, 0, 2));
        assert!(!revision.is_preview());
    }

    #[test]
    fn test_unset_and_zero_render_differently() {
        let short = Revision::new(1, Some(0), None, false);
        let full = Revision::new(1, Some(0), Some(0), false);

        assert_eq!(short.render(SchemaVersion::V1), "1.0");
        assert_eq!(full.render(SchemaVersion::V1), "1.0.0");
        assert_eq!(short.cmp_version(&full), Ordering::Equal);
    }

    #[test]
    fn test_preview_is_presence_of_tag() {
        let xml = r#"<sdk:revision xmlns:sdk="urn:x">
            <sdk:major>27</sdk:major><sdk:minor>0</sdk:minor><sdk:micro>0</sdk:micro>
            <sdk:preview>1</sdk:preview>
        </sdk:revision>"#;
        let revision = parse(xml).unwrap();

        assert!(revision.is_preview());
        assert_eq!(revision.comparable(), (27, 0, 0));
    }

    #[test]
    fn test_preview_does_not_affect_ordering() {
        let release = Revision::new(30, Some(0), Some(1), false);
        let preview = Revision::new(30, Some(0), Some(1), true);
        let newer = Revision::new(30, Some(0), Some(2), false);

        assert_eq!(release.cmp_version(&preview), Ordering::Equal);
        assert_eq!(preview.cmp_version(&newer), Ordering::Less);
    }

    #[test]
    fn test_wrong_tag_rejected() {
        let err = parse("<version><major>1</major></version>").unwrap_err();
        assert!(matches!(err, Error::SchemaViolation(_)));
    }

    #[test]
    fn test_missing_major_rejected() {
        let err = parse("<revision><minor>1</minor></revision>").unwrap_err();
        assert!(matches!(err, Error::SchemaViolation(_)));
    }
}
