//! Manifest schema generations and their XML namespaces
//!
//! The SDK publishes two generations of repository manifests. Within a
//! generation, documents differ only by the version number at the end of the
//! namespace URI, so detection matches on the namespace prefix and requires a
//! numeric suffix.

use crate::xml::Element;
use serde::Serialize;
use std::fmt;

/// Namespace prefix of first-generation SDK repository manifests
pub const REPOSITORY_NAMESPACE: &str = "http://schemas.android.com/sdk/android/repository/";

/// Namespace prefix of first-generation addon manifests
pub const ADDON_NAMESPACE: &str = "http://schemas.android.com/sdk/android/addon/";

/// Namespace prefix of second-generation repository manifests
pub const REPOSITORY2_NAMESPACE: &str = "http://schemas.android.com/sdk/android/repo/repository2/";

/// Manifest schema generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// `repository/<N>` and `addon/<N>` manifests
    V1,
    /// `repo/repository2/<N>` manifests
    V2,
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
        }
    }
}

/// The kind of manifest a root element declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// `<sdk-repository>` in a `repository/<N>` namespace
    Repository,
    /// `<sdk-addon>` in an `addon/<N>` namespace
    Addon,
    /// `<sdk-repository>` in a `repo/repository2/<N>` namespace
    Repository2,
}

impl ManifestKind {
    /// Identify the manifest kind from a document's root element
    pub fn detect(root: &Element) -> Option<Self> {
        let namespace = root.namespace()?;

        if has_versioned_prefix(namespace, REPOSITORY_NAMESPACE) && root.name() == "sdk-repository" {
            Some(ManifestKind::Repository)
        } else if has_versioned_prefix(namespace, ADDON_NAMESPACE) && root.name() == "sdk-addon" {
            Some(ManifestKind::Addon)
        } else if has_versioned_prefix(namespace, REPOSITORY2_NAMESPACE)
            && root.name() == "sdk-repository"
        {
            Some(ManifestKind::Repository2)
        } else {
            None
        }
    }

    pub fn schema(self) -> SchemaVersion {
        match self {
            ManifestKind::Repository | ManifestKind::Addon => SchemaVersion::V1,
            ManifestKind::Repository2 => SchemaVersion::V2,
        }
    }
}

fn has_versioned_prefix(namespace: &str, prefix: &str) -> bool {
    namespace
        .strip_prefix(prefix)
        .map(|version| !version.is_empty() && version.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn root(namespace: &str, name: &str) -> Element {
        parse_document(&format!(r#"<sdk:{name} xmlns:sdk="{namespace}"/>"#)).unwrap()
    }

    #[test]
    fn test_detect_known_roots() {
        let repo = root("http://schemas.android.com/sdk/android/repository/11", "sdk-repository");
        let addon = root("http://schemas.android.com/sdk/android/addon/7", "sdk-addon");
        let repo2 = root(
            "http://schemas.android.com/sdk/android/repo/repository2/01",
            "sdk-repository",
        );

        assert_eq!(ManifestKind::detect(&repo), Some(ManifestKind::Repository));
        assert_eq!(ManifestKind::detect(&addon), Some(ManifestKind::Addon));
        assert_eq!(ManifestKind::detect(&repo2), Some(ManifestKind::Repository2));
        assert_eq!(ManifestKind::Repository2.schema(), SchemaVersion::V2);
    }

    #[test]
    fn test_detect_accepts_other_namespace_versions() {
        let repo = root("http://schemas.android.com/sdk/android/repository/12", "sdk-repository");
        assert_eq!(ManifestKind::detect(&repo), Some(ManifestKind::Repository));
    }

    #[test]
    fn test_detect_rejects_mismatched_roots() {
        // right namespace, wrong element
        let addon_in_repo = root("http://schemas.android.com/sdk/android/repository/11", "sdk-addon");
        assert_eq!(ManifestKind::detect(&addon_in_repo), None);

        let unversioned = root("http://schemas.android.com/sdk/android/repository/", "sdk-repository");
        assert_eq!(ManifestKind::detect(&unversioned), None);

        let plain = parse_document("<sdk-repository/>").unwrap();
        assert_eq!(ManifestKind::detect(&plain), None);
    }
}
