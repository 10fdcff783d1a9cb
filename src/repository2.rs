//! Second-generation (`repo/repository2/<N>`) manifests
//!
//! These list flat `remotePackage` elements addressed by install paths such
//! as `build-tools;30.0.3`. A package belongs to a section when one of its
//! path segments names that section exactly; packages matching no section
//! are skipped, and a package may land in more than one.

use crate::http::HttpClient;
use crate::remote_package::{split_path, RemotePackage};
use crate::schema::ManifestKind;
use crate::xml::{parse_document, Element};
use crate::{Error, Result};
use tracing::debug;
use url::Url;

/// Path segment of build-tools packages
pub const BUILD_TOOLS_PATH: &str = "build-tools";

/// Path segment of platform-tools packages
pub const PLATFORM_TOOLS_PATH: &str = "platform-tools";

/// A parsed second-generation manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository2 {
    namespace: String,
    build_tools: Vec<RemotePackage>,
    platform_tools: Vec<RemotePackage>,
}

impl Repository2 {
    /// Fetch and parse the manifest at `url`
    pub fn load(client: &HttpClient, url: &str) -> Result<Self> {
        let base_url = Url::parse(url)?;
        let document = client.fetch_text(url)?;
        Self::from_element(&parse_document(&document)?, &base_url)
    }

    /// Parse a manifest root element; relative archive URLs resolve against `base_url`
    pub fn from_element(root: &Element, base_url: &Url) -> Result<Self> {
        if ManifestKind::detect(root) != Some(ManifestKind::Repository2) {
            return Err(Error::schema(format!(
                "<{}> in namespace '{}' is not a repository2 manifest",
                root.name(),
                root.namespace().unwrap_or_default()
            )));
        }

        let mut repository = Self {
            namespace: root.namespace().unwrap_or_default().to_string(),
            build_tools: Vec::new(),
            platform_tools: Vec::new(),
        };

        let mut skipped = 0;
        for element in root.children_named(None, "remotePackage") {
            let path = element.attribute("path").ok_or_else(|| {
                Error::schema("<remotePackage> is missing its path attribute")
            })?;

            let in_build_tools = split_path(path).any(|s| s == BUILD_TOOLS_PATH);
            let in_platform_tools = split_path(path).any(|s| s == PLATFORM_TOOLS_PATH);

            if !in_build_tools && !in_platform_tools {
                skipped += 1;
                continue;
            }

            let package = RemotePackage::from_element(element, base_url)?;
            if in_build_tools {
                repository.build_tools.push(package.clone());
            }
            if in_platform_tools {
                repository.platform_tools.push(package);
            }
        }

        debug!(
            namespace = %repository.namespace,
            build_tools = repository.build_tools.len(),
            platform_tools = repository.platform_tools.len(),
            skipped,
            "parsed repository2 manifest"
        );

        Ok(repository)
    }

    /// Namespace URI of the manifest root
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn build_tools(&self) -> &[RemotePackage] {
        &self.build_tools
    }

    pub fn platform_tools(&self) -> &[RemotePackage] {
        &self.platform_tools
    }
}
