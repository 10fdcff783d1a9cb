//! First-generation repository and addon manifests
//!
//! A `repository/<N>` manifest lists `build-tool` and `platform-tool` entries;
//! an `addon/<N>` manifest lists `extra` entries. Both share element names and
//! differ only in namespace, so every lookup is qualified with the namespace
//! captured from the root element.

use crate::component::{Component, Extra};
use crate::http::HttpClient;
use crate::schema::ManifestKind;
use crate::xml::{parse_document, Element};
use crate::{Error, Result};
use tracing::debug;
use url::Url;

const BUILD_TOOL: &str = "build-tool";
const PLATFORM_TOOL: &str = "platform-tool";
const EXTRA: &str = "extra";

/// A parsed first-generation manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    namespace: String,
    kind: ManifestKind,
    build_tools: Vec<Component>,
    platform_tools: Vec<Component>,
    extras: Vec<Extra>,
}

impl Repository {
    /// Fetch and parse the manifest at `url`
    pub fn load(client: &HttpClient, url: &str) -> Result<Self> {
        let base_url = Url::parse(url)?;
        let document = client.fetch_text(url)?;
        Self::from_element(&parse_document(&document)?, &base_url)
    }

    /// Parse a manifest root element; relative archive URLs resolve against `base_url`
    pub fn from_element(root: &Element, base_url: &Url) -> Result<Self> {
        let kind = match ManifestKind::detect(root) {
            Some(kind @ (ManifestKind::Repository | ManifestKind::Addon)) => kind,
            _ => {
                return Err(Error::schema(format!(
                    "<{}> in namespace '{}' is not an SDK repository or addon manifest",
                    root.name(),
                    root.namespace().unwrap_or_default()
                )))
            }
        };

        let namespace = root.namespace().unwrap_or_default().to_string();
        let ns = Some(namespace.as_str());

        let build_tools = root
            .children_named(ns, BUILD_TOOL)
            .map(|e| Component::from_element(e, BUILD_TOOL, base_url))
            .collect::<Result<Vec<_>>>()?;

        let platform_tools = root
            .children_named(ns, PLATFORM_TOOL)
            .map(|e| Component::from_element(e, PLATFORM_TOOL, base_url))
            .collect::<Result<Vec<_>>>()?;

        let extras = root
            .children_named(ns, EXTRA)
            .map(|e| Extra::from_element(e, base_url))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            namespace = %namespace,
            build_tools = build_tools.len(),
            platform_tools = platform_tools.len(),
            extras = extras.len(),
            "parsed repository manifest"
        );

        Ok(Self {
            namespace,
            kind,
            build_tools,
            platform_tools,
            extras,
        })
    }

    /// Append another repository's entries to this one
    ///
    /// Entries are not de-duplicated; this repository's entries come first.
    pub fn merge(&mut self, other: Repository) {
        self.build_tools.extend(other.build_tools);
        self.platform_tools.extend(other.platform_tools);
        self.extras.extend(other.extras);
    }

    /// Namespace URI of the manifest root
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether the manifest was a plain repository or an addon manifest
    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    pub fn build_tools(&self) -> &[Component] {
        &self.build_tools
    }

    pub fn platform_tools(&self) -> &[Component] {
        &self.platform_tools
    }

    pub fn extras(&self) -> &[Extra] {
        &self.extras
    }
}
