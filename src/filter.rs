//! Selecting which containers to acquire and package
//!
//! Containers are matched on [`Revision::to_version`](crate::Revision::to_version),
//! so `25` in a first-generation manifest and `25.0.0` in a second-generation
//! one compare equal.

use crate::container::ArchiveContainer;
use crate::Result;
use semver::Version;
use tracing::debug;

/// Criteria for picking containers out of a manifest section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFilter {
    /// Exact versions to keep; empty keeps every version
    pub versions: Vec<Version>,
    /// Lowest version to keep (inclusive)
    pub min_version: Option<Version>,
    pub include_preview: bool,
    pub include_obsolete: bool,
}

impl PackageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a single container passes the filter
    pub fn matches<C: ArchiveContainer + ?Sized>(&self, container: &C) -> bool {
        let revision = container.revision();

        if revision.is_preview() && !self.include_preview {
            return false;
        }
        if container.is_obsolete() && !self.include_obsolete {
            return false;
        }

        let version = revision.to_version();
        if let Some(min) = &self.min_version {
            if &version < min {
                return false;
            }
        }

        self.versions.is_empty() || self.versions.contains(&version)
    }

    /// Keep the matching containers, sorted by version ascending
    ///
    /// The sort is stable, so containers with equal versions keep manifest order.
    pub fn select<C, I>(&self, containers: I) -> Vec<C>
    where
        C: ArchiveContainer,
        I: IntoIterator<Item = C>,
    {
        let mut selected: Vec<C> = containers
            .into_iter()
            .filter(|container| {
                let keep = self.matches(container);
                if !keep {
                    debug!(
                        name = container.name(),
                        revision = %container.display_revision(),
                        "filtered out"
                    );
                }
                keep
            })
            .collect();

        selected.sort_by(|a, b| a.revision().cmp_version(b.revision()));
        selected
    }
}

/// Parse a version as given on the command line or in config
///
/// Missing components are filled with zero (`30` becomes `30.0.0`, `30.0`
/// becomes `30.0.0`), matching how revisions with unset fields compare.
pub fn parse_version(input: &str) -> Result<Version> {
    let trimmed = input.trim();
    let normalized = match trimmed.matches('.').count() {
        0 => format!("{}.0.0", trimmed),
        1 => format!("{}.0", trimmed),
        _ => trimmed.to_string(),
    };

    Ok(Version::parse(&normalized)?)
}
