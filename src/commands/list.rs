use anyhow::Result;
use sdkpack::{ArchiveContainer, Container, SchemaVersion};
use serde::Serialize;

use super::{format_size, load_config, select};
use crate::Selection;

#[derive(Serialize)]
struct ListedContainer<'a> {
    kind: &'static str,
    name: &'a str,
    revision: String,
    version: String,
    schema: SchemaVersion,
    preview: bool,
    obsolete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    archives: Vec<ListedArchive<'a>>,
}

#[derive(Serialize)]
struct ListedArchive<'a> {
    host_os: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host_arch: Option<&'a str>,
    size: u64,
    checksum_type: Option<&'a str>,
    checksum: &'a str,
    url: &'a str,
}

impl<'a> ListedContainer<'a> {
    fn new(container: &'a Container) -> Self {
        let path = match container {
            Container::Extra(extra) => Some(extra.path()),
            Container::RemotePackage(package) => Some(package.path()),
            Container::Component(_) => None,
        };

        Self {
            kind: container.kind(),
            name: container.name(),
            revision: container.display_revision(),
            version: container.revision().to_version().to_string(),
            schema: container.schema(),
            preview: container.revision().is_preview(),
            obsolete: container.is_obsolete(),
            path,
            archives: container
                .archives()
                .iter()
                .map(|archive| ListedArchive {
                    host_os: archive.host_os(),
                    host_arch: archive.host_arch(),
                    size: archive.size(),
                    checksum_type: archive.checksum_type(),
                    checksum: archive.checksum(),
                    url: archive.url().as_str(),
                })
                .collect(),
        }
    }
}

pub fn run(selection: &Selection, json: bool) -> Result<()> {
    let (config, client) = load_config()?;
    let containers = select(&config, &client, selection)?;

    if json {
        let listed: Vec<_> = containers.iter().map(ListedContainer::new).collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if containers.is_empty() {
        println!("No {} match the selection.", selection.section);
        return Ok(());
    }

    println!("{}:", selection.section);
    for container in &containers {
        let mut flags = Vec::new();
        if container.revision().is_preview() {
            flags.push("preview");
        }
        if container.is_obsolete() {
            flags.push("obsolete");
        }

        let size: u64 = container.archives().iter().map(|a| a.size()).sum();
        let platforms: Vec<_> = container
            .archives()
            .iter()
            .map(|a| match (a.host_os(), a.host_arch()) {
                (Some(os), Some(arch)) => format!("{}-{}", os, arch),
                (os, _) => os.unwrap_or("any").to_string(),
            })
            .collect();

        println!(
            "  {:<40} {:<12} {:>10}  {}{}",
            container.name(),
            container.display_revision(),
            format_size(size),
            platforms.join(", "),
            if flags.is_empty() {
                String::new()
            } else {
                format!(" ({})", flags.join(", "))
            }
        );
    }
    println!();
    println!(
        "Total: {} entr{}",
        containers.len(),
        if containers.len() == 1 { "y" } else { "ies" }
    );

    Ok(())
}
