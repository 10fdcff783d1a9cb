pub mod config;
pub mod fetch;
pub mod list;
pub mod pack;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use sdkpack::{
    parse_version, ArchiveContainer, Config, Container, HttpClient, Manifest, PackageFilter,
    ProgressCallback,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::Selection;

/// Spinner shown while a single step runs
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Create an indicatif-based progress callback for downloads
///
/// The bar switches to a byte count once the total size is known.
pub fn create_progress_callback() -> (ProgressBar, ProgressCallback) {
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.enable_steady_tick(Duration::from_millis(80));

    let handle = bar.clone();
    let callback: ProgressCallback = Arc::new(move |msg: &str, current: u64, total: u64| {
        match msg {
            "Downloading" => {
                handle.set_length(total);
                handle.set_position(current);
            }
            "Extracting" | "Extracted" => handle.set_message(msg.to_string()),
            _ => {
                handle.set_message(msg.to_string());
                handle.set_length(total);
                handle.set_position(current);
            }
        }
    });

    (bar, callback)
}

/// Load the config and build an HTTP client from it
pub fn load_config() -> Result<(Config, HttpClient)> {
    let config = Config::load()?;
    let client = HttpClient::from_config(&config)?;
    Ok((config, client))
}

/// Load the manifest named by the selection, or the configured one
pub fn load_manifest(config: &Config, client: &HttpClient, selection: &Selection) -> Result<Manifest> {
    let url = selection.url.as_deref().unwrap_or(&config.repository.url);
    let addon_url = selection
        .addon_url
        .as_deref()
        .or(config.repository.addon_url.as_deref());

    let progress = spinner(&format!("Loading {}", url));
    let manifest = match addon_url {
        Some(addon_url) => Manifest::load_with_addon(client, url, addon_url),
        None => Manifest::load(client, url),
    };
    progress.finish_and_clear();

    Ok(manifest?)
}

/// Build the filter from command-line flags, falling back to the config
pub fn build_filter(config: &Config, selection: &Selection) -> Result<PackageFilter> {
    Ok(PackageFilter {
        versions: selection
            .revisions
            .iter()
            .map(|r| parse_version(r))
            .collect::<sdkpack::Result<Vec<_>>>()?,
        min_version: selection
            .min_revision
            .as_deref()
            .map(parse_version)
            .transpose()?,
        include_preview: selection.include_preview || config.filter.include_preview,
        include_obsolete: selection.include_obsolete || config.filter.include_obsolete,
    })
}

/// Load the manifest and apply the selection to the requested section
pub fn select(config: &Config, client: &HttpClient, selection: &Selection) -> Result<Vec<Container>> {
    let manifest = load_manifest(config, client, selection)?;
    let filter = build_filter(config, selection)?;
    Ok(filter.select(manifest.containers(selection.section)))
}

/// `--dir` if given, otherwise the configured cache directory
pub fn cache_dir(config: &Config, dir: Option<String>) -> PathBuf {
    match dir {
        Some(dir) => PathBuf::from(shellexpand::tilde(&dir).to_string()),
        None => config.cache_dir(),
    }
}

pub fn describe(container: &Container) -> String {
    format!("{} {}", container.name(), container.display_revision())
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
