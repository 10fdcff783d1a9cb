use anyhow::{Context, Result};
use sdkpack::{generate_packages, PackageOptions};
use std::fs;
use std::path::PathBuf;

use super::{cache_dir, create_progress_callback, describe, load_config, select};
use crate::Selection;

pub fn run(
    selection: &Selection,
    template: Option<String>,
    version_suffix: Option<String>,
    output: Option<String>,
    dir: Option<String>,
    overwrite: bool,
) -> Result<()> {
    let (config, client) = load_config()?;

    let template_path = match template {
        Some(path) => PathBuf::from(shellexpand::tilde(&path).to_string()),
        None => config.template_path().ok_or_else(|| {
            anyhow::anyhow!(
                "No .nuspec template given.\n\
                 Pass --template <path> or run: sdkpack config set packaging.template <path>"
            )
        })?,
    };
    let template = fs::read_to_string(&template_path)
        .with_context(|| format!("Failed to read template {}", template_path.display()))?;

    let target_dir = cache_dir(&config, dir);
    let options = PackageOptions {
        overwrite: overwrite || config.download.overwrite,
        version_suffix: version_suffix.unwrap_or_else(|| config.packaging.version_suffix.clone()),
        output_dir: Some(match output {
            Some(output) => PathBuf::from(shellexpand::tilde(&output).to_string()),
            None => match &config.packaging.output_dir {
                Some(_) => config.output_dir(),
                None => target_dir.clone(),
            },
        }),
    };

    let containers = select(&config, &client, selection)?;
    if containers.is_empty() {
        println!("No {} match the selection.", selection.section);
        return Ok(());
    }

    println!("Packing {} {}", containers.len(), selection.section);
    println!();

    let mut written = Vec::new();
    for container in &containers {
        let (bar, callback) = create_progress_callback();
        bar.set_message(describe(container));

        let result = generate_packages(
            &client,
            std::slice::from_ref(container),
            &template,
            &target_dir,
            &options,
            Some(&callback),
        );
        bar.finish_and_clear();

        let packages = result?;
        println!("  ✓ {}", describe(container));
        for package in &packages {
            println!("      {}", package.display());
        }
        written.extend(packages);
    }

    println!();
    println!("✅ Wrote {} package{}", written.len(), if written.len() == 1 { "" } else { "s" });

    Ok(())
}
