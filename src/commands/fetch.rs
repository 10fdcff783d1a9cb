use anyhow::Result;
use sdkpack::acquire_container;

use super::{cache_dir, create_progress_callback, describe, load_config, select};
use crate::Selection;

pub fn run(selection: &Selection, dir: Option<String>, overwrite: bool) -> Result<()> {
    let (config, client) = load_config()?;
    let containers = select(&config, &client, selection)?;
    let target_dir = cache_dir(&config, dir);
    let overwrite = overwrite || config.download.overwrite;

    if containers.is_empty() {
        println!("No {} match the selection.", selection.section);
        return Ok(());
    }

    println!(
        "Fetching {} {} into {}",
        containers.len(),
        selection.section,
        target_dir.display()
    );
    println!();

    for container in &containers {
        let (bar, callback) = create_progress_callback();
        bar.set_message(describe(container));

        let result = acquire_container(&client, container, &target_dir, overwrite, Some(&callback));
        bar.finish_and_clear();

        let directory = result?;
        println!("  ✓ {} -> {}", describe(container), directory.display());
    }

    println!();
    println!("✅ Fetched {} entr{}", containers.len(), if containers.len() == 1 { "y" } else { "ies" });

    Ok(())
}
